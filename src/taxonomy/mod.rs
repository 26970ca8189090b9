use crate::models::scorecard::Archetype;

/// Map a top-language label to its archetype.
pub fn archetype_for(language: &str) -> Archetype {
    match language {
        "JavaScript" | "TypeScript" => Archetype::CodeNinja,
        "Python" => Archetype::DataSorcerer,
        "Java" | "C#" => Archetype::SystemPaladin,
        "Rust" | "Go" | "C++" => Archetype::MemoryWarlord,
        "HTML" | "CSS" => Archetype::PixelArtist,
        _ => Archetype::FullstackRanger,
    }
}
