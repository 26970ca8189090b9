use serde::{Deserialize, Serialize};

pub const GENERALIST: &str = "Generalist";

pub const MIN_LEVEL: u32 = 1;
pub const MAX_LEVEL: u32 = 99;
pub const SUB_SCORE_CAP: u32 = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    pub level: u32,
    pub archetype: Archetype,
    pub ability: String,
    pub volume: u32,
    pub breadth: u32,
    pub velocity: u32,
    pub social: u32,
    pub top_language: String,
    pub total_stars: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Archetype {
    CodeNinja,
    DataSorcerer,
    SystemPaladin,
    MemoryWarlord,
    PixelArtist,
    FullstackRanger,
}

impl Archetype {
    pub const ALL: [Archetype; 6] = [
        Archetype::CodeNinja,
        Archetype::DataSorcerer,
        Archetype::SystemPaladin,
        Archetype::MemoryWarlord,
        Archetype::PixelArtist,
        Archetype::FullstackRanger,
    ];

    pub fn ability(&self) -> &'static str {
        match self {
            Archetype::CodeNinja => "Async Strike",
            Archetype::DataSorcerer => "Snake Charm",
            Archetype::SystemPaladin => "Strict Typing",
            Archetype::MemoryWarlord => "Pointer Crush",
            Archetype::PixelArtist => "Flexbox Grid",
            Archetype::FullstackRanger => "Bug Hunt",
        }
    }
}

impl std::fmt::Display for Archetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Archetype::CodeNinja => write!(f, "Code Ninja"),
            Archetype::DataSorcerer => write!(f, "Data Sorcerer"),
            Archetype::SystemPaladin => write!(f, "System Paladin"),
            Archetype::MemoryWarlord => write!(f, "Memory Warlord"),
            Archetype::PixelArtist => write!(f, "Pixel Artist"),
            Archetype::FullstackRanger => write!(f, "Fullstack Ranger"),
        }
    }
}
