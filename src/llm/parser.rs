use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::models::analysis::{
    AnalysisResult, CodeQuality, CommitPattern, JudgmentResult, Origin,
};

const REASONING_TAGS: [&str; 3] = ["think", "thinking", "reasoning"];

pub fn parse_analysis(raw: &str) -> Result<AnalysisResult> {
    let value = sanitize(raw)?;
    let root = object(&value, "response")?;

    let pattern = object(field(root, "commit_pattern", "response")?, "commit_pattern")?;
    let quality = object(field(root, "code_quality", "response")?, "code_quality")?;

    let commit_pattern = CommitPattern {
        productivity_score: score(
            field(pattern, "productivity_score", "commit_pattern")?,
            "commit_pattern.productivity_score",
        )?,
        peak_hours: string_list(
            field(pattern, "peak_hours", "commit_pattern")?,
            "commit_pattern.peak_hours",
        )?,
        work_pattern: string(
            field(pattern, "work_pattern", "commit_pattern")?,
            "commit_pattern.work_pattern",
        )?,
        recommendations: string_list(
            field(pattern, "recommendations", "commit_pattern")?,
            "commit_pattern.recommendations",
        )?,
    };

    let code_quality = CodeQuality {
        overall_quality_score: score(
            field(quality, "overall_quality_score", "code_quality")?,
            "code_quality.overall_quality_score",
        )?,
        strengths: string_list(
            field(quality, "strengths", "code_quality")?,
            "code_quality.strengths",
        )?,
        improvements: string_list(
            field(quality, "improvements", "code_quality")?,
            "code_quality.improvements",
        )?,
    };

    let origin = match root.get("origin") {
        None => Origin::Ai,
        Some(value) => match string(value, "origin")?.as_str() {
            "ai" => Origin::Ai,
            "fallback" => Origin::Fallback,
            other => return Err(Error::schema(format!("unknown origin '{}'", other))),
        },
    };
    let diagnostic = match root.get("diagnostic") {
        None | Some(Value::Null) => None,
        Some(value) => Some(string(value, "diagnostic")?),
    };

    Ok(AnalysisResult {
        commit_pattern,
        code_quality,
        origin,
        diagnostic,
    })
}

pub fn parse_judgment(raw: &str, id_a: &str, id_b: &str) -> Result<JudgmentResult> {
    let value = sanitize(raw)?;
    let root = object(&value, "response")?;

    let winner = string(field(root, "winner", "response")?, "winner")?;
    let winner_id = if winner.trim().eq_ignore_ascii_case(id_a) {
        id_a.to_string()
    } else if winner.trim().eq_ignore_ascii_case(id_b) {
        id_b.to_string()
    } else {
        return Err(Error::schema(format!(
            "winner '{}' is neither '{}' nor '{}'",
            winner, id_a, id_b
        )));
    };

    let reason = string(field(root, "reason", "response")?, "reason")?;
    let score_a = rounded_score(first_field(root, &["score_a", "u1Score"])?, "score_a")?;
    let score_b = rounded_score(first_field(root, &["score_b", "u2Score"])?, "score_b")?;

    Ok(JudgmentResult {
        winner_id,
        reason,
        score_a,
        score_b,
        origin: Origin::Ai,
    })
}

fn sanitize(raw: &str) -> Result<Value> {
    let text = strip_reasoning(raw);
    let text = strip_fences(&text);
    let json = extract_first_object(&text)
        .ok_or_else(|| Error::schema("no JSON object found in response"))?;
    serde_json::from_str(json).map_err(|e| Error::schema(format!("invalid JSON: {}", e)))
}

/// Remove reasoning blocks that sit outside any JSON object. Tag text
/// inside an object (for example in a string value) is left alone.
pub fn strip_reasoning(text: &str) -> String {
    // ASCII lowercasing keeps byte offsets aligned with `text`.
    let lower = text.to_ascii_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;
    let mut i = 0;

    while i < text.len() {
        if depth == 0 {
            let rest = &lower[i..];
            if let Some(tag) = REASONING_TAGS
                .iter()
                .find(|tag| rest.starts_with(&format!("<{}>", tag)))
            {
                let close = format!("</{}>", tag);
                match rest.find(&close) {
                    Some(end) => {
                        i += end + close.len();
                        continue;
                    }
                    // Unterminated block runs to the end of the text.
                    None => break,
                }
            }
            // A closing tag with no opener: the model started mid-thought.
            if let Some(tag) = REASONING_TAGS
                .iter()
                .find(|tag| rest.starts_with(&format!("</{}>", tag)))
            {
                out.clear();
                i += tag.len() + 3;
                continue;
            }
        }

        let Some(c) = text[i..].chars().next() else {
            break;
        };
        if escape_next {
            escape_next = false;
        } else {
            match c {
                '\\' if in_string => escape_next = true,
                '"' if depth > 0 => in_string = !in_string,
                '{' if !in_string => depth += 1,
                '}' if !in_string => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        out.push(c);
        i += c.len_utf8();
    }

    out
}

pub fn strip_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(idx) = rest.find("```") {
        out.push_str(&rest[..idx]);
        rest = &rest[idx + 3..];
        // Drop a language tag directly after the fence.
        let tag_len = rest
            .char_indices()
            .find(|(_, c)| !c.is_ascii_alphanumeric())
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        if rest[..tag_len].eq_ignore_ascii_case("json") {
            rest = &rest[tag_len..];
        }
    }
    out.push_str(rest);

    out.trim().to_string()
}

/// First balanced `{...}` span, aware of strings and escapes.
pub fn extract_first_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, c) in text[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match c {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

fn object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| Error::schema(format!("{} is not an object", path)))
}

fn field<'a>(obj: &'a Map<String, Value>, name: &str, parent: &str) -> Result<&'a Value> {
    obj.get(name)
        .ok_or_else(|| Error::schema(format!("{} is missing '{}'", parent, name)))
}

fn first_field<'a>(obj: &'a Map<String, Value>, names: &[&str]) -> Result<&'a Value> {
    names
        .iter()
        .find_map(|n| obj.get(*n))
        .ok_or_else(|| Error::schema(format!("response is missing '{}'", names[0])))
}

fn string(value: &Value, path: &str) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| Error::schema(format!("{} is not a string", path)))
}

fn string_list(value: &Value, path: &str) -> Result<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::schema(format!("{} is not an array", path)))?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| string(item, &format!("{}[{}]", path, i)))
        .collect()
}

/// Integer score in 0..=100. `85.0` is accepted, `85.5` is not.
fn score(value: &Value, path: &str) -> Result<u8> {
    let number = value
        .as_f64()
        .ok_or_else(|| Error::schema(format!("{} is not a number", path)))?;
    if number.fract() != 0.0 {
        return Err(Error::schema(format!("{} is not an integer: {}", path, number)));
    }
    in_range(number, path)
}

fn rounded_score(value: &Value, path: &str) -> Result<u8> {
    let number = value
        .as_f64()
        .ok_or_else(|| Error::schema(format!("{} is not a number", path)))?;
    in_range(number.round(), path)
}

fn in_range(number: f64, path: &str) -> Result<u8> {
    if !(0.0..=100.0).contains(&number) {
        return Err(Error::schema(format!("{} out of range 0-100: {}", path, number)));
    }
    Ok(number as u8)
}
