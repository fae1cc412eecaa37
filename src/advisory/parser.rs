//! Defensive parsing of model replies
//!
//! The provider enforces no schema, so the reply is treated as free text:
//! - markdown code fences are stripped
//! - the first balanced JSON object is located by bracket matching
//! - fields are read leniently (numeric strings, single-string class lists)

use crate::errors::AdvisoryFailure;
use crate::types::{AdvisoryResult, MAX_VIABILITY};
use serde::Deserialize;

/// Remove a surrounding markdown code fence, if any.
///
/// Prefers a ```` ```json ```` fence, then any bare ```` ``` ```` fence.
pub fn strip_code_fences(text: &str) -> &str {
    let body = if let Some((_, after)) = text.split_once("```json") {
        after
    } else if let Some((_, after)) = text.split_once("```") {
        after
    } else {
        return text.trim();
    };

    match body.split_once("```") {
        Some((inner, _)) => inner.trim(),
        None => body.trim(),
    }
}

/// Locate the first complete JSON object in `text`.
///
/// Single pass bracket matching that ignores braces inside string literals.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let mut depth: i32 = 0;
    let mut start: Option<usize> = None;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        if in_string {
            match ch {
                '\\' => escape_next = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' if start.is_some() => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start {
                        return Some(&text[s..=i]);
                    }
                }
            }
            _ => {}
        }
    }

    None
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScoreValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CategoryItem {
    Text(String),
    Number(i64),
    Object(serde_json::Map<String, serde_json::Value>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CategoryList {
    Many(Vec<CategoryItem>),
    One(String),
}

#[derive(Debug, Deserialize)]
struct RawAdvisory {
    #[serde(alias = "viability")]
    viabilidad: ScoreValue,
    #[serde(alias = "categories", alias = "classes")]
    clases: CategoryList,
    #[serde(alias = "note")]
    nota: String,
}

fn score_from(value: ScoreValue) -> Result<u8, AdvisoryFailure> {
    let raw = match value {
        ScoreValue::Integer(n) => n as f64,
        ScoreValue::Float(f) => f,
        ScoreValue::Text(s) => {
            let cleaned = s.trim().trim_end_matches('%').trim();
            cleaned.parse::<f64>().map_err(|_| AdvisoryFailure::InvalidField {
                field: "viabilidad",
                details: format!("not a number: {:?}", s),
            })?
        }
    };

    if !raw.is_finite() {
        return Err(AdvisoryFailure::InvalidField {
            field: "viabilidad",
            details: "not a finite number".to_string(),
        });
    }

    Ok(raw.round().clamp(0.0, MAX_VIABILITY as f64) as u8)
}

fn category_label(item: CategoryItem) -> Option<String> {
    match item {
        CategoryItem::Text(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        CategoryItem::Number(n) => Some(format!("Clase {}", n)),
        CategoryItem::Object(map) => {
            let parts: Vec<String> = map
                .values()
                .filter_map(|v| match v {
                    serde_json::Value::String(s) if !s.trim().is_empty() => {
                        Some(s.trim().to_string())
                    }
                    serde_json::Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect();
            (!parts.is_empty()).then(|| parts.join(" - "))
        }
    }
}

/// Parse a model reply into an `AdvisoryResult`
pub fn parse_reply(text: &str) -> Result<AdvisoryResult, AdvisoryFailure> {
    let unfenced = strip_code_fences(text);
    let json = extract_json_object(unfenced).ok_or(AdvisoryFailure::NoJsonObject)?;
    let raw: RawAdvisory = serde_json::from_str(json)?;

    let categories = match raw.clases {
        CategoryList::Many(items) => items.into_iter().filter_map(category_label).collect(),
        CategoryList::One(s) => category_label(CategoryItem::Text(s)).into_iter().collect(),
    };

    Ok(AdvisoryResult {
        viability: score_from(raw.viabilidad)?,
        categories,
        note: raw.nota,
    })
}
