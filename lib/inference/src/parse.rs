//! Tolerant parsing of structured model output.
//!
//! Vision-language collaborators are asked for JSON but frequently wrap it
//! in markdown fences or chat around it. Anything that fails to parse is
//! treated as an untrusted plain string and degraded accordingly - it is
//! never evaluated or otherwise executed.

use crate::traits::{CleanedQuery, SketchReading};
use serde::Deserialize;
use tracing::warn;
use vitrine_core::StrictCategory;

#[derive(Deserialize)]
struct RawSketchReading {
    #[serde(default)]
    description: String,
    #[serde(rename = "type", default)]
    category: String,
}

#[derive(Deserialize)]
struct RawCleanedQuery {
    #[serde(default)]
    cleaned_query: String,
    #[serde(default)]
    product_type: String,
}

/// Strip a markdown code fence (```json ... ``` or ``` ... ```) if present,
/// returning the enclosed content.
#[must_use]
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    if let Some(inner) = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
    {
        if let Some(end) = inner.find("```") {
            return inner[..end].trim();
        }
        return inner.trim();
    }
    trimmed
}

/// Parse an interpreter response into a [`SketchReading`].
///
/// Malformed output degrades: the raw response becomes the description and
/// the category is left unconstrained.
#[must_use]
pub fn parse_sketch_reading(raw: &str) -> SketchReading {
    let content = strip_code_fences(raw);
    match serde_json::from_str::<RawSketchReading>(content) {
        Ok(parsed) => {
            let description = if parsed.description.trim().is_empty() {
                "jewellery sketch".to_string()
            } else {
                parsed.description
            };
            SketchReading {
                description,
                category: StrictCategory::parse(&parsed.category),
            }
        }
        Err(_) => {
            warn!("sketch interpreter returned malformed JSON, using raw text");
            SketchReading {
                description: raw.trim().to_string(),
                category: None,
            }
        }
    }
}

/// Parse a cleanup response into a [`CleanedQuery`].
///
/// Malformed output degrades to the raw user text with an unspecific
/// product type.
#[must_use]
pub fn parse_cleaned_query(raw_response: &str, raw_text: &str) -> CleanedQuery {
    let content = strip_code_fences(raw_response);
    match serde_json::from_str::<RawCleanedQuery>(content) {
        Ok(parsed) if !parsed.cleaned_query.trim().is_empty() => CleanedQuery {
            cleaned_query: parsed.cleaned_query,
            product_type: if parsed.product_type.trim().is_empty() {
                "jewellery".to_string()
            } else {
                parsed.product_type.to_lowercase()
            },
        },
        _ => {
            warn!("text cleaner returned malformed JSON, passing raw text through");
            CleanedQuery {
                cleaned_query: raw_text.to_string(),
                product_type: "jewellery".to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fenced_json() {
        let raw = "```json\n{\"type\": \"Ring\"}\n```";
        assert_eq!(strip_code_fences(raw), "{\"type\": \"Ring\"}");

        let raw = "```\n{\"a\": 1}\n```";
        assert_eq!(strip_code_fences(raw), "{\"a\": 1}");

        assert_eq!(strip_code_fences("plain"), "plain");
    }

    #[test]
    fn test_parse_sketch_reading_structured() {
        let raw = r#"{"type": "Ring", "description": "heart shaped diamond ring"}"#;
        let reading = parse_sketch_reading(raw);
        assert_eq!(reading.description, "heart shaped diamond ring");
        assert_eq!(reading.category, Some(StrictCategory::Ring));
    }

    #[test]
    fn test_parse_sketch_reading_unknown_type_unconstrained() {
        let raw = r#"{"type": "Bracelet", "description": "thin band"}"#;
        let reading = parse_sketch_reading(raw);
        assert_eq!(reading.category, None);
    }

    #[test]
    fn test_parse_sketch_reading_malformed_uses_raw() {
        let raw = "a drawing of a flower pendant";
        let reading = parse_sketch_reading(raw);
        assert_eq!(reading.description, raw);
        assert_eq!(reading.category, None);
    }

    #[test]
    fn test_parse_cleaned_query_fallback() {
        let cleaned = parse_cleaned_query("not json at all", "gold neckace");
        assert_eq!(cleaned.cleaned_query, "gold neckace");
        assert_eq!(cleaned.product_type, "jewellery");
    }

    #[test]
    fn test_parse_cleaned_query_structured() {
        let raw = r#"```json
{"product_type": "Necklace", "cleaned_query": "gold necklace"}
```"#;
        let cleaned = parse_cleaned_query(raw, "gold neckace");
        assert_eq!(cleaned.cleaned_query, "gold necklace");
        assert_eq!(cleaned.product_type, "necklace");
    }
}
