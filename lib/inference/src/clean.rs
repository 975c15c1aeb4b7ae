//! Query-cleanup guardrail.
//!
//! The cleanup model occasionally drops the one token that matters most:
//! the product type the user actually asked for. The guardrail re-checks
//! the raw text and force-appends any known product-type token the model
//! lost. This repair is part of the cleanup contract, not an optional
//! nicety - every [`crate::TextCleaner`] implementation runs it.

use crate::traits::CleanedQuery;
use tracing::debug;
use vitrine_core::KNOWN_PRODUCT_TYPES;

/// Append every known product-type token that appears in `raw_text` but
/// is missing from the cleaned query.
pub fn apply_category_guardrail(raw_text: &str, cleaned: &mut CleanedQuery) {
    let raw_lower = raw_text.to_lowercase();
    let mut cleaned_lower = cleaned.cleaned_query.to_lowercase();

    for token in KNOWN_PRODUCT_TYPES {
        if raw_lower.contains(token) && !cleaned_lower.contains(token) {
            debug!(token, "guardrail: restoring product type to cleaned query");
            let query = cleaned.cleaned_query.trim_end().to_string();
            cleaned.cleaned_query = format!("{} {}", query, token);
            cleaned_lower = cleaned.cleaned_query.to_lowercase();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cleaned(query: &str) -> CleanedQuery {
        CleanedQuery {
            cleaned_query: query.to_string(),
            product_type: "jewellery".to_string(),
        }
    }

    #[test]
    fn test_restores_dropped_token() {
        let mut c = cleaned("gold with ruby");
        apply_category_guardrail("gold ring with ruby", &mut c);
        assert_eq!(c.cleaned_query, "gold with ruby ring");
    }

    #[test]
    fn test_keeps_present_token() {
        let mut c = cleaned("gold necklace");
        apply_category_guardrail("gold neckace", &mut c);
        // "necklace" was not in the raw typo text, nothing to restore
        assert_eq!(c.cleaned_query, "gold necklace");
    }

    #[test]
    fn test_noop_when_already_complete() {
        let mut c = cleaned("heart shaped ring");
        apply_category_guardrail("heart shaped ring", &mut c);
        assert_eq!(c.cleaned_query, "heart shaped ring");
    }

    #[test]
    fn test_restores_multiple_tokens() {
        let mut c = cleaned("gold set");
        apply_category_guardrail("gold ring and pendant set", &mut c);
        assert!(c.cleaned_query.contains("ring"));
        assert!(c.cleaned_query.contains("pendant"));
    }
}
