use std::sync::Arc;

use async_trait::async_trait;
use faxgate_protocol::{InterpretationResult, RecoveryMethod};
use faxgate_store::ContextStore;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::Result;
use crate::resolver::{PartialResult, Resolver};

/// Ordered extraction patterns for printed reference codes
/// (`FX-YYYY-NNNNNN`). Labeled forms are tried before the bare code so a
/// page quoting several codes resolves to the one the user pointed at.
static REFERENCE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\bref(?:erence)?\s*[:#]?\s*(FX-\d{4}-\d{6})",
        r"(?i)\border\s*[:#]?\s*(FX-\d{4}-\d{6})",
        r"(?i)\bticket\s*[:#]?\s*(FX-\d{4}-\d{6})",
        r"(?i)\bcase\s*[:#]?\s*(FX-\d{4}-\d{6})",
        r"(?i)\b(FX-\d{4}-\d{6})\b",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("reference pattern compiles"))
    .collect()
});

/// First reference code found in `text`, normalized to uppercase.
pub fn extract_reference_code(text: &str) -> Option<String> {
    REFERENCE_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|code| code.as_str().to_uppercase())
    })
}

/// Exact-key strategy: locate a printed reference code and look the
/// conversation up by it. Binary: either an owned match at the configured
/// confidence, or nothing.
pub struct ReferenceCodeResolver {
    store: Arc<dyn ContextStore>,
    confidence: f32,
}

impl ReferenceCodeResolver {
    pub fn new(store: Arc<dyn ContextStore>, confidence: f32) -> Self {
        Self { store, confidence }
    }
}

#[async_trait]
impl Resolver for ReferenceCodeResolver {
    fn method(&self) -> RecoveryMethod {
        RecoveryMethod::ReferenceId
    }

    async fn resolve(
        &self,
        interpretation: &InterpretationResult,
        user_id: &str,
    ) -> Result<PartialResult> {
        let code = interpretation
            .reference_id
            .clone()
            .or_else(|| extract_reference_code(&interpretation.extracted_text));

        let Some(code) = code else {
            return Ok(PartialResult::none());
        };

        let Some(context) = self.store.find_by_reference_id(&code).await? else {
            log::debug!("Reference code {code} matches no stored context");
            return Ok(PartialResult::none());
        };

        if context.user_id != user_id {
            // A code pointing into another user's conversation is treated
            // as no match, never as a cross-user hit.
            log::warn!("Reference code {code} belongs to a different user; ignoring");
            return Ok(PartialResult::none());
        }

        log::debug!("Reference code {code} resolves to context {}", context.id);
        Ok(PartialResult::matched(self.confidence, context.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn labeled_forms_win_over_bare_codes() {
        let text = "Earlier code FX-2024-000001 is void. Ref: FX-2024-000123";
        assert_eq!(
            extract_reference_code(text).as_deref(),
            Some("FX-2024-000123")
        );
    }

    #[test]
    fn bare_code_is_found_as_fallback() {
        assert_eq!(
            extract_reference_code("please see FX-2024-000456 above").as_deref(),
            Some("FX-2024-000456")
        );
    }

    #[test]
    fn codes_are_case_normalized() {
        assert_eq!(
            extract_reference_code("ref fx-2024-000789").as_deref(),
            Some("FX-2024-000789")
        );
    }

    #[test]
    fn label_variants_parse() {
        for text in [
            "Reference: FX-2024-000123",
            "ref # FX-2024-000123",
            "Order FX-2024-000123",
            "ticket: FX-2024-000123",
            "Case #FX-2024-000123",
        ] {
            assert_eq!(
                extract_reference_code(text).as_deref(),
                Some("FX-2024-000123"),
                "failed on {text:?}"
            );
        }
    }

    #[test]
    fn malformed_codes_are_ignored() {
        assert_eq!(extract_reference_code("FX-24-000123"), None);
        assert_eq!(extract_reference_code("FX-2024-00123"), None);
        assert_eq!(extract_reference_code("no codes here"), None);
    }
}
