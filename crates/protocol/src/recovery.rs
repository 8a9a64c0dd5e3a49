use serde::{Deserialize, Serialize};

/// Strategy that produced a recovery outcome, in descending reliability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryMethod {
    ReferenceId,
    TemplatePattern,
    ContentSimilarity,
    TemporalProximity,
    None,
}

/// Outcome of one recovery attempt, returned synchronously to the caller.
///
/// Exactly one of three shapes:
/// - a claimed match (`matched_context_id` set, method names the strategy),
/// - a soft-ambiguous outcome (method `none`, `ambiguous_matches` set), or
/// - a clean miss (method `none`, confidence 0, nothing else set).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextRecoveryResult {
    pub method: RecoveryMethod,

    /// In [0, 1] for every input and store state.
    pub confidence: f32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_context_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ambiguous_matches: Option<Vec<String>>,
}

impl ContextRecoveryResult {
    pub fn matched(method: RecoveryMethod, confidence: f32, context_id: impl Into<String>) -> Self {
        Self {
            method,
            confidence,
            matched_context_id: Some(context_id.into()),
            ambiguous_matches: None,
        }
    }

    pub fn ambiguous(confidence: f32, candidates: Vec<String>) -> Self {
        Self {
            method: RecoveryMethod::None,
            confidence,
            matched_context_id: None,
            ambiguous_matches: Some(candidates),
        }
    }

    pub fn none() -> Self {
        Self {
            method: RecoveryMethod::None,
            confidence: 0.0,
            matched_context_id: None,
            ambiguous_matches: None,
        }
    }
}

/// One candidate offered to the user during a disambiguation round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextSummary {
    pub id: String,

    /// Human-readable one-liner: topic plus how long ago it was active.
    pub summary: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
}

/// Clarification message sent back when no single context could be claimed.
///
/// The lettered options are machine-parseable on the next round trip: they
/// become the `expected_selections` the template-pattern matcher checks
/// circled marks against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisambiguationRequest {
    pub clarification_question: String,
    pub context_summaries: Vec<ContextSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_serializes_snake_case() {
        let json = serde_json::to_string(&RecoveryMethod::TemporalProximity).unwrap();
        assert_eq!(json, "\"temporal_proximity\"");
    }

    #[test]
    fn none_result_omits_optional_fields() {
        let json = serde_json::to_string(&ContextRecoveryResult::none()).unwrap();
        assert!(!json.contains("matched_context_id"), "{json}");
        assert!(!json.contains("ambiguous_matches"), "{json}");
    }

    #[test]
    fn matched_result_carries_context_id() {
        let result = ContextRecoveryResult::matched(RecoveryMethod::ReferenceId, 0.95, "ctx-7");
        assert_eq!(result.matched_context_id.as_deref(), Some("ctx-7"));
        assert_eq!(result.ambiguous_matches, None);
    }
}
