use async_trait::async_trait;
use faxgate_protocol::{InterpretationResult, RecoveryMethod};

use crate::error::Result;

/// Intermediate verdict of a single strategy, before the arbiter applies
/// the acceptance threshold and attaches the method.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialResult {
    pub confidence: f32,
    pub matched_context_id: Option<String>,
    pub ambiguous_matches: Vec<String>,
}

impl PartialResult {
    /// The strategy found nothing usable.
    pub fn none() -> Self {
        Self {
            confidence: 0.0,
            matched_context_id: None,
            ambiguous_matches: Vec::new(),
        }
    }

    pub fn matched(confidence: f32, context_id: impl Into<String>) -> Self {
        Self {
            confidence,
            matched_context_id: Some(context_id.into()),
            ambiguous_matches: Vec::new(),
        }
    }

    /// Several candidates, none convincing on its own.
    pub fn ambiguous(confidence: f32, candidates: Vec<String>) -> Self {
        Self {
            confidence,
            matched_context_id: None,
            ambiguous_matches: candidates,
        }
    }
}

/// One recovery strategy over a fresh snapshot of the user's contexts.
///
/// The arbiter walks an ordered list of these and short-circuits on the
/// first accepted result, so implementations must be pure functions of
/// their own store reads: no shared mutable state, no cross-strategy
/// coupling. Adding a strategy is a list insertion, not an arbiter edit.
#[async_trait]
pub trait Resolver: Send + Sync {
    /// Method tag attached to results this strategy produces.
    fn method(&self) -> RecoveryMethod;

    async fn resolve(
        &self,
        interpretation: &InterpretationResult,
        user_id: &str,
    ) -> Result<PartialResult>;
}
