use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use faxgate_protocol::{
    AnnotationKind, ContextStatus, ConversationContext, InterpretationResult, RecoveryMethod,
};
use faxgate_store::ContextStore;

use crate::error::Result;
use crate::resolver::{PartialResult, Resolver};

// Weighting of the two coverage ratios: how much of what the user circled
// was expected, vs how much of the expected set the user covered.
const CIRCLED_WEIGHT: f32 = 0.6;
const EXPECTED_WEIGHT: f32 = 0.4;

/// Strategy for one specific interaction shape: a previously sent reply
/// form asked the user to circle a single capital letter, and the incoming
/// page carries circle annotations.
pub struct TemplatePatternResolver {
    store: Arc<dyn ContextStore>,
    annotation_confidence: f32,
    match_threshold: f32,
    ambiguous_confidence: f32,
    live_window_days: i64,
}

impl TemplatePatternResolver {
    pub fn new(
        store: Arc<dyn ContextStore>,
        annotation_confidence: f32,
        match_threshold: f32,
        ambiguous_confidence: f32,
        live_window_days: i64,
    ) -> Self {
        Self {
            store,
            annotation_confidence,
            match_threshold,
            ambiguous_confidence,
            live_window_days,
        }
    }

    /// Circled marks that read as a single letter, uppercased.
    fn circled_selections(&self, interpretation: &InterpretationResult) -> Vec<String> {
        interpretation
            .visual_annotations
            .iter()
            .filter(|a| a.kind == AnnotationKind::Circle && a.confidence > self.annotation_confidence)
            .filter_map(|a| {
                let text = a.associated_text.as_deref()?.trim();
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_alphabetic() => {
                        Some(c.to_ascii_uppercase().to_string())
                    }
                    _ => None,
                }
            })
            .collect()
    }

    fn score(circled: &[String], expected: &[String]) -> f32 {
        let valid = circled.iter().filter(|c| expected.contains(c)).count() as f32;
        CIRCLED_WEIGHT * (valid / circled.len() as f32)
            + EXPECTED_WEIGHT * (valid / expected.len() as f32)
    }
}

#[async_trait]
impl Resolver for TemplatePatternResolver {
    fn method(&self) -> RecoveryMethod {
        RecoveryMethod::TemplatePattern
    }

    async fn resolve(
        &self,
        interpretation: &InterpretationResult,
        user_id: &str,
    ) -> Result<PartialResult> {
        let circled = self.circled_selections(interpretation);
        if circled.is_empty() {
            return Ok(PartialResult::none());
        }

        let now = Utc::now();
        let waiting: Vec<ConversationContext> = self
            .store
            .find_recent_by_user(user_id, self.live_window_days)
            .await?
            .into_iter()
            .filter(|c| c.is_live(now) && c.state.status == ContextStatus::WaitingReply)
            .collect();

        let mut winners: Vec<(&ConversationContext, f32)> = Vec::new();
        for context in &waiting {
            let Some(expected) = context
                .state
                .expected_selections
                .as_deref()
                .filter(|e| !e.is_empty())
            else {
                continue;
            };

            let score = Self::score(&circled, expected);
            log::debug!(
                "Template score for context {}: {score:.2} (circled {circled:?})",
                context.id
            );
            if score > self.match_threshold {
                winners.push((context, score));
            }
        }

        if let [(context, score)] = winners.as_slice() {
            return Ok(PartialResult::matched(*score, context.id.clone()));
        }

        if waiting.len() >= 2 {
            // Several conversations are waiting on a circled letter and the
            // marks don't single one out. Surface a soft signal the arbiter
            // will reject, leaving the decision to later strategies or the
            // ambiguity detector.
            let ids = waiting.iter().map(|c| c.id.clone()).collect();
            return Ok(PartialResult::ambiguous(self.ambiguous_confidence, ids));
        }

        Ok(PartialResult::none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn full_agreement_scores_one() {
        let score = TemplatePatternResolver::score(&letters(&["B"]), &letters(&["B"]));
        assert!((score - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn single_valid_pick_among_three_options() {
        // One circled letter, valid; three letters were offered.
        let score = TemplatePatternResolver::score(&letters(&["B"]), &letters(&["A", "B", "C"]));
        let expected = 0.6 * 1.0 + 0.4 * (1.0 / 3.0);
        assert!((score - expected).abs() < 1e-6);
    }

    #[test]
    fn invalid_pick_scores_zero() {
        let score = TemplatePatternResolver::score(&letters(&["Z"]), &letters(&["A", "B"]));
        assert_eq!(score, 0.0);
    }

    #[test]
    fn stray_extra_circle_dilutes_the_score() {
        // User circled B (offered) and also doodled around X.
        let score = TemplatePatternResolver::score(&letters(&["B", "X"]), &letters(&["A", "B"]));
        let expected = 0.6 * 0.5 + 0.4 * 0.5;
        assert!((score - expected).abs() < 1e-6);
    }
}
