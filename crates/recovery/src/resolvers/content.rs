use std::sync::Arc;

use async_trait::async_trait;
use faxgate_protocol::{InterpretationResult, RecoveryMethod};
use faxgate_store::ContextStore;

use crate::error::Result;
use crate::keywords::extract_keywords;
use crate::resolver::{PartialResult, Resolver};
use crate::similarity::jaccard;

/// Lexical-overlap strategy: keyword Jaccard between the incoming text and
/// each recently updated conversation.
///
/// Always reports its best candidate when one exists, however weak; the
/// arbiter owns the acceptance threshold, not this resolver.
pub struct ContentSimilarityResolver {
    store: Arc<dyn ContextStore>,
    min_text_len: usize,
    window_days: i64,
    max_keywords: usize,
}

impl ContentSimilarityResolver {
    pub fn new(
        store: Arc<dyn ContextStore>,
        min_text_len: usize,
        window_days: i64,
        max_keywords: usize,
    ) -> Self {
        Self {
            store,
            min_text_len,
            window_days,
            max_keywords,
        }
    }
}

#[async_trait]
impl Resolver for ContentSimilarityResolver {
    fn method(&self) -> RecoveryMethod {
        RecoveryMethod::ContentSimilarity
    }

    async fn resolve(
        &self,
        interpretation: &InterpretationResult,
        user_id: &str,
    ) -> Result<PartialResult> {
        if interpretation.extracted_text.chars().count() < self.min_text_len {
            // Too little signal to score overlap meaningfully.
            return Ok(PartialResult::none());
        }

        let incoming = extract_keywords(&interpretation.extracted_text, self.max_keywords);
        if incoming.is_empty() {
            return Ok(PartialResult::none());
        }

        let candidates = self
            .store
            .find_recent_by_user(user_id, self.window_days)
            .await?;

        let mut best: Option<(f32, String)> = None;
        for context in &candidates {
            let mut corpus = context.state.topic.clone().unwrap_or_default();
            if let Ok(json) = serde_json::to_string(&context.state) {
                corpus.push(' ');
                corpus.push_str(&json);
            }

            let candidate_keywords = extract_keywords(&corpus, self.max_keywords);
            if candidate_keywords.is_empty() {
                continue;
            }

            let score = jaccard(&incoming, &candidate_keywords);
            log::debug!("Content similarity for context {}: {score:.2}", context.id);

            // Strict greater-than keeps the most recently updated candidate
            // on ties (candidates arrive most recent first).
            if best.as_ref().map_or(true, |(top, _)| score > *top) {
                best = Some((score, context.id.clone()));
            }
        }

        Ok(match best {
            Some((score, id)) => PartialResult::matched(score, id),
            None => PartialResult::none(),
        })
    }
}
