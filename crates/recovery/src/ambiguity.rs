use std::sync::Arc;

use chrono::Utc;
use faxgate_protocol::ContextRecoveryResult;
use faxgate_store::ContextStore;

use crate::error::Result;

/// Terminal check once every strategy has come up short: is there anything
/// worth asking the user to choose between?
pub struct AmbiguityDetector {
    store: Arc<dyn ContextStore>,
    live_window_days: i64,
    ambiguous_confidence: f32,
}

impl AmbiguityDetector {
    pub fn new(store: Arc<dyn ContextStore>, live_window_days: i64, ambiguous_confidence: f32) -> Self {
        Self {
            store,
            live_window_days,
            ambiguous_confidence,
        }
    }

    /// Zero or one live context: a clean miss, nothing to disambiguate.
    /// Two or more: a soft-ambiguous outcome carrying their ids in store
    /// order, at the sentinel confidence so callers can tell "found
    /// several, pick one" apart from "found nothing".
    pub async fn detect(&self, user_id: &str) -> Result<ContextRecoveryResult> {
        let now = Utc::now();
        let live_ids: Vec<String> = self
            .store
            .find_recent_by_user(user_id, self.live_window_days)
            .await?
            .into_iter()
            .filter(|c| c.is_live(now))
            .map(|c| c.id)
            .collect();

        if live_ids.len() < 2 {
            return Ok(ContextRecoveryResult::none());
        }

        log::info!(
            "Recovery for user {user_id} is ambiguous across {} live contexts",
            live_ids.len()
        );
        Ok(ContextRecoveryResult::ambiguous(
            self.ambiguous_confidence,
            live_ids,
        ))
    }
}
