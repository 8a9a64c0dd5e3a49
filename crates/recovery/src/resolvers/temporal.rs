use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use faxgate_protocol::{InterpretationResult, RecoveryMethod};
use faxgate_store::ContextStore;

use crate::config::TemporalBand;
use crate::error::Result;
use crate::resolver::{PartialResult, Resolver};

/// Fallback of last resort: the user's most recently updated conversation,
/// scored by a step function of how long ago it was touched. Deliberately
/// imprecise; ranks lowest in the arbiter's order.
pub struct TemporalProximityResolver {
    store: Arc<dyn ContextStore>,
    lookback_days: i64,
    bands: Vec<TemporalBand>,
    floor: f32,
}

impl TemporalProximityResolver {
    pub fn new(
        store: Arc<dyn ContextStore>,
        lookback_days: i64,
        bands: Vec<TemporalBand>,
        floor: f32,
    ) -> Self {
        Self {
            store,
            lookback_days,
            bands,
            floor,
        }
    }

    fn confidence_for_age(&self, age: Duration) -> f32 {
        for band in &self.bands {
            if age < Duration::hours(band.max_age_hours) {
                return band.confidence;
            }
        }
        self.floor
    }
}

#[async_trait]
impl Resolver for TemporalProximityResolver {
    fn method(&self) -> RecoveryMethod {
        RecoveryMethod::TemporalProximity
    }

    async fn resolve(
        &self,
        _interpretation: &InterpretationResult,
        user_id: &str,
    ) -> Result<PartialResult> {
        let recent = self
            .store
            .find_recent_by_user(user_id, self.lookback_days)
            .await?;

        let Some(latest) = recent.first() else {
            return Ok(PartialResult::none());
        };

        let age = Utc::now() - latest.updated_at;
        let confidence = self.confidence_for_age(age);
        log::debug!(
            "Temporal proximity: context {} last touched {}h ago -> {confidence:.2}",
            latest.id,
            age.num_hours()
        );
        Ok(PartialResult::matched(confidence, latest.id.clone()))
    }
}
