use std::sync::Arc;

use chrono::Utc;
use faxgate_protocol::{
    ContextPatch, ContextRecoveryResult, ContextStatus, DisambiguationRequest,
    InterpretationResult, LastInterpretation,
};
use faxgate_store::{AuditSink, ContextStore, StoreError};
use serde_json::json;

use crate::ambiguity::AmbiguityDetector;
use crate::config::RecoveryConfig;
use crate::disambiguation::DisambiguationBuilder;
use crate::error::{RecoveryError, Result};
use crate::resolver::Resolver;
use crate::resolvers::{
    ContentSimilarityResolver, ReferenceCodeResolver, TemplatePatternResolver,
    TemporalProximityResolver,
};

/// Public entry point of the recovery core.
///
/// Holds explicit references to its collaborators (store, audit sink) and
/// an ordered resolver chain; construct one per store, share via `Arc` if
/// needed. `recover_context` never returns an error: every failure below
/// this boundary is normalized to a zero-confidence miss.
pub struct RecoveryEngine {
    store: Arc<dyn ContextStore>,
    audit: Arc<dyn AuditSink>,
    config: RecoveryConfig,
    resolvers: Vec<Box<dyn Resolver>>,
    ambiguity: AmbiguityDetector,
    disambiguation: DisambiguationBuilder,
}

impl RecoveryEngine {
    pub fn new(store: Arc<dyn ContextStore>, audit: Arc<dyn AuditSink>) -> Self {
        Self::assemble(store, audit, RecoveryConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn ContextStore>,
        audit: Arc<dyn AuditSink>,
        config: RecoveryConfig,
    ) -> Result<Self> {
        config.validate().map_err(RecoveryError::InvalidConfig)?;
        Ok(Self::assemble(store, audit, config))
    }

    /// Build the resolver chain in descending reliability order. The
    /// arbiter walks this list front to back; position encodes trust.
    fn assemble(
        store: Arc<dyn ContextStore>,
        audit: Arc<dyn AuditSink>,
        config: RecoveryConfig,
    ) -> Self {
        let resolvers: Vec<Box<dyn Resolver>> = vec![
            Box::new(ReferenceCodeResolver::new(
                store.clone(),
                config.reference_confidence,
            )),
            Box::new(TemplatePatternResolver::new(
                store.clone(),
                config.annotation_confidence,
                config.template_match_threshold,
                config.template_ambiguous_confidence,
                config.live_window_days,
            )),
            Box::new(ContentSimilarityResolver::new(
                store.clone(),
                config.min_similarity_text_len,
                config.similarity_window_days,
                config.max_keywords,
            )),
            Box::new(TemporalProximityResolver::new(
                store.clone(),
                config.temporal_lookback_days,
                config.temporal_bands.clone(),
                config.temporal_floor,
            )),
        ];

        let ambiguity = AmbiguityDetector::new(
            store.clone(),
            config.live_window_days,
            config.ambiguous_confidence,
        );
        let disambiguation = DisambiguationBuilder::new(store.clone());

        Self {
            store,
            audit,
            config,
            resolvers,
            ambiguity,
            disambiguation,
        }
    }

    pub fn config(&self) -> &RecoveryConfig {
        &self.config
    }

    /// Determine which stored conversation a newly arrived reply continues.
    ///
    /// Resolvers run strictly in declared order; the first result whose
    /// confidence clears the acceptance threshold wins and the rest are
    /// skipped; an exact match must beat a later heuristic that happens
    /// to score higher. When nothing clears, the ambiguity detector
    /// produces either a soft-ambiguous outcome or a clean miss. The
    /// terminal outcome, whatever it is, goes to the audit sink.
    pub async fn recover_context(
        &self,
        interpretation: &InterpretationResult,
        user_id: &str,
        fax_job_id: Option<&str>,
    ) -> ContextRecoveryResult {
        match self.arbitrate(interpretation, user_id).await {
            Ok(result) => {
                log::info!(
                    "Recovery for user {user_id}: {:?} at {:.2}",
                    result.method,
                    result.confidence
                );
                let entity_id = result
                    .matched_context_id
                    .clone()
                    .unwrap_or_else(|| user_id.to_string());
                self.record_audit(
                    &entity_id,
                    "context_recovery",
                    json!({
                        "user_id": user_id,
                        "method": result.method,
                        "confidence": result.confidence,
                        "matched_context_id": result.matched_context_id,
                        "ambiguous_matches": result.ambiguous_matches,
                        "fax_job_id": fax_job_id,
                    }),
                )
                .await;
                result
            }
            Err(err) => {
                // Fail safe, not loud: a broken store must surface as "no
                // match" (and eventually a clarification fax), never as an
                // exception acting on a guess.
                log::error!("Context recovery failed for user {user_id}: {err}");
                self.record_audit(
                    user_id,
                    "recovery_error",
                    json!({
                        "user_id": user_id,
                        "error": err.to_string(),
                        "fax_job_id": fax_job_id,
                    }),
                )
                .await;
                ContextRecoveryResult::none()
            }
        }
    }

    async fn arbitrate(
        &self,
        interpretation: &InterpretationResult,
        user_id: &str,
    ) -> Result<ContextRecoveryResult> {
        for resolver in &self.resolvers {
            let partial = resolver.resolve(interpretation, user_id).await?;
            log::debug!(
                "{:?} resolver scored {:.2} for user {user_id}",
                resolver.method(),
                partial.confidence
            );

            if partial.confidence > self.config.acceptance_threshold {
                if let Some(id) = partial.matched_context_id {
                    return Ok(ContextRecoveryResult::matched(
                        resolver.method(),
                        partial.confidence,
                        id,
                    ));
                }
                // A multi-candidate partial is never accepted as a match,
                // whatever its confidence; it falls through like any other
                // rejection.
            }
        }

        self.ambiguity.detect(user_id).await
    }

    /// Turn an ambiguous outcome into the letter-indexed clarification
    /// message for the next outgoing fax.
    pub async fn generate_disambiguation_request(
        &self,
        ambiguous_matches: &[String],
        user_id: &str,
    ) -> Result<DisambiguationRequest> {
        self.disambiguation.build(ambiguous_matches, user_id).await
    }

    /// Reactivate a successfully matched conversation and stamp it with
    /// the interpretation that resolved it. A context that vanished in the
    /// meantime counts as already resolved, not as an error.
    pub async fn update_context_after_recovery(
        &self,
        context_id: &str,
        interpretation: &InterpretationResult,
    ) -> Result<()> {
        if self.store.find_by_id(context_id).await?.is_none() {
            log::debug!("Context {context_id} no longer exists; skipping post-recovery update");
            return Ok(());
        }

        let patch = ContextPatch::default()
            .status(ContextStatus::Active)
            .last_interpretation(LastInterpretation {
                intent: interpretation.intent.clone(),
                confidence: interpretation.confidence,
                timestamp: Utc::now(),
            });

        match self.store.update(context_id, patch).await {
            Ok(()) => Ok(()),
            // Raced with expiry between the lookup and the write.
            Err(StoreError::NotFound(_)) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn record_audit(&self, entity_id: &str, operation: &str, details: serde_json::Value) {
        if let Err(err) = self
            .audit
            .record("conversation_context", entity_id, operation, details)
            .await
        {
            log::warn!("Audit sink failure ignored during {operation}: {err}");
        }
    }
}
