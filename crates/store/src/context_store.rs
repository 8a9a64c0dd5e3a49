use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use faxgate_protocol::{ContextPatch, ConversationContext};
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};

/// Read/update access to persisted conversation contexts.
///
/// The store is externally consistent; callers perform no locking or
/// retries. `find_recent_by_user` must return a stable order (most recently
/// updated first); the disambiguation protocol leans on it.
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Exact lookup by printed reference code.
    async fn find_by_reference_id(&self, code: &str) -> Result<Option<ConversationContext>>;

    /// Contexts for `user_id` updated within the last `days` days, most
    /// recently updated first.
    async fn find_recent_by_user(&self, user_id: &str, days: i64)
        -> Result<Vec<ConversationContext>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<ConversationContext>>;

    /// Apply a sparse patch; bumps `updated_at`.
    async fn update(&self, id: &str, patch: ContextPatch) -> Result<()>;
}

/// In-memory `ContextStore` over a `tokio` RwLock-guarded map.
#[derive(Default)]
pub struct MemoryContextStore {
    contexts: RwLock<HashMap<String, ConversationContext>>,
}

impl MemoryContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a context, validating its payload at the boundary.
    pub async fn insert(&self, context: ConversationContext) -> Result<()> {
        context
            .state
            .validate()
            .map_err(StoreError::InvalidState)?;

        log::info!("Storing context {} for user {}", context.id, context.user_id);
        self.contexts
            .write()
            .await
            .insert(context.id.clone(), context);
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.contexts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.contexts.read().await.is_empty()
    }
}

#[async_trait]
impl ContextStore for MemoryContextStore {
    async fn find_by_reference_id(&self, code: &str) -> Result<Option<ConversationContext>> {
        let contexts = self.contexts.read().await;
        let mut matches: Vec<&ConversationContext> = contexts
            .values()
            .filter(|c| c.reference_id.as_deref() == Some(code))
            .collect();

        // Reference codes are unique in practice; keep the pick
        // deterministic anyway.
        matches.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        Ok(matches.first().map(|c| (*c).clone()))
    }

    async fn find_recent_by_user(
        &self,
        user_id: &str,
        days: i64,
    ) -> Result<Vec<ConversationContext>> {
        let cutoff = Utc::now() - Duration::days(days);
        let contexts = self.contexts.read().await;

        let mut recent: Vec<ConversationContext> = contexts
            .values()
            .filter(|c| c.user_id == user_id && c.updated_at >= cutoff)
            .cloned()
            .collect();

        recent.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));

        log::debug!(
            "find_recent_by_user({user_id}, {days}d) -> {} contexts",
            recent.len()
        );
        Ok(recent)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ConversationContext>> {
        Ok(self.contexts.read().await.get(id).cloned())
    }

    async fn update(&self, id: &str, patch: ContextPatch) -> Result<()> {
        let mut contexts = self.contexts.write().await;
        let context = contexts
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let mut state = context.state.clone();
        if let Some(status) = patch.status {
            state.status = status;
        }
        if let Some(snapshot) = patch.last_interpretation {
            state.last_interpretation = Some(snapshot);
        }
        if let Some(selections) = patch.expected_selections {
            state.expected_selections = Some(selections);
        }

        state.validate().map_err(StoreError::InvalidState)?;

        context.state = state;
        context.updated_at = Utc::now();

        log::info!("Updated context {id}");
        Ok(())
    }
}
