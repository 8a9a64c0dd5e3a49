use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};

/// One recorded audit event.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    pub entity_type: String,
    pub entity_id: String,
    pub operation: String,
    pub details: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

/// Outcome trail for recovery decisions.
///
/// Fire-and-forget from the engine's perspective: a failing sink is logged
/// and must never change a recovery outcome.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(
        &self,
        entity_type: &str,
        entity_id: &str,
        operation: &str,
        details: serde_json::Value,
    ) -> Result<()>;
}

/// Append-only in-memory audit sink.
///
/// `set_failing(true)` makes every `record` call error, which tests use to
/// prove sink failures never block recovery.
#[derive(Default)]
pub struct MemoryAuditSink {
    records: RwLock<Vec<AuditRecord>>,
    failing: AtomicBool,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn records(&self) -> Vec<AuditRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(
        &self,
        entity_type: &str,
        entity_id: &str,
        operation: &str,
        details: serde_json::Value,
    ) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Other("audit sink unavailable".to_string()));
        }

        self.records.write().await.push(AuditRecord {
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            operation: operation.to_string(),
            details,
            recorded_at: Utc::now(),
        });
        Ok(())
    }
}
