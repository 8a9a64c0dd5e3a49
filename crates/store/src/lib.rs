//! # Faxgate Store
//!
//! Boundary between the recovery engine and conversation persistence.
//!
//! The engine consumes two narrow capabilities, both defined here as
//! object-safe async traits:
//!
//! - [`ContextStore`]: lookup and targeted update of persisted
//!   [`ConversationContext`](faxgate_protocol::ConversationContext) records;
//! - [`AuditSink`]: fire-and-forget recording of recovery outcomes.
//!
//! Context payloads are validated once when they cross this boundary
//! (`ContextState::validate`), so read sites downstream can trust the shape.
//!
//! [`MemoryContextStore`] and [`MemoryAuditSink`] are the in-process
//! reference implementations, used by tests and by embedders that do not
//! bring their own database.

mod audit;
mod context_store;
mod error;

pub use audit::{AuditRecord, AuditSink, MemoryAuditSink};
pub use context_store::{ContextStore, MemoryContextStore};
pub use error::{Result, StoreError};
