//! # Faxgate Protocol
//!
//! Shared data model for the fax conversation recovery pipeline.
//!
//! Fax transport gives us no session affinity: a reply arrives as scanned
//! text plus optional visual annotations, possibly days after the document
//! it answers. These types describe the three stages of correlating it:
//!
//! ```text
//! InterpretationResult          ConversationContext        ContextRecoveryResult
//!  (per incoming reply,    ──>   (persisted threads,   ──>  (which thread, how
//!   produced by OCR/vision)       owned by the store)        sure, or ask again)
//! ```
//!
//! `InterpretationResult` and `ContextRecoveryResult` are ephemeral;
//! `ConversationContext` is owned by the context store and only patched
//! through [`ContextPatch`].

mod context;
mod interpretation;
mod recovery;

pub use context::{
    ContextPatch, ContextState, ContextStatus, ConversationContext, LastInterpretation,
};
pub use interpretation::{Annotation, AnnotationKind, InterpretationResult};
pub use recovery::{ContextRecoveryResult, ContextSummary, DisambiguationRequest, RecoveryMethod};
