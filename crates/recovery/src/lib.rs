//! # Faxgate Recovery
//!
//! Conversation context recovery and disambiguation for fax replies.
//!
//! Fax transport provides no session affinity: a reply arrives as noisy
//! OCR text with optional visual annotations, hours or days after the
//! document it answers. This crate decides *which* stored conversation the
//! reply continues, or concludes it cannot, and prepares a bounded,
//! letter-indexed clarification round instead of acting on a guess.
//!
//! ## Architecture
//!
//! ```text
//! InterpretationResult
//!     │
//!     ├──> Resolver chain (descending reliability, short-circuit on accept)
//!     │      ├─ ReferenceCodeResolver    exact printed code, 0.95
//!     │      ├─ TemplatePatternResolver  circled reply-form letters
//!     │      ├─ ContentSimilarityResolver keyword Jaccard vs recent topics
//!     │      └─ TemporalProximityResolver recency step function
//!     │
//!     ├──> AmbiguityDetector (only when nothing clears the threshold)
//!     │      └─ 0 or 1 live context -> clean miss; 2+ -> soft ambiguous
//!     │
//!     └──> DisambiguationBuilder
//!            └─ lettered candidates, parseable by the next template round
//! ```
//!
//! The [`RecoveryEngine`] is the single boundary to the outside: it owns
//! the chain, records every terminal outcome through the audit sink, and
//! converts any failure underneath into a zero-confidence miss rather than
//! propagating it.

mod ambiguity;
mod config;
mod disambiguation;
mod engine;
mod error;
mod keywords;
mod resolver;
mod resolvers;
mod similarity;

pub use ambiguity::AmbiguityDetector;
pub use config::{RecoveryConfig, TemporalBand};
pub use disambiguation::DisambiguationBuilder;
pub use engine::RecoveryEngine;
pub use error::{RecoveryError, Result};
pub use keywords::extract_keywords;
pub use resolver::{PartialResult, Resolver};
pub use resolvers::{
    extract_reference_code, ContentSimilarityResolver, ReferenceCodeResolver,
    TemplatePatternResolver, TemporalProximityResolver,
};
pub use similarity::jaccard;
