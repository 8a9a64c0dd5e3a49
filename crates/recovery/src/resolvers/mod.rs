mod content;
mod reference;
mod template;
mod temporal;

pub use content::ContentSimilarityResolver;
pub use reference::{extract_reference_code, ReferenceCodeResolver};
pub use template::TemplatePatternResolver;
pub use temporal::TemporalProximityResolver;
