use serde::{Deserialize, Serialize};

/// Kind of hand-drawn mark the vision pipeline detected on a reply page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Circle,
    Checkmark,
    Underline,
    Arrow,
}

/// A single visual annotation extracted from a scanned reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub kind: AnnotationKind,

    /// Detection confidence reported by the vision pipeline, in [0, 1].
    pub confidence: f32,

    /// Text the mark is anchored to, when the pipeline could associate any.
    pub associated_text: Option<String>,
}

impl Annotation {
    pub fn new(kind: AnnotationKind, confidence: f32) -> Self {
        Self {
            kind,
            confidence,
            associated_text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.associated_text = Some(text.into());
        self
    }
}

/// Structured output of OCR/vision analysis of one incoming reply.
///
/// Created per fax, never persisted. `reference_id` is populated when the
/// upstream pipeline already spotted a printed reference code; the recovery
/// engine re-scans `extracted_text` otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpretationResult {
    pub extracted_text: String,

    pub reference_id: Option<String>,

    #[serde(default)]
    pub visual_annotations: Vec<Annotation>,

    /// Upstream intent label (free-form; this core routes on context
    /// identity, not intent).
    pub intent: String,

    /// Overall interpretation confidence, in [0, 1].
    pub confidence: f32,
}

impl InterpretationResult {
    pub fn new(extracted_text: impl Into<String>, intent: impl Into<String>) -> Self {
        Self {
            extracted_text: extracted_text.into(),
            reference_id: None,
            visual_annotations: Vec::new(),
            intent: intent.into(),
            confidence: 0.0,
        }
    }

    pub fn reference_id(mut self, code: impl Into<String>) -> Self {
        self.reference_id = Some(code.into());
        self
    }

    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.visual_annotations.push(annotation);
        self
    }

    pub fn confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }
}
