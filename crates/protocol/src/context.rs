use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a conversation thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextStatus {
    Active,
    WaitingReply,
    Closed,
}

/// Snapshot of the interpretation that last advanced a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastInterpretation {
    pub intent: String,
    pub confidence: f32,
    pub timestamp: DateTime<Utc>,
}

/// Validated per-conversation payload.
///
/// The wire ancestor of this type was an open-ended JSON object read ad hoc
/// at every call site; here the shape is fixed and checked once at the store
/// boundary (see `faxgate-store`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextState {
    pub status: ContextStatus,

    pub topic: Option<String>,

    /// Letters offered on an outgoing reply form; consulted while the
    /// conversation waits for the user to circle one.
    pub expected_selections: Option<Vec<String>>,

    pub last_interpretation: Option<LastInterpretation>,
}

impl ContextState {
    pub fn new(status: ContextStatus) -> Self {
        Self {
            status,
            topic: None,
            expected_selections: None,
            last_interpretation: None,
        }
    }

    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn expected_selections(mut self, selections: Vec<String>) -> Self {
        self.expected_selections = Some(selections);
        self
    }

    /// Structural validation applied when a context enters the store.
    ///
    /// Each `expected_selections` entry must be a single uppercase letter;
    /// that is what the template-pattern matcher compares circled marks
    /// against. Selections may outlive the `waiting_reply` phase (a
    /// reactivated conversation keeps them as history); only their shape is
    /// enforced here.
    pub fn validate(&self) -> Result<(), String> {
        let Some(selections) = &self.expected_selections else {
            return Ok(());
        };

        if selections.is_empty() {
            return Err("expected_selections must not be empty when present".to_string());
        }

        for entry in selections {
            let mut chars = entry.chars();
            let valid = matches!(
                (chars.next(), chars.next()),
                (Some(c), None) if c.is_ascii_uppercase()
            );
            if !valid {
                return Err(format!(
                    "expected_selections entry {entry:?} is not a single uppercase letter"
                ));
            }
        }

        Ok(())
    }
}

/// A persisted conversation thread awaiting or having received a reply.
///
/// Owned by the context store; the recovery engine reads these and issues
/// targeted [`ContextPatch`] updates only. `expires_at` is the sole
/// lifecycle terminator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub id: String,
    pub user_id: String,
    pub reference_id: Option<String>,
    pub state: ContextState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ConversationContext {
    /// A live context is unexpired and still part of an open exchange.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
            && matches!(
                self.state.status,
                ContextStatus::Active | ContextStatus::WaitingReply
            )
    }
}

/// Sparse update applied through `ContextStore::update`.
///
/// Absent fields leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextPatch {
    pub status: Option<ContextStatus>,
    pub last_interpretation: Option<LastInterpretation>,
    pub expected_selections: Option<Vec<String>>,
}

impl ContextPatch {
    pub fn status(mut self, status: ContextStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn last_interpretation(mut self, snapshot: LastInterpretation) -> Self {
        self.last_interpretation = Some(snapshot);
        self
    }

    pub fn expected_selections(mut self, selections: Vec<String>) -> Self {
        self.expected_selections = Some(selections);
        self
    }
}
