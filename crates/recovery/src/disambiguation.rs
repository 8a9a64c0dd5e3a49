use std::sync::Arc;

use chrono::{DateTime, Utc};
use faxgate_protocol::{ContextSummary, ConversationContext, DisambiguationRequest};
use faxgate_store::ContextStore;

use crate::error::Result;

// Fax reply forms index options by single letters, so one round offers at
// most the alphabet.
const MAX_OPTIONS: usize = 26;

/// Builds the letter-indexed clarification message for an ambiguous
/// outcome.
///
/// Letters follow the caller's id order (A is the first id, B the second,
/// ...), so the same ordered list against unchanged contexts always
/// produces the same message. The letters are what the next reply's
/// template-pattern round parses back.
pub struct DisambiguationBuilder {
    store: Arc<dyn ContextStore>,
}

impl DisambiguationBuilder {
    pub fn new(store: Arc<dyn ContextStore>) -> Self {
        Self { store }
    }

    pub async fn build(
        &self,
        ambiguous_matches: &[String],
        user_id: &str,
    ) -> Result<DisambiguationRequest> {
        if ambiguous_matches.len() > MAX_OPTIONS {
            log::warn!(
                "Disambiguation round truncated from {} to {MAX_OPTIONS} candidates",
                ambiguous_matches.len()
            );
        }

        let now = Utc::now();
        let mut summaries = Vec::new();
        let mut lines = Vec::new();

        for id in ambiguous_matches {
            if summaries.len() == MAX_OPTIONS {
                break;
            }

            let Some(context) = self.store.find_by_id(id).await? else {
                // Already resolved or expired between detection and this
                // round; offer the survivors.
                log::debug!("Skipping vanished context {id} in disambiguation");
                continue;
            };
            if context.user_id != user_id {
                log::warn!("Skipping context {id} owned by another user in disambiguation");
                continue;
            }

            let letter = (b'A' + summaries.len() as u8) as char;
            let summary = summarize(&context, now);
            lines.push(format!("  {letter}) {summary}"));
            summaries.push(ContextSummary {
                id: context.id,
                summary,
                reference_id: context.reference_id,
            });
        }

        let clarification_question = format!(
            "We received your fax but could not tell which conversation it continues.\n\
             Please circle exactly one of the letters below and fax this page back\n\
             together with your original message:\n\n{}\n",
            lines.join("\n")
        );

        Ok(DisambiguationRequest {
            clarification_question,
            context_summaries: summaries,
        })
    }
}

/// One-line description the user can recognize a conversation by: topic,
/// how long ago it was active, and its printed reference code if any.
fn summarize(context: &ConversationContext, now: DateTime<Utc>) -> String {
    let topic = context.state.topic.as_deref().unwrap_or("Unknown topic");
    let when = relative_day(context.updated_at, now);
    match &context.reference_id {
        Some(code) => format!("{topic} ({when}, ref {code})"),
        None => format!("{topic} ({when})"),
    }
}

fn relative_day(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now.date_naive() - then.date_naive()).num_days();
    match days {
        d if d <= 0 => "today".to_string(),
        1 => "yesterday".to_string(),
        d => format!("{d} days ago"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use faxgate_protocol::{ContextState, ContextStatus};
    use pretty_assertions::assert_eq;

    #[test]
    fn relative_day_qualifiers() {
        let now = Utc::now();
        assert_eq!(relative_day(now, now), "today");
        assert_eq!(relative_day(now - Duration::days(1), now), "yesterday");
        assert_eq!(relative_day(now - Duration::days(4), now), "4 days ago");
    }

    #[test]
    fn summary_includes_topic_and_reference() {
        let now = Utc::now();
        let context = ConversationContext {
            id: "ctx-1".to_string(),
            user_id: "u1".to_string(),
            reference_id: Some("FX-2024-000123".to_string()),
            state: ContextState::new(ContextStatus::Active).topic("Toner order"),
            created_at: now - Duration::days(2),
            updated_at: now - Duration::days(1),
            expires_at: now + Duration::days(13),
        };
        assert_eq!(
            summarize(&context, now),
            "Toner order (yesterday, ref FX-2024-000123)"
        );
    }

    #[test]
    fn missing_topic_reads_unknown() {
        let now = Utc::now();
        let context = ConversationContext {
            id: "ctx-1".to_string(),
            user_id: "u1".to_string(),
            reference_id: None,
            state: ContextState::new(ContextStatus::Active),
            created_at: now,
            updated_at: now,
            expires_at: now + Duration::days(14),
        };
        assert_eq!(summarize(&context, now), "Unknown topic (today)");
    }
}
