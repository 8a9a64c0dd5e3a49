use std::sync::Arc;

use chrono::{Duration, Utc};
use faxgate_protocol::{
    Annotation, AnnotationKind, ContextPatch, ContextState, ContextStatus, ConversationContext,
    InterpretationResult, RecoveryMethod,
};
use faxgate_recovery::RecoveryEngine;
use faxgate_store::{ContextStore, MemoryAuditSink, MemoryContextStore};
use pretty_assertions::assert_eq;

fn waiting_context(id: &str, user: &str, topic: &str, updated_ago: Duration) -> ConversationContext {
    let now = Utc::now();
    ConversationContext {
        id: id.to_string(),
        user_id: user.to_string(),
        reference_id: None,
        state: ContextState::new(ContextStatus::WaitingReply).topic(topic),
        created_at: now - updated_ago - Duration::hours(2),
        updated_at: now - updated_ago,
        expires_at: now + Duration::days(14),
    }
}

async fn engine_with(
    contexts: Vec<ConversationContext>,
) -> (RecoveryEngine, Arc<MemoryContextStore>) {
    let store = Arc::new(MemoryContextStore::new());
    for ctx in contexts {
        store.insert(ctx).await.unwrap();
    }
    let engine = RecoveryEngine::new(store.clone(), Arc::new(MemoryAuditSink::new()));
    (engine, store)
}

#[tokio::test]
async fn letters_follow_the_input_order() {
    let (engine, _store) = engine_with(vec![
        waiting_context("ctx-1", "u1", "Toner order", Duration::zero()),
        waiting_context("ctx-2", "u1", "Invoice question", Duration::days(3)),
    ])
    .await;

    let request = engine
        .generate_disambiguation_request(
            &["ctx-1".to_string(), "ctx-2".to_string()],
            "u1",
        )
        .await
        .unwrap();

    assert_eq!(request.context_summaries.len(), 2);
    assert_eq!(request.context_summaries[0].id, "ctx-1");
    assert_eq!(request.context_summaries[1].id, "ctx-2");
    assert!(request.clarification_question.contains("A) Toner order (today)"));
    assert!(request
        .clarification_question
        .contains("B) Invoice question (3 days ago)"));
    assert!(request.clarification_question.contains("circle exactly one"));
}

#[tokio::test]
async fn identical_input_produces_identical_requests() {
    let (engine, _store) = engine_with(vec![
        waiting_context("ctx-1", "u1", "Toner order", Duration::hours(26)),
        waiting_context("ctx-2", "u1", "Invoice question", Duration::days(5)),
    ])
    .await;

    let ids = vec!["ctx-1".to_string(), "ctx-2".to_string()];
    let first = engine.generate_disambiguation_request(&ids, "u1").await.unwrap();
    let second = engine.generate_disambiguation_request(&ids, "u1").await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn vanished_and_foreign_contexts_are_skipped() {
    let (engine, _store) = engine_with(vec![
        waiting_context("ctx-mine", "u1", "Toner order", Duration::hours(3)),
        waiting_context("ctx-theirs", "u2", "Paper order", Duration::hours(4)),
    ])
    .await;

    let ids = vec![
        "ctx-gone".to_string(),
        "ctx-theirs".to_string(),
        "ctx-mine".to_string(),
    ];
    let request = engine.generate_disambiguation_request(&ids, "u1").await.unwrap();

    // Letters continue across the survivors.
    assert_eq!(request.context_summaries.len(), 1);
    assert_eq!(request.context_summaries[0].id, "ctx-mine");
    assert!(request.clarification_question.contains("A) Toner order"));
}

#[tokio::test]
async fn summaries_carry_reference_codes() {
    let mut ctx = waiting_context("ctx-1", "u1", "Toner order", Duration::days(1));
    ctx.reference_id = Some("FX-2024-000123".to_string());
    let (engine, _store) = engine_with(vec![ctx]).await;

    let request = engine
        .generate_disambiguation_request(&["ctx-1".to_string()], "u1")
        .await
        .unwrap();

    assert_eq!(
        request.context_summaries[0].reference_id.as_deref(),
        Some("FX-2024-000123")
    );
    assert_eq!(
        request.context_summaries[0].summary,
        "Toner order (yesterday, ref FX-2024-000123)"
    );
}

#[tokio::test]
async fn offered_letters_resolve_the_next_reply() {
    // Round 1: no usable signal across two waiting conversations.
    let (engine, store) = engine_with(vec![
        waiting_context("ctx-1", "u1", "Toner order", Duration::hours(3)),
        waiting_context("ctx-2", "u1", "Invoice question", Duration::hours(5)),
    ])
    .await;

    let interp = InterpretationResult::new("ok", "unknown");
    let outcome = engine.recover_context(&interp, "u1", None).await;
    assert_eq!(outcome.method, RecoveryMethod::None);
    let ambiguous = outcome.ambiguous_matches.expect("ambiguous candidates");

    // Round 2: the clarification letters become each context's expected
    // selection for the reply form.
    let request = engine
        .generate_disambiguation_request(&ambiguous, "u1")
        .await
        .unwrap();
    for (index, summary) in request.context_summaries.iter().enumerate() {
        let letter = char::from(b'A' + index as u8).to_string();
        store
            .update(
                &summary.id,
                ContextPatch::default().expected_selections(vec![letter]),
            )
            .await
            .unwrap();
    }

    // The user circles B; the template-pattern resolver closes the loop.
    let reply = InterpretationResult::new("as discussed", "form_reply")
        .annotation(Annotation::new(AnnotationKind::Circle, 0.92).with_text("B"));
    let resolved = engine.recover_context(&reply, "u1", None).await;

    assert_eq!(resolved.method, RecoveryMethod::TemplatePattern);
    assert_eq!(
        resolved.matched_context_id,
        Some(request.context_summaries[1].id.clone())
    );
    assert_eq!(resolved.confidence, 1.0);
}
