//! End-to-end invocation properties, driven through the runner
//!
//! These tests exercise whole invocations: parameter resolution, redirect
//! following, step execution against a scripted operator, and effects
//! against a live store.

use std::sync::Arc;
use tubeops_core::{
    AdminConfig, Message, ParamBag, WorkflowError, WorkflowRegistry, WorkflowRunner,
};
use tubeops_store::{MemoryStore, TicketStatus, User, UserSearch};
use tubeops_test_utils::{seeded_store, RecordingExecutor, ScriptedOperator};
use tubeops_workflows::registrar::{register_all, WorkflowDeps};

fn runner_over(store: Arc<MemoryStore>) -> WorkflowRunner {
    let deps = WorkflowDeps::from_config(&AdminConfig::default(), Arc::clone(&store)).unwrap();
    let registry = Arc::new(WorkflowRegistry::new());
    register_all(&registry, &deps);
    WorkflowRunner::new(registry, store)
}

#[tokio::test]
async fn unknown_params_are_ignored_and_known_ones_validated() {
    let (store, summary) = seeded_store();
    let runner = runner_over(Arc::clone(&store));

    // unknown key rides along harmlessly; comment_id drives skip-ahead
    let bag = ParamBag::new()
        .with("comment_id", summary.spam_comment.to_string())
        .with("utm_source", "dashboard");

    let operator = Arc::new(ScriptedOperator::new().then_choice(&["mark-spam"]));
    let message = runner
        .invoke("moderate_comment", bag, operator)
        .await
        .unwrap();

    assert!(message.body.contains("Moderation complete"));
    assert!(store.comment(summary.spam_comment).unwrap().is_spam);
}

#[tokio::test]
async fn mark_spam_is_idempotent_across_invocations() {
    let (store, summary) = seeded_store();
    let runner = runner_over(Arc::clone(&store));

    for _ in 0..2 {
        let operator = Arc::new(ScriptedOperator::new().then_choice(&["mark-spam"]));
        runner
            .invoke(
                "moderate_comment",
                ParamBag::new().with("comment_id", summary.spam_comment.to_string()),
                operator,
            )
            .await
            .unwrap();
    }

    assert!(store.comment(summary.spam_comment).unwrap().is_spam);
}

#[tokio::test]
async fn ticket_close_is_one_way() {
    let (store, summary) = seeded_store();
    let runner = runner_over(Arc::clone(&store));

    let first: Message = runner
        .invoke(
            "support/close_ticket",
            ParamBag::new().with("ticket_id", summary.open_ticket.to_string()),
            Arc::new(ScriptedOperator::new().then_confirm(true)),
        )
        .await
        .unwrap();
    assert_eq!(first.body, "Ticket closed");

    // the second close must be a zero-effect informational no-op
    let effects = Arc::new(RecordingExecutor::over(store.clone()));
    let gated = WorkflowRunner::new(Arc::clone(runner.registry()), effects.clone());
    let second = gated
        .invoke(
            "support/close_ticket",
            ParamBag::new().with("ticket_id", summary.open_ticket.to_string()),
            Arc::new(ScriptedOperator::new()),
        )
        .await
        .unwrap();

    assert_eq!(second.body, "This ticket is already closed");
    assert_eq!(effects.count(), 0);
    assert_eq!(
        store.ticket(summary.open_ticket).unwrap().status,
        TicketStatus::Closed
    );
}

#[tokio::test]
async fn onboarding_redirect_carries_details_into_the_pro_flow() {
    let (store, _) = seeded_store();
    let runner = runner_over(Arc::clone(&store));

    // basic onboarding answers, then the pro flow starts at plan selection
    // because name/email ride the redirect bag
    let operator = Arc::new(
        ScriptedOperator::new()
            .then_text("Mina Kovacs")
            .then_text("mina@viewtube.example")
            .then_bool(true) // professional? -> redirect
            .then_choice(&["diamond"])
            .then_date(chrono::NaiveDate::from_ymd_opt(1991, 6, 2).unwrap())
            .then_text("https://mina.example")
            .then_text("Color grading deep dives")
            .then_files(vec![tubeops_core::FileRef::new("logo.png", 2_048)])
            .then_files(vec![tubeops_core::FileRef::new("cover.jpg", 4_096)]),
    );

    let message = runner
        .invoke("users/onboard", ParamBag::new(), operator)
        .await
        .unwrap();
    assert!(message.body.contains("diamond"));

    let user = store.user_by_email("mina@viewtube.example").unwrap();
    assert!(user.can_upload);
    assert_eq!(user.max_upload_duration, Some(10_000));
}

#[tokio::test]
async fn flag_editor_issues_exactly_one_update() {
    let (store, _) = seeded_store();
    let deps = WorkflowDeps::from_config(&AdminConfig::default(), Arc::clone(&store)).unwrap();
    let registry = Arc::new(WorkflowRegistry::new());
    register_all(&registry, &deps);

    let effects = Arc::new(RecordingExecutor::over(store.clone()));
    let runner = WorkflowRunner::new(registry, effects.clone());

    let operator = Arc::new(
        ScriptedOperator::new()
            .then_choice(&[]) // enabled table: nothing
            .then_choice(&["live-chat"]) // disabled table: one flag
            .then_choice(&["Enabled"])
            .then_number(25.0)
            .then_choice(&["STAGING"]),
    );

    runner
        .invoke("feature_flags", ParamBag::new(), operator)
        .await
        .unwrap();

    assert_eq!(effects.count(), 1);
    let flag = store.flag("live-chat").unwrap();
    assert!(flag.is_enabled);
    assert_eq!(flag.rollout_percentage, 25);
}

#[tokio::test]
async fn search_results_stay_capped_with_many_matching_rows() {
    let store = Arc::new(MemoryStore::new());
    for i in 0..100 {
        let mut user = User::new(format!("creator{i}@viewtube.example"));
        user.name = Some(format!("Creator {i:03}"));
        store.insert_user(user);
    }

    let locator = tubeops_core::EntityLocator::new(Arc::new(UserSearch(Arc::clone(&store))));
    let candidates = locator.candidates("creator").await.unwrap();
    assert_eq!(candidates.len(), tubeops_core::DEFAULT_SEARCH_LIMIT);
    // documented order: ascending id, i.e. insertion order
    assert_eq!(candidates[0].label, "Creator 000");
}

#[tokio::test]
async fn invalid_parameter_type_fails_before_any_step() {
    let (store, _) = seeded_store();
    let runner = runner_over(Arc::clone(&store));

    // verified_only declared as Bool
    let err = runner
        .invoke(
            "users",
            ParamBag::new().with("verified_only", "sometimes"),
            Arc::new(ScriptedOperator::new()),
        )
        .await
        .unwrap_err();

    match err {
        WorkflowError::Validation { field, .. } => assert_eq!(field, "verified_only"),
        other => panic!("unexpected error: {other}"),
    }
}
