//! Operator notes
//!
//! Attach a rich-text note to a user, stamped with the operator's email.

use crate::helpers::require_user;
use async_trait::async_trait;
use std::sync::Arc;
use tubeops_core::{
    Effect, EntityKind, FieldPatch, FieldSpec, ParamKind, ParamShape, PromptStep, Workflow,
    WorkflowContext, WorkflowError,
};
use tubeops_store::{fields, MemoryStore};

/// The `users/add_note` workflow
pub struct AddUserNote {
    store: Arc<MemoryStore>,
}

impl AddUserNote {
    /// Workflow over a store
    #[must_use]
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Workflow for AddUserNote {
    fn slug(&self) -> &'static str {
        "users/add_note"
    }

    fn name(&self) -> &'static str {
        "Add user note"
    }

    fn unlisted(&self) -> bool {
        true
    }

    fn params(&self) -> ParamShape {
        ParamShape::of(vec![FieldSpec::resolvable("user_id", ParamKind::String)])
    }

    async fn run(&self, ctx: &WorkflowContext) -> Result<(), WorkflowError> {
        let user = require_user(ctx, &self.store).await?;

        let content = ctx
            .io()
            .prompt(
                PromptStep::rich_text("Content")
                    .with_help("Your email will be saved along with this note."),
            )
            .await?;

        ctx.apply(Effect::create(
            EntityKind::UserNote,
            FieldPatch::new()
                .with(fields::USER_ID, user.id.to_string())
                .with(
                    fields::CONTENT,
                    content.as_text().unwrap_or_default().to_string(),
                )
                .with(fields::AUTHOR_EMAIL, ctx.operator().email),
        ))
        .await?;

        ctx.reporter()
            .info(format!("Note added for {}", user.display_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubeops_core::ParamBag;
    use tubeops_test_utils::{seeded_store, RecordingExecutor, ScriptedOperator};

    #[tokio::test]
    async fn note_is_stamped_with_the_operator_email() {
        let (store, summary) = seeded_store();
        let workflow = AddUserNote::new(Arc::clone(&store));

        let operator = ScriptedOperator::new()
            .with_email("reviewer@viewtube.example")
            .then_text("Requested an invoice copy by phone.");

        let effects = Arc::new(RecordingExecutor::over(store.clone()));
        let ctx = WorkflowContext::new(
            Arc::new(operator),
            ParamBag::new().with("user_id", summary.creator.to_string()),
            effects.clone(),
        );

        workflow.run(&ctx).await.unwrap();

        let notes = store.notes_for_user(summary.creator);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].author_email, "reviewer@viewtube.example");
        assert!(notes[0].content.contains("invoice"));
    }

    #[tokio::test]
    async fn search_path_locates_the_user() {
        let (store, summary) = seeded_store();
        let workflow = AddUserNote::new(Arc::clone(&store));

        let operator = ScriptedOperator::new()
            .then_text("Rivka") // search query
            .then_choice(&[&summary.creator.to_string()])
            .then_text("Verified identity over video call.");

        let effects = Arc::new(RecordingExecutor::over(store.clone()));
        let ctx = WorkflowContext::new(Arc::new(operator), ParamBag::new(), effects.clone());

        workflow.run(&ctx).await.unwrap();
        assert_eq!(store.notes_for_user(summary.creator).len(), 1);
    }
}
