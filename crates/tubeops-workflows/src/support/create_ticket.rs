//! Ticket creation
//!
//! Fully prompted, constructive flow: every field is validated input, so no
//! confirmation gate is needed before the create effect.

use async_trait::async_trait;
use tubeops_core::{
    ChoiceOption, ChoiceStep, Effect, EntityKind, FieldPatch, PromptStep, Workflow,
    WorkflowContext, WorkflowError,
};
use tubeops_store::fields;

/// The `support/create_ticket` workflow
#[derive(Default)]
pub struct CreateTicket;

impl CreateTicket {
    /// New workflow
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Workflow for CreateTicket {
    fn slug(&self) -> &'static str {
        "support/create_ticket"
    }

    fn name(&self) -> &'static str {
        "Create ticket"
    }

    async fn run(&self, ctx: &WorkflowContext) -> Result<(), WorkflowError> {
        let title = ctx.io().prompt(PromptStep::text("Title")).await?;
        let severity = ctx
            .io()
            .choose(ChoiceStep::single(
                "Severity",
                vec![
                    ChoiceOption::new("LOW", "LOW"),
                    ChoiceOption::new("MEDIUM", "MEDIUM"),
                    ChoiceOption::new("HIGH", "HIGH"),
                ],
            ))
            .await?;
        let contact_method = ctx
            .io()
            .choose(ChoiceStep::single(
                "Contact method",
                vec![
                    ChoiceOption::new("EMAIL", "EMAIL"),
                    ChoiceOption::new("CHAT", "CHAT"),
                    ChoiceOption::new("PHONE", "PHONE"),
                ],
            ))
            .await?;
        let description = ctx.io().prompt(PromptStep::rich_text("Description")).await?;

        let receipt = ctx
            .apply(Effect::create(
                EntityKind::SupportTicket,
                FieldPatch::new()
                    .with(
                        fields::TITLE,
                        title.as_text().unwrap_or_default().to_string(),
                    )
                    .with(fields::SEVERITY, severity)
                    .with(fields::CONTACT_METHOD, contact_method)
                    .with(
                        fields::DESCRIPTION,
                        description.as_text().unwrap_or_default().to_string(),
                    ),
            ))
            .await?;

        ctx.reporter()
            .info(format!("Ticket created ({})", receipt.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tubeops_core::ParamBag;
    use tubeops_store::{TicketSeverity, TicketStatus};
    use tubeops_test_utils::{seeded_store, RecordingExecutor, ScriptedOperator};

    #[tokio::test]
    async fn collected_fields_create_an_open_ticket() {
        let (store, _) = seeded_store();
        let workflow = CreateTicket::new();

        let operator = ScriptedOperator::new()
            .then_text("Playback stutters on 4K")
            .then_choice(&["HIGH"])
            .then_choice(&["CHAT"])
            .then_text("Several reports since the player rollout.");

        let effects = Arc::new(RecordingExecutor::over(store.clone()));
        let ctx = WorkflowContext::new(Arc::new(operator), ParamBag::new(), effects.clone());

        workflow.run(&ctx).await.unwrap();

        let ticket = store
            .open_tickets()
            .into_iter()
            .find(|t| t.title == "Playback stutters on 4K")
            .unwrap();
        assert_eq!(ticket.severity, TicketSeverity::High);
        assert_eq!(ticket.status, TicketStatus::Open);
    }
}
