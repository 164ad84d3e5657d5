//! Ticket closing
//!
//! One-way OPEN → CLOSED transition. A ticket that is already closed
//! finishes with an informational message and issues zero effects — an
//! incompatible state is a no-op here, not an error.

use async_trait::async_trait;
use std::sync::Arc;
use tubeops_core::{
    ConfirmStep, Effect, EntityKind, EntityLocator, FieldPatch, FieldSpec, MetadataEntry,
    ParamKind, ParamShape, Workflow, WorkflowContext, WorkflowError,
};
use tubeops_store::{fields, MemoryStore, SupportTicket, TicketId, TicketSearch, TicketStatus};

/// The `support/close_ticket` workflow
pub struct CloseTicket {
    store: Arc<MemoryStore>,
}

impl CloseTicket {
    /// Workflow over a store
    #[must_use]
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    async fn resolve_ticket(
        &self,
        ctx: &WorkflowContext,
    ) -> Result<SupportTicket, WorkflowError> {
        match ctx.params().get_str("ticket_id") {
            Some(raw) => TicketId::parse(raw)
                .and_then(|id| self.store.ticket(id))
                .ok_or_else(|| WorkflowError::not_found("support_ticket", raw)),
            None => {
                let locator =
                    EntityLocator::new(Arc::new(TicketSearch(Arc::clone(&self.store))));
                let candidate = locator.locate(ctx.io(), "Select the ticket to close").await?;
                TicketId::parse(&candidate.id)
                    .and_then(|id| self.store.ticket(id))
                    .ok_or_else(|| WorkflowError::not_found("support_ticket", candidate.id))
            }
        }
    }
}

#[async_trait]
impl Workflow for CloseTicket {
    fn slug(&self) -> &'static str {
        "support/close_ticket"
    }

    fn name(&self) -> &'static str {
        "Close ticket"
    }

    fn params(&self) -> ParamShape {
        ParamShape::of(vec![FieldSpec::optional("ticket_id", ParamKind::String)])
    }

    async fn run(&self, ctx: &WorkflowContext) -> Result<(), WorkflowError> {
        let ticket = self.resolve_ticket(ctx).await?;

        if ticket.status == TicketStatus::Closed {
            return ctx.reporter().info("This ticket is already closed");
        }

        ctx.io()
            .metadata(
                "Ticket",
                vec![
                    MetadataEntry::new("Id", ticket.id.to_string()),
                    MetadataEntry::new("Title", &ticket.title),
                    MetadataEntry::new("Description", &ticket.description),
                    MetadataEntry::new("Severity", ticket.severity.as_str()),
                    MetadataEntry::new("Contact method", ticket.contact_method.as_str()),
                    MetadataEntry::new("Status", ticket.status.as_str()),
                    MetadataEntry::new("Created", ticket.created_at.to_rfc3339()),
                ],
            )
            .await?;

        let confirmed = ctx
            .io()
            .confirm(ConfirmStep::new(
                "Are you sure you want to close this ticket?",
            ))
            .await?;

        if confirmed {
            ctx.apply(Effect::update(
                EntityKind::SupportTicket,
                ticket.id.to_string(),
                FieldPatch::new().with(fields::STATUS, TicketStatus::Closed.as_str()),
            ))
            .await?;
            ctx.reporter().info("Ticket closed")
        } else {
            ctx.reporter().info("Cancelled")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubeops_core::ParamBag;
    use tubeops_test_utils::{seeded_store, RecordingExecutor, ScriptedOperator};

    #[tokio::test]
    async fn confirmed_close_transitions_the_ticket() {
        let (store, summary) = seeded_store();
        let workflow = CloseTicket::new(Arc::clone(&store));

        let effects = Arc::new(RecordingExecutor::over(store.clone()));
        let ctx = WorkflowContext::new(
            Arc::new(ScriptedOperator::new().then_confirm(true)),
            ParamBag::new().with("ticket_id", summary.open_ticket.to_string()),
            effects.clone(),
        );

        workflow.run(&ctx).await.unwrap();

        assert_eq!(effects.count(), 1);
        assert_eq!(
            store.ticket(summary.open_ticket).unwrap().status,
            TicketStatus::Closed
        );
    }

    #[tokio::test]
    async fn closing_twice_is_an_informational_noop() {
        let (store, summary) = seeded_store();
        let workflow = CloseTicket::new(Arc::clone(&store));

        // first close
        let ctx = WorkflowContext::new(
            Arc::new(ScriptedOperator::new().then_confirm(true)),
            ParamBag::new().with("ticket_id", summary.open_ticket.to_string()),
            Arc::new(RecordingExecutor::over(store.clone())),
        );
        workflow.run(&ctx).await.unwrap();

        // second close: zero effects, informational outcome
        let effects = Arc::new(RecordingExecutor::over(store.clone()));
        let ctx = WorkflowContext::new(
            Arc::new(ScriptedOperator::new()),
            ParamBag::new().with("ticket_id", summary.open_ticket.to_string()),
            effects.clone(),
        );
        workflow.run(&ctx).await.unwrap();

        assert_eq!(effects.count(), 0);
        match ctx.reporter().take() {
            Some(tubeops_core::Outcome::Finished(message)) => {
                assert_eq!(message.body, "This ticket is already closed");
            }
            other => panic!("expected informational finish, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn declined_close_leaves_the_ticket_open() {
        let (store, summary) = seeded_store();
        let workflow = CloseTicket::new(Arc::clone(&store));

        let effects = Arc::new(RecordingExecutor::over(store.clone()));
        let ctx = WorkflowContext::new(
            Arc::new(ScriptedOperator::new().then_confirm(false)),
            ParamBag::new().with("ticket_id", summary.open_ticket.to_string()),
            effects.clone(),
        );

        workflow.run(&ctx).await.unwrap();

        assert_eq!(effects.count(), 0);
        assert_eq!(
            store.ticket(summary.open_ticket).unwrap().status,
            TicketStatus::Open
        );
    }

    #[tokio::test]
    async fn missing_ticket_id_is_not_found() {
        let (store, _) = seeded_store();
        let workflow = CloseTicket::new(Arc::clone(&store));

        let ctx = WorkflowContext::new(
            Arc::new(ScriptedOperator::new()),
            ParamBag::new().with("ticket_id", TicketId::new().to_string()),
            Arc::new(RecordingExecutor::over(store.clone())),
        );

        let err = workflow.run(&ctx).await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound { .. }));
    }
}
