//! Support dashboard page
//!
//! Display-only: a weekday greeting, headline metrics, recent incidents,
//! and the open-ticket table (newest first). Ticket rows deep-link into
//! `support/close_ticket` via the `ticket_id` parameter.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tubeops_core::{MetadataEntry, Workflow, WorkflowContext, WorkflowError};
use tubeops_store::MemoryStore;

/// The `support` page
pub struct SupportDashboard {
    store: Arc<MemoryStore>,
}

impl SupportDashboard {
    /// Page over a store
    #[must_use]
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Workflow for SupportDashboard {
    fn slug(&self) -> &'static str {
        "support"
    }

    fn name(&self) -> &'static str {
        "Support"
    }

    async fn run(&self, ctx: &WorkflowContext) -> Result<(), WorkflowError> {
        let day = Utc::now().format("%A");
        ctx.io()
            .markdown(format!(
                "Happy {day}! Welcome to our customer support dashboard"
            ))
            .await?;

        let open = self.store.open_tickets();

        ctx.io()
            .metadata(
                "Metrics",
                vec![
                    MetadataEntry::new("Open tickets", open.len().to_string()),
                    MetadataEntry::new("Closed tickets (last 7 days)", "435"),
                    MetadataEntry::new("CSAT (last 7 days)", "94%"),
                    MetadataEntry::new("CSAT (last 30 days)", "88%"),
                    MetadataEntry::new("Avg. response time (last 7 days)", "1h 23m"),
                    MetadataEntry::new("Avg. response time (last 30 days)", "1h 41m"),
                ],
            )
            .await?;

        ctx.io()
            .table(
                "Recent incidents",
                vec!["Description".into(), "Severity".into(), "Link".into()],
                vec![
                    vec![
                        "Email receipts were incorrectly dated from March 12-18".into(),
                        "Low".into(),
                        "https://status.viewtube.example/incident/123".into(),
                    ],
                    vec![
                        "Video uploads were down for 2 hours on March 18".into(),
                        "High".into(),
                        "https://status.viewtube.example/incident/456".into(),
                    ],
                    vec![
                        "Users were unable to log in via 2FA on March 19".into(),
                        "Medium".into(),
                        "https://status.viewtube.example/incident/789".into(),
                    ],
                ],
            )
            .await?;

        ctx.io()
            .table(
                "Open tickets",
                vec![
                    "Id".into(),
                    "Title".into(),
                    "Severity".into(),
                    "Contact".into(),
                    "Created".into(),
                ],
                open.iter()
                    .map(|t| {
                        vec![
                            t.id.to_string(),
                            t.title.clone(),
                            t.severity.as_str().to_string(),
                            t.contact_method.as_str().to_string(),
                            t.created_at.to_rfc3339(),
                        ]
                    })
                    .collect(),
            )
            .await?;

        ctx.reporter()
            .info(format!("{} open ticket(s)", open.len()))
    }
}
