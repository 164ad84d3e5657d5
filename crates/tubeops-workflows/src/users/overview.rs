//! Users page
//!
//! Two layouts behind one slug, driven by parameters the way row links
//! deep-link back into the page: without `user_id` the page shows metrics
//! and the user table (optionally filtered to verified accounts); with
//! `user_id` it shows one account with its videos, channels, comments and
//! purchases.

use crate::helpers::user_metadata;
use async_trait::async_trait;
use std::sync::Arc;
use tubeops_core::{
    FieldSpec, MetadataEntry, ParamKind, ParamShape, Workflow, WorkflowContext, WorkflowError,
};
use tubeops_store::{MemoryStore, UserId};

/// The `users` page
pub struct UsersOverview {
    store: Arc<MemoryStore>,
}

impl UsersOverview {
    /// Page over a store
    #[must_use]
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    async fn all_users(
        &self,
        ctx: &WorkflowContext,
        verified_only: bool,
    ) -> Result<(), WorkflowError> {
        let users = self.store.users();
        let latest_signup = users
            .first()
            .map(|u| u.signed_up_at.to_rfc3339())
            .unwrap_or_else(|| "-".to_string());

        ctx.io()
            .metadata(
                "Metrics",
                vec![
                    MetadataEntry::new("Total users", users.len().to_string()),
                    MetadataEntry::new(
                        "Verified users",
                        users.iter().filter(|u| u.is_verified).count().to_string(),
                    ),
                    MetadataEntry::new(
                        "Creators",
                        users.iter().filter(|u| u.can_upload).count().to_string(),
                    ),
                    MetadataEntry::new("Latest sign-up", latest_signup),
                ],
            )
            .await?;

        ctx.io()
            .display(tubeops_core::DisplayStep::heading(if verified_only {
                "Verified users"
            } else {
                "All users"
            }))
            .await?;

        let rows = users
            .iter()
            .filter(|u| !verified_only || u.is_verified)
            .map(|u| {
                let name = if u.is_verified {
                    format!("[verified] {}", u.display_name())
                } else {
                    u.display_name().to_string()
                };
                vec![
                    name,
                    u.id.to_string(),
                    u.email.clone(),
                    if u.can_upload { "yes" } else { "no" }.to_string(),
                    u.max_upload_duration
                        .map(|d| format!("{d}s"))
                        .unwrap_or_else(|| "-".to_string()),
                ]
            })
            .collect();

        ctx.io()
            .table(
                "Users",
                vec![
                    "Name".into(),
                    "Id".into(),
                    "Email".into(),
                    "Can upload".into(),
                    "Max upload duration".into(),
                ],
                rows,
            )
            .await?;

        ctx.reporter().info("Users listed")
    }

    async fn single_user(
        &self,
        ctx: &WorkflowContext,
        raw_id: &str,
    ) -> Result<(), WorkflowError> {
        let user = UserId::parse(raw_id)
            .and_then(|id| self.store.user(id))
            .ok_or_else(|| WorkflowError::not_found("user", raw_id))?;

        ctx.io().metadata("Details", user_metadata(&user)).await?;

        let videos = self.store.videos_for_owner(user.id);
        ctx.io()
            .table(
                "Videos",
                vec!["Title".into(), "Created".into(), "Price".into()],
                videos
                    .iter()
                    .map(|v| {
                        vec![
                            v.title.clone(),
                            v.created_at.to_rfc3339(),
                            format!("${}", v.price),
                        ]
                    })
                    .collect(),
            )
            .await?;

        let channels = self.store.channels_for_owner(user.id);
        ctx.io()
            .table(
                "Channels",
                vec!["Id".into(), "Name".into()],
                channels
                    .iter()
                    .map(|c| vec![c.id.to_string(), c.name.clone()])
                    .collect(),
            )
            .await?;

        let comments = self.store.comments_by_author(user.id);
        ctx.io()
            .table(
                "Comments",
                vec!["Content".into(), "Spam".into(), "Video".into()],
                comments
                    .iter()
                    .map(|c| {
                        vec![
                            c.content.clone(),
                            if c.is_spam { "yes" } else { "no" }.to_string(),
                            self.store
                                .video(c.video)
                                .map(|v| v.title)
                                .unwrap_or_else(|| "-".to_string()),
                        ]
                    })
                    .collect(),
            )
            .await?;

        let purchases = self.store.purchases_for_user(user.id);
        ctx.io()
            .table(
                "Purchases",
                vec!["Id".into(), "Amount".into(), "Created".into(), "Video".into()],
                purchases
                    .iter()
                    .map(|p| {
                        vec![
                            p.id.to_string(),
                            format!("${}", p.amount),
                            p.created_at.to_rfc3339(),
                            self.store
                                .video(p.video)
                                .map(|v| v.title)
                                .unwrap_or_else(|| "-".to_string()),
                        ]
                    })
                    .collect(),
            )
            .await?;

        ctx.reporter()
            .info(format!("Showing {}", user.display_name()))
    }
}

#[async_trait]
impl Workflow for UsersOverview {
    fn slug(&self) -> &'static str {
        "users"
    }

    fn name(&self) -> &'static str {
        "Users"
    }

    fn params(&self) -> ParamShape {
        ParamShape::of(vec![
            FieldSpec::optional("user_id", ParamKind::String),
            FieldSpec::optional("verified_only", ParamKind::Bool),
        ])
    }

    async fn run(&self, ctx: &WorkflowContext) -> Result<(), WorkflowError> {
        // entirely different layouts depending on the parameters
        match ctx.params().get_str("user_id") {
            Some(raw) => {
                let raw = raw.to_string();
                self.single_user(ctx, &raw).await
            }
            None => {
                let verified_only = ctx.params().get_bool("verified_only").unwrap_or(false);
                self.all_users(ctx, verified_only).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubeops_core::{DisplayStep, ParamBag};
    use tubeops_test_utils::{seeded_store, RecordingExecutor, ScriptedOperator};

    #[tokio::test]
    async fn overview_renders_metrics_and_table() {
        let (store, _) = seeded_store();
        let workflow = UsersOverview::new(Arc::clone(&store));

        let operator = Arc::new(ScriptedOperator::new());
        let ctx = WorkflowContext::new(
            operator.clone(),
            ParamBag::new(),
            Arc::new(RecordingExecutor::new()),
        );

        workflow.run(&ctx).await.unwrap();

        let displays = operator.displays();
        assert!(matches!(&displays[0], DisplayStep::Metadata { title, .. } if title == "Metrics"));
        assert!(displays
            .iter()
            .any(|d| matches!(d, DisplayStep::Table { rows, .. } if rows.len() == 4)));
    }

    #[tokio::test]
    async fn verified_filter_reduces_rows() {
        let (store, _) = seeded_store();
        let workflow = UsersOverview::new(Arc::clone(&store));

        let operator = Arc::new(ScriptedOperator::new());
        let ctx = WorkflowContext::new(
            operator.clone(),
            ParamBag::new().with("verified_only", true),
            Arc::new(RecordingExecutor::new()),
        );

        workflow.run(&ctx).await.unwrap();

        let displays = operator.displays();
        // seeded data has two verified accounts
        assert!(displays
            .iter()
            .any(|d| matches!(d, DisplayStep::Table { rows, .. } if rows.len() == 2)));
    }

    #[tokio::test]
    async fn user_id_param_switches_to_detail_layout() {
        let (store, summary) = seeded_store();
        let workflow = UsersOverview::new(Arc::clone(&store));

        let operator = Arc::new(ScriptedOperator::new());
        let ctx = WorkflowContext::new(
            operator.clone(),
            ParamBag::new().with("user_id", summary.creator.to_string()),
            Arc::new(RecordingExecutor::new()),
        );

        workflow.run(&ctx).await.unwrap();

        let displays = operator.displays();
        assert!(matches!(&displays[0], DisplayStep::Metadata { title, .. } if title == "Details"));
        // videos, channels, comments, purchases
        let tables = displays
            .iter()
            .filter(|d| matches!(d, DisplayStep::Table { .. }))
            .count();
        assert_eq!(tables, 4);
    }

    #[tokio::test]
    async fn missing_user_is_a_terminal_failure() {
        let (store, _) = seeded_store();
        let workflow = UsersOverview::new(store);

        let ctx = WorkflowContext::new(
            Arc::new(ScriptedOperator::new()),
            ParamBag::new().with("user_id", UserId::new().to_string()),
            Arc::new(RecordingExecutor::new()),
        );

        let err = workflow.run(&ctx).await.unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound { .. }));
    }
}
