//! Comment moderation
//!
//! The multi-step moderation flow: resolve a comment queue (directly via
//! `comment_id`, or by picking a video and selecting its comments), then
//! decide per comment between allowing it, marking it as spam, or deleting
//! it and banning its author. The ban branch is confirmation-gated and
//! issues its effects in a fixed order: delete the comment first, then
//! schedule the author's account for deletion.

use async_trait::async_trait;
use std::sync::Arc;
use tubeops_core::{
    ChoiceOption, ChoiceStep, ConfirmStep, Effect, EntityKind, EntityLocator, FieldPatch,
    FieldSpec, MetadataEntry, ParamKind, ParamShape, Theme, Workflow, WorkflowContext,
    WorkflowError,
};
use tubeops_store::{fields, CommentId, DeletionScheduler, MemoryStore, VideoId, VideoSearch};

/// Moderation decision for one comment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Allow,
    MarkSpam,
    Ban,
}

impl Decision {
    fn options() -> Vec<ChoiceOption> {
        vec![
            ChoiceOption::new("Allow", "allow"),
            ChoiceOption::new("Mark comment as spam", "mark-spam"),
            ChoiceOption::new("Delete comment and ban user", "ban").themed(Theme::Danger),
        ]
    }

    fn parse(value: &str) -> Result<Self, WorkflowError> {
        match value {
            "allow" => Ok(Self::Allow),
            "mark-spam" => Ok(Self::MarkSpam),
            "ban" => Ok(Self::Ban),
            other => Err(WorkflowError::logic(format!(
                "unhandled moderation choice `{other}`"
            ))),
        }
    }
}

/// The `moderate_comment` workflow
pub struct ModerateComment {
    store: Arc<MemoryStore>,
    scheduler: Arc<dyn DeletionScheduler>,
}

impl ModerateComment {
    /// Workflow over a store and the deletion-scheduling collaborator
    #[must_use]
    pub fn new(store: Arc<MemoryStore>, scheduler: Arc<dyn DeletionScheduler>) -> Self {
        Self { store, scheduler }
    }

    async fn comment_queue(
        &self,
        ctx: &WorkflowContext,
    ) -> Result<Vec<CommentId>, WorkflowError> {
        // a comment_id parameter skips the lookup steps entirely
        if let Some(raw) = ctx.params().get_str("comment_id") {
            let id = CommentId::parse(raw)
                .filter(|id| self.store.comment(*id).is_some())
                .ok_or_else(|| WorkflowError::not_found("comment", raw))?;
            return Ok(vec![id]);
        }

        let video = match ctx.params().get_str("video_id") {
            Some(raw) => VideoId::parse(raw)
                .and_then(|id| self.store.video(id))
                .ok_or_else(|| WorkflowError::not_found("video", raw))?,
            None => {
                let locator =
                    EntityLocator::new(Arc::new(VideoSearch(Arc::clone(&self.store))));
                let candidate = locator.locate(ctx.io(), "Choose a video to moderate").await?;
                VideoId::parse(&candidate.id)
                    .and_then(|id| self.store.video(id))
                    .ok_or_else(|| WorkflowError::not_found("video", candidate.id))?
            }
        };

        let comments = self.store.comments_for_video(video.id);
        if comments.is_empty() {
            return Ok(Vec::new());
        }

        let options = comments
            .iter()
            .map(|comment| {
                let author = self
                    .store
                    .user(comment.author)
                    .map(|u| u.display_name().to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                ChoiceOption::new(
                    format!("{author}: {}", comment.content),
                    comment.id.to_string(),
                )
            })
            .collect();

        let selected = ctx
            .io()
            .choose_multi(ChoiceStep::multi("Select comments to moderate", options))
            .await?;

        Ok(selected.iter().filter_map(|raw| CommentId::parse(raw)).collect())
    }
}

#[async_trait]
impl Workflow for ModerateComment {
    fn slug(&self) -> &'static str {
        "moderate_comment"
    }

    fn name(&self) -> &'static str {
        "Moderate comment"
    }

    fn params(&self) -> ParamShape {
        ParamShape::of(vec![
            FieldSpec::optional("comment_id", ParamKind::String),
            FieldSpec::optional("video_id", ParamKind::String),
        ])
    }

    async fn run(&self, ctx: &WorkflowContext) -> Result<(), WorkflowError> {
        let queue = self.comment_queue(ctx).await?;
        if queue.is_empty() {
            return ctx.reporter().info("No comments to moderate");
        }

        let mut moderated = 0usize;
        for id in queue {
            // rows can disappear under a concurrent moderator; skip silently
            let Some(comment) = self.store.comment(id) else {
                continue;
            };
            let author = self
                .store
                .user(comment.author)
                .ok_or_else(|| WorkflowError::not_found("user", comment.author.to_string()))?;

            ctx.io()
                .metadata(
                    "Comment details",
                    vec![
                        MetadataEntry::new("Author", author.display_name()),
                        MetadataEntry::new("Created", comment.created_at.to_rfc3339()),
                        MetadataEntry::new("Id", comment.id.to_string()),
                        MetadataEntry::new("Content", &comment.content),
                    ],
                )
                .await?;
            ctx.io()
                .markdown(
                    "**Note:** If you choose to ban the user, their account will be scheduled \
                     to be permanently deleted from our database. Any videos they uploaded will \
                     be marked for deletion.",
                )
                .await?;

            let choice = ctx
                .io()
                .choose(ChoiceStep::single("Moderation decision", Decision::options()))
                .await?;

            match Decision::parse(&choice)? {
                Decision::Allow => {}
                Decision::MarkSpam => {
                    ctx.apply(Effect::update(
                        EntityKind::Comment,
                        comment.id.to_string(),
                        FieldPatch::new().with(fields::IS_SPAM, true),
                    ))
                    .await?;
                    moderated += 1;
                }
                Decision::Ban => {
                    let confirmed = ctx
                        .io()
                        .confirm(
                            ConfirmStep::new("Are you sure you want to ban this user?")
                                .with_help(author.display_name()),
                        )
                        .await?;
                    if confirmed {
                        // destructive child-record effect before the parent account
                        ctx.apply(Effect::delete(EntityKind::Comment, comment.id.to_string()))
                            .await?;
                        self.scheduler.schedule_user_deletion(&author.email).await?;
                        moderated += 1;
                    }
                }
            }
        }

        ctx.reporter()
            .info(format!("Moderation complete ({moderated} action(s) taken)"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tubeops_core::ParamBag;
    use tubeops_test_utils::{seeded_store, RecordingExecutor, RecordingScheduler, ScriptedOperator};

    fn context(
        operator: ScriptedOperator,
        params: ParamBag,
        effects: Arc<RecordingExecutor>,
    ) -> WorkflowContext {
        WorkflowContext::new(Arc::new(operator), params, effects)
    }

    #[tokio::test]
    async fn comment_id_param_skips_lookup_and_marks_spam() {
        let (store, summary) = seeded_store();
        let scheduler = Arc::new(RecordingScheduler::new());
        let workflow = ModerateComment::new(Arc::clone(&store), scheduler);

        let effects = Arc::new(RecordingExecutor::over(store.clone()));
        let operator = ScriptedOperator::new().then_choice(&["mark-spam"]);
        let ctx = context(
            operator,
            ParamBag::new().with("comment_id", summary.spam_comment.to_string()),
            Arc::clone(&effects),
        );

        workflow.run(&ctx).await.unwrap();

        assert_eq!(effects.count(), 1);
        assert!(store.comment(summary.spam_comment).unwrap().is_spam);
    }

    #[tokio::test]
    async fn mark_spam_twice_is_idempotent() {
        let (store, summary) = seeded_store();
        let scheduler = Arc::new(RecordingScheduler::new());
        let workflow = ModerateComment::new(Arc::clone(&store), scheduler);

        for _ in 0..2 {
            let effects = Arc::new(RecordingExecutor::over(store.clone()));
            let ctx = context(
                ScriptedOperator::new().then_choice(&["mark-spam"]),
                ParamBag::new().with("comment_id", summary.spam_comment.to_string()),
                effects,
            );
            workflow.run(&ctx).await.unwrap();
        }

        assert!(store.comment(summary.spam_comment).unwrap().is_spam);
    }

    #[tokio::test]
    async fn confirmed_ban_deletes_then_schedules() {
        let (store, summary) = seeded_store();
        let scheduler = Arc::new(RecordingScheduler::new());
        let workflow = ModerateComment::new(Arc::clone(&store), scheduler.clone());

        let effects = Arc::new(RecordingExecutor::over(store.clone()));
        let ctx = context(
            ScriptedOperator::new().then_choice(&["ban"]).then_confirm(true),
            ParamBag::new().with("comment_id", summary.spam_comment.to_string()),
            Arc::clone(&effects),
        );

        workflow.run(&ctx).await.unwrap();

        // exactly one destructive effect, applied before the schedule call
        let applied = effects.effects();
        assert_eq!(applied.len(), 1);
        assert!(applied[0].is_destructive());
        assert!(store.comment(summary.spam_comment).is_none());
        assert_eq!(scheduler.scheduled(), vec!["noor@viewtube.example".to_string()]);
    }

    #[tokio::test]
    async fn declined_ban_mutates_nothing() {
        let (store, summary) = seeded_store();
        let scheduler = Arc::new(RecordingScheduler::new());
        let workflow = ModerateComment::new(Arc::clone(&store), scheduler.clone());

        let effects = Arc::new(RecordingExecutor::over(store.clone()));
        let ctx = context(
            ScriptedOperator::new().then_choice(&["ban"]).then_confirm(false),
            ParamBag::new().with("comment_id", summary.spam_comment.to_string()),
            Arc::clone(&effects),
        );

        workflow.run(&ctx).await.unwrap();

        assert_eq!(effects.count(), 0);
        assert!(store.comment(summary.spam_comment).is_some());
        assert!(scheduler.scheduled().is_empty());
    }

    #[tokio::test]
    async fn video_param_offers_comment_selection() {
        let (store, summary) = seeded_store();
        let scheduler = Arc::new(RecordingScheduler::new());
        let workflow = ModerateComment::new(Arc::clone(&store), scheduler);

        let effects = Arc::new(RecordingExecutor::over(store.clone()));
        let ctx = context(
            ScriptedOperator::new()
                .then_choice(&[&summary.spam_comment.to_string()])
                .then_choice(&["allow"]),
            ParamBag::new().with("video_id", summary.featured_video.to_string()),
            Arc::clone(&effects),
        );

        workflow.run(&ctx).await.unwrap();
        assert_eq!(effects.count(), 0);
    }

    proptest! {
        // Spec property: the ban branch never issues the delete effect
        // unless the preceding confirmation returned true.
        #[test]
        fn prop_ban_is_confirmation_gated(confirmed in proptest::bool::ANY) {
            let result: Result<(), TestCaseError> = tokio_test::block_on(async {
                let (store, summary) = seeded_store();
                let scheduler = Arc::new(RecordingScheduler::new());
                let workflow =
                    ModerateComment::new(Arc::clone(&store), scheduler.clone());

                let effects = Arc::new(RecordingExecutor::over(store.clone()));
                let ctx = WorkflowContext::new(
                    Arc::new(
                        ScriptedOperator::new()
                            .then_choice(&["ban"])
                            .then_confirm(confirmed),
                    ),
                    ParamBag::new().with("comment_id", summary.spam_comment.to_string()),
                    effects.clone(),
                );

                workflow.run(&ctx).await.map_err(|e| TestCaseError::fail(e.to_string()))?;

                if confirmed {
                    prop_assert_eq!(effects.count(), 1);
                    prop_assert!(store.comment(summary.spam_comment).is_none());
                } else {
                    prop_assert_eq!(effects.count(), 0);
                    prop_assert!(scheduler.scheduled().is_empty());
                }
                Ok(())
            });
            result?;
        }
    }
}
