//! User verification
//!
//! Check, grant, or revoke the verified badge. Granting walks a document
//! checklist, a readiness gate, an identity re-confirmation and two license
//! uploads before the single `is_verified` update; revoking is gated by a
//! plain confirmation plus an identity re-confirmation.

use crate::helpers::require_user;
use async_trait::async_trait;
use std::sync::Arc;
use tubeops_core::{
    ChoiceOption, ChoiceStep, ConfirmStep, Effect, EntityKind, FieldPatch, FieldSpec, ParamKind,
    ParamShape, PromptStep, Workflow, WorkflowContext, WorkflowError,
};
use tubeops_store::{fields, MemoryStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VerifyAction {
    CheckStatus,
    Start,
    Remove,
}

impl VerifyAction {
    fn options() -> Vec<ChoiceOption> {
        vec![
            ChoiceOption::new("Check verification status", "check-status"),
            ChoiceOption::new("Start verification", "start"),
            ChoiceOption::new("Remove verification", "remove"),
        ]
    }

    fn parse(value: &str) -> Result<Self, WorkflowError> {
        match value {
            "check-status" => Ok(Self::CheckStatus),
            "start" => Ok(Self::Start),
            "remove" => Ok(Self::Remove),
            other => Err(WorkflowError::logic(format!(
                "unhandled verification choice `{other}`"
            ))),
        }
    }
}

/// The `users/verify` workflow
pub struct VerifyUser {
    store: Arc<MemoryStore>,
}

impl VerifyUser {
    /// Workflow over a store
    #[must_use]
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Workflow for VerifyUser {
    fn slug(&self) -> &'static str {
        "users/verify"
    }

    fn name(&self) -> &'static str {
        "User verification"
    }

    fn unlisted(&self) -> bool {
        true
    }

    fn params(&self) -> ParamShape {
        ParamShape::of(vec![FieldSpec::resolvable("user_id", ParamKind::String)])
    }

    async fn run(&self, ctx: &WorkflowContext) -> Result<(), WorkflowError> {
        let user = require_user(ctx, &self.store).await?;

        let choice = ctx
            .io()
            .choose(ChoiceStep::single("Verification", VerifyAction::options()))
            .await?;

        match VerifyAction::parse(&choice)? {
            VerifyAction::CheckStatus => ctx.reporter().info(format!(
                "User {} {} verified.",
                user.email,
                if user.is_verified { "IS" } else { "IS NOT" }
            )),
            VerifyAction::Start => {
                ctx.io()
                    .markdown(format!(
                        "## Verifying {}\n\n\
                         **IMPORTANT:** Before beginning verification for a user, ensure that \
                         you have all required documentation.\n\n\
                         ### Required documents:\n- Valid drivers license",
                        user.display_name()
                    ))
                    .await?;

                let ready = ctx
                    .io()
                    .prompt(PromptStep::boolean(
                        "I have all required docs to start verification...",
                    ))
                    .await?
                    .as_bool()
                    .unwrap_or(false);
                if !ready {
                    return ctx.reporter().info("Cancelled");
                }

                let identity_ok = ctx
                    .io()
                    .confirm(ConfirmStep::identity(
                        "Confirm your identity before verifying this user...",
                    ))
                    .await?;
                if !identity_ok {
                    return ctx.reporter().info("Cancelled");
                }

                let license_extensions =
                    vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string(), "pdf".to_string()];
                ctx.io()
                    .prompt(PromptStep::file(
                        "Drivers license (front)",
                        license_extensions.clone(),
                    ))
                    .await?;
                ctx.io()
                    .prompt(PromptStep::file("Drivers license (back)", license_extensions))
                    .await?;

                ctx.apply(Effect::update(
                    EntityKind::User,
                    user.id.to_string(),
                    FieldPatch::new().with(fields::IS_VERIFIED, true),
                ))
                .await?;

                ctx.reporter()
                    .info(format!("Verified {}.", user.display_name()))
            }
            VerifyAction::Remove => {
                let confirmed = ctx
                    .io()
                    .confirm(
                        ConfirmStep::new("Remove verification?").with_help(format!(
                            "User: {} ({})",
                            user.display_name(),
                            user.email
                        )),
                    )
                    .await?;
                if !confirmed {
                    return ctx.reporter().info("Cancelled");
                }

                let identity_ok = ctx
                    .io()
                    .confirm(ConfirmStep::identity(
                        "Confirm your identity before removing verification...",
                    ))
                    .await?;
                if !identity_ok {
                    return ctx.reporter().info("Cancelled");
                }

                ctx.apply(Effect::update(
                    EntityKind::User,
                    user.id.to_string(),
                    FieldPatch::new().with(fields::IS_VERIFIED, false),
                ))
                .await?;

                ctx.reporter()
                    .info(format!("Removed verification for {}.", user.display_name()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubeops_core::{FileRef, ParamBag};
    use tubeops_test_utils::{seeded_store, RecordingExecutor, ScriptedOperator};

    fn license() -> Vec<FileRef> {
        vec![FileRef::new("license.jpg", 120_000)]
    }

    #[tokio::test]
    async fn check_status_reads_without_mutating() {
        let (store, summary) = seeded_store();
        let workflow = VerifyUser::new(Arc::clone(&store));

        let effects = Arc::new(RecordingExecutor::over(store.clone()));
        let ctx = WorkflowContext::new(
            Arc::new(ScriptedOperator::new().then_choice(&["check-status"])),
            ParamBag::new().with("user_id", summary.creator.to_string()),
            effects.clone(),
        );

        workflow.run(&ctx).await.unwrap();
        assert_eq!(effects.count(), 0);
    }

    #[tokio::test]
    async fn full_verification_pass_sets_the_badge() {
        let (store, summary) = seeded_store();
        // seeded spammer starts unverified
        assert!(!store.user(summary.spammer).unwrap().is_verified);
        let workflow = VerifyUser::new(Arc::clone(&store));

        let operator = ScriptedOperator::new()
            .then_choice(&["start"])
            .then_bool(true)
            .then_confirm(true)
            .then_files(license())
            .then_files(license());

        let effects = Arc::new(RecordingExecutor::over(store.clone()));
        let ctx = WorkflowContext::new(
            Arc::new(operator),
            ParamBag::new().with("user_id", summary.spammer.to_string()),
            effects.clone(),
        );

        workflow.run(&ctx).await.unwrap();

        assert_eq!(effects.count(), 1);
        assert!(store.user(summary.spammer).unwrap().is_verified);
    }

    #[tokio::test]
    async fn not_ready_short_circuits_before_any_upload() {
        let (store, summary) = seeded_store();
        let workflow = VerifyUser::new(Arc::clone(&store));

        let operator = ScriptedOperator::new()
            .then_choice(&["start"])
            .then_bool(false);

        let effects = Arc::new(RecordingExecutor::over(store.clone()));
        let ctx = WorkflowContext::new(
            Arc::new(operator),
            ParamBag::new().with("user_id", summary.spammer.to_string()),
            effects.clone(),
        );

        workflow.run(&ctx).await.unwrap();
        assert_eq!(effects.count(), 0);
        assert!(!store.user(summary.spammer).unwrap().is_verified);
    }

    #[tokio::test]
    async fn remove_requires_both_confirmations() {
        let (store, summary) = seeded_store();
        // seeded creator starts verified
        let workflow = VerifyUser::new(Arc::clone(&store));

        let operator = ScriptedOperator::new()
            .then_choice(&["remove"])
            .then_confirm(true)
            .then_confirm(false); // identity check fails

        let effects = Arc::new(RecordingExecutor::over(store.clone()));
        let ctx = WorkflowContext::new(
            Arc::new(operator),
            ParamBag::new().with("user_id", summary.creator.to_string()),
            effects.clone(),
        );

        workflow.run(&ctx).await.unwrap();
        assert_eq!(effects.count(), 0);
        assert!(store.user(summary.creator).unwrap().is_verified);
    }
}
