//! Basic user onboarding
//!
//! Collects account details and creates a basic account, or hands off to
//! the professional onboarding workflow — the redirect carries the already
//! collected name and email so the target skips those prompts.

use crate::helpers::{additional_user_details, basic_user_details};
use async_trait::async_trait;
use std::sync::Arc;
use tubeops_core::{
    Effect, EntityKind, FieldPatch, FieldSpec, FieldValue, MetadataEntry, ParamBag, ParamKind,
    ParamShape, PromptStep, Workflow, WorkflowContext, WorkflowError, WorkflowRef,
};
use tubeops_store::{fields, MemoryStore};

/// The `users/onboard` workflow
pub struct OnboardUser {
    store: Arc<MemoryStore>,
}

impl OnboardUser {
    /// Workflow over a store
    #[must_use]
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Workflow for OnboardUser {
    fn slug(&self) -> &'static str {
        "users/onboard"
    }

    fn name(&self) -> &'static str {
        "Onboard user"
    }

    fn unlisted(&self) -> bool {
        true
    }

    fn params(&self) -> ParamShape {
        ParamShape::of(vec![
            FieldSpec::optional("name", ParamKind::String),
            FieldSpec::optional("email", ParamKind::String),
        ])
    }

    async fn run(&self, ctx: &WorkflowContext) -> Result<(), WorkflowError> {
        let details = basic_user_details(ctx).await?;

        ctx.io()
            .metadata(
                "Onboarding as basic user",
                vec![
                    MetadataEntry::new("Email", &details.email),
                    MetadataEntry::new("Name", &details.name),
                ],
            )
            .await?;

        let professional = ctx
            .io()
            .prompt(PromptStep::boolean("Onboard as professional user?").with_help(
                "Professional users get whitelabeled video hosting, higher upload limits, \
                 and additional support.",
            ))
            .await?
            .as_bool()
            .unwrap_or(false);

        if professional {
            return ctx.reporter().redirect(
                WorkflowRef::new("users/onboard_pro"),
                ParamBag::new()
                    .with("email", details.email)
                    .with("name", details.name),
            );
        }

        let extra = additional_user_details(ctx).await?;

        let mut patch = FieldPatch::new()
            .with(fields::EMAIL, details.email.clone())
            .with(fields::NAME, details.name.clone());
        if let Some(birthday) = extra.birthday {
            patch.set(fields::BIRTHDAY, FieldValue::Date(birthday));
        }
        patch.set(fields::WEBSITE, extra.website);
        patch.set(fields::PROFILE_TEXT, extra.profile_text);

        ctx.apply(Effect::create(EntityKind::User, patch)).await?;
        debug_assert!(self.store.user_by_email(&details.email).is_some());

        ctx.reporter()
            .info(format!("Onboarded {} ({})", details.name, details.email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tubeops_core::Outcome;
    use tubeops_test_utils::{seeded_store, RecordingExecutor, ScriptedOperator};

    #[tokio::test]
    async fn basic_onboarding_creates_the_account() {
        let (store, _) = seeded_store();
        let workflow = OnboardUser::new(Arc::clone(&store));

        let operator = ScriptedOperator::new()
            .then_text("Jonas Veld")
            .then_text("jonas@viewtube.example")
            .then_bool(false)
            .then_date(NaiveDate::from_ymd_opt(1993, 4, 12).unwrap())
            .then_text("https://jonas.example")
            .then_text("Soldering and synths.");

        let effects = Arc::new(RecordingExecutor::over(store.clone()));
        let ctx = WorkflowContext::new(Arc::new(operator), ParamBag::new(), effects.clone());

        workflow.run(&ctx).await.unwrap();

        assert_eq!(effects.count(), 1);
        let user = store.user_by_email("jonas@viewtube.example").unwrap();
        assert_eq!(user.name.as_deref(), Some("Jonas Veld"));
        assert!(!user.can_upload);
        assert_eq!(user.website.as_deref(), Some("https://jonas.example"));
    }

    #[tokio::test]
    async fn professional_branch_redirects_with_details() {
        let (store, _) = seeded_store();
        let workflow = OnboardUser::new(Arc::clone(&store));

        let operator = ScriptedOperator::new()
            .then_text("Lena Petrova")
            .then_text("lena@viewtube.example")
            .then_bool(true);

        let effects = Arc::new(RecordingExecutor::over(store.clone()));
        let ctx = WorkflowContext::new(Arc::new(operator), ParamBag::new(), effects.clone());

        workflow.run(&ctx).await.unwrap();

        assert_eq!(effects.count(), 0);
        match ctx.reporter().take() {
            Some(Outcome::Redirect { target, params }) => {
                assert_eq!(target.slug(), "users/onboard_pro");
                assert_eq!(params.get_str("email"), Some("lena@viewtube.example"));
                assert_eq!(params.get_str("name"), Some("Lena Petrova"));
            }
            other => panic!("expected redirect, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn params_skip_the_detail_prompts() {
        let (store, _) = seeded_store();
        let workflow = OnboardUser::new(Arc::clone(&store));

        // only the professional question and the extra details are prompted
        let operator = ScriptedOperator::new()
            .then_bool(false)
            .then_date(NaiveDate::from_ymd_opt(1990, 1, 1).unwrap())
            .then_text("https://prefilled.example")
            .then_text("Prefilled profile");

        let params = ParamBag::new()
            .with("name", "Prefilled User")
            .with("email", "prefilled@viewtube.example");
        let effects = Arc::new(RecordingExecutor::over(store.clone()));
        let ctx = WorkflowContext::new(Arc::new(operator), params, effects.clone());

        workflow.run(&ctx).await.unwrap();
        assert!(store.user_by_email("prefilled@viewtube.example").is_some());
    }
}
