//! Professional user onboarding
//!
//! The paid tier of onboarding: plan selection sets the upload duration
//! cap, branding assets are collected, and the new account is announced on
//! the papertrail channel. Usually reached via redirect from
//! `users/onboard`, with name and email carried over in the bag.

use crate::helpers::{additional_user_details, basic_user_details};
use async_trait::async_trait;
use std::sync::Arc;
use tubeops_core::{
    ChoiceOption, ChoiceStep, Effect, EntityKind, FieldPatch, FieldSpec, FieldValue,
    MetadataEntry, ParamKind, ParamShape, PromptStep, Workflow, WorkflowContext, WorkflowError,
};
use tubeops_services::{Notification, Notifier};
use tubeops_store::{fields, MemoryStore};

/// Professional plan tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Plan {
    Silver,
    Gold,
    Diamond,
}

impl Plan {
    fn options() -> Vec<ChoiceOption> {
        vec![
            ChoiceOption::new("Silver Plan - Email/Chat support - $10/month", "silver"),
            ChoiceOption::new("Gold Plan - Email/Chat/Phone support - $100/month", "gold"),
            ChoiceOption::new(
                "Diamond Plan - Email/Chat/Phone/Personal robot support - $1000/month",
                "diamond",
            ),
        ]
    }

    fn parse(value: &str) -> Result<Self, WorkflowError> {
        match value {
            "silver" => Ok(Self::Silver),
            "gold" => Ok(Self::Gold),
            "diamond" => Ok(Self::Diamond),
            other => Err(WorkflowError::logic(format!("unhandled plan `{other}`"))),
        }
    }

    /// Upload length cap granted by the plan, in seconds
    fn max_upload_duration(self) -> i64 {
        match self {
            Self::Silver => 600,
            Self::Gold => 6_000,
            Self::Diamond => 10_000,
        }
    }
}

/// The `users/onboard_pro` workflow
pub struct OnboardProUser {
    store: Arc<MemoryStore>,
    notifier: Arc<dyn Notifier>,
}

impl OnboardProUser {
    /// Workflow over a store and the notification collaborator
    #[must_use]
    pub fn new(store: Arc<MemoryStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }
}

#[async_trait]
impl Workflow for OnboardProUser {
    fn slug(&self) -> &'static str {
        "users/onboard_pro"
    }

    fn name(&self) -> &'static str {
        "Onboard professional user"
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
                "Onboarding as professional user",
                vec![
                    MetadataEntry::new("Email", &details.email),
                    MetadataEntry::new("Name", &details.name),
                ],
            )
            .await?;

        let plan_value = ctx
            .io()
            .choose(ChoiceStep::single(
                "Select professional plan",
                Plan::options(),
            ))
            .await?;
        let plan = Plan::parse(&plan_value)?;

        let extra = additional_user_details(ctx).await?;

        ctx.io().markdown("## Assets and branding").await?;
        let image_extensions = vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()];
        ctx.io()
            .prompt(
                PromptStep::file("Logo", image_extensions.clone())
                    .with_help("Provide a logo to identify the user or their organization"),
            )
            .await?;
        ctx.io()
            .prompt(PromptStep::file("Cover photo", image_extensions).with_help(
                "This image will be used as the cover photo for the user's profile",
            ))
            .await?;

        let mut patch = FieldPatch::new()
            .with(fields::EMAIL, details.email.clone())
            .with(fields::NAME, details.name.clone())
            .with(fields::CAN_UPLOAD, true)
            .with(fields::MAX_UPLOAD_DURATION, plan.max_upload_duration());
        if let Some(birthday) = extra.birthday {
            patch.set(fields::BIRTHDAY, FieldValue::Date(birthday));
        }
        patch.set(fields::WEBSITE, extra.website);
        patch.set(fields::PROFILE_TEXT, extra.profile_text);

        ctx.apply(Effect::create(EntityKind::User, patch)).await?;

        // fire-and-forget: delivery failure never unwinds the onboarding
        self.notifier
            .notify(Notification::new(
                "New professional user",
                format!(
                    "{} ({}) has been onboarded by {}",
                    details.name,
                    details.email,
                    ctx.operator().email
                ),
                "#new-user-papertrail",
            ))
            .await;

        ctx.reporter().info(format!(
            "Onboarded {} ({}) on the {plan_value} plan",
            details.name, details.email
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tubeops_core::{FileRef, ParamBag};
    use tubeops_test_utils::{seeded_store, RecordingExecutor, RecordingNotifier, ScriptedOperator};

    fn image() -> Vec<FileRef> {
        vec![FileRef::new("logo.png", 4_096)]
    }

    #[tokio::test]
    async fn redirect_params_skip_basic_details() {
        let (store, _) = seeded_store();
        let notifier = Arc::new(RecordingNotifier::new());
        let workflow = OnboardProUser::new(Arc::clone(&store), notifier.clone());

        let operator = ScriptedOperator::new()
            .then_choice(&["gold"])
            .then_date(NaiveDate::from_ymd_opt(1988, 9, 3).unwrap())
            .then_text("https://lena.example")
            .then_text("Studio lighting reviews")
            .then_files(image())
            .then_files(image());

        let params = ParamBag::new()
            .with("name", "Lena Petrova")
            .with("email", "lena@viewtube.example");
        let effects = Arc::new(RecordingExecutor::over(store.clone()));
        let ctx = WorkflowContext::new(Arc::new(operator), params, effects.clone());

        workflow.run(&ctx).await.unwrap();

        let user = store.user_by_email("lena@viewtube.example").unwrap();
        assert!(user.can_upload);
        assert_eq!(user.max_upload_duration, Some(6_000));

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].channel, "#new-user-papertrail");
        assert!(sent[0].body.contains("lena@viewtube.example"));
        assert!(sent[0].body.contains("ops@viewtube.example"));
    }

    #[tokio::test]
    async fn plan_sets_the_upload_cap() {
        assert_eq!(Plan::Silver.max_upload_duration(), 600);
        assert_eq!(Plan::Diamond.max_upload_duration(), 10_000);
        assert!(Plan::parse("platinum").is_err());
    }
}
