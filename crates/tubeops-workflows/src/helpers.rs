//! Shared workflow building blocks
//!
//! User lookup and the detail-collection sequences shared by the
//! onboarding workflows. Each helper honors skip-ahead: values already in
//! the parameter bag are consumed without prompting.

use chrono::NaiveDate;
use std::sync::Arc;
use tubeops_core::{
    EntityLocator, MetadataEntry, PromptStep, WorkflowContext, WorkflowError,
};
use tubeops_store::{MemoryStore, User, UserId, UserSearch};

/// Metadata rows for a user details display
#[must_use]
pub(crate) fn user_metadata(user: &User) -> Vec<MetadataEntry> {
    let mut entries = vec![
        MetadataEntry::new("Id", user.id.to_string()),
        MetadataEntry::new("Name", user.display_name()),
        MetadataEntry::new("Email", &user.email),
        MetadataEntry::new("Verified", if user.is_verified { "yes" } else { "no" }),
        MetadataEntry::new("Can upload", if user.can_upload { "yes" } else { "no" }),
        MetadataEntry::new("Signed up", user.signed_up_at.to_rfc3339()),
    ];
    if let Some(max) = user.max_upload_duration {
        entries.push(MetadataEntry::new("Max upload duration", format!("{max}s")));
    }
    entries
}

/// Resolve the target user from the `user_id` parameter or an interactive
/// search, then show their details
///
/// # Errors
/// - [`WorkflowError::NotFound`] when a passed `user_id` no longer resolves
pub(crate) async fn require_user(
    ctx: &WorkflowContext,
    store: &Arc<MemoryStore>,
) -> Result<User, WorkflowError> {
    let user = match ctx.params().get_str("user_id") {
        Some(raw) => UserId::parse(raw)
            .and_then(|id| store.user(id))
            .ok_or_else(|| WorkflowError::not_found("user", raw))?,
        None => {
            let locator = EntityLocator::new(Arc::new(UserSearch(Arc::clone(store))));
            let candidate = locator.locate(ctx.io(), "Choose a user").await?;
            UserId::parse(&candidate.id)
                .and_then(|id| store.user(id))
                .ok_or_else(|| WorkflowError::not_found("user", candidate.id))?
        }
    };

    ctx.io().metadata("User", user_metadata(&user)).await?;
    Ok(user)
}

/// Name and email as collected at the start of onboarding
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BasicDetails {
    pub(crate) name: String,
    pub(crate) email: String,
}

/// Collect name and email, skipping fields already supplied as parameters
pub(crate) async fn basic_user_details(
    ctx: &WorkflowContext,
) -> Result<BasicDetails, WorkflowError> {
    let name = ctx
        .io()
        .prompt(PromptStep::text("Name").with_param_key("name"))
        .await?;
    let email = ctx
        .io()
        .prompt(PromptStep::email("Email").with_param_key("email"))
        .await?;

    Ok(BasicDetails {
        name: name.as_text().unwrap_or_default().to_string(),
        email: email.as_text().unwrap_or_default().to_string(),
    })
}

/// Profile details collected at the end of onboarding
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AdditionalDetails {
    pub(crate) birthday: Option<NaiveDate>,
    pub(crate) website: String,
    pub(crate) profile_text: String,
}

/// Collect birthday, website, and the rich-text profile
pub(crate) async fn additional_user_details(
    ctx: &WorkflowContext,
) -> Result<AdditionalDetails, WorkflowError> {
    ctx.io().markdown("## Basic info").await?;

    let birthday = ctx.io().prompt(PromptStep::date("Birthday")).await?;
    let website = ctx.io().prompt(PromptStep::url("Website")).await?;
    let profile_text = ctx
        .io()
        .prompt(
            PromptStep::rich_text("Profile")
                .with_help("This formatted text will be shown on the user's profile page"),
        )
        .await?;

    Ok(AdditionalDetails {
        birthday: birthday.as_date(),
        website: website.as_text().unwrap_or_default().to_string(),
        profile_text: profile_text.as_text().unwrap_or_default().to_string(),
    })
}
