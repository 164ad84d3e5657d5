//! Feature flag editor
//!
//! Two tables (enabled and disabled flags) with a single selection allowed
//! across both; a validator rejects anything but exactly one selected flag
//! and re-presents the tables. The enable branch collects rollout
//! percentage and target environments, so those fields are only ever
//! written together with `is_enabled = true`; the disable branch is
//! confirmation-gated and writes the status field alone.

use async_trait::async_trait;
use std::sync::Arc;
use tubeops_core::{
    ChoiceOption, ChoiceStep, ConfirmStep, Effect, EntityKind, FieldPatch, FieldValue,
    InputValue, PromptStep, Workflow, WorkflowContext, WorkflowError, MAX_PROMPT_ATTEMPTS,
};
use tubeops_store::{fields, Environment, FeatureFlag, MemoryStore};

fn status_mark(enabled: bool) -> &'static str {
    if enabled {
        "yes"
    } else {
        "no"
    }
}

fn flag_option(flag: &FeatureFlag) -> ChoiceOption {
    ChoiceOption::new(
        format!("{} - {}", flag.slug, flag.description),
        flag.slug.clone(),
    )
}

/// The `feature_flags` workflow
pub struct FeatureFlagManager {
    store: Arc<MemoryStore>,
}

impl FeatureFlagManager {
    /// Editor over a store
    #[must_use]
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }

    /// Render both tables and collect exactly one selection across them
    async fn select_flag(&self, ctx: &WorkflowContext) -> Result<String, WorkflowError> {
        let flags = self.store.flags();
        let enabled: Vec<&FeatureFlag> = flags.iter().filter(|f| f.is_enabled).collect();
        let disabled: Vec<&FeatureFlag> = flags.iter().filter(|f| !f.is_enabled).collect();

        ctx.io()
            .table(
                "Currently enabled flags",
                vec![
                    "Name".into(),
                    "Description".into(),
                    "Staging status".into(),
                    "Production status".into(),
                    "Rollout %".into(),
                ],
                enabled
                    .iter()
                    .map(|f| {
                        vec![
                            f.slug.clone(),
                            f.description.clone(),
                            status_mark(f.enabled_environments.contains(&Environment::Staging))
                                .to_string(),
                            status_mark(
                                f.enabled_environments.contains(&Environment::Production),
                            )
                            .to_string(),
                            format!("{}%", f.rollout_percentage),
                        ]
                    })
                    .collect(),
            )
            .await?;
        ctx.io()
            .table(
                "Currently disabled flags",
                vec!["Name".into(), "Description".into()],
                disabled
                    .iter()
                    .map(|f| vec![f.slug.clone(), f.description.clone()])
                    .collect(),
            )
            .await?;

        // one selection across both tables, enforced here and re-presented
        // on violation
        for _attempt in 1..=MAX_PROMPT_ATTEMPTS {
            let from_enabled = ctx
                .io()
                .choose_multi(ChoiceStep::multi(
                    "Select from enabled flags",
                    enabled.iter().map(|f| flag_option(f)).collect(),
                ))
                .await?;
            let from_disabled = ctx
                .io()
                .choose_multi(ChoiceStep::multi(
                    "Select from disabled flags",
                    disabled.iter().map(|f| flag_option(f)).collect(),
                ))
                .await?;

            let mut combined = from_enabled;
            combined.extend(from_disabled);

            if combined.len() == 1 {
                return Ok(combined.remove(0));
            }
            ctx.io()
                .notice(
                    "You can only edit one flag at a time. Please select a single flag to edit",
                )
                .await?;
        }

        Err(WorkflowError::validation(
            "flag selection",
            "no single flag selected",
        ))
    }
}

#[async_trait]
impl Workflow for FeatureFlagManager {
    fn slug(&self) -> &'static str {
        "feature_flags"
    }

    fn name(&self) -> &'static str {
        "Feature flag manager"
    }

    async fn run(&self, ctx: &WorkflowContext) -> Result<(), WorkflowError> {
        let slug = self.select_flag(ctx).await?;
        let flag = self
            .store
            .flag(&slug)
            .ok_or_else(|| WorkflowError::not_found("feature_flag", slug.clone()))?;

        let new_enabled = ctx
            .io()
            .choose(
                ChoiceStep::single(
                    format!("New status for {}", flag.slug),
                    vec![
                        ChoiceOption::new("Enabled", "Enabled"),
                        ChoiceOption::new("Disabled", "Disabled"),
                    ],
                )
                .with_default(if flag.is_enabled { "Enabled" } else { "Disabled" }),
            )
            .await?
            == "Enabled";

        let mut patch = FieldPatch::new().with(fields::IS_ENABLED, new_enabled);

        if new_enabled {
            // rollout settings are collected only while enabling, so they
            // are never written to a disabled flag
            let rollout = ctx
                .io()
                .prompt(
                    PromptStep::number("Rollout percentage", Some(0.0), Some(100.0))
                        .with_default(InputValue::Number(f64::from(flag.rollout_percentage))),
                )
                .await?
                .as_number()
                .unwrap_or(0.0);

            let environments = ctx
                .io()
                .choose_multi(ChoiceStep::multi(
                    "Enabled environments",
                    vec![
                        ChoiceOption::new("PRODUCTION", "PRODUCTION"),
                        ChoiceOption::new("STAGING", "STAGING"),
                    ],
                ))
                .await?;

            #[allow(clippy::cast_possible_truncation)]
            let rollout = rollout.round() as i64;
            patch = patch
                .with(fields::ROLLOUT_PERCENTAGE, rollout)
                .with(fields::ENABLED_ENVIRONMENTS, FieldValue::TextList(environments));
        } else if flag.is_enabled {
            let confirmed = ctx
                .io()
                .confirm(ConfirmStep::new("Are you sure you want to disable this flag?"))
                .await?;
            if !confirmed {
                return ctx.reporter().info("Cancelled");
            }
        }

        ctx.apply(Effect::update(EntityKind::FeatureFlag, &flag.slug, patch))
            .await?;

        ctx.reporter()
            .info(format!("Updated flag {}", flag.slug))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubeops_core::ParamBag;
    use tubeops_test_utils::{seeded_store, RecordingExecutor, ScriptedOperator};

    fn context(operator: ScriptedOperator, effects: Arc<RecordingExecutor>) -> WorkflowContext {
        WorkflowContext::new(Arc::new(operator), ParamBag::new(), effects)
    }

    #[tokio::test]
    async fn enabling_a_disabled_flag_writes_exactly_three_fields() {
        let (store, _) = seeded_store();
        let workflow = FeatureFlagManager::new(Arc::clone(&store));

        // seeded `live-chat` flag starts disabled
        let operator = ScriptedOperator::new()
            .then_choice(&[]) // nothing from the enabled table
            .then_choice(&["live-chat"])
            .then_choice(&["Enabled"])
            .then_number(25.0)
            .then_choice(&["STAGING"]);

        let effects = Arc::new(RecordingExecutor::over(store.clone()));
        let ctx = context(operator, Arc::clone(&effects));
        workflow.run(&ctx).await.unwrap();

        let applied = effects.effects();
        assert_eq!(applied.len(), 1);
        match &applied[0] {
            Effect::Update { entity, id, fields: patch } => {
                assert_eq!(*entity, EntityKind::FeatureFlag);
                assert_eq!(id, "live-chat");
                let names: Vec<&str> = patch.fields().collect();
                assert_eq!(
                    names,
                    vec!["is_enabled", "rollout_percentage", "enabled_environments"]
                );
            }
            other => panic!("unexpected effect: {other:?}"),
        }

        let flag = store.flag("live-chat").unwrap();
        assert!(flag.is_enabled);
        assert_eq!(flag.rollout_percentage, 25);
        assert_eq!(flag.enabled_environments, vec![Environment::Staging]);
    }

    #[tokio::test]
    async fn two_selections_are_rejected_with_zero_updates() {
        let (store, _) = seeded_store();
        let workflow = FeatureFlagManager::new(Arc::clone(&store));

        // one selection in each table, three times over: the validator
        // rejects every round and the workflow fails without mutating
        let mut operator = ScriptedOperator::new();
        for _ in 0..MAX_PROMPT_ATTEMPTS {
            operator = operator
                .then_choice(&["new-player"])
                .then_choice(&["live-chat"]);
        }

        let effects = Arc::new(RecordingExecutor::over(store.clone()));
        let ctx = context(operator, Arc::clone(&effects));
        let err = workflow.run(&ctx).await.unwrap_err();

        assert!(matches!(err, WorkflowError::Validation { .. }));
        assert_eq!(effects.count(), 0);
    }

    #[tokio::test]
    async fn disabling_requires_confirmation() {
        let (store, _) = seeded_store();
        let workflow = FeatureFlagManager::new(Arc::clone(&store));

        // seeded `new-player` flag starts enabled
        let operator = ScriptedOperator::new()
            .then_choice(&["new-player"])
            .then_choice(&[])
            .then_choice(&["Disabled"])
            .then_confirm(false);

        let effects = Arc::new(RecordingExecutor::over(store.clone()));
        let ctx = context(operator, Arc::clone(&effects));
        workflow.run(&ctx).await.unwrap();

        assert_eq!(effects.count(), 0);
        assert!(store.flag("new-player").unwrap().is_enabled);
    }

    #[tokio::test]
    async fn confirmed_disable_writes_status_only() {
        let (store, _) = seeded_store();
        let workflow = FeatureFlagManager::new(Arc::clone(&store));

        let operator = ScriptedOperator::new()
            .then_choice(&["new-player"])
            .then_choice(&[])
            .then_choice(&["Disabled"])
            .then_confirm(true);

        let effects = Arc::new(RecordingExecutor::over(store.clone()));
        let ctx = context(operator, Arc::clone(&effects));
        workflow.run(&ctx).await.unwrap();

        let applied = effects.effects();
        assert_eq!(applied.len(), 1);
        match &applied[0] {
            Effect::Update { fields: patch, .. } => {
                let names: Vec<&str> = patch.fields().collect();
                assert_eq!(names, vec!["is_enabled"]);
            }
            other => panic!("unexpected effect: {other:?}"),
        }
        assert!(!store.flag("new-player").unwrap().is_enabled);
        // rollout settings survive untouched on the disabled flag
        assert_eq!(store.flag("new-player").unwrap().rollout_percentage, 50);
    }
}
