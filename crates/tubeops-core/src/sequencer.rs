//! Step sequencer
//!
//! Executes the steps of one workflow invocation strictly in order against
//! an [`Operator`]. The sequencer owns three responsibilities the step
//! descriptors themselves cannot carry:
//!
//! - **Skip-ahead**: a prompt or choice whose `param_key` was supplied in
//!   the invocation's parameter bag is answered from the bag without
//!   contacting the operator, which is what makes workflows deep-linkable
//!   and resumable at an arbitrary step.
//! - **Validation loop**: invalid answers are re-presented at the offending
//!   step (bounded attempts), then fail as a validation error. Out-of-set
//!   choice answers are contract violations and are handled the same way
//!   instead of crashing the invocation.
//! - **Transcript**: every executed step is recorded, so tests can assert
//!   on exactly what an operator saw and answered.

use crate::error::WorkflowError;
use crate::operator::Operator;
use crate::params::ParamBag;
use crate::step::{
    ChoiceStep, ConfirmStep, DisplayStep, InputValue, MetadataEntry, PromptKind, PromptStep,
};
use chrono::NaiveDate;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;

/// Attempts granted to an operator before a step fails as invalid
pub const MAX_PROMPT_ATTEMPTS: usize = 3;

/// One executed step, as seen by the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StepRecord {
    /// A display was rendered
    Displayed {
        /// Step kind label
        kind: &'static str,
        /// Title or body excerpt
        title: String,
    },
    /// A prompt was answered
    Prompted {
        /// Prompt label
        label: String,
        /// Whether the answer came from the parameter bag
        skipped: bool,
    },
    /// A choice was answered
    Chose {
        /// Choice label
        label: String,
        /// Selected option values
        values: Vec<String>,
        /// Whether the answer came from the parameter bag
        skipped: bool,
    },
    /// A confirmation gate was answered
    Confirmed {
        /// Gate label
        label: String,
        /// The operator's decision
        decision: bool,
    },
}

/// Sequencer for one workflow invocation
#[derive(Clone)]
pub struct StepSequencer {
    operator: Arc<dyn Operator>,
    params: ParamBag,
    transcript: Arc<Mutex<Vec<StepRecord>>>,
}

impl StepSequencer {
    /// Create a sequencer over an operator and the resolved parameter bag
    #[inline]
    #[must_use]
    pub fn new(operator: Arc<dyn Operator>, params: ParamBag) -> Self {
        Self {
            operator,
            params,
            transcript: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The invocation's resolved parameters
    #[inline]
    #[must_use]
    pub fn params(&self) -> &ParamBag {
        &self.params
    }

    /// Copy of the transcript so far
    #[inline]
    #[must_use]
    pub fn transcript(&self) -> Vec<StepRecord> {
        self.transcript.lock().clone()
    }

    fn record(&self, record: StepRecord) {
        self.transcript.lock().push(record);
    }

    /// Render a read-only display
    ///
    /// # Errors
    /// Propagates operator failures ([`WorkflowError::Abandoned`] included).
    pub async fn display(&self, step: DisplayStep) -> Result<(), WorkflowError> {
        let (kind, title) = match &step {
            DisplayStep::Metadata { title, .. } => ("metadata", title.clone()),
            DisplayStep::Markdown { body } => {
                ("markdown", body.chars().take(48).collect::<String>())
            }
            DisplayStep::Heading { title } => ("heading", title.clone()),
            DisplayStep::Table { title, .. } => ("table", title.clone()),
            DisplayStep::Code { title, .. } => ("code", title.clone()),
            DisplayStep::Notice { message } => ("notice", message.clone()),
        };
        self.operator.show(&step).await?;
        self.record(StepRecord::Displayed { kind, title });
        Ok(())
    }

    /// Metadata card convenience
    pub async fn metadata(
        &self,
        title: impl Into<String> + Send,
        entries: Vec<MetadataEntry>,
    ) -> Result<(), WorkflowError> {
        self.display(DisplayStep::metadata(title, entries)).await
    }

    /// Markdown convenience
    pub async fn markdown(&self, body: impl Into<String> + Send) -> Result<(), WorkflowError> {
        self.display(DisplayStep::markdown(body)).await
    }

    /// Table convenience
    pub async fn table(
        &self,
        title: impl Into<String> + Send,
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    ) -> Result<(), WorkflowError> {
        self.display(DisplayStep::table(title, columns, rows)).await
    }

    /// Validation notice convenience
    pub async fn notice(&self, message: impl Into<String> + Send) -> Result<(), WorkflowError> {
        self.display(DisplayStep::notice(message)).await
    }

    /// Collect one typed value
    ///
    /// Answers from the parameter bag (skip-ahead) when the step carries a
    /// `param_key` present in the bag and the value passes validation;
    /// otherwise prompts the operator, re-presenting invalid answers up to
    /// [`MAX_PROMPT_ATTEMPTS`].
    ///
    /// # Errors
    /// - [`WorkflowError::Validation`] when attempts are exhausted
    /// - operator failures, verbatim
    pub async fn prompt(&self, step: PromptStep) -> Result<InputValue, WorkflowError> {
        if let Some(value) = self.param_answer(&step) {
            if self.validate_prompt(&step, &value).is_ok() {
                tracing::debug!(label = %step.label, "prompt answered from parameter bag");
                self.record(StepRecord::Prompted {
                    label: step.label.clone(),
                    skipped: true,
                });
                return Ok(value);
            }
        }

        let mut last_message = String::new();
        for attempt in 1..=MAX_PROMPT_ATTEMPTS {
            let value = self.operator.prompt(&step).await?;
            match self.validate_prompt(&step, &value) {
                Ok(()) => {
                    self.record(StepRecord::Prompted {
                        label: step.label.clone(),
                        skipped: false,
                    });
                    return Ok(value);
                }
                Err(message) => {
                    tracing::debug!(label = %step.label, attempt, %message, "prompt rejected");
                    self.notice(&message).await?;
                    last_message = message;
                }
            }
        }

        Err(WorkflowError::validation(step.label, last_message))
    }

    /// Text prompt convenience returning the collected string
    pub async fn prompt_text(
        &self,
        label: impl Into<String> + Send,
    ) -> Result<String, WorkflowError> {
        let value = self.prompt(PromptStep::text(label)).await?;
        Ok(value.as_text().unwrap_or_default().to_string())
    }

    /// Select exactly one option value
    ///
    /// # Errors
    /// - [`WorkflowError::Validation`] when the operator exhausts attempts
    ///   with out-of-set or multi answers
    pub async fn choose(&self, step: ChoiceStep) -> Result<String, WorkflowError> {
        if let Some(key) = step.param_key {
            if let Some(value) = self.params.get_str(key) {
                if step.has_value(value) {
                    let value = value.to_string();
                    self.record(StepRecord::Chose {
                        label: step.label.clone(),
                        values: vec![value.clone()],
                        skipped: true,
                    });
                    return Ok(value);
                }
            }
        }

        for _attempt in 1..=MAX_PROMPT_ATTEMPTS {
            let values = self.operator.choose(&step).await?;
            match self.validate_selection(&step, &values, Some(1)) {
                Ok(()) => {
                    let value = values.into_iter().next().unwrap_or_default();
                    self.record(StepRecord::Chose {
                        label: step.label.clone(),
                        values: vec![value.clone()],
                        skipped: false,
                    });
                    return Ok(value);
                }
                Err(message) => self.notice(&message).await?,
            }
        }

        Err(WorkflowError::validation(step.label, "no valid selection"))
    }

    /// Select a bounded subset of option values
    ///
    /// # Errors
    /// - [`WorkflowError::Validation`] when the operator exhausts attempts
    pub async fn choose_multi(&self, step: ChoiceStep) -> Result<Vec<String>, WorkflowError> {
        for _attempt in 1..=MAX_PROMPT_ATTEMPTS {
            let values = self.operator.choose(&step).await?;
            match self.validate_selection(&step, &values, None) {
                Ok(()) => {
                    self.record(StepRecord::Chose {
                        label: step.label.clone(),
                        values: values.clone(),
                        skipped: false,
                    });
                    return Ok(values);
                }
                Err(message) => self.notice(&message).await?,
            }
        }

        Err(WorkflowError::validation(step.label, "no valid selection"))
    }

    /// Answer a confirmation gate
    pub async fn confirm(&self, step: ConfirmStep) -> Result<bool, WorkflowError> {
        let decision = self.operator.confirm(&step).await?;
        self.record(StepRecord::Confirmed {
            label: step.label,
            decision,
        });
        Ok(decision)
    }

    fn validate_prompt(&self, step: &PromptStep, value: &InputValue) -> Result<(), String> {
        step.kind.check(value)?;
        if let Some(validator) = &step.validator {
            validator(value)?;
        }
        Ok(())
    }

    fn validate_selection(
        &self,
        step: &ChoiceStep,
        values: &[String],
        exact: Option<usize>,
    ) -> Result<(), String> {
        if let Some(exact) = exact {
            if values.len() != exact {
                return Err(format!(
                    "select exactly {exact} option(s), got {}",
                    values.len()
                ));
            }
        }
        if let Some(max) = step.max_selections {
            if values.len() > max {
                return Err(format!("select at most {max} option(s)"));
            }
        }
        for value in values {
            if !step.has_value(value) {
                return Err(format!("`{value}` is not one of the offered options"));
            }
        }
        Ok(())
    }

    fn param_answer(&self, step: &PromptStep) -> Option<InputValue> {
        let key = step.param_key?;
        let value = self.params.get(key)?;
        match &step.kind {
            PromptKind::Text { .. } | PromptKind::RichText | PromptKind::Email | PromptKind::Url => {
                value.as_str().map(|s| InputValue::Text(s.to_string()))
            }
            PromptKind::Number { .. } => value.as_float().map(InputValue::Number),
            PromptKind::Boolean => value.as_bool().map(InputValue::Bool),
            PromptKind::Date => value
                .as_str()
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
                .map(InputValue::Date),
            // Files cannot arrive through the parameter bag
            PromptKind::File { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::{MockOperator, OperatorIdentity};
    use crate::step::ChoiceOption;
    use mockall::Sequence;

    fn operator_with_identity() -> MockOperator {
        let mut operator = MockOperator::new();
        operator
            .expect_identity()
            .returning(|| OperatorIdentity::new("ops@viewtube.example"));
        operator
    }

    #[tokio::test]
    async fn prompt_skips_ahead_from_params() {
        let mut operator = operator_with_identity();
        operator.expect_prompt().never();

        let params = ParamBag::new().with("email", "new@viewtube.example");
        let io = StepSequencer::new(Arc::new(operator), params);

        let value = io
            .prompt(PromptStep::email("Email").with_param_key("email"))
            .await
            .unwrap();
        assert_eq!(value.as_text(), Some("new@viewtube.example"));
        assert_eq!(
            io.transcript(),
            vec![StepRecord::Prompted {
                label: "Email".into(),
                skipped: true
            }]
        );
    }

    #[tokio::test]
    async fn invalid_param_falls_back_to_operator() {
        let mut operator = operator_with_identity();
        operator
            .expect_prompt()
            .times(1)
            .returning(|_| Ok(InputValue::Text("fixed@viewtube.example".into())));

        let params = ParamBag::new().with("email", "not-an-email");
        let io = StepSequencer::new(Arc::new(operator), params);

        let value = io
            .prompt(PromptStep::email("Email").with_param_key("email"))
            .await
            .unwrap();
        assert_eq!(value.as_text(), Some("fixed@viewtube.example"));
    }

    #[tokio::test]
    async fn prompt_reprompts_then_fails_validation() {
        let mut operator = operator_with_identity();
        operator
            .expect_prompt()
            .times(MAX_PROMPT_ATTEMPTS)
            .returning(|_| Ok(InputValue::Number(250.0)));
        // one notice per rejected attempt
        operator
            .expect_show()
            .times(MAX_PROMPT_ATTEMPTS)
            .returning(|_| Ok(()));

        let io = StepSequencer::new(Arc::new(operator), ParamBag::new());
        let err = io
            .prompt(PromptStep::number("Rollout percentage", Some(0.0), Some(100.0)))
            .await
            .unwrap_err();

        match err {
            WorkflowError::Validation { field, .. } => assert_eq!(field, "Rollout percentage"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn out_of_set_choice_is_represented_then_accepted() {
        let mut operator = operator_with_identity();
        let mut seq = Sequence::new();
        operator
            .expect_choose()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec!["escalate".into()]));
        operator.expect_show().returning(|_| Ok(()));
        operator
            .expect_choose()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec!["allow".into()]));

        let io = StepSequencer::new(Arc::new(operator), ParamBag::new());
        let step = ChoiceStep::single(
            "Moderate",
            vec![
                ChoiceOption::new("Allow", "allow"),
                ChoiceOption::new("Mark comment as spam", "mark-spam"),
            ],
        );

        let value = io.choose(step).await.unwrap();
        assert_eq!(value, "allow");
    }

    #[tokio::test]
    async fn multi_select_respects_bound() {
        let mut operator = operator_with_identity();
        let mut seq = Sequence::new();
        operator
            .expect_choose()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec!["a".into(), "b".into()]));
        operator.expect_show().returning(|_| Ok(()));
        operator
            .expect_choose()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(vec!["a".into()]));

        let io = StepSequencer::new(Arc::new(operator), ParamBag::new());
        let step = ChoiceStep::multi(
            "Pick",
            vec![ChoiceOption::new("A", "a"), ChoiceOption::new("B", "b")],
        )
        .with_max_selections(1);

        let values = io.choose_multi(step).await.unwrap();
        assert_eq!(values, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn choice_skips_ahead_from_params() {
        let mut operator = operator_with_identity();
        operator.expect_choose().never();

        let params = ParamBag::new().with("action", "mark-spam");
        let io = StepSequencer::new(Arc::new(operator), params);
        let step = ChoiceStep::single(
            "Moderate",
            vec![
                ChoiceOption::new("Allow", "allow"),
                ChoiceOption::new("Mark comment as spam", "mark-spam"),
            ],
        )
        .with_param_key("action");

        assert_eq!(io.choose(step).await.unwrap(), "mark-spam");
    }

    #[tokio::test]
    async fn abandoned_propagates() {
        let mut operator = operator_with_identity();
        operator
            .expect_confirm()
            .returning(|_| Err(WorkflowError::Abandoned));

        let io = StepSequencer::new(Arc::new(operator), ParamBag::new());
        let err = io.confirm(ConfirmStep::new("Proceed?")).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Abandoned));
    }
}
