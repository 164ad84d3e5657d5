//! Testing utilities for the tubeops workspace
//!
//! Shared fixtures: a scripted operator, a recording effect executor, and
//! stub service collaborators.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tubeops_core::{
    ChoiceStep, ConfirmStep, DisplayStep, Effect, EffectExecutor, EffectKind, EffectReceipt,
    FileRef, InputValue, Operator, OperatorIdentity, PromptStep, WorkflowError,
};
use tubeops_services::{CompletionClient, Notification, Notifier};
use tubeops_store::{seed_demo, DeletionScheduler, MemoryStore, QueryRows, SeedSummary, SqlBackend, TableSchema};

/// One scripted operator answer
#[derive(Debug, Clone)]
pub enum Answer {
    Input(InputValue),
    Choice(Vec<String>),
    Confirm(bool),
}

/// Operator that replays a fixed answer script
///
/// Displays are recorded, prompts/choices/confirmations pop the next
/// scripted answer. Exhausting the script or answering the wrong step kind
/// is a logic error, which makes divergence from the expected step order
/// visible in tests.
#[derive(Default)]
pub struct ScriptedOperator {
    email: String,
    answers: Mutex<VecDeque<Answer>>,
    displays: Mutex<Vec<DisplayStep>>,
}

impl ScriptedOperator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            email: "ops@viewtube.example".to_string(),
            answers: Mutex::new(VecDeque::new()),
            displays: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    #[must_use]
    pub fn then(self, answer: Answer) -> Self {
        self.answers.lock().push_back(answer);
        self
    }

    #[must_use]
    pub fn then_text(self, text: impl Into<String>) -> Self {
        self.then(Answer::Input(InputValue::Text(text.into())))
    }

    #[must_use]
    pub fn then_number(self, number: f64) -> Self {
        self.then(Answer::Input(InputValue::Number(number)))
    }

    #[must_use]
    pub fn then_bool(self, value: bool) -> Self {
        self.then(Answer::Input(InputValue::Bool(value)))
    }

    #[must_use]
    pub fn then_date(self, date: NaiveDate) -> Self {
        self.then(Answer::Input(InputValue::Date(date)))
    }

    #[must_use]
    pub fn then_files(self, files: Vec<FileRef>) -> Self {
        self.then(Answer::Input(InputValue::Files(files)))
    }

    #[must_use]
    pub fn then_choice(self, values: &[&str]) -> Self {
        self.then(Answer::Choice(
            values.iter().map(|v| (*v).to_string()).collect(),
        ))
    }

    #[must_use]
    pub fn then_confirm(self, decision: bool) -> Self {
        self.then(Answer::Confirm(decision))
    }

    /// Displays the operator has seen so far
    #[must_use]
    pub fn displays(&self) -> Vec<DisplayStep> {
        self.displays.lock().clone()
    }

    /// Answers left unconsumed
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.answers.lock().len()
    }

    fn pop(&self, expected: &str) -> Result<Answer, WorkflowError> {
        self.answers.lock().pop_front().ok_or_else(|| {
            WorkflowError::logic(format!("operator script exhausted at a {expected} step"))
        })
    }
}

#[async_trait]
impl Operator for ScriptedOperator {
    fn identity(&self) -> OperatorIdentity {
        OperatorIdentity::new(self.email.clone())
    }

    async fn show(&self, step: &DisplayStep) -> Result<(), WorkflowError> {
        self.displays.lock().push(step.clone());
        Ok(())
    }

    async fn prompt(&self, step: &PromptStep) -> Result<InputValue, WorkflowError> {
        match self.pop(&step.label)? {
            Answer::Input(value) => Ok(value),
            other => Err(WorkflowError::logic(format!(
                "scripted {other:?} answer does not fit prompt `{}`",
                step.label
            ))),
        }
    }

    async fn choose(&self, step: &ChoiceStep) -> Result<Vec<String>, WorkflowError> {
        match self.pop(&step.label)? {
            Answer::Choice(values) => Ok(values),
            other => Err(WorkflowError::logic(format!(
                "scripted {other:?} answer does not fit choice `{}`",
                step.label
            ))),
        }
    }

    async fn confirm(&self, step: &ConfirmStep) -> Result<bool, WorkflowError> {
        match self.pop(&step.label)? {
            Answer::Confirm(decision) => Ok(decision),
            other => Err(WorkflowError::logic(format!(
                "scripted {other:?} answer does not fit confirmation `{}`",
                step.label
            ))),
        }
    }
}

/// Effect executor that records every applied effect
///
/// Optionally forwards to an inner executor (a store) so tests can assert
/// on both the mutation stream and the final state. With no inner executor
/// it synthesizes receipts, which is enough for zero-mutation assertions.
#[derive(Default)]
pub struct RecordingExecutor {
    inner: Option<Arc<dyn EffectExecutor>>,
    applied: Mutex<Vec<Effect>>,
}

impl RecordingExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn over(inner: Arc<dyn EffectExecutor>) -> Self {
        Self {
            inner: Some(inner),
            applied: Mutex::new(Vec::new()),
        }
    }

    /// Every effect applied so far, in order
    #[must_use]
    pub fn effects(&self) -> Vec<Effect> {
        self.applied.lock().clone()
    }

    /// Number of applied effects
    #[must_use]
    pub fn count(&self) -> usize {
        self.applied.lock().len()
    }
}

#[async_trait]
impl EffectExecutor for RecordingExecutor {
    async fn apply(&self, effect: Effect) -> Result<EffectReceipt, WorkflowError> {
        let receipt = match &self.inner {
            Some(inner) => inner.apply(effect.clone()).await?,
            None => EffectReceipt {
                entity: effect.entity(),
                id: "recorded".to_string(),
                kind: match effect {
                    Effect::Update { .. } => EffectKind::Updated,
                    Effect::Create { .. } => EffectKind::Created,
                    Effect::Delete { .. } => EffectKind::Deleted,
                },
            },
        };
        self.applied.lock().push(effect);
        Ok(receipt)
    }
}

/// Completion client returning one fixed response
pub struct StubCompletion {
    pub response: String,
}

impl StubCompletion {
    #[must_use]
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

#[async_trait]
impl CompletionClient for StubCompletion {
    async fn complete(&self, _prompt: &str) -> Result<String, WorkflowError> {
        Ok(self.response.clone())
    }
}

/// SQL backend with a fixed schema and canned query result
pub struct StubSql {
    pub schema: Vec<TableSchema>,
    pub result: Result<QueryRows, String>,
}

impl StubSql {
    #[must_use]
    pub fn returning(rows: QueryRows) -> Self {
        Self {
            schema: vec![TableSchema::new("videos", &["id", "title", "price"])],
            result: Ok(rows),
        }
    }

    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            schema: vec![TableSchema::new("videos", &["id", "title", "price"])],
            result: Err(message.into()),
        }
    }
}

#[async_trait]
impl SqlBackend for StubSql {
    fn schema(&self) -> Vec<TableSchema> {
        self.schema.clone()
    }

    async fn execute(&self, _sql: &str) -> Result<QueryRows, WorkflowError> {
        match &self.result {
            Ok(rows) => Ok(rows.clone()),
            Err(message) => Err(WorkflowError::external("sql", message.clone())),
        }
    }
}

/// Notifier that records deliveries instead of sending them
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) {
        self.sent.lock().push(notification);
    }
}

/// Deletion scheduler that records marked emails
#[derive(Default)]
pub struct RecordingScheduler {
    scheduled: Mutex<Vec<String>>,
}

impl RecordingScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn scheduled(&self) -> Vec<String> {
        self.scheduled.lock().clone()
    }
}

#[async_trait]
impl DeletionScheduler for RecordingScheduler {
    async fn schedule_user_deletion(&self, email: &str) -> Result<(), WorkflowError> {
        self.scheduled.lock().push(email.to_string());
        Ok(())
    }
}

/// A seeded store ready for workflow tests
#[must_use]
pub fn seeded_store() -> (Arc<MemoryStore>, SeedSummary) {
    let store = Arc::new(MemoryStore::new());
    let summary = seed_demo(&store);
    (store, summary)
}
