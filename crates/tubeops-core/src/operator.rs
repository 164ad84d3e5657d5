//! The human boundary of a workflow invocation
//!
//! The [`Operator`] trait is the only suspension point in the engine: every
//! prompt, choice, and confirmation awaits an operator answer. Production
//! deployments back it with a console UI; tests back it with a scripted
//! implementation, making entire invocations replayable.

use crate::error::WorkflowError;
use crate::step::{ChoiceStep, ConfirmStep, DisplayStep, InputValue, PromptStep};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Identity of the operator driving an invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorIdentity {
    /// Operator email, recorded on notes and notifications
    pub email: String,
}

impl OperatorIdentity {
    /// Identity from an email address
    #[inline]
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }
}

/// Answers steps on behalf of a human operator
///
/// Implementations may take arbitrarily long to answer (there is no timeout
/// on human input) and may return [`WorkflowError::Abandoned`] from any
/// method to cancel the invocation. Answers are *untrusted*: the sequencer
/// re-validates every returned value against the step descriptor.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Operator: Send + Sync {
    /// Identity of the human behind this operator session
    fn identity(&self) -> OperatorIdentity;

    /// Render a read-only display
    async fn show(&self, step: &DisplayStep) -> Result<(), WorkflowError>;

    /// Collect one typed value
    async fn prompt(&self, step: &PromptStep) -> Result<InputValue, WorkflowError>;

    /// Select option values from a choice step
    ///
    /// Single-select steps expect exactly one value in the answer.
    async fn choose(&self, step: &ChoiceStep) -> Result<Vec<String>, WorkflowError>;

    /// Answer a confirmation gate
    async fn confirm(&self, step: &ConfirmStep) -> Result<bool, WorkflowError>;
}
