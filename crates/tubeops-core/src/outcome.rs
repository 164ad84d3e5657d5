//! Invocation outcomes
//!
//! A workflow ends exactly one way: it finishes with a human-readable
//! message, or it redirects to another workflow carrying a parameter bag.
//! The [`Reporter`] enforces the exactly-once contract — a second terminal
//! call is a logic error, not a silent overwrite.

use crate::error::WorkflowError;
use crate::params::ParamBag;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Reference to a registered workflow by slug
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowRef(pub Cow<'static, str>);

impl WorkflowRef {
    /// Reference from a static slug
    #[inline]
    #[must_use]
    pub const fn new(slug: &'static str) -> Self {
        Self(Cow::Borrowed(slug))
    }

    /// Slug string
    #[inline]
    #[must_use]
    pub fn slug(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WorkflowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Final human-readable result of an invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Optional title line
    pub title: Option<String>,
    /// Body text
    pub body: String,
}

impl Message {
    /// Message with a body only
    #[inline]
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            title: None,
            body: body.into(),
        }
    }

    /// Attach a title
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.title {
            Some(title) => write!(f, "{title}: {}", self.body),
            None => f.write_str(&self.body),
        }
    }
}

/// Terminal state of one invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    /// The workflow completed with a message
    Finished(Message),
    /// Control transfers to another workflow with carried-over parameters
    Redirect {
        /// Target workflow
        target: WorkflowRef,
        /// Parameters handed to the target's resolver
        params: ParamBag,
    },
}

/// Set-once outcome slot for one invocation
#[derive(Debug, Default)]
pub struct Reporter {
    slot: Mutex<Option<Outcome>>,
}

impl Reporter {
    /// Empty reporter
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish the invocation with a message
    ///
    /// # Errors
    /// - [`WorkflowError::Logic`] when a terminal outcome was already set
    pub fn finish(&self, message: Message) -> Result<(), WorkflowError> {
        self.set(Outcome::Finished(message))
    }

    /// Finish with a plain informational body
    ///
    /// # Errors
    /// - [`WorkflowError::Logic`] when a terminal outcome was already set
    pub fn info(&self, body: impl Into<String>) -> Result<(), WorkflowError> {
        self.finish(Message::new(body))
    }

    /// Redirect to another workflow with carried-over parameters
    ///
    /// # Errors
    /// - [`WorkflowError::Logic`] when a terminal outcome was already set
    pub fn redirect(&self, target: WorkflowRef, params: ParamBag) -> Result<(), WorkflowError> {
        self.set(Outcome::Redirect { target, params })
    }

    /// Take the outcome, leaving the slot empty
    #[inline]
    #[must_use]
    pub fn take(&self) -> Option<Outcome> {
        self.slot.lock().take()
    }

    fn set(&self, outcome: Outcome) -> Result<(), WorkflowError> {
        let mut slot = self.slot.lock();
        if slot.is_some() {
            return Err(WorkflowError::logic(
                "finish/redirect called twice in one invocation",
            ));
        }
        *slot = Some(outcome);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_then_redirect_is_a_logic_error() {
        let reporter = Reporter::new();
        reporter.finish(Message::new("done")).unwrap();

        let err = reporter
            .redirect(WorkflowRef::new("users/onboard_pro"), ParamBag::new())
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Logic(_)));
    }

    #[test]
    fn take_drains_the_slot() {
        let reporter = Reporter::new();
        reporter.info("ticket closed").unwrap();

        assert!(matches!(reporter.take(), Some(Outcome::Finished(_))));
        assert!(reporter.take().is_none());
    }

    #[test]
    fn message_display() {
        let message = Message::new("user verified").with_title("Verification");
        assert_eq!(message.to_string(), "Verification: user verified");
    }
}
