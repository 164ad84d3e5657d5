//! Error types for the workflow engine
//!
//! Covers every failure class a workflow invocation can surface:
//! - Parameter validation failures (re-promptable)
//! - Missing entities (terminal for the invocation)
//! - External service failures (surfaced verbatim, never retried)
//! - Internal contract violations
//! - Startup configuration failures
//!
//! Incompatible-state actions (e.g. closing an already-closed ticket) are
//! deliberately *not* errors: workflows finish those with an informational
//! outcome and issue zero effects.

/// Main workflow error type
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// A parameter or collected input failed validation
    #[error("validation failed for `{field}`: {message}")]
    Validation {
        /// Field or step label that failed
        field: String,
        /// Human-readable reason
        message: String,
    },

    /// A referenced entity no longer exists
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind label
        entity: &'static str,
        /// Identifier that failed to resolve
        id: String,
    },

    /// An outbound call to a collaborator failed
    #[error("{service} request failed: {message}")]
    ExternalService {
        /// Collaborator name (search backend, storage, completion, ...)
        service: &'static str,
        /// Verbatim failure text
        message: String,
    },

    /// Persistence rejected an effect
    #[error("storage error: {0}")]
    Storage(String),

    /// Internal contract violation within a workflow
    #[error("workflow logic error: {0}")]
    Logic(String),

    /// Required configuration is missing or malformed at startup
    #[error("configuration error: {0}")]
    Config(String),

    /// The operator abandoned the invocation
    #[error("invocation abandoned by operator")]
    Abandoned,

    /// A redirect chain exceeded the runner's depth cap
    #[error("redirect depth exceeded ({0})")]
    RedirectDepthExceeded(usize),

    /// No workflow is registered under the requested slug
    #[error("unknown workflow: {0}")]
    UnknownWorkflow(String),
}

impl WorkflowError {
    /// Validation failure for a named field or step
    #[inline]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Missing-entity failure with the identifier included
    #[inline]
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// External collaborator failure, message surfaced verbatim
    #[inline]
    pub fn external(service: &'static str, message: impl Into<String>) -> Self {
        Self::ExternalService {
            service,
            message: message.into(),
        }
    }

    /// Internal contract violation
    #[inline]
    pub fn logic(message: impl Into<String>) -> Self {
        Self::Logic(message.into())
    }

    /// Whether the sequencer should re-present this failure at the
    /// offending step instead of terminating the invocation
    #[inline]
    #[must_use]
    pub fn is_repromptable(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::Logic(_))
    }

    /// Whether this failure ends the invocation with no chance of recovery
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !self.is_repromptable()
    }
}
