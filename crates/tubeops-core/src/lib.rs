//! ViewTube workflow engine
//!
//! The core of the operations console: parameterized, resumable,
//! human-in-the-loop admin workflows. A workflow
//! - accepts a loosely typed parameter bag that can pre-fill or skip steps,
//! - runs a linear-with-branches sequence of typed steps (display, prompt,
//!   choice, confirmation) against an [`Operator`],
//! - applies confirmed decisions as explicit [`Effect`]s, and
//! - finishes with a message or redirects into another workflow.
//!
//! # Example
//!
//! ```rust,ignore
//! use tubeops_core::prelude::*;
//!
//! # async fn example(registry: std::sync::Arc<WorkflowRegistry>,
//! #                  effects: std::sync::Arc<dyn EffectExecutor>,
//! #                  operator: std::sync::Arc<dyn Operator>) {
//! let runner = WorkflowRunner::new(registry, effects);
//! let bag = ParamBag::new().with("comment_id", "01JC…");
//! let message = runner.invoke("moderate_comment", bag, operator).await.unwrap();
//! println!("{message}");
//! # }
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod config;
pub mod effect;
pub mod error;
pub mod locator;
pub mod operator;
pub mod outcome;
pub mod params;
pub mod sequencer;
pub mod step;
pub mod workflow;

// Re-exports for convenience
pub use config::{AdminConfig, CompletionConfig, NotifyConfig, ServerConfig, StorageConfig};
pub use effect::{Effect, EffectExecutor, EffectKind, EffectReceipt, EntityKind, FieldPatch, FieldValue};
pub use error::WorkflowError;
pub use locator::{Candidate, EntityLocator, SearchSource, DEFAULT_SEARCH_LIMIT};
pub use operator::{Operator, OperatorIdentity};
pub use outcome::{Message, Outcome, Reporter, WorkflowRef};
pub use params::{FieldSpec, ParamBag, ParamKind, ParamShape, ParamValue};
pub use sequencer::{StepRecord, StepSequencer, MAX_PROMPT_ATTEMPTS};
pub use step::{
    ChoiceOption, ChoiceStep, ConfirmStep, DisplayStep, FileRef, InputValue, MetadataEntry,
    PromptKind, PromptStep, Theme,
};
pub use workflow::{
    Workflow, WorkflowContext, WorkflowRegistry, WorkflowRunner, MAX_REDIRECT_DEPTH,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building and running workflows
    pub use crate::{
        AdminConfig, Candidate, ChoiceOption, ChoiceStep, ConfirmStep, DisplayStep, Effect,
        EffectExecutor, EntityKind, EntityLocator, FieldPatch, InputValue, Message, MetadataEntry,
        Operator, OperatorIdentity, Outcome, ParamBag, ParamShape, PromptStep, SearchSource,
        StepSequencer, Workflow, WorkflowContext, WorkflowError, WorkflowRef, WorkflowRegistry,
        WorkflowRunner,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
