//! Workflow trait, registry, and runner
//!
//! A workflow is one admin action or page: a declared parameter shape plus
//! a handler that drives the sequencer and issues effects. The runner owns
//! the control flow of an invocation: resolve parameters, run the handler,
//! then either return the finish message or follow a redirect into another
//! workflow (re-resolving against the target's shape) up to a depth cap.

use crate::effect::{Effect, EffectExecutor, EffectReceipt};
use crate::error::WorkflowError;
use crate::operator::{Operator, OperatorIdentity};
use crate::outcome::{Message, Outcome, Reporter};
use crate::params::{ParamBag, ParamShape};
use crate::sequencer::StepSequencer;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

/// Redirect chain length at which the runner gives up
pub const MAX_REDIRECT_DEPTH: usize = 8;

/// Everything a handler needs for one invocation
pub struct WorkflowContext {
    io: StepSequencer,
    operator: Arc<dyn Operator>,
    effects: Arc<dyn EffectExecutor>,
    reporter: Reporter,
}

impl WorkflowContext {
    /// Context for one invocation
    #[must_use]
    pub fn new(
        operator: Arc<dyn Operator>,
        params: ParamBag,
        effects: Arc<dyn EffectExecutor>,
    ) -> Self {
        Self {
            io: StepSequencer::new(operator.clone(), params),
            operator,
            effects,
            reporter: Reporter::new(),
        }
    }

    /// Step sequencer for this invocation
    #[inline]
    #[must_use]
    pub fn io(&self) -> &StepSequencer {
        &self.io
    }

    /// Resolved invocation parameters
    #[inline]
    #[must_use]
    pub fn params(&self) -> &ParamBag {
        self.io.params()
    }

    /// Identity of the operator driving this invocation
    #[inline]
    #[must_use]
    pub fn operator(&self) -> OperatorIdentity {
        self.operator.identity()
    }

    /// Effect executor backing this invocation
    #[inline]
    #[must_use]
    pub fn effects(&self) -> &Arc<dyn EffectExecutor> {
        &self.effects
    }

    /// Outcome reporter for this invocation
    #[inline]
    #[must_use]
    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Apply one effect, logging it at the mutation seam
    ///
    /// # Errors
    /// Propagates executor failures verbatim.
    pub async fn apply(&self, effect: Effect) -> Result<EffectReceipt, WorkflowError> {
        tracing::info!(entity = effect.entity().label(), destructive = effect.is_destructive(), "applying effect");
        self.effects.apply(effect).await
    }
}

/// One admin action or page
#[async_trait]
pub trait Workflow: Send + Sync {
    /// Stable slug used for registration, redirects and deep links
    fn slug(&self) -> &'static str;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Hidden from the listed catalog (reachable via redirect/deep link)
    fn unlisted(&self) -> bool {
        false
    }

    /// Declared parameter shape
    fn params(&self) -> ParamShape {
        ParamShape::empty()
    }

    /// Drive the invocation
    async fn run(&self, ctx: &WorkflowContext) -> Result<(), WorkflowError>;
}

/// Slug-keyed workflow catalog
#[derive(Default)]
pub struct WorkflowRegistry {
    entries: DashMap<String, Arc<dyn Workflow>>,
}

impl WorkflowRegistry {
    /// Empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a workflow under its slug (latest registration wins)
    pub fn register(&self, workflow: Arc<dyn Workflow>) {
        tracing::debug!(slug = workflow.slug(), "registering workflow");
        self.entries.insert(workflow.slug().to_string(), workflow);
    }

    /// Lookup by slug
    #[must_use]
    pub fn get(&self, slug: &str) -> Option<Arc<dyn Workflow>> {
        self.entries.get(slug).map(|e| Arc::clone(e.value()))
    }

    /// Sorted slugs of listed (non-hidden) workflows
    #[must_use]
    pub fn listed(&self) -> Vec<(String, &'static str)> {
        let mut listed: Vec<(String, &'static str)> = self
            .entries
            .iter()
            .filter(|e| !e.value().unlisted())
            .map(|e| (e.key().clone(), e.value().name()))
            .collect();
        listed.sort();
        listed
    }

    /// Number of registered workflows
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Drives invocations through the registry, following redirects
pub struct WorkflowRunner {
    registry: Arc<WorkflowRegistry>,
    effects: Arc<dyn EffectExecutor>,
}

impl WorkflowRunner {
    /// Runner over a registry and the shared effect executor
    #[inline]
    #[must_use]
    pub fn new(registry: Arc<WorkflowRegistry>, effects: Arc<dyn EffectExecutor>) -> Self {
        Self { registry, effects }
    }

    /// The backing registry
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &Arc<WorkflowRegistry> {
        &self.registry
    }

    /// Invoke a workflow by slug with a raw parameter bag
    ///
    /// Redirect outcomes re-enter the loop against the target workflow's
    /// own parameter shape; a handler that sets no outcome finishes with a
    /// default message.
    ///
    /// # Errors
    /// - [`WorkflowError::UnknownWorkflow`] for unregistered slugs
    /// - [`WorkflowError::RedirectDepthExceeded`] past [`MAX_REDIRECT_DEPTH`]
    /// - handler failures, verbatim
    pub async fn invoke(
        &self,
        slug: &str,
        bag: ParamBag,
        operator: Arc<dyn Operator>,
    ) -> Result<Message, WorkflowError> {
        let mut slug = slug.to_string();
        let mut bag = bag;

        for _depth in 0..=MAX_REDIRECT_DEPTH {
            let workflow = self
                .registry
                .get(&slug)
                .ok_or_else(|| WorkflowError::UnknownWorkflow(slug.clone()))?;

            let resolved = workflow.params().resolve(&bag)?;
            tracing::info!(slug = %slug, params = resolved.len(), "invoking workflow");

            let ctx = WorkflowContext::new(operator.clone(), resolved, Arc::clone(&self.effects));
            if let Err(err) = workflow.run(&ctx).await {
                tracing::error!(slug = %slug, error = %err, "workflow failed");
                return Err(err);
            }

            match ctx.reporter.take() {
                Some(Outcome::Finished(message)) => return Ok(message),
                Some(Outcome::Redirect { target, params }) => {
                    tracing::info!(from = %slug, to = %target, "workflow redirect");
                    slug = target.slug().to_string();
                    bag = params;
                }
                None => return Ok(Message::new("Completed")),
            }
        }

        Err(WorkflowError::RedirectDepthExceeded(MAX_REDIRECT_DEPTH))
    }
}
