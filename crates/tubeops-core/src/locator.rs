//! Entity location
//!
//! Resolves a free-text query or direct identifier to domain rows through a
//! search callback supplied by the persistence collaborator. Results are
//! capped so response size stays bounded regardless of table size; the cap
//! is enforced here by truncation even if a source misbehaves.

use crate::error::WorkflowError;
use crate::sequencer::StepSequencer;
use crate::step::{ChoiceOption, ChoiceStep, PromptStep};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Default cap on candidates returned per search
pub const DEFAULT_SEARCH_LIMIT: usize = 10;

/// A search result offered to the operator for selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Primary identifier of the underlying row
    pub id: String,
    /// Rendered label
    pub label: String,
    /// Secondary descriptive line
    pub description: Option<String>,
    /// Preview image, when the entity has one
    pub image_url: Option<String>,
}

impl Candidate {
    /// Candidate with a label only
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            description: None,
            image_url: None,
        }
    }

    /// Attach a description line
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach a preview image
    #[inline]
    #[must_use]
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

/// Search callback supplied by the persistence collaborator
///
/// Implementations perform a case-insensitive substring match over one
/// designated display field and return rows in a documented, deterministic
/// order. They should respect `limit`, but the locator truncates anyway.
#[async_trait]
pub trait SearchSource: Send + Sync {
    /// Entity kind label used in prompts and errors
    fn entity(&self) -> &'static str;

    /// Rows matching `query`, at most `limit`
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, WorkflowError>;
}

/// Interactive resolver from query/identifier to one selected candidate
#[derive(Clone)]
pub struct EntityLocator {
    source: Arc<dyn SearchSource>,
    limit: usize,
}

impl EntityLocator {
    /// Locator with the default result cap
    #[inline]
    #[must_use]
    pub fn new(source: Arc<dyn SearchSource>) -> Self {
        Self {
            source,
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    /// Override the result cap
    #[inline]
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Capped candidate list for one query
    ///
    /// # Errors
    /// Propagates search backend failures verbatim.
    pub async fn candidates(&self, query: &str) -> Result<Vec<Candidate>, WorkflowError> {
        let mut candidates = self.source.search(query, self.limit).await?;
        candidates.truncate(self.limit);
        Ok(candidates)
    }

    /// Drive the interactive search loop until the operator picks one row
    ///
    /// Prompts for a query, lists candidates, and returns the selection;
    /// an empty result set re-prompts with a notice.
    ///
    /// # Errors
    /// - operator failures, verbatim
    /// - search backend failures, verbatim
    pub async fn locate(
        &self,
        io: &StepSequencer,
        label: &str,
    ) -> Result<Candidate, WorkflowError> {
        loop {
            let query = io.prompt(PromptStep::text(label)).await?;
            let query = query.as_text().unwrap_or_default();

            let candidates = self.candidates(query).await?;
            if candidates.is_empty() {
                io.notice(format!("no {} matches `{query}`", self.source.entity()))
                    .await?;
                continue;
            }

            let options = candidates
                .iter()
                .map(|c| {
                    let label = match &c.description {
                        Some(description) => format!("{} - {description}", c.label),
                        None => c.label.clone(),
                    };
                    ChoiceOption::new(label, c.id.clone())
                })
                .collect();

            let selected = io
                .choose(ChoiceStep::single(format!("Select a {}", self.source.entity()), options))
                .await?;

            if let Some(candidate) = candidates.into_iter().find(|c| c.id == selected) {
                return Ok(candidate);
            }
            // selection validated against the option set, so this is unreachable
            // in practice; treat defensively as a fresh search
        }
    }
}
