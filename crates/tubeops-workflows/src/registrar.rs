//! Workflow registration
//!
//! Wires the catalog against the startup configuration. Categories whose
//! external service is not configured are skipped at registration time —
//! a missing credential disables the category at startup instead of
//! failing per invocation. A *partially* configured category never gets
//! this far: [`AdminConfig`] already rejects it.

use crate::assets::{AssetBrowser, AssetDelete, AssetUpload};
use crate::flags::FeatureFlagManager;
use crate::moderation::ModerateComment;
use crate::query::DatabaseQuery;
use crate::support::{CloseTicket, CreateTicket, SupportDashboard};
use crate::system::SystemInfo;
use crate::users::{AddUserNote, OnboardProUser, OnboardUser, UsersOverview, VerifyUser};
use std::sync::Arc;
use tubeops_core::{AdminConfig, WorkflowError, WorkflowRegistry};
use tubeops_services::{
    AssetManager, CompletionClient, Notifier, NullNotifier, OpenAiClient, WebhookNotifier,
};
use tubeops_store::{DeletionScheduler, LedgerScheduler, MemoryStore, SqlBackend};

/// Collaborator handles shared by the workflow catalog
pub struct WorkflowDeps {
    /// Persistence collaborator
    pub store: Arc<MemoryStore>,
    /// Deletion-scheduling collaborator
    pub scheduler: Arc<dyn DeletionScheduler>,
    /// Notification collaborator
    pub notifier: Arc<dyn Notifier>,
    /// SQL introspection collaborator
    pub sql: Arc<dyn SqlBackend>,
    /// Completion client, when configured
    pub completion: Option<Arc<dyn CompletionClient>>,
    /// Asset manager, when storage is configured
    pub assets: Option<Arc<AssetManager>>,
}

impl WorkflowDeps {
    /// Build collaborators from the startup configuration
    ///
    /// # Errors
    /// - [`WorkflowError::Config`] when a configured service client cannot
    ///   be constructed
    pub fn from_config(
        config: &AdminConfig,
        store: Arc<MemoryStore>,
    ) -> Result<Self, WorkflowError> {
        let completion = match &config.completion {
            Some(cfg) => {
                Some(Arc::new(OpenAiClient::new(cfg.clone())?) as Arc<dyn CompletionClient>)
            }
            None => None,
        };

        let assets = match &config.storage {
            Some(cfg) => Some(Arc::new(AssetManager::from_config(cfg)?)),
            None => None,
        };

        let notifier: Arc<dyn Notifier> = match &config.notify {
            Some(cfg) => Arc::new(WebhookNotifier::new(cfg.clone())),
            None => Arc::new(NullNotifier),
        };

        Ok(Self {
            scheduler: Arc::new(LedgerScheduler::new(Arc::clone(&store))),
            sql: Arc::clone(&store) as Arc<dyn SqlBackend>,
            notifier,
            completion,
            assets,
            store,
        })
    }
}

/// Register every available workflow into the registry
pub fn register_all(registry: &WorkflowRegistry, deps: &WorkflowDeps) {
    registry.register(Arc::new(ModerateComment::new(
        Arc::clone(&deps.store),
        Arc::clone(&deps.scheduler),
    )));
    registry.register(Arc::new(FeatureFlagManager::new(Arc::clone(&deps.store))));
    registry.register(Arc::new(UsersOverview::new(Arc::clone(&deps.store))));
    registry.register(Arc::new(VerifyUser::new(Arc::clone(&deps.store))));
    registry.register(Arc::new(OnboardUser::new(Arc::clone(&deps.store))));
    registry.register(Arc::new(OnboardProUser::new(
        Arc::clone(&deps.store),
        Arc::clone(&deps.notifier),
    )));
    registry.register(Arc::new(AddUserNote::new(Arc::clone(&deps.store))));
    registry.register(Arc::new(SupportDashboard::new(Arc::clone(&deps.store))));
    registry.register(Arc::new(CreateTicket::new()));
    registry.register(Arc::new(CloseTicket::new(Arc::clone(&deps.store))));
    registry.register(Arc::new(SystemInfo::new()));

    match &deps.completion {
        Some(completion) => {
            registry.register(Arc::new(DatabaseQuery::new(
                Arc::clone(&deps.sql),
                Arc::clone(completion),
            )));
        }
        None => tracing::warn!("completion not configured; database_query disabled"),
    }

    match &deps.assets {
        Some(manager) => {
            registry.register(Arc::new(AssetBrowser::new(Arc::clone(manager))));
            registry.register(Arc::new(AssetDelete::new(Arc::clone(manager))));
            registry.register(Arc::new(AssetUpload::new(Arc::clone(manager))));
        }
        None => tracing::warn!("storage not configured; asset manager disabled"),
    }

    tracing::info!(workflows = registry.len(), "workflow catalog registered");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tubeops_core::CompletionConfig;

    fn base_deps() -> WorkflowDeps {
        let store = Arc::new(MemoryStore::new());
        WorkflowDeps::from_config(&AdminConfig::default(), store).unwrap()
    }

    #[test]
    fn bare_config_registers_the_ungated_catalog() {
        let registry = WorkflowRegistry::new();
        register_all(&registry, &base_deps());

        assert!(registry.get("moderate_comment").is_some());
        assert!(registry.get("support/close_ticket").is_some());
        assert!(registry.get("database_query").is_none());
        assert!(registry.get("assets").is_none());
    }

    #[test]
    fn completion_config_enables_the_query_category() {
        let store = Arc::new(MemoryStore::new());
        let config = AdminConfig {
            completion: Some(CompletionConfig {
                api_key: "sk-test".into(),
                endpoint: "https://api.openai.com/v1".into(),
                model: "gpt-3.5-turbo".into(),
                timeout: std::time::Duration::from_secs(30),
            }),
            ..AdminConfig::default()
        };

        let deps = WorkflowDeps::from_config(&config, store).unwrap();
        let registry = WorkflowRegistry::new();
        register_all(&registry, &deps);

        assert!(registry.get("database_query").is_some());
    }
}
