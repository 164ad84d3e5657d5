//! Startup configuration
//!
//! All external configuration is read once at process start into an
//! explicit [`AdminConfig`] and passed to the components that need it —
//! nothing reads the process environment afterwards. Optional service
//! categories (completion, storage, notification) are `None` when fully
//! unset, which causes their workflow category to be skipped at
//! registration; a *partially* set category is a startup failure.

use crate::error::WorkflowError;
use std::env;
use std::time::Duration;

/// Default public web server port
pub const DEFAULT_PORT: u16 = 4000;
/// Bounded timeout for completion calls
pub const COMPLETION_TIMEOUT: Duration = Duration::from_secs(30);
/// Bounded timeout for object-storage calls
pub const STORAGE_TIMEOUT: Duration = Duration::from_secs(30);
/// Bounded timeout for notification delivery
pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(5);

/// Public web server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: DEFAULT_PORT }
    }
}

/// AI completion service settings
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    /// API key
    pub api_key: String,
    /// Base endpoint (OpenAI-compatible)
    pub endpoint: String,
    /// Model name
    pub model: String,
    /// Request timeout
    pub timeout: Duration,
}

/// Object storage settings (single fixed bucket)
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Bucket name
    pub bucket: String,
    /// Region
    pub region: String,
    /// Custom endpoint (disables virtual-hosted URLs)
    pub endpoint: Option<String>,
    /// Access key id
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Request timeout
    pub timeout: Duration,
}

/// Notification delivery settings
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    /// Webhook URL receiving title/body/channel payloads
    pub webhook_url: String,
    /// Delivery timeout
    pub timeout: Duration,
}

/// Complete process configuration, constructed once at startup
#[derive(Debug, Clone, Default)]
pub struct AdminConfig {
    /// Public web server settings
    pub server: ServerConfig,
    /// Completion service, when configured
    pub completion: Option<CompletionConfig>,
    /// Object storage, when configured
    pub storage: Option<StorageConfig>,
    /// Notification delivery, when configured
    pub notify: Option<NotifyConfig>,
}

impl AdminConfig {
    /// Load from the process environment (`.env` files honored)
    ///
    /// # Errors
    /// - [`WorkflowError::Config`] on malformed values or partially
    ///   configured service categories
    pub fn from_env() -> Result<Self, WorkflowError> {
        // loads .env into the process environment when present
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (the testable path)
    ///
    /// # Errors
    /// - [`WorkflowError::Config`] on malformed values or partially
    ///   configured service categories
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, WorkflowError> {
        let port = match lookup("TUBEOPS_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| WorkflowError::Config(format!("TUBEOPS_PORT is not a port: {raw}")))?,
            None => DEFAULT_PORT,
        };

        let completion = lookup("OPENAI_API_KEY").map(|api_key| CompletionConfig {
            api_key,
            endpoint: lookup("OPENAI_ENDPOINT")
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            model: lookup("OPENAI_MODEL").unwrap_or_else(|| "gpt-3.5-turbo".to_string()),
            timeout: COMPLETION_TIMEOUT,
        });

        let bucket = lookup("S3_BUCKET_NAME");
        let access_key_id = lookup("AWS_KEY_ID");
        let secret_access_key = lookup("AWS_KEY_SECRET");
        let storage = match (bucket, access_key_id, secret_access_key) {
            (Some(bucket), Some(access_key_id), Some(secret_access_key)) => Some(StorageConfig {
                bucket,
                region: lookup("AWS_REGION").unwrap_or_else(|| "us-west-1".to_string()),
                endpoint: lookup("AWS_ENDPOINT"),
                access_key_id,
                secret_access_key,
                timeout: STORAGE_TIMEOUT,
            }),
            (None, None, None) => None,
            _ => {
                return Err(WorkflowError::Config(
                    "AWS_KEY_ID, AWS_KEY_SECRET, and S3_BUCKET_NAME must all be set to enable the asset manager"
                        .to_string(),
                ));
            }
        };

        let notify = lookup("NOTIFY_WEBHOOK_URL").map(|webhook_url| NotifyConfig {
            webhook_url,
            timeout: NOTIFY_TIMEOUT,
        });

        Ok(Self {
            server: ServerConfig { port },
            completion,
            storage,
            notify,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        move |key| map.get(key).map(|v| (*v).to_string())
    }

    #[test]
    fn empty_environment_yields_bare_config() {
        let config = AdminConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert!(config.completion.is_none());
        assert!(config.storage.is_none());
        assert!(config.notify.is_none());
    }

    #[test]
    fn partial_storage_fails_at_startup() {
        let err = AdminConfig::from_lookup(lookup(&[("S3_BUCKET_NAME", "assets")])).unwrap_err();
        assert!(matches!(err, WorkflowError::Config(_)));
    }

    #[test]
    fn full_storage_is_accepted() {
        let config = AdminConfig::from_lookup(lookup(&[
            ("S3_BUCKET_NAME", "assets"),
            ("AWS_KEY_ID", "AKID"),
            ("AWS_KEY_SECRET", "secret"),
            ("AWS_ENDPOINT", "http://localhost:9000"),
        ]))
        .unwrap();

        let storage = config.storage.unwrap();
        assert_eq!(storage.bucket, "assets");
        assert_eq!(storage.region, "us-west-1");
        assert_eq!(storage.endpoint.as_deref(), Some("http://localhost:9000"));
    }

    #[test]
    fn completion_defaults_endpoint_and_model() {
        let config = AdminConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        let completion = config.completion.unwrap();
        assert_eq!(completion.endpoint, "https://api.openai.com/v1");
        assert_eq!(completion.model, "gpt-3.5-turbo");
    }

    #[test]
    fn bad_port_is_a_config_error() {
        let err = AdminConfig::from_lookup(lookup(&[("TUBEOPS_PORT", "not-a-port")])).unwrap_err();
        assert!(matches!(err, WorkflowError::Config(_)));
    }
}
