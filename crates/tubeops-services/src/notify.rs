//! Outbound notifications
//!
//! Fire-and-forget messages to a named delivery channel (Slack-style
//! webhook). Delivery failure never rolls back the mutation that triggered
//! the notification; it is logged and swallowed.

use async_trait::async_trait;
use serde::Serialize;
use tubeops_core::NotifyConfig;

/// One outbound message
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    /// Message title
    pub title: String,
    /// Message body
    pub body: String,
    /// Named delivery channel, e.g. `#new-user-papertrail`
    pub channel: String,
}

impl Notification {
    /// Notification to a channel
    #[inline]
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            channel: channel.into(),
        }
    }
}

/// Delivers notifications, best effort
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one notification; failures are logged, never returned
    async fn notify(&self, notification: Notification);
}

/// Webhook-backed notifier
pub struct WebhookNotifier {
    http: reqwest::Client,
    config: NotifyConfig,
}

impl WebhookNotifier {
    /// Notifier from startup configuration
    ///
    /// Falls back to a default client when the builder fails (delivery is
    /// best effort either way).
    #[must_use]
    pub fn new(config: NotifyConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        Self { http, config }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, notification: Notification) {
        let result = self
            .http
            .post(&self.config.webhook_url)
            .json(&notification)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(channel = %notification.channel, "notification delivered");
            }
            Ok(response) => {
                tracing::warn!(
                    channel = %notification.channel,
                    status = %response.status(),
                    "notification rejected"
                );
            }
            Err(error) => {
                tracing::warn!(channel = %notification.channel, %error, "notification failed");
            }
        }
    }
}

/// Notifier used when no delivery channel is configured
#[derive(Debug, Default)]
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, notification: Notification) {
        tracing::info!(
            channel = %notification.channel,
            title = %notification.title,
            "notification skipped (no delivery configured)"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_serializes_with_channel() {
        let notification = Notification::new(
            "New professional user",
            "Noor Haddad has been onboarded",
            "#new-user-papertrail",
        );
        let value = serde_json::to_value(&notification).unwrap();
        assert_eq!(value["channel"], "#new-user-papertrail");
        assert_eq!(value["title"], "New professional user");
    }

    #[tokio::test]
    async fn null_notifier_swallows_everything() {
        NullNotifier
            .notify(Notification::new("t", "b", "#c"))
            .await;
    }
}
