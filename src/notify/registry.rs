//! Notifier registry: the enabled sinks, in delivery order.

use std::sync::Arc;

use crate::config::RuntimeConfig;
use crate::error::ConfigError;

use super::{DiscordNotifier, Notifier, NtfyNotifier, PushoverNotifier};

/// Ordered set of named notifiers.
///
/// Order is registration order; dispatch reports outcomes in that order.
#[derive(Debug, Default)]
pub struct NotifierRegistry {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl NotifierRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            notifiers: Vec::new(),
        }
    }

    /// Register a notifier.
    ///
    /// # Errors
    /// Returns an error if a notifier with the same name already exists.
    pub fn register(&mut self, notifier: Arc<dyn Notifier>) -> Result<(), ConfigError> {
        if self.get(notifier.name()).is_some() {
            return Err(ConfigError::ValidationError(format!(
                "notifier '{}' already registered",
                notifier.name()
            )));
        }
        self.notifiers.push(notifier);
        Ok(())
    }

    /// Get a notifier by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Notifier>> {
        self.notifiers.iter().find(|n| n.name() == name).cloned()
    }

    /// Registered notifier names, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.notifiers.iter().map(|n| n.name())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Notifier>> {
        self.notifiers.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Build the registry from runtime settings.
    ///
    /// A sink whose settings are absent is skipped with a log line; a
    /// half-configured Pushover is a warning. Order: Discord channel,
    /// Pushover, ntfy.
    pub fn from_config(
        config: &RuntimeConfig,
        http_client: reqwest::Client,
        discord_http: Arc<serenity::http::Http>,
    ) -> Result<Self, ConfigError> {
        let mut registry = NotifierRegistry::new();

        match config.discord.alert_channel_id {
            Some(channel_id) => {
                registry.register(Arc::new(DiscordNotifier::new(
                    "discord".to_string(),
                    channel_id,
                    config.discord.notify_prefix.clone(),
                    discord_http,
                )))?;
                tracing::info!(
                    notifier_name = "discord",
                    notifier_type = "discord",
                    channel_id = channel_id,
                    "Registered notifier from config"
                );
            }
            None => tracing::info!(notifier_type = "discord", "CHANNEL_ID not set, Discord sink disabled"),
        }

        match config.pushover.credentials() {
            Ok((token, user)) => {
                registry.register(Arc::new(PushoverNotifier::new(
                    "pushover".to_string(),
                    config.pushover.api_url.clone(),
                    token.clone(),
                    user.clone(),
                    http_client.clone(),
                )))?;
                tracing::info!(
                    notifier_name = "pushover",
                    notifier_type = "pushover",
                    "Registered notifier from config"
                );
            }
            Err(missing) if config.pushover.is_attempted() => tracing::warn!(
                notifier_type = "pushover",
                missing = missing,
                "Pushover is half-configured, sink disabled"
            ),
            Err(_) => tracing::info!(notifier_type = "pushover", "Pushover credentials not set, sink disabled"),
        }

        match config.ntfy.topic_url() {
            Some(topic_url) => {
                tracing::info!(
                    notifier_name = "ntfy",
                    notifier_type = "ntfy",
                    topic_url = %topic_url,
                    "Registered notifier from config"
                );
                registry.register(Arc::new(NtfyNotifier::new(
                    "ntfy".to_string(),
                    topic_url,
                    config.ntfy.title.clone(),
                    config.ntfy.priority,
                    http_client,
                )))?;
            }
            None => tracing::info!(notifier_type = "ntfy", "NTFY_TOPIC not set, ntfy sink disabled"),
        }

        if registry.is_empty() {
            tracing::warn!("No notifier enabled, matches will only be logged");
        }

        Ok(registry)
    }
}
