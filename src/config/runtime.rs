//! Runtime configuration with compiled rules.

use super::notifiers::{DiscordConfig, NtfyConfig, PushoverConfig};
use super::secret::SecretString;
use super::types::{Config, ENV_BOT_TOKEN, HealthConfig, KeepaliveConfig};
use crate::engine::AlertRule;
use crate::error::ConfigError;
use std::time::Duration;

/// Configuration ready for the running service.
///
/// Only enabled rules are kept, in their configured order.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bot_token: SecretString,
    pub discord: DiscordConfig,
    pub pushover: PushoverConfig,
    pub ntfy: NtfyConfig,
    pub keepalive: KeepaliveConfig,
    pub health: HealthConfig,
    pub http_timeout: Duration,
    pub rules: Vec<AlertRule>,
}

impl Config {
    /// Compile a validated configuration into runtime form.
    ///
    /// # Errors
    /// Returns [`ConfigError::Missing`] when no bot token is set.
    pub fn compile(self) -> Result<RuntimeConfig, ConfigError> {
        let bot_token = self
            .discord
            .bot_token
            .clone()
            .ok_or_else(|| ConfigError::Missing(ENV_BOT_TOKEN.to_string()))?;

        let rules = self
            .rules
            .iter()
            .filter(|rule| rule.enabled)
            .map(AlertRule::from_config)
            .collect();

        Ok(RuntimeConfig {
            bot_token,
            discord: self.discord,
            pushover: self.pushover,
            ntfy: self.ntfy,
            keepalive: self.keepalive,
            health: self.health,
            http_timeout: self.http_timeout,
            rules,
        })
    }
}
