//! Core configuration types and loading.

use super::env::EnvReader;
use super::notifiers::{
    DEFAULT_NTFY_PRIORITY, DEFAULT_NTFY_SERVER, DEFAULT_NTFY_TITLE, DEFAULT_PUSHOVER_API_URL,
    DiscordConfig, NtfyConfig, PushoverConfig,
};
use super::rules::{RuleConfig, Thresholds, load_rules_file, validate_rules};
use crate::error::ConfigError;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// User id of the Nairi application.
pub const DEFAULT_APP_BOT_ID: u64 = 1312830013573169252;

/// Default port of the health server.
pub const DEFAULT_HEALTH_PORT: u16 = 3000;

/// Default period of the keep-alive self-ping.
pub const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(240);

/// Default bound on every outbound call.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

pub const ENV_BOT_TOKEN: &str = "BOT_TOKEN";
pub const ENV_APP_BOT_ID: &str = "APP_BOT_ID";
pub const ENV_SOURCE_CHANNEL_ID: &str = "SOURCE_CHANNEL_ID";
pub const ENV_CHANNEL_ID: &str = "CHANNEL_ID";
pub const ENV_NOTIFY_PREFIX: &str = "NOTIFY_PREFIX";
pub const ENV_PUSHOVER_TOKEN: &str = "PUSHOVER_TOKEN";
pub const ENV_PUSHOVER_USER: &str = "PUSHOVER_USER";
pub const ENV_PUSHOVER_API_URL: &str = "PUSHOVER_API_URL";
pub const ENV_NTFY_TOPIC: &str = "NTFY_TOPIC";
pub const ENV_NTFY_SERVER: &str = "NTFY_SERVER";
pub const ENV_NTFY_TITLE: &str = "NTFY_TITLE";
pub const ENV_NTFY_PRIORITY: &str = "NTFY_PRIORITY";
pub const ENV_KEEPALIVE_URL: &str = "KEEPALIVE_URL";
pub const ENV_RENDER_EXTERNAL_URL: &str = "RENDER_EXTERNAL_URL";
pub const ENV_KEEPALIVE_INTERVAL: &str = "KEEPALIVE_INTERVAL";
pub const ENV_HTTP_TIMEOUT: &str = "HTTP_TIMEOUT";
pub const ENV_PORT: &str = "PORT";

/// Main configuration, assembled once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    pub discord: DiscordConfig,
    pub pushover: PushoverConfig,
    pub ntfy: NtfyConfig,
    pub keepalive: KeepaliveConfig,
    pub health: HealthConfig,
    /// Bound applied to every outbound call.
    pub http_timeout: Duration,
    /// Ordered alert rules.
    pub rules: Vec<RuleConfig>,
    /// Rules file the rules came from, `None` for the `ALERT_*` set.
    pub rules_file: Option<PathBuf>,
}

/// Keep-alive self-ping settings.
#[derive(Debug, Clone)]
pub struct KeepaliveConfig {
    pub url: Option<String>,
    pub interval: Duration,
}

/// Health server settings.
#[derive(Debug, Clone)]
pub struct HealthConfig {
    pub port: u16,
}

impl Config {
    /// Build the configuration from the process environment.
    ///
    /// # Errors
    /// Returns the first unparsable value, or a rules file load error.
    pub fn from_env(rules_file: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), rules_file)
    }

    /// Build the configuration from an arbitrary key/value lookup.
    pub fn from_lookup<F>(lookup: F, rules_file: Option<&Path>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader::new(&lookup);

        let discord = DiscordConfig {
            bot_token: env.secret(ENV_BOT_TOKEN),
            app_bot_id: env.parse_or(ENV_APP_BOT_ID, DEFAULT_APP_BOT_ID)?,
            source_channel_id: env.parse_opt(ENV_SOURCE_CHANNEL_ID)?,
            alert_channel_id: env.parse_opt(ENV_CHANNEL_ID)?,
            notify_prefix: env.string_or(ENV_NOTIFY_PREFIX, ""),
        };

        let pushover = PushoverConfig {
            token: env.secret(ENV_PUSHOVER_TOKEN),
            user: env.secret(ENV_PUSHOVER_USER),
            api_url: env.string_or(ENV_PUSHOVER_API_URL, DEFAULT_PUSHOVER_API_URL),
        };

        let ntfy = NtfyConfig {
            topic: env.string(ENV_NTFY_TOPIC),
            server: env.string_or(ENV_NTFY_SERVER, DEFAULT_NTFY_SERVER),
            title: env.string_or(ENV_NTFY_TITLE, DEFAULT_NTFY_TITLE),
            priority: env.parse_or(ENV_NTFY_PRIORITY, DEFAULT_NTFY_PRIORITY)?,
        };

        let keepalive = KeepaliveConfig {
            url: env.first_of(&[ENV_KEEPALIVE_URL, ENV_RENDER_EXTERNAL_URL]),
            interval: env.duration_or(ENV_KEEPALIVE_INTERVAL, DEFAULT_KEEPALIVE_INTERVAL)?,
        };

        let health = HealthConfig {
            port: env.parse_or(ENV_PORT, DEFAULT_HEALTH_PORT)?,
        };

        let rules = match rules_file {
            Some(path) => load_rules_file(path)?,
            None => thresholds_from_env(&env)?.into_rules(),
        };

        Ok(Config {
            discord,
            pushover,
            ntfy,
            keepalive,
            health,
            http_timeout: env.duration_or(ENV_HTTP_TIMEOUT, DEFAULT_HTTP_TIMEOUT)?,
            rules,
            rules_file: rules_file.map(Path::to_path_buf),
        })
    }

    /// Validate everything at once (fail-fast at startup).
    ///
    /// # Errors
    /// Returns every problem found, not just the first one.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();

        if self.discord.bot_token.is_none() {
            errors.push(ConfigError::Missing(ENV_BOT_TOKEN.to_string()));
        }

        if self.discord.app_bot_id == 0 {
            errors.push(zero_id(ENV_APP_BOT_ID));
        }
        if self.discord.source_channel_id == Some(0) {
            errors.push(zero_id(ENV_SOURCE_CHANNEL_ID));
        }
        if self.discord.alert_channel_id == Some(0) {
            errors.push(zero_id(ENV_CHANNEL_ID));
        }

        if self.ntfy.topic.is_some() {
            if !(1..=5).contains(&self.ntfy.priority) {
                errors.push(ConfigError::InvalidNotifier {
                    name: "ntfy".to_string(),
                    message: format!("priority must be between 1 and 5, got {}", self.ntfy.priority),
                });
            }
            if reqwest::header::HeaderValue::from_str(&self.ntfy.title).is_err() {
                errors.push(ConfigError::InvalidNotifier {
                    name: "ntfy".to_string(),
                    message: format!("title '{}' is not a valid header value", self.ntfy.title),
                });
            }
        }

        if self.keepalive.url.is_some() && self.keepalive.interval.is_zero() {
            errors.push(ConfigError::InvalidValue {
                key: ENV_KEEPALIVE_INTERVAL.to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        if self.http_timeout.is_zero() {
            errors.push(ConfigError::InvalidValue {
                key: ENV_HTTP_TIMEOUT.to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        errors.extend(validate_rules(&self.rules));

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn zero_id(key: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: "Discord ids are never zero".to_string(),
    }
}

fn thresholds_from_env(env: &EnvReader<'_>) -> Result<Thresholds, ConfigError> {
    let d = Thresholds::default();
    Ok(Thresholds {
        a_left_min: env.parse_or("ALERT_A_LEFT_MIN", d.a_left_min)?,
        a_right_max: env.parse_or("ALERT_A_RIGHT_MAX", d.a_right_max)?,
        b_left_min: env.parse_or("ALERT_B_LEFT_MIN", d.b_left_min)?,
        b_right_max: env.parse_or("ALERT_B_RIGHT_MAX", d.b_right_max)?,
        c_left_above: env.parse_or("ALERT_C_LEFT_ABOVE", d.c_left_above)?,
        c_right_max: env.parse_or("ALERT_C_RIGHT_MAX", d.c_right_max)?,
        d_right_min: env.parse_or("ALERT_D_RIGHT_MIN", d.d_right_min)?,
        d_right_max: env.parse_or("ALERT_D_RIGHT_MAX", d.d_right_max)?,
        e_left_min: env.parse_or("ALERT_E_LEFT_MIN", d.e_left_min)?,
        e_label: env.string_or("ALERT_E_LABEL", &d.e_label),
    })
}
