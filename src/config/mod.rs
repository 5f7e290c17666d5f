//! Configuration loading and validation for nairi-monitor.
//!
//! Settings come from environment variables; the alert rules come from the
//! `ALERT_*` thresholds or from an optional YAML rules file.

mod env;
mod notifiers;
mod rules;
mod runtime;
mod secret;
mod types;
mod validation;

pub use notifiers::{
    DEFAULT_NTFY_PRIORITY, DEFAULT_NTFY_SERVER, DEFAULT_NTFY_TITLE, DEFAULT_PUSHOVER_API_URL,
    DiscordConfig, NtfyConfig, PushoverConfig,
};
pub use rules::{DEFAULT_TITLE_TEMPLATE, RuleCondition, RuleConfig, Thresholds, load_rules_file};
pub use runtime::RuntimeConfig;
pub use secret::SecretString;
pub use types::{
    Config, DEFAULT_APP_BOT_ID, DEFAULT_HEALTH_PORT, DEFAULT_HTTP_TIMEOUT,
    DEFAULT_KEEPALIVE_INTERVAL, HealthConfig, KeepaliveConfig,
};
pub use validation::validate_template_render;
