//! Sink settings (Pushover, ntfy, Discord channel).
//!
//! A sink whose settings are missing is disabled rather than rejected; the
//! registry logs which ones are off at startup.

use super::secret::SecretString;

/// Default Pushover message endpoint.
pub const DEFAULT_PUSHOVER_API_URL: &str = "https://api.pushover.net/1/messages.json";

/// Default public ntfy server.
pub const DEFAULT_NTFY_SERVER: &str = "https://ntfy.sh";

/// Default ntfy `Title` header.
pub const DEFAULT_NTFY_TITLE: &str = "OCR ALERT";

/// Default ntfy `Priority` header (max).
pub const DEFAULT_NTFY_PRIORITY: u8 = 5;

/// Discord gateway and alert-channel settings.
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    /// Bot token; mandatory, the only fatal setting.
    pub bot_token: Option<SecretString>,
    /// User id of the Nairi application whose messages are watched.
    pub app_bot_id: u64,
    /// Only watch this channel when set.
    pub source_channel_id: Option<u64>,
    /// Channel receiving alerts; the Discord sink is off when unset.
    pub alert_channel_id: Option<u64>,
    /// Mention token prepended to the alert header (e.g. `<@&1234>`).
    pub notify_prefix: String,
}

/// Pushover credentials. Both must be set for the sink to be enabled.
#[derive(Debug, Clone)]
pub struct PushoverConfig {
    pub token: Option<SecretString>,
    pub user: Option<SecretString>,
    pub api_url: String,
}

impl PushoverConfig {
    /// Token and user, or the name of the first missing variable.
    pub fn credentials(&self) -> Result<(&SecretString, &SecretString), &'static str> {
        match (&self.token, &self.user) {
            (Some(token), Some(user)) => Ok((token, user)),
            (None, _) => Err("PUSHOVER_TOKEN"),
            (Some(_), None) => Err("PUSHOVER_USER"),
        }
    }

    /// True when at least one credential is set.
    pub fn is_attempted(&self) -> bool {
        self.token.is_some() || self.user.is_some()
    }
}

/// ntfy topic settings. The sink is off when no topic is set.
#[derive(Debug, Clone)]
pub struct NtfyConfig {
    pub topic: Option<String>,
    pub server: String,
    pub title: String,
    pub priority: u8,
}

impl NtfyConfig {
    /// Full publish URL, `None` when no topic is configured.
    pub fn topic_url(&self) -> Option<String> {
        self.topic
            .as_ref()
            .map(|topic| format!("{}/{}", self.server.trim_end_matches('/'), topic))
    }
}

pub(crate) fn default_true() -> bool {
    true
}
