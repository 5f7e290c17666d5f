//! Discord channel notifier.
//!
//! Resolves the alert channel through the Discord HTTP API on every send,
//! then posts the alert as a new message, with the optional mention prefix
//! ahead of the bold header line.

use crate::error::NotifyError;
use crate::notify::{AlertPayload, Notifier};
use crate::template::RenderedMessage;
use async_trait::async_trait;
use serenity::http::Http;
use serenity::model::id::ChannelId;
use std::sync::Arc;

/// Discord refuses message content above this many characters.
const DISCORD_MAX_CONTENT: usize = 2000;

/// Build the channel message for a rendered alert.
pub fn format_discord_message(prefix: &str, message: &RenderedMessage) -> String {
    let prefix = prefix.trim();
    let content = if prefix.is_empty() {
        format!("**{}**\n{}", message.title, message.body)
    } else {
        format!("{} **{}**\n{}", prefix, message.title, message.body)
    };

    match content.char_indices().nth(DISCORD_MAX_CONTENT) {
        Some((idx, _)) => content[..idx].to_string(),
        None => content,
    }
}

pub struct DiscordNotifier {
    name: String,
    channel_id: u64,
    prefix: String,
    http: Arc<Http>,
}

impl DiscordNotifier {
    pub fn new(name: String, channel_id: u64, prefix: String, http: Arc<Http>) -> Self {
        Self {
            name,
            channel_id,
            prefix,
            http,
        }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn notifier_type(&self) -> &str {
        "discord"
    }

    async fn send(&self, alert: &AlertPayload) -> Result<(), NotifyError> {
        let channel = self
            .http
            .get_channel(ChannelId::new(self.channel_id))
            .await
            .map_err(|e| {
                tracing::warn!(
                    channel_id = self.channel_id,
                    error = %e,
                    "Failed to resolve alert channel"
                );
                NotifyError::ChannelUnavailable(self.channel_id)
            })?;

        let content = format_discord_message(&self.prefix, &alert.message);
        channel
            .id()
            .say(&*self.http, content)
            .await
            .map_err(|e| NotifyError::SendFailed(e.to_string()))?;

        Ok(())
    }
}

impl std::fmt::Debug for DiscordNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordNotifier")
            .field("name", &self.name)
            .field("channel_id", &self.channel_id)
            .field("prefix", &self.prefix)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> RenderedMessage {
        RenderedMessage {
            title: "Alert A".to_string(),
            body: "(20 / 150)\n(44 / 12)".to_string(),
        }
    }

    #[test]
    fn message_without_prefix_bolds_title() {
        assert_eq!(
            format_discord_message("", &message()),
            "**Alert A**\n(20 / 150)\n(44 / 12)"
        );
    }

    #[test]
    fn prefix_goes_before_the_title() {
        assert_eq!(
            format_discord_message("<@&555>", &message()),
            "<@&555> **Alert A**\n(20 / 150)\n(44 / 12)"
        );
    }

    #[test]
    fn oversized_content_is_cut() {
        let long = RenderedMessage {
            title: "Alert C".to_string(),
            body: "(4 / 9)\n".repeat(400),
        };
        assert_eq!(
            format_discord_message("", &long).chars().count(),
            DISCORD_MAX_CONTENT
        );
    }
}
