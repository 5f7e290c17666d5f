//! Discord gateway client.
//!
//! Receives `message` events and hands the watched ones to the [`Monitor`].
//! Reconnects are serenity's job; this module only wires events in and
//! shuts the shards down on cancellation.

use std::sync::Arc;

use anyhow::Result;
use serenity::all::{Context, EventHandler, GatewayIntents, Message, Ready};
use serenity::Client;
use tokio_util::sync::CancellationToken;

use crate::config::SecretString;
use crate::monitor::{InboundMessage, Monitor};

/// Intents needed to read message content in guild channels.
pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT
}

struct Handler {
    monitor: Arc<Monitor>,
}

#[async_trait::async_trait]
impl EventHandler for Handler {
    async fn message(&self, _ctx: Context, msg: Message) {
        let inbound = InboundMessage {
            author_id: msg.author.id.get(),
            channel_id: msg.channel_id.get(),
            content: &msg.content,
        };

        if let Some(report) = self.monitor.handle(&inbound).await
            && !report.is_empty()
        {
            tracing::info!(
                message_id = msg.id.get(),
                delivered = report.delivered(),
                failed = report.failed(),
                "Message handled"
            );
        }
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        tracing::info!(
            user = %ready.user.name,
            guild_count = ready.guilds.len(),
            "Connected to Discord gateway"
        );
    }
}

/// Run the gateway client until it fails or `cancel` fires.
///
/// # Errors
/// Returns the client error when the gateway connection cannot be kept up.
pub async fn run(token: &SecretString, monitor: Arc<Monitor>, cancel: CancellationToken) -> Result<()> {
    let mut client = Client::builder(token.expose(), intents())
        .event_handler(Handler { monitor })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to build Discord client: {}", e))?;

    let shard_manager = client.shard_manager.clone();

    tokio::select! {
        result = client.start() => {
            result.map_err(|e| anyhow::anyhow!("Discord client error: {}", e))
        }
        _ = cancel.cancelled() => {
            tracing::info!("Shutting down Discord shards");
            shard_manager.shutdown_all().await;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intents_include_message_content() {
        let intents = intents();
        assert!(intents.contains(GatewayIntents::MESSAGE_CONTENT));
        assert!(intents.contains(GatewayIntents::GUILD_MESSAGES));
        assert!(!intents.contains(GatewayIntents::GUILD_PRESENCES));
    }
}
