//! Per-message pipeline: filter, parse, evaluate, render, dispatch.
//!
//! ```text
//! gateway.rs -> monitor.rs -> parser.rs -> engine.rs -> template.rs -> notify/
//! ```
//!
//! Every message is handled independently. The monitor holds only
//! configuration that never changes after startup, so concurrent calls to
//! [`Monitor::handle`] need no locking.

use tracing::Instrument;

use crate::config::RuntimeConfig;
use crate::engine::{AlertBucket, RuleEngine};
use crate::notify::{AlertPayload, DispatchReport, Dispatcher};
use crate::parser::{self, ROW_DELIMITER};
use crate::template::TemplateEngine;

/// The parts of a chat message the monitor looks at.
#[derive(Debug, Clone, Copy)]
pub struct InboundMessage<'a> {
    pub author_id: u64,
    pub channel_id: u64,
    pub content: &'a str,
}

/// Which messages are worth parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFilter {
    pub app_bot_id: u64,
    pub source_channel_id: Option<u64>,
}

impl SourceFilter {
    pub fn accepts(&self, message: &InboundMessage<'_>) -> bool {
        if message.author_id != self.app_bot_id {
            return false;
        }
        if let Some(channel) = self.source_channel_id
            && message.channel_id != channel
        {
            return false;
        }
        message.content.contains(ROW_DELIMITER)
    }
}

#[derive(Debug)]
pub struct Monitor {
    filter: SourceFilter,
    engine: RuleEngine,
    templates: TemplateEngine,
    dispatcher: Dispatcher,
}

impl Monitor {
    pub fn new(
        filter: SourceFilter,
        engine: RuleEngine,
        templates: TemplateEngine,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            filter,
            engine,
            templates,
            dispatcher,
        }
    }

    /// Assemble the monitor from runtime settings and a built dispatcher.
    pub fn from_config(config: &RuntimeConfig, dispatcher: Dispatcher) -> Self {
        let filter = SourceFilter {
            app_bot_id: config.discord.app_bot_id,
            source_channel_id: config.discord.source_channel_id,
        };
        Self::new(
            filter,
            RuleEngine::new(config.rules.clone()),
            TemplateEngine::new(&config.rules),
            dispatcher,
        )
    }

    pub fn filter(&self) -> &SourceFilter {
        &self.filter
    }

    pub fn accepts(&self, message: &InboundMessage<'_>) -> bool {
        self.filter.accepts(message)
    }

    /// Parse the text and evaluate every rule. No I/O.
    pub fn evaluate(&self, content: &str) -> Vec<AlertBucket> {
        let rows = parser::parse_message(content);
        metrics::counter!("nairi_rows_parsed_total").increment(rows.len() as u64);
        tracing::debug!(row_count = rows.len(), "Rows parsed");
        self.engine.evaluate(&rows)
    }

    /// Render buckets into payloads, in bucket order.
    pub fn render(&self, buckets: &[AlertBucket]) -> Vec<AlertPayload> {
        buckets
            .iter()
            .map(|bucket| AlertPayload::new(&bucket.rule_name, self.templates.render_with_fallback(bucket)))
            .collect()
    }

    /// Handle one inbound message.
    ///
    /// Returns `None` when the message is filtered out, otherwise the
    /// delivery report (empty when nothing matched).
    pub async fn handle(&self, message: &InboundMessage<'_>) -> Option<DispatchReport> {
        if !self.accepts(message) {
            return None;
        }

        let span = tracing::info_span!(
            "handle_message",
            channel_id = message.channel_id,
        );

        let report = async {
            metrics::counter!("nairi_messages_seen_total").increment(1);

            let buckets = self.evaluate(message.content);
            if buckets.is_empty() {
                tracing::debug!("No rule matched");
                return DispatchReport::default();
            }

            tracing::info!(
                bucket_count = buckets.len(),
                rules = ?buckets.iter().map(|b| b.rule_name.as_str()).collect::<Vec<_>>(),
                "Rules matched"
            );

            let payloads = self.render(&buckets);
            self.dispatcher.dispatch(&payloads).await
        }
        .instrument(span)
        .await;

        Some(report)
    }
}
