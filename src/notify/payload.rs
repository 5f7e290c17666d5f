//! Alert payload for notification system.

use crate::template::RenderedMessage;

/// One rendered bucket, ready to be sent to every notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertPayload {
    /// Rule name for tracing and metrics.
    pub rule_name: String,
    /// Rendered header and body.
    pub message: RenderedMessage,
}

impl AlertPayload {
    pub fn new(rule_name: impl Into<String>, message: RenderedMessage) -> Self {
        Self {
            rule_name: rule_name.into(),
            message,
        }
    }
}
