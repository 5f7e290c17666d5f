//! Centralized error types for nairi-monitor using thiserror.
//!
//! Row parsing has no error type: a line that is not a data row is simply
//! skipped. Everything that can go wrong elsewhere is listed here.

use thiserror::Error;

/// Errors related to configuration loading and validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load rules file: {0}")]
    LoadError(String),
    #[error("invalid configuration: {0}")]
    ValidationError(String),
    #[error("missing required setting: {0}")]
    Missing(String),
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
    #[error("invalid rule '{rule}': {message}")]
    InvalidRule { rule: String, message: String },
    #[error("invalid template in rule '{rule}': {message}")]
    InvalidTemplate { rule: String, message: String },
    #[error("invalid notifier '{name}': {message}")]
    InvalidNotifier { name: String, message: String },
}

/// Errors related to sending a notification to a sink.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("failed to send notification: {0}")]
    SendFailed(String),
    #[error("sink rejected notification with status {0}")]
    Rejected(u16),
    #[error("channel {0} could not be resolved")]
    ChannelUnavailable(u64),
    #[error("notification timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Errors related to template rendering.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template for rule '{rule}' not found")]
    NotFound { rule: String },
    #[error("template render failed: {message}")]
    RenderFailed { message: String },
}
