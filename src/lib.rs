//! nairi-monitor - Threshold alerts from Nairi drop announcements on Discord.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod health;
pub mod keepalive;
pub mod metrics;
pub mod monitor;
pub mod notify;
pub mod parser;
pub mod template;

// Re-export commonly used types
pub use cli::LogFormat;
pub use engine::{AlertBucket, AlertRule, RuleEngine, evaluate};
pub use health::HealthServer;
pub use keepalive::KeepAlive;
pub use metrics::{install_recorder, register_metric_descriptions};
pub use monitor::{InboundMessage, Monitor, SourceFilter};
pub use notify::{AlertPayload, DispatchReport, Dispatcher, Notifier, NotifierRegistry};
pub use parser::{Row, parse_message, parse_row};
pub use template::{RenderedMessage, TemplateEngine};
