//! Notification sinks for nairi-monitor alerts.
//!
//! - `Notifier` trait, one implementation per sink
//! - `NotifierRegistry`, the enabled sinks in delivery order
//! - `Dispatcher`, bounded best-effort fan-out with a per-send report
//!
//! # Architecture
//!
//! ```text
//! parser.rs -> engine.rs -> template.rs -> notify/ -> Discord, Pushover, ntfy
//! ```
//!
//! No queue, no retry: each alert is attempted once per sink, as soon as the
//! message that produced it has been evaluated.

mod discord;
mod dispatch;
mod ntfy;
mod payload;
mod pushover;
mod registry;
mod traits;

pub use discord::{DiscordNotifier, format_discord_message};
pub use dispatch::{DeliveryOutcome, DispatchReport, Dispatcher};
pub use ntfy::NtfyNotifier;
pub use payload::AlertPayload;
pub use pushover::PushoverNotifier;
pub use registry::NotifierRegistry;
pub use traits::Notifier;
