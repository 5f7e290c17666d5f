//! Notifier trait definition.

use async_trait::async_trait;

use super::AlertPayload;
use crate::error::NotifyError;

/// A destination for rendered alerts.
///
/// Implementations must be `Send + Sync` to work across async tasks.
/// A send is attempted exactly once; there is no retry at any layer.
///
/// # Example
///
/// ```ignore
/// use nairi_monitor::notify::{Notifier, AlertPayload};
///
/// struct StdoutNotifier;
///
/// #[async_trait]
/// impl Notifier for StdoutNotifier {
///     fn name(&self) -> &str { "stdout" }
///     fn notifier_type(&self) -> &str { "stdout" }
///     async fn send(&self, alert: &AlertPayload) -> Result<(), NotifyError> {
///         println!("{}", alert.message.text());
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Unique name of this notifier instance (e.g., "discord").
    fn name(&self) -> &str;

    /// Type of the notifier (e.g., "pushover", "ntfy", "discord").
    fn notifier_type(&self) -> &str;

    /// Deliver one rendered alert.
    ///
    /// # Errors
    /// Any transport failure, non-success response or unresolvable target.
    async fn send(&self, alert: &AlertPayload) -> Result<(), NotifyError>;
}

impl std::fmt::Debug for dyn Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("name", &self.name())
            .field("type", &self.notifier_type())
            .finish()
    }
}
