//! ntfy notifier.
//!
//! Publishes the rendered text to a topic URL with `Title` and `Priority`
//! headers. Topics are public, so no credentials are involved.

use crate::error::NotifyError;
use crate::notify::{AlertPayload, Notifier};
use async_trait::async_trait;

#[derive(Debug)]
pub struct NtfyNotifier {
    name: String,
    topic_url: String,
    title: String,
    priority: u8,
    client: reqwest::Client,
}

impl NtfyNotifier {
    pub fn new(
        name: String,
        topic_url: String,
        title: String,
        priority: u8,
        client: reqwest::Client,
    ) -> Self {
        Self {
            name,
            topic_url,
            title,
            priority,
            client,
        }
    }
}

#[async_trait]
impl Notifier for NtfyNotifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn notifier_type(&self) -> &str {
        "ntfy"
    }

    async fn send(&self, alert: &AlertPayload) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.topic_url)
            .header("Title", &self.title)
            .header("Priority", self.priority.to_string())
            .body(alert.message.text())
            .send()
            .await
            .map_err(|e| NotifyError::SendFailed(e.to_string()))?;

        let status = response.status();
        tracing::debug!(status = %status, "ntfy responded");

        if status.is_success() {
            Ok(())
        } else {
            Err(NotifyError::Rejected(status.as_u16()))
        }
    }
}
