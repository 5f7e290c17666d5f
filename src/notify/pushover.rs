//! Pushover notifier.
//!
//! Posts the rendered alert as a form to the Pushover messages endpoint.
//! The response status is checked but never retried.

use crate::config::SecretString;
use crate::error::NotifyError;
use crate::notify::{AlertPayload, Notifier};
use async_trait::async_trait;

/// Pushover rejects messages longer than this many characters.
const PUSHOVER_MAX_MESSAGE: usize = 1024;

/// Pushover rejects titles longer than this many characters.
const PUSHOVER_MAX_TITLE: usize = 250;

/// Cut `text` to at most `max` characters.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

pub struct PushoverNotifier {
    name: String,
    api_url: String,
    token: SecretString,
    user: SecretString,
    client: reqwest::Client,
}

impl PushoverNotifier {
    pub fn new(
        name: String,
        api_url: String,
        token: SecretString,
        user: SecretString,
        client: reqwest::Client,
    ) -> Self {
        Self {
            name,
            api_url,
            token,
            user,
            client,
        }
    }
}

#[async_trait]
impl Notifier for PushoverNotifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn notifier_type(&self) -> &str {
        "pushover"
    }

    async fn send(&self, alert: &AlertPayload) -> Result<(), NotifyError> {
        let text = alert.message.text();
        let form = [
            ("token", self.token.expose()),
            ("user", self.user.expose()),
            ("title", truncate_chars(&alert.message.title, PUSHOVER_MAX_TITLE)),
            ("message", truncate_chars(&text, PUSHOVER_MAX_MESSAGE)),
        ];

        let response = self
            .client
            .post(&self.api_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| NotifyError::SendFailed(e.to_string()))?;

        let status = response.status();
        tracing::debug!(status = %status, "Pushover responded");

        if status.is_success() {
            Ok(())
        } else {
            Err(NotifyError::Rejected(status.as_u16()))
        }
    }
}

impl std::fmt::Debug for PushoverNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushoverNotifier")
            .field("name", &self.name)
            .field("api_url", &self.api_url)
            .field("token", &self.token)
            .field("user", &self.user)
            .finish()
    }
}
