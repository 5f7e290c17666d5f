//! Self-ping that keeps free hosting instances from idling out.
//!
//! Independent of message handling; failures are logged and ignored.

use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub struct KeepAlive {
    url: String,
    interval: Duration,
    client: reqwest::Client,
}

impl KeepAlive {
    pub fn new(url: String, interval: Duration, client: reqwest::Client) -> Self {
        Self {
            url,
            interval,
            client,
        }
    }

    /// One GET on the keep-alive URL. Returns whether it succeeded.
    pub async fn ping(&self) -> bool {
        match self.client.get(&self.url).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::info!(url = %self.url, "Keep-alive ping");
                metrics::counter!("nairi_keepalive_pings_total", "status" => "ok").increment(1);
                true
            }
            Ok(response) => {
                tracing::warn!(url = %self.url, status = %response.status(), "Keep-alive ping got non-success status");
                metrics::counter!("nairi_keepalive_pings_total", "status" => "error").increment(1);
                false
            }
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "Keep-alive ping failed");
                metrics::counter!("nairi_keepalive_pings_total", "status" => "error").increment(1);
                false
            }
        }
    }

    /// Ping every interval until `cancel` fires. The first ping is one
    /// interval after start.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(url = %self.url, interval = ?self.interval, "Keep-alive started");

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("Keep-alive stopped");
                    return;
                }
                _ = ticker.tick() => {
                    self.ping().await;
                }
            }
        }
    }
}
