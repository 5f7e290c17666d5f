//! Fan-out of rendered alerts to every registered notifier.
//!
//! Each payload goes to all notifiers concurrently. Every send is bounded by
//! a timeout and attempted exactly once; a failing sink never prevents the
//! others, nor the following payloads.

use std::time::Duration;

use futures_util::future::join_all;
use tracing::Instrument;

use super::{AlertPayload, NotifierRegistry};
use crate::error::NotifyError;

/// Result of one send attempt.
#[derive(Debug)]
pub struct DeliveryOutcome {
    pub rule_name: String,
    pub notifier_name: String,
    pub notifier_type: String,
    pub result: Result<(), NotifyError>,
}

/// Outcomes of one dispatch, payload by payload, in registry order.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub outcomes: Vec<DeliveryOutcome>,
}

impl DispatchReport {
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.delivered()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

#[derive(Debug)]
pub struct Dispatcher {
    registry: NotifierRegistry,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(registry: NotifierRegistry, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    pub fn registry(&self) -> &NotifierRegistry {
        &self.registry
    }

    /// Send every payload to every notifier.
    pub async fn dispatch(&self, payloads: &[AlertPayload]) -> DispatchReport {
        let mut report = DispatchReport::default();
        for payload in payloads {
            let span = tracing::info_span!("dispatch", rule_name = %payload.rule_name);
            let outcomes = self.dispatch_one(payload).instrument(span).await;
            report.outcomes.extend(outcomes);
        }
        report
    }

    async fn dispatch_one(&self, payload: &AlertPayload) -> Vec<DeliveryOutcome> {
        let futures: Vec<_> = self
            .registry
            .iter()
            .map(|notifier| {
                let span = tracing::info_span!(
                    "send",
                    notifier_name = %notifier.name(),
                    notifier_type = %notifier.notifier_type()
                );
                async move {
                    let result = match tokio::time::timeout(self.timeout, notifier.send(payload)).await {
                        Ok(result) => result,
                        Err(_) => Err(NotifyError::Timeout(self.timeout)),
                    };
                    DeliveryOutcome {
                        rule_name: payload.rule_name.clone(),
                        notifier_name: notifier.name().to_string(),
                        notifier_type: notifier.notifier_type().to_string(),
                        result,
                    }
                }
                .instrument(span)
            })
            .collect();

        let outcomes = join_all(futures).await;

        for outcome in &outcomes {
            match &outcome.result {
                Ok(()) => {
                    tracing::info!(
                        notifier = %outcome.notifier_name,
                        rule_name = %outcome.rule_name,
                        "Notification sent successfully"
                    );
                    metrics::counter!(
                        "nairi_alerts_sent_total",
                        "rule_name" => outcome.rule_name.clone(),
                        "notifier_name" => outcome.notifier_name.clone(),
                        "notifier_type" => outcome.notifier_type.clone()
                    )
                    .increment(1);
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        notifier = %outcome.notifier_name,
                        rule_name = %outcome.rule_name,
                        "Failed to send notification"
                    );
                    metrics::counter!(
                        "nairi_notify_errors_total",
                        "rule_name" => outcome.rule_name.clone(),
                        "notifier_name" => outcome.notifier_name.clone(),
                        "notifier_type" => outcome.notifier_type.clone()
                    )
                    .increment(1);
                }
            }
        }

        outcomes
    }
}
