//! Prometheus metrics recorder.
//!
//! The recorder is installed once at startup; the health server renders its
//! handle on `/metrics`.

use anyhow::Result;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Register all metric descriptions for Prometheus.
///
/// Descriptions provide HELP text in the Prometheus output.
pub fn register_metric_descriptions() {
    use metrics::{describe_counter, describe_gauge};

    describe_counter!(
        "nairi_messages_seen_total",
        "Total number of messages from the watched application that were evaluated"
    );
    describe_counter!(
        "nairi_rows_parsed_total",
        "Total number of data rows recovered from watched messages"
    );
    describe_counter!(
        "nairi_alerts_matched_total",
        "Total number of rows that satisfied a rule"
    );
    describe_counter!(
        "nairi_alerts_sent_total",
        "Total number of alerts successfully delivered to a sink"
    );
    describe_counter!(
        "nairi_notify_errors_total",
        "Total number of failed alert deliveries"
    );
    describe_counter!(
        "nairi_keepalive_pings_total",
        "Total number of keep-alive pings, by outcome"
    );

    describe_gauge!(
        "nairi_build_info",
        "Build information with version label (always 1)"
    );
}

/// Install the global Prometheus recorder and return its render handle.
///
/// # Errors
/// Fails if a recorder is already installed in this process.
pub fn install_recorder() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    register_metric_descriptions();

    tracing::info!("Prometheus recorder installed");
    Ok(handle)
}

/// Initialize all known metrics so they show up before any event occurs.
///
/// `notifiers` holds `(name, type)` pairs. Delivery counters are zeroed for
/// every rule and notifier pair with the labels the dispatcher emits.
pub fn initialize_metrics(rule_names: &[&str], notifiers: &[(&str, &str)]) {
    use metrics::{counter, gauge};

    gauge!("nairi_build_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);

    counter!("nairi_messages_seen_total").absolute(0);
    counter!("nairi_rows_parsed_total").absolute(0);

    for rule_name in rule_names {
        counter!("nairi_alerts_matched_total", "rule_name" => rule_name.to_string()).absolute(0);
    }

    for rule_name in rule_names {
        for (notifier_name, notifier_type) in notifiers {
            counter!(
                "nairi_alerts_sent_total",
                "rule_name" => rule_name.to_string(),
                "notifier_name" => notifier_name.to_string(),
                "notifier_type" => notifier_type.to_string()
            )
            .absolute(0);
            counter!(
                "nairi_notify_errors_total",
                "rule_name" => rule_name.to_string(),
                "notifier_name" => notifier_name.to_string(),
                "notifier_type" => notifier_type.to_string()
            )
            .absolute(0);
        }
    }

    tracing::info!(
        rule_count = rule_names.len(),
        notifier_count = notifiers.len(),
        "Metrics initialized to zero"
    );
}
