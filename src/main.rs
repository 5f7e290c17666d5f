//! nairi-monitor - Threshold alerts from Nairi drop announcements on Discord.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use nairi_monitor::cli::{Cli, LogFormat};
use nairi_monitor::config::{Config, RuntimeConfig};
use nairi_monitor::metrics::initialize_metrics;
use nairi_monitor::{
    Dispatcher, HealthServer, KeepAlive, Monitor, NotifierRegistry, gateway, install_recorder,
};

/// Initialize the tracing subscriber with the specified log format.
fn init_logging(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match format {
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(filter)
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .json()
                .with_current_span(true)
                .with_span_list(false)
                .flatten_event(true)
                .with_env_filter(filter)
                .init();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_format);

    match &cli.rules {
        Some(path) => info!(rules_file = %path.display(), "Loading configuration"),
        None => info!("Loading configuration, built-in rules"),
    }

    let config = match Config::from_env(cli.rules.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            std::process::exit(1);
        }
    };

    // Fail fast, reporting every problem at once
    info!("Validating configuration");
    if let Err(errors) = config.validate() {
        for e in &errors {
            error!(error = %e, "Configuration validation error");
        }
        error!(
            error_count = errors.len(),
            "Configuration validation failed"
        );
        std::process::exit(1);
    }

    if cli.validate {
        print_summary(&config);
        return Ok(());
    }

    let runtime_config = config.compile()?;

    info!(rule_count = runtime_config.rules.len(), "nairi-monitor starting");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run(runtime_config))
}

fn print_summary(config: &Config) {
    let on_off = |on: bool| if on { "enabled" } else { "disabled" };

    println!("Configuration is valid");
    match &config.rules_file {
        Some(path) => println!("  Rules file: {}", path.display()),
        None => println!("  Rules file: none (built-in A..E)"),
    }
    println!(
        "  Rules: {} ({} enabled)",
        config.rules.len(),
        config.rules.iter().filter(|r| r.enabled).count()
    );
    println!("  Watched application: {}", config.discord.app_bot_id);
    println!(
        "  Discord sink: {}",
        on_off(config.discord.alert_channel_id.is_some())
    );
    println!(
        "  Pushover sink: {}",
        on_off(config.pushover.credentials().is_ok())
    );
    println!("  ntfy sink: {}", on_off(config.ntfy.topic.is_some()));
    println!(
        "  Keep-alive: {}",
        on_off(config.keepalive.url.is_some())
    );
    println!("  Health port: {}", config.health.port);
}

/// Main async entry point.
async fn run(config: RuntimeConfig) -> Result<()> {
    // Shared HTTP client for every outbound call
    let http_client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()?;

    let metrics_handle = match install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "Metrics disabled");
            None
        }
    };

    let cancel = CancellationToken::new();

    let health = HealthServer::new(config.health.port, metrics_handle);
    let health_cancel = cancel.clone();
    let health_handle = tokio::spawn(async move {
        if let Err(e) = health.run(health_cancel).await {
            error!(error = %e, "Health server error");
        }
    });

    let keepalive_handle = match &config.keepalive.url {
        Some(url) => {
            let pinger = KeepAlive::new(url.clone(), config.keepalive.interval, http_client.clone());
            Some(tokio::spawn(pinger.run(cancel.clone())))
        }
        None => {
            info!("No keep-alive URL set, self-ping disabled");
            None
        }
    };

    let discord_http = Arc::new(serenity::http::Http::new(config.bot_token.expose()));
    let registry = NotifierRegistry::from_config(&config, http_client, discord_http)?;

    let rule_names: Vec<&str> = config.rules.iter().map(|r| r.name.as_str()).collect();
    let notifiers: Vec<(&str, &str)> = registry
        .iter()
        .map(|n| (n.name(), n.notifier_type()))
        .collect();
    initialize_metrics(&rule_names, &notifiers);

    let dispatcher = Dispatcher::new(registry, config.http_timeout);
    let monitor = Arc::new(Monitor::from_config(&config, dispatcher));

    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for ctrl-c signal");
            return;
        }
        info!("Received shutdown signal, initiating graceful shutdown");
        cancel_clone.cancel();
    });

    let gateway_result = gateway::run(&config.bot_token, monitor, cancel.clone()).await;

    // Stop the background tasks whatever ended the gateway
    cancel.cancel();
    let _ = tokio::time::timeout(std::time::Duration::from_secs(2), health_handle).await;
    if let Some(handle) = keepalive_handle {
        let _ = tokio::time::timeout(std::time::Duration::from_secs(2), handle).await;
    }

    match gateway_result {
        Ok(()) => {
            info!("nairi-monitor shutdown complete");
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Gateway error");
            Err(e)
        }
    }
}
