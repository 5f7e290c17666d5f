//! End-to-end tests of message handling: filter, parse, evaluate, render,
//! dispatch, with recording notifiers standing in for the real sinks.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use nairi_monitor::config::{Config, Thresholds};
use nairi_monitor::engine::{AlertRule, RuleEngine};
use nairi_monitor::error::NotifyError;
use nairi_monitor::monitor::{InboundMessage, Monitor, SourceFilter};
use nairi_monitor::notify::{AlertPayload, Dispatcher, Notifier, NotifierRegistry};
use nairi_monitor::template::TemplateEngine;

const APP_BOT_ID: u64 = 1312830013573169252;
const CHANNEL: u64 = 42;

struct RecordingNotifier {
    name: String,
    fail: bool,
    sent: Mutex<Vec<AlertPayload>>,
}

impl RecordingNotifier {
    fn new(name: &str, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            fail,
            sent: Mutex::new(Vec::new()),
        })
    }

    fn sent(&self) -> Vec<AlertPayload> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn notifier_type(&self) -> &str {
        "recording"
    }

    async fn send(&self, alert: &AlertPayload) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(alert.clone());
        if self.fail {
            Err(NotifyError::SendFailed("unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

fn builtin_rules() -> Vec<AlertRule> {
    Thresholds::default()
        .into_rules()
        .iter()
        .map(AlertRule::from_config)
        .collect()
}

fn monitor_with(notifiers: &[Arc<RecordingNotifier>], source: Option<u64>) -> Monitor {
    let mut registry = NotifierRegistry::new();
    for notifier in notifiers {
        registry.register(notifier.clone()).unwrap();
    }
    let rules = builtin_rules();
    Monitor::new(
        SourceFilter {
            app_bot_id: APP_BOT_ID,
            source_channel_id: source,
        },
        RuleEngine::new(rules.clone()),
        TemplateEngine::new(&rules),
        Dispatcher::new(registry, Duration::from_secs(5)),
    )
}

fn from_app(content: &str) -> InboundMessage<'_> {
    InboundMessage {
        author_id: APP_BOT_ID,
        channel_id: CHANNEL,
        content,
    }
}

const DROP: &str = "\
` 20 ` :nwl_s: ¦ ` 150 ` ¦ **Aya Tanaka** · Show Title\n\
` 2 ` :nwl_s: ¦ ` 500 ` ¦ Someone Else\n\
` 12 ` :nwl_s: ¦ ` 340 ` ¦ *Xmas25*";

#[tokio::test]
async fn matching_rows_reach_every_sink() {
    let discord = RecordingNotifier::new("discord", false);
    let ntfy = RecordingNotifier::new("ntfy", false);
    let monitor = monitor_with(&[discord.clone(), ntfy.clone()], None);

    let report = monitor.handle(&from_app(DROP)).await.unwrap();

    // 20/150 -> A; 12/340 labelled Xmas25 -> E
    let rules: Vec<_> = discord.sent().iter().map(|p| p.rule_name.clone()).collect();
    assert_eq!(rules, ["A", "E"]);
    assert_eq!(discord.sent(), ntfy.sent());
    assert_eq!(report.delivered(), 4);
    assert_eq!(report.failed(), 0);

    let a = &discord.sent()[0];
    assert_eq!(a.message.title, "Alert A");
    assert_eq!(a.message.body, "(20 / 150)");

    let e = &discord.sent()[1];
    assert_eq!(e.message.title, "Alert E — Xmas25");
    assert_eq!(e.message.body, "(12 / 340) — Xmas25");
}

#[tokio::test]
async fn message_without_matches_makes_no_calls() {
    let discord = RecordingNotifier::new("discord", false);
    let monitor = monitor_with(&[discord.clone()], None);

    let report = monitor
        .handle(&from_app("` 2 ` ¦ ` 500 ` ¦ Nobody\n` 1 ` ¦ ` 650 ` ¦ Nobody"))
        .await
        .unwrap();

    assert!(report.is_empty());
    assert!(discord.sent().is_empty());
}

#[tokio::test]
async fn other_authors_are_ignored() {
    let discord = RecordingNotifier::new("discord", false);
    let monitor = monitor_with(&[discord.clone()], None);

    let message = InboundMessage {
        author_id: 1,
        channel_id: CHANNEL,
        content: DROP,
    };

    assert!(monitor.handle(&message).await.is_none());
    assert!(discord.sent().is_empty());
}

#[tokio::test]
async fn source_channel_filter_applies() {
    let discord = RecordingNotifier::new("discord", false);
    let monitor = monitor_with(&[discord.clone()], Some(CHANNEL + 1));

    assert!(monitor.handle(&from_app(DROP)).await.is_none());
    assert!(discord.sent().is_empty());
}

#[tokio::test]
async fn failing_sink_does_not_block_the_other() {
    let broken = RecordingNotifier::new("discord", true);
    let working = RecordingNotifier::new("pushover", false);
    let monitor = monitor_with(&[broken.clone(), working.clone()], None);

    let report = monitor
        .handle(&from_app("` 25 ` ¦ ` 150 ` ¦ Aya"))
        .await
        .unwrap();

    assert_eq!(broken.sent().len(), working.sent().len());
    assert_eq!(working.sent()[0].rule_name, "A");
    assert_eq!(report.failed(), report.delivered());
}

#[tokio::test]
async fn extra_numbers_take_the_last_token_as_right() {
    let discord = RecordingNotifier::new("discord", false);
    let monitor = monitor_with(&[discord.clone()], None);

    // right is 9999, not 250: nothing matches
    monitor
        .handle(&from_app("¦ `5` `250` `9999`"))
        .await
        .unwrap();
    assert!(discord.sent().is_empty());

    // right is 15: C and D
    monitor
        .handle(&from_app("¦ `5` `250` `15`"))
        .await
        .unwrap();
    let rules: Vec<_> = discord.sent().iter().map(|p| p.rule_name.clone()).collect();
    assert_eq!(rules, ["C", "D"]);
}

#[tokio::test]
async fn single_value_with_numeric_label_raises_nothing() {
    let discord = RecordingNotifier::new("discord", false);
    let monitor = monitor_with(&[discord.clone()], None);

    let report = monitor
        .handle(&from_app("` 25 ` :nwl_s: ¦ Xmas25\n`20` ¦ Card 7"))
        .await
        .unwrap();

    assert!(report.is_empty());
    assert!(discord.sent().is_empty());
}

#[tokio::test]
async fn monitor_from_config_uses_rules_file() {
    let path = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("rules_valid.yaml");
    let config = Config::from_lookup(
        |key| (key == "BOT_TOKEN").then(|| "token".to_string()),
        Some(&path),
    )
    .unwrap()
    .compile()
    .unwrap();

    let monitor = Monitor::from_config(&config, Dispatcher::new(NotifierRegistry::new(), Duration::from_secs(1)));
    assert_eq!(monitor.filter().app_bot_id, APP_BOT_ID);

    let names: Vec<_> = monitor
        .evaluate("` 12 ` ¦ ` 340 ` ¦ xmas25")
        .into_iter()
        .map(|b| b.rule_name)
        .collect();
    assert!(names.contains(&"seasonal".to_string()), "{:?}", names);
}
