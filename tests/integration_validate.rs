//! Integration tests for the --validate CLI mode.

use std::path::PathBuf;
use std::process::{Command, Output};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Run the binary with a clean environment plus `vars`.
fn run_monitor(args: &[&str], vars: &[(&str, &str)]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_nairi-monitor"))
        .env_clear()
        .envs(vars.iter().copied())
        .args(args)
        .output()
        .expect("Failed to run nairi-monitor")
}

#[test]
fn validate_builtin_rules_exits_success() {
    let output = run_monitor(
        &["--validate"],
        &[
            ("BOT_TOKEN", "token"),
            ("CHANNEL_ID", "200"),
            ("NTFY_TOPIC", "puppeteer-nairi"),
        ],
    );

    assert!(
        output.status.success(),
        "--validate should exit with code 0\nstderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Configuration is valid"), "{}", stdout);
    assert!(stdout.contains("Rules: 5 (5 enabled)"), "{}", stdout);
    assert!(stdout.contains("Discord sink: enabled"), "{}", stdout);
    assert!(stdout.contains("Pushover sink: disabled"), "{}", stdout);
    assert!(stdout.contains("ntfy sink: enabled"), "{}", stdout);
}

#[test]
fn validate_rules_file_from_argument() {
    let rules = fixture_path("rules_valid.yaml");
    let output = run_monitor(
        &["--validate", "--rules", rules.to_str().unwrap()],
        &[("BOT_TOKEN", "token")],
    );

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Rules: 4 (3 enabled)"), "{}", stdout);
    assert!(stdout.contains("rules_valid.yaml"), "{}", stdout);
}

#[test]
fn validate_rules_file_from_environment() {
    let rules = fixture_path("rules_valid.yaml");
    let output = run_monitor(
        &["--validate"],
        &[("BOT_TOKEN", "token"), ("RULES_FILE", rules.to_str().unwrap())],
    );

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Rules: 4 (3 enabled)"));
}

#[test]
fn validate_missing_token_exits_failure() {
    let output = run_monitor(&["--validate"], &[]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("BOT_TOKEN"), "stderr: {}", stderr);
}

#[test]
fn validate_invalid_rules_reports_every_error() {
    let rules = fixture_path("rules_invalid.yaml");
    let output = run_monitor(
        &["--validate", "--rules", rules.to_str().unwrap()],
        &[("BOT_TOKEN", "token")],
    );

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("everything"), "stderr: {}", stderr);
    assert!(stderr.contains("duplicate rule name"), "stderr: {}", stderr);
    assert_eq!(
        stderr.matches("Configuration validation error").count(),
        4,
        "stderr: {}",
        stderr
    );
}

#[test]
fn validate_malformed_rules_file_exits_failure() {
    let rules = fixture_path("rules_malformed.yaml");
    let output = run_monitor(
        &["--validate", "--rules", rules.to_str().unwrap()],
        &[("BOT_TOKEN", "token")],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("right_bellow"));
}

#[test]
fn validate_bad_threshold_exits_failure() {
    let output = run_monitor(
        &["--validate"],
        &[("BOT_TOKEN", "token"), ("ALERT_A_LEFT_MIN", "twenty")],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("ALERT_A_LEFT_MIN"));
}

#[test]
fn validate_json_logs() {
    let output = run_monitor(&["--validate", "--log-format", "json"], &[]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    let first = stderr.lines().next().unwrap_or_default();
    assert!(first.starts_with('{'), "stderr: {}", stderr);
}
