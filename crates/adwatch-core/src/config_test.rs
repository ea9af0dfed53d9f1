use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert(
        "ADWATCH_WEBHOOK_URL",
        "https://discord.com/api/webhooks/123/token",
    );
    m
}

fn build(map: &HashMap<&str, &str>) -> Result<AppConfig, ConfigError> {
    build_app_config(lookup_from_map(map), &FileConfig::default())
}

#[test]
fn build_app_config_fails_without_webhook_url() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build(&map);
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "ADWATCH_WEBHOOK_URL"),
        "expected MissingEnvVar(ADWATCH_WEBHOOK_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_webhook_as_missing() {
    let mut map = HashMap::new();
    map.insert("ADWATCH_WEBHOOK_URL", "   ");
    let result = build(&map);
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
}

#[test]
fn build_app_config_rejects_non_http_webhook() {
    let mut map = HashMap::new();
    map.insert("ADWATCH_WEBHOOK_URL", "discord.com/api/webhooks/1/x");
    let result = build(&map);
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ADWATCH_WEBHOOK_URL"),
        "expected InvalidEnvVar(ADWATCH_WEBHOOK_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_succeeds_with_defaults() {
    let map = full_env();
    let cfg = build(&map).expect("config should build");
    assert_eq!(cfg.webhook_url, "https://discord.com/api/webhooks/123/token");
    assert_eq!(cfg.sources_path, PathBuf::from("./sources.txt"));
    assert_eq!(cfg.seen_path, PathBuf::from("./seen.json"));
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.seen_policy, SeenPolicy::Replace);
    assert_eq!(cfg.run_budget_secs, 3300);
    assert_eq!(cfg.min_delay_secs, 240);
    assert_eq!(cfg.max_delay_secs, 360);
    assert_eq!(cfg.fetch_timeout_secs, 20);
    assert_eq!(cfg.notify_timeout_secs, 10);
    assert_eq!(cfg.fetch_max_retries, 1);
    assert_eq!(cfg.fetch_backoff_base_ms, 1000);
    assert!(cfg.user_agent.starts_with("Mozilla/5.0"));
}

#[test]
fn build_app_config_parses_merge_policy() {
    let mut map = full_env();
    map.insert("ADWATCH_SEEN_POLICY", "Merge");
    let cfg = build(&map).unwrap();
    assert_eq!(cfg.seen_policy, SeenPolicy::Merge);
}

#[test]
fn build_app_config_rejects_unknown_policy() {
    let mut map = full_env();
    map.insert("ADWATCH_SEEN_POLICY", "forever");
    let result = build(&map);
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ADWATCH_SEEN_POLICY"),
        "expected InvalidEnvVar(ADWATCH_SEEN_POLICY), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_budget() {
    let mut map = full_env();
    map.insert("ADWATCH_RUN_BUDGET_SECS", "0");
    let result = build(&map);
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ADWATCH_RUN_BUDGET_SECS"),
        "expected InvalidEnvVar(ADWATCH_RUN_BUDGET_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_oversized_budget() {
    let mut map = full_env();
    map.insert("ADWATCH_RUN_BUDGET_SECS", "18446744073709551615");
    let result = build(&map);
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ADWATCH_RUN_BUDGET_SECS"),
        "expected InvalidEnvVar(ADWATCH_RUN_BUDGET_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_accepts_budget_at_maximum() {
    let mut map = full_env();
    map.insert("ADWATCH_RUN_BUDGET_SECS", "604800");
    let cfg = build(&map).expect("one week is within bounds");
    assert_eq!(cfg.run_budget_secs, 604_800);
}

#[test]
fn build_app_config_rejects_inverted_delay_range() {
    let mut map = full_env();
    map.insert("ADWATCH_MIN_DELAY_SECS", "300");
    map.insert("ADWATCH_MAX_DELAY_SECS", "200");
    let result = build(&map);
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ADWATCH_MAX_DELAY_SECS"),
        "expected InvalidEnvVar(ADWATCH_MAX_DELAY_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_non_numeric_timeout() {
    let mut map = full_env();
    map.insert("ADWATCH_FETCH_TIMEOUT_SECS", "soon");
    let result = build(&map);
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ADWATCH_FETCH_TIMEOUT_SECS"),
        "expected InvalidEnvVar(ADWATCH_FETCH_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_notify_timeout() {
    let mut map = full_env();
    map.insert("ADWATCH_NOTIFY_TIMEOUT_SECS", "0");
    let result = build(&map);
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "ADWATCH_NOTIFY_TIMEOUT_SECS")
    );
}

#[test]
fn file_config_supplies_values_when_env_is_silent() {
    let file: FileConfig = serde_json::from_str(
        r#"{
            "discord_webhook": "https://hooks.example.com/abc",
            "poll_interval": 300,
            "seen_path": "/var/lib/adwatch/seen.json",
            "seen_policy": "merge"
        }"#,
    )
    .unwrap();
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map), &file).unwrap();
    assert_eq!(cfg.webhook_url, "https://hooks.example.com/abc");
    assert_eq!(cfg.min_delay_secs, 300);
    assert_eq!(cfg.max_delay_secs, 300);
    assert_eq!(cfg.seen_path, PathBuf::from("/var/lib/adwatch/seen.json"));
    assert_eq!(cfg.seen_policy, SeenPolicy::Merge);
}

#[test]
fn env_overrides_file_config() {
    let file = FileConfig {
        webhook_url: Some("https://hooks.example.com/from-file".to_string()),
        min_delay_secs: Some(10),
        max_delay_secs: Some(20),
        ..FileConfig::default()
    };
    let mut map = full_env();
    map.insert("ADWATCH_MAX_DELAY_SECS", "90");
    let cfg = build_app_config(lookup_from_map(&map), &file).unwrap();
    assert_eq!(cfg.webhook_url, "https://discord.com/api/webhooks/123/token");
    assert_eq!(cfg.min_delay_secs, 10);
    assert_eq!(cfg.max_delay_secs, 90);
}

#[test]
fn explicit_min_delay_wins_over_poll_interval() {
    let file = FileConfig {
        webhook_url: Some("https://hooks.example.com/x".to_string()),
        min_delay_secs: Some(60),
        poll_interval: Some(120),
        ..FileConfig::default()
    };
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map), &file).unwrap();
    assert_eq!(cfg.min_delay_secs, 60);
    assert_eq!(cfg.max_delay_secs, 120);
}

#[test]
fn file_config_from_path_reports_parse_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("adwatch.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = FileConfig::from_path(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ConfigFileParse { .. }), "got: {err:?}");
}

#[test]
fn file_config_from_path_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = FileConfig::from_path(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, ConfigError::ConfigFileIo { .. }), "got: {err:?}");
}

#[test]
fn explicit_config_file_must_exist() {
    let mut map = full_env();
    map.insert("ADWATCH_CONFIG_FILE", "/nonexistent/adwatch.json");
    let result = resolve_file_config(&lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::ConfigFileIo { .. })));
}

#[test]
fn debug_output_redacts_webhook() {
    let cfg = build(&full_env()).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("token"), "webhook leaked: {rendered}");
    assert!(rendered.contains("[redacted]"));
}

#[test]
fn is_http_url_accepts_both_schemes() {
    assert!(is_http_url("https://example.com"));
    assert!(is_http_url("HTTP://example.com/path"));
    assert!(!is_http_url("https://"));
    assert!(!is_http_url("ftp://example.com"));
    assert!(!is_http_url("é"));
}
