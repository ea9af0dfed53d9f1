use std::env::VarError;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::app_config::{AppConfig, SeenPolicy};
use crate::ConfigError;

/// Config file read from the working directory when `ADWATCH_CONFIG_FILE` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "adwatch.json";

/// Longest accepted run budget: one week.
const MAX_RUN_BUDGET_SECS: u64 = 7 * 24 * 60 * 60;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/128.0.0.0 Safari/537.36";

/// Optional JSON config file. Every key is optional; environment variables
/// take precedence over anything set here.
///
/// Accepts the legacy keys `discord_webhook` and `poll_interval`; the latter
/// sets both delay bounds when the explicit keys are absent.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default, alias = "discord_webhook")]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub sources_path: Option<PathBuf>,
    #[serde(default)]
    pub seen_path: Option<PathBuf>,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub seen_policy: Option<SeenPolicy>,
    #[serde(default)]
    pub run_budget_secs: Option<u64>,
    #[serde(default)]
    pub min_delay_secs: Option<u64>,
    #[serde(default)]
    pub max_delay_secs: Option<u64>,
    #[serde(default)]
    pub poll_interval: Option<u64>,
}

impl FileConfig {
    /// Reads and parses a config file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or is not valid JSON.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ConfigFileIo {
            path: path.display().to_string(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::ConfigFileParse {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Maps an environment variable name onto the equivalent file value.
    fn value_for(&self, var: &str) -> Option<String> {
        let path_str = |p: &Option<PathBuf>| p.as_ref().map(|p| p.display().to_string());
        match var {
            "ADWATCH_WEBHOOK_URL" => self.webhook_url.clone(),
            "ADWATCH_SOURCES_PATH" => path_str(&self.sources_path),
            "ADWATCH_SEEN_PATH" => path_str(&self.seen_path),
            "ADWATCH_LOG_LEVEL" => self.log_level.clone(),
            "ADWATCH_SEEN_POLICY" => self.seen_policy.map(|p| p.to_string()),
            "ADWATCH_RUN_BUDGET_SECS" => self.run_budget_secs.map(|v| v.to_string()),
            "ADWATCH_MIN_DELAY_SECS" => self
                .min_delay_secs
                .or(self.poll_interval)
                .map(|v| v.to_string()),
            "ADWATCH_MAX_DELAY_SECS" => self
                .max_delay_secs
                .or(self.poll_interval)
                .map(|v| v.to_string()),
            _ => None,
        }
    }
}

/// Load application configuration from `.env`, the optional config file, and
/// the process environment.
///
/// # Errors
///
/// Returns `ConfigError` if the webhook URL is missing, a value is invalid, or
/// an explicitly named config file cannot be loaded.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Like [`load_app_config`] but does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required values are missing or invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    let lookup = |key: &str| std::env::var(key);
    let file = resolve_file_config(&lookup)?;
    build_app_config(lookup, &file)
}

fn resolve_file_config<F>(lookup: &F) -> Result<FileConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    if let Ok(explicit) = lookup("ADWATCH_CONFIG_FILE") {
        return FileConfig::from_path(Path::new(&explicit));
    }
    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        tracing::debug!(path = %default_path.display(), "loading default config file");
        return FileConfig::from_path(default_path);
    }
    Ok(FileConfig::default())
}

/// Build application configuration from an env-var lookup layered over a
/// config file. Pure so tests can drive it with a `HashMap`.
fn build_app_config<F>(env_lookup: F, file: &FileConfig) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let lookup = |var: &str| -> Option<String> {
        env_lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| file.value_for(var))
    };

    let or_default =
        |var: &str, default: &str| -> String { lookup(var).unwrap_or_else(|| default.to_string()) };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let webhook_url = lookup("ADWATCH_WEBHOOK_URL")
        .map(|v| v.trim().to_string())
        .ok_or_else(|| ConfigError::MissingEnvVar("ADWATCH_WEBHOOK_URL".to_string()))?;
    if !is_http_url(&webhook_url) {
        return Err(invalid(
            "ADWATCH_WEBHOOK_URL",
            "must be an absolute http(s) URL".to_string(),
        ));
    }

    let sources_path = PathBuf::from(or_default("ADWATCH_SOURCES_PATH", "./sources.txt"));
    let seen_path = PathBuf::from(or_default("ADWATCH_SEEN_PATH", "./seen.json"));
    let log_level = or_default("ADWATCH_LOG_LEVEL", "info");
    let seen_policy = or_default("ADWATCH_SEEN_POLICY", "replace")
        .parse::<SeenPolicy>()
        .map_err(|reason| invalid("ADWATCH_SEEN_POLICY", reason))?;

    let run_budget_secs = parse_u64("ADWATCH_RUN_BUDGET_SECS", "3300")?;
    let min_delay_secs = parse_u64("ADWATCH_MIN_DELAY_SECS", "240")?;
    let max_delay_secs = parse_u64("ADWATCH_MAX_DELAY_SECS", "360")?;
    let fetch_timeout_secs = parse_u64("ADWATCH_FETCH_TIMEOUT_SECS", "20")?;
    let notify_timeout_secs = parse_u64("ADWATCH_NOTIFY_TIMEOUT_SECS", "10")?;
    let fetch_max_retries = parse_u32("ADWATCH_FETCH_MAX_RETRIES", "1")?;
    let fetch_backoff_base_ms = parse_u64("ADWATCH_FETCH_BACKOFF_BASE_MS", "1000")?;
    let user_agent = or_default("ADWATCH_USER_AGENT", DEFAULT_USER_AGENT);

    if run_budget_secs == 0 {
        return Err(invalid(
            "ADWATCH_RUN_BUDGET_SECS",
            "must be greater than zero".to_string(),
        ));
    }
    if run_budget_secs > MAX_RUN_BUDGET_SECS {
        return Err(invalid(
            "ADWATCH_RUN_BUDGET_SECS",
            format!("{run_budget_secs} exceeds the maximum of {MAX_RUN_BUDGET_SECS} seconds"),
        ));
    }
    if max_delay_secs < min_delay_secs {
        return Err(invalid(
            "ADWATCH_MAX_DELAY_SECS",
            format!("{max_delay_secs} is below ADWATCH_MIN_DELAY_SECS ({min_delay_secs})"),
        ));
    }
    for (var, value) in [
        ("ADWATCH_FETCH_TIMEOUT_SECS", fetch_timeout_secs),
        ("ADWATCH_NOTIFY_TIMEOUT_SECS", notify_timeout_secs),
    ] {
        if value == 0 {
            return Err(invalid(var, "must be greater than zero".to_string()));
        }
    }

    Ok(AppConfig {
        webhook_url,
        sources_path,
        seen_path,
        log_level,
        seen_policy,
        run_budget_secs,
        min_delay_secs,
        max_delay_secs,
        fetch_timeout_secs,
        notify_timeout_secs,
        fetch_max_retries,
        fetch_backoff_base_ms,
        user_agent,
    })
}

/// `true` for an absolute `http://` or `https://` URL with something after the scheme.
pub(crate) fn is_http_url(s: &str) -> bool {
    ["https://", "http://"].iter().any(|scheme| {
        s.len() > scheme.len()
            && s.get(..scheme.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
