use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

/// How the persisted seen-set is rebuilt at the end of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeenPolicy {
    /// Persist exactly the ids observed in the pass. A listing that drops off
    /// every source page is forgotten and notifies again if it comes back.
    #[default]
    Replace,
    /// Persist the union of the previous set and the ids observed in the pass.
    Merge,
}

impl std::fmt::Display for SeenPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeenPolicy::Replace => write!(f, "replace"),
            SeenPolicy::Merge => write!(f, "merge"),
        }
    }
}

impl FromStr for SeenPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(SeenPolicy::Replace),
            "merge" => Ok(SeenPolicy::Merge),
            other => Err(format!("unknown seen policy '{other}'; expected replace or merge")),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub webhook_url: String,
    pub sources_path: PathBuf,
    pub seen_path: PathBuf,
    pub log_level: String,
    pub seen_policy: SeenPolicy,
    pub run_budget_secs: u64,
    pub min_delay_secs: u64,
    pub max_delay_secs: u64,
    pub fetch_timeout_secs: u64,
    pub notify_timeout_secs: u64,
    pub fetch_max_retries: u32,
    pub fetch_backoff_base_ms: u64,
    pub user_agent: String,
}

// The webhook URL carries the channel token, so it never reaches the logs.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("webhook_url", &"[redacted]")
            .field("sources_path", &self.sources_path)
            .field("seen_path", &self.seen_path)
            .field("log_level", &self.log_level)
            .field("seen_policy", &self.seen_policy)
            .field("run_budget_secs", &self.run_budget_secs)
            .field("min_delay_secs", &self.min_delay_secs)
            .field("max_delay_secs", &self.max_delay_secs)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("notify_timeout_secs", &self.notify_timeout_secs)
            .field("fetch_max_retries", &self.fetch_max_retries)
            .field("fetch_backoff_base_ms", &self.fetch_backoff_base_ms)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
