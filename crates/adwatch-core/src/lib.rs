//! Shared types and configuration for the listing watcher.

mod app_config;
mod config;
mod listing;
mod sources;

use thiserror::Error;

pub use app_config::{AppConfig, SeenPolicy};
pub use config::{load_app_config, load_app_config_from_env, FileConfig, DEFAULT_CONFIG_FILE};
pub use listing::{
    Listing, DEFAULT_TITLE, LOCATION_UNKNOWN, PRICE_UNSPECIFIED, SELLER_UNKNOWN,
};
pub use sources::{load_sources, parse_sources};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read config file {path}: {source}")]
    ConfigFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ConfigFileParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read source list {path}: {source}")]
    SourcesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("source list {path} contains no URLs")]
    EmptySourceList { path: String },

    #[error("config validation error: {0}")]
    Validation(String),
}
