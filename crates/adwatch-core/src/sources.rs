//! Source list loading.
//!
//! The source list is a plain text file with one absolute URL per line.
//! Blank lines and lines starting with `#` are ignored.

use std::collections::HashSet;
use std::path::Path;

use crate::config::is_http_url;
use crate::ConfigError;

/// Read and validate the source list at `path`.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, a line is not an absolute
/// http(s) URL, or no URLs remain after filtering.
pub fn load_sources(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SourcesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let sources = parse_sources(&content)?;
    if sources.is_empty() {
        return Err(ConfigError::EmptySourceList {
            path: path.display().to_string(),
        });
    }
    Ok(sources)
}

/// Parse source list content, preserving order and dropping repeated URLs.
///
/// An empty result is not an error here; [`load_sources`] decides that.
///
/// # Errors
///
/// Returns [`ConfigError::Validation`] naming the first line that is not an
/// absolute http(s) URL.
pub fn parse_sources(content: &str) -> Result<Vec<String>, ConfigError> {
    let mut seen = HashSet::new();
    let mut sources = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if !is_http_url(line) || line.contains(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "source list line {} is not an absolute http(s) URL: '{line}'",
                idx + 1
            )));
        }
        if seen.insert(line.to_string()) {
            sources.push(line.to_string());
        } else {
            tracing::warn!(source = line, line = idx + 1, "duplicate source URL ignored");
        }
    }

    Ok(sources)
}
