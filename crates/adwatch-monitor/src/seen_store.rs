//! Durable seen-set: the listing ids that have already triggered a notification.
//!
//! Stored as a JSON array of strings. Writes go to a sibling temp file that is
//! fsynced and then renamed over the target, so an interrupted save leaves
//! the previous file intact.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::MonitorError;

#[derive(Debug, Clone)]
pub struct SeenStore {
    path: PathBuf,
}

impl SeenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the persisted seen-set.
    ///
    /// A missing file is a first run and yields an empty set. An unreadable
    /// or unparseable file also yields an empty set, with a warning.
    pub async fn load(&self) -> HashSet<String> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no seen-set on disk; starting empty");
                return HashSet::new();
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "seen-set unreadable; continuing with no history"
                );
                return HashSet::new();
            }
        };

        match serde_json::from_slice::<Vec<String>>(&bytes) {
            Ok(ids) => ids.into_iter().collect(),
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "seen-set is corrupt; continuing with no history"
                );
                HashSet::new()
            }
        }
    }

    /// Atomically replaces the persisted seen-set with exactly `ids`.
    ///
    /// Ids are written sorted so successive files diff cleanly.
    ///
    /// # Errors
    ///
    /// Returns [`MonitorError::SeenStoreWrite`] if the temp file cannot be
    /// written, synced, or renamed into place. The previous file is untouched
    /// in that case.
    pub async fn save(&self, ids: &HashSet<String>) -> Result<(), MonitorError> {
        let mut sorted: Vec<&String> = ids.iter().collect();
        sorted.sort();
        let body = serde_json::to_vec_pretty(&sorted)?;

        let tmp = temp_path(&self.path);
        if let Err(source) = self.write_then_rename(&tmp, &body).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(MonitorError::SeenStoreWrite {
                path: self.path.display().to_string(),
                source,
            });
        }

        tracing::debug!(path = %self.path.display(), count = ids.len(), "seen-set saved");
        Ok(())
    }

    async fn write_then_rename(&self, tmp: &Path, body: &[u8]) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let mut file = fs::File::create(tmp).await?;
        file.write_all(body).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(tmp, &self.path).await
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_else(|| "seen.json".into());
    name.push(".tmp");
    path.with_file_name(name)
}
