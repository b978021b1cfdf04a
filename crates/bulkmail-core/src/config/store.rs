//! Flat-file storage for uploaded configurations.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use super::model::{UserConfig, UserId};
use crate::Result;

/// One JSON file per user under a dedicated directory.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    /// Creates a store rooted at `dir`. Nothing is touched on disk yet.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the per-user files.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the storage directory if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Path of the file holding `user`'s configuration.
    #[must_use]
    pub fn path_for(&self, user: UserId) -> PathBuf {
        self.dir.join(format!("{user}_config.json"))
    }

    /// Loads `user`'s configuration.
    ///
    /// A missing file and content that does not parse as a configuration
    /// both yield `None`; the latter is logged.
    pub async fn load(&self, user: UserId) -> Option<UserConfig> {
        let path = self.path_for(user);
        let contents = match tokio::fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(%user, "No stored config");
                return None;
            }
            Err(e) => {
                warn!(%user, path = %path.display(), "Error loading user config file: {e}");
                return None;
            }
        };

        match serde_json::from_slice(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(%user, "Stored config is not valid: {e}");
                None
            }
        }
    }

    /// Saves `config` as `user`'s configuration, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub async fn save(&self, user: UserId, config: &UserConfig) -> Result<()> {
        let contents = serde_json::to_vec_pretty(config)?;
        self.save_raw(user, &contents).await
    }

    /// Stores uploaded bytes verbatim as `user`'s configuration.
    ///
    /// No validation happens here; unreadable content simply loads as
    /// `None` later.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the write
    /// fails.
    pub async fn save_raw(&self, user: UserId, contents: &[u8]) -> Result<()> {
        self.ensure_dir().await?;
        let path = self.path_for(user);
        if let Err(e) = tokio::fs::write(&path, contents).await {
            warn!(%user, path = %path.display(), "Error saving user config file: {e}");
            return Err(e.into());
        }
        info!(%user, bytes = contents.len(), "Config saved");
        Ok(())
    }
}
