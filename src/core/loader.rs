//! Reads the configuration file from disk.

use crate::core::Document;
use crate::error::{ConfigError, Result};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Loads a JSON document and its modification time from a single file.
///
/// File I/O goes through `tokio::fs`, so a slow disk blocks only the task
/// doing the reload.
pub(crate) struct FileLoader {
    path: PathBuf,
}

impl FileLoader {
    /// Create a loader for `path`. The path is used as given; callers resolve it first.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file being loaded.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stat the file and return its modification time.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LoadError`] if the file is missing or can't be stat'ed.
    pub async fn modified(&self) -> Result<SystemTime> {
        tokio::fs::metadata(&self.path)
            .await
            .and_then(|metadata| metadata.modified())
            .map_err(|e| {
                ConfigError::LoadError(format!(
                    "can't load config file {} because: {}",
                    self.path.display(),
                    e
                ))
            })
    }

    /// Read and decode the file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LoadError`] if the file can't be read and
    /// [`ConfigError::ParseError`] if it isn't a JSON object.
    pub async fn load(&self) -> Result<Document> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            ConfigError::LoadError(format!(
                "can't load config file {} because: {}",
                self.path.display(),
                e
            ))
        })?;

        Document::from_slice(&bytes).map_err(|e| match e {
            ConfigError::ParseError(reason) => ConfigError::ParseError(format!(
                "file {} isn't valid json: {}",
                self.path.display(),
                reason
            )),
            other => other,
        })
    }
}
