//! Immutable published configuration versions.

use crate::core::Document;
use std::ops::Deref;
use std::time::SystemTime;

/// One loaded version of the configuration file.
///
/// Snapshots are never mutated after they are published; a reload builds a
/// new one and swaps it in. Dereferences to [`Document`], so path readers can
/// be called on it directly.
///
/// # Examples
///
/// ```rust,no_run
/// # use hotswap_json::prelude::*;
/// # async fn example(store: ConfigStore) -> Result<()> {
/// let snapshot = store.snapshot();
/// let port = snapshot.int64("server.port")?;
/// println!("v{} port {}", snapshot.version(), port);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Snapshot {
    document: Document,
    modified: SystemTime,
    version: u64,
}

impl Snapshot {
    pub(crate) fn new(document: Document, modified: SystemTime, version: u64) -> Self {
        Self {
            document,
            modified,
            version,
        }
    }

    /// The decoded document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Modification time of the file this snapshot was read from.
    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    /// Publish counter, starting at 1 for the initial load.
    pub fn version(&self) -> u64 {
        self.version
    }
}

impl Deref for Snapshot {
    type Target = Document;

    fn deref(&self) -> &Document {
        &self.document
    }
}
