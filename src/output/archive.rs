//! Archive file writer

use crate::error::{Error, Result};
use crate::partition::DateWindow;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes one bulk body per date window under a directory
#[derive(Debug, Clone)]
pub struct ArchiveWriter {
    dir: PathBuf,
}

impl ArchiveWriter {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the archive for `window` is written to
    pub fn path_for(&self, window: &DateWindow) -> PathBuf {
        self.dir.join(window.archive_file_name())
    }

    /// Create the archive directory if missing
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            Error::output(format!(
                "Failed to create archive directory {}: {e}",
                self.dir.display()
            ))
        })
    }

    /// Write `body` for `window`, replacing any earlier archive of it
    pub async fn write(&self, window: &DateWindow, body: &[u8]) -> Result<PathBuf> {
        self.ensure_dir().await?;
        let path = self.path_for(window);

        tokio::fs::write(&path, body).await.map_err(|e| {
            Error::output(format!("Failed to write archive {}: {e}", path.display()))
        })?;

        debug!(path = %path.display(), bytes = body.len(), "Wrote archive file");
        Ok(path)
    }
}
