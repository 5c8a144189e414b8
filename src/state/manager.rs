//! Credential store implementation
//!
//! Provides file-based persistence of the app context with atomic writes.

use super::types::AppContext;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Persists an [`AppContext`] as JSON
#[derive(Debug, Clone)]
pub struct CredentialStore {
    /// Path to the credentials file
    path: PathBuf,
}

impl CredentialStore {
    /// Create a store for the given path
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the credentials file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the context. A missing file is an error: the app key has to be
    /// provisioned by hand before anything else can run.
    pub async fn load(&self) -> Result<AppContext> {
        if !self.path.exists() {
            return Err(Error::file_not_found(&self.path));
        }

        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::state(format!("Failed to read credentials file: {e}")))?;

        let context: AppContext = serde_json::from_str(&contents)
            .map_err(|e| Error::state(format!("Failed to parse credentials file: {e}")))?;

        if context.app_key.is_empty() {
            return Err(Error::state("Credentials file has an empty app_key"));
        }

        Ok(context)
    }

    /// Save the context, replacing the file atomically
    pub async fn save(&self, context: &AppContext) -> Result<()> {
        let contents = serde_json::to_string(context)
            .map_err(|e| Error::state(format!("Failed to serialize credentials: {e}")))?;

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::state(format!("Failed to write credentials file: {e}")))?;

        restrict_permissions(&temp_path).await?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::state(format!("Failed to rename credentials file: {e}")))?;

        debug!(path = %self.path.display(), "Saved credentials");
        Ok(())
    }
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .await
        .map_err(|e| Error::state(format!("Failed to set credentials permissions: {e}")))
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}
