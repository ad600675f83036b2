//! services/client/src/adapters/credentials.rs
//!
//! Persists the bearer identity as a small JSON file so a login survives
//! between runs. It implements the `CredentialStore` port from the `core` crate.

use async_trait::async_trait;
use docgen_core::{CredentialStore, Identity, PortError, PortResult};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn io_error(action: &str, path: &std::path::Path, e: std::io::Error) -> PortError {
    PortError::Unexpected(format!("could not {} {}: {}", action, path.display(), e))
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> PortResult<Option<Identity>> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error("read", &self.path, e)),
        };
        let identity = serde_json::from_slice::<Identity>(&raw).map_err(|e| {
            PortError::Unexpected(format!("corrupt credential file {}: {}", self.path.display(), e))
        })?;
        debug!("Loaded credential from {}", self.path.display());
        Ok(Some(identity))
    }

    async fn save(&self, identity: &Identity) -> PortResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("create", parent, e))?;
        }
        let raw = serde_json::to_vec_pretty(identity)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);
        let mut file = options
            .open(&self.path)
            .await
            .map_err(|e| io_error("open", &self.path, e))?;

        // An existing file keeps its old mode on open; tighten it before writing.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))
                .await
                .map_err(|e| io_error("restrict", &self.path, e))?;
        }

        file.write_all(&raw)
            .await
            .map_err(|e| io_error("write", &self.path, e))?;
        file.flush()
            .await
            .map_err(|e| io_error("write", &self.path, e))?;
        Ok(())
    }

    async fn clear(&self) -> PortResult<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("remove", &self.path, e)),
        }
    }
}
