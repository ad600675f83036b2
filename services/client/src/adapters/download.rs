//! services/client/src/adapters/download.rs
//!
//! Writes exported artifacts into a directory on the local filesystem.
//! It implements the `DownloadSink` port from the `core` crate.

use async_trait::async_trait;
use bytes::Bytes;
use docgen_core::{DownloadSink, PortError, PortResult};
use std::path::PathBuf;
use tokio::fs;

#[derive(Clone, Debug)]
pub struct FsDownloadSink {
    dir: PathBuf,
}

impl FsDownloadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl DownloadSink for FsDownloadSink {
    /// Existing files with the same name are overwritten.
    async fn deliver(&self, file_name: &str, bytes: Bytes) -> PortResult<String> {
        fs::create_dir_all(&self.dir).await.map_err(|e| {
            PortError::Unexpected(format!("could not create {}: {}", self.dir.display(), e))
        })?;
        let path = self.dir.join(file_name);
        fs::write(&path, &bytes).await.map_err(|e| {
            PortError::Unexpected(format!("could not write {}: {}", path.display(), e))
        })?;
        Ok(path.display().to_string())
    }
}
