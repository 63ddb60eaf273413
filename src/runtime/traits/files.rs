// ABOUTME: Filesystem operations trait for container engines.
// ABOUTME: Browse directories and download paths from inside containers.

use crate::model::FileEntry;
use crate::runtime::error::EngineResult;
use crate::types::ContainerId;
use async_trait::async_trait;
use bytes::Bytes;

#[async_trait]
pub trait FileOps: Send + Sync {
    async fn list_files(&self, id: &ContainerId, path: &str) -> EngineResult<Vec<FileEntry>>;

    /// Tar archive of `path` as produced by the engine.
    async fn download_file(&self, id: &ContainerId, path: &str) -> EngineResult<Bytes>;
}
