// ABOUTME: Volume operations trait for container engines.
// ABOUTME: List and remove named volumes.

use crate::model::Volume;
use crate::runtime::error::EngineResult;
use async_trait::async_trait;

#[async_trait]
pub trait VolumeOps: Send + Sync {
    async fn list_volumes(&self) -> EngineResult<Vec<Volume>>;

    async fn remove_volume(&self, name: &str, force: bool) -> EngineResult<()>;
}
