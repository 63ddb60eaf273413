// ABOUTME: Image operations trait for container engines.
// ABOUTME: List and remove container images.

use crate::model::Image;
use crate::runtime::error::EngineResult;
use crate::types::ImageId;
use async_trait::async_trait;

#[async_trait]
pub trait ImageOps: Send + Sync {
    async fn list_images(&self) -> EngineResult<Vec<Image>>;

    /// Remove an image. Without `force` the engine refuses images in use.
    async fn remove_image(&self, id: &ImageId, force: bool) -> EngineResult<()>;
}
