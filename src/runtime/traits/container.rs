// ABOUTME: Container operations trait for container engines.
// ABOUTME: List, inspect, start, stop, restart, and remove containers.

use super::shared_types::ContainerFilters;
use crate::model::{Container, InspectDetails};
use crate::runtime::error::EngineResult;
use crate::types::ContainerId;
use async_trait::async_trait;

/// Container lifecycle operations.
#[async_trait]
pub trait ContainerOps: Send + Sync {
    /// Bulk listing. Records are not yet enriched with inspect details.
    async fn list_containers(&self, filters: &ContainerFilters) -> EngineResult<Vec<Container>>;

    /// Labels, networks, mounts and image id for one container.
    async fn inspect_details(&self, id: &ContainerId) -> EngineResult<InspectDetails>;

    /// Engine-native inspect document.
    async fn inspect_container(&self, id: &ContainerId) -> EngineResult<serde_json::Value>;

    async fn start_container(&self, id: &ContainerId) -> EngineResult<()>;

    async fn stop_container(&self, id: &ContainerId) -> EngineResult<()>;

    async fn restart_container(&self, id: &ContainerId) -> EngineResult<()>;

    async fn remove_container(&self, id: &ContainerId, force: bool) -> EngineResult<()>;
}
