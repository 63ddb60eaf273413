// ABOUTME: Resource statistics trait for container engines.

use crate::model::ContainerStats;
use crate::runtime::error::EngineResult;
use crate::types::ContainerId;
use async_trait::async_trait;

#[async_trait]
pub trait StatsOps: Send + Sync {
    /// One sample of CPU, memory, network and block I/O usage.
    async fn container_stats(&self, id: &ContainerId) -> EngineResult<ContainerStats>;
}
