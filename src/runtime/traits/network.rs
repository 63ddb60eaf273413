// ABOUTME: Network operations trait for container engines.
// ABOUTME: List and remove networks.

use crate::model::Network;
use crate::runtime::error::EngineResult;
use crate::types::NetworkId;
use async_trait::async_trait;

#[async_trait]
pub trait NetworkOps: Send + Sync {
    async fn list_networks(&self) -> EngineResult<Vec<Network>>;

    async fn remove_network(&self, id: &NetworkId) -> EngineResult<()>;
}
