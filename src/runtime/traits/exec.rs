// ABOUTME: Exec operations trait for container engines.
// ABOUTME: Execute commands inside running containers.

use super::shared_types::ExecOutput;
use crate::runtime::error::EngineResult;
use crate::types::ContainerId;
use async_trait::async_trait;

#[async_trait]
pub trait ExecOps: Send + Sync {
    /// Run `command` (program plus arguments) and collect its stripped output.
    async fn exec(&self, id: &ContainerId, command: &[String]) -> EngineResult<ExecOutput>;
}
