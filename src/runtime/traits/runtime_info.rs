// ABOUTME: Engine metadata and host access trait.
// ABOUTME: Engine info, raw engine CLI commands, and host file reads.

use crate::bridge::CommandOutput;
use crate::runtime::error::EngineResult;
use crate::types::Source;
use async_trait::async_trait;

#[async_trait]
pub trait RuntimeInfo: Send + Sync {
    /// Which execution context this adapter serves.
    fn source(&self) -> Source;

    /// Engine `info` document.
    async fn engine_info(&self) -> EngineResult<serde_json::Value>;

    /// Run the engine CLI (or another engine tool) with the given arguments.
    ///
    /// A non-zero exit is returned as output, not as an error.
    async fn run_engine_command(&self, program: &str, args: &[String]) -> EngineResult<CommandOutput>;

    /// Read a file on the host this adapter runs commands on.
    ///
    /// Host paths are translated for bridged contexts. `None` when absent.
    async fn read_host_file(&self, path: &str) -> EngineResult<Option<String>>;
}
