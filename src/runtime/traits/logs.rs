// ABOUTME: Log operations trait for container engines.
// ABOUTME: Fetch or stream container logs as stripped text.

use super::shared_types::LogOptions;
use crate::runtime::error::{EngineError, EngineResult};
use crate::types::ContainerId;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Stripped log text chunks, in engine order.
pub type LogStream = BoxStream<'static, Result<String, EngineError>>;

#[async_trait]
pub trait LogOps: Send + Sync {
    /// Collect logs into one string.
    async fn fetch_logs(&self, id: &ContainerId, opts: &LogOptions) -> EngineResult<String>;

    /// Stream logs. Dropping the stream ends the underlying request or process.
    async fn stream_logs(&self, id: &ContainerId, opts: &LogOptions) -> EngineResult<LogStream>;
}
