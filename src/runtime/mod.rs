// ABOUTME: Engine adapters behind one set of capability traits.
// ABOUTME: Selects the local socket adapter or the bridged CLI adapter by Source.

pub mod bridged;
mod detection;
pub mod enrich;
pub mod error;
pub mod local;
pub mod traits;
mod types;

pub use bridged::BridgedEngine;
pub use detection::{DetectionError, detect_local, probe_bridged};
pub use enrich::{Degraded, enrich_containers, enrich_one};
pub use error::{ConnectError, ConnectErrorKind, EngineError, EngineResult, ErrorKind};
pub use local::LocalEngine;
pub use traits::Engine;
pub use types::{DEFAULT_ENGINE_BINARY, DEFAULT_ENRICHMENT_CONCURRENCY, SourceConfig};

use crate::bridge::Bridge;
use crate::types::Source;
use std::sync::Arc;

/// Select and connect the adapter named by `config.source`.
///
/// Local sources resolve an engine endpoint; bridged sources check that the
/// engine CLI exists inside the configured profile.
pub async fn connect(config: &SourceConfig) -> Result<Arc<dyn Engine>, ConnectError> {
    match &config.source {
        Source::Local => {
            let endpoint = detect_local(config.socket.as_deref())?;
            let engine = LocalEngine::connect(&endpoint, config)?;
            Ok(Arc::new(engine))
        }
        Source::Bridged { .. } => {
            let bridge = Bridge::new(config.bridge_config());
            connect_bridged(bridge, config).await
        }
    }
}

/// Connect the bridged adapter over an existing bridge.
pub async fn connect_bridged(bridge: Bridge, config: &SourceConfig) -> Result<Arc<dyn Engine>, ConnectError> {
    probe_bridged(&bridge, &config.engine_binary, config.timeouts.info).await?;
    tracing::debug!(profile = %bridge.config().profile, "connected to bridged engine");
    Ok(Arc::new(BridgedEngine::new(bridge, config)))
}
