// ABOUTME: Best-effort per-container enrichment with bounded concurrency.
// ABOUTME: A failed inspect degrades one record instead of failing the listing.

use super::error::EngineError;
use super::traits::ContainerOps;
use crate::model::Container;
use futures::stream::{self, StreamExt};

/// A container whose inspect call failed. Bulk fields are still valid.
#[derive(Debug)]
pub struct Degraded {
    pub container: Container,
    pub error: EngineError,
}

impl Degraded {
    /// The bulk record with enrichment-only fields emptied.
    pub fn into_container(self) -> Container {
        self.container.degrade()
    }
}

/// Enrich a single container with its inspect details.
pub async fn enrich_one<E>(engine: &E, container: Container) -> Result<Container, Degraded>
where
    E: ContainerOps + ?Sized,
{
    match engine.inspect_details(&container.id).await {
        Ok(details) => Ok(container.enrich(details)),
        Err(error) => Err(Degraded { container, error }),
    }
}

/// Enrich containers concurrently, at most `limit` inspect calls in flight.
///
/// Output order matches input order.
pub async fn enrich_containers<E>(engine: &E, containers: Vec<Container>, limit: usize) -> Vec<Container>
where
    E: ContainerOps + ?Sized,
{
    stream::iter(containers)
        .map(|container| enrich_one(engine, container))
        .buffered(limit.max(1))
        .map(|result| match result {
            Ok(container) => container,
            Err(degraded) => {
                tracing::warn!(
                    container = %degraded.container.id,
                    error = %degraded.error,
                    "inspect failed, returning degraded record"
                );
                degraded.into_container()
            }
        })
        .collect()
        .await
}
