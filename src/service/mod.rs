// ABOUTME: Control-plane facade over one engine adapter.
// ABOUTME: Enriches listings, classifies usage and emits events after mutations.

pub mod command;
pub mod compose;
pub mod events;
pub mod usage;

pub use command::{CommandResult, sanitize_command};
pub use compose::{COMPOSE_FILE_NAMES, ComposeFile, ComposeQuery};
pub use events::{
    BroadcastSink, ContainerAction, Event, EventPayload, EventSink, LogSink, NoopSink, SinkError,
};
pub use usage::{classify_images, classify_networks, classify_volumes};

use crate::bridge::{Bridge, BridgeConfig};
use crate::model::{Classified, Container, ContainerStats, FileEntry, Image, Network, Volume};
use crate::runtime::traits::{ContainerFilters, ExecOutput, LogOptions, LogStream};
use crate::runtime::{
    ConnectError, Engine, EngineError, EngineResult, SourceConfig, enrich_containers, enrich_one,
};
use crate::types::{ContainerId, ImageId, NetworkId, Source};
use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;

/// Uniform container operations for whichever source the engine serves.
#[derive(Clone)]
pub struct ControlPlane {
    engine: Arc<dyn Engine>,
    sink: Arc<dyn EventSink>,
    concurrency: usize,
}

impl std::fmt::Debug for ControlPlane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlPlane")
            .field("source", &self.engine.source())
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

impl ControlPlane {
    pub fn new(engine: Arc<dyn Engine>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            engine,
            sink,
            concurrency: crate::runtime::DEFAULT_ENRICHMENT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, limit: usize) -> Self {
        self.concurrency = limit.max(1);
        self
    }

    /// Select, connect and wrap the adapter named by `config`.
    pub async fn connect(config: &SourceConfig, sink: Arc<dyn EventSink>) -> Result<Self, ConnectError> {
        let engine = crate::runtime::connect(config).await?;
        Ok(Self::new(engine, sink).with_concurrency(config.concurrency()))
    }

    pub fn source(&self) -> Source {
        self.engine.source()
    }

    pub fn engine(&self) -> &Arc<dyn Engine> {
        &self.engine
    }

    fn emit(&self, event: &str, payload: EventPayload) {
        if let Err(e) = self.sink.notify(event, &payload) {
            tracing::warn!(event, error = %e, "event sink rejected notification");
        }
    }

    // Containers

    pub async fn list_containers(&self, all: bool) -> EngineResult<Vec<Container>> {
        let filters = ContainerFilters {
            all,
            ..ContainerFilters::default()
        };
        let containers = self.engine.list_containers(&filters).await?;
        Ok(enrich_containers(self.engine.as_ref(), containers, self.concurrency).await)
    }

    pub async fn get_container(&self, id: &ContainerId) -> EngineResult<Container> {
        let Some(container) = self.find_container(id).await? else {
            return Err(EngineError::NotFound(format!("container {id}")));
        };
        Ok(match enrich_one(self.engine.as_ref(), container).await {
            Ok(container) => container,
            Err(degraded) => {
                tracing::warn!(
                    container = %id,
                    error = %degraded.error,
                    "inspect failed, returning degraded record"
                );
                degraded.into_container()
            }
        })
    }

    /// Resolve a reference by id prefix, then by exact name.
    async fn find_container(&self, reference: &ContainerId) -> EngineResult<Option<Container>> {
        let by_id = self
            .engine
            .list_containers(&ContainerFilters::by_id(reference))
            .await?
            .into_iter()
            .find(|c| c.id.as_str().starts_with(reference.as_str()));
        if by_id.is_some() {
            return Ok(by_id);
        }

        let name = reference.as_str().trim_start_matches('/');
        if name.is_empty() {
            return Ok(None);
        }
        Ok(self
            .engine
            .list_containers(&ContainerFilters::by_name(name))
            .await?
            .into_iter()
            .find(|c| c.names.iter().any(|n| n.trim_start_matches('/') == name)))
    }

    pub async fn inspect_container(&self, id: &ContainerId) -> EngineResult<serde_json::Value> {
        self.engine.inspect_container(id).await
    }

    pub async fn start_container(&self, id: &ContainerId) -> EngineResult<()> {
        self.engine.start_container(id).await?;
        self.emit(
            events::CONTAINER_STATE_CHANGED,
            EventPayload::action(id.as_str(), ContainerAction::Start),
        );
        Ok(())
    }

    pub async fn stop_container(&self, id: &ContainerId) -> EngineResult<()> {
        self.engine.stop_container(id).await?;
        self.emit(
            events::CONTAINER_STATE_CHANGED,
            EventPayload::action(id.as_str(), ContainerAction::Stop),
        );
        Ok(())
    }

    pub async fn restart_container(&self, id: &ContainerId) -> EngineResult<()> {
        self.engine.restart_container(id).await?;
        self.emit(
            events::CONTAINER_STATE_CHANGED,
            EventPayload::action(id.as_str(), ContainerAction::Restart),
        );
        Ok(())
    }

    pub async fn remove_container(&self, id: &ContainerId, force: bool) -> EngineResult<()> {
        self.engine.remove_container(id, force).await?;
        self.emit(events::CONTAINER_REMOVED, EventPayload::id(id.as_str()));
        Ok(())
    }

    pub async fn fetch_logs(&self, id: &ContainerId, opts: &LogOptions) -> EngineResult<String> {
        self.engine.fetch_logs(id, opts).await
    }

    pub async fn stream_logs(&self, id: &ContainerId, opts: &LogOptions) -> EngineResult<LogStream> {
        self.engine.stream_logs(id, opts).await
    }

    pub async fn container_stats(&self, id: &ContainerId) -> EngineResult<ContainerStats> {
        self.engine.container_stats(id).await
    }

    pub async fn list_files(&self, id: &ContainerId, path: &str) -> EngineResult<Vec<FileEntry>> {
        self.engine.list_files(id, path).await
    }

    pub async fn download_file(&self, id: &ContainerId, path: &str) -> EngineResult<Bytes> {
        self.engine.download_file(id, path).await
    }

    /// Run a whitespace-separated command inside a container.
    pub async fn exec(&self, id: &ContainerId, command: &str) -> EngineResult<ExecOutput> {
        let argv: Vec<String> = command.split_whitespace().map(str::to_string).collect();
        if argv.is_empty() {
            return Err(EngineError::Validation("command is required".to_string()));
        }
        self.engine.exec(id, &argv).await
    }

    // Images, volumes, networks

    pub async fn list_images(&self) -> EngineResult<Vec<Classified<Image>>> {
        let images = self.engine.list_images().await?;
        let containers = self.usage_snapshot().await?;
        Ok(classify_images(images, &containers))
    }

    pub async fn remove_image(&self, id: &ImageId, force: bool) -> EngineResult<()> {
        self.engine.remove_image(id, force).await?;
        self.emit(events::IMAGE_REMOVED, EventPayload::id(id.as_str()));
        Ok(())
    }

    pub async fn list_volumes(&self) -> EngineResult<Vec<Classified<Volume>>> {
        let volumes = self.engine.list_volumes().await?;
        let containers = self.usage_snapshot().await?;
        Ok(classify_volumes(volumes, &containers))
    }

    pub async fn remove_volume(&self, name: &str, force: bool) -> EngineResult<()> {
        self.engine.remove_volume(name, force).await?;
        self.emit(events::VOLUME_REMOVED, EventPayload::name(name));
        Ok(())
    }

    pub async fn list_networks(&self) -> EngineResult<Vec<Classified<Network>>> {
        let networks = self.engine.list_networks().await?;
        let containers = self.usage_snapshot().await?;
        Ok(classify_networks(networks, &containers))
    }

    pub async fn remove_network(&self, id: &NetworkId) -> EngineResult<()> {
        self.engine.remove_network(id).await?;
        self.emit(events::NETWORK_REMOVED, EventPayload::id(id.as_str()));
        Ok(())
    }

    /// All containers, enriched, for usage classification.
    async fn usage_snapshot(&self) -> EngineResult<Vec<Container>> {
        self.list_containers(true).await
    }

    // Host-level

    pub async fn compose_file(&self, query: &ComposeQuery) -> EngineResult<ComposeFile> {
        let cwd = std::env::current_dir().map_err(|e| {
            EngineError::EngineUnavailable(format!("cannot resolve working directory: {e}"))
        })?;
        self.compose_file_in(query, &cwd).await
    }

    /// Compose lookup with an explicit fallback directory.
    pub async fn compose_file_in(&self, query: &ComposeQuery, cwd: &Path) -> EngineResult<ComposeFile> {
        compose::find_compose_file(self.engine.as_ref(), query, cwd).await
    }

    pub async fn engine_info(&self) -> EngineResult<serde_json::Value> {
        self.engine.engine_info().await
    }

    pub async fn run_command(&self, command: &str) -> EngineResult<CommandResult> {
        command::run_command(self.engine.as_ref(), command).await
    }
}

/// Profiles (WSL distributions) the configured launcher can enter.
pub async fn list_profiles(config: &SourceConfig) -> EngineResult<Vec<String>> {
    let bridge = Bridge::new(BridgeConfig::wsl(config.profile()).launcher(config.launcher.clone()));
    list_profiles_with(&bridge).await
}

/// Profiles reachable through an existing bridge.
pub async fn list_profiles_with(bridge: &Bridge) -> EngineResult<Vec<String>> {
    Ok(bridge.profiles().await?)
}
