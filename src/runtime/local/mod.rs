// ABOUTME: Local engine adapter backed by bollard over the engine socket.
// ABOUTME: Bulk API listings mapped onto the canonical model, plus exec, logs, stats and files.

pub mod mapping;

use super::error::{EngineError, EngineResult};
use super::traits::{
    ContainerFilters, ContainerOps, ExecOps, ExecOutput, FileOps, ImageOps, LogOps, LogOptions,
    LogStream, NetworkOps, RuntimeInfo, StatsOps, Timeouts, VolumeOps,
};
use super::types::SourceConfig;
use crate::bridge::{Bridge, CommandOutput};
use crate::decode::{parse_listing, strip_multiplexed};
use crate::model::{Container, ContainerStats, FileEntry, Image, InspectDetails, Network, Volume};
use crate::types::{ContainerId, ImageId, NetworkId, Source};
use async_trait::async_trait;
use bollard::Docker;
use bollard::container::LogOutput;
use bollard::exec::{StartExecOptions, StartExecResults};
use bollard::query_parameters::{
    DownloadFromContainerOptionsBuilder, InspectContainerOptions, ListContainersOptions,
    ListImagesOptions, ListNetworksOptions, ListVolumesOptions, LogsOptions,
    RemoveContainerOptions, RemoveImageOptions, RemoveVolumeOptions, RestartContainerOptions,
    StartContainerOptions, StatsOptionsBuilder, StopContainerOptions,
};
use bytes::{Bytes, BytesMut};
use futures::{StreamExt, TryStreamExt};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

/// Command used to list a directory inside a container.
///
/// The time style renders as date and time columns so the listing parser
/// sees the same nine-column layout everywhere.
pub(crate) fn listing_command(path: &str) -> Vec<String> {
    vec![
        "ls".to_string(),
        "-la".to_string(),
        "--time-style=+%Y-%m-%d %H:%M:%S %z".to_string(),
        path.to_string(),
    ]
}

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn map_engine_error(e: bollard::errors::Error, subject: &str) -> EngineError {
    match e {
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404,
            message,
        } => EngineError::NotFound(format!("{subject}: {message}")),
        bollard::errors::Error::DockerResponseServerError { message, .. } => {
            EngineError::Engine(format!("{subject}: {message}"))
        }
        bollard::errors::Error::RequestTimeoutError => {
            EngineError::Timeout(format!("{subject}: engine request timed out"))
        }
        e @ bollard::errors::Error::JsonSerdeError { .. } => {
            EngineError::Decode(format!("{subject}: {e}"))
        }
        e => EngineError::EngineUnavailable(format!("{subject}: {e}")),
    }
}

fn decode_error(subject: &str, e: serde_json::Error) -> EngineError {
    EngineError::Decode(format!("{subject}: {e}"))
}

/// Re-read bollard models through their engine-cased JSON form.
fn to_records<S, T>(kind: &str, items: Vec<S>) -> Vec<T>
where
    S: Serialize,
    T: DeserializeOwned,
{
    items
        .into_iter()
        .filter_map(|item| match serde_json::to_value(item) {
            Ok(value) => mapping::from_api(kind, value),
            Err(e) => {
                tracing::warn!(kind, error = %e, "dropping unserializable record");
                None
            }
        })
        .collect()
}

/// Bound a call by `budget`.
async fn within<T, F>(budget: Duration, subject: &str, fut: F) -> EngineResult<T>
where
    F: Future<Output = EngineResult<T>>,
{
    match tokio::time::timeout(budget, fut).await {
        Ok(result) => result,
        Err(_) => Err(EngineError::timeout(subject, budget)),
    }
}

// =============================================================================
// LocalEngine
// =============================================================================

/// Engine adapter for a locally reachable socket.
pub struct LocalEngine {
    client: Docker,
    host: Bridge,
    engine_binary: String,
    timeouts: Timeouts,
}

impl std::fmt::Debug for LocalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalEngine")
            .field("client", &"<bollard::Docker>")
            .field("engine_binary", &self.engine_binary)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

impl LocalEngine {
    /// Create an adapter around an existing client.
    pub fn new(client: Docker, config: &SourceConfig) -> Self {
        Self {
            client,
            host: Bridge::direct(),
            engine_binary: config.engine_binary.clone(),
            timeouts: config.timeouts,
        }
    }

    /// Connect to an endpoint found by `detect_local()`.
    ///
    /// Accepts socket paths, `unix://`, `npipe://`, `tcp://` and `http://` URLs.
    pub fn connect(endpoint: &str, config: &SourceConfig) -> EngineResult<Self> {
        let request_timeout = config.timeouts.exec.as_secs().max(1);
        let client = if endpoint.starts_with("tcp://") || endpoint.starts_with("http://") {
            Docker::connect_with_http(endpoint, request_timeout, bollard::API_DEFAULT_VERSION)
        } else {
            connect_socket(endpoint, request_timeout)
        }
        .map_err(|e| EngineError::EngineUnavailable(format!("{endpoint}: {e}")))?;

        tracing::debug!(endpoint, "connected to local engine");
        Ok(Self::new(client, config))
    }

    async fn exec_raw(&self, id: &ContainerId, command: Vec<String>) -> EngineResult<ExecOutput> {
        let subject = format!("exec in {id}");
        let opts = bollard::models::ExecConfig {
            cmd: Some(command),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            ..Default::default()
        };

        let exec_id = self
            .client
            .create_exec(id.as_str(), opts)
            .await
            .map_err(|e| map_engine_error(e, &subject))?
            .id;

        let started = self
            .client
            .start_exec(
                &exec_id,
                Some(StartExecOptions {
                    detach: false,
                    ..Default::default()
                }),
            )
            .await
            .map_err(|e| map_engine_error(e, &subject))?;

        let mut raw = Vec::new();
        if let StartExecResults::Attached { mut output, .. } = started {
            while let Some(item) = output.next().await {
                let chunk = item.map_err(|e| map_engine_error(e, &subject))?;
                raw.extend_from_slice(&log_bytes(chunk));
            }
        }

        let exit_code = self
            .client
            .inspect_exec(&exec_id)
            .await
            .map_err(|e| map_engine_error(e, &subject))?
            .exit_code;

        Ok(ExecOutput {
            output: strip_multiplexed(&raw),
            exit_code,
        })
    }
}

#[cfg(unix)]
fn connect_socket(endpoint: &str, timeout: u64) -> Result<Docker, bollard::errors::Error> {
    let path = endpoint.strip_prefix("unix://").unwrap_or(endpoint);
    Docker::connect_with_unix(path, timeout, bollard::API_DEFAULT_VERSION)
}

#[cfg(windows)]
fn connect_socket(endpoint: &str, timeout: u64) -> Result<Docker, bollard::errors::Error> {
    let path = endpoint.strip_prefix("npipe://").unwrap_or(endpoint);
    Docker::connect_with_named_pipe(path, timeout, bollard::API_DEFAULT_VERSION)
}

fn log_bytes(output: LogOutput) -> Bytes {
    match output {
        LogOutput::StdOut { message }
        | LogOutput::StdErr { message }
        | LogOutput::StdIn { message }
        | LogOutput::Console { message } => message,
    }
}

#[async_trait]
impl ContainerOps for LocalEngine {
    async fn list_containers(&self, filters: &ContainerFilters) -> EngineResult<Vec<Container>> {
        let mut filter_map: HashMap<String, Vec<String>> = HashMap::new();
        if let Some(id) = &filters.id {
            filter_map.insert("id".to_string(), vec![id.to_string()]);
        }
        if let Some(name) = &filters.name {
            filter_map.insert("name".to_string(), vec![name.clone()]);
        }

        let opts = ListContainersOptions {
            all: filters.all,
            filters: Some(filter_map),
            ..Default::default()
        };

        let summaries = within(self.timeouts.info, "list containers", async {
            self.client
                .list_containers(Some(opts))
                .await
                .map_err(|e| map_engine_error(e, "list containers"))
        })
        .await?;

        Ok(to_records::<_, mapping::ApiContainer>("container", summaries)
            .into_iter()
            .filter_map(mapping::container)
            .collect())
    }

    async fn inspect_details(&self, id: &ContainerId) -> EngineResult<InspectDetails> {
        let value = self.inspect_container(id).await?;
        serde_json::from_value(value).map_err(|e| decode_error(&format!("inspect {id}"), e))
    }

    async fn inspect_container(&self, id: &ContainerId) -> EngineResult<serde_json::Value> {
        let subject = format!("container {id}");
        let details = within(self.timeouts.info, &subject, async {
            self.client
                .inspect_container(id.as_str(), None::<InspectContainerOptions>)
                .await
                .map_err(|e| map_engine_error(e, &subject))
        })
        .await?;

        serde_json::to_value(details).map_err(|e| decode_error(&subject, e))
    }

    async fn start_container(&self, id: &ContainerId) -> EngineResult<()> {
        let subject = format!("start {id}");
        within(self.timeouts.exec, &subject, async {
            self.client
                .start_container(id.as_str(), None::<StartContainerOptions>)
                .await
                .map_err(|e| map_engine_error(e, &subject))
        })
        .await
    }

    async fn stop_container(&self, id: &ContainerId) -> EngineResult<()> {
        let subject = format!("stop {id}");
        within(self.timeouts.exec, &subject, async {
            self.client
                .stop_container(id.as_str(), None::<StopContainerOptions>)
                .await
                .map_err(|e| map_engine_error(e, &subject))
        })
        .await
    }

    async fn restart_container(&self, id: &ContainerId) -> EngineResult<()> {
        let subject = format!("restart {id}");
        within(self.timeouts.exec, &subject, async {
            self.client
                .restart_container(id.as_str(), None::<RestartContainerOptions>)
                .await
                .map_err(|e| map_engine_error(e, &subject))
        })
        .await
    }

    async fn remove_container(&self, id: &ContainerId, force: bool) -> EngineResult<()> {
        let subject = format!("remove {id}");
        let opts = RemoveContainerOptions {
            force,
            ..Default::default()
        };
        within(self.timeouts.exec, &subject, async {
            self.client
                .remove_container(id.as_str(), Some(opts))
                .await
                .map_err(|e| map_engine_error(e, &subject))
        })
        .await
    }
}

#[async_trait]
impl ImageOps for LocalEngine {
    async fn list_images(&self) -> EngineResult<Vec<Image>> {
        let opts = ListImagesOptions {
            all: false,
            ..Default::default()
        };
        let summaries = within(self.timeouts.info, "list images", async {
            self.client
                .list_images(Some(opts))
                .await
                .map_err(|e| map_engine_error(e, "list images"))
        })
        .await?;

        Ok(to_records::<_, mapping::ApiImage>("image", summaries)
            .into_iter()
            .map(mapping::image)
            .collect())
    }

    async fn remove_image(&self, id: &ImageId, force: bool) -> EngineResult<()> {
        let subject = format!("image {id}");
        let opts = RemoveImageOptions {
            force,
            ..Default::default()
        };
        within(self.timeouts.exec, &subject, async {
            self.client
                .remove_image(id.as_str(), Some(opts), None)
                .await
                .map_err(|e| map_engine_error(e, &subject))
        })
        .await?;
        Ok(())
    }
}

#[async_trait]
impl VolumeOps for LocalEngine {
    async fn list_volumes(&self) -> EngineResult<Vec<Volume>> {
        let response = within(self.timeouts.info, "list volumes", async {
            self.client
                .list_volumes(None::<ListVolumesOptions>)
                .await
                .map_err(|e| map_engine_error(e, "list volumes"))
        })
        .await?;

        Ok(
            to_records::<_, mapping::ApiVolume>("volume", response.volumes.unwrap_or_default())
                .into_iter()
                .map(mapping::volume)
                .collect(),
        )
    }

    async fn remove_volume(&self, name: &str, force: bool) -> EngineResult<()> {
        let subject = format!("volume {name}");
        within(self.timeouts.exec, &subject, async {
            self.client
                .remove_volume(name, Some(RemoveVolumeOptions { force }))
                .await
                .map_err(|e| map_engine_error(e, &subject))
        })
        .await
    }
}

#[async_trait]
impl NetworkOps for LocalEngine {
    async fn list_networks(&self) -> EngineResult<Vec<Network>> {
        let networks = within(self.timeouts.info, "list networks", async {
            self.client
                .list_networks(None::<ListNetworksOptions>)
                .await
                .map_err(|e| map_engine_error(e, "list networks"))
        })
        .await?;

        Ok(to_records::<_, mapping::ApiNetwork>("network", networks)
            .into_iter()
            .map(mapping::network)
            .collect())
    }

    async fn remove_network(&self, id: &NetworkId) -> EngineResult<()> {
        let subject = format!("network {id}");
        within(self.timeouts.exec, &subject, async {
            self.client
                .remove_network(id.as_str())
                .await
                .map_err(|e| map_engine_error(e, &subject))
        })
        .await
    }
}

#[async_trait]
impl ExecOps for LocalEngine {
    async fn exec(&self, id: &ContainerId, command: &[String]) -> EngineResult<ExecOutput> {
        within(self.timeouts.exec, &format!("exec in {id}"), self.exec_raw(id, command.to_vec())).await
    }
}

#[async_trait]
impl FileOps for LocalEngine {
    async fn list_files(&self, id: &ContainerId, path: &str) -> EngineResult<Vec<FileEntry>> {
        let result = within(
            self.timeouts.exec,
            &format!("list {path} in {id}"),
            self.exec_raw(id, listing_command(path)),
        )
        .await?;

        let entries = parse_listing(&result.output);
        if entries.is_empty() && result.exit_code.is_some_and(|code| code != 0) {
            return Err(listing_error(path, &result.output));
        }
        Ok(entries)
    }

    async fn download_file(&self, id: &ContainerId, path: &str) -> EngineResult<Bytes> {
        let subject = format!("download {path} from {id}");
        let opts = DownloadFromContainerOptionsBuilder::new().path(path).build();
        within(self.timeouts.exec, &subject, async {
            let archive = self
                .client
                .download_from_container(id.as_str(), Some(opts))
                .map_err(|e| map_engine_error(e, &subject))
                .try_fold(BytesMut::new(), |mut acc, chunk| async move {
                    acc.extend_from_slice(&chunk);
                    Ok(acc)
                })
                .await?;
            Ok(archive.freeze())
        })
        .await
    }
}

/// Classify a failed directory listing by its output.
pub(crate) fn listing_error(path: &str, output: &str) -> EngineError {
    if output.contains("No such file or directory") {
        EngineError::NotFound(format!("path {path}"))
    } else {
        EngineError::Engine(format!("listing {path}: {}", output.trim()))
    }
}

#[async_trait]
impl LogOps for LocalEngine {
    async fn fetch_logs(&self, id: &ContainerId, opts: &LogOptions) -> EngineResult<String> {
        let subject = format!("logs of {id}");
        let fetch = LogOptions {
            follow: false,
            ..opts.clone()
        };
        let mut stream = self.stream_logs(id, &fetch).await?;
        within(self.timeouts.exec, &subject, async {
            let mut text = String::new();
            while let Some(chunk) = stream.next().await {
                text.push_str(&chunk?);
            }
            Ok(text)
        })
        .await
    }

    async fn stream_logs(&self, id: &ContainerId, opts: &LogOptions) -> EngineResult<LogStream> {
        let subject = format!("logs of {id}");
        let log_opts = LogsOptions {
            stdout: true,
            stderr: true,
            follow: opts.follow,
            timestamps: opts.timestamps,
            tail: opts.tail_arg(),
            ..Default::default()
        };

        let stream = self
            .client
            .logs(id.as_str(), Some(log_opts))
            .map(move |chunk| {
                chunk
                    .map(|output| strip_multiplexed(&log_bytes(output)))
                    .map_err(|e| map_engine_error(e, &subject))
            });
        Ok(stream.boxed())
    }
}

#[async_trait]
impl StatsOps for LocalEngine {
    async fn container_stats(&self, id: &ContainerId) -> EngineResult<ContainerStats> {
        let subject = format!("stats of {id}");
        let opts = StatsOptionsBuilder::new().stream(false).one_shot(false).build();

        let response = within(self.timeouts.info, &subject, async {
            let mut samples = std::pin::pin!(self.client.stats(id.as_str(), Some(opts)));
            samples
                .next()
                .await
                .ok_or_else(|| EngineError::Engine(format!("{subject}: no sample returned")))?
                .map_err(|e| map_engine_error(e, &subject))
        })
        .await?;

        let value = serde_json::to_value(response).map_err(|e| decode_error(&subject, e))?;
        let sample: mapping::StatsSample =
            serde_json::from_value(value).map_err(|e| decode_error(&subject, e))?;
        Ok(mapping::stats(&sample))
    }
}

#[async_trait]
impl RuntimeInfo for LocalEngine {
    fn source(&self) -> Source {
        Source::Local
    }

    async fn engine_info(&self) -> EngineResult<serde_json::Value> {
        let info = within(self.timeouts.info, "engine info", async {
            self.client
                .info()
                .await
                .map_err(|e| map_engine_error(e, "engine info"))
        })
        .await?;
        serde_json::to_value(info).map_err(|e| decode_error("engine info", e))
    }

    async fn run_engine_command(&self, program: &str, args: &[String]) -> EngineResult<CommandOutput> {
        let program = if program.is_empty() {
            self.engine_binary.as_str()
        } else {
            program
        };
        Ok(self.host.exec(program, args, self.timeouts.exec).await?)
    }

    async fn read_host_file(&self, path: &str) -> EngineResult<Option<String>> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(EngineError::Engine(format!("read {path}: {e}"))),
        }
    }
}
