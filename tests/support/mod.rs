// ABOUTME: Test support utilities.
// ABOUTME: Provides a scripted command runner and an in-memory engine for integration tests.

use async_trait::async_trait;
use berth::bridge::{CommandOutput, CommandRunner, Error as BridgeError, Invocation, LineStream};
use berth::model::{
    Container, ContainerState, ContainerStats, EndpointSettings, FileEntry, HostConfig, Image,
    InspectConfig, InspectDetails, Mount, Network, NetworkSettings, Volume, container_names,
};
use berth::runtime::traits::*;
use berth::runtime::{EngineError, EngineResult};
use berth::service::{EventPayload, EventSink, SinkError};
use berth::types::{ContainerId, ImageId, NetworkId, Source};
use bytes::Bytes;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::{Mutex, Once};
use std::time::Duration;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
#[allow(dead_code)]
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("berth=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// What a scripted command does.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum Reply {
    Output(CommandOutput),
    Timeout,
    MissingProgram,
}

#[allow(dead_code)]
pub fn ok(stdout: &str) -> Reply {
    Reply::Output(CommandOutput {
        exit_code: 0,
        stdout: stdout.as_bytes().to_vec(),
        stderr: String::new(),
    })
}

#[allow(dead_code)]
pub fn ok_with_warning(stdout: &str, stderr: &str) -> Reply {
    Reply::Output(CommandOutput {
        exit_code: 0,
        stdout: stdout.as_bytes().to_vec(),
        stderr: stderr.to_string(),
    })
}

#[allow(dead_code)]
pub fn fail(code: i32, stderr: &str) -> Reply {
    Reply::Output(CommandOutput {
        exit_code: code,
        stdout: Vec::new(),
        stderr: stderr.to_string(),
    })
}

/// Answers invocations from a script keyed on argument text.
///
/// Rules match when the space-joined arguments contain the key; the first
/// registered match wins. Unmatched commands exit 1.
#[derive(Default)]
pub struct ScriptedRunner {
    rules: Vec<(String, Reply)>,
    calls: Mutex<Vec<Invocation>>,
}

#[allow(dead_code)]
impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, key: &str, reply: Reply) -> Self {
        self.rules.push((key.to_string(), reply));
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    fn reply(&self, invocation: &Invocation) -> Reply {
        self.calls.lock().unwrap().push(invocation.clone());
        let text = invocation.args.join(" ");
        self.rules
            .iter()
            .find(|(key, _)| text.contains(key.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| fail(1, &format!("unexpected command: {text}")))
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, invocation: &Invocation, timeout: Duration) -> berth::bridge::Result<CommandOutput> {
        match self.reply(invocation) {
            Reply::Output(output) => Ok(output),
            Reply::Timeout => Err(BridgeError::CommandTimeout(timeout)),
            Reply::MissingProgram => Err(BridgeError::Spawn {
                program: invocation.program.clone(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
        }
    }

    async fn stream(&self, invocation: &Invocation) -> berth::bridge::Result<LineStream> {
        match self.reply(invocation) {
            Reply::Output(output) => {
                let lines: Vec<berth::bridge::Result<String>> = output
                    .stdout_text()
                    .lines()
                    .map(|l| Ok(l.to_string()))
                    .collect();
                Ok(futures::stream::iter(lines).boxed())
            }
            Reply::Timeout => Err(BridgeError::CommandTimeout(Duration::ZERO)),
            Reply::MissingProgram => Err(BridgeError::Spawn {
                program: invocation.program.clone(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
        }
    }
}

/// Container record as a bulk listing would return it.
#[allow(dead_code)]
pub fn container(id: &str, name: &str, image: &str) -> Container {
    let id = ContainerId::from(id);
    Container {
        names: container_names([format!("/{name}")], &id),
        id,
        image: image.to_string(),
        image_id: String::new(),
        command: "run".to_string(),
        created: 1_700_000_000,
        state: ContainerState::Running,
        status: "Up 5 minutes".to_string(),
        ports: Vec::new(),
        labels: HashMap::new(),
        network_settings: NetworkSettings::default(),
        mounts: Vec::new(),
        host_config: None,
    }
}

#[allow(dead_code)]
pub fn details(image_id: &str) -> InspectDetails {
    InspectDetails {
        image: image_id.to_string(),
        ..InspectDetails::default()
    }
}

#[allow(dead_code)]
pub fn with_label(mut details: InspectDetails, key: &str, value: &str) -> InspectDetails {
    let mut labels = details.config.labels.clone();
    labels.insert(key.to_string(), value.to_string());
    details.config = InspectConfig { labels };
    details
}

#[allow(dead_code)]
pub fn with_network(mut details: InspectDetails, name: &str, network_id: &str) -> InspectDetails {
    details.network_settings.networks.insert(
        name.to_string(),
        EndpointSettings {
            network_id: network_id.to_string(),
            ..EndpointSettings::default()
        },
    );
    details
}

#[allow(dead_code)]
pub fn with_volume(mut details: InspectDetails, volume: &str) -> InspectDetails {
    details.mounts.push(Mount {
        kind: "volume".to_string(),
        name: Some(volume.to_string()),
        source: format!("/var/lib/docker/volumes/{volume}/_data"),
        destination: "/data".to_string(),
        read_write: true,
    });
    details
}

#[allow(dead_code)]
pub fn with_network_mode(mut details: InspectDetails, mode: &str) -> InspectDetails {
    details.host_config = Some(HostConfig {
        network_mode: Some(mode.to_string()),
    });
    details
}

/// In-memory engine. Records every mutating call.
#[derive(Default)]
pub struct FakeEngine {
    pub source: Source,
    pub containers: Vec<Container>,
    /// Inspect details by container id; absent ids fail enrichment.
    pub details: HashMap<String, InspectDetails>,
    pub images: Vec<Image>,
    pub volumes: Vec<Volume>,
    pub networks: Vec<Network>,
    /// Host files readable through the engine.
    pub host_files: HashMap<String, String>,
    /// Reply to raw engine commands.
    pub command_output: CommandOutput,
    /// Mutations that should fail, keyed by resource id or name.
    pub rejects: HashMap<String, EngineError>,
    pub calls: Mutex<Vec<String>>,
    pub reads: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().unwrap().clone()
    }

    fn mutate(&self, call: String, key: &str) -> EngineResult<()> {
        self.calls.lock().unwrap().push(call);
        match self.rejects.get(key) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ContainerOps for FakeEngine {
    async fn list_containers(&self, filters: &ContainerFilters) -> EngineResult<Vec<Container>> {
        Ok(self
            .containers
            .iter()
            .filter(|c| filters.all || c.state == ContainerState::Running)
            .filter(|c| {
                filters
                    .id
                    .as_ref()
                    .is_none_or(|id| c.id.as_str().starts_with(id.as_str()))
            })
            .filter(|c| {
                filters
                    .name
                    .as_ref()
                    .is_none_or(|name| c.names.iter().any(|n| n.contains(name.as_str())))
            })
            .cloned()
            .collect())
    }

    async fn inspect_details(&self, id: &ContainerId) -> EngineResult<InspectDetails> {
        self.details
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| EngineError::Timeout(format!("inspect {id}")))
    }

    async fn inspect_container(&self, id: &ContainerId) -> EngineResult<serde_json::Value> {
        if self.details.contains_key(id.as_str()) {
            Ok(serde_json::json!({ "Id": id.as_str() }))
        } else {
            Err(EngineError::NotFound(format!("container {id}")))
        }
    }

    async fn start_container(&self, id: &ContainerId) -> EngineResult<()> {
        self.mutate(format!("start {id}"), id.as_str())
    }

    async fn stop_container(&self, id: &ContainerId) -> EngineResult<()> {
        self.mutate(format!("stop {id}"), id.as_str())
    }

    async fn restart_container(&self, id: &ContainerId) -> EngineResult<()> {
        self.mutate(format!("restart {id}"), id.as_str())
    }

    async fn remove_container(&self, id: &ContainerId, force: bool) -> EngineResult<()> {
        self.mutate(format!("rm {id} force={force}"), id.as_str())
    }
}

#[async_trait]
impl ImageOps for FakeEngine {
    async fn list_images(&self) -> EngineResult<Vec<Image>> {
        Ok(self.images.clone())
    }

    async fn remove_image(&self, id: &ImageId, force: bool) -> EngineResult<()> {
        self.mutate(format!("rmi {id} force={force}"), id.as_str())
    }
}

#[async_trait]
impl VolumeOps for FakeEngine {
    async fn list_volumes(&self) -> EngineResult<Vec<Volume>> {
        Ok(self.volumes.clone())
    }

    async fn remove_volume(&self, name: &str, force: bool) -> EngineResult<()> {
        self.mutate(format!("volume rm {name} force={force}"), name)
    }
}

#[async_trait]
impl NetworkOps for FakeEngine {
    async fn list_networks(&self) -> EngineResult<Vec<Network>> {
        Ok(self.networks.clone())
    }

    async fn remove_network(&self, id: &NetworkId) -> EngineResult<()> {
        self.mutate(format!("network rm {id}"), id.as_str())
    }
}

#[async_trait]
impl ExecOps for FakeEngine {
    async fn exec(&self, id: &ContainerId, command: &[String]) -> EngineResult<ExecOutput> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("exec {id} {}", command.join("|")));
        Ok(ExecOutput {
            output: command.join(" "),
            exit_code: Some(0),
        })
    }
}

#[async_trait]
impl LogOps for FakeEngine {
    async fn fetch_logs(&self, _id: &ContainerId, _opts: &LogOptions) -> EngineResult<String> {
        Ok("line\n".to_string())
    }

    async fn stream_logs(&self, _id: &ContainerId, _opts: &LogOptions) -> EngineResult<LogStream> {
        Ok(futures::stream::iter(vec![Ok("line\n".to_string())]).boxed())
    }
}

#[async_trait]
impl FileOps for FakeEngine {
    async fn list_files(&self, _id: &ContainerId, _path: &str) -> EngineResult<Vec<FileEntry>> {
        Ok(Vec::new())
    }

    async fn download_file(&self, _id: &ContainerId, _path: &str) -> EngineResult<Bytes> {
        Ok(Bytes::new())
    }
}

#[async_trait]
impl StatsOps for FakeEngine {
    async fn container_stats(&self, _id: &ContainerId) -> EngineResult<ContainerStats> {
        Ok(ContainerStats::default())
    }
}

#[async_trait]
impl RuntimeInfo for FakeEngine {
    fn source(&self) -> Source {
        self.source.clone()
    }

    async fn engine_info(&self) -> EngineResult<serde_json::Value> {
        Ok(serde_json::json!({ "ServerVersion": "test" }))
    }

    async fn run_engine_command(&self, program: &str, args: &[String]) -> EngineResult<CommandOutput> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{program} {}", args.join(" ")));
        Ok(self.command_output.clone())
    }

    async fn read_host_file(&self, path: &str) -> EngineResult<Option<String>> {
        self.reads.lock().unwrap().push(path.to_string());
        Ok(self.host_files.get(path).cloned())
    }
}

/// Records every event it sees, optionally failing each notification.
#[derive(Default)]
pub struct RecordingSink {
    pub fail: bool,
    events: Mutex<Vec<(String, EventPayload)>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<(String, EventPayload)> {
        self.events.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn notify(&self, event: &str, payload: &EventPayload) -> Result<(), SinkError> {
        self.events
            .lock()
            .unwrap()
            .push((event.to_string(), payload.clone()));
        if self.fail {
            Err(SinkError("subscriber went away".to_string()))
        } else {
            Ok(())
        }
    }
}
