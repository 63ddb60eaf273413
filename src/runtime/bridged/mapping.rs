// ABOUTME: Maps engine CLI `--format '{{json .}}'` rows onto the canonical model.
// ABOUTME: Also classifies CLI failures from exit status and stderr text.

use crate::bridge::CommandOutput;
use crate::decode::{parse_percent, parse_ports, parse_size, parse_size_pair};
use crate::model::{
    Container, ContainerState, ContainerStats, EndpointSettings, Image, Mount, Network,
    NetworkSettings, Volume, container_names, normalize_repo_tags,
};
use crate::runtime::error::EngineError;
use crate::types::{ContainerId, ImageId, NetworkId};
use chrono::DateTime;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PsRow {
    #[serde(rename = "ID")]
    id: String,
    names: String,
    image: String,
    command: String,
    created_at: String,
    state: String,
    status: String,
    ports: String,
    labels: String,
    networks: String,
    mounts: String,
}

/// Map a `ps` row. Rows without an id are dropped.
pub fn container(row: PsRow) -> Option<Container> {
    if row.id.is_empty() {
        tracing::warn!(names = %row.names, "dropping container row without id");
        return None;
    }
    let id = ContainerId::new(row.id);
    let networks = split_list(&row.networks)
        .map(|name| (name.to_string(), EndpointSettings::default()))
        .collect();

    Some(Container {
        names: container_names(split_list(&row.names), &id),
        id,
        image: row.image,
        image_id: String::new(),
        command: row.command.trim_matches('"').to_string(),
        created: parse_created(&row.created_at),
        state: ContainerState::parse(&row.state),
        status: row.status,
        ports: parse_ports(&row.ports),
        labels: parse_labels(&row.labels),
        network_settings: NetworkSettings { networks },
        mounts: parse_mounts(&row.mounts),
        host_config: None,
    })
}

/// Parse the `ps` mounts column: volume names, or host paths for bind mounts.
pub fn parse_mounts(s: &str) -> Vec<Mount> {
    split_list(s)
        .map(|entry| {
            if entry.contains(['/', '\\']) {
                Mount {
                    kind: "bind".to_string(),
                    source: entry.to_string(),
                    read_write: true,
                    ..Mount::default()
                }
            } else {
                Mount {
                    kind: "volume".to_string(),
                    name: Some(entry.to_string()),
                    read_write: true,
                    ..Mount::default()
                }
            }
        })
        .collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ImageRow {
    #[serde(rename = "ID")]
    id: String,
    repository: String,
    tag: String,
    created_at: String,
    size: String,
}

/// Map image rows, merging rows that share an id into one image.
pub fn images(rows: Vec<ImageRow>) -> Vec<Image> {
    let mut order: Vec<String> = Vec::new();
    let mut merged: HashMap<String, (Image, Vec<String>)> = HashMap::new();

    for row in rows {
        if row.id.is_empty() {
            tracing::warn!(repository = %row.repository, "dropping image row without id");
            continue;
        }
        let tag = format!("{}:{}", row.repository, row.tag);
        let entry = merged.entry(row.id.clone()).or_insert_with(|| {
            order.push(row.id.clone());
            let image = Image {
                id: ImageId::new(row.id.clone()),
                repo_tags: Vec::new(),
                created: parse_created(&row.created_at),
                size: parse_size(&row.size),
            };
            (image, Vec::new())
        });
        entry.1.push(tag);
    }

    order
        .into_iter()
        .filter_map(|id| merged.remove(&id))
        .map(|(mut image, tags)| {
            image.repo_tags = normalize_repo_tags(tags);
            image
        })
        .collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct VolumeRow {
    name: String,
    driver: String,
    mountpoint: String,
    labels: String,
    scope: String,
}

pub fn volume(row: VolumeRow) -> Option<Volume> {
    if row.name.is_empty() {
        tracing::warn!("dropping volume row without name");
        return None;
    }
    Some(Volume {
        name: row.name,
        driver: row.driver,
        mountpoint: row.mountpoint,
        labels: parse_labels(&row.labels),
        scope: row.scope,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NetworkRow {
    #[serde(rename = "ID")]
    id: String,
    name: String,
    driver: String,
    scope: String,
}

pub fn network(row: NetworkRow) -> Option<Network> {
    if row.name.is_empty() {
        tracing::warn!(id = %row.id, "dropping network row without name");
        return None;
    }
    Some(Network {
        id: NetworkId::new(row.id),
        name: row.name,
        driver: row.driver,
        scope: row.scope,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatsRow {
    #[serde(rename = "CPUPerc")]
    cpu_perc: String,
    #[serde(rename = "MemPerc")]
    mem_perc: String,
    #[serde(rename = "MemUsage")]
    mem_usage: String,
    #[serde(rename = "NetIO")]
    net_io: String,
    #[serde(rename = "BlockIO")]
    block_io: String,
}

pub fn stats(row: &StatsRow) -> ContainerStats {
    let (memory_usage, memory_limit) = parse_size_pair(&row.mem_usage);
    let (network_rx, network_tx) = parse_size_pair(&row.net_io);
    let (block_read, block_write) = parse_size_pair(&row.block_io);
    ContainerStats {
        cpu_percent: parse_percent(&row.cpu_perc),
        memory_usage,
        memory_limit,
        memory_percent: parse_percent(&row.mem_perc),
        network_rx,
        network_tx,
        block_read,
        block_write,
    }
}

fn split_list(s: &str) -> impl Iterator<Item = &str> {
    s.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Parse the CLI's `k=v,k2=v2` label column.
pub fn parse_labels(s: &str) -> HashMap<String, String> {
    split_list(s)
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => (pair.to_string(), String::new()),
        })
        .collect()
}

/// Parse `2024-01-15 10:30:00 +0000 UTC` into unix seconds; 0 when unparseable.
pub fn parse_created(s: &str) -> i64 {
    let head: Vec<&str> = s.split_whitespace().take(3).collect();
    match DateTime::parse_from_str(&head.join(" "), "%Y-%m-%d %H:%M:%S %z") {
        Ok(dt) => dt.timestamp(),
        Err(_) => {
            if !s.is_empty() {
                tracing::debug!(created_at = s, "unparseable creation time");
            }
            0
        }
    }
}

/// Classify a failed CLI invocation when its cause is recognizable.
pub fn recognize_failure(binary: &str, output: &CommandOutput) -> Option<EngineError> {
    let stderr = output.stderr.trim();
    let lower = stderr.to_ascii_lowercase();

    let exec_failure = lower.contains("oci runtime") || lower.contains("executable file not found");
    let binary_missing = lower.contains("command not found")
        || lower.contains(&format!("{}: not found", binary.to_ascii_lowercase()));
    if (output.exit_code == 127 && !exec_failure) || binary_missing {
        return Some(EngineError::RemoteEngineMissing(format!(
            "`{binary}` is not installed in the bridged environment: {stderr}"
        )));
    }

    if lower.contains("no such container")
        || lower.contains("no such image")
        || lower.contains("no such volume")
        || lower.contains("no such network")
        || lower.contains("no such object")
    {
        return Some(EngineError::NotFound(stderr.to_string()));
    }

    if lower.contains("cannot connect to the docker daemon")
        || lower.contains("error during connect")
        || lower.contains("no distribution with the supplied name")
    {
        return Some(EngineError::EngineUnavailable(stderr.to_string()));
    }

    if lower.contains("not found") && !exec_failure {
        return Some(EngineError::NotFound(stderr.to_string()));
    }

    None
}

/// Classify a failed `exec`. Only engine-side failures are recognized; whatever
/// the command itself wrote stays output, whatever its exit status.
pub fn recognize_exec_failure(binary: &str, output: &CommandOutput) -> Option<EngineError> {
    let stderr = output.stderr.trim();
    let lower = stderr.to_ascii_lowercase();
    let binary = binary.to_ascii_lowercase();

    let binary_missing = lower.lines().any(|line| {
        let line = line.trim();
        line.ends_with(&format!("{binary}: command not found"))
            || line.ends_with(&format!("{binary}: not found"))
    });
    if binary_missing {
        return Some(EngineError::RemoteEngineMissing(format!(
            "`{binary}` is not installed in the bridged environment: {stderr}"
        )));
    }

    let from_daemon = lower.starts_with("error response from daemon:") || lower.starts_with("error:");
    if from_daemon && lower.contains("no such container") {
        return Some(EngineError::NotFound(stderr.to_string()));
    }
    if lower.contains("cannot connect to the docker daemon")
        || lower.contains("error during connect")
        || lower.contains("no distribution with the supplied name")
    {
        return Some(EngineError::EngineUnavailable(stderr.to_string()));
    }
    None
}

/// Classify an engine error line at the head of a log stream.
pub fn recognize_stream_failure(binary: &str, line: &str) -> Option<EngineError> {
    let line = line.trim();
    if !(line.starts_with("Error response from daemon:") || line.starts_with("Error: No such")) {
        return None;
    }
    let output = CommandOutput {
        exit_code: 1,
        stdout: Vec::new(),
        stderr: line.to_string(),
    };
    Some(classify_failure(binary, &output))
}

/// Classify a failed CLI invocation.
pub fn classify_failure(binary: &str, output: &CommandOutput) -> EngineError {
    recognize_failure(binary, output).unwrap_or_else(|| {
        let stderr = output.stderr.trim();
        if stderr.is_empty() {
            EngineError::Engine(format!("{binary} exited with status {}", output.exit_code))
        } else {
            EngineError::Engine(stderr.to_string())
        }
    })
}
