// ABOUTME: Maps structured engine API payloads onto the canonical model.
// ABOUTME: Also computes container stats from raw counter samples.

use crate::model::de::null_default;
use crate::model::{
    Container, ContainerState, ContainerStats, HostConfig, Image, Mount, Network, NetworkSettings,
    PortMapping, Protocol, Volume, container_names, normalize_repo_tags,
};
use crate::types::{ContainerId, ImageId, NetworkId};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

/// Deserialize an API payload, logging and dropping it on failure.
pub fn from_api<T: DeserializeOwned>(kind: &str, value: serde_json::Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(kind, error = %e, "dropping undecodable record");
            None
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiContainer {
    #[serde(default, deserialize_with = "null_default")]
    id: String,
    #[serde(default, deserialize_with = "null_default")]
    names: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    image: String,
    #[serde(rename = "ImageID", default, deserialize_with = "null_default")]
    image_id: String,
    #[serde(default, deserialize_with = "null_default")]
    command: String,
    #[serde(default, deserialize_with = "null_default")]
    created: i64,
    #[serde(default, deserialize_with = "null_default")]
    state: String,
    #[serde(default, deserialize_with = "null_default")]
    status: String,
    #[serde(default, deserialize_with = "null_default")]
    ports: Vec<ApiPort>,
    #[serde(default, deserialize_with = "null_default")]
    labels: HashMap<String, String>,
    #[serde(default, deserialize_with = "null_default")]
    network_settings: NetworkSettings,
    #[serde(default, deserialize_with = "null_default")]
    mounts: Vec<Mount>,
    #[serde(default)]
    host_config: Option<HostConfig>,
}

#[derive(Debug, Deserialize)]
struct ApiPort {
    #[serde(rename = "IP", default)]
    ip: Option<String>,
    #[serde(rename = "PrivatePort", default)]
    private_port: u16,
    #[serde(rename = "PublicPort", default)]
    public_port: Option<u16>,
    #[serde(rename = "Type", default)]
    kind: Option<String>,
}

/// Map a container summary. Records without an id are dropped.
pub fn container(raw: ApiContainer) -> Option<Container> {
    if raw.id.is_empty() {
        tracing::warn!(names = ?raw.names, "dropping container without id");
        return None;
    }
    let id = ContainerId::new(raw.id);
    let ports = raw
        .ports
        .into_iter()
        .filter_map(|p| {
            let protocol = match p.kind.as_deref() {
                None | Some("") => Protocol::Tcp,
                Some(other) => Protocol::parse(other)?,
            };
            Some(PortMapping {
                host_ip: p.ip.filter(|ip| !ip.is_empty()),
                container_port: p.private_port,
                host_port: p.public_port,
                protocol,
            })
        })
        .collect();

    Some(Container {
        names: container_names(&raw.names, &id),
        id,
        image: raw.image,
        image_id: raw.image_id,
        command: raw.command,
        created: raw.created,
        state: ContainerState::parse(&raw.state),
        status: raw.status,
        ports,
        labels: raw.labels,
        network_settings: raw.network_settings,
        mounts: raw.mounts,
        host_config: raw.host_config,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiImage {
    #[serde(default, deserialize_with = "null_default")]
    id: String,
    #[serde(default, deserialize_with = "null_default")]
    repo_tags: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    created: i64,
    #[serde(default, deserialize_with = "null_default")]
    size: i64,
}

pub fn image(raw: ApiImage) -> Image {
    Image {
        id: ImageId::new(raw.id),
        repo_tags: normalize_repo_tags(raw.repo_tags),
        created: raw.created,
        size: u64::try_from(raw.size).unwrap_or(0),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiVolume {
    name: String,
    #[serde(default, deserialize_with = "null_default")]
    driver: String,
    #[serde(default, deserialize_with = "null_default")]
    mountpoint: String,
    #[serde(default, deserialize_with = "null_default")]
    labels: HashMap<String, String>,
    #[serde(default, deserialize_with = "null_default")]
    scope: String,
}

pub fn volume(raw: ApiVolume) -> Volume {
    Volume {
        name: raw.name,
        driver: raw.driver,
        mountpoint: raw.mountpoint,
        labels: raw.labels,
        scope: raw.scope,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiNetwork {
    #[serde(default, deserialize_with = "null_default")]
    id: String,
    name: String,
    #[serde(default, deserialize_with = "null_default")]
    driver: String,
    #[serde(default, deserialize_with = "null_default")]
    scope: String,
}

pub fn network(raw: ApiNetwork) -> Network {
    Network {
        id: NetworkId::new(raw.id),
        name: raw.name,
        driver: raw.driver,
        scope: raw.scope,
    }
}

/// Raw counters from one stats sample.
#[derive(Debug, Default, Deserialize)]
pub struct StatsSample {
    #[serde(default, deserialize_with = "null_default")]
    pub cpu_stats: CpuStats,
    #[serde(default, deserialize_with = "null_default")]
    pub precpu_stats: CpuStats,
    #[serde(default, deserialize_with = "null_default")]
    pub memory_stats: MemoryStats,
    #[serde(default, deserialize_with = "null_default")]
    pub networks: HashMap<String, NetworkCounters>,
    #[serde(default, deserialize_with = "null_default")]
    pub blkio_stats: BlkioStats,
}

#[derive(Debug, Default, Deserialize)]
pub struct CpuStats {
    #[serde(default, deserialize_with = "null_default")]
    pub cpu_usage: CpuUsage,
    #[serde(default, deserialize_with = "null_default")]
    pub system_cpu_usage: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub online_cpus: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct CpuUsage {
    #[serde(default, deserialize_with = "null_default")]
    pub total_usage: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub percpu_usage: Vec<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MemoryStats {
    #[serde(default, deserialize_with = "null_default")]
    pub usage: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub limit: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct NetworkCounters {
    #[serde(default, deserialize_with = "null_default")]
    pub rx_bytes: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub tx_bytes: u64,
}

#[derive(Debug, Default, Deserialize)]
pub struct BlkioStats {
    #[serde(default, deserialize_with = "null_default")]
    pub io_service_bytes_recursive: Vec<BlkioEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BlkioEntry {
    #[serde(default, deserialize_with = "null_default")]
    pub op: String,
    #[serde(default, deserialize_with = "null_default")]
    pub value: u64,
}

/// Compute usage percentages and totals from a sample.
pub fn stats(sample: &StatsSample) -> ContainerStats {
    let cpu = &sample.cpu_stats;
    let pre = &sample.precpu_stats;
    let cpu_delta = cpu.cpu_usage.total_usage.saturating_sub(pre.cpu_usage.total_usage);
    let system_delta = cpu.system_cpu_usage.saturating_sub(pre.system_cpu_usage);
    let online_cpus = match cpu.online_cpus {
        0 => cpu.cpu_usage.percpu_usage.len().max(1) as f64,
        n => n as f64,
    };

    let cpu_percent = if system_delta > 0 && cpu_delta > 0 {
        (cpu_delta as f64 / system_delta as f64) * online_cpus * 100.0
    } else {
        0.0
    };

    let memory = &sample.memory_stats;
    let memory_percent = if memory.limit > 0 {
        memory.usage as f64 / memory.limit as f64 * 100.0
    } else {
        0.0
    };

    let (network_rx, network_tx) = sample
        .networks
        .values()
        .fold((0u64, 0u64), |(rx, tx), n| (rx.saturating_add(n.rx_bytes), tx.saturating_add(n.tx_bytes)));

    let (block_read, block_write) = sample.blkio_stats.io_service_bytes_recursive.iter().fold(
        (0u64, 0u64),
        |(read, write), entry| match entry.op.to_ascii_lowercase().as_str() {
            "read" => (read.saturating_add(entry.value), write),
            "write" => (read, write.saturating_add(entry.value)),
            _ => (read, write),
        },
    );

    ContainerStats {
        cpu_percent,
        memory_usage: memory.usage,
        memory_limit: memory.limit,
        memory_percent,
        network_rx,
        network_tx,
        block_read,
        block_write,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn container_summary_maps() {
        let raw: ApiContainer = serde_json::from_value(json!({
            "Id": "abc123def4567890",
            "Names": ["/web"],
            "Image": "nginx",
            "ImageID": "sha256:feed",
            "Command": "nginx -g 'daemon off;'",
            "Created": 1700000000,
            "State": "running",
            "Status": "Up 2 hours",
            "Ports": [{"IP": "0.0.0.0", "PrivatePort": 80, "PublicPort": 8080, "Type": "tcp"},
                      {"PrivatePort": 443, "Type": "tcp"}],
            "Labels": null,
            "NetworkSettings": {"Networks": {"bridge": {"NetworkID": "n1", "IPAddress": "172.17.0.2"}}},
            "Mounts": [{"Type": "volume", "Name": "data", "Source": "/var/lib", "Destination": "/data", "RW": true}],
            "HostConfig": {"NetworkMode": "bridge"}
        }))
        .unwrap();

        let c = container(raw).unwrap();
        assert_eq!(c.name(), "web");
        assert_eq!(c.state, ContainerState::Running);
        assert_eq!(c.ports.len(), 2);
        assert_eq!(c.ports[1].host_port, None);
        assert!(c.labels.is_empty());
        assert_eq!(c.network_settings.networks["bridge"].ip_address, "172.17.0.2");
        assert_eq!(c.mounts[0].volume_name(), Some("data"));
    }

    #[test]
    fn stats_compute_from_deltas() {
        let sample: StatsSample = serde_json::from_value(json!({
            "cpu_stats": {"cpu_usage": {"total_usage": 400, "percpu_usage": [1, 2]}, "system_cpu_usage": 2000},
            "precpu_stats": {"cpu_usage": {"total_usage": 200}, "system_cpu_usage": 1000},
            "memory_stats": {"usage": 50, "limit": 200},
            "networks": {"eth0": {"rx_bytes": 10, "tx_bytes": 20}, "eth1": {"rx_bytes": 1, "tx_bytes": 2}},
            "blkio_stats": {"io_service_bytes_recursive": [
                {"op": "Read", "value": 100}, {"op": "write", "value": 7}, {"op": "Total", "value": 107}
            ]}
        }))
        .unwrap();

        let s = stats(&sample);
        assert!((s.cpu_percent - 40.0).abs() < 1e-9);
        assert!((s.memory_percent - 25.0).abs() < 1e-9);
        assert_eq!((s.network_rx, s.network_tx), (11, 22));
        assert_eq!((s.block_read, s.block_write), (100, 7));
    }

    #[test]
    fn stats_without_deltas_are_zero() {
        let s = stats(&StatsSample::default());
        assert_eq!(s.cpu_percent, 0.0);
        assert_eq!(s.memory_percent, 0.0);
    }
}
