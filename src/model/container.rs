// ABOUTME: Canonical container record plus the inspect details used to enrich it.
// ABOUTME: Degraded records keep bulk fields and carry empty labels and networks.

use super::de::null_default;
use crate::types::ContainerId;
use nonempty::NonEmpty;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;

/// Container as returned by every adapter.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Container {
    pub id: ContainerId,
    /// Display names with a leading `/`; the first one is primary.
    #[serde(serialize_with = "serialize_names")]
    pub names: NonEmpty<String>,
    pub image: String,
    #[serde(rename = "ImageID")]
    pub image_id: String,
    pub command: String,
    /// Creation time in unix seconds.
    pub created: i64,
    pub state: ContainerState,
    pub status: String,
    pub ports: Vec<PortMapping>,
    pub labels: HashMap<String, String>,
    pub network_settings: NetworkSettings,
    pub mounts: Vec<Mount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_config: Option<HostConfig>,
}

impl Container {
    /// Primary name without the leading slash.
    pub fn name(&self) -> &str {
        self.names.head.trim_start_matches('/')
    }

    /// Merge secondary inspect details into a bulk-listed record.
    pub fn enrich(mut self, details: InspectDetails) -> Self {
        self.labels = details.config.labels;
        self.network_settings = details.network_settings;
        if !details.mounts.is_empty() {
            self.mounts = details.mounts;
        }
        if !details.image.is_empty() {
            self.image_id = details.image;
        }
        if details.host_config.is_some() {
            self.host_config = details.host_config;
        }
        self
    }

    /// Drop the fields that only enrichment can vouch for.
    pub fn degrade(mut self) -> Self {
        self.labels.clear();
        self.network_settings = NetworkSettings::default();
        self
    }

    /// Network names this container is attached to, including its network mode.
    pub fn attached_networks(&self) -> impl Iterator<Item = &str> {
        self.network_settings
            .networks
            .keys()
            .map(String::as_str)
            .chain(
                self.host_config
                    .as_ref()
                    .and_then(|h| h.network_mode.as_deref()),
            )
    }
}

/// Build a non-empty name list in the engine's `/name` convention.
///
/// Falls back to the short id when the engine reported no usable name.
pub fn container_names<I, S>(raw: I, id: &ContainerId) -> NonEmpty<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let names: Vec<String> = raw
        .into_iter()
        .map(|n| n.as_ref().trim().to_string())
        .filter(|n| !n.is_empty() && n != "/")
        .map(|n| {
            if n.starts_with('/') {
                n
            } else {
                format!("/{n}")
            }
        })
        .collect();

    NonEmpty::from_vec(names).unwrap_or_else(|| NonEmpty::new(format!("/{}", id.short())))
}

fn serialize_names<S: Serializer>(names: &NonEmpty<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(names.iter())
}

/// Lifecycle state reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerState {
    Created,
    Running,
    Paused,
    Restarting,
    Removing,
    Exited,
    Dead,
}

impl ContainerState {
    /// Parse an engine state string; unknown or transient states read as exited.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "created" | "configured" => Self::Created,
            "running" => Self::Running,
            "paused" => Self::Paused,
            "restarting" => Self::Restarting,
            "removing" => Self::Removing,
            "dead" => Self::Dead,
            "exited" | "stopped" | "stopping" => Self::Exited,
            other => {
                tracing::debug!(state = other, "unrecognized container state");
                Self::Exited
            }
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }
}

/// Published or exposed port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    #[serde(rename = "IP", default, skip_serializing_if = "Option::is_none")]
    pub host_ip: Option<String>,
    #[serde(rename = "PrivatePort")]
    pub container_port: u16,
    #[serde(rename = "PublicPort", default, skip_serializing_if = "Option::is_none")]
    pub host_port: Option<u16>,
    #[serde(rename = "Type", default)]
    pub protocol: Protocol,
}

/// Transport protocol of a port mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
    Sctp,
}

impl Protocol {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tcp" => Some(Self::Tcp),
            "udp" => Some(Self::Udp),
            "sctp" => Some(Self::Sctp),
            _ => None,
        }
    }
}

/// Network attachments keyed by network name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkSettings {
    #[serde(rename = "Networks", default, deserialize_with = "null_default")]
    pub networks: HashMap<String, EndpointSettings>,
}

impl NetworkSettings {
    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

/// Connection details of one network attachment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndpointSettings {
    #[serde(rename = "NetworkID", default, deserialize_with = "null_default")]
    pub network_id: String,
    #[serde(rename = "IPAddress", default, deserialize_with = "null_default")]
    pub ip_address: String,
    #[serde(rename = "Gateway", default, deserialize_with = "null_default")]
    pub gateway: String,
    #[serde(rename = "MacAddress", default, deserialize_with = "null_default")]
    pub mac_address: String,
    #[serde(rename = "Aliases", default, deserialize_with = "null_default")]
    pub aliases: Vec<String>,
}

/// Mount attached to a container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mount {
    #[serde(rename = "Type", default, deserialize_with = "null_default")]
    pub kind: String,
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Source", default, deserialize_with = "null_default")]
    pub source: String,
    #[serde(rename = "Destination", default, deserialize_with = "null_default")]
    pub destination: String,
    #[serde(rename = "RW", default = "read_write")]
    pub read_write: bool,
}

fn read_write() -> bool {
    true
}

impl Mount {
    /// Named volume mount, as used by usage classification.
    pub fn volume_name(&self) -> Option<&str> {
        (self.kind == "volume")
            .then_some(self.name.as_deref())
            .flatten()
            .filter(|n| !n.is_empty())
    }
}

/// Host-level settings that override network attachment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    #[serde(rename = "NetworkMode", default, skip_serializing_if = "Option::is_none")]
    pub network_mode: Option<String>,
}

/// Subset of an engine inspect document used for enrichment.
///
/// Both the structured API and the CLI's `inspect` emit this shape.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InspectDetails {
    #[serde(default, deserialize_with = "null_default")]
    pub image: String,
    #[serde(default, deserialize_with = "null_default")]
    pub config: InspectConfig,
    #[serde(default, deserialize_with = "null_default")]
    pub network_settings: NetworkSettings,
    #[serde(default, deserialize_with = "null_default")]
    pub mounts: Vec<Mount>,
    #[serde(default)]
    pub host_config: Option<HostConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InspectConfig {
    #[serde(default, deserialize_with = "null_default")]
    pub labels: HashMap<String, String>,
}
