// ABOUTME: Canonical resource model shared by every engine adapter.
// ABOUTME: Field casing matches the engine API so consumers need no translation.

mod container;
pub(crate) mod de;
mod file;
mod image;
mod network;
mod stats;
mod usage;
mod volume;

pub use container::{
    Container, ContainerState, EndpointSettings, HostConfig, InspectConfig, InspectDetails, Mount,
    NetworkSettings, PortMapping, Protocol, container_names,
};
pub use file::{FileEntry, FileKind};
pub use image::{Image, normalize_repo_tags};
pub use network::{Network, SYSTEM_NETWORKS};
pub use stats::ContainerStats;
pub use usage::{Classified, ContainerRef, Usage};
pub use volume::Volume;
