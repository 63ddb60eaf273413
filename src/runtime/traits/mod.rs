// ABOUTME: Composable capability traits for container engines.
// ABOUTME: Defines ContainerOps, ImageOps, VolumeOps, NetworkOps, ExecOps, LogOps, FileOps, StatsOps, RuntimeInfo.

mod container;
mod exec;
mod files;
mod image;
mod logs;
mod network;
mod runtime_info;
mod shared_types;
mod stats;
mod volume;

pub use container::ContainerOps;
pub use exec::ExecOps;
pub use files::FileOps;
pub use image::ImageOps;
pub use logs::{LogOps, LogStream};
pub use network::NetworkOps;
pub use runtime_info::RuntimeInfo;
pub use shared_types::*;
pub use stats::StatsOps;
pub use volume::VolumeOps;

/// Every capability an adapter must provide to back the control plane.
pub trait Engine:
    ContainerOps
    + ImageOps
    + VolumeOps
    + NetworkOps
    + ExecOps
    + LogOps
    + FileOps
    + StatsOps
    + RuntimeInfo
{
}

impl<T> Engine for T where
    T: ContainerOps
        + ImageOps
        + VolumeOps
        + NetworkOps
        + ExecOps
        + LogOps
        + FileOps
        + StatsOps
        + RuntimeInfo
{
}
