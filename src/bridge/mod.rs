// ABOUTME: Shell bridge used to reach an engine CLI in another environment.
// ABOUTME: Wraps commands for a launcher such as `wsl.exe -d <profile> --`.

mod client;
mod error;
pub mod path;
mod profiles;

pub use client::{
    Bridge, BridgeConfig, CommandOutput, CommandRunner, DEFAULT_LAUNCHER, DEFAULT_MOUNT_PREFIX,
    DEFAULT_PROFILE, Invocation, LineStream, ProcessRunner,
};
pub use error::{Error, Result};
pub use path::to_bridge_path;
pub use profiles::decode_profile_list;
