// ABOUTME: Engine detection for local sockets and bridged environments.
// ABOUTME: Finds a local engine socket or probes the bridge for the engine binary.

use crate::bridge::{self, Bridge};
#[cfg(not(windows))]
use std::path::Path;
use std::time::Duration;

/// Error during engine detection.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("no container engine found (checked Docker and Podman sockets)")]
    NoEngineFound,

    #[error("bridge launcher not available: {0}")]
    LauncherMissing(String),

    #[error("`{binary}` not found in bridged profile {profile}")]
    RemoteEngineMissing { binary: String, profile: String },

    #[error("bridge error: {0}")]
    Bridge(#[from] bridge::Error),
}

#[cfg(not(windows))]
const DOCKER_SOCKET: &str = "/var/run/docker.sock";
#[cfg(not(windows))]
const ROOTFUL_PODMAN: &str = "/run/podman/podman.sock";
#[cfg(windows)]
const DOCKER_PIPE: &str = "npipe:////./pipe/docker_engine";

/// Detect the local engine endpoint.
///
/// An explicit host (from config or `DOCKER_HOST`) wins. Otherwise:
/// 1. Docker socket (`/var/run/docker.sock`)
/// 2. Rootless Docker socket (`/run/user/$UID/docker.sock`)
/// 3. Rootful Podman socket (`/run/podman/podman.sock`)
/// 4. Rootless Podman socket (`/run/user/$UID/podman/podman.sock`)
pub fn detect_local(explicit: Option<&str>) -> Result<String, DetectionError> {
    if let Some(host) = explicit.filter(|h| !h.trim().is_empty()) {
        return Ok(host.trim().to_string());
    }

    default_endpoints()
        .into_iter()
        .find(|endpoint| endpoint_exists(endpoint))
        .ok_or(DetectionError::NoEngineFound)
}

#[cfg(windows)]
fn default_endpoints() -> Vec<String> {
    vec![DOCKER_PIPE.to_string()]
}

#[cfg(windows)]
fn endpoint_exists(_endpoint: &str) -> bool {
    true
}

#[cfg(not(windows))]
fn default_endpoints() -> Vec<String> {
    let uid = get_uid();
    let mut candidates = vec![DOCKER_SOCKET.to_string()];
    if let Some(uid) = &uid {
        candidates.push(format!("/run/user/{uid}/docker.sock"));
    }
    candidates.push(ROOTFUL_PODMAN.to_string());
    if let Some(uid) = &uid {
        candidates.push(format!("/run/user/{uid}/podman/podman.sock"));
    }
    candidates
}

#[cfg(not(windows))]
fn endpoint_exists(endpoint: &str) -> bool {
    Path::new(endpoint).exists()
}

#[cfg(not(windows))]
fn get_uid() -> Option<String> {
    std::env::var("UID").ok().or_else(|| {
        std::fs::read_to_string("/proc/self/status")
            .ok()
            .and_then(|s| {
                s.lines()
                    .find(|l| l.starts_with("Uid:"))
                    .and_then(|l| l.split_whitespace().nth(1))
                    .map(|s| s.to_string())
            })
    })
}

/// Check that the engine CLI exists inside the bridged environment.
pub async fn probe_bridged(bridge: &Bridge, binary: &str, timeout: Duration) -> Result<(), DetectionError> {
    let output = match bridge.exec(binary, &["--version".to_string()], timeout).await {
        Ok(output) => output,
        Err(e) if e.is_missing_program() => return Err(DetectionError::LauncherMissing(e.to_string())),
        Err(e) => return Err(e.into()),
    };

    if output.success() {
        tracing::debug!(version = %output.stdout_text().trim(), "bridged engine found");
        return Ok(());
    }

    if output.exit_code == 127 || output.stderr.contains("not found") {
        return Err(DetectionError::RemoteEngineMissing {
            binary: binary.to_string(),
            profile: bridge.config().profile.clone(),
        });
    }

    tracing::warn!(
        exit_code = output.exit_code,
        stderr = %output.stderr.trim(),
        "engine version probe failed; continuing"
    );
    Ok(())
}
