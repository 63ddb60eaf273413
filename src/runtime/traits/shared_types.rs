// ABOUTME: Shared types used across engine trait definitions.
// ABOUTME: ContainerFilters, LogOptions, ExecOutput, Timeouts.

use crate::types::ContainerId;
use serde::Serialize;
use std::time::Duration;

/// Filters for listing containers.
#[derive(Debug, Clone, Default)]
pub struct ContainerFilters {
    /// Include stopped containers.
    pub all: bool,
    /// Restrict to one container id (prefix match by the engine).
    pub id: Option<ContainerId>,
    /// Restrict to containers whose name matches (substring match by the engine).
    pub name: Option<String>,
}

impl ContainerFilters {
    pub fn all() -> Self {
        Self {
            all: true,
            ..Self::default()
        }
    }

    pub fn by_id(id: &ContainerId) -> Self {
        Self {
            all: true,
            id: Some(id.clone()),
            name: None,
        }
    }

    pub fn by_name(name: &str) -> Self {
        Self {
            all: true,
            id: None,
            name: Some(name.to_string()),
        }
    }
}

/// Default number of log lines returned.
pub const DEFAULT_LOG_TAIL: u64 = 100;

/// Options for fetching or streaming logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogOptions {
    /// Number of lines from the end (`None` = all).
    pub tail: Option<u64>,
    /// Prefix lines with engine timestamps.
    pub timestamps: bool,
    /// Keep the stream open for new output.
    pub follow: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            tail: Some(DEFAULT_LOG_TAIL),
            timestamps: true,
            follow: false,
        }
    }
}

impl LogOptions {
    /// Create options for tailing the last N lines.
    pub fn tail(n: u64) -> Self {
        Self {
            tail: Some(n),
            ..Self::default()
        }
    }

    /// Create options for following new output after the last N lines.
    pub fn follow(tail: Option<u64>) -> Self {
        Self {
            tail,
            timestamps: true,
            follow: true,
        }
    }

    /// The engine's string form of the tail count.
    pub fn tail_arg(&self) -> String {
        self.tail
            .map(|n| n.to_string())
            .unwrap_or_else(|| "all".to_string())
    }
}

/// Result of running a command in a container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExecOutput {
    /// Combined output with stream framing removed.
    pub output: String,
    /// Exit code, when the engine reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i64>,
}

/// Time budgets for adapter calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Commands that do work: mutations, exec, logs, downloads.
    pub exec: Duration,
    /// Informational queries: listings, inspect, stats, info.
    pub info: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            exec: Duration::from_secs(30),
            info: Duration::from_secs(10),
        }
    }
}
