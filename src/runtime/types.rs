// ABOUTME: Resolved adapter selection settings.
// ABOUTME: Built from configuration and consumed by connect().

use super::traits::Timeouts;
use crate::bridge::{BridgeConfig, DEFAULT_LAUNCHER, DEFAULT_MOUNT_PREFIX, DEFAULT_PROFILE};
use crate::types::Source;

/// Default number of containers enriched concurrently.
pub const DEFAULT_ENRICHMENT_CONCURRENCY: usize = 8;

/// Default engine CLI binary.
pub const DEFAULT_ENGINE_BINARY: &str = "docker";

/// Everything needed to select and connect an engine adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Which adapter to use.
    pub source: Source,
    /// Engine CLI binary used by the bridged adapter and raw commands.
    pub engine_binary: String,
    /// Explicit local engine endpoint (socket path or URL).
    pub socket: Option<String>,
    /// Program that enters the bridged environment.
    pub launcher: String,
    /// Profile used when the source does not name one.
    pub default_profile: String,
    /// Where host drives are mounted inside the bridged environment.
    pub mount_prefix: String,
    pub timeouts: Timeouts,
    /// Upper bound on concurrent per-container inspect calls.
    pub enrichment_concurrency: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            source: Source::Local,
            engine_binary: DEFAULT_ENGINE_BINARY.to_string(),
            socket: None,
            launcher: DEFAULT_LAUNCHER.to_string(),
            default_profile: DEFAULT_PROFILE.to_string(),
            mount_prefix: DEFAULT_MOUNT_PREFIX.to_string(),
            timeouts: Timeouts::default(),
            enrichment_concurrency: DEFAULT_ENRICHMENT_CONCURRENCY,
        }
    }
}

impl SourceConfig {
    pub fn with_source(mut self, source: Source) -> Self {
        self.source = source;
        self
    }

    /// Profile the bridged adapter will use.
    pub fn profile(&self) -> &str {
        self.source.profile().unwrap_or(&self.default_profile)
    }

    /// Bridge settings for the selected source.
    pub fn bridge_config(&self) -> BridgeConfig {
        if self.source.is_bridged() {
            BridgeConfig::wsl(self.profile())
                .launcher(self.launcher.clone())
                .mount_prefix(self.mount_prefix.clone())
        } else {
            BridgeConfig::direct().mount_prefix(self.mount_prefix.clone())
        }
    }

    /// Concurrency bound, never zero.
    pub fn concurrency(&self) -> usize {
        self.enrichment_concurrency.max(1)
    }
}
