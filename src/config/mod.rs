// ABOUTME: Configuration types and parsing for berth.yml.
// ABOUTME: Handles discovery, environment overrides, and conversion to SourceConfig.

mod deserialize;
mod init;

pub use init::init_config;

use crate::bridge::{DEFAULT_LAUNCHER, DEFAULT_MOUNT_PREFIX, DEFAULT_PROFILE};
use crate::error::{Error, Result};
use crate::runtime::traits::Timeouts;
use crate::runtime::{DEFAULT_ENGINE_BINARY, DEFAULT_ENRICHMENT_CONCURRENCY, SourceConfig};
use crate::types::Source;
use deserialize::deserialize_source;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "berth.yml";
pub const CONFIG_FILENAME_ALT: &str = "berth.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".berth/config.yml";

pub const ENV_SOURCE: &str = "BERTH_SOURCE";
pub const ENV_PROFILE: &str = "BERTH_BRIDGE_PROFILE";
pub const ENV_WSL_DISTRO: &str = "WSL_DISTRO";
pub const ENV_ENGINE: &str = "BERTH_ENGINE";
pub const ENV_DOCKER_HOST: &str = "DOCKER_HOST";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default, deserialize_with = "deserialize_source")]
    pub source: Source,

    #[serde(default)]
    pub bridge: BridgeSettings,

    #[serde(default)]
    pub engine: EngineSettings,

    #[serde(default)]
    pub timeouts: TimeoutSettings,

    #[serde(default = "default_concurrency")]
    pub enrichment_concurrency: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeSettings {
    #[serde(default = "default_launcher")]
    pub launcher: String,
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default = "default_mount_prefix")]
    pub mount_prefix: String,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            launcher: default_launcher(),
            profile: default_profile(),
            mount_prefix: default_mount_prefix(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSettings {
    #[serde(default = "default_binary")]
    pub binary: String,
    /// Local engine endpoint; detected when absent.
    #[serde(default)]
    pub socket: Option<String>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            socket: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeoutSettings {
    #[serde(default = "default_exec_timeout", with = "humantime_serde")]
    pub exec: Duration,
    #[serde(default = "default_info_timeout", with = "humantime_serde")]
    pub info: Duration,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            exec: default_exec_timeout(),
            info: default_info_timeout(),
        }
    }
}

fn default_launcher() -> String {
    DEFAULT_LAUNCHER.to_string()
}

fn default_profile() -> String {
    DEFAULT_PROFILE.to_string()
}

fn default_mount_prefix() -> String {
    DEFAULT_MOUNT_PREFIX.to_string()
}

fn default_binary() -> String {
    DEFAULT_ENGINE_BINARY.to_string()
}

fn default_exec_timeout() -> Duration {
    Timeouts::default().exec
}

fn default_info_timeout() -> Duration {
    Timeouts::default().info
}

fn default_concurrency() -> usize {
    DEFAULT_ENRICHMENT_CONCURRENCY
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: Source::Local,
            bridge: BridgeSettings::default(),
            engine: EngineSettings::default(),
            timeouts: TimeoutSettings::default(),
            enrichment_concurrency: default_concurrency(),
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!(path = %path.display(), "loading configuration");
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Discovered config, or defaults when the directory has none.
    pub fn discover_or_default(dir: &Path) -> Result<Self> {
        match Self::discover(dir) {
            Err(Error::ConfigNotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.enrichment_concurrency == 0 {
            return Err(Error::InvalidConfig(
                "enrichment_concurrency must be at least 1".to_string(),
            ));
        }
        if self.engine.binary.trim().is_empty() {
            return Err(Error::InvalidConfig("engine.binary cannot be empty".to_string()));
        }
        if self.timeouts.exec.is_zero() || self.timeouts.info.is_zero() {
            return Err(Error::InvalidConfig("timeouts must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Apply environment overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from a variable lookup. Empty values are ignored.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(source) = get(ENV_SOURCE) {
            self.source = source
                .parse()
                .map_err(|e: crate::types::ParseSourceError| Error::InvalidConfig(e.to_string()))?;
        }
        // The explicit variable wins over the distribution name WSL exports.
        if let Some(profile) = get(ENV_PROFILE).or_else(|| get(ENV_WSL_DISTRO)) {
            self.bridge.profile = profile;
        }
        if let Some(binary) = get(ENV_ENGINE) {
            self.engine.binary = binary;
        }
        if let Some(host) = get(ENV_DOCKER_HOST) {
            self.engine.socket = Some(host);
        }
        Ok(self)
    }

    /// Resolved adapter selection settings.
    pub fn to_source_config(&self) -> SourceConfig {
        SourceConfig {
            source: self.source.clone(),
            engine_binary: self.engine.binary.clone(),
            socket: self.engine.socket.clone(),
            launcher: self.bridge.launcher.clone(),
            default_profile: self.bridge.profile.clone(),
            mount_prefix: self.bridge.mount_prefix.clone(),
            timeouts: Timeouts {
                exec: self.timeouts.exec,
                info: self.timeouts.info,
            },
            enrichment_concurrency: self.enrichment_concurrency,
        }
    }
}
