// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates a commented berth.yml template.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::Source;

use super::{CONFIG_FILENAME, Config};

pub fn init_config(dir: &Path, source: Option<&str>, profile: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let mut config = Config::default();

    if let Some(s) = source {
        config.source = s
            .parse::<Source>()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
    }

    if let Some(p) = profile {
        config.bridge.profile = p.to_string();
    }

    std::fs::write(&config_path, generate_template_yaml(&config))?;

    Ok(())
}

fn generate_template_yaml(config: &Config) -> String {
    format!(
        r#"source: {}
bridge:
  launcher: {}
  profile: {}
  mount_prefix: {}
engine:
  binary: {}
  # socket: unix:///var/run/docker.sock
timeouts:
  exec: {}s
  info: {}s
enrichment_concurrency: {}
"#,
        config.source,
        config.bridge.launcher,
        config.bridge.profile,
        config.bridge.mount_prefix,
        config.engine.binary,
        config.timeouts.exec.as_secs(),
        config.timeouts.info.as_secs(),
        config.enrichment_concurrency,
    )
}
