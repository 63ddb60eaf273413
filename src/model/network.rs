// ABOUTME: Canonical network record.
// ABOUTME: Also names the engine's built-in networks.

use crate::types::NetworkId;
use serde::Serialize;

/// Networks the engine creates itself; never removable.
pub const SYSTEM_NETWORKS: [&str; 3] = ["bridge", "host", "none"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Network {
    pub id: NetworkId,
    pub name: String,
    pub driver: String,
    pub scope: String,
}

impl Network {
    pub fn is_system(&self) -> bool {
        SYSTEM_NETWORKS.contains(&self.name.as_str())
    }
}
