// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Parses source tags through the same rules as the CLI.

use crate::types::Source;
use serde::Deserialize;

pub fn deserialize_source<'de, D>(deserializer: D) -> Result<Source, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}
