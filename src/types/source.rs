// ABOUTME: Source selector naming which engine access path serves a request.
// ABOUTME: Parses the `local`, `bridged`, and legacy `wsl2` tags.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which engine access path a request is served by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum Source {
    /// Engine socket reachable from this process.
    #[default]
    Local,
    /// Engine reached through a shell bridge, optionally under a named profile.
    Bridged { profile: Option<String> },
}

impl Source {
    /// Bridged source using the configured default profile.
    pub fn bridged() -> Self {
        Source::Bridged { profile: None }
    }

    /// Bridged source pinned to a profile.
    pub fn bridged_profile(profile: impl Into<String>) -> Self {
        Source::Bridged {
            profile: Some(profile.into()),
        }
    }

    /// Tag string as accepted by [`Source::from_str`].
    pub fn tag(&self) -> &'static str {
        match self {
            Source::Local => "local",
            Source::Bridged { .. } => "bridged",
        }
    }

    /// Profile named by a bridged source.
    pub fn profile(&self) -> Option<&str> {
        match self {
            Source::Bridged { profile } => profile.as_deref(),
            Source::Local => None,
        }
    }

    pub fn is_bridged(&self) -> bool {
        matches!(self, Source::Bridged { .. })
    }

    /// Attach a profile unless the tag already names one; a no-op for local sources.
    pub fn with_profile(self, profile: Option<String>) -> Self {
        match (self, profile) {
            (Source::Bridged { profile: current }, new) => Source::Bridged {
                profile: current.or(new),
            },
            (source, _) => source,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Local => write!(f, "local"),
            Source::Bridged { profile: Some(p) } => write!(f, "bridged:{p}"),
            Source::Bridged { profile: None } => write!(f, "bridged"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown source `{0}` (expected `local` or `bridged`)")]
pub struct ParseSourceError(pub String);

impl FromStr for Source {
    type Err = ParseSourceError;

    /// Accepts `local`, `bridged`, `wsl2`, and `bridged:<profile>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (tag, profile) = match trimmed.split_once(':') {
            Some((tag, profile)) if !profile.is_empty() => (tag, Some(profile.to_string())),
            _ => (trimmed, None),
        };

        match tag.to_ascii_lowercase().as_str() {
            "local" if profile.is_none() => Ok(Source::Local),
            "bridged" | "wsl2" | "wsl" => Ok(Source::Bridged { profile }),
            _ => Err(ParseSourceError(s.to_string())),
        }
    }
}
