// ABOUTME: Application-wide error types for berth.
// ABOUTME: Covers configuration loading and wraps engine and connection failures.

use crate::runtime::{ConnectError, EngineError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Connect(#[from] ConnectError),
}

pub type Result<T> = std::result::Result<T, Error>;
