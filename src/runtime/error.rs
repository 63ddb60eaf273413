// ABOUTME: Engine error types: a classified operation error plus a SNAFU connection error.
// ABOUTME: Both expose kind() for programmatic handling by callers.

use snafu::Snafu;
use std::time::Duration;

use super::detection::DetectionError;
use crate::bridge;

/// Stable classification of engine failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The referenced container, image, volume or network does not exist.
    NotFound,
    /// The engine daemon or its socket could not be reached.
    EngineUnavailable,
    /// The bridged environment has no engine binary installed.
    RemoteEngineMissing,
    /// The operation exceeded its time budget.
    Timeout,
    /// Engine output could not be decoded into anything usable.
    DecodeError,
    /// The request was rejected before reaching the engine.
    ValidationError,
    /// The engine rejected an otherwise valid request.
    Engine,
}

/// Error from an engine operation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("engine binary missing in bridged environment: {0}")]
    RemoteEngineMissing(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("failed to decode engine output: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("engine error: {0}")]
    Engine(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::NotFound(_) => ErrorKind::NotFound,
            EngineError::EngineUnavailable(_) => ErrorKind::EngineUnavailable,
            EngineError::RemoteEngineMissing(_) => ErrorKind::RemoteEngineMissing,
            EngineError::Timeout(_) => ErrorKind::Timeout,
            EngineError::Decode(_) => ErrorKind::DecodeError,
            EngineError::Validation(_) => ErrorKind::ValidationError,
            EngineError::Engine(_) => ErrorKind::Engine,
        }
    }

    /// The diagnostic text carried by the error.
    pub fn detail(&self) -> &str {
        match self {
            EngineError::NotFound(d)
            | EngineError::EngineUnavailable(d)
            | EngineError::RemoteEngineMissing(d)
            | EngineError::Timeout(d)
            | EngineError::Decode(d)
            | EngineError::Validation(d)
            | EngineError::Engine(d) => d,
        }
    }

    pub(crate) fn timeout(what: impl std::fmt::Display, after: Duration) -> Self {
        EngineError::Timeout(format!("{what} after {after:?}"))
    }
}

impl From<bridge::Error> for EngineError {
    fn from(e: bridge::Error) -> Self {
        match e {
            bridge::Error::CommandTimeout(after) => EngineError::timeout("command", after),
            e => EngineError::EngineUnavailable(e.to_string()),
        }
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Error while selecting or connecting an engine adapter.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConnectError {
    #[snafu(display("engine detection failed: {source}"))]
    Detection { source: DetectionError },

    #[snafu(display("engine connection failed: {source}"))]
    Connection { source: EngineError },
}

/// Error kind for programmatic handling of connection failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectErrorKind {
    /// No local engine socket was found.
    NoEngineFound,
    /// The bridge launcher could not be started.
    LauncherMissing,
    /// The bridged environment has no engine binary.
    RemoteEngineMissing,
    /// Probing the bridged environment failed.
    BridgeFailed,
    /// The client could not be built or reach the engine.
    ConnectionFailed,
}

impl ConnectError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ConnectErrorKind {
        match self {
            ConnectError::Detection { source } => match source {
                DetectionError::NoEngineFound => ConnectErrorKind::NoEngineFound,
                DetectionError::LauncherMissing(_) => ConnectErrorKind::LauncherMissing,
                DetectionError::RemoteEngineMissing { .. } => ConnectErrorKind::RemoteEngineMissing,
                DetectionError::Bridge(_) => ConnectErrorKind::BridgeFailed,
            },
            ConnectError::Connection { .. } => ConnectErrorKind::ConnectionFailed,
        }
    }

    /// Classification in terms of the engine error kinds.
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            ConnectError::Detection { source } => match source {
                DetectionError::RemoteEngineMissing { .. } => ErrorKind::RemoteEngineMissing,
                DetectionError::Bridge(bridge::Error::CommandTimeout(_)) => ErrorKind::Timeout,
                _ => ErrorKind::EngineUnavailable,
            },
            ConnectError::Connection { source } => source.kind(),
        }
    }
}

impl From<DetectionError> for ConnectError {
    fn from(source: DetectionError) -> Self {
        ConnectError::Detection { source }
    }
}

impl From<EngineError> for ConnectError {
    fn from(source: EngineError) -> Self {
        ConnectError::Connection { source }
    }
}
