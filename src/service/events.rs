// ABOUTME: Event sink interface notified after each control-plane mutation.
// ABOUTME: Ships no-op, tracing and broadcast-channel sinks.

use serde::Serialize;
use tokio::sync::broadcast;

pub const CONTAINER_STATE_CHANGED: &str = "containerStateChanged";
pub const CONTAINER_REMOVED: &str = "containerRemoved";
pub const IMAGE_REMOVED: &str = "imageRemoved";
pub const VOLUME_REMOVED: &str = "volumeRemoved";
pub const NETWORK_REMOVED: &str = "networkRemoved";

/// Lifecycle action reported with `containerStateChanged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerAction {
    Start,
    Stop,
    Restart,
}

impl ContainerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerAction::Start => "start",
            ContainerAction::Stop => "stop",
            ContainerAction::Restart => "restart",
        }
    }
}

/// Event body; only the fields relevant to the event are set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl EventPayload {
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn action(id: impl Into<String>, action: ContainerAction) -> Self {
        Self {
            id: Some(id.into()),
            action: Some(action.as_str().to_string()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("event sink failed: {0}")]
pub struct SinkError(pub String);

/// Receives mutation notifications. Failures never fail the mutation.
pub trait EventSink: Send + Sync {
    fn notify(&self, event: &str, payload: &EventPayload) -> Result<(), SinkError>;
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn notify(&self, _event: &str, _payload: &EventPayload) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Writes events to the tracing subscriber.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn notify(&self, event: &str, payload: &EventPayload) -> Result<(), SinkError> {
        tracing::info!(
            event,
            id = payload.id.as_deref(),
            name = payload.name.as_deref(),
            action = payload.action.as_deref(),
            "engine event"
        );
        Ok(())
    }
}

/// An event as delivered to broadcast subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub event: String,
    pub payload: EventPayload,
}

/// Fans events out over a tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<Event>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

impl EventSink for BroadcastSink {
    fn notify(&self, event: &str, payload: &EventPayload) -> Result<(), SinkError> {
        if self.tx.receiver_count() == 0 {
            return Ok(());
        }
        self.tx
            .send(Event {
                event: event.to_string(),
                payload: payload.clone(),
            })
            .map(|_| ())
            .map_err(|e| SinkError(e.to_string()))
    }
}
