//! Admission Events
//!
//! Best-effort feed of completed admission decisions for offline
//! observers. Publishing never blocks and never fails the caller.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionEvent {
    pub identifier: String,
    pub allowed: bool,
    pub decided_at: DateTime<Utc>,
}

impl AdmissionEvent {
    pub fn new(identifier: impl Into<String>, allowed: bool, decided_at_s: i64) -> Self {
        Self {
            identifier: identifier.into(),
            allowed,
            decided_at: DateTime::from_timestamp(decided_at_s, 0).unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Clone)]
pub struct EventPublisher {
    sender: broadcast::Sender<AdmissionEvent>,
}

impl EventPublisher {
    pub fn new(buffer: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AdmissionEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: AdmissionEvent) {
        // Err only means nobody is listening
        if self.sender.send(event).is_err() {
            tracing::trace!("Admission event dropped, no subscribers");
        }
    }
}
