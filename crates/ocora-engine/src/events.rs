//! Session events.
//!
//! Every observable state change is announced on a broadcast bus so the UI
//! layer can react without polling, and can optionally be appended to a
//! JSONL session log for demo replay and debugging.

use ocora_core::Result;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;

/// All events emitted by the orchestration layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    /// A scan file was handed to the gateway
    UploadStarted { file_name: String },

    /// A new patient record replaced the previous one
    UploadCompleted {
        patient_id: String,
        feature_count: usize,
    },

    /// Extraction failed and strict mode propagated it
    UploadFailed { message: String },

    /// The treatment candidate set was replaced wholesale
    PolicyReplaced {
        candidate_count: usize,
        selected: String,
    },

    /// A policy refresh failed; the previous candidates were retained
    PolicyRefreshFailed { message: String },

    /// A policy response from a superseded upload was dropped
    PolicyResponseDiscarded { generation: u64 },

    TreatmentSelected { name: String },

    /// The twin screen loaded a new trajectory
    TrajectoryReplaced { protocol: String, steps: usize },

    /// A backend call failed and the mock fixture was served instead
    GatewayDegraded { endpoint: String, reason: String },

    /// A backend call succeeded after a degraded period
    GatewayRecovered { endpoint: String },

    ScreenChanged { screen: String },

    ReportRendered { file_name: String, bytes: usize },
}

/// Broadcast bus for session events.
///
/// Publishing never fails; an event with no subscribers is simply dropped.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, event: SessionEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Timestamped envelope written to the session log
#[derive(Debug, Clone, Serialize)]
pub struct SessionEventRecord<'a> {
    pub timestamp: String,
    #[serde(flatten)]
    pub event: &'a SessionEvent,
}

/// Append-only JSONL log of session events.
pub struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one event as a single JSON line.
    pub fn append(&self, event: &SessionEvent) -> Result<()> {
        let record = SessionEventRecord {
            timestamp: chrono::Utc::now().to_rfc3339(),
            event,
        };
        let line = serde_json::to_string(&record)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")?;
        Ok(())
    }

    /// Drain a subscription into the log until the bus closes. Intended to be
    /// spawned as a background task.
    pub async fn record(&self, mut receiver: broadcast::Receiver<SessionEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(err) = self.append(&event) {
                        log::warn!("failed to append session event: {err}");
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("session log lagged, {skipped} events dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus_pubsub() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(SessionEvent::UploadCompleted {
            patient_id: "PT-0042".to_string(),
            feature_count: 7,
        });

        match rx.recv().await.unwrap() {
            SessionEvent::UploadCompleted { feature_count, .. } => assert_eq!(feature_count, 7),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let bus = EventBus::default();
        bus.publish(SessionEvent::ScreenChanged {
            screen: "analysis".to_string(),
        });
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_session_log_appends_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let log = SessionLog::new(dir.path().join("session.jsonl"));

        log.append(&SessionEvent::GatewayDegraded {
            endpoint: "policy".to_string(),
            reason: "connection refused".to_string(),
        })
        .unwrap();
        log.append(&SessionEvent::TreatmentSelected {
            name: "Radiotherapy".to_string(),
        })
        .unwrap();

        let contents = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert!(first.get("timestamp").is_some());
        assert!(first.get("GatewayDegraded").is_some());
    }
}
