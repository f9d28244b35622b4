//! Pipeline event bus.
//!
//! A per-pipeline-instance publish/subscribe channel. Subscriber lifetime
//! is explicit: attach with [`EventBus::subscribe`], detach by dropping the
//! receiver. Emission order is completion order, and a job's terminal
//! outcome is published at most once.

use std::collections::HashSet;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// Notifications produced when a transformation reaches a terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    /// The transformation produced a usable result.
    TransformationComplete {
        job_id: String,
        source_url: String,
        result_url: String,
    },
    /// The transformation failed, timed out or was canceled. The original
    /// remains usable; `fallback_url` always carries it.
    TransformationFailed {
        job_id: String,
        source_url: String,
        fallback_url: String,
        error: Option<String>,
    },
}

impl PipelineEvent {
    /// Job this event belongs to.
    pub fn job_id(&self) -> &str {
        match self {
            PipelineEvent::TransformationComplete { job_id, .. } => job_id,
            PipelineEvent::TransformationFailed { job_id, .. } => job_id,
        }
    }
}

/// Publish/subscribe surface decoupling the pipeline from its consumers.
pub struct EventBus {
    sender: broadcast::Sender<PipelineEvent>,
    published: Mutex<HashSet<String>>,
}

impl EventBus {
    /// Create a new bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            published: Mutex::new(HashSet::new()),
        }
    }

    /// Subscribe to pipeline events. Drop the receiver to detach.
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.sender.subscribe()
    }

    /// Number of attached subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publish a terminal event for a job. Returns false if an event for
    /// this job id was already published; the duplicate is dropped.
    pub fn emit(&self, event: PipelineEvent) -> bool {
        {
            let mut published = self.published.lock().unwrap();
            if !published.insert(event.job_id().to_string()) {
                debug!(
                    "suppressed duplicate terminal event for job {}",
                    event.job_id()
                );
                return false;
            }
        }

        // Send errors only mean nobody is listening right now.
        let _ = self.sender.send(event);
        true
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(job_id: &str) -> PipelineEvent {
        PipelineEvent::TransformationComplete {
            job_id: job_id.to_string(),
            source_url: "http://store/o/a.jpg".to_string(),
            result_url: "http://store/o/aged.jpg".to_string(),
        }
    }

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert!(bus.emit(complete("job-1")));

        let e1 = rx1.recv().await.unwrap();
        let e2 = rx2.recv().await.unwrap();
        assert_eq!(e1.job_id(), "job-1");
        assert_eq!(e2.job_id(), "job-1");
    }

    #[tokio::test]
    async fn test_duplicate_terminal_event_is_dropped() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        assert!(bus.emit(complete("job-1")));
        assert!(!bus.emit(complete("job-1")));
        assert!(!bus.emit(PipelineEvent::TransformationFailed {
            job_id: "job-1".to_string(),
            source_url: "http://store/o/a.jpg".to_string(),
            fallback_url: "http://store/o/a.jpg".to_string(),
            error: None,
        }));

        rx.recv().await.unwrap();
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn test_emit_without_subscribers_does_not_fail() {
        let bus = EventBus::default();
        assert!(bus.emit(complete("job-1")));
    }

    #[tokio::test]
    async fn test_detach_by_dropping_receiver() {
        let bus = EventBus::default();
        let rx = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 1);
        drop(rx);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let json = serde_json::to_string(&complete("job-1")).unwrap();
        assert!(json.contains("\"type\":\"transformation_complete\""));
    }
}
