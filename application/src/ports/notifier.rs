//! Notification port
//!
//! Fire-and-forget: the core emits events and never awaits delivery or
//! retries. Recipient lists carry the actors the core already knows about;
//! role-based fan-out (e.g., "all coordinators") is the delivery layer's job.

use accord_domain::ActorId;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Kinds of events the review workflows emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    ReviewerAssigned,
    AssessmentSubmitted,
    SubmissionSentBack,
    LockForceReleased,
    CompilationSubmitted,
    ChangeRequestResolved,
}

impl EventType {
    pub fn as_str(&self) -> &str {
        match self {
            EventType::ReviewerAssigned => "reviewer_assigned",
            EventType::AssessmentSubmitted => "assessment_submitted",
            EventType::SubmissionSentBack => "submission_sent_back",
            EventType::LockForceReleased => "lock_force_released",
            EventType::CompilationSubmitted => "compilation_submitted",
            EventType::ChangeRequestResolved => "change_request_resolved",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One notification event.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewEvent {
    pub event_type: EventType,
    pub recipients: Vec<ActorId>,
    pub payload: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}

impl ReviewEvent {
    pub fn new(
        event_type: EventType,
        recipients: Vec<ActorId>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_type,
            recipients,
            payload,
            occurred_at: Utc::now(),
        }
    }
}

/// Notification sink. Implementations must not block the caller on delivery.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: ReviewEvent);
}

/// No-op notifier for tests and quiet paths.
pub struct NoNotifier;

impl Notifier for NoNotifier {
    fn notify(&self, _event: ReviewEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_as_str() {
        assert_eq!(EventType::AssessmentSubmitted.as_str(), "assessment_submitted");
        assert_eq!(EventType::LockForceReleased.to_string(), "lock_force_released");
    }

    #[test]
    fn test_event_construction() {
        let event = ReviewEvent::new(
            EventType::SubmissionSentBack,
            vec![ActorId::new("author-1")],
            serde_json::json!({ "submission_id": "sub-1" }),
        );
        assert_eq!(event.recipients.len(), 1);
        assert_eq!(event.payload["submission_id"], "sub-1");
    }
}
