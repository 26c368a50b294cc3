//! Notifier adapters: tracing log, JSONL audit trail, and fan-out.

pub mod jsonl;

pub use jsonl::JsonlNotifier;

use accord_application::ports::notifier::{Notifier, ReviewEvent};
use std::sync::Arc;
use tracing::info;

/// Notifier that emits each event to the tracing log.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, event: ReviewEvent) {
        info!(
            target: "accord::events",
            "{} -> [{}] {}",
            event.event_type,
            event
                .recipients
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            event.payload
        );
    }
}

/// Fan an event out to several notifiers (e.g., tracing plus audit log).
pub struct FanoutNotifier {
    sinks: Vec<Arc<dyn Notifier>>,
}

impl FanoutNotifier {
    pub fn new(sinks: Vec<Arc<dyn Notifier>>) -> Self {
        Self { sinks }
    }
}

impl Notifier for FanoutNotifier {
    fn notify(&self, event: ReviewEvent) {
        for sink in &self.sinks {
            sink.notify(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_application::ports::notifier::EventType;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Counter(Mutex<usize>);

    impl Notifier for Counter {
        fn notify(&self, _event: ReviewEvent) {
            *self.0.lock().unwrap() += 1;
        }
    }

    #[test]
    fn test_fanout_reaches_every_sink() {
        let a = Arc::new(Counter::default());
        let b = Arc::new(Counter::default());
        let fanout = FanoutNotifier::new(vec![a.clone(), b.clone()]);

        fanout.notify(ReviewEvent::new(
            EventType::ReviewerAssigned,
            Vec::new(),
            serde_json::json!({}),
        ));

        assert_eq!(*a.0.lock().unwrap(), 1);
        assert_eq!(*b.0.lock().unwrap(), 1);
    }
}
