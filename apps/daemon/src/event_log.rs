use ptf::policy::{Policy, PolicyError, PolicyEvent};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// Policy that records every event it is handed in the log.
#[derive(Debug, Default)]
pub struct EventLogPolicy {
    seen: AtomicUsize,
}

impl EventLogPolicy {
    pub const NAME: &'static str = "event-log";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen(&self) -> usize {
        self.seen.load(Ordering::Relaxed)
    }
}

impl Policy for EventLogPolicy {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn on_event(&self, event: &PolicyEvent) -> Result<(), PolicyError> {
        let seen = self.seen.fetch_add(1, Ordering::Relaxed).saturating_add(1);
        info!(policy = Self::NAME, %event, seen, "Policy received event");
        Ok(())
    }
}
