use crate::activity::CapabilityActivity;
use crate::catalog::ParticipantEvent;
use crate::error::EventError;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

/// 128 activity records is enough headroom for bursty control actions.
const DEFAULT_CAPACITY: usize = 128;
const MIN_CAPACITY: usize = 1;

/// A published activity record together with the event it was raised under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityRecord {
    pub event: ParticipantEvent,
    pub activity: CapabilityActivity,
}

/// Fan-out channel for capability activity meant for external observers.
///
/// Publishing never blocks and never fails when nobody listens.
#[derive(Debug, Clone)]
pub struct ActivityBus {
    sender: broadcast::Sender<Arc<ActivityRecord>>,
    capacity: usize,
}

impl Default for ActivityBus {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(DEFAULT_CAPACITY);
        Self { sender, capacity: DEFAULT_CAPACITY }
    }
}

impl ActivityBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bus that retains up to `capacity` unread records per subscriber.
    ///
    /// # Errors
    /// Returns [`EventError::InvalidCapacity`] if `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self, EventError> {
        if capacity < MIN_CAPACITY {
            return Err(EventError::InvalidCapacity {
                message: format!("capacity must be >= {MIN_CAPACITY}").into(),
                context: None,
            });
        }
        let (sender, _) = broadcast::channel(capacity);
        Ok(Self { sender, capacity })
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ActivityRecord>> {
        self.sender.subscribe()
    }

    /// Publishes a record and returns the number of subscribers that received it.
    pub fn publish(&self, event: ParticipantEvent, activity: CapabilityActivity) -> usize {
        let record = Arc::new(ActivityRecord { event, activity });
        self.sender.send(record).map_or_else(
            |_| {
                trace!(%event, "Activity dropped: no active subscribers");
                0
            },
            |count| {
                trace!(%event, count, "Activity published");
                count
            },
        )
    }
}

/// Receiving side of the [`ActivityBus`] that skips over lag instead of failing.
pub trait ActivityReceiverExt {
    /// Receive the next record, returning `None` when the bus is gone.
    fn next_activity(&mut self) -> impl Future<Output = Option<Arc<ActivityRecord>>> + Send;
}

impl ActivityReceiverExt for broadcast::Receiver<Arc<ActivityRecord>> {
    async fn next_activity(&mut self) -> Option<Arc<ActivityRecord>> {
        let mut skipped = 0u64;

        loop {
            match self.recv().await {
                Ok(record) => {
                    if skipped > 0 {
                        warn!(skipped, "Activity receiver lagged; continuing from oldest retained record");
                    }
                    return Some(record);
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    skipped = skipped.saturating_add(n);
                    debug!(skipped = n, total_skipped = skipped, "Activity receiver lagged");
                },
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
