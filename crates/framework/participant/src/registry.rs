use crate::error::ParticipantError;
use crate::participant::{Participant, ParticipantBuilder};
use ptf_domain::ParticipantIndex;
use ptf_kernel::IndexedRegistry;
use std::sync::Arc;
use tracing::info;

/// Live set of participants, addressed by [`ParticipantIndex`].
///
/// Callers resolve a handle on every use; a destroyed participant's handle
/// reports an invalid index and is never reassigned.
#[derive(Debug, Default)]
pub struct ParticipantRegistry {
    participants: IndexedRegistry<ParticipantIndex, Participant>,
}

impl ParticipantRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns the next index and builds the participant's domains and controls.
    pub fn create(&self, builder: ParticipantBuilder) -> Result<Arc<Participant>, ParticipantError> {
        let (index, participant) = self.participants.insert_with(|index| Arc::new(builder.build(index)))?;
        info!(
            participant = %index,
            name = participant.name(),
            domains = participant.domains().len(),
            "Participant created"
        );
        Ok(participant)
    }

    pub fn destroy(&self, index: ParticipantIndex) -> Result<Arc<Participant>, ParticipantError> {
        let participant = self.participants.remove(index)?;
        info!(participant = %index, name = participant.name(), "Participant destroyed");
        Ok(participant)
    }

    pub fn get(&self, index: ParticipantIndex) -> Result<Arc<Participant>, ParticipantError> {
        Ok(self.participants.get(index)?)
    }

    /// Ordered snapshot of live handles.
    pub fn indexes(&self) -> Vec<ParticipantIndex> {
        self.participants.indexes()
    }

    /// Ordered snapshot of live participants.
    pub fn participants(&self) -> Vec<Arc<Participant>> {
        self.participants.entries().into_iter().map(|(_, p)| p).collect()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Removes every participant, in index order.
    pub fn destroy_all(&self) -> Vec<Arc<Participant>> {
        let drained: Vec<_> = self.participants.drain().into_iter().map(|(_, p)| p).collect();
        if !drained.is_empty() {
            info!(count = drained.len(), "All participants destroyed");
        }
        drained
    }
}
