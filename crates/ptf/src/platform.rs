//! Participants described by configuration.

use ptf_domain::DomainIndex;
use ptf_domain::config::PlatformConfig;
use ptf_events::ActivityBus;
use ptf_manager::{Framework, FrameworkError};
use ptf_participant::primitive::{MemoryPrimitives, PrimitiveError};
use ptf_participant::{Participant, ParticipantBuilder};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::info;

#[ptf_derive::ptf_error]
pub enum PlatformError {
    /// A configured primitive value could not be loaded.
    #[error("Invalid platform primitives{}: {source}", format_context(.context))]
    Primitive { source: PrimitiveError, context: Option<Cow<'static, str>> },

    #[error("Failed to register participant{}: {source}", format_context(.context))]
    Framework { source: FrameworkError, context: Option<Cow<'static, str>> },
}

/// Creates one participant per configured entry, each backed by its own
/// in-memory primitive store seeded from the configuration.
///
/// Activity is published on `bus` when one is given.
///
/// # Errors
/// Fails on the first entry with an unknown primitive name or when the
/// framework refuses the participant; earlier participants stay registered.
pub fn populate(
    framework: &Framework,
    config: &PlatformConfig,
    bus: Option<&ActivityBus>,
) -> Result<Vec<Arc<Participant>>, PlatformError> {
    let mut created = Vec::with_capacity(config.participants.len());

    for entry in &config.participants {
        let primitives = bus.map_or_else(MemoryPrimitives::new, |bus| MemoryPrimitives::with_bus(bus.clone()));
        for (position, domain) in (0u32..).zip(&entry.domains) {
            primitives
                .load_domain(DomainIndex::new(position), domain)
                .context(format!("participant '{}' domain '{}'", entry.name, domain.name))?;
        }

        let participant = framework
            .create_participant(ParticipantBuilder::from_config(entry, Arc::new(primitives)))
            .context(format!("participant '{}'", entry.name))?;
        info!(
            participant = %participant.index(),
            name = %entry.name,
            domains = entry.domains.len(),
            "Configured participant created"
        );
        created.push(participant);
    }

    Ok(created)
}
