//! # Participants
//!
//! Hardware participants, their domains, and the versioned controls that
//! implement each capability family.
//!
//! * [`primitive`]: the injected platform access collaborator and an
//!   in-memory implementation for simulated platforms.
//! * [`control`]: the capability contract, the family traits, their versioned
//!   implementations, and the factories that choose between them.
//! * [`Domain`] / [`Participant`]: ownership of controls and participant-side
//!   event handling.
//! * [`ParticipantRegistry`]: index-validated lookup of live participants.
//!
//! ## Example
//!
//! ```rust
//! use ptf_domain::config::CapabilityVersions;
//! use ptf_domain::DomainIndex;
//! use ptf_participant::primitive::{MemoryPrimitives, PrimitiveId};
//! use ptf_participant::{ParticipantBuilder, ParticipantRegistry};
//! use std::sync::Arc;
//!
//! let primitives = Arc::new(MemoryPrimitives::new());
//! primitives.set_scalar(PrimitiveId::GetRaplEnergyCounter, DomainIndex::new(0), 4096);
//!
//! let registry = ParticipantRegistry::new();
//! let cpu = registry
//!     .create(
//!         ParticipantBuilder::new("TCPU", primitives)
//!             .domain("package", CapabilityVersions { energy_control: Some(1), ..Default::default() }),
//!     )
//!     .unwrap();
//!
//! let energy = cpu.domain(DomainIndex::new(0)).unwrap().energy_control().unwrap();
//! assert_eq!(energy.energy_counter().unwrap().fresh_value(), Some(4096));
//! ```

pub mod control;
mod domain;
mod error;
mod participant;
pub mod primitive;
mod registry;

pub use crate::domain::{Domain, DomainStatus};
pub use crate::error::{ParticipantError, ParticipantErrorExt};
pub use crate::participant::{Participant, ParticipantBuilder, ParticipantExtension, ParticipantStatus};
pub use crate::registry::ParticipantRegistry;
pub use control::{Control, ControlError, ReadStatus, Reading, WriteStatus};
