//! # Domain Models
//!
//! Pure framework types with minimal dependencies (`serde`, `bitflags`).
//! Keep it lean: no I/O, locking, or dispatch logic, just data and simple helpers.

pub mod capability;
pub mod config;
pub mod index;
pub mod units;

pub use capability::{Capability, CapabilitySet};
pub use index::{DomainIndex, ParticipantIndex, PolicyIndex, RegistryIndex};
