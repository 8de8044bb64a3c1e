//! # Events
//!
//! The framework's event vocabulary and the outbound activity channel.
//!
//! * [`ParticipantEvent`] / [`FrameworkEvent`]: a stable, open catalog of event
//!   identifiers with a total, order-preserving participant → framework mapping.
//! * [`ActivityBus`]: a `tokio::sync::broadcast` fan-out used to hand capability
//!   activity snapshots to external observers without blocking the publisher.
//!
//! # Example
//!
//! ```rust
//! use ptf_events::{ActivityBus, ActivityData, ActivityReceiverExt, CapabilityActivity, ParticipantEvent};
//! use ptf_domain::{DomainIndex, ParticipantIndex};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let bus = ActivityBus::new();
//!     let mut rx = bus.subscribe();
//!
//!     let activity = CapabilityActivity::new(
//!         ParticipantIndex::new(0),
//!         DomainIndex::new(0),
//!         ActivityData::EnergyControl { energy_counter: 42, instantaneous_power: 0 },
//!     );
//!     bus.publish(ParticipantEvent::ParticipantControlAction, activity);
//!
//!     let record = rx.next_activity().await.unwrap();
//!     assert_eq!(record.event, ParticipantEvent::ParticipantControlAction);
//! }
//! ```

mod activity;
mod bus;
mod catalog;
mod error;

pub use activity::{ActivityData, CapabilityActivity};
pub use bus::{ActivityBus, ActivityReceiverExt, ActivityRecord};
pub use catalog::{EventScope, FrameworkEvent, ParticipantEvent};
pub use error::{EventError, EventErrorExt};
