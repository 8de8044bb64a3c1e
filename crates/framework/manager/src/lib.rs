//! # Manager
//!
//! The dispatch engine at the center of the framework.
//!
//! A [`WorkItem`] names an event, a participant and optionally a domain.
//! Items are appended to the [`WorkQueue`] by any thread and executed one at a
//! time, in order, by the [`DispatchService`] worker. Each execution first
//! delivers the event to the addressed participant and then fans it out to
//! every loaded policy. A failure or panic in any one consumer is logged and
//! contained; the remaining consumers still receive the event.
//!
//! [`Framework`] ties the participant registry, the policy manager and the
//! worker together.
//!
//! ## Example
//!
//! ```rust
//! use ptf_domain::config::DispatchConfig;
//! use ptf_manager::{Framework, WorkItem};
//! use ptf_events::ParticipantEvent;
//! use ptf_participant::ParticipantBuilder;
//! use ptf_participant::primitive::MemoryPrimitives;
//! use std::sync::Arc;
//!
//! let framework = Framework::start(&DispatchConfig::default()).unwrap();
//! let participant = framework
//!     .create_participant(ParticipantBuilder::new("battery", Arc::new(MemoryPrimitives::new())))
//!     .unwrap();
//!
//! framework
//!     .enqueue(WorkItem::new(ParticipantEvent::ParticipantSpecificInfoChanged, participant.index()))
//!     .unwrap();
//!
//! assert_eq!(framework.shutdown().unwrap(), 2);
//! ```

mod dispatcher;
mod error;
mod framework;
mod service;
mod work_item;

pub use crate::dispatcher::{DispatchReport, Dispatcher, ParticipantOutcome};
pub use crate::error::{DispatchError, DispatchErrorExt};
pub use crate::framework::{Framework, FrameworkError, FrameworkErrorExt, FrameworkStatus, PolicyStatus};
pub use crate::service::{DispatchService, ReportHook, WorkQueue};
pub use crate::work_item::WorkItem;
