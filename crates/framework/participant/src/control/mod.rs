//! Versioned hardware controls.
//!
//! A capability family (energy control, SoC workload classification, ...) is a
//! trait extending [`Control`]. Each hardware generation implements the family
//! trait in its own type, and the family's [`ControlFactory`] picks the type
//! from a version number once, when the domain is built. Nothing outside the
//! factory names a concrete version.
//!
//! Accessors separate three outcomes:
//! * `Err(ControlError::NotImplemented)`: this version has no such operation.
//! * `Ok(reading)` with [`ReadStatus::Unsupported`]: the platform lacks the
//!   primitive. Expected, logged at debug.
//! * `Ok(reading)` with [`ReadStatus::Faulted`]: the primitive failed; the
//!   reading carries the sentinel value.

mod diagnostics;
pub mod energy;
pub mod factory;
pub mod set_info;
pub mod soc;

pub use diagnostics::ControlDiagnostics;
pub use energy::EnergyControl;
pub use factory::{
    ControlFactory, EnergyControlFactory, FactoryError, FactoryErrorExt,
    ParticipantSetSpecificInfoFactory, SocWorkloadClassificationFactory,
};
pub use set_info::ParticipantSetSpecificInfo;
pub use soc::SocWorkloadClassification;

use crate::primitive::{PrimitiveAccess, PrimitiveError, PrimitiveId};
use ptf_domain::{Capability, DomainIndex, ParticipantIndex};
use ptf_events::{ActivityData, CapabilityActivity, ParticipantEvent};
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

#[ptf_derive::ptf_error]
#[derive(Clone, PartialEq, Eq)]
pub enum ControlError {
    /// The selected control version does not provide this operation.
    #[error("{operation} is not implemented by {capability} v{version}{}", format_context(.context))]
    NotImplemented {
        capability: Capability,
        version: u32,
        operation: &'static str,
        context: Option<Cow<'static, str>>,
    },

    /// The caller passed a value the control refuses to write.
    #[error("Invalid input for {operation}{}: {message}", format_context(.context))]
    InvalidInput {
        operation: &'static str,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },
}

/// How a [`Reading`] was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadStatus {
    Fresh,
    /// The platform does not provide the primitive.
    Unsupported,
    /// The primitive exists but the read failed.
    Faulted,
}

/// A value read through a control. Non-fresh readings hold `T::default()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reading<T> {
    value: T,
    status: ReadStatus,
}

impl<T> Reading<T> {
    pub const fn fresh(value: T) -> Self {
        Self { value, status: ReadStatus::Fresh }
    }

    pub const fn status(&self) -> ReadStatus {
        self.status
    }

    pub const fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn is_fresh(&self) -> bool {
        self.status == ReadStatus::Fresh
    }

    /// The value when fresh.
    pub fn fresh_value(self) -> Option<T> {
        if self.is_fresh() { Some(self.value) } else { None }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reading<U> {
        Reading { value: f(self.value), status: self.status }
    }
}

impl<T: Default> Reading<T> {
    /// Sentinel reading carrying another reading's failure status.
    pub(crate) fn sentinel(status: ReadStatus) -> Self {
        Self { value: T::default(), status }
    }

    pub fn unsupported() -> Self {
        Self { value: T::default(), status: ReadStatus::Unsupported }
    }

    pub fn faulted() -> Self {
        Self { value: T::default(), status: ReadStatus::Faulted }
    }
}

/// Result of a write through a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteStatus {
    Applied,
    Unsupported,
    Faulted,
}

/// Contract shared by every capability family and version.
pub trait Control: fmt::Debug + Send + Sync {
    /// Binding to the owning participant/domain and its primitives.
    fn context(&self) -> &ControlContext;

    fn capability(&self) -> Capability;

    fn version(&self) -> u32;

    fn name(&self) -> &'static str {
        self.capability().name()
    }

    /// Drops derived state. Safe to call at any time.
    fn clear_cached_data(&self) {}

    /// Structured snapshot for status export. Reports partial data on failure.
    fn diagnostics(&self) -> ControlDiagnostics {
        ControlDiagnostics::new(self.capability(), self.name(), self.version())
    }

    /// Current activity payload, if this control publishes any.
    fn activity(&self) -> Option<ActivityData> {
        None
    }

    fn set_activity_logging(&self, enabled: bool) {
        self.context().set_activity_logging(enabled);
    }

    fn activity_logging_enabled(&self) -> bool {
        self.context().activity_logging_enabled()
    }

    /// Publishes [`Control::activity`] when activity logging is on.
    /// Failures are logged and dropped.
    fn publish_activity_if_enabled(&self) {
        let ctx = self.context();
        if !ctx.activity_logging_enabled() {
            return;
        }
        if let Some(data) = self.activity() {
            ctx.publish(data, self.name());
        }
    }
}

/// Participant/domain binding shared by all control implementations.
#[derive(Debug)]
pub struct ControlContext {
    participant: ParticipantIndex,
    domain: DomainIndex,
    primitives: Arc<dyn PrimitiveAccess>,
    activity_logging: AtomicBool,
}

impl ControlContext {
    pub fn new(participant: ParticipantIndex, domain: DomainIndex, primitives: Arc<dyn PrimitiveAccess>) -> Self {
        Self { participant, domain, primitives, activity_logging: AtomicBool::new(false) }
    }

    pub const fn participant(&self) -> ParticipantIndex {
        self.participant
    }

    pub const fn domain(&self) -> DomainIndex {
        self.domain
    }

    pub fn primitives(&self) -> &dyn PrimitiveAccess {
        self.primitives.as_ref()
    }

    pub fn set_activity_logging(&self, enabled: bool) {
        self.activity_logging.store(enabled, Ordering::Release);
    }

    pub fn activity_logging_enabled(&self) -> bool {
        self.activity_logging.load(Ordering::Acquire)
    }

    /// Reads a scalar primitive, folding platform failures into the reading.
    pub fn read_u32(&self, primitive: PrimitiveId, operation: &'static str) -> Reading<u32> {
        match self.primitives.get_u32(primitive, self.domain) {
            Ok(value) => Reading::fresh(value),
            Err(e) => self.absorb(&e, operation),
        }
    }

    /// Reads a binary primitive, folding platform failures into the reading.
    pub fn read_binary(&self, primitive: PrimitiveId, operation: &'static str) -> Reading<Vec<u8>> {
        match self.primitives.get_binary(primitive, self.domain) {
            Ok(value) => Reading::fresh(value),
            Err(e) => self.absorb(&e, operation),
        }
    }

    /// Writes a scalar primitive, folding platform failures into the status.
    pub fn write_u32(&self, primitive: PrimitiveId, value: u32, operation: &'static str) -> WriteStatus {
        match self.primitives.set_u32(primitive, self.domain, value) {
            Ok(()) => WriteStatus::Applied,
            Err(e) if e.is_not_found() => {
                debug!(participant = %self.participant, domain = %self.domain, operation, "Primitive not supported");
                WriteStatus::Unsupported
            },
            Err(e) => {
                warn!(participant = %self.participant, domain = %self.domain, operation, error = %e, "Primitive write failed");
                WriteStatus::Faulted
            },
        }
    }

    fn absorb<T: Default>(&self, error: &PrimitiveError, operation: &'static str) -> Reading<T> {
        if error.is_not_found() {
            debug!(participant = %self.participant, domain = %self.domain, operation, "Primitive not supported");
            Reading::unsupported()
        } else {
            warn!(participant = %self.participant, domain = %self.domain, operation, error = %error, "Primitive read failed");
            Reading::faulted()
        }
    }

    fn publish(&self, data: ActivityData, control: &'static str) {
        let activity = CapabilityActivity::new(self.participant, self.domain, data);
        match self.primitives.send_event(ParticipantEvent::ParticipantControlAction, self.domain, activity) {
            Ok(()) => info!(participant = %self.participant, domain = %self.domain, control, "Published activity"),
            Err(e) => debug!(participant = %self.participant, domain = %self.domain, control, error = %e, "Activity not published"),
        }
    }
}

/// Builds [`ControlError::NotImplemented`] for a control.
pub(crate) fn not_implemented(control: &dyn Control, operation: &'static str) -> ControlError {
    ControlError::NotImplemented {
        capability: control.capability(),
        version: control.version(),
        operation,
        context: None,
    }
}
