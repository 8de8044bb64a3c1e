//! Access to low-level platform values.
//!
//! Controls never talk to hardware directly. Every read, write and outbound
//! notification goes through an injected [`PrimitiveAccess`] implementation
//! keyed by `(PrimitiveId, DomainIndex)`.

mod memory;

pub use memory::MemoryPrimitives;

use ptf_domain::DomainIndex;
use ptf_events::{CapabilityActivity, ParticipantEvent};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Identifier of a platform primitive.
///
/// Names parse from and print as `snake_case`, e.g. `get_rapl_energy_counter_info`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
    Serialize, Deserialize, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PrimitiveId {
    GetRaplEnergyCounter,
    GetRaplEnergyCounterInfo,
    GetRaplEnergyUnit,
    GetRaplEnergyCounterWidth,
    GetInstantaneousPower,
    GetParticipantEnergyThreshold,
    SetEnergyThresholdCount,
    GetSocWorkloadClassification,
    SetDeviceTemperatureIndication,
    SetCoolingPolicy,
}

#[ptf_derive::ptf_error]
#[derive(Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// The platform does not implement this primitive for the domain. Expected.
    #[error("Primitive {primitive} not found for {domain}{}", format_context(.context))]
    NotFound { primitive: PrimitiveId, domain: DomainIndex, context: Option<Cow<'static, str>> },

    /// The primitive exists but the request failed.
    #[error("Primitive {primitive} failed for {domain}{}: {message}", format_context(.context))]
    Fault {
        primitive: PrimitiveId,
        domain: DomainIndex,
        message: Cow<'static, str>,
        context: Option<Cow<'static, str>>,
    },

    /// The outbound event sink rejected a notification.
    #[error("Event sink error{}: {message}", format_context(.context))]
    EventSink { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A primitive name that does not match any [`PrimitiveId`].
    #[error("Unknown primitive name{}: {message}", format_context(.context))]
    UnknownName { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl PrimitiveError {
    /// True when the hardware simply lacks the primitive.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Synchronous request/response access to platform primitives.
pub trait PrimitiveAccess: fmt::Debug + Send + Sync {
    fn get_u32(&self, primitive: PrimitiveId, domain: DomainIndex) -> Result<u32, PrimitiveError>;

    fn get_binary(&self, primitive: PrimitiveId, domain: DomainIndex) -> Result<Vec<u8>, PrimitiveError>;

    fn set_u32(&self, primitive: PrimitiveId, domain: DomainIndex, value: u32) -> Result<(), PrimitiveError>;

    /// Fire-and-forget notification to the platform event sink.
    fn send_event(
        &self,
        event: ParticipantEvent,
        domain: DomainIndex,
        activity: CapabilityActivity,
    ) -> Result<(), PrimitiveError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn names_are_snake_case() {
        assert_eq!(PrimitiveId::GetRaplEnergyCounterInfo.to_string(), "get_rapl_energy_counter_info");
        assert_eq!(
            PrimitiveId::from_str("get_participant_energy_threshold"),
            Ok(PrimitiveId::GetParticipantEnergyThreshold)
        );
        assert!(PrimitiveId::from_str("get_everything").is_err());
    }

    #[test]
    fn not_found_is_distinct_from_fault() {
        let missing = PrimitiveError::NotFound {
            primitive: PrimitiveId::GetRaplEnergyUnit,
            domain: DomainIndex::new(0),
            context: None,
        };
        let fault = PrimitiveError::Fault {
            primitive: PrimitiveId::GetRaplEnergyUnit,
            domain: DomainIndex::new(0),
            message: "bus timeout".into(),
            context: None,
        };
        assert!(missing.is_not_found());
        assert!(!fault.is_not_found());
        assert!(fault.to_string().contains("bus timeout"));
    }
}
