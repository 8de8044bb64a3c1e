//! Participant and framework event identifiers.
//!
//! Participants raise [`ParticipantEvent`]s; each one maps to exactly one
//! [`FrameworkEvent`], the identifier used by the dispatch engine, logging and
//! filtering. The mapping preserves declaration order. Framework-only
//! lifecycle events have no participant counterpart.

use crate::error::EventError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{EnumCount, EnumIter, FromRepr, IntoStaticStr};

/// Addressing level of a framework event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventScope {
    /// Framework-wide; no participant is addressed.
    Framework,
    /// Addresses a participant as a whole.
    Participant,
    /// Addresses one domain of a participant.
    Domain,
}

macro_rules! event_catalog {
    (
        framework { $($fw:ident => $fw_scope:ident),* $(,)? }
        participant { $($name:ident = $tag:literal => $scope:ident),* $(,)? }
    ) => {
        /// Events a participant can raise, keyed by a stable raw tag.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            Serialize, Deserialize, FromRepr, EnumIter, EnumCount, IntoStaticStr,
        )]
        #[repr(u32)]
        pub enum ParticipantEvent {
            $($name = $tag,)*
        }

        /// Framework-level event identifiers.
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            Serialize, Deserialize, EnumIter, EnumCount, IntoStaticStr,
        )]
        pub enum FrameworkEvent {
            $($fw,)*
            $($name,)*
        }

        impl ParticipantEvent {
            #[must_use]
            pub const fn to_framework_event(self) -> FrameworkEvent {
                match self {
                    $(Self::$name => FrameworkEvent::$name,)*
                }
            }
        }

        impl FrameworkEvent {
            #[must_use]
            pub const fn scope(self) -> EventScope {
                match self {
                    $(Self::$fw => EventScope::$fw_scope,)*
                    $(Self::$name => EventScope::$scope,)*
                }
            }

            /// The participant event this identifier mirrors, if any.
            #[must_use]
            pub const fn participant_event(self) -> Option<ParticipantEvent> {
                match self {
                    $(Self::$name => Some(ParticipantEvent::$name),)*
                    _ => None,
                }
            }
        }
    };
}

event_catalog! {
    framework {
        ParticipantCreate => Participant,
        ParticipantDestroy => Participant,
        DomainCreate => Domain,
        DomainDestroy => Domain,
        PolicyCreate => Framework,
        PolicyDestroy => Framework,
        GetStatus => Framework,
    }
    participant {
        ConnectedStandbyEntry = 1 => Participant,
        ConnectedStandbyExit = 2 => Participant,
        Suspend = 3 => Participant,
        Resume = 4 => Participant,
        ParticipantActivityLoggingEnabled = 5 => Participant,
        ParticipantActivityLoggingDisabled = 6 => Participant,
        ParticipantControlAction = 7 => Participant,
        ParticipantSpecificInfoChanged = 8 => Participant,
        DomainCoreControlCapabilityChanged = 9 => Domain,
        DomainDisplayControlCapabilityChanged = 10 => Domain,
        DomainDisplayStatusChanged = 11 => Domain,
        DomainPerformanceControlCapabilityChanged = 12 => Domain,
        DomainPerformanceControlsChanged = 13 => Domain,
        DomainPowerControlCapabilityChanged = 14 => Domain,
        DomainPriorityChanged = 15 => Domain,
        DomainRadioConnectionStatusChanged = 16 => Domain,
        DomainRfProfileChanged = 17 => Domain,
        DomainTemperatureThresholdCrossed = 18 => Domain,
        DomainVirtualSensorCalibrationTableChanged = 19 => Domain,
        DomainVirtualSensorPollingTableChanged = 20 => Domain,
        DomainVirtualSensorRecalcChanged = 21 => Domain,
        DomainBatteryStatusChanged = 22 => Domain,
        DomainBatteryInformationChanged = 23 => Domain,
        DomainBatteryHighFrequencyImpedanceChanged = 24 => Domain,
        DomainBatteryNoLoadVoltageChanged = 25 => Domain,
        DomainMaxBatteryPeakCurrentChanged = 26 => Domain,
        DomainPlatformPowerSourceChanged = 27 => Domain,
        DomainAdapterPowerRatingChanged = 28 => Domain,
        DomainChargerTypeChanged = 29 => Domain,
        DomainPlatformRestOfPowerChanged = 30 => Domain,
        DomainMaxBatteryPowerChanged = 31 => Domain,
        DomainPlatformBatterySteadyStateChanged = 32 => Domain,
        DomainAcNominalVoltageChanged = 33 => Domain,
        DomainAcOperationalCurrentChanged = 34 => Domain,
        DomainAc1msPercentageOverloadChanged = 35 => Domain,
        DomainAc2msPercentageOverloadChanged = 36 => Domain,
        DomainAc10msPercentageOverloadChanged = 37 => Domain,
        DomainEnergyThresholdCrossed = 38 => Domain,
        DomainFanCapabilityChanged = 39 => Domain,
        DomainSocWorkloadClassificationChanged = 40 => Domain,
        DomainEppSensitivityHintChanged = 41 => Domain,
    }
}

impl ParticipantEvent {
    /// Resolves a raw tag. Tag `0` is the reserved invalid tag.
    pub fn from_tag(tag: u32) -> Result<Self, EventError> {
        Self::from_repr(tag).ok_or(EventError::UnknownTag { tag, context: None })
    }

    #[must_use]
    pub const fn tag(self) -> u32 {
        self as u32
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    #[must_use]
    pub const fn scope(self) -> EventScope {
        self.to_framework_event().scope()
    }
}

impl FromStr for ParticipantEvent {
    type Err = EventError;

    /// Case-insensitive match on the variant name, e.g. `domainbatterystatuschanged`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use strum::IntoEnumIterator;

        Self::iter().find(|e| e.name().eq_ignore_ascii_case(s.trim())).ok_or_else(|| {
            EventError::UnknownName { message: s.to_owned().into(), context: None }
        })
    }
}

impl FrameworkEvent {
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }
}

impl From<ParticipantEvent> for FrameworkEvent {
    fn from(event: ParticipantEvent) -> Self {
        event.to_framework_event()
    }
}

impl std::fmt::Display for ParticipantEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::fmt::Display for FrameworkEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn mapping_is_total_and_order_preserving() {
        let mapped: Vec<FrameworkEvent> =
            ParticipantEvent::iter().map(ParticipantEvent::to_framework_event).collect();

        assert_eq!(mapped.len(), ParticipantEvent::COUNT);
        assert!(mapped.windows(2).all(|w| w[0] < w[1]));
        for event in ParticipantEvent::iter() {
            assert_eq!(event.to_framework_event().participant_event(), Some(event));
            assert_eq!(event.name(), event.to_framework_event().name());
        }
    }

    #[test]
    fn tags_are_stable_and_start_at_one() {
        assert_eq!(ParticipantEvent::ConnectedStandbyEntry.tag(), 1);
        assert_eq!(ParticipantEvent::DomainBatteryStatusChanged.tag(), 22);
        assert_eq!(ParticipantEvent::from_tag(22), Ok(ParticipantEvent::DomainBatteryStatusChanged));
        assert_eq!(
            ParticipantEvent::iter().last().map(ParticipantEvent::tag),
            u32::try_from(ParticipantEvent::COUNT).ok()
        );
    }

    #[test]
    fn out_of_catalog_tags_are_rejected() {
        assert_eq!(
            ParticipantEvent::from_tag(0).unwrap_err().kind(),
            "UnknownTag",
        );
        assert!(ParticipantEvent::from_tag(999).is_err());
    }

    #[test]
    fn framework_only_events_have_no_participant_counterpart() {
        assert_eq!(FrameworkEvent::PolicyCreate.participant_event(), None);
        assert_eq!(FrameworkEvent::GetStatus.scope(), EventScope::Framework);
        assert_eq!(FrameworkEvent::COUNT, ParticipantEvent::COUNT + 7);
    }

    #[test]
    fn scopes_follow_the_event_prefix() {
        assert_eq!(ParticipantEvent::DomainBatteryStatusChanged.scope(), EventScope::Domain);
        assert_eq!(ParticipantEvent::Resume.scope(), EventScope::Participant);
    }

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!(
            "domainbatterystatuschanged".parse::<ParticipantEvent>(),
            Ok(ParticipantEvent::DomainBatteryStatusChanged)
        );
        assert!("NotAnEvent".parse::<ParticipantEvent>().is_err());
    }
}
