use bitflags::bitflags;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A named group of related control operations with several hardware-generation
/// specific implementations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    EnergyControl,
    SocWorkloadClassification,
    ParticipantSetSpecificInfo,
}

impl Capability {
    pub const ALL: [Self; 3] =
        [Self::EnergyControl, Self::SocWorkloadClassification, Self::ParticipantSetSpecificInfo];

    /// Display name used in logs and status output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::EnergyControl => "Energy Control",
            Self::SocWorkloadClassification => "SoC Workload Classification",
            Self::ParticipantSetSpecificInfo => "Participant Set Specific Info",
        }
    }

    /// Stable key used to tag diagnostics and published activity.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::EnergyControl => "energy_control",
            Self::SocWorkloadClassification => "soc_workload_classification",
            Self::ParticipantSetSpecificInfo => "participant_set_specific_info",
        }
    }

    #[must_use]
    pub const fn flag(self) -> CapabilitySet {
        match self {
            Self::EnergyControl => CapabilitySet::ENERGY_CONTROL,
            Self::SocWorkloadClassification => CapabilitySet::SOC_WORKLOAD_CLASSIFICATION,
            Self::ParticipantSetSpecificInfo => CapabilitySet::PARTICIPANT_SET_SPECIFIC_INFO,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Set of capability families a domain currently exposes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
    pub struct CapabilitySet: u32 {
        const ENERGY_CONTROL = 1 << 0;
        const SOC_WORKLOAD_CLASSIFICATION = 1 << 1;
        const PARTICIPANT_SET_SPECIFIC_INFO = 1 << 2;

        const ALL = Self::ENERGY_CONTROL.bits()
            | Self::SOC_WORKLOAD_CLASSIFICATION.bits()
            | Self::PARTICIPANT_SET_SPECIFIC_INFO.bits();
    }
}

impl CapabilitySet {
    #[must_use]
    pub fn supports(self, capability: Capability) -> bool {
        self.contains(capability.flag())
    }

    pub fn families(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |c| self.supports(*c))
    }
}

impl From<Capability> for CapabilitySet {
    fn from(capability: Capability) -> Self {
        capability.flag()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), |set, c| set | c.flag())
    }
}

impl Serialize for CapabilitySet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.families().map(Capability::key))
    }
}

impl<'de> Deserialize<'de> for CapabilitySet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let families = Vec::<Capability>::deserialize(deserializer)?;
        Ok(families.into_iter().collect())
    }
}
