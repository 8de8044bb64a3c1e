use ptf_domain::units::SocWorkload;
use ptf_domain::{Capability, DomainIndex, ParticipantIndex};
use serde::{Deserialize, Serialize};

/// Snapshot a control publishes while activity logging is enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityActivity {
    pub participant: ParticipantIndex,
    pub domain: DomainIndex,
    pub capability: Capability,
    pub data: ActivityData,
}

/// Capability-specific activity payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityData {
    EnergyControl { energy_counter: u32, instantaneous_power: u32 },
    SocWorkloadClassification { workload: SocWorkload },
}

impl ActivityData {
    #[must_use]
    pub const fn capability(&self) -> Capability {
        match self {
            Self::EnergyControl { .. } => Capability::EnergyControl,
            Self::SocWorkloadClassification { .. } => Capability::SocWorkloadClassification,
        }
    }
}

impl CapabilityActivity {
    /// Builds a snapshot whose capability tag is taken from the payload.
    #[must_use]
    pub const fn new(participant: ParticipantIndex, domain: DomainIndex, data: ActivityData) -> Self {
        Self { participant, domain, capability: data.capability(), data }
    }
}
