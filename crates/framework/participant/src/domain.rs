use crate::control::{
    Control, ControlDiagnostics, ControlFactory, EnergyControl, EnergyControlFactory, ParticipantSetSpecificInfo,
    ParticipantSetSpecificInfoFactory, SocWorkloadClassification, SocWorkloadClassificationFactory,
};
use crate::primitive::PrimitiveAccess;
use ptf_domain::config::CapabilityVersions;
use ptf_domain::{CapabilitySet, DomainIndex, ParticipantIndex};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error};

/// One controllable aspect of a participant and its active controls.
///
/// Controls are chosen by their factories when the domain is built. A family
/// whose configured version is unknown stays absent and is reported as disabled.
#[derive(Debug)]
pub struct Domain {
    index: DomainIndex,
    name: String,
    energy: Option<Arc<dyn EnergyControl>>,
    soc_workload: Option<Arc<dyn SocWorkloadClassification>>,
    set_specific_info: Option<Arc<dyn ParticipantSetSpecificInfo>>,
    disabled: CapabilitySet,
}

/// Status export of one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainStatus {
    pub index: DomainIndex,
    pub name: String,
    pub capabilities: CapabilitySet,
    #[serde(skip_serializing_if = "CapabilitySet::is_empty")]
    pub disabled: CapabilitySet,
    pub controls: Vec<ControlDiagnostics>,
}

struct Binding<'a> {
    participant: ParticipantIndex,
    domain: DomainIndex,
    versions: &'a CapabilityVersions,
    primitives: &'a Arc<dyn PrimitiveAccess>,
    disabled: CapabilitySet,
}

impl Binding<'_> {
    fn make<F: ControlFactory>(&mut self, factory: &F) -> Option<Arc<F::Output>> {
        let version = self.versions.version(F::CAPABILITY)?;
        match factory.make(self.participant, self.domain, version, Arc::clone(self.primitives)) {
            Ok(control) => {
                debug!(
                    participant = %self.participant,
                    domain = %self.domain,
                    capability = F::CAPABILITY.key(),
                    version,
                    "Control created"
                );
                Some(control)
            },
            Err(e) => {
                error!(
                    participant = %self.participant,
                    domain = %self.domain,
                    error = %e,
                    "Capability disabled: control factory rejected the version"
                );
                self.disabled |= F::CAPABILITY.flag();
                None
            },
        }
    }
}

impl Domain {
    pub fn new(
        participant: ParticipantIndex,
        index: DomainIndex,
        name: impl Into<String>,
        versions: &CapabilityVersions,
        primitives: &Arc<dyn PrimitiveAccess>,
    ) -> Self {
        let mut binding = Binding { participant, domain: index, versions, primitives, disabled: CapabilitySet::empty() };
        let energy = binding.make(&EnergyControlFactory);
        let soc_workload = binding.make(&SocWorkloadClassificationFactory);
        let set_specific_info = binding.make(&ParticipantSetSpecificInfoFactory);

        Self { index, name: name.into(), energy, soc_workload, set_specific_info, disabled: binding.disabled }
    }

    pub const fn index(&self) -> DomainIndex {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Families with an active control.
    pub fn capabilities(&self) -> CapabilitySet {
        self.controls().map(|c| c.capability()).collect()
    }

    /// Families whose configured version could not be built.
    pub const fn disabled(&self) -> CapabilitySet {
        self.disabled
    }

    pub fn energy_control(&self) -> Option<&dyn EnergyControl> {
        self.energy.as_deref()
    }

    pub fn soc_workload_classification(&self) -> Option<&dyn SocWorkloadClassification> {
        self.soc_workload.as_deref()
    }

    pub fn participant_set_specific_info(&self) -> Option<&dyn ParticipantSetSpecificInfo> {
        self.set_specific_info.as_deref()
    }

    /// Every active control, through the shared contract.
    pub fn controls(&self) -> impl Iterator<Item = &dyn Control> {
        let energy = self.energy.as_deref().map(|c| c as &dyn Control);
        let soc = self.soc_workload.as_deref().map(|c| c as &dyn Control);
        let set_info = self.set_specific_info.as_deref().map(|c| c as &dyn Control);
        energy.into_iter().chain(soc).chain(set_info)
    }

    pub fn clear_cached_data(&self) {
        self.controls().for_each(Control::clear_cached_data);
    }

    pub fn set_activity_logging(&self, enabled: bool) {
        self.controls().for_each(|c| c.set_activity_logging(enabled));
    }

    pub fn publish_activity(&self) {
        self.controls().for_each(Control::publish_activity_if_enabled);
    }

    pub fn status(&self) -> DomainStatus {
        DomainStatus {
            index: self.index,
            name: self.name.clone(),
            capabilities: self.capabilities(),
            disabled: self.disabled,
            controls: self.controls().map(Control::diagnostics).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::MemoryPrimitives;
    use ptf_domain::Capability;

    fn primitives() -> Arc<dyn PrimitiveAccess> {
        Arc::new(MemoryPrimitives::new())
    }

    #[test]
    fn unknown_version_disables_only_that_family() {
        let versions = CapabilityVersions {
            energy_control: Some(7),
            soc_workload_classification: Some(1),
            participant_set_specific_info: None,
        };
        let domain = Domain::new(ParticipantIndex::new(0), DomainIndex::new(0), "cpu", &versions, &primitives());

        assert!(domain.energy_control().is_none());
        assert!(domain.soc_workload_classification().is_some());
        assert_eq!(domain.capabilities(), CapabilitySet::SOC_WORKLOAD_CLASSIFICATION);
        assert!(domain.disabled().supports(Capability::EnergyControl));
        assert!(domain.participant_set_specific_info().is_none());
    }

    #[test]
    fn status_lists_each_control() {
        let versions = CapabilityVersions {
            energy_control: Some(2),
            soc_workload_classification: None,
            participant_set_specific_info: Some(0),
        };
        let domain = Domain::new(ParticipantIndex::new(1), DomainIndex::new(3), "soc", &versions, &primitives());
        let status = domain.status();

        assert_eq!(status.index, DomainIndex::new(3));
        assert_eq!(status.controls.len(), 2);
        assert_eq!(status.controls[0].control_knob_version, "002");
        assert_eq!(status.controls[1].capability, Capability::ParticipantSetSpecificInfo);
        assert!(status.disabled.is_empty());
    }

    #[test]
    fn clearing_an_empty_domain_is_harmless() {
        let domain = Domain::new(
            ParticipantIndex::new(0),
            DomainIndex::new(0),
            "empty",
            &CapabilityVersions::default(),
            &primitives(),
        );
        domain.clear_cached_data();
        domain.clear_cached_data();
        assert_eq!(domain.controls().count(), 0);
    }
}
