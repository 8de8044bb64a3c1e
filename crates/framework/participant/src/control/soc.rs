use super::{Control, ControlContext, ControlDiagnostics, ControlError, Reading, not_implemented};
use crate::primitive::PrimitiveId;
use ptf_domain::Capability;
use ptf_domain::units::SocWorkload;
use ptf_events::ActivityData;

pub trait SocWorkloadClassification: Control {
    fn soc_workload(&self) -> Result<Reading<SocWorkload>, ControlError>;
}

/// Placeholder generation: the platform exposes no classification.
#[derive(Debug)]
pub struct SocWorkloadClassificationV0 {
    ctx: ControlContext,
}

impl SocWorkloadClassificationV0 {
    pub const fn new(ctx: ControlContext) -> Self {
        Self { ctx }
    }
}

impl Control for SocWorkloadClassificationV0 {
    fn context(&self) -> &ControlContext {
        &self.ctx
    }

    fn capability(&self) -> Capability {
        Capability::SocWorkloadClassification
    }

    fn version(&self) -> u32 {
        0
    }
}

impl SocWorkloadClassification for SocWorkloadClassificationV0 {
    fn soc_workload(&self) -> Result<Reading<SocWorkload>, ControlError> {
        Err(not_implemented(self, "soc_workload"))
    }
}

#[derive(Debug)]
pub struct SocWorkloadClassificationV1 {
    ctx: ControlContext,
}

impl SocWorkloadClassificationV1 {
    pub const fn new(ctx: ControlContext) -> Self {
        Self { ctx }
    }

    fn workload(&self) -> Reading<SocWorkload> {
        let raw = self
            .ctx
            .read_u32(PrimitiveId::GetSocWorkloadClassification, "SocWorkloadClassification::soc_workload");
        let status = raw.status();
        raw.fresh_value().map_or_else(|| Reading::sentinel(status), |raw| Reading::fresh(SocWorkload::from_raw(raw)))
    }
}

impl Control for SocWorkloadClassificationV1 {
    fn context(&self) -> &ControlContext {
        &self.ctx
    }

    fn capability(&self) -> Capability {
        Capability::SocWorkloadClassification
    }

    fn version(&self) -> u32 {
        1
    }

    fn diagnostics(&self) -> ControlDiagnostics {
        ControlDiagnostics::new(self.capability(), self.name(), self.version())
            .field_opt("soc_workload", self.workload().fresh_value())
    }

    fn activity(&self) -> Option<ActivityData> {
        Some(ActivityData::SocWorkloadClassification { workload: self.workload().into_value() })
    }
}

impl SocWorkloadClassification for SocWorkloadClassificationV1 {
    fn soc_workload(&self) -> Result<Reading<SocWorkload>, ControlError> {
        Ok(self.workload())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ReadStatus;
    use crate::primitive::MemoryPrimitives;
    use ptf_domain::{DomainIndex, ParticipantIndex};
    use std::sync::Arc;

    #[test]
    fn v1_maps_raw_classification() {
        let primitives = Arc::new(MemoryPrimitives::new());
        primitives.set_scalar(PrimitiveId::GetSocWorkloadClassification, DomainIndex::new(1), 3);
        let control = SocWorkloadClassificationV1::new(ControlContext::new(
            ParticipantIndex::new(0),
            DomainIndex::new(1),
            primitives,
        ));

        assert_eq!(control.soc_workload().unwrap().fresh_value(), Some(SocWorkload::Sustained));
        assert_eq!(control.diagnostics().fields["soc_workload"], "Sustained");
    }

    #[test]
    fn v1_unsupported_reads_unknown() {
        let primitives = Arc::new(MemoryPrimitives::new());
        let control = SocWorkloadClassificationV1::new(ControlContext::new(
            ParticipantIndex::new(0),
            DomainIndex::new(0),
            primitives,
        ));

        let reading = control.soc_workload().unwrap();
        assert_eq!(reading.status(), ReadStatus::Unsupported);
        assert_eq!(*reading.value(), SocWorkload::Unknown);
    }
}
