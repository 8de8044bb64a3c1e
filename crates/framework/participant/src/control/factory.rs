//! Version selection for capability families.
//!
//! Each family has one factory. `make` maps a hardware-reported version number
//! to the implementing type and hands back the family trait object; an unknown
//! version is a configuration error, never a fallback to another version.

use super::energy::{EnergyControl, EnergyControlV1, EnergyControlV2};
use super::set_info::{ParticipantSetSpecificInfo, ParticipantSetSpecificInfoV0, ParticipantSetSpecificInfoV1};
use super::soc::{SocWorkloadClassification, SocWorkloadClassificationV0, SocWorkloadClassificationV1};
use super::{Control, ControlContext};
use crate::primitive::PrimitiveAccess;
use ptf_domain::{Capability, DomainIndex, ParticipantIndex};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

#[ptf_derive::ptf_error]
#[derive(Clone, PartialEq, Eq)]
pub enum FactoryError {
    #[error("{capability} has no implementation for version {version}{}", format_context(.context))]
    UnknownVersion { capability: Capability, version: u32, context: Option<Cow<'static, str>> },
}

/// Builds the control implementing one capability family.
pub trait ControlFactory: fmt::Debug + Send + Sync {
    /// The family trait object handed out, e.g. `dyn EnergyControl`.
    type Output: Control + ?Sized;

    const CAPABILITY: Capability;

    /// Versions this factory can build, ascending.
    fn versions(&self) -> &'static [u32];

    fn make(
        &self,
        participant: ParticipantIndex,
        domain: DomainIndex,
        version: u32,
        primitives: Arc<dyn PrimitiveAccess>,
    ) -> Result<Arc<Self::Output>, FactoryError>;
}

macro_rules! control_factory {
    (
        $(#[$meta:meta])*
        $factory:ident => dyn $family:ident ($capability:ident) {
            $($version:literal => $control:ty),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $factory;

        impl ControlFactory for $factory {
            type Output = dyn $family;

            const CAPABILITY: Capability = Capability::$capability;

            fn versions(&self) -> &'static [u32] {
                &[$($version),+]
            }

            fn make(
                &self,
                participant: ParticipantIndex,
                domain: DomainIndex,
                version: u32,
                primitives: Arc<dyn PrimitiveAccess>,
            ) -> Result<Arc<Self::Output>, FactoryError> {
                match version {
                    $($version => {
                        let ctx = ControlContext::new(participant, domain, primitives);
                        Ok(Arc::new(<$control>::new(ctx)) as Arc<Self::Output>)
                    },)+
                    _ => Err(FactoryError::UnknownVersion {
                        capability: Self::CAPABILITY,
                        version,
                        context: None,
                    }),
                }
            }
        }
    };
}

control_factory! {
    /// RAPL energy counters and thresholds.
    EnergyControlFactory => dyn EnergyControl (EnergyControl) {
        1 => EnergyControlV1,
        2 => EnergyControlV2,
    }
}

control_factory! {
    SocWorkloadClassificationFactory => dyn SocWorkloadClassification (SocWorkloadClassification) {
        0 => SocWorkloadClassificationV0,
        1 => SocWorkloadClassificationV1,
    }
}

control_factory! {
    ParticipantSetSpecificInfoFactory => dyn ParticipantSetSpecificInfo (ParticipantSetSpecificInfo) {
        0 => ParticipantSetSpecificInfoV0,
        1 => ParticipantSetSpecificInfoV1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ControlError;
    use crate::primitive::{MemoryPrimitives, PrimitiveId};
    use ptf_domain::units::SocWorkload;

    const P0: ParticipantIndex = ParticipantIndex::new(0);
    const D0: DomainIndex = DomainIndex::new(0);

    #[test]
    fn versions_are_never_substituted() {
        let primitives = Arc::new(MemoryPrimitives::new());
        primitives.set_scalar(PrimitiveId::GetSocWorkloadClassification, D0, 2);

        let v0 = SocWorkloadClassificationFactory.make(P0, D0, 0, primitives.clone()).unwrap();
        let v1 = SocWorkloadClassificationFactory.make(P0, D0, 1, primitives).unwrap();

        assert_eq!(v0.version(), 0);
        assert_eq!(v1.version(), 1);
        assert!(matches!(v0.soc_workload(), Err(ControlError::NotImplemented { version: 0, .. })));
        assert_eq!(v1.soc_workload().unwrap().fresh_value(), Some(SocWorkload::Bursty));
    }

    #[test]
    fn unknown_version_is_a_configuration_error() {
        let primitives = Arc::new(MemoryPrimitives::new());
        let err = EnergyControlFactory.make(P0, D0, 0, primitives).unwrap_err();
        assert_eq!(
            err,
            FactoryError::UnknownVersion { capability: Capability::EnergyControl, version: 0, context: None }
        );
        assert!(err.to_string().contains("version 0"));
    }

    #[test]
    fn factories_advertise_their_versions() {
        assert_eq!(EnergyControlFactory.versions(), &[1, 2]);
        assert_eq!(ParticipantSetSpecificInfoFactory.versions(), &[0, 1]);
        assert_eq!(<SocWorkloadClassificationFactory as ControlFactory>::CAPABILITY, Capability::SocWorkloadClassification);
    }
}
