use super::{PrimitiveAccess, PrimitiveError, PrimitiveId};
use fxhash::{FxHashMap, FxHashSet};
use parking_lot::RwLock;
use ptf_domain::DomainIndex;
use ptf_domain::config::DomainConfig;
use ptf_events::{ActivityBus, CapabilityActivity, ParticipantEvent};
use std::str::FromStr;
use tracing::debug;

type Key = (PrimitiveId, DomainIndex);

#[derive(Debug, Default)]
struct Store {
    scalars: FxHashMap<Key, u32>,
    buffers: FxHashMap<Key, Vec<u8>>,
    faults: FxHashSet<Key>,
    sink_faulted: bool,
}

/// In-memory primitive table used by simulated participants.
///
/// A primitive that was never stored reports [`PrimitiveError::NotFound`];
/// writes are accepted only for primitives that already hold a value.
/// Outbound events are forwarded to an optional [`ActivityBus`].
#[derive(Debug, Default)]
pub struct MemoryPrimitives {
    store: RwLock<Store>,
    bus: Option<ActivityBus>,
}

impl MemoryPrimitives {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forwards `send_event` notifications to `bus`.
    #[must_use]
    pub fn with_bus(bus: ActivityBus) -> Self {
        Self { store: RwLock::default(), bus: Some(bus) }
    }

    pub fn set_scalar(&self, primitive: PrimitiveId, domain: DomainIndex, value: u32) {
        self.store.write().scalars.insert((primitive, domain), value);
    }

    pub fn set_buffer(&self, primitive: PrimitiveId, domain: DomainIndex, value: impl Into<Vec<u8>>) {
        self.store.write().buffers.insert((primitive, domain), value.into());
    }

    /// Current scalar value, if any.
    pub fn scalar(&self, primitive: PrimitiveId, domain: DomainIndex) -> Option<u32> {
        self.store.read().scalars.get(&(primitive, domain)).copied()
    }

    /// Makes every request for the primitive fail until [`Self::clear_fault`].
    pub fn inject_fault(&self, primitive: PrimitiveId, domain: DomainIndex) {
        self.store.write().faults.insert((primitive, domain));
    }

    pub fn clear_fault(&self, primitive: PrimitiveId, domain: DomainIndex) {
        self.store.write().faults.remove(&(primitive, domain));
    }

    /// Makes the outbound event sink reject notifications.
    pub fn fail_event_sink(&self, failed: bool) {
        self.store.write().sink_faulted = failed;
    }

    /// Seeds the table from a `[[platform.participants.domains]]` entry.
    pub fn load_domain(&self, domain: DomainIndex, config: &DomainConfig) -> Result<(), PrimitiveError> {
        let scalars = config
            .primitives
            .iter()
            .map(|(name, value)| Ok((parse_name(name)?, *value)))
            .collect::<Result<Vec<_>, PrimitiveError>>()?;
        let buffers = config
            .buffers
            .iter()
            .map(|(name, bytes)| Ok((parse_name(name)?, bytes.clone())))
            .collect::<Result<Vec<_>, PrimitiveError>>()?;

        let mut store = self.store.write();
        for (primitive, value) in scalars {
            store.scalars.insert((primitive, domain), value);
        }
        for (primitive, bytes) in buffers {
            store.buffers.insert((primitive, domain), bytes);
        }
        drop(store);

        debug!(%domain, domain_name = %config.name, "Primitive table loaded");
        Ok(())
    }

    fn check_fault(store: &Store, primitive: PrimitiveId, domain: DomainIndex) -> Result<(), PrimitiveError> {
        if store.faults.contains(&(primitive, domain)) {
            return Err(PrimitiveError::Fault {
                primitive,
                domain,
                message: "injected fault".into(),
                context: None,
            });
        }
        Ok(())
    }
}

impl PrimitiveAccess for MemoryPrimitives {
    fn get_u32(&self, primitive: PrimitiveId, domain: DomainIndex) -> Result<u32, PrimitiveError> {
        let store = self.store.read();
        Self::check_fault(&store, primitive, domain)?;
        store.scalars.get(&(primitive, domain)).copied().ok_or(PrimitiveError::NotFound {
            primitive,
            domain,
            context: None,
        })
    }

    fn get_binary(&self, primitive: PrimitiveId, domain: DomainIndex) -> Result<Vec<u8>, PrimitiveError> {
        let store = self.store.read();
        Self::check_fault(&store, primitive, domain)?;
        store.buffers.get(&(primitive, domain)).cloned().ok_or(PrimitiveError::NotFound {
            primitive,
            domain,
            context: None,
        })
    }

    fn set_u32(&self, primitive: PrimitiveId, domain: DomainIndex, value: u32) -> Result<(), PrimitiveError> {
        let mut store = self.store.write();
        Self::check_fault(&store, primitive, domain)?;
        match store.scalars.get_mut(&(primitive, domain)) {
            Some(slot) => {
                *slot = value;
                Ok(())
            },
            None => Err(PrimitiveError::NotFound { primitive, domain, context: None }),
        }
    }

    fn send_event(
        &self,
        event: ParticipantEvent,
        domain: DomainIndex,
        activity: CapabilityActivity,
    ) -> Result<(), PrimitiveError> {
        if self.store.read().sink_faulted {
            return Err(PrimitiveError::EventSink {
                message: format!("{event} rejected for {domain}").into(),
                context: None,
            });
        }
        if let Some(bus) = &self.bus {
            bus.publish(event, activity);
        }
        Ok(())
    }
}

fn parse_name(name: &str) -> Result<PrimitiveId, PrimitiveError> {
    PrimitiveId::from_str(name.trim()).map_err(|_| PrimitiveError::UnknownName {
        message: name.to_owned().into(),
        context: Some("platform primitive table".into()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptf_domain::ParticipantIndex;
    use ptf_events::ActivityData;
    use std::collections::BTreeMap;

    const D0: DomainIndex = DomainIndex::new(0);

    #[test]
    fn missing_primitives_report_not_found() {
        let primitives = MemoryPrimitives::new();
        let err = primitives.get_u32(PrimitiveId::GetRaplEnergyCounter, D0).unwrap_err();
        assert!(err.is_not_found());

        let err = primitives.set_u32(PrimitiveId::SetCoolingPolicy, D0, 1).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn writes_replace_existing_values() {
        let primitives = MemoryPrimitives::new();
        primitives.set_scalar(PrimitiveId::SetEnergyThresholdCount, D0, 0);
        primitives.set_u32(PrimitiveId::SetEnergyThresholdCount, D0, 500).unwrap();
        assert_eq!(primitives.scalar(PrimitiveId::SetEnergyThresholdCount, D0), Some(500));
    }

    #[test]
    fn injected_faults_override_stored_values() {
        let primitives = MemoryPrimitives::new();
        primitives.set_scalar(PrimitiveId::GetRaplEnergyUnit, D0, 14);
        primitives.inject_fault(PrimitiveId::GetRaplEnergyUnit, D0);
        assert_eq!(primitives.get_u32(PrimitiveId::GetRaplEnergyUnit, D0).unwrap_err().kind(), "Fault");

        primitives.clear_fault(PrimitiveId::GetRaplEnergyUnit, D0);
        assert_eq!(primitives.get_u32(PrimitiveId::GetRaplEnergyUnit, D0), Ok(14));
    }

    #[test]
    fn load_domain_rejects_unknown_names() {
        let primitives = MemoryPrimitives::new();
        let config = DomainConfig {
            name: "cpu".to_owned(),
            primitives: BTreeMap::from([("get_rapl_energy_unit".to_owned(), 14)]),
            ..DomainConfig::default()
        };
        primitives.load_domain(D0, &config).unwrap();
        assert_eq!(primitives.get_u32(PrimitiveId::GetRaplEnergyUnit, D0), Ok(14));

        let broken = DomainConfig {
            primitives: BTreeMap::from([("get_warp_drive".to_owned(), 1)]),
            ..DomainConfig::default()
        };
        let err = primitives.load_domain(D0, &broken).unwrap_err();
        assert_eq!(err.kind(), "UnknownName");
    }

    #[test]
    fn events_are_forwarded_to_the_bus() {
        let bus = ActivityBus::new();
        let mut rx = bus.subscribe();
        let primitives = MemoryPrimitives::with_bus(bus);

        let activity = CapabilityActivity::new(
            ParticipantIndex::new(0),
            D0,
            ActivityData::EnergyControl { energy_counter: 9, instantaneous_power: 0 },
        );
        primitives.send_event(ParticipantEvent::ParticipantControlAction, D0, activity).unwrap();
        assert_eq!(rx.try_recv().unwrap().event, ParticipantEvent::ParticipantControlAction);

        primitives.fail_event_sink(true);
        let activity = CapabilityActivity::new(
            ParticipantIndex::new(0),
            D0,
            ActivityData::EnergyControl { energy_counter: 10, instantaneous_power: 0 },
        );
        let err = primitives.send_event(ParticipantEvent::ParticipantControlAction, D0, activity).unwrap_err();
        assert_eq!(err.kind(), "EventSink");
    }
}
