//! Energy control family (RAPL counters and energy threshold interrupts).

use super::{Control, ControlContext, ControlDiagnostics, ControlError, Reading, WriteStatus, not_implemented};
use crate::primitive::PrimitiveId;
use parking_lot::Mutex;
use ptf_domain::Capability;
use ptf_domain::units::{EnergyCounterInfo, Power};
use ptf_events::ActivityData;
use tracing::warn;

/// Counter-info buffer: `u32` type tag, 4 bytes padding, `u64` counter (LE).
const COUNTER_INFO_COUNTER_OFFSET: usize = 8;
const COUNTER_INFO_LEN: usize = COUNTER_INFO_COUNTER_OFFSET + size_of::<u64>();

pub trait EnergyControl: Control {
    fn energy_counter(&self) -> Result<Reading<u32>, ControlError>;

    fn energy_counter_info(&self) -> Result<Reading<EnergyCounterInfo>, ControlError>;

    /// Joules per counter tick.
    fn energy_unit(&self) -> Result<Reading<f64>, ControlError>;

    fn energy_counter_width(&self) -> Result<Reading<u32>, ControlError>;

    fn instantaneous_power(&self) -> Result<Reading<Power>, ControlError>;

    fn energy_threshold(&self) -> Result<Reading<u32>, ControlError>;

    fn set_energy_threshold(&self, threshold: u32) -> Result<WriteStatus, ControlError>;

    /// Disables the threshold interrupt by programming a zero threshold.
    fn disable_energy_threshold_interrupt(&self) -> Result<WriteStatus, ControlError>;
}

/// Extracts the counter from a counter-info buffer.
#[must_use]
pub fn decode_counter_info(buffer: &[u8]) -> Option<u64> {
    let bytes = buffer.get(COUNTER_INFO_COUNTER_OFFSET..COUNTER_INFO_LEN)?;
    <[u8; 8]>::try_from(bytes).ok().map(u64::from_le_bytes)
}

/// Builds a counter-info buffer as the platform reports it.
#[must_use]
pub fn encode_counter_info(counter: u64) -> Vec<u8> {
    let mut buffer = vec![0; COUNTER_INFO_COUNTER_OFFSET];
    buffer.extend_from_slice(&counter.to_le_bytes());
    buffer
}

fn low_word(value: u64) -> u32 {
    u32::try_from(value & u64::from(u32::MAX)).unwrap_or_default()
}

fn now_us() -> i64 {
    chrono::Utc::now().timestamp_micros()
}

fn read_threshold(ctx: &ControlContext) -> Reading<u32> {
    ctx.read_u32(PrimitiveId::GetParticipantEnergyThreshold, "EnergyControl::energy_threshold")
}

fn write_threshold(ctx: &ControlContext, threshold: u32, operation: &'static str) -> WriteStatus {
    ctx.write_u32(PrimitiveId::SetEnergyThresholdCount, threshold, operation)
}

/// RAPL power units report the energy unit as a 5-bit exponent.
const MAX_ENERGY_UNIT_EXPONENT: u32 = 31;

#[derive(Debug, Default, Clone, Copy)]
struct EnergyCache {
    unit: Option<f64>,
    width: Option<u32>,
    /// Bumped on every clear; a read started before a clear must not refill the cache.
    generation: u64,
}

/// Scalar RAPL primitives. Unit and counter width are cached until cleared.
#[derive(Debug)]
pub struct EnergyControlV1 {
    ctx: ControlContext,
    cache: Mutex<EnergyCache>,
}

impl EnergyControlV1 {
    pub fn new(ctx: ControlContext) -> Self {
        Self { ctx, cache: Mutex::new(EnergyCache::default()) }
    }

    fn counter(&self) -> Reading<u32> {
        self.ctx.read_u32(PrimitiveId::GetRaplEnergyCounter, "EnergyControl::energy_counter")
    }

    fn power(&self) -> Reading<Power> {
        self.ctx
            .read_u32(PrimitiveId::GetInstantaneousPower, "EnergyControl::instantaneous_power")
            .map(Power::from_milliwatts)
    }

    fn unit(&self) -> Reading<f64> {
        let raw = self.ctx.read_u32(PrimitiveId::GetRaplEnergyUnit, "EnergyControl::energy_unit");
        match raw.fresh_value() {
            Some(exp) if exp <= MAX_ENERGY_UNIT_EXPONENT => Reading::fresh(0.5_f64.powi(exp.cast_signed())),
            Some(exp) => {
                warn!(
                    participant = %self.ctx.participant(),
                    domain = %self.ctx.domain(),
                    raw = exp,
                    max = MAX_ENERGY_UNIT_EXPONENT,
                    "Energy unit exponent out of range"
                );
                Reading::faulted()
            },
            None => Reading::sentinel(raw.status()),
        }
    }

    /// Returns the cached value or reads it, caching only fresh values read
    /// without an intervening clear.
    fn cached<T: Copy>(
        &self,
        slot: impl Fn(&mut EnergyCache) -> &mut Option<T>,
        read: impl FnOnce() -> Reading<T>,
    ) -> Reading<T> {
        let generation = {
            let mut cache = self.cache.lock();
            if let Some(value) = *slot(&mut *cache) {
                return Reading::fresh(value);
            }
            cache.generation
        };

        let reading = read();
        if let Some(value) = reading.fresh_value() {
            let mut cache = self.cache.lock();
            if cache.generation == generation {
                *slot(&mut *cache) = Some(value);
            }
        }
        reading
    }
}

impl Control for EnergyControlV1 {
    fn context(&self) -> &ControlContext {
        &self.ctx
    }

    fn capability(&self) -> Capability {
        Capability::EnergyControl
    }

    fn version(&self) -> u32 {
        1
    }

    fn clear_cached_data(&self) {
        let mut cache = self.cache.lock();
        *cache = EnergyCache { generation: cache.generation.wrapping_add(1), ..EnergyCache::default() };
    }

    fn diagnostics(&self) -> ControlDiagnostics {
        ControlDiagnostics::new(self.capability(), self.name(), self.version())
            .field_opt("energy_counter", self.counter().fresh_value())
            .field_opt("energy_unit", self.energy_unit().ok().and_then(Reading::fresh_value))
            .field_opt("energy_counter_width", self.energy_counter_width().ok().and_then(Reading::fresh_value))
            .field_opt("instantaneous_power", self.power().fresh_value())
            .field_opt("energy_threshold", read_threshold(&self.ctx).fresh_value())
    }

    fn activity(&self) -> Option<ActivityData> {
        Some(ActivityData::EnergyControl {
            energy_counter: self.counter().into_value(),
            instantaneous_power: self.power().into_value().milliwatts(),
        })
    }
}

impl EnergyControl for EnergyControlV1 {
    fn energy_counter(&self) -> Result<Reading<u32>, ControlError> {
        Ok(self.counter())
    }

    fn energy_counter_info(&self) -> Result<Reading<EnergyCounterInfo>, ControlError> {
        let counter = self.counter();
        Ok(match counter.fresh_value() {
            Some(value) => Reading::fresh(EnergyCounterInfo { energy_counter: u64::from(value), timestamp_us: now_us() }),
            None => Reading::sentinel(counter.status()),
        })
    }

    fn energy_unit(&self) -> Result<Reading<f64>, ControlError> {
        Ok(self.cached(|cache| &mut cache.unit, || self.unit()))
    }

    fn energy_counter_width(&self) -> Result<Reading<u32>, ControlError> {
        Ok(self.cached(
            |cache| &mut cache.width,
            || self.ctx.read_u32(PrimitiveId::GetRaplEnergyCounterWidth, "EnergyControl::energy_counter_width"),
        ))
    }

    fn instantaneous_power(&self) -> Result<Reading<Power>, ControlError> {
        Ok(self.power())
    }

    fn energy_threshold(&self) -> Result<Reading<u32>, ControlError> {
        Ok(read_threshold(&self.ctx))
    }

    fn set_energy_threshold(&self, threshold: u32) -> Result<WriteStatus, ControlError> {
        Ok(write_threshold(&self.ctx, threshold, "EnergyControl::set_energy_threshold"))
    }

    fn disable_energy_threshold_interrupt(&self) -> Result<WriteStatus, ControlError> {
        Ok(write_threshold(&self.ctx, 0, "EnergyControl::disable_energy_threshold_interrupt"))
    }
}

/// Counter info read as one binary primitive; scalar RAPL accessors are gone.
#[derive(Debug)]
pub struct EnergyControlV2 {
    ctx: ControlContext,
}

impl EnergyControlV2 {
    pub const fn new(ctx: ControlContext) -> Self {
        Self { ctx }
    }

    fn counter_info(&self) -> Reading<u64> {
        let buffer = self.ctx.read_binary(PrimitiveId::GetRaplEnergyCounterInfo, "EnergyControl::energy_counter_info");
        let status = buffer.status();
        match buffer.fresh_value() {
            Some(bytes) => decode_counter_info(&bytes).map_or_else(
                || {
                    warn!(
                        participant = %self.ctx.participant(),
                        domain = %self.ctx.domain(),
                        len = bytes.len(),
                        "Energy counter info buffer too short"
                    );
                    Reading::faulted()
                },
                Reading::fresh,
            ),
            None => Reading::sentinel(status),
        }
    }
}

impl Control for EnergyControlV2 {
    fn context(&self) -> &ControlContext {
        &self.ctx
    }

    fn capability(&self) -> Capability {
        Capability::EnergyControl
    }

    fn version(&self) -> u32 {
        2
    }

    fn activity(&self) -> Option<ActivityData> {
        Some(ActivityData::EnergyControl {
            energy_counter: low_word(self.counter_info().into_value()),
            instantaneous_power: 0,
        })
    }
}

impl EnergyControl for EnergyControlV2 {
    fn energy_counter(&self) -> Result<Reading<u32>, ControlError> {
        Err(not_implemented(self, "energy_counter"))
    }

    fn energy_counter_info(&self) -> Result<Reading<EnergyCounterInfo>, ControlError> {
        let counter = self.counter_info();
        Ok(match counter.fresh_value() {
            Some(value) => Reading::fresh(EnergyCounterInfo { energy_counter: value, timestamp_us: now_us() }),
            None => Reading::sentinel(counter.status()),
        })
    }

    fn energy_unit(&self) -> Result<Reading<f64>, ControlError> {
        Err(not_implemented(self, "energy_unit"))
    }

    fn energy_counter_width(&self) -> Result<Reading<u32>, ControlError> {
        Err(not_implemented(self, "energy_counter_width"))
    }

    fn instantaneous_power(&self) -> Result<Reading<Power>, ControlError> {
        Err(not_implemented(self, "instantaneous_power"))
    }

    fn energy_threshold(&self) -> Result<Reading<u32>, ControlError> {
        Ok(read_threshold(&self.ctx))
    }

    fn set_energy_threshold(&self, threshold: u32) -> Result<WriteStatus, ControlError> {
        Ok(write_threshold(&self.ctx, threshold, "EnergyControl::set_energy_threshold"))
    }

    fn disable_energy_threshold_interrupt(&self) -> Result<WriteStatus, ControlError> {
        Ok(write_threshold(&self.ctx, 0, "EnergyControl::disable_energy_threshold_interrupt"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::ReadStatus;
    use crate::primitive::MemoryPrimitives;
    use ptf_domain::{DomainIndex, ParticipantIndex};
    use std::sync::Arc;

    const D0: DomainIndex = DomainIndex::new(0);

    fn context(primitives: &Arc<MemoryPrimitives>) -> ControlContext {
        ControlContext::new(ParticipantIndex::new(0), D0, Arc::clone(primitives) as _)
    }

    #[test]
    fn counter_info_layout() {
        let buffer = encode_counter_info(0x1_0000_0005);
        assert_eq!(buffer.len(), COUNTER_INFO_LEN);
        assert_eq!(decode_counter_info(&buffer), Some(0x1_0000_0005));
        assert_eq!(decode_counter_info(&buffer[..12]), None);
        assert_eq!(low_word(0x1_0000_0005), 5);
    }

    #[test]
    fn v1_caches_unit_until_cleared() {
        let primitives = Arc::new(MemoryPrimitives::new());
        primitives.set_scalar(PrimitiveId::GetRaplEnergyUnit, D0, 1);
        let control = EnergyControlV1::new(context(&primitives));

        assert_eq!(control.energy_unit().unwrap().fresh_value(), Some(0.5));
        primitives.set_scalar(PrimitiveId::GetRaplEnergyUnit, D0, 2);
        assert_eq!(control.energy_unit().unwrap().fresh_value(), Some(0.5));

        control.clear_cached_data();
        assert_eq!(control.energy_unit().unwrap().fresh_value(), Some(0.25));
    }

    #[test]
    fn v1_out_of_range_unit_is_a_fault_and_not_cached() {
        let primitives = Arc::new(MemoryPrimitives::new());
        primitives.set_scalar(PrimitiveId::GetRaplEnergyUnit, D0, u32::MAX);
        let control = EnergyControlV1::new(context(&primitives));

        let unit = control.energy_unit().unwrap();
        assert_eq!(unit.status(), ReadStatus::Faulted);
        assert!(unit.value().abs() < f64::EPSILON);

        primitives.set_scalar(PrimitiveId::GetRaplEnergyUnit, D0, 32);
        assert_eq!(control.energy_unit().unwrap().status(), ReadStatus::Faulted);
        assert!(control.cache.lock().unit.is_none());

        primitives.set_scalar(PrimitiveId::GetRaplEnergyUnit, D0, MAX_ENERGY_UNIT_EXPONENT);
        assert_eq!(control.energy_unit().unwrap().fresh_value(), Some(0.5_f64.powi(31)));
    }

    #[test]
    fn v1_clear_during_read_keeps_cache_empty() {
        let primitives = Arc::new(MemoryPrimitives::new());
        primitives.set_scalar(PrimitiveId::GetRaplEnergyCounterWidth, D0, 32);
        let control = EnergyControlV1::new(context(&primitives));

        let reading = control.cached(
            |cache| &mut cache.width,
            || {
                control.clear_cached_data();
                Reading::fresh(32)
            },
        );
        assert_eq!(reading.fresh_value(), Some(32));
        assert!(control.cache.lock().width.is_none());

        primitives.set_scalar(PrimitiveId::GetRaplEnergyCounterWidth, D0, 48);
        assert_eq!(control.energy_counter_width().unwrap().fresh_value(), Some(48));
        assert_eq!(control.cache.lock().width, Some(48));
    }

    #[test]
    fn v1_absorbs_missing_and_faulted_primitives() {
        let primitives = Arc::new(MemoryPrimitives::new());
        primitives.set_scalar(PrimitiveId::GetRaplEnergyCounter, D0, 10);
        primitives.inject_fault(PrimitiveId::GetRaplEnergyCounter, D0);
        let control = EnergyControlV1::new(context(&primitives));

        let counter = control.energy_counter().unwrap();
        assert_eq!(counter.status(), ReadStatus::Faulted);
        assert_eq!(*counter.value(), 0);

        let width = control.energy_counter_width().unwrap();
        assert_eq!(width.status(), ReadStatus::Unsupported);

        let info = control.energy_counter_info().unwrap();
        assert_eq!(info.status(), ReadStatus::Faulted);
        assert_eq!(*info.value(), EnergyCounterInfo::default());

        assert_eq!(control.set_energy_threshold(5).unwrap(), WriteStatus::Unsupported);
    }

    #[test]
    fn v2_reads_binary_counter_info() {
        let primitives = Arc::new(MemoryPrimitives::new());
        primitives.set_buffer(PrimitiveId::GetRaplEnergyCounterInfo, D0, encode_counter_info(123_456));
        let control = EnergyControlV2::new(context(&primitives));

        let info = control.energy_counter_info().unwrap().fresh_value().unwrap();
        assert_eq!(info.energy_counter, 123_456);
        assert!(info.timestamp_us > 0);

        let err = control.energy_unit().unwrap_err();
        assert!(matches!(err, ControlError::NotImplemented { version: 2, operation: "energy_unit", .. }));
    }

    #[test]
    fn v2_short_buffer_is_a_fault() {
        let primitives = Arc::new(MemoryPrimitives::new());
        primitives.set_buffer(PrimitiveId::GetRaplEnergyCounterInfo, D0, vec![0u8; 4]);
        let control = EnergyControlV2::new(context(&primitives));

        assert_eq!(control.energy_counter_info().unwrap().status(), ReadStatus::Faulted);
    }

    #[test]
    fn threshold_interrupt_disable_writes_zero() {
        let primitives = Arc::new(MemoryPrimitives::new());
        primitives.set_scalar(PrimitiveId::SetEnergyThresholdCount, D0, 900);
        let control = EnergyControlV2::new(context(&primitives));

        assert_eq!(control.disable_energy_threshold_interrupt().unwrap(), WriteStatus::Applied);
        assert_eq!(primitives.scalar(PrimitiveId::SetEnergyThresholdCount, D0), Some(0));
    }

    #[test]
    fn v2_diagnostics_report_version_only() {
        let primitives = Arc::new(MemoryPrimitives::new());
        let control = EnergyControlV2::new(context(&primitives));
        let diag = control.diagnostics();
        assert_eq!(diag.control_name, "Energy Control");
        assert_eq!(diag.control_knob_version, "002");
        assert!(diag.fields.is_empty());
    }
}
