//! Measurement and capability value types exchanged with controls.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Power in milliwatts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Power(u32);

impl Power {
    #[must_use]
    pub const fn from_milliwatts(mw: u32) -> Self {
        Self(mw)
    }

    #[must_use]
    pub const fn milliwatts(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Power {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:03}W", self.0 / 1000, self.0 % 1000)
    }
}

/// Temperature in tenths of a Kelvin, the resolution firmware reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Temperature(u32);

impl Temperature {
    const ZERO_CELSIUS_DECI_KELVIN: i64 = 2732;

    #[must_use]
    pub const fn from_deci_kelvin(dk: u32) -> Self {
        Self(dk)
    }

    /// Converts from whole degrees Celsius; values below absolute zero clamp to 0 K.
    #[must_use]
    pub fn from_celsius(celsius: i32) -> Self {
        let dk = i64::from(celsius) * 10 + Self::ZERO_CELSIUS_DECI_KELVIN;
        Self(u32::try_from(dk.max(0)).unwrap_or(u32::MAX))
    }

    #[must_use]
    pub const fn deci_kelvin(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dc = i64::from(self.0) - Self::ZERO_CELSIUS_DECI_KELVIN;
        let sign = if dc < 0 { "-" } else { "" };
        write!(f, "{sign}{}.{}C", dc.abs() / 10, dc.abs() % 10)
    }
}

/// Energy counter sample taken together with the time it was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EnergyCounterInfo {
    pub energy_counter: u64,
    pub timestamp_us: i64,
}

/// Workload class reported by the SoC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SocWorkload {
    Idle,
    SemiActive,
    Bursty,
    Sustained,
    BatteryLife,
    #[default]
    Unknown,
}

impl SocWorkload {
    /// Maps the raw firmware value; anything unrecognised is `Unknown`.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Self::Idle,
            1 => Self::SemiActive,
            2 => Self::Bursty,
            3 => Self::Sustained,
            4 => Self::BatteryLife,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        match self {
            Self::Idle => 0,
            Self::SemiActive => 1,
            Self::Bursty => 2,
            Self::Sustained => 3,
            Self::BatteryLife => 4,
            Self::Unknown => u32::MAX,
        }
    }
}

impl fmt::Display for SocWorkload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "Idle",
            Self::SemiActive => "Semi-Active",
            Self::Bursty => "Bursty",
            Self::Sustained => "Sustained",
            Self::BatteryLife => "Battery Life",
            Self::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// Cooling preference a participant can be told to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoolingPolicy {
    Active,
    Passive,
}

impl CoolingPolicy {
    #[must_use]
    pub const fn raw(self) -> u32 {
        match self {
            Self::Active => 0,
            Self::Passive => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_celsius_round_trip_display() {
        assert_eq!(Temperature::from_celsius(45).deci_kelvin(), 3182);
        assert_eq!(Temperature::from_celsius(45).to_string(), "45.0C");
        assert_eq!(Temperature::from_deci_kelvin(2722).to_string(), "-1.0C");
        assert_eq!(Temperature::from_celsius(-400).deci_kelvin(), 0);
    }

    #[test]
    fn power_display_uses_watts() {
        assert_eq!(Power::from_milliwatts(15_250).to_string(), "15.250W");
    }

    #[test]
    fn unknown_workload_values_fold_to_unknown() {
        assert_eq!(SocWorkload::from_raw(2), SocWorkload::Bursty);
        assert_eq!(SocWorkload::from_raw(99), SocWorkload::Unknown);
    }
}
