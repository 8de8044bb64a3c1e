use crate::capability::Capability;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level framework configuration.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FrameworkConfigInner {
    pub logging: LoggingConfig,
    pub dispatch: DispatchConfig,
    pub platform: PlatformConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct FrameworkConfig {
    #[serde(flatten, default)]
    inner: Arc<FrameworkConfigInner>,
}

impl Deref for FrameworkConfig {
    type Target = FrameworkConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for FrameworkConfig {
    fn deref_mut(&mut self) -> &mut FrameworkConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub name: String,
    /// One of `trace`, `debug`, `info`, `warn`, `error`, `off`.
    pub level: String,
    pub console: bool,
    pub directory: Option<PathBuf>,
    pub json: bool,
    pub max_files: usize,
    /// Extra directives, e.g. `ptf_manager=debug`.
    pub filter: Option<String>,
}

/// Dispatch worker settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    pub thread_name: String,
    /// Pending work items above this depth are reported at warn level.
    pub queue_warn_depth: usize,
}

/// Participants the daemon models when no real hardware bridge is attached.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub participants: Vec<ParticipantConfig>,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ParticipantConfig {
    pub name: String,
    pub domains: Vec<DomainConfig>,
}

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DomainConfig {
    pub name: String,
    pub controls: CapabilityVersions,
    /// Scalar primitive values keyed by primitive name.
    pub primitives: BTreeMap<String, u32>,
    /// Binary primitive payloads keyed by primitive name.
    pub buffers: BTreeMap<String, Vec<u8>>,
}

/// Implementation version selected per capability family; `None` leaves the
/// family absent from the domain.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CapabilityVersions {
    pub energy_control: Option<u32>,
    pub soc_workload_classification: Option<u32>,
    pub participant_set_specific_info: Option<u32>,
}

impl CapabilityVersions {
    #[must_use]
    pub const fn version(&self, capability: Capability) -> Option<u32> {
        match capability {
            Capability::EnergyControl => self.energy_control,
            Capability::SocWorkloadClassification => self.soc_workload_classification,
            Capability::ParticipantSetSpecificInfo => self.participant_set_specific_info,
        }
    }
}

// --- Default ---

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            name: "ptf".to_owned(),
            level: "info".to_owned(),
            console: true,
            directory: None,
            json: false,
            max_files: 10,
            filter: None,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self { thread_name: "ptf-dispatch".to_owned(), queue_warn_depth: 256 }
    }
}
