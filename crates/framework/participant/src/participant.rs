use crate::domain::{Domain, DomainStatus};
use crate::error::ParticipantError;
use crate::primitive::PrimitiveAccess;
use ptf_domain::config::{CapabilityVersions, ParticipantConfig};
use ptf_domain::{DomainIndex, ParticipantIndex};
use ptf_events::{EventScope, FrameworkEvent};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, trace};

/// Participant-specific side effects run after the common event handling.
pub trait ParticipantExtension: fmt::Debug + Send + Sync {
    fn on_event(
        &self,
        participant: &Participant,
        event: FrameworkEvent,
        domain: Option<DomainIndex>,
    ) -> Result<(), ParticipantError>;
}

/// A modeled hardware device owning its domains.
#[derive(Debug)]
pub struct Participant {
    index: ParticipantIndex,
    name: String,
    domains: Vec<Domain>,
    primitives: Arc<dyn PrimitiveAccess>,
    extension: Option<Box<dyn ParticipantExtension>>,
    activity_logging: AtomicBool,
}

/// Status export of one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantStatus {
    pub index: ParticipantIndex,
    pub name: String,
    pub activity_logging: bool,
    pub domains: Vec<DomainStatus>,
}

/// Describes a participant before the registry assigns its index.
#[must_use = "builders do nothing unless passed to the registry"]
#[derive(Debug)]
pub struct ParticipantBuilder {
    name: String,
    domains: Vec<(String, CapabilityVersions)>,
    primitives: Arc<dyn PrimitiveAccess>,
    extension: Option<Box<dyn ParticipantExtension>>,
}

impl ParticipantBuilder {
    pub fn new(name: impl Into<String>, primitives: Arc<dyn PrimitiveAccess>) -> Self {
        Self { name: name.into(), domains: Vec::new(), primitives, extension: None }
    }

    /// Takes name and domain list from a `[[platform.participants]]` entry.
    pub fn from_config(config: &ParticipantConfig, primitives: Arc<dyn PrimitiveAccess>) -> Self {
        config
            .domains
            .iter()
            .fold(Self::new(config.name.clone(), primitives), |builder, d| builder.domain(d.name.clone(), d.controls))
    }

    /// Appends a domain; its index is its position.
    pub fn domain(mut self, name: impl Into<String>, versions: CapabilityVersions) -> Self {
        self.domains.push((name.into(), versions));
        self
    }

    pub fn extension(mut self, extension: impl ParticipantExtension + 'static) -> Self {
        self.extension = Some(Box::new(extension));
        self
    }

    pub fn build(self, index: ParticipantIndex) -> Participant {
        let domains = (0u32..)
            .zip(self.domains)
            .map(|(raw, (name, versions))| Domain::new(index, DomainIndex::new(raw), name, &versions, &self.primitives))
            .collect();

        Participant {
            index,
            name: self.name,
            domains,
            primitives: self.primitives,
            extension: self.extension,
            activity_logging: AtomicBool::new(false),
        }
    }
}

impl Participant {
    pub const fn index(&self) -> ParticipantIndex {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domains(&self) -> &[Domain] {
        &self.domains
    }

    pub fn primitives(&self) -> &Arc<dyn PrimitiveAccess> {
        &self.primitives
    }

    /// Resolves a domain handle at the moment of use.
    pub fn domain(&self, index: DomainIndex) -> Result<&Domain, ParticipantError> {
        usize::try_from(index.get()).ok().and_then(|i| self.domains.get(i)).ok_or(
            ParticipantError::InvalidDomain { participant: self.index, domain: index, context: None },
        )
    }

    pub fn activity_logging_enabled(&self) -> bool {
        self.activity_logging.load(Ordering::Acquire)
    }

    /// Applies the participant-side effects of an event.
    ///
    /// Domain-scoped events must name an existing domain. Capability changes
    /// drop that domain's cached data, suspend/resume drop all of it, and the
    /// activity-logging events toggle publishing on every control.
    pub fn handle_event(&self, event: FrameworkEvent, domain: Option<DomainIndex>) -> Result<(), ParticipantError> {
        trace!(participant = %self.index, %event, ?domain, "Participant handling event");

        if event.scope() == EventScope::Domain {
            let index = domain.ok_or(ParticipantError::MissingDomain { event, context: None })?;
            let target = self.domain(index)?;
            if invalidates_cached_data(event) {
                debug!(participant = %self.index, domain = %index, %event, "Clearing cached domain data");
                target.clear_cached_data();
            }
        } else {
            match event {
                FrameworkEvent::Suspend | FrameworkEvent::Resume => self.clear_cached_data(),
                FrameworkEvent::ParticipantActivityLoggingEnabled => self.set_activity_logging(true),
                FrameworkEvent::ParticipantActivityLoggingDisabled => self.set_activity_logging(false),
                _ => {},
            }
        }

        match &self.extension {
            Some(extension) => extension.on_event(self, event, domain),
            None => Ok(()),
        }
    }

    pub fn clear_cached_data(&self) {
        self.domains.iter().for_each(Domain::clear_cached_data);
    }

    /// Toggles activity publishing; enabling publishes one snapshot per control.
    pub fn set_activity_logging(&self, enabled: bool) {
        self.activity_logging.store(enabled, Ordering::Release);
        for domain in &self.domains {
            domain.set_activity_logging(enabled);
            if enabled {
                domain.publish_activity();
            }
        }
        info!(participant = %self.index, name = %self.name, enabled, "Activity logging toggled");
    }

    pub fn status(&self) -> ParticipantStatus {
        ParticipantStatus {
            index: self.index,
            name: self.name.clone(),
            activity_logging: self.activity_logging_enabled(),
            domains: self.domains.iter().map(Domain::status).collect(),
        }
    }
}

/// Events after which a domain's cached control data is stale.
const fn invalidates_cached_data(event: FrameworkEvent) -> bool {
    matches!(
        event,
        FrameworkEvent::DomainCoreControlCapabilityChanged
            | FrameworkEvent::DomainDisplayControlCapabilityChanged
            | FrameworkEvent::DomainPerformanceControlCapabilityChanged
            | FrameworkEvent::DomainPerformanceControlsChanged
            | FrameworkEvent::DomainPowerControlCapabilityChanged
            | FrameworkEvent::DomainFanCapabilityChanged
            | FrameworkEvent::DomainSocWorkloadClassificationChanged
    )
}
