use crate::error::PolicyError;
use ptf_domain::{DomainIndex, ParticipantIndex, PolicyIndex};
use ptf_events::{EventScope, FrameworkEvent};
use serde::Serialize;
use std::fmt;

/// What a policy is told about one event occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PolicyEvent {
    pub event: FrameworkEvent,
    /// Absent for framework-scope events.
    pub participant: Option<ParticipantIndex>,
    /// Present only for domain-scoped events.
    pub domain: Option<DomainIndex>,
    /// The policy a `PolicyCreate` or `PolicyDestroy` is about.
    pub policy: Option<PolicyIndex>,
}

impl PolicyEvent {
    /// Drops `domain` unless the event is domain-scoped.
    #[must_use]
    pub fn new(event: FrameworkEvent, participant: ParticipantIndex, domain: Option<DomainIndex>) -> Self {
        let domain = domain.filter(|_| event.scope() == EventScope::Domain);
        Self { event, participant: Some(participant), domain, policy: None }
    }

    #[must_use]
    pub const fn framework(event: FrameworkEvent, policy: Option<PolicyIndex>) -> Self {
        Self { event, participant: None, domain: None, policy }
    }
}

impl fmt::Display for PolicyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.participant, self.domain, self.policy) {
            (Some(participant), Some(domain), _) => write!(f, "{} ({participant}, {domain})", self.event),
            (Some(participant), None, _) => write!(f, "{} ({participant})", self.event),
            (None, _, Some(policy)) => write!(f, "{} ({policy})", self.event),
            (None, _, None) => write!(f, "{}", self.event),
        }
    }
}

/// An independently loaded decision module.
///
/// Handlers run on the dispatch thread and are expected to return promptly.
/// An `Err` or a panic is logged by the dispatcher and does not affect
/// delivery to other policies.
pub trait Policy: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn on_event(&self, event: &PolicyEvent) -> Result<(), PolicyError>;
}
