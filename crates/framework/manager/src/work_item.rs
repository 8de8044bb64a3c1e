use ptf_domain::{DomainIndex, ParticipantIndex, PolicyIndex};
use ptf_events::FrameworkEvent;
use serde::Serialize;
use std::fmt;

/// One queued notification: event kind, target participant, optional domain.
///
/// A value with no identity beyond its fields. It is consumed by exactly one
/// dispatch and never retried. Framework-scope items (policy lifecycle,
/// status queries) address no participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct WorkItem {
    event: FrameworkEvent,
    participant: Option<ParticipantIndex>,
    domain: Option<DomainIndex>,
    policy: Option<PolicyIndex>,
}

impl WorkItem {
    /// A participant-level notification.
    #[must_use]
    pub fn new(event: impl Into<FrameworkEvent>, participant: ParticipantIndex) -> Self {
        Self { event: event.into(), participant: Some(participant), domain: None, policy: None }
    }

    /// A notification addressed to one domain of a participant.
    #[must_use]
    pub fn for_domain(event: impl Into<FrameworkEvent>, participant: ParticipantIndex, domain: DomainIndex) -> Self {
        Self { event: event.into(), participant: Some(participant), domain: Some(domain), policy: None }
    }

    /// A framework-wide notification, e.g. `GetStatus`.
    #[must_use]
    pub const fn framework(event: FrameworkEvent) -> Self {
        Self { event, participant: None, domain: None, policy: None }
    }

    /// A policy lifecycle notification (`PolicyCreate`, `PolicyDestroy`).
    #[must_use]
    pub const fn for_policy(event: FrameworkEvent, policy: PolicyIndex) -> Self {
        Self { event, participant: None, domain: None, policy: Some(policy) }
    }

    pub const fn event(&self) -> FrameworkEvent {
        self.event
    }

    pub const fn participant(&self) -> Option<ParticipantIndex> {
        self.participant
    }

    pub const fn domain(&self) -> Option<DomainIndex> {
        self.domain
    }

    pub const fn policy(&self) -> Option<PolicyIndex> {
        self.policy
    }
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.participant, self.domain, self.policy) {
            (Some(p), Some(d), _) => write!(f, "{}@{}:{}", self.event, p.get(), d.get()),
            (Some(p), None, _) => write!(f, "{}@{}", self.event, p.get()),
            (None, _, Some(policy)) => write!(f, "{}@{policy}", self.event),
            (None, _, None) => write!(f, "{}", self.event),
        }
    }
}
