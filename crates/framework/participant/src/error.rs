use ptf_domain::{DomainIndex, ParticipantIndex};
use ptf_events::FrameworkEvent;
use ptf_kernel::RegistryError;
use std::borrow::Cow;

#[ptf_derive::ptf_error]
pub enum ParticipantError {
    /// Lookup in the participant registry failed.
    #[error("Participant registry error{}: {source}", format_context(.context))]
    Registry { source: RegistryError, context: Option<Cow<'static, str>> },

    /// The participant exists but has no domain with this index.
    #[error("{participant} has no {domain}{}", format_context(.context))]
    InvalidDomain { participant: ParticipantIndex, domain: DomainIndex, context: Option<Cow<'static, str>> },

    /// A domain-scoped event arrived without a domain index.
    #[error("{event} requires a domain index{}", format_context(.context))]
    MissingDomain { event: FrameworkEvent, context: Option<Cow<'static, str>> },

    /// A participant-specific handler failed.
    #[error("Participant handler failed{}: {message}", format_context(.context))]
    Handler { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ParticipantError {
    /// True when a participant or domain handle did not resolve.
    #[must_use]
    pub const fn is_invalid_index(&self) -> bool {
        match self {
            Self::Registry { source, .. } => source.is_invalid_index(),
            Self::InvalidDomain { .. } => true,
            _ => false,
        }
    }
}
