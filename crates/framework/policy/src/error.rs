use ptf_kernel::RegistryError;
use std::borrow::Cow;

#[ptf_derive::ptf_error]
pub enum PolicyError {
    /// Lookup in the policy registry failed.
    #[error("Policy registry error{}: {source}", format_context(.context))]
    Registry { source: RegistryError, context: Option<Cow<'static, str>> },

    /// The policy could not act on an event.
    #[error("Policy error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl PolicyError {
    #[must_use]
    pub const fn is_invalid_index(&self) -> bool {
        match self {
            Self::Registry { source, .. } => source.is_invalid_index(),
            Self::Internal { .. } => false,
        }
    }
}
