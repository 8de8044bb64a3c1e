//! Opaque registry handles.
//!
//! Indices are assigned monotonically by the owning registry and are never
//! reused, so a handle either names its original entry or nothing at all.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Common surface of the integer handles issued by a registry.
pub trait RegistryIndex: Copy + Ord + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// Human-readable handle family, e.g. `"participant"`.
    const KIND: &'static str;

    fn from_raw(raw: u32) -> Self;

    fn raw(self) -> u32;
}

macro_rules! registry_index {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            #[must_use]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            #[must_use]
            pub const fn get(self) -> u32 {
                self.0
            }
        }

        impl RegistryIndex for $name {
            const KIND: &'static str = $kind;

            fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            fn raw(self) -> u32 {
                self.0
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", $kind, self.0)
            }
        }
    };
}

registry_index!(
    /// Handle of a detected hardware participant.
    ParticipantIndex,
    "participant"
);

registry_index!(
    /// Handle of a domain, unique within its owning participant.
    DomainIndex,
    "domain"
);

registry_index!(
    /// Handle of a loaded policy.
    PolicyIndex,
    "policy"
);
