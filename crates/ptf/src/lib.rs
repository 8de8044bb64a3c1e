//! Facade crate for the platform thermal framework.
//! Re-exports the framework crates and wires configured platforms into a
//! running [`manager::Framework`].
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Add `ptf` (the `logger` feature is on by default).
//! - Start a [`manager::Framework`] and call [`platform::populate`] with the
//!   `[platform]` section of the configuration.

pub use ptf_domain as domain;
pub use ptf_events as events;
pub use ptf_kernel as kernel;
#[cfg(feature = "logger")]
pub use ptf_logger as logger;
pub use ptf_manager as manager;
pub use ptf_participant as participant;
pub use ptf_policy as policy;

pub mod platform;

/// Build-time enabled features (by Cargo feature).
pub mod features {
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "logger")]
        "logger",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}
