//! # Policies
//!
//! The [`Policy`] contract consumed by the dispatch engine and the
//! [`PolicyManager`] registry that owns loaded policies.

mod error;
mod manager;
mod policy;

pub use crate::error::{PolicyError, PolicyErrorExt};
pub use crate::manager::PolicyManager;
pub use crate::policy::{Policy, PolicyEvent};
