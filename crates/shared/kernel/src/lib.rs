//! Kernel utilities shared across the framework crates.
//! Keep this crate lightweight: layered config loading and the index-based
//! registry that backs the participant and policy managers.
//!
//! ## Config loading
//! ```rust,ignore
//! use ptf_kernel::config::load_config;
//! use ptf_kernel::domain::config::FrameworkConfig;
//!
//! let cfg: FrameworkConfig = load_config(Some("ptf.toml")).unwrap();
//! ```
pub mod config;
pub mod registry;

pub use ptf_domain as domain;
pub use registry::{IndexedRegistry, RegistryError, RegistryErrorExt};
