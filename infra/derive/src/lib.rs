#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros for the framework crates.
//!
//! ## Usage
//! ```toml
//! [dependencies]
//! ptf-derive.workspace = true
//! thiserror.workspace = true
//! ```

mod macros {
    pub mod error;
}

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Attribute macro for defining framework error enums.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]`.
/// * **Context Support**: Generates a companion `...Ext` trait that adds `.context()`
///   to any `Result` that can be converted into this error type.
/// * **Standard Conversions**: Implements `From<T>` for variants containing a `source` field,
///   enabling the use of the `?` operator for upstream errors.
/// * **Internal Fallback**: Provides `From<&'static str>` and `From<String>`
///   if an `Internal` variant is present.
/// * **Kind Tag**: Generates `kind(&self) -> &'static str` returning the variant name,
///   used as a structured field when the error is logged.
///
/// # Requirements
///
/// 1. The macro must be applied to an **enum**.
/// 2. Variants that support context must include a `context: Option<Cow<'static, str>>` field.
/// 3. Variants wrapping other errors must include a `source: T` field or a field marked
///    with `#[source]`/`#[from]`, and must also carry a `context` field.
/// 4. Tuple or unit variants are rejected.
///
/// # Example
///
/// ```rust,ignore
/// use ptf_derive::ptf_error;
/// use std::borrow::Cow;
///
/// #[ptf_error]
/// pub enum PrimitiveError {
///     #[error("Primitive not found{}: {message}", format_context(.context))]
///     NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn read() -> Result<u32, PrimitiveError> {
///     Err("bus timeout".into())
/// }
///
/// assert_eq!(read().unwrap_err().kind(), "Internal");
/// ```
#[proc_macro_attribute]
pub fn ptf_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}
