use std::borrow::Cow;

/// Errors raised by the event catalog and the activity bus.
#[ptf_derive::ptf_error]
#[derive(Clone, PartialEq, Eq)]
pub enum EventError {
    /// A raw event tag outside the catalog. Callers produced a tag the
    /// framework never defined; this is a defect, not a runtime condition.
    #[error("Unknown participant event tag {tag}{}", format_context(.context))]
    UnknownTag { tag: u32, context: Option<Cow<'static, str>> },

    /// An event name that does not match any catalog entry.
    #[error("Unknown participant event name{}: {message}", format_context(.context))]
    UnknownName { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Bus capacity must be greater than zero.
    #[error("Invalid capacity{}: {message}", format_context(.context))]
    InvalidCapacity { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
