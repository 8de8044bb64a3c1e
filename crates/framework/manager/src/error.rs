use std::borrow::Cow;

#[ptf_derive::ptf_error]
pub enum DispatchError {
    /// The dispatch worker no longer accepts work items.
    #[error("Work queue is closed{}", format_context(.context))]
    QueueClosed { context: Option<Cow<'static, str>> },

    /// The dispatch worker thread could not be started.
    #[error("Failed to spawn dispatch worker{}: {source}", format_context(.context))]
    Spawn { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Dispatch worker panicked{}", format_context(.context))]
    WorkerPanicked { context: Option<Cow<'static, str>> },
}
