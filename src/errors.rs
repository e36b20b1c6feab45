//! Operation failures.

/// Failures surfaced by agent configuration operations.
///
/// These travel inside `failure::Error` and can be recovered
/// with `downcast_ref`.
#[derive(Debug, Fail, PartialEq)]
pub(crate) enum LcmError {
    /// The agent on the target could not be reached.
    #[fail(display = "target '{}' unreachable: {}", host, reason)]
    TargetUnreachable { host: String, reason: String },

    /// A referenced partial configuration does not exist.
    #[fail(display = "partial configuration '{}' not found", _0)]
    NotFound(String),

    /// A partial configuration with the same name already exists.
    #[fail(display = "partial configuration '{}' already exists", _0)]
    DuplicateName(String),

    /// The compiler rejected the synthesized document.
    #[fail(display = "failed to compile document: {}", _0)]
    Compilation(String),

    /// The agent rejected the compiled document.
    #[fail(display = "failed to apply document: {}", _0)]
    Apply(String),
}
