//! Common error types used across the workspace.
//!
//! [`LampError`] is the top-level error. Each layer defines its own typed
//! errors and converts via `#[from]`; adapters box their errors into the
//! [`Transport`](LampError::Transport) or [`Storage`](LampError::Storage)
//! variants.

/// Top-level error type for lampctl operations.
#[derive(Debug, thiserror::Error)]
pub enum LampError {
    /// The command line could not be compiled into an action.
    #[error("invalid command: {0}")]
    Command(#[from] CommandError),

    /// A device state query did not complete.
    #[error("state query failed: {0}")]
    Query(#[from] QueryError),

    /// The light transport failed (socket, unknown device, …).
    #[error("transport error")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The snapshot store failed (I/O, malformed file, …).
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Another command run currently holds the session.
    #[error("another command is already running")]
    Busy,
}

/// Reasons a token sequence fails to compile into a command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// No tokens at all.
    #[error("no action defined")]
    Empty,

    /// A leading adverb was not followed by a verb.
    #[error("no verb defined after `{0}`")]
    MissingVerb(String),

    /// The verb token is not a known verb or alias.
    #[error("no verb recognized in `{0}`")]
    UnknownVerb(String),

    /// An adverb was used with a verb that does not take one.
    #[error("`{adverb}` cannot modify `{verb}`")]
    AdverbNotApplicable {
        adverb: &'static str,
        verb: &'static str,
    },

    /// A clause the verb requires is absent or empty.
    #[error("`{verb}` requires an `{clause}` clause")]
    MissingClause {
        verb: &'static str,
        clause: &'static str,
    },

    /// A color component is neither decimal nor `0x` hexadecimal.
    #[error("invalid number `{0}`")]
    InvalidNumber(String),

    /// The color name is not in the named-color table.
    #[error("unknown color name `{0}`")]
    UnknownColor(String),
}

/// Failures of the single-device state query protocol.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// No report from the device after exhausting every retry.
    #[error("no state reported by `{device}` after {attempts} attempts")]
    Timeout { device: String, attempts: u32 },

    /// The transport stopped publishing state reports.
    #[error("state reports closed while waiting for `{device}`")]
    Closed { device: String },
}
