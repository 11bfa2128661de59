//! Error types for the protocol crate.

use thiserror::Error;

/// Convenience alias for results carrying a [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Errors raised while framing or parsing protocol lines.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error surfaced through the line codec.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The line was empty once its terminator was stripped.
    #[error("empty line")]
    Empty,

    /// The line carried a prefix but no command.
    #[error("missing command")]
    MissingCommand,
}

/// Errors raised when compiling a glob mask.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaskError {
    /// The pattern was empty.
    #[error("empty mask pattern")]
    Empty,

    /// The pattern contained `**`.
    #[error("mask pattern contains consecutive wildcards: {0}")]
    ConsecutiveWildcards(String),

    /// The pattern could not be compiled (for instance it is too large).
    #[error("mask pattern rejected: {0}")]
    Rejected(String),
}
