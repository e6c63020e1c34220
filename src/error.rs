//! Error types for redwire
//!
//! Provides a unified error type for all operations. Every expected failure
//! mode is an explicit variant; no panics on the error paths.

use thiserror::Error;

/// Result type alias using RedisError
pub type Result<T> = std::result::Result<T, RedisError>;

/// Unified error type for redwire operations
///
/// Transport-class errors (`Io`, `Connect`, `Protocol`) always tear down the
/// current handle; the next call on the connection reopens it. `Server`,
/// `Rejected` and `UnexpectedReply` leave the connection open.
#[derive(Debug, Error)]
pub enum RedisError {
    // -------------------------------------------------------------------------
    // Construction Errors
    // -------------------------------------------------------------------------
    /// Malformed endpoint specifier. Construction-time and irrecoverable:
    /// the client object never comes into existence.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller-supplied arguments failed a precondition. Detected before any
    /// network I/O; no connection state change.
    #[error("Invalid argument: {0}")]
    Validation(String),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed reply framing: unknown type sigil, missing CRLF, bad
    /// length line. Treated like an I/O failure.
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Command Errors
    // -------------------------------------------------------------------------
    /// A well-formed error reply from the server, surfaced verbatim.
    #[error("{0}")]
    Server(String),

    /// A well-formed reply indicating the operation did not take effect,
    /// e.g. `SET .. NX` against an existing key.
    #[error("{0}")]
    Rejected(String),

    /// A well-formed reply of a type the issued command does not expect.
    #[error("Unexpected reply: {0}")]
    UnexpectedReply(String),
}
