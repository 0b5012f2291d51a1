//! Error types and handling infrastructure for rpager.
//!
//! Custom error variants use `thiserror`; application-level wiring in `main`
//! uses `anyhow` for context. Recoverable conditions (missing sources,
//! malformed patterns, out-of-range seeks) are surfaced to the user as
//! transient status-line messages by the session; only the variants below
//! propagate as `Err`.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for rpager operations.
#[derive(Error, Debug)]
pub enum PagerError {
    /// A source could not be opened because it does not exist.
    ///
    /// Recoverable for every source after the first: the registry drops the
    /// source and falls back. Fatal only when no source at all can be opened.
    #[error("{name} not found!")]
    SourceNotFound { name: String },

    /// Path exists but is not a regular file
    #[error("Path is not a regular file: {path}")]
    NotAFile { path: PathBuf },

    /// Search or filter regex failed to compile. The message is a single
    /// diagnostic line suitable for the status row.
    #[error("Invalid pattern: {message}")]
    Pattern { message: String },

    /// Cooperative cancellation fired during a blocked read or at a loop
    /// checkpoint. Unwinds the session; terminal state is restored on the way
    /// out.
    #[error("operation interrupted")]
    Interrupted,

    /// Terminal setup, painting, or size query failed
    #[error("Terminal operation failed: {message}")]
    Terminal { message: String },

    /// The session was started without any source to display
    #[error("No sources")]
    NoSources,

    /// Underlying I/O failure while reading a source stream
    #[error("IO operation failed")]
    Io(#[from] std::io::Error),
}

/// Standard Result type for rpager operations.
pub type Result<T> = std::result::Result<T, PagerError>;

impl PagerError {
    /// Create a SourceNotFound error for the named source
    pub fn source_not_found(name: impl Into<String>) -> Self {
        Self::SourceNotFound { name: name.into() }
    }

    /// Create a Pattern error, keeping only the first line of the diagnostic
    pub fn pattern(message: impl Into<String>) -> Self {
        let message = message.into();
        let first_line = message.lines().next().unwrap_or_default().to_string();
        Self::Pattern {
            message: first_line,
        }
    }

    /// Create a Terminal error with a descriptive message
    pub fn terminal(message: impl Into<String>) -> Self {
        Self::Terminal {
            message: message.into(),
        }
    }

    /// True when this error came from cooperative cancellation, either
    /// directly or through an interrupted stream read.
    pub fn is_interrupted(&self) -> bool {
        match self {
            Self::Interrupted => true,
            Self::Io(err) => err.kind() == std::io::ErrorKind::Interrupted,
            _ => false,
        }
    }
}
