//! Error types shared by every codec in the workspace
//!
//! Parsing and serialization fail in exactly three ways: the input ran out
//! (`Eof`), memory could not be obtained (`Alloc`), or the bytes do not
//! describe a valid structure (`Corrupt`). All three are terminal for the
//! current operation; nothing in this workspace retries or resynchronizes.

use thiserror::Error;

/// Result type alias for codec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the codecs
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Requested span exceeds the remaining input
    #[error("unexpected end of input at offset {offset:#x}: need {need} bytes, have {have}")]
    Eof {
        /// Cursor position when the read was attempted
        offset: usize,
        /// Bytes the read required
        need: usize,
        /// Bytes left in the input
        have: usize,
    },

    /// Buffer or arena growth failed, or a capacity computation overflowed
    #[error("allocation failed: {0}")]
    Alloc(String),

    /// Input bytes are structurally invalid
    #[error("corrupt data at offset {offset:#x}: {reason}")]
    Corrupt {
        /// Cursor position where the problem was detected
        offset: usize,
        /// What was wrong
        reason: String,
    },
}

/// Category of an [`Error`], without its context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::Eof`]
    Eof,
    /// See [`Error::Alloc`]
    Alloc,
    /// See [`Error::Corrupt`]
    Corrupt,
}

impl Error {
    /// Create a corruption error at `offset`
    pub fn corrupt(offset: usize, reason: impl Into<String>) -> Self {
        Error::Corrupt {
            offset,
            reason: reason.into(),
        }
    }

    /// Create an allocation error
    pub fn alloc(msg: impl Into<String>) -> Self {
        Error::Alloc(msg.into())
    }

    /// The category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Eof { .. } => ErrorKind::Eof,
            Error::Alloc(_) => ErrorKind::Alloc,
            Error::Corrupt { .. } => ErrorKind::Corrupt,
        }
    }

    /// Check if this is an end-of-input error
    pub fn is_eof(&self) -> bool {
        self.kind() == ErrorKind::Eof
    }

    /// Check if this is a corruption error
    pub fn is_corrupt(&self) -> bool {
        self.kind() == ErrorKind::Corrupt
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(e: std::collections::TryReserveError) -> Self {
        Error::Alloc(e.to_string())
    }
}
