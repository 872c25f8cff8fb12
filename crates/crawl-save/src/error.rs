//! Package error types

use thiserror::Error;

/// Error type for save package decoding
#[derive(Debug, Error)]
pub enum FormatError {
    /// File header missing, short, or carrying the wrong magic
    #[error("not a crawl save file")]
    NotAPackage,

    /// Package format version this reader does not decode
    #[error("unsupported package version: {0}")]
    UnsupportedVersion(u8),

    /// A block, field, or string extends past the available bytes
    #[error("save file truncated: {0}")]
    Truncated(String),

    /// Structurally invalid data
    #[error("save file corrupted: {0}")]
    Corrupt(String),

    /// A chunk required by the operation is not in the directory
    #[error("missing chunk: {0}")]
    MissingChunk(String),

    /// `read_all` exceeded the configured chunk size limit
    #[error("chunk exceeds size limit of {limit} bytes")]
    ChunkTooLarge {
        /// Configured limit in bytes
        limit: usize,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary parsing error
    #[error("binary parsing error: {0}")]
    BinRw(#[from] binrw::Error),
}

impl FormatError {
    /// Whether this error reports truncated input
    pub const fn is_truncated(&self) -> bool {
        matches!(self, Self::Truncated(_))
    }

    /// Whether this error reports corrupted input
    pub const fn is_corrupt(&self) -> bool {
        matches!(self, Self::Corrupt(_))
    }
}

impl From<FormatError> for std::io::Error {
    fn from(err: FormatError) -> Self {
        match err {
            FormatError::Io(e) => e,
            other => Self::new(std::io::ErrorKind::InvalidData, other),
        }
    }
}

/// Result type for package operations
pub type FormatResult<T> = Result<T, FormatError>;
