//! Error types for the pagestore storage layer.

use std::fmt;
use std::io;

/// The result type used throughout pagestore.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for pagestore operations.
#[derive(Debug)]
pub enum Error {
    /// An I/O error occurred.
    Io(io::Error),

    /// An invalid argument was provided (unknown page type, undersized
    /// buffer, zero-length row, out-of-range page size).
    InvalidArgument(String),

    /// A decoded page header failed a sanity check.
    CorruptHeader(String),

    /// Allocation was requested at a page number that does not
    /// immediately follow the current end of the file.
    NonSequentialPage {
        /// The page number the caller asked for.
        requested: u32,
        /// The only page number allocation would currently accept.
        expected: u32,
    },

    /// The row does not fit in the page's remaining contiguous space.
    PageFull {
        /// Size of the row that was being inserted.
        row_size: usize,
        /// Contiguous free bytes available for row data plus its slot.
        available: usize,
    },

    /// A slot index referenced a nonexistent or deleted slot.
    InvalidSlot(String),

    /// The requested page lies past the end of the file.
    PageNotFound(u32),

    /// A checksum mismatch was detected.
    ChecksumMismatch {
        /// The expected checksum value.
        expected: u32,
        /// The actual checksum value.
        actual: u32,
    },
}

impl Error {
    /// Creates a new invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Creates a new corrupt header error.
    pub fn corrupt_header(msg: impl Into<String>) -> Self {
        Error::CorruptHeader(msg.into())
    }

    /// Creates a new invalid slot error.
    pub fn invalid_slot(msg: impl Into<String>) -> Self {
        Error::InvalidSlot(msg.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::CorruptHeader(msg) => write!(f, "Corrupt page header: {}", msg),
            Error::NonSequentialPage { requested, expected } => write!(
                f,
                "Non-sequential page allocation: requested page {}, expected page {}",
                requested, expected
            ),
            Error::PageFull { row_size, available } => write!(
                f,
                "Page full: row of {} bytes does not fit in {} available bytes",
                row_size, available
            ),
            Error::InvalidSlot(msg) => write!(f, "Invalid slot: {}", msg),
            Error::PageNotFound(page_number) => {
                write!(f, "Page not found: page {} is past end of file", page_number)
            }
            Error::ChecksumMismatch { expected, actual } => {
                write!(f, "Checksum mismatch: expected {:#x}, got {:#x}", expected, actual)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
