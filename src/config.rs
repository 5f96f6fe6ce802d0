//! Configuration options for the pagestore storage layer.

use crate::error::{Error, Result};
use crate::page::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, MIN_PAGE_SIZE, PAGE_HEADER_SIZE, SLOT_SIZE};

/// Configuration options for creating or opening a page file.
#[derive(Debug, Clone)]
pub struct Options {
    /// Page size in bytes for a newly created file.
    ///
    /// Fixed for the lifetime of the file; when opening an existing file
    /// this value is ignored and the size recorded in the Meta page wins.
    /// Default: 16KB
    pub page_size: usize,

    /// Create the file if it doesn't exist.
    /// Default: true
    pub create_if_missing: bool,

    /// Error if the file already exists.
    /// Default: false
    pub error_if_exists: bool,

    /// Sync page writes to disk.
    /// Disabling reduces durability but increases performance.
    /// Default: true
    pub sync_writes: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            create_if_missing: true,
            error_if_exists: false,
            sync_writes: true,
        }
    }
}

impl Options {
    /// Validate the options, returning `InvalidArgument` on a page size
    /// that cannot be represented by the u16 header fields or is too
    /// small to hold the header, one slot, and any row data.
    pub fn validate(&self) -> Result<()> {
        if self.page_size < MIN_PAGE_SIZE || self.page_size > MAX_PAGE_SIZE {
            return Err(Error::invalid_argument(format!(
                "page size {} out of range [{}, {}]",
                self.page_size, MIN_PAGE_SIZE, MAX_PAGE_SIZE
            )));
        }
        Ok(())
    }

    /// Largest row that fits in an otherwise empty page of this size.
    pub fn max_row_size(&self) -> usize {
        self.page_size - PAGE_HEADER_SIZE - SLOT_SIZE
    }
}
