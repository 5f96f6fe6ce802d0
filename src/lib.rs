//! # pagestore - A Fixed-Size Slotted-Page Storage Layer
//!
//! pagestore is the disk I/O foundation for a database engine: it allocates
//! fixed-size pages within a file, lays out each page's internal structure
//! (header, slot directory, free space, row data), and inserts, reads, and
//! deletes rows within a page without ever shifting existing row bytes.
//!
//! ## Architecture
//!
//! The storage layer consists of several key components, leaves first:
//!
//! - **PageCodec** ([`page::codec`]): the fixed 9-byte binary header, a
//!   permanent little-endian on-disk contract
//! - **SlotDirectory** ([`page::slots`]): (offset, length) entries locating
//!   rows, growing downward from the header
//! - **Page** ([`page::layout`]): the row-level contract on one buffer,
//!   with row data growing upward from the page's end
//! - **FileStore** ([`store`]): maps page numbers to file offsets with
//!   strictly sequential, append-only allocation
//!
//! Higher layers such as B-trees, buffer pools, and write-ahead logging
//! consume these operations; none of them are implemented here.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pagestore::{FileStore, Options, PageType};
//!
//! # fn main() -> Result<(), pagestore::Error> {
//! // Open or create a page file. Page 0 is the Meta page.
//! let store = FileStore::open("./table.pgs", Options::default())?;
//!
//! // Allocate the next page and fill it with rows.
//! let mut page = store.allocate_page(store.num_pages(), PageType::Table)?;
//! let slot = page.insert_row(b"hello")?;
//! page.insert_row(b"world!")?;
//! store.write_page(&page)?;
//!
//! // Read it back through the file.
//! let page = store.read_page(page.page_number())?;
//! assert_eq!(page.read_row(slot)?, b"hello");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Module declarations
pub mod config;
pub mod error;
pub mod page;
pub mod store;

// Re-exports
pub use config::Options;
pub use error::{Error, Result};
pub use page::{Page, PageHeader, PageType, Slot};
pub use store::FileStore;
