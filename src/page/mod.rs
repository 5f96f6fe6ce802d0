//! Slotted page implementation.
//!
//! A page is the smallest unit of data read from or written to disk. The
//! database never writes a single row at a time; it always reads and writes
//! full pages. Rows live inside a page behind a slot directory, so existing
//! row bytes never move when a row is inserted or deleted.
//!
//! ## Page Format
//!
//! ```text
//! +-------------------------+
//! |       Page Header       |  <- 9 bytes: number, type, count, free offset
//! +-------------------------+
//! |     Slot Directory      |  <- (offset, length) pairs, grows downward
//! +-------------------------+
//! |       Free Space        |  <- shrinks from both ends
//! +-------------------------+
//! |        Row Data         |  <- raw row bytes, grows upward from the end
//! +-------------------------+
//! ```
//!
//! ## Header Format
//!
//! All multi-byte fields are little-endian, for the life of the file:
//!
//! ```text
//! [page_number: u32]        // offset 0
//! [page_type: u8]           // offset 4: 0=Meta, 1=Table, 2=Overflow
//! [record_count: u16]       // offset 5
//! [free_space_offset: u16]  // offset 7: where the next row's data ends
//! ```
//!
//! ## Slot Format
//!
//! Each slot is 4 bytes: `[row_offset: u16][row_length: u16]`. A length of
//! zero marks the slot as a tombstone; the slot keeps its index and no other
//! slot or row byte is shifted.

pub mod codec;
pub mod layout;
pub mod slots;

pub use codec::{PageHeader, PageType};
pub use layout::Page;
pub use slots::Slot;

/// Fixed page header size in bytes
pub const PAGE_HEADER_SIZE: usize = 9;

/// Size of one slot directory entry in bytes
pub const SLOT_SIZE: usize = 4;

/// Default page size for newly created files (16KB)
pub const DEFAULT_PAGE_SIZE: usize = 16 * 1024;

/// Smallest supported page size
pub const MIN_PAGE_SIZE: usize = 64;

/// Largest supported page size; intra-page offsets must fit in u16
pub const MAX_PAGE_SIZE: usize = 32 * 1024;
