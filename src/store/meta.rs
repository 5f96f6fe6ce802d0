//! Meta-page payload.
//!
//! Page 0 of every file is a Meta page whose first row holds the file-level
//! payload: a magic number, the format version, and the page size, guarded
//! by a CRC32. Opening an existing file reads the page size from here
//! instead of assuming a default, since the page size is fixed at create
//! time for the life of the file.

use crate::error::{Error, Result};
use crate::page::{MAX_PAGE_SIZE, MIN_PAGE_SIZE};
use bytes::{BufMut, BytesMut};

/// Magic number identifying a pagestore file ("PGST").
pub const META_MAGIC: u32 = 0x5047_5354;

/// On-disk format version written by this crate.
pub const META_FORMAT_VERSION: u16 = 1;

/// Encoded payload size in bytes.
pub const META_PAYLOAD_SIZE: usize = 14;

/// File-level metadata stored as row 0 of the Meta page.
///
/// Format:
/// ```text
/// [magic: u32 LE]       // offset 0
/// [version: u16 LE]     // offset 4
/// [page_size: u32 LE]   // offset 6
/// [crc32: u32 LE]       // offset 10, over bytes 0..10
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaPayload {
    /// Page size recorded for the file.
    pub page_size: usize,
}

impl MetaPayload {
    /// Create a payload for a file with the given page size.
    pub fn new(page_size: usize) -> Self {
        Self { page_size }
    }

    /// Encode the payload to its fixed 14-byte form.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(META_PAYLOAD_SIZE);
        buf.put_u32_le(META_MAGIC);
        buf.put_u16_le(META_FORMAT_VERSION);
        buf.put_u32_le(self.page_size as u32);

        let crc = crc32fast::hash(&buf);
        buf.put_u32_le(crc);

        debug_assert_eq!(buf.len(), META_PAYLOAD_SIZE);
        buf.to_vec()
    }

    /// Decode and verify a payload.
    ///
    /// Fails with `CorruptHeader` on a short buffer, wrong magic, unknown
    /// version, or an out-of-range page size, and with `ChecksumMismatch`
    /// when the stored CRC disagrees with the recomputed one.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < META_PAYLOAD_SIZE {
            return Err(Error::corrupt_header(format!(
                "meta payload of {} bytes, expected {}",
                data.len(),
                META_PAYLOAD_SIZE
            )));
        }

        let magic = u32::from_le_bytes(data[0..4].try_into().unwrap());
        if magic != META_MAGIC {
            return Err(Error::corrupt_header(format!(
                "invalid file magic: expected {:#x}, got {:#x}",
                META_MAGIC, magic
            )));
        }

        let version = u16::from_le_bytes(data[4..6].try_into().unwrap());
        if version != META_FORMAT_VERSION {
            return Err(Error::corrupt_header(format!(
                "unsupported format version {}",
                version
            )));
        }

        let stored_crc = u32::from_le_bytes(data[10..14].try_into().unwrap());
        let computed_crc = crc32fast::hash(&data[0..10]);
        if stored_crc != computed_crc {
            return Err(Error::ChecksumMismatch {
                expected: stored_crc,
                actual: computed_crc,
            });
        }

        let page_size = u32::from_le_bytes(data[6..10].try_into().unwrap()) as usize;
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(Error::corrupt_header(format!(
                "recorded page size {} out of range [{}, {}]",
                page_size, MIN_PAGE_SIZE, MAX_PAGE_SIZE
            )));
        }

        Ok(Self { page_size })
    }
}
