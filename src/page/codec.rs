//! Page header codec.
//!
//! Translates between in-memory header fields and the fixed 9-byte on-disk
//! layout. The byte order (little-endian) is a permanent on-disk contract:
//! every field of every page uses it for the life of a file, regardless of
//! the host platform's native representation.

use crate::error::{Error, Result};
use crate::page::PAGE_HEADER_SIZE;

/// The role of a page within the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PageType {
    /// File-level metadata. Page 0 is always a Meta page.
    Meta = 0,
    /// Table rows.
    Table = 1,
    /// Reserved for rows too large for a single page.
    Overflow = 2,
}

impl PageType {
    /// Convert from the on-disk type byte.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(PageType::Meta),
            1 => Some(PageType::Table),
            2 => Some(PageType::Overflow),
            _ => None,
        }
    }
}

/// Decoded form of the fixed-width region at the start of every page.
///
/// Format (all little-endian):
/// ```text
/// [page_number: u32]        // offset 0
/// [page_type: u8]           // offset 4
/// [record_count: u16]       // offset 5
/// [free_space_offset: u16]  // offset 7
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    /// Logical page number; page n lives at byte offset n * page_size.
    pub page_number: u32,
    /// Role of the page.
    pub page_type: PageType,
    /// Number of slots in the directory, tombstones included.
    pub record_count: u16,
    /// Byte offset within the page where the lowest row's data starts;
    /// the next row is written ending here. Decreases as rows are added.
    pub free_space_offset: u16,
}

impl PageHeader {
    /// Create a header for a freshly formatted page of `page_size` bytes.
    pub fn new(page_number: u32, page_type: PageType, page_size: usize) -> Self {
        Self {
            page_number,
            page_type,
            record_count: 0,
            free_space_offset: page_size as u16,
        }
    }

    /// Encode the header into the first [`PAGE_HEADER_SIZE`] bytes of `buf`.
    ///
    /// Fails with `InvalidArgument` if the buffer is too short.
    pub fn encode_into(&self, buf: &mut [u8]) -> Result<()> {
        if buf.len() < PAGE_HEADER_SIZE {
            return Err(Error::invalid_argument(format!(
                "buffer of {} bytes too small for {}-byte page header",
                buf.len(),
                PAGE_HEADER_SIZE
            )));
        }

        buf[0..4].copy_from_slice(&self.page_number.to_le_bytes());
        buf[4] = self.page_type as u8;
        buf[5..7].copy_from_slice(&self.record_count.to_le_bytes());
        buf[7..9].copy_from_slice(&self.free_space_offset.to_le_bytes());
        Ok(())
    }

    /// Decode a header from the first [`PAGE_HEADER_SIZE`] bytes of `buf`.
    ///
    /// Fails with `InvalidArgument` if the buffer is too short, and with
    /// `CorruptHeader` if the type byte does not map to a known [`PageType`].
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < PAGE_HEADER_SIZE {
            return Err(Error::invalid_argument(format!(
                "buffer of {} bytes too small for {}-byte page header",
                buf.len(),
                PAGE_HEADER_SIZE
            )));
        }

        let page_number = u32::from_le_bytes(buf[0..4].try_into().unwrap());
        let page_type = PageType::from_u8(buf[4])
            .ok_or_else(|| Error::corrupt_header(format!("unknown page type byte {}", buf[4])))?;
        let record_count = u16::from_le_bytes(buf[5..7].try_into().unwrap());
        let free_space_offset = u16::from_le_bytes(buf[7..9].try_into().unwrap());

        Ok(Self { page_number, page_type, record_count, free_space_offset })
    }
}

/// Read the record count field without decoding the full header.
pub(crate) fn read_record_count(buf: &[u8]) -> u16 {
    u16::from_le_bytes(buf[5..7].try_into().unwrap())
}

/// Overwrite the record count field in place.
pub(crate) fn write_record_count(buf: &mut [u8], count: u16) {
    buf[5..7].copy_from_slice(&count.to_le_bytes());
}

/// Read the free-space offset field without decoding the full header.
pub(crate) fn read_free_space_offset(buf: &[u8]) -> u16 {
    u16::from_le_bytes(buf[7..9].try_into().unwrap())
}

/// Overwrite the free-space offset field in place.
pub(crate) fn write_free_space_offset(buf: &mut [u8], offset: u16) {
    buf[7..9].copy_from_slice(&offset.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_encode_decode() {
        let header = PageHeader {
            page_number: 42,
            page_type: PageType::Table,
            record_count: 7,
            free_space_offset: 3900,
        };

        let mut buf = [0u8; PAGE_HEADER_SIZE];
        header.encode_into(&mut buf).unwrap();

        let decoded = PageHeader::decode(&buf).unwrap();
        assert_eq!(decoded, header);
    }

    #[test]
    fn test_header_byte_order() {
        // Little-endian is a file format contract, not a platform default.
        let header = PageHeader::new(1, PageType::Table, 4096);
        let mut buf = [0u8; PAGE_HEADER_SIZE];
        header.encode_into(&mut buf).unwrap();

        assert_eq!(&buf[0..4], &[0x01, 0x00, 0x00, 0x00]);
        assert_eq!(buf[4], 1);
        assert_eq!(&buf[5..7], &[0x00, 0x00]);
        assert_eq!(&buf[7..9], &[0x00, 0x10]); // 4096 = 0x1000
    }

    #[test]
    fn test_encode_buffer_too_small() {
        let header = PageHeader::new(0, PageType::Meta, 4096);
        let mut buf = [0u8; PAGE_HEADER_SIZE - 1];
        let result = header.encode_into(&mut buf);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_decode_buffer_too_small() {
        let buf = [0u8; 4];
        let result = PageHeader::decode(&buf);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_decode_unknown_page_type() {
        let mut buf = [0u8; PAGE_HEADER_SIZE];
        buf[4] = 7;
        let result = PageHeader::decode(&buf);
        assert!(matches!(result, Err(Error::CorruptHeader(_))));
    }

    #[test]
    fn test_page_type_from_u8() {
        assert_eq!(PageType::from_u8(0), Some(PageType::Meta));
        assert_eq!(PageType::from_u8(1), Some(PageType::Table));
        assert_eq!(PageType::from_u8(2), Some(PageType::Overflow));
        assert_eq!(PageType::from_u8(3), None);
        assert_eq!(PageType::from_u8(255), None);
    }

    #[test]
    fn test_field_accessors() {
        let header = PageHeader::new(9, PageType::Table, 8192);
        let mut buf = [0u8; PAGE_HEADER_SIZE];
        header.encode_into(&mut buf).unwrap();

        assert_eq!(read_record_count(&buf), 0);
        assert_eq!(read_free_space_offset(&buf), 8192);

        write_record_count(&mut buf, 3);
        write_free_space_offset(&mut buf, 8000);

        let decoded = PageHeader::decode(&buf).unwrap();
        assert_eq!(decoded.record_count, 3);
        assert_eq!(decoded.free_space_offset, 8000);
        // Untouched fields survive in-place updates.
        assert_eq!(decoded.page_number, 9);
        assert_eq!(decoded.page_type, PageType::Table);
    }
}
