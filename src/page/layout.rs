//! Row-level operations on one page buffer.
//!
//! [`Page`] owns a fixed-size buffer and combines the header codec and slot
//! directory into the public row contract: insert, read, delete, compact.
//! Row bytes are opaque here; serialization belongs to the layer above.
//!
//! Inserts write row data at the high end of the buffer, growing upward
//! toward the slot directory, and never move previously written bytes.
//! Deletes only tombstone the slot, so fragmentation accrues until an
//! explicit [`Page::compact`] relocates the surviving rows.

use crate::error::{Error, Result};
use crate::page::codec::{
    read_free_space_offset, write_free_space_offset, PageHeader, PageType,
};
use crate::page::{slots, Slot, MAX_PAGE_SIZE, MIN_PAGE_SIZE, PAGE_HEADER_SIZE, SLOT_SIZE};

/// A fixed-size page buffer: one unit of file I/O.
///
/// The buffer length is fixed at format time and never changes. A `Page` is
/// owned by exactly one holder; the file store hands out a fresh owned
/// buffer per read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    data: Vec<u8>,
}

impl Page {
    /// Format a fresh, empty page: zeroed buffer, initialized header,
    /// free-space offset at the very end.
    ///
    /// Fails with `InvalidArgument` on a page size outside
    /// [`MIN_PAGE_SIZE`]..=[`MAX_PAGE_SIZE`].
    pub fn format(page_number: u32, page_type: PageType, page_size: usize) -> Result<Self> {
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(Error::invalid_argument(format!(
                "page size {} out of range [{}, {}]",
                page_size, MIN_PAGE_SIZE, MAX_PAGE_SIZE
            )));
        }

        let mut data = vec![0u8; page_size];
        PageHeader::new(page_number, page_type, page_size).encode_into(&mut data)?;
        Ok(Self { data })
    }

    /// Reconstruct a page from bytes read off disk, validating the header
    /// and slot directory.
    ///
    /// Fails with `CorruptHeader` on an unknown page type, a free-space
    /// offset that violates the layout invariant
    /// `directory end <= free-space offset <= page size`, or a live slot
    /// pointing outside the row data area. A damaged page surfaces here as
    /// an error, never as a panic on a later row read.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let header = PageHeader::decode(&data)?;

        let directory_end = PAGE_HEADER_SIZE + header.record_count as usize * SLOT_SIZE;
        let free = header.free_space_offset as usize;
        if free < directory_end || free > data.len() {
            return Err(Error::corrupt_header(format!(
                "free-space offset {} outside [{}, {}]",
                free,
                directory_end,
                data.len()
            )));
        }

        // Every live slot must resolve within [free-space offset, page end].
        // Tombstones are never dereferenced, so their stale offsets pass.
        for index in 0..header.record_count {
            let slot = slots::read_slot(&data, index)?;
            if slot.is_tombstone() {
                continue;
            }
            let start = slot.offset as usize;
            let end = start + slot.length as usize;
            if start < free || end > data.len() {
                return Err(Error::corrupt_header(format!(
                    "slot {} points at bytes {}..{}, outside row area {}..{}",
                    index,
                    start,
                    end,
                    free,
                    data.len()
                )));
            }
        }

        Ok(Self { data })
    }

    /// Insert a row, returning the new slot's index.
    ///
    /// The row's bytes are written immediately below the current free-space
    /// offset and a slot pointing at them is appended; no existing row or
    /// slot moves. Fails with `InvalidArgument` on an empty row (the
    /// tombstone sentinel is length zero) and with `PageFull` when the row
    /// plus its slot would collide with the slot directory, leaving the
    /// page byte-identical to its pre-call state.
    pub fn insert_row(&mut self, row: &[u8]) -> Result<u16> {
        if row.is_empty() {
            return Err(Error::invalid_argument(
                "cannot insert a zero-length row",
            ));
        }

        let free = read_free_space_offset(&self.data) as usize;
        let available = free - slots::directory_end(&self.data);
        if row.len() + SLOT_SIZE > available {
            return Err(Error::PageFull { row_size: row.len(), available });
        }

        let start = free - row.len();
        self.data[start..free].copy_from_slice(row);
        let index = slots::append_slot(&mut self.data, start as u16, row.len() as u16)?;
        write_free_space_offset(&mut self.data, start as u16);

        Ok(index)
    }

    /// Read the row at `slot_index`.
    ///
    /// Returns a view into the page buffer. Fails with `InvalidSlot` if the
    /// index is out of range or the slot is tombstoned.
    pub fn read_row(&self, slot_index: u16) -> Result<&[u8]> {
        let slot = slots::read_live_slot(&self.data, slot_index)?;
        let start = slot.offset as usize;
        Ok(&self.data[start..start + slot.length as usize])
    }

    /// Delete the row at `slot_index` by tombstoning its slot.
    ///
    /// The row's bytes stay where they are and the free-space offset does
    /// not move; reclaiming the space is [`Page::compact`]'s job. Fails
    /// with `InvalidSlot` if the index is out of range or already deleted.
    pub fn delete_row(&mut self, slot_index: u16) -> Result<()> {
        slots::mark_deleted(&mut self.data, slot_index)
    }

    /// Physically relocate live rows against the end of the page and reset
    /// the free-space offset, reclaiming the space left by tombstones.
    ///
    /// Every live slot keeps its index and resolves to the same bytes as
    /// before; tombstoned slots stay tombstoned. Free space only grows. A
    /// page that rejected an insert with `PageFull` may accept it after
    /// deletions plus a compact.
    pub fn compact(&mut self) -> Result<()> {
        let count = self.record_count();

        // Live slots, highest row offset first, so each row moves toward
        // the end of the page before anything below it.
        let mut live: Vec<(u16, Slot)> = Vec::new();
        for index in 0..count {
            let slot = slots::read_slot(&self.data, index)?;
            if !slot.is_tombstone() {
                live.push((index, slot));
            }
        }
        live.sort_by(|a, b| b.1.offset.cmp(&a.1.offset));

        let mut write_end = self.data.len();
        for (index, slot) in live {
            let len = slot.length as usize;
            let src = slot.offset as usize;
            let dst = write_end - len;
            if src != dst {
                self.data.copy_within(src..src + len, dst);
            }
            slots::overwrite_slot(
                &mut self.data,
                index,
                Slot { offset: dst as u16, length: slot.length },
            )?;
            write_end = dst;
        }

        write_free_space_offset(&mut self.data, write_end as u16);
        Ok(())
    }

    /// The page's logical number.
    pub fn page_number(&self) -> u32 {
        u32::from_le_bytes(self.data[0..4].try_into().unwrap())
    }

    /// The page's type byte, decoded.
    pub fn page_type(&self) -> Result<PageType> {
        PageType::from_u8(self.data[4])
            .ok_or_else(|| Error::corrupt_header(format!("unknown page type byte {}", self.data[4])))
    }

    /// Number of slots in the directory, tombstones included.
    pub fn record_count(&self) -> u16 {
        crate::page::codec::read_record_count(&self.data)
    }

    /// Number of slots pointing at live rows.
    pub fn live_records(&self) -> u16 {
        let count = self.record_count();
        (0..count)
            .filter(|&i| matches!(slots::read_slot(&self.data, i), Ok(s) if !s.is_tombstone()))
            .count() as u16
    }

    /// Current free-space offset: where the lowest row's data starts.
    pub fn free_space_offset(&self) -> u16 {
        read_free_space_offset(&self.data)
    }

    /// Contiguous free bytes between the slot directory and the row data.
    /// An insert needs `row length + SLOT_SIZE` of this.
    pub fn free_space(&self) -> usize {
        self.free_space_offset() as usize - slots::directory_end(&self.data)
    }

    /// The page size in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// The raw page buffer, for whole-page writes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}
