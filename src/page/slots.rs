//! Slot directory management.
//!
//! The slot directory is an array of fixed-width (offset, length) entries
//! starting immediately after the page header and growing toward higher
//! offsets as rows are inserted. It locates rows without ever moving their
//! bytes: once a slot index is assigned it is stable until an explicit
//! compaction, and a delete only stamps the slot with a tombstone.
//!
//! Functions here operate on a raw page buffer and maintain the header's
//! record count; they never touch row bytes. Space accounting against the
//! row data area is the layout layer's job, which knows the row size being
//! reserved for.

use crate::error::{Error, Result};
use crate::page::codec::{read_free_space_offset, read_record_count, write_record_count};
use crate::page::{PAGE_HEADER_SIZE, SLOT_SIZE};

/// A slot's length field is set to this sentinel when the row is deleted.
/// Zero-length rows are rejected at insert so the sentinel is unambiguous.
pub const TOMBSTONE_LENGTH: u16 = 0;

/// One slot directory entry: where a row's bytes live within the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Byte offset of the row's first byte, from the page start.
    pub offset: u16,
    /// Row length in bytes; [`TOMBSTONE_LENGTH`] marks a deleted row.
    pub length: u16,
}

impl Slot {
    /// Whether this slot has been deleted.
    pub fn is_tombstone(&self) -> bool {
        self.length == TOMBSTONE_LENGTH
    }
}

/// Byte offset of slot `index` within the page.
fn slot_offset(index: u16) -> usize {
    PAGE_HEADER_SIZE + index as usize * SLOT_SIZE
}

/// Byte offset one past the last slot, i.e. where the directory ends and
/// free space begins.
pub(crate) fn directory_end(buf: &[u8]) -> usize {
    slot_offset(read_record_count(buf))
}

/// Append a new slot after the last existing one and bump the record count.
///
/// Returns the new slot's index. Fails with `PageFull` if the grown
/// directory would cross the free-space offset. The caller must have
/// already accounted for the row bytes the slot points at.
pub(crate) fn append_slot(buf: &mut [u8], offset: u16, length: u16) -> Result<u16> {
    let count = read_record_count(buf);
    let end = slot_offset(count) + SLOT_SIZE;
    let free_space_offset = read_free_space_offset(buf) as usize;

    if end > free_space_offset {
        return Err(Error::PageFull {
            row_size: length as usize,
            available: free_space_offset.saturating_sub(slot_offset(count)),
        });
    }

    let at = slot_offset(count);
    buf[at..at + 2].copy_from_slice(&offset.to_le_bytes());
    buf[at + 2..at + 4].copy_from_slice(&length.to_le_bytes());
    write_record_count(buf, count + 1);

    Ok(count)
}

/// Read slot `index`, tombstones included.
///
/// Fails with `InvalidSlot` only when the index is out of range. Callers
/// that must not see deleted rows use [`read_live_slot`].
pub(crate) fn read_slot(buf: &[u8], index: u16) -> Result<Slot> {
    let count = read_record_count(buf);
    if index >= count {
        return Err(Error::invalid_slot(format!(
            "slot {} out of range, page has {} slots",
            index, count
        )));
    }

    let at = slot_offset(index);
    let offset = u16::from_le_bytes(buf[at..at + 2].try_into().unwrap());
    let length = u16::from_le_bytes(buf[at + 2..at + 4].try_into().unwrap());
    Ok(Slot { offset, length })
}

/// Read slot `index`, failing with `InvalidSlot` if it is a tombstone.
pub(crate) fn read_live_slot(buf: &[u8], index: u16) -> Result<Slot> {
    let slot = read_slot(buf, index)?;
    if slot.is_tombstone() {
        return Err(Error::invalid_slot(format!("slot {} is deleted", index)));
    }
    Ok(slot)
}

/// Stamp slot `index` with the tombstone sentinel.
///
/// No other slot and no row byte is shifted; the slot keeps its index and
/// the record count is unchanged. Fails with `InvalidSlot` if the index is
/// out of range or the slot is already deleted.
pub(crate) fn mark_deleted(buf: &mut [u8], index: u16) -> Result<()> {
    let slot = read_live_slot(buf, index)?;

    let at = slot_offset(index);
    // Keep the offset; only the length carries the tombstone.
    buf[at..at + 2].copy_from_slice(&slot.offset.to_le_bytes());
    buf[at + 2..at + 4].copy_from_slice(&TOMBSTONE_LENGTH.to_le_bytes());
    Ok(())
}

/// Overwrite an existing slot in place. Used by compaction when relocating
/// a live row; never changes the directory's size.
pub(crate) fn overwrite_slot(buf: &mut [u8], index: u16, slot: Slot) -> Result<()> {
    let count = read_record_count(buf);
    if index >= count {
        return Err(Error::invalid_slot(format!(
            "slot {} out of range, page has {} slots",
            index, count
        )));
    }

    let at = slot_offset(index);
    buf[at..at + 2].copy_from_slice(&slot.offset.to_le_bytes());
    buf[at + 2..at + 4].copy_from_slice(&slot.length.to_le_bytes());
    Ok(())
}
