//! Page file storage.
//!
//! [`FileStore`] maps the logical page sequence onto a backing file: page
//! `n` lives at byte offset `n * page_size`, with no gaps. Allocation is
//! strictly append-only; reads and writes move whole pages. Page 0 is
//! always a Meta page recording the file's page size (see [`meta`]).
//!
//! ## Concurrency
//!
//! The file handle is shared process-wide and seek-then-I/O is not atomic,
//! so every positioned read and write runs under one internal mutex. The
//! store never caches page contents; each read hands out a fresh owned
//! buffer, and serializing writers of the same in-memory page is the
//! caller's job.

pub mod meta;

pub use meta::MetaPayload;

use crate::config::Options;
use crate::error::{Error, Result};
use crate::page::{slots, Page, PageType, PAGE_HEADER_SIZE, SLOT_SIZE};
use meta::META_PAYLOAD_SIZE;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// File handle plus the state the allocation contract depends on.
struct StoreInner {
    file: File,
    /// Current file length in bytes; always a whole number of pages.
    file_len: u64,
}

/// A page file: an ordered, gap-free sequence of fixed-size pages.
///
/// Usage:
/// ```no_run
/// use pagestore::{FileStore, Options, PageType};
///
/// # fn main() -> Result<(), pagestore::Error> {
/// let store = FileStore::open("./table.pgs", Options::default())?;
/// let mut page = store.allocate_page(store.num_pages(), PageType::Table)?;
/// let slot = page.insert_row(b"hello")?;
/// store.write_page(&page)?;
/// # Ok(())
/// # }
/// ```
pub struct FileStore {
    path: PathBuf,
    inner: Mutex<StoreInner>,
    page_size: usize,
    sync_writes: bool,
}

impl FileStore {
    /// Open a page file, creating it if allowed by `options`.
    ///
    /// A fresh file gets a Meta page at page 0 recording
    /// `options.page_size`. For an existing file the recorded page size
    /// wins and `options.page_size` is ignored.
    pub fn open<P: AsRef<Path>>(path: P, options: Options) -> Result<Self> {
        options.validate()?;
        let path = path.as_ref().to_path_buf();

        let exists = path.exists();
        if exists && options.error_if_exists {
            return Err(Error::invalid_argument(format!(
                "file already exists: {}",
                path.display()
            )));
        }
        if !exists && !options.create_if_missing {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found: {}", path.display()),
            )));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;
        let file_len = file.metadata()?.len();

        let store = Self {
            path,
            inner: Mutex::new(StoreInner { file, file_len }),
            page_size: options.page_size,
            sync_writes: options.sync_writes,
        };

        if file_len == 0 {
            store.init_meta_page()?;
            log::info!(
                "Created page file {:?} with page size {}",
                store.path,
                store.page_size
            );
        } else {
            let recorded = store.read_meta_page_size()?;
            // The recorded size wins over whatever the caller configured.
            let store = Self { page_size: recorded, ..store };
            log::info!(
                "Opened page file {:?}: {} pages of {} bytes",
                store.path,
                store.num_pages(),
                store.page_size
            );
            return Ok(store);
        }

        Ok(store)
    }

    /// Allocate page 0 and store the meta payload as its first row.
    fn init_meta_page(&self) -> Result<()> {
        let mut page = self.allocate_page(0, PageType::Meta)?;
        page.insert_row(&MetaPayload::new(self.page_size).encode())?;
        self.write_page(&page)
    }

    /// Bootstrap-read the page size recorded in the Meta page.
    ///
    /// The page size is not known yet, so this cannot read a whole page.
    /// It reads page 0's header plus slot 0, then the meta row the slot
    /// points at: two positioned reads, both within page 0.
    fn read_meta_page_size(&self) -> Result<usize> {
        let mut inner = self.inner.lock();

        if inner.file_len < (PAGE_HEADER_SIZE + SLOT_SIZE) as u64 {
            return Err(Error::corrupt_header(
                "file too small to hold a Meta page",
            ));
        }

        let mut head = [0u8; PAGE_HEADER_SIZE + SLOT_SIZE];
        inner.file.seek(SeekFrom::Start(0))?;
        inner.file.read_exact(&mut head)?;

        let header = crate::page::PageHeader::decode(&head)?;
        if header.page_type != PageType::Meta {
            return Err(Error::corrupt_header("page 0 is not a Meta page"));
        }
        if header.record_count == 0 {
            return Err(Error::corrupt_header("Meta page holds no meta row"));
        }

        let slot = slots::read_slot(&head, 0)?;
        if slot.length as usize != META_PAYLOAD_SIZE {
            return Err(Error::corrupt_header(format!(
                "meta row of {} bytes, expected {}",
                slot.length, META_PAYLOAD_SIZE
            )));
        }

        let mut payload = [0u8; META_PAYLOAD_SIZE];
        inner.file.seek(SeekFrom::Start(slot.offset as u64))?;
        inner.file.read_exact(&mut payload)?;
        let meta = MetaPayload::decode(&payload)?;

        if inner.file_len % meta.page_size as u64 != 0 {
            log::warn!(
                "file length {} is not a multiple of page size {}",
                inner.file_len,
                meta.page_size
            );
        }

        Ok(meta.page_size)
    }

    /// Allocate a new page at the end of the file.
    ///
    /// The target offset `page_number * page_size` must equal the current
    /// file length exactly; any other page number fails with
    /// `NonSequentialPage` and leaves the file unchanged. The freshly
    /// formatted page is appended (zero rows) and also returned for
    /// in-memory mutation.
    pub fn allocate_page(&self, page_number: u32, page_type: PageType) -> Result<Page> {
        let mut inner = self.inner.lock();

        let expected = (inner.file_len / self.page_size as u64) as u32;
        if page_number != expected {
            return Err(Error::NonSequentialPage { requested: page_number, expected });
        }

        let page = Page::format(page_number, page_type, self.page_size)?;

        let offset = page_number as u64 * self.page_size as u64;
        inner.file.seek(SeekFrom::Start(offset))?;
        inner.file.write_all(page.as_bytes())?;
        if self.sync_writes {
            inner.file.sync_all()?;
        }
        inner.file_len += self.page_size as u64;

        log::debug!("Allocated page {} ({:?})", page_number, page_type);
        Ok(page)
    }

    /// Read page `page_number` into a fresh owned buffer.
    ///
    /// Fails with `PageNotFound` if the page lies past end-of-file, and
    /// with `CorruptHeader` if the stored header fails validation.
    pub fn read_page(&self, page_number: u32) -> Result<Page> {
        let mut inner = self.inner.lock();

        let offset = page_number as u64 * self.page_size as u64;
        if offset + self.page_size as u64 > inner.file_len {
            return Err(Error::PageNotFound(page_number));
        }

        let mut buf = vec![0u8; self.page_size];
        inner.file.seek(SeekFrom::Start(offset))?;
        inner.file.read_exact(&mut buf)?;
        drop(inner);

        let page = Page::from_bytes(buf)?;
        if page.page_number() != page_number {
            return Err(Error::corrupt_header(format!(
                "page at offset {} claims page number {}, expected {}",
                offset,
                page.page_number(),
                page_number
            )));
        }
        Ok(page)
    }

    /// Write a page back to its page-number-derived offset.
    ///
    /// The whole buffer goes out in a single write so a partial page is
    /// never left observable at this layer. The page must already be
    /// allocated; writing past end-of-file fails with `PageNotFound`
    /// rather than punching a hole.
    pub fn write_page(&self, page: &Page) -> Result<()> {
        if page.size() != self.page_size {
            return Err(Error::invalid_argument(format!(
                "page of {} bytes does not match file page size {}",
                page.size(),
                self.page_size
            )));
        }

        let mut inner = self.inner.lock();

        let offset = page.page_number() as u64 * self.page_size as u64;
        if offset + self.page_size as u64 > inner.file_len {
            return Err(Error::PageNotFound(page.page_number()));
        }

        inner.file.seek(SeekFrom::Start(offset))?;
        inner.file.write_all(page.as_bytes())?;
        if self.sync_writes {
            inner.file.sync_all()?;
        }

        log::debug!("Wrote page {}", page.page_number());
        Ok(())
    }

    /// Force everything down to disk, regardless of `sync_writes`.
    pub fn sync(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.file.flush()?;
        inner.file.sync_all()?;
        Ok(())
    }

    /// Number of pages currently in the file, the Meta page included.
    pub fn num_pages(&self) -> u32 {
        let inner = self.inner.lock();
        (inner.file_len / self.page_size as u64) as u32
    }

    /// The fixed page size of this file.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Path to the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn options(page_size: usize) -> Options {
        Options { page_size, sync_writes: false, ..Options::default() }
    }

    #[test]
    fn test_create_writes_meta_page() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("t.pgs"), options(4096)).unwrap();

        assert_eq!(store.num_pages(), 1);
        let meta = store.read_page(0).unwrap();
        assert_eq!(meta.page_type().unwrap(), PageType::Meta);
        assert_eq!(meta.record_count(), 1);

        let payload = MetaPayload::decode(meta.read_row(0).unwrap()).unwrap();
        assert_eq!(payload.page_size, 4096);
    }

    #[test]
    fn test_reopen_reads_recorded_page_size() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.pgs");

        {
            let store = FileStore::open(&path, options(8192)).unwrap();
            store.sync().unwrap();
        }

        // Opening with a different configured size must not matter.
        let store = FileStore::open(&path, options(4096)).unwrap();
        assert_eq!(store.page_size(), 8192);
        assert_eq!(store.num_pages(), 1);
    }

    #[test]
    fn test_allocate_sequential_only() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("t.pgs"), options(4096)).unwrap();

        // Page 0 is the Meta page, so page 1 is next.
        let result = store.allocate_page(2, PageType::Table);
        assert!(matches!(
            result,
            Err(Error::NonSequentialPage { requested: 2, expected: 1 })
        ));
        assert_eq!(store.num_pages(), 1);

        store.allocate_page(1, PageType::Table).unwrap();
        assert_eq!(store.num_pages(), 2);

        // Re-allocating an existing page is also non-sequential.
        let result = store.allocate_page(1, PageType::Table);
        assert!(matches!(result, Err(Error::NonSequentialPage { .. })));
    }

    #[test]
    fn test_read_past_end_of_file() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("t.pgs"), options(4096)).unwrap();

        assert!(matches!(store.read_page(1), Err(Error::PageNotFound(1))));
    }

    #[test]
    fn test_write_unallocated_page_rejected() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("t.pgs"), options(4096)).unwrap();

        let page = Page::format(5, PageType::Table, 4096).unwrap();
        assert!(matches!(store.write_page(&page), Err(Error::PageNotFound(5))));
    }

    #[test]
    fn test_write_wrong_page_size_rejected() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("t.pgs"), options(4096)).unwrap();

        let page = Page::format(0, PageType::Table, 8192).unwrap();
        assert!(matches!(store.write_page(&page), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_write_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("t.pgs"), options(4096)).unwrap();

        let mut page = store.allocate_page(1, PageType::Table).unwrap();
        page.insert_row(b"persisted row").unwrap();
        store.write_page(&page).unwrap();

        let read_back = store.read_page(1).unwrap();
        assert_eq!(read_back, page);
        assert_eq!(read_back.read_row(0).unwrap(), b"persisted row");
    }

    #[test]
    fn test_open_corrupted_meta_magic() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.pgs");
        {
            let store = FileStore::open(&path, options(4096)).unwrap();
            store.sync().unwrap();
        }

        // The meta row sits at the end of page 0; clobber its magic.
        let mut bytes = std::fs::read(&path).unwrap();
        let row_start = 4096 - META_PAYLOAD_SIZE;
        bytes[row_start] = 0xFF;
        std::fs::write(&path, &bytes).unwrap();

        let result = FileStore::open(&path, options(4096));
        assert!(matches!(result, Err(Error::CorruptHeader(_))));
    }

    #[test]
    fn test_open_corrupted_meta_page_size() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.pgs");
        {
            let store = FileStore::open(&path, options(4096)).unwrap();
            store.sync().unwrap();
        }

        // Flip a page-size byte inside the meta row; the CRC catches it.
        let mut bytes = std::fs::read(&path).unwrap();
        let row_start = 4096 - META_PAYLOAD_SIZE;
        bytes[row_start + 6] ^= 0x01;
        std::fs::write(&path, &bytes).unwrap();

        let result = FileStore::open(&path, options(4096));
        assert!(matches!(result, Err(Error::ChecksumMismatch { .. })));
    }

    #[test]
    fn test_read_page_with_corrupt_slot_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.pgs");
        {
            let store = FileStore::open(&path, options(4096)).unwrap();
            let mut page = store.allocate_page(1, PageType::Table).unwrap();
            page.insert_row(b"victim row").unwrap();
            store.write_page(&page).unwrap();
            store.sync().unwrap();
        }

        // Stretch slot 0's length so it runs past the end of page 1.
        let mut bytes = std::fs::read(&path).unwrap();
        let slot_length_at = 4096 + PAGE_HEADER_SIZE + 2;
        bytes[slot_length_at..slot_length_at + 2].copy_from_slice(&2000u16.to_le_bytes());
        std::fs::write(&path, &bytes).unwrap();

        let store = FileStore::open(&path, options(4096)).unwrap();
        let result = store.read_page(1);
        assert!(matches!(result, Err(Error::CorruptHeader(_))));
    }

    #[test]
    fn test_open_missing_without_create() {
        let dir = TempDir::new().unwrap();
        let opts = Options { create_if_missing: false, ..options(4096) };
        let result = FileStore::open(dir.path().join("absent.pgs"), opts);
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_open_existing_with_error_if_exists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.pgs");
        drop(FileStore::open(&path, options(4096)).unwrap());

        let opts = Options { error_if_exists: true, ..options(4096) };
        let result = FileStore::open(&path, opts);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }
}
