//! Paged random-access storage over a flat file of login-event records
//!
//! The accounting file is a headerless sequence of fixed-size records. The
//! store reads page-aligned runs of records on demand and keeps exactly one
//! page resident, so memory stays bounded no matter how large the file is
//! while sequential and locally-clustered access patterns hit the cache.

use crate::core::record::{LoginEventRecord, RECORD_SIZE};
use crate::error::{Error, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default number of records held in the resident page
pub const DEFAULT_PAGE_SIZE: usize = 64;

/// Cumulative access counters for one open store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Records returned to callers, cache hits and misses alike
    pub records_read: u64,
    /// Page faults: one per page loaded from disk
    pub page_reloads: u64,
}

impl StoreStats {
    /// Page loads per record returned; lower is better
    pub fn reload_ratio(&self) -> f64 {
        if self.records_read == 0 {
            0.0
        } else {
            self.page_reloads as f64 / self.records_read as f64
        }
    }
}

/// Random-access reader over a login-accounting file
pub struct RecordStore {
    file: Option<File>,
    path: PathBuf,
    page_size: usize,
    /// Decoded records of the resident page; empty until the first load
    page: Vec<LoginEventRecord>,
    /// Index of the first record in the resident page
    page_start: usize,
    /// Record count, derived from the file length on first use
    count: Option<usize>,
    stats: StoreStats,
}

impl RecordStore {
    /// Open an accounting file with the given page size (records per page)
    pub fn open<P: AsRef<Path>>(path: P, page_size: usize) -> Result<Self> {
        if page_size == 0 {
            return Err(Error::InvalidPageSize);
        }
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound { path: path.clone() },
            std::io::ErrorKind::PermissionDenied => Error::PermissionDenied { path: path.clone() },
            _ => Error::Io(e),
        })?;

        Ok(Self {
            file: Some(file),
            path,
            page_size,
            page: Vec::new(),
            page_start: 0,
            count: None,
            stats: StoreStats::default(),
        })
    }

    /// Number of records in the file
    ///
    /// Derived by seeking to end-of-file and dividing by the record size,
    /// then cached for the life of the handle. A file length that is not a
    /// whole number of records is a [`Error::MalformedFile`].
    pub fn record_count(&mut self) -> Result<usize> {
        let file = self.file.as_mut().ok_or(Error::StoreClosed)?;
        if let Some(count) = self.count {
            return Ok(count);
        }

        let len = file.seek(SeekFrom::End(0))?;
        file.seek(SeekFrom::Start(0))?;

        if len % RECORD_SIZE as u64 != 0 {
            return Err(Error::MalformedFile {
                len,
                record_size: RECORD_SIZE,
            });
        }

        let count = (len / RECORD_SIZE as u64) as usize;
        self.count = Some(count);
        Ok(count)
    }

    /// Fetch the record at `index`
    ///
    /// A hit on the resident page is served without I/O; a miss loads the
    /// page-aligned run containing `index` and counts one reload. The
    /// returned borrow aliases the resident page and lives until the next
    /// call that takes `&mut self`.
    pub fn get(&mut self, index: usize) -> Result<&LoginEventRecord> {
        if self.file.is_none() {
            return Err(Error::StoreClosed);
        }
        let count = self.record_count()?;
        if index >= count {
            return Err(Error::OutOfRange { index, count });
        }

        if !self.resident(index) {
            self.load_page(index)?;
        }

        match self.page.get(index - self.page_start) {
            Some(record) => {
                self.stats.records_read += 1;
                Ok(record)
            }
            // The file shrank under us or the read came up short
            None => Err(Error::OutOfRange { index, count }),
        }
    }

    /// Cumulative access counters
    pub fn stats(&self) -> StoreStats {
        self.stats
    }

    /// Path of the underlying file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the file descriptor
    ///
    /// Idempotent: safe to call repeatedly. Dropping the store also closes
    /// it. Later fetches fail with [`Error::StoreClosed`].
    pub fn close(&mut self) {
        self.file = None;
    }

    fn resident(&self, index: usize) -> bool {
        !self.page.is_empty()
            && index >= self.page_start
            && index < self.page_start + self.page.len()
    }

    /// Load the page-aligned run of records containing `index`
    fn load_page(&mut self, index: usize) -> Result<()> {
        let file = self.file.as_mut().ok_or(Error::StoreClosed)?;
        let page_start = (index / self.page_size) * self.page_size;

        file.seek(SeekFrom::Start((page_start * RECORD_SIZE) as u64))?;

        // Read up to a full page; fewer records remain at end-of-file
        let mut raw = vec![0u8; self.page_size * RECORD_SIZE];
        let mut filled = 0;
        loop {
            let n = file.read(&mut raw[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
            if filled == raw.len() {
                break;
            }
        }

        let whole = filled / RECORD_SIZE;
        self.page.clear();
        for chunk in raw[..whole * RECORD_SIZE].chunks_exact(RECORD_SIZE) {
            self.page.push(LoginEventRecord::deserialize(chunk)?);
        }
        self.page_start = page_start;
        self.stats.page_reloads += 1;

        debug!(page_start, records = whole, "loaded page");
        Ok(())
    }
}
