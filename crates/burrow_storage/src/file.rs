//! File access for crash recovery.

use crate::buffer::effective_buffer_size;
use crate::error::{StorageError, StorageResult};
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::debug;

/// An open data or catalog file being recovered.
///
/// The file is read through two separate access modes that share one
/// descriptor:
///
/// - **Positioned reads** ([`read_exact_at`](Self::read_exact_at) and
///   [`read_exact_next`](Self::read_exact_next)) seek to an absolute offset
///   and bypass the buffer. Entry recovery uses these so it can resume at
///   any offset.
/// - **Streamed reads** ([`stream_read`](Self::stream_read) and
///   [`stream_read_exact`](Self::stream_read_exact)) go through a
///   [`BufReader`] sized by [`effective_buffer_size`]. Bucket catalog
///   recovery uses these for its single front-to-back pass.
///
/// The stream remembers its own position. A positioned read marks the
/// stream as displaced and the next streamed read seeks back first, so
/// the two modes never observe each other's cursor.
///
/// # Size
///
/// The file size is captured once in [`open`](Self::open) and bounds every
/// read. Files are assumed not to change while they are being recovered.
///
/// # Thread Safety
///
/// All reads take `&mut self`. A `RecoveryFile` is meant to be owned by a
/// single recovery thread.
#[derive(Debug)]
pub struct RecoveryFile {
    path: PathBuf,
    reader: BufReader<File>,
    size: u64,
    stream_pos: u64,
    stream_displaced: bool,
    positioned_end: Option<u64>,
}

impl RecoveryFile {
    /// Opens an existing file for recovery.
    ///
    /// The file is opened read-write so a caller can repair it after
    /// recovery; nothing here writes to it. `buffer_size_hint` is passed
    /// through [`effective_buffer_size`] to size the streamed reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, cannot be opened, or
    /// its metadata cannot be read.
    pub fn open(path: &Path, buffer_size_hint: usize) -> StorageResult<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let size = file.metadata()?.len();
        let capacity = effective_buffer_size(buffer_size_hint);

        debug!(path = %path.display(), size, capacity, "opened recovery file");

        Ok(Self {
            path: path.to_path_buf(),
            reader: BufReader::with_capacity(capacity, file),
            size,
            stream_pos: 0,
            stream_displaced: false,
            positioned_end: None,
        })
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the file size captured at open time.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the capacity of the streamed reader's buffer.
    #[must_use]
    pub fn buffer_capacity(&self) -> usize {
        self.reader.capacity()
    }

    /// Returns the number of bytes consumed by streamed reads so far.
    #[must_use]
    pub fn stream_position(&self) -> u64 {
        self.stream_pos
    }

    /// Returns the number of bytes the stream can still deliver.
    #[must_use]
    pub fn stream_remaining(&self) -> u64 {
        self.size.saturating_sub(self.stream_pos)
    }

    /// Reads exactly `buf.len()` bytes starting at `offset`.
    ///
    /// An empty `buf` never touches the file.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ReadPastEnd`] if the range extends beyond the
    /// captured size, or an I/O error if the seek or read fails.
    pub fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> StorageResult<()> {
        if buf.is_empty() {
            return Ok(());
        }
        self.check_bounds(offset, buf.len())?;

        self.stream_displaced = true;
        self.positioned_end = None;

        // Seeking through the BufReader drops any buffered stream data.
        self.reader.seek(SeekFrom::Start(offset))?;
        self.reader.get_mut().read_exact(buf)?;

        self.positioned_end = Some(offset + buf.len() as u64);
        Ok(())
    }

    /// Reads exactly `buf.len()` bytes immediately after the previous
    /// positioned read, without seeking.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidInput` I/O error if no positioned read preceded
    /// this call (or a streamed read happened in between), and otherwise
    /// the same errors as [`read_exact_at`](Self::read_exact_at).
    pub fn read_exact_next(&mut self, buf: &mut [u8]) -> StorageResult<()> {
        let offset = self.positioned_end.ok_or_else(|| {
            StorageError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "continuation read without a preceding positioned read",
            ))
        })?;
        if buf.is_empty() {
            return Ok(());
        }
        self.check_bounds(offset, buf.len())?;

        self.reader.get_mut().read_exact(buf)?;

        self.positioned_end = Some(offset + buf.len() as u64);
        Ok(())
    }

    /// Fills `buf` from the streamed reader.
    ///
    /// Returns the number of bytes read, which is less than `buf.len()` only
    /// if the stream reached the end of the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read or the re-seek after a
    /// positioned read fails.
    pub fn stream_read(&mut self, buf: &mut [u8]) -> StorageResult<usize> {
        if self.stream_displaced {
            self.reader.seek(SeekFrom::Start(self.stream_pos))?;
            self.stream_displaced = false;
        }
        self.positioned_end = None;

        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        self.stream_pos += filled as u64;
        Ok(filled)
    }

    /// Reads exactly `buf.len()` bytes from the streamed reader.
    ///
    /// # Errors
    ///
    /// Returns an `UnexpectedEof` I/O error if the stream ends first.
    pub fn stream_read_exact(&mut self, buf: &mut [u8]) -> StorageResult<()> {
        let start = self.stream_pos;
        let n = self.stream_read(buf)?;
        if n < buf.len() {
            return Err(StorageError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "stream ended after {n} of {} bytes at offset {start}",
                    buf.len()
                ),
            )));
        }
        Ok(())
    }

    /// Closes the file.
    ///
    /// # Errors
    ///
    /// Currently infallible; the signature leaves room for platforms where
    /// closing reports deferred I/O errors.
    pub fn close(self) -> StorageResult<()> {
        let file = self.reader.into_inner();
        debug!(path = %self.path.display(), "closed recovery file");
        drop(file);
        Ok(())
    }

    fn check_bounds(&self, offset: u64, len: usize) -> StorageResult<()> {
        let len = len as u64;
        match offset.checked_add(len) {
            Some(end) if end <= self.size => Ok(()),
            _ => Err(StorageError::ReadPastEnd {
                offset,
                len,
                size: self.size,
            }),
        }
    }
}
