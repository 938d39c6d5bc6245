//! Recovery file handle: entry and bucket readers over one open file.

use crate::checksum::{bucket_checksum, entry_checksum};
use crate::config::RecoveryConfig;
use crate::error::{CoreError, CoreResult};
use crate::format::{
    parse_payload, Bucket, BucketMeta, Entry, EntryHeader, BUCKET_META_SIZE, CRC_SIZE,
    MAX_ENTRY_HEADER_SIZE,
};
use burrow_storage::{RecoveryFile, StorageError};
use std::io;
use std::path::Path;
use tracing::{debug, trace, warn};

/// Outcome of [`RecoveryReader::read_entry_at`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryRead {
    /// A verified entry.
    Entry(RecoveredEntry),
    /// The header at this offset is all zeros: the file holds no more
    /// entries. This is how a preallocated or cleanly cut file ends.
    EndOfData,
}

/// An entry together with the space it occupies on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredEntry {
    /// The decoded entry.
    pub entry: Entry,
    /// Header plus payload length. The next entry starts at `offset + size`.
    pub size: u64,
}

/// Outcome of [`RecoveryReader::read_next_bucket`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketRead {
    /// A verified bucket record.
    Bucket(RecoveredBucket),
    /// The catalog ended on a record boundary.
    EndOfStream,
}

/// A bucket record together with its stored metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredBucket {
    /// The decoded bucket.
    pub bucket: Bucket,
    /// Metadata as stored, including the declared payload size.
    pub meta: BucketMeta,
    /// Offset of the record in the catalog file.
    pub offset: u64,
}

/// An open file being recovered.
///
/// A data file is read with [`read_entry_at`](Self::read_entry_at), which
/// can start at any offset. A bucket catalog is read front to back with
/// [`read_next_bucket`](Self::read_next_bucket). Neither reader retries or
/// skips anything: every failure is returned with the offset of the record
/// that caused it, and the caller decides whether to truncate, skip the
/// file, or abort.
///
/// # Example
///
/// ```no_run
/// use burrow_core::{EntryRead, RecoveryReader};
/// use std::path::Path;
///
/// let mut reader = RecoveryReader::open(Path::new("0.dat"), 4096)?;
/// let mut offset = 0;
/// while offset < reader.file_size() {
///     match reader.read_entry_at(offset)? {
///         EntryRead::Entry(recovered) => offset += recovered.size,
///         EntryRead::EndOfData => break,
///     }
/// }
/// reader.release()?;
/// # Ok::<(), burrow_core::CoreError>(())
/// ```
#[derive(Debug)]
pub struct RecoveryReader {
    file: RecoveryFile,
}

impl RecoveryReader {
    /// Opens a file for recovery.
    ///
    /// `buffer_size_hint` sizes the buffered stream used by the bucket
    /// reader; see [`burrow_storage::effective_buffer_size`].
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Storage`] if the file cannot be opened read-write
    /// or its size cannot be read.
    pub fn open(path: &Path, buffer_size_hint: usize) -> CoreResult<Self> {
        let file = RecoveryFile::open(path, buffer_size_hint)?;
        debug!(
            path = %path.display(),
            size = file.size(),
            buffer = file.buffer_capacity(),
            "recovery reader opened"
        );
        Ok(Self { file })
    }

    /// Opens a file for recovery using `config`.
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open).
    pub fn open_with_config(path: &Path, config: &RecoveryConfig) -> CoreResult<Self> {
        Self::open(path, config.buffer_size)
    }

    /// Returns the path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Returns the file size captured at open time.
    #[must_use]
    pub fn file_size(&self) -> u64 {
        self.file.size()
    }

    /// Returns the capacity of the bucket reader's buffer.
    #[must_use]
    pub fn buffer_capacity(&self) -> usize {
        self.file.buffer_capacity()
    }

    /// Reads the entry starting at `offset`.
    ///
    /// The header length is unknown until it is parsed, so this reads up to
    /// [`MAX_ENTRY_HEADER_SIZE`] bytes at once (fewer near the end of the
    /// file), parses the header out of them, and keeps whatever payload
    /// bytes came along. A second read happens only when the payload does
    /// not fit in what was already read.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Read`] if a read fails or the declared payload runs
    ///   past the end of the file.
    /// - [`CoreError::Format`] if the bytes are not a header, including when
    ///   fewer than the minimum header size remain.
    /// - [`CoreError::ChecksumMismatch`] if the entry does not verify.
    pub fn read_entry_at(&mut self, offset: u64) -> CoreResult<EntryRead> {
        let remaining = self.file.size().saturating_sub(offset);
        // Bounded by MAX_ENTRY_HEADER_SIZE, so the cast cannot truncate.
        let speculative_len = remaining.min(MAX_ENTRY_HEADER_SIZE as u64) as usize;

        let mut buf = vec![0u8; speculative_len];
        self.file
            .read_exact_at(offset, &mut buf)
            .map_err(|e| CoreError::read(offset, e))?;

        let (header_size, header) =
            EntryHeader::parse(&buf).map_err(|e| CoreError::format(offset, e))?;
        if header.is_zero() {
            trace!(offset, "zero header, no more entries");
            return Ok(EntryRead::EndOfData);
        }

        let payload_size = header.payload_size();
        let excess = (speculative_len - header_size) as u64;

        let payload = if payload_size <= excess {
            buf[header_size..header_size + payload_size as usize].to_vec()
        } else {
            let missing = payload_size - excess;
            let available = remaining - speculative_len as u64;
            if missing > available {
                return Err(CoreError::read(
                    offset,
                    StorageError::ReadPastEnd {
                        offset: offset + speculative_len as u64,
                        len: missing,
                        size: self.file.size(),
                    },
                ));
            }

            let mut payload = vec![0u8; payload_size as usize];
            payload[..excess as usize].copy_from_slice(&buf[header_size..]);
            self.file
                .read_exact_next(&mut payload[excess as usize..])
                .map_err(|e| CoreError::read(offset, e))?;
            trace!(offset, header_size, payload_size, "payload needed a second read");
            payload
        };

        let (key, value) =
            parse_payload(payload, &header).map_err(|e| CoreError::format(offset, e))?;

        let actual = entry_checksum(&buf[CRC_SIZE..header_size], &key, &value);
        if actual != header.crc {
            warn!(offset, expected = header.crc, actual, "entry checksum mismatch");
            return Err(CoreError::ChecksumMismatch {
                offset,
                expected: header.crc,
                actual,
            });
        }

        let entry =
            Entry::from_parts(&header, key, value).map_err(|e| CoreError::format(offset, e))?;
        let size = header_size as u64 + payload_size;
        trace!(offset, size, "recovered entry");

        Ok(EntryRead::Entry(RecoveredEntry { entry, size }))
    }

    /// Reads the next bucket record from the catalog stream.
    ///
    /// Returns [`BucketRead::EndOfStream`] when the stream is exhausted on a
    /// record boundary.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Read`] if a read fails, the metadata is cut short, or
    ///   the declared payload runs past the end of the file.
    /// - [`CoreError::ChecksumMismatch`] if the record does not verify.
    /// - [`CoreError::Format`] if a verified record has an unknown tag or a
    ///   malformed payload.
    pub fn read_next_bucket(&mut self) -> CoreResult<BucketRead> {
        let offset = self.file.stream_position();

        let mut meta_buf = [0u8; BUCKET_META_SIZE];
        let n = self
            .file
            .stream_read(&mut meta_buf)
            .map_err(|e| CoreError::read(offset, e))?;
        if n == 0 {
            trace!(offset, "bucket catalog exhausted");
            return Ok(BucketRead::EndOfStream);
        }
        if n < BUCKET_META_SIZE {
            return Err(CoreError::read(
                offset,
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("bucket metadata cut short: {n} of {BUCKET_META_SIZE} bytes"),
                ),
            ));
        }

        let meta = BucketMeta::decode(&meta_buf);
        let size = u64::from(meta.size);
        if size > self.file.stream_remaining() {
            return Err(CoreError::read(
                offset,
                StorageError::ReadPastEnd {
                    offset: offset + BUCKET_META_SIZE as u64,
                    len: size,
                    size: self.file.size(),
                },
            ));
        }

        let mut payload = vec![0u8; meta.size as usize];
        self.file
            .stream_read_exact(&mut payload)
            .map_err(|e| CoreError::read(offset, e))?;

        let actual = bucket_checksum(&meta_buf[CRC_SIZE..], &payload);
        if actual != meta.crc {
            warn!(offset, expected = meta.crc, actual, "bucket checksum mismatch");
            return Err(CoreError::ChecksumMismatch {
                offset,
                expected: meta.crc,
                actual,
            });
        }

        let bucket =
            Bucket::decode_payload(&payload, &meta).map_err(|e| CoreError::format(offset, e))?;
        trace!(offset, id = bucket.id.as_u64(), name = %bucket.name, "recovered bucket");

        Ok(BucketRead::Bucket(RecoveredBucket {
            bucket,
            meta,
            offset,
        }))
    }

    /// Closes the file.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Storage`] if closing fails.
    pub fn release(self) -> CoreResult<()> {
        debug!(path = %self.file.path().display(), "recovery reader released");
        self.file.close()?;
        Ok(())
    }
}
