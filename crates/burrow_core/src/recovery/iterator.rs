//! Iterators over a file being recovered.

use super::reader::{BucketRead, EntryRead, RecoveredBucket, RecoveredEntry, RecoveryReader};
use crate::error::CoreResult;
use crate::format::Entry;

/// Why an iterator stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStop {
    /// A zero header or a clean end of the catalog stream.
    EndOfData,
    /// The offset reached the end of the file without a zero header.
    EndOfFile,
    /// The last item yielded was an error.
    Failed,
}

/// Iterator over consecutive entries of a data file.
///
/// Yields `(offset, entry)` pairs. Iteration ends at a zero header, at the
/// end of the file, or after the first error; once it has ended it keeps
/// returning `None`.
pub struct EntryIter<'a> {
    reader: &'a mut RecoveryReader,
    offset: u64,
    stop: Option<ScanStop>,
}

impl<'a> EntryIter<'a> {
    pub(crate) fn new(reader: &'a mut RecoveryReader, start: u64) -> Self {
        Self {
            reader,
            offset: start,
            stop: None,
        }
    }

    /// Returns the offset of the next entry to read.
    ///
    /// After a failure this is the offset of the entry that failed, which is
    /// where a torn file would be cut.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns why iteration ended, or `None` while it is still running.
    #[must_use]
    pub fn stop(&self) -> Option<ScanStop> {
        self.stop
    }
}

impl Iterator for EntryIter<'_> {
    type Item = CoreResult<(u64, Entry)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stop.is_some() {
            return None;
        }
        if self.offset >= self.reader.file_size() {
            self.stop = Some(ScanStop::EndOfFile);
            return None;
        }

        match self.reader.read_entry_at(self.offset) {
            Ok(EntryRead::Entry(RecoveredEntry { entry, size })) => {
                let at = self.offset;
                self.offset += size;
                Some(Ok((at, entry)))
            }
            Ok(EntryRead::EndOfData) => {
                self.stop = Some(ScanStop::EndOfData);
                None
            }
            Err(e) => {
                self.stop = Some(ScanStop::Failed);
                Some(Err(e))
            }
        }
    }
}

/// Iterator over the records of a bucket catalog.
///
/// Ends at the end of the stream or after the first error.
pub struct BucketIter<'a> {
    reader: &'a mut RecoveryReader,
    stop: Option<ScanStop>,
}

impl<'a> BucketIter<'a> {
    pub(crate) fn new(reader: &'a mut RecoveryReader) -> Self {
        Self { reader, stop: None }
    }

    /// Returns why iteration ended, or `None` while it is still running.
    #[must_use]
    pub fn stop(&self) -> Option<ScanStop> {
        self.stop
    }
}

impl Iterator for BucketIter<'_> {
    type Item = CoreResult<RecoveredBucket>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.stop.is_some() {
            return None;
        }

        match self.reader.read_next_bucket() {
            Ok(BucketRead::Bucket(bucket)) => Some(Ok(bucket)),
            Ok(BucketRead::EndOfStream) => {
                self.stop = Some(ScanStop::EndOfData);
                None
            }
            Err(e) => {
                self.stop = Some(ScanStop::Failed);
                Some(Err(e))
            }
        }
    }
}

impl RecoveryReader {
    /// Iterates over the entries starting at `start`.
    pub fn entries(&mut self, start: u64) -> EntryIter<'_> {
        EntryIter::new(self, start)
    }

    /// Iterates over the remaining records of the bucket catalog.
    pub fn buckets(&mut self) -> BucketIter<'_> {
        BucketIter::new(self)
    }
}
