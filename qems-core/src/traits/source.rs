//! Line-oriented data source traits
//!
//! The schedules live as files on the device file system (LittleFS on the
//! ESP32). The store only needs to probe for a file, open it and read it
//! line by line; closing happens when the reader is dropped.

use heapless::String;

/// Longest line kept by a reader; the store only looks at the first 25 chars
pub const MAX_LINE_LEN: usize = 64;

/// Buffer a reader fills with one line
pub type LineBuffer = String<MAX_LINE_LEN>;

/// Errors from line source operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SourceError {
    /// No resource with this identifier
    NotFound,
    /// Underlying storage failed
    Io,
}

/// Sequential reader over an opened source
pub trait LineReader {
    /// Read the next line into `buf`, without the line terminator
    ///
    /// Returns `Ok(false)` once the source is exhausted. Lines longer than
    /// [`MAX_LINE_LEN`] are truncated and the remainder is discarded.
    fn read_line(&mut self, buf: &mut LineBuffer) -> Result<bool, SourceError>;
}

/// Storage that hands out line readers by identifier
///
/// A missing resource is a normal outcome (`exists` returns false, `open`
/// returns [`SourceError::NotFound`]).
pub trait LineSource {
    /// Reader type, borrowing the source while open
    type Reader<'a>: LineReader
    where
        Self: 'a;

    /// Check whether a resource with this identifier exists
    fn exists(&self, id: &str) -> bool;

    /// Open a resource for line-oriented reading
    fn open(&self, id: &str) -> Result<Self::Reader<'_>, SourceError>;
}

impl<T: LineSource + ?Sized> LineSource for &T {
    type Reader<'a>
        = T::Reader<'a>
    where
        Self: 'a;

    fn exists(&self, id: &str) -> bool {
        (**self).exists(id)
    }

    fn open(&self, id: &str) -> Result<Self::Reader<'_>, SourceError> {
        (**self).open(id)
    }
}

/// Copy `line` into `buf`, truncating at a char boundary if it does not fit
///
/// Helper for [`LineReader`] implementations.
pub fn fill_line(buf: &mut LineBuffer, line: &str) {
    buf.clear();
    let mut end = line.len().min(MAX_LINE_LEN);
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    let _ = buf.push_str(&line[..end]);
}
