//! A rewindable reader.

use std::io::{self, Read};

use crate::error::{ParseError, Result};

/// Wraps a reader and keeps every byte it hands out until told to stop.
///
/// While the encoding is only tentative the parse may have to start over
/// from byte zero, so everything read so far stays in `buffer`. Once the
/// encoding is certain [`ByteSource::disable_buffering`] commits to
/// forward-only reading and [`ByteSource::rewind`] starts failing.
#[derive(Debug)]
pub struct ByteSource<R> {
    reader: R,
    buffer: Vec<u8>,
    /// Read position inside `buffer`.
    position: usize,
    /// Bytes dropped from the front of `buffer` after buffering ended.
    discarded: usize,
    buffering: bool,
    eof: bool,
}

impl<R: Read> ByteSource<R> {
    /// Start reading from `reader` with buffering enabled.
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            position: 0,
            discarded: 0,
            buffering: true,
            eof: false,
        }
    }

    /// The first `len` bytes of input (fewer at end of input), without
    /// consuming them.
    ///
    /// # Errors
    ///
    /// Propagates reader failures.
    pub fn prefix(&mut self, len: usize) -> io::Result<&[u8]> {
        while self.buffer.len() < len && !self.eof {
            self.fill(len - self.buffer.len())?;
        }
        let end = len.min(self.buffer.len());
        Ok(&self.buffer[..end])
    }

    /// Read up to `out.len()` bytes. Returns 0 at end of input.
    ///
    /// # Errors
    ///
    /// Propagates reader failures.
    pub fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.position == self.buffer.len() {
            if self.eof {
                return Ok(0);
            }
            if !self.buffering {
                self.discarded += self.buffer.len();
                self.buffer.clear();
                self.position = 0;
            }
            self.fill(out.len())?;
        }
        let available = &self.buffer[self.position..];
        let count = available.len().min(out.len());
        out[..count].copy_from_slice(&available[..count]);
        self.position += count;
        Ok(count)
    }

    fn fill(&mut self, wanted: usize) -> io::Result<()> {
        let start = self.buffer.len();
        self.buffer.resize(start + wanted.max(1), 0);
        let read = loop {
            match self.reader.read(&mut self.buffer[start..]) {
                Ok(read) => break read,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => {
                    self.buffer.truncate(start);
                    return Err(err);
                }
            }
        };
        self.buffer.truncate(start + read);
        if read == 0 {
            self.eof = true;
        }
        Ok(())
    }

    /// Go back to byte zero.
    ///
    /// # Errors
    ///
    /// [`ParseError::Unrewindable`] once buffering has been disabled.
    pub fn rewind(&mut self) -> Result<()> {
        if !self.buffering {
            return Err(ParseError::Unrewindable(self.offset()));
        }
        self.position = 0;
        Ok(())
    }

    /// Stop retaining consumed bytes. Irreversible.
    pub fn disable_buffering(&mut self) {
        self.buffering = false;
    }

    /// Whether [`ByteSource::rewind`] can still succeed.
    #[must_use]
    pub const fn is_buffering(&self) -> bool {
        self.buffering
    }

    /// Absolute offset of the next byte to be read.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.discarded + self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewind_replays_buffered_bytes() {
        let mut source = ByteSource::new(&b"hello world"[..]);
        let mut out = [0u8; 5];
        assert_eq!(source.read(&mut out).unwrap(), 5);
        assert_eq!(&out, b"hello");
        source.rewind().unwrap();
        assert_eq!(source.read(&mut out).unwrap(), 5);
        assert_eq!(&out, b"hello");
    }

    #[test]
    fn prefix_does_not_consume() {
        let mut source = ByteSource::new(&b"abcdef"[..]);
        assert_eq!(source.prefix(3).unwrap(), b"abc");
        assert_eq!(source.prefix(100).unwrap(), b"abcdef");
        let mut out = [0u8; 2];
        assert_eq!(source.read(&mut out).unwrap(), 2);
        assert_eq!(&out, b"ab");
    }

    #[test]
    fn rewind_fails_after_buffering_disabled() {
        let mut source = ByteSource::new(&b"abc"[..]);
        let mut out = [0u8; 2];
        let _ = source.read(&mut out).unwrap();
        source.disable_buffering();
        assert!(matches!(source.rewind(), Err(ParseError::Unrewindable(2))));
    }
}
