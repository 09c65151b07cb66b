use std::fmt;
use std::io::{self, Read};

/// A read-once input channel, usually the process's standard input.
///
/// Everything read through the adapter is cached, so the whole input can be handed out
/// again by [`InputStream::full_contents`] after a partial read. The source itself is
/// never rewound.
pub struct InputStream {
    reader: Box<dyn Read + Send>,
    cache: Vec<u8>,
    reached_eof: bool,
}

impl InputStream {
    /// Wraps an arbitrary reader as an input channel.
    pub fn new<R: Read + Send + 'static>(reader: R) -> Self {
        Self { reader: Box::new(reader), cache: Vec::new(), reached_eof: false }
    }

    /// Wraps the standard input of the current process.
    pub fn stdin() -> Self {
        Self::new(io::stdin())
    }

    /// Returns true once the underlying reader reported end of input.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.reached_eof
    }

    /// Bytes read so far.
    #[inline]
    pub fn cached(&self) -> &[u8] {
        &self.cache
    }

    /// Drains the remaining input and returns everything from the first byte.
    pub fn full_contents(&mut self) -> io::Result<&[u8]> {
        if !self.reached_eof {
            self.reader.read_to_end(&mut self.cache)?;
            self.reached_eof = true;
        }
        Ok(&self.cache)
    }
}

impl Read for InputStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.reached_eof {
            return Ok(0);
        }

        let n = self.reader.read(buf)?;
        if n == 0 && !buf.is_empty() {
            self.reached_eof = true;
        }
        self.cache.extend_from_slice(&buf[..n]);
        Ok(n)
    }
}

impl fmt::Debug for InputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputStream")
            .field("cached", &self.cache.len())
            .field("reached_eof", &self.reached_eof)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::InputStream;
    use std::io::{Cursor, Read};

    #[test]
    fn full_contents_after_partial_read() {
        let mut input = InputStream::new(Cursor::new(b"name=zava&zip=10001".to_vec()));

        let mut head = [0u8; 4];
        input.read_exact(&mut head).unwrap();
        assert_eq!(&head, b"name");
        assert!(!input.is_eof());

        assert_eq!(input.full_contents().unwrap(), b"name=zava&zip=10001");
        assert!(input.is_eof());
        // repeatable once drained
        assert_eq!(input.full_contents().unwrap(), b"name=zava&zip=10001");
    }

    #[test]
    fn read_after_eof_returns_zero() {
        let mut input = InputStream::new(Cursor::new(b"ab".to_vec()));
        let mut all = String::new();
        input.read_to_string(&mut all).unwrap();
        assert_eq!(all, "ab");

        let mut buf = [0u8; 8];
        assert_eq!(input.read(&mut buf).unwrap(), 0);
        assert_eq!(input.cached(), b"ab");
    }
}
