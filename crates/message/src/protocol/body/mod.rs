//! Message body streams.
//!
//! - [`Stream`]: the owned byte handle (memory, file, or input channel)
//! - [`InputStream`]: the read-once input channel adapter with replay cache
//! - [`BodySource`]: what a message constructor accepts as a body
//! - [`Body`]: the handle a message stores
//!
//! A [`Body`] moves wholesale between messages: `with_body` consumes the old message, so
//! the replaced stream is dropped (and closed) with it. Copy-producing mutators that do not
//! touch the body keep the same handle, because a stream cursor cannot be duplicated.

mod input;
mod stream;

pub use input::InputStream;
pub use stream::MEMORY_IDENTIFIER;
pub use stream::Mode;
pub use stream::STDIN_IDENTIFIER;
pub use stream::Stream;

use std::fs::File;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;

use crate::protocol::InvalidArgument;

/// The accepted ways to supply a message body.
#[derive(Debug)]
pub enum BodySource {
    /// A named resource, opened on first access.
    Identifier(String),
    /// An already open resource handle.
    File(File),
    /// A ready stream, used unchanged.
    Stream(Stream),
}

impl BodySource {
    /// Turns the source into a stream; identifiers are opened and files are used with `mode`.
    pub fn into_stream(self, mode: Mode) -> Result<Stream, InvalidArgument> {
        match self {
            BodySource::Identifier(identifier) => Stream::from_identifier(&identifier, mode),
            BodySource::File(file) => Ok(Stream::from_file(file, mode)),
            BodySource::Stream(stream) => Ok(stream),
        }
    }
}

impl Default for BodySource {
    fn default() -> Self {
        BodySource::Identifier(STDIN_IDENTIFIER.to_string())
    }
}

impl From<&str> for BodySource {
    fn from(identifier: &str) -> Self {
        BodySource::Identifier(identifier.to_string())
    }
}

impl From<String> for BodySource {
    fn from(identifier: String) -> Self {
        BodySource::Identifier(identifier)
    }
}

impl From<File> for BodySource {
    fn from(file: File) -> Self {
        BodySource::File(file)
    }
}

impl From<Stream> for BodySource {
    fn from(stream: Stream) -> Self {
        BodySource::Stream(stream)
    }
}

/// The body handle stored inside a message.
#[derive(Debug, Clone)]
pub struct Body {
    inner: Arc<Mutex<Stream>>,
}

impl Body {
    pub fn new(stream: Stream) -> Self {
        Self { inner: Arc::new(Mutex::new(stream)) }
    }

    /// An empty, writable in-memory body.
    pub fn empty() -> Self {
        Self::new(Stream::memory())
    }

    /// Resolves a [`BodySource`], opening identifiers with `mode`.
    pub fn from_source<S: Into<BodySource>>(source: S, mode: Mode) -> Result<Self, InvalidArgument> {
        source.into().into_stream(mode).map(Self::new)
    }

    /// Runs `f` with exclusive access to the stream.
    pub fn with_stream<T, F>(&self, f: F) -> io::Result<T>
    where
        F: FnOnce(&mut Stream) -> io::Result<T>,
    {
        let mut guard = self.lock()?;
        f(&mut guard)
    }

    /// Appends `data` at the current position.
    pub fn write<D: AsRef<[u8]>>(&self, data: D) -> io::Result<usize> {
        let data = data.as_ref();
        self.with_stream(|stream| stream.write_all(data).map(|()| data.len()))
    }

    /// Remaining contents as text.
    pub fn contents(&self) -> io::Result<String> {
        self.with_stream(Stream::contents)
    }

    /// The whole body as text, from its first byte.
    pub fn full_contents(&self) -> io::Result<String> {
        self.with_stream(Stream::full_contents)
    }

    /// The whole body as bytes, from its first byte.
    pub fn to_bytes(&self) -> io::Result<Bytes> {
        self.with_stream(Stream::full_bytes)
    }

    pub fn size(&self) -> Option<u64> {
        self.lock().ok().and_then(|stream| stream.size())
    }

    /// Returns true when both handles refer to the same stream.
    #[inline]
    pub fn ptr_eq(&self, other: &Body) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn lock(&self) -> io::Result<MutexGuard<'_, Stream>> {
        self.inner.lock().map_err(|e| io::Error::other(e.to_string()))
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Stream> for Body {
    fn from(stream: Stream) -> Self {
        Self::new(stream)
    }
}
