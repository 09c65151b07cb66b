use std::fs::{self, File, OpenOptions};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::debug;

use super::InputStream;
use crate::ensure;
use crate::protocol::InvalidArgument;

/// Identifier that materializes the process's standard input.
pub const STDIN_IDENTIFIER: &str = "stdin:";

/// Identifier that materializes an empty in-memory read/write buffer.
pub const MEMORY_IDENTIFIER: &str = "memory:";

const FILE_SCHEME: &str = "file://";

/// Access mode used when a named identifier is opened.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mode {
    Read,
    ReadWrite,
}

/// An owned, sequential byte-access handle.
///
/// A stream abstracts over in-memory buffers, files (opened eagerly or on first access)
/// and the process's input channel behind [`Read`], [`Write`] and [`Seek`]. Capabilities
/// differ by source: the input channel is read-only and not seekable, a file identifier
/// opened with [`Mode::Read`] is not writable. After [`Stream::close`] every operation
/// fails with an I/O error.
#[derive(Debug)]
pub struct Stream {
    kind: Kind,
}

#[derive(Debug)]
enum Kind {
    Memory(Cursor<Vec<u8>>),
    Lazy { path: PathBuf, mode: Mode, file: Option<File> },
    File { file: File, mode: Mode },
    Input(InputStream),
    Detached,
}

impl Stream {
    /// An empty in-memory buffer.
    pub fn memory() -> Self {
        Self { kind: Kind::Memory(Cursor::new(Vec::new())) }
    }

    /// An in-memory buffer holding `bytes`, positioned at the start.
    pub fn from_bytes<B: Into<Vec<u8>>>(bytes: B) -> Self {
        Self { kind: Kind::Memory(Cursor::new(bytes.into())) }
    }

    /// Wraps an already open file. Writes are refused unless `mode` is [`Mode::ReadWrite`].
    pub fn from_file(file: File, mode: Mode) -> Self {
        Self { kind: Kind::File { file, mode } }
    }

    /// Wraps a read-once reader as an input channel.
    pub fn from_reader<R: Read + Send + 'static>(reader: R) -> Self {
        Self { kind: Kind::Input(InputStream::new(reader)) }
    }

    /// The process's standard input.
    pub fn stdin() -> Self {
        Self { kind: Kind::Input(InputStream::stdin()) }
    }

    /// Resolves a named identifier.
    ///
    /// [`STDIN_IDENTIFIER`] and [`MEMORY_IDENTIFIER`] are recognized; anything else is a
    /// filesystem path, optionally prefixed with `file://`, that is opened on first access.
    pub fn from_identifier(identifier: &str, mode: Mode) -> Result<Self, InvalidArgument> {
        ensure!(!identifier.is_empty(), InvalidArgument::invalid_body("stream identifier must not be empty"));

        let kind = match identifier {
            STDIN_IDENTIFIER => Kind::Input(InputStream::stdin()),
            MEMORY_IDENTIFIER => Kind::Memory(Cursor::new(Vec::new())),
            _ => {
                let path = match identifier.strip_prefix(FILE_SCHEME) {
                    Some(path) => path,
                    None => {
                        ensure!(
                            !identifier.contains("://"),
                            InvalidArgument::invalid_body(format!("unsupported stream identifier \"{identifier}\""))
                        );
                        identifier
                    }
                };
                ensure!(!path.is_empty(), InvalidArgument::invalid_body("stream identifier names no path"));
                Kind::Lazy { path: PathBuf::from(path), mode, file: None }
            }
        };

        Ok(Self { kind })
    }

    #[inline]
    pub fn is_detached(&self) -> bool {
        matches!(self.kind, Kind::Detached)
    }

    pub fn is_readable(&self) -> bool {
        !self.is_detached()
    }

    pub fn is_writable(&self) -> bool {
        match &self.kind {
            Kind::Memory(_) => true,
            Kind::Lazy { mode, .. } | Kind::File { mode, .. } => *mode == Mode::ReadWrite,
            Kind::Input(_) | Kind::Detached => false,
        }
    }

    pub fn is_seekable(&self) -> bool {
        matches!(self.kind, Kind::Memory(_) | Kind::Lazy { .. } | Kind::File { .. })
    }

    /// Total size in bytes, when it is known without consuming the stream.
    ///
    /// A lazily opened file reports the size on disk without opening it.
    pub fn size(&self) -> Option<u64> {
        match &self.kind {
            Kind::Memory(cursor) => Some(cursor.get_ref().len() as u64),
            Kind::Lazy { file: Some(file), .. } | Kind::File { file, .. } => file.metadata().ok().map(|m| m.len()),
            Kind::Lazy { path, file: None, .. } => fs::metadata(path).ok().map(|m| m.len()),
            Kind::Input(input) if input.is_eof() => Some(input.cached().len() as u64),
            Kind::Input(_) | Kind::Detached => None,
        }
    }

    /// Current read/write position.
    pub fn tell(&mut self) -> io::Result<u64> {
        if let Kind::Input(input) = &self.kind {
            return Ok(input.cached().len() as u64);
        }
        self.stream_position()
    }

    /// Returns true when nothing is left to read.
    pub fn eof(&mut self) -> bool {
        match &self.kind {
            Kind::Input(input) => return input.is_eof(),
            Kind::Detached => return true,
            // left unopened until the first read
            Kind::Lazy { file: None, .. } => return false,
            _ => {}
        }

        match (self.tell(), self.size()) {
            (Ok(position), Some(size)) => position >= size,
            _ => false,
        }
    }

    pub fn rewind(&mut self) -> io::Result<()> {
        self.seek(SeekFrom::Start(0)).map(|_| ())
    }

    /// Reads the remaining bytes as text.
    pub fn contents(&mut self) -> io::Result<String> {
        let mut contents = String::new();
        self.read_to_string(&mut contents)?;
        Ok(contents)
    }

    /// Reads the whole stream from its first byte.
    ///
    /// Seekable streams are rewound first. The input channel hands out its cache plus
    /// whatever was still unread.
    pub fn full_bytes(&mut self) -> io::Result<Bytes> {
        if let Kind::Input(input) = &mut self.kind {
            return input.full_contents().map(Bytes::copy_from_slice);
        }

        self.rewind()?;
        let mut bytes = Vec::new();
        self.read_to_end(&mut bytes)?;
        Ok(Bytes::from(bytes))
    }

    /// Reads the whole stream from its first byte as text.
    pub fn full_contents(&mut self) -> io::Result<String> {
        let bytes = self.full_bytes()?;
        String::from_utf8(bytes.into()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Releases the underlying resource; the stream is unusable afterwards.
    pub fn close(&mut self) {
        if !self.is_detached() {
            debug!("closing stream");
        }
        self.kind = Kind::Detached;
    }
}

fn detached() -> io::Error {
    io::Error::other("stream is detached")
}

fn not_writable() -> io::Error {
    io::Error::new(io::ErrorKind::PermissionDenied, "stream is not writable")
}

fn not_seekable() -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, "stream is not seekable")
}

fn open_lazily<'a>(path: &Path, mode: Mode, file: &'a mut Option<File>) -> io::Result<&'a mut File> {
    if file.is_none() {
        let opened = match mode {
            Mode::Read => File::open(path)?,
            Mode::ReadWrite => OpenOptions::new().read(true).write(true).create(true).truncate(false).open(path)?,
        };
        debug!(path = %path.display(), ?mode, "opened stream");
        *file = Some(opened);
    }

    file.as_mut().ok_or_else(|| io::Error::other("stream could not be opened"))
}

impl Read for Stream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.kind {
            Kind::Memory(cursor) => cursor.read(buf),
            Kind::Lazy { path, mode, file } => open_lazily(path, *mode, file)?.read(buf),
            Kind::File { file, .. } => file.read(buf),
            Kind::Input(input) => input.read(buf),
            Kind::Detached => Err(detached()),
        }
    }
}

impl Write for Stream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.kind {
            Kind::Memory(cursor) => cursor.write(buf),
            Kind::Lazy { mode: Mode::Read, .. } | Kind::File { mode: Mode::Read, .. } | Kind::Input(_) => {
                Err(not_writable())
            }
            Kind::Lazy { path, mode, file } => open_lazily(path, *mode, file)?.write(buf),
            Kind::File { file, .. } => file.write(buf),
            Kind::Detached => Err(detached()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.kind {
            Kind::Lazy { file: Some(file), .. } | Kind::File { file, .. } => file.flush(),
            Kind::Detached => Err(detached()),
            _ => Ok(()),
        }
    }
}

impl Seek for Stream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match &mut self.kind {
            Kind::Memory(cursor) => cursor.seek(pos),
            Kind::Lazy { path, mode, file } => open_lazily(path, *mode, file)?.seek(pos),
            Kind::File { file, .. } => file.seek(pos),
            Kind::Input(_) => Err(not_seekable()),
            Kind::Detached => Err(detached()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::process;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(format!("micro-message-{}-{name}", process::id()))
    }

    #[test]
    fn memory_stream_is_readable_writable_seekable() {
        let mut stream = Stream::memory();
        assert!(stream.is_readable());
        assert!(stream.is_writable());
        assert!(stream.is_seekable());

        stream.write_all(b"Howdy").unwrap();
        assert_eq!(stream.tell().unwrap(), 5);
        assert!(stream.eof());
        assert_eq!(stream.size(), Some(5));

        // nothing left after the cursor
        assert_eq!(stream.contents().unwrap(), "");
        assert_eq!(stream.full_contents().unwrap(), "Howdy");
    }

    #[test]
    fn contents_reads_from_the_cursor() {
        let mut stream = Stream::from_bytes("hello world");
        stream.seek(SeekFrom::Start(6)).unwrap();
        assert_eq!(stream.contents().unwrap(), "world");
        assert!(stream.eof());
    }

    #[test]
    fn file_identifier_is_opened_lazily() {
        let path = temp_path("lazy.txt");
        let _ = fs::remove_file(&path);

        let identifier = path.to_str().unwrap().to_string();
        let mut stream = Stream::from_identifier(&identifier, Mode::Read).unwrap();
        // the file does not exist yet, but nothing was opened
        assert_eq!(stream.size(), None);

        fs::write(&path, "lazy body").unwrap();
        assert_eq!(stream.size(), Some(9));
        assert!(!stream.is_writable());
        assert_eq!(stream.contents().unwrap(), "lazy body");
        assert_eq!(stream.write(b"x").unwrap_err().kind(), io::ErrorKind::PermissionDenied);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn unopened_file_is_not_at_eof() {
        let path = temp_path("untouched.txt");
        let _ = fs::remove_file(&path);

        let mut stream = Stream::from_identifier(path.to_str().unwrap(), Mode::ReadWrite).unwrap();
        assert!(!stream.eof());
        assert!(!path.exists());
    }

    #[test]
    fn open_file_honors_its_mode() {
        let path = temp_path("open.txt");
        fs::write(&path, "on disk").unwrap();

        let mut read_only = Stream::from_file(File::open(&path).unwrap(), Mode::Read);
        assert!(!read_only.is_writable());
        assert!(read_only.is_seekable());
        assert_eq!(read_only.write(b"x").unwrap_err().kind(), io::ErrorKind::PermissionDenied);
        assert_eq!(read_only.full_contents().unwrap(), "on disk");

        let file = fs::OpenOptions::new().read(true).write(true).open(&path).unwrap();
        let mut read_write = Stream::from_file(file, Mode::ReadWrite);
        assert!(read_write.is_writable());
        read_write.seek(SeekFrom::End(0)).unwrap();
        read_write.write_all(b"!").unwrap();
        assert_eq!(read_write.full_contents().unwrap(), "on disk!");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_fails_on_first_read() {
        let path = temp_path("missing.txt");
        let _ = fs::remove_file(&path);

        let mut stream = Stream::from_identifier(&format!("file://{}", path.display()), Mode::Read).unwrap();
        assert_eq!(stream.contents().unwrap_err().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn read_write_identifier_creates_the_file() {
        let path = temp_path("rw.txt");
        let _ = fs::remove_file(&path);

        let mut stream = Stream::from_identifier(path.to_str().unwrap(), Mode::ReadWrite).unwrap();
        stream.write_all(b"written").unwrap();
        stream.flush().unwrap();
        assert_eq!(stream.full_contents().unwrap(), "written");
        assert_eq!(fs::read_to_string(&path).unwrap(), "written");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn sentinel_identifiers() {
        let memory = Stream::from_identifier(MEMORY_IDENTIFIER, Mode::ReadWrite).unwrap();
        assert!(memory.is_writable());
        assert_eq!(memory.size(), Some(0));

        let stdin = Stream::from_identifier(STDIN_IDENTIFIER, Mode::Read).unwrap();
        assert!(stdin.is_readable());
        assert!(!stdin.is_writable());
        assert!(!stdin.is_seekable());
    }

    #[test]
    fn rejects_unusable_identifiers() {
        for identifier in ["", "http://example.com/body", "file://"] {
            assert!(
                matches!(Stream::from_identifier(identifier, Mode::Read), Err(InvalidArgument::InvalidBody { .. })),
                "{identifier:?}"
            );
        }
    }

    #[test]
    fn input_stream_is_not_seekable_but_replays() {
        let mut stream = Stream::from_reader(Cursor::new(b"a=1&b=2".to_vec()));
        let mut head = [0u8; 3];
        stream.read_exact(&mut head).unwrap();

        assert_eq!(stream.tell().unwrap(), 3);
        assert_eq!(stream.rewind().unwrap_err().kind(), io::ErrorKind::Unsupported);
        assert_eq!(stream.full_contents().unwrap(), "a=1&b=2");
        assert!(stream.eof());
        assert_eq!(stream.size(), Some(7));
    }

    #[test]
    fn closed_stream_rejects_everything() {
        let mut stream = Stream::from_bytes("gone");
        stream.close();

        assert!(stream.is_detached());
        assert!(!stream.is_readable());
        assert!(!stream.is_writable());
        assert!(stream.eof());
        assert!(stream.contents().is_err());
        assert!(stream.write(b"x").is_err());
        assert!(stream.rewind().is_err());
    }
}
