//! Readable, seekable module content

use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};

/// Byte stream handed to the scripting runtime for one module.
///
/// Directory repositories stream straight from the file. Archive entries are
/// decompressed into memory when opened, because a compressed entry can't be
/// read efficiently at arbitrary offsets.
#[derive(Debug)]
pub enum ByteStream {
    File(File),
    Memory(Cursor<Vec<u8>>),
}

impl ByteStream {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::Memory(Cursor::new(bytes))
    }

    /// Total size of the content in bytes.
    pub fn len(&self) -> io::Result<u64> {
        match self {
            Self::File(file) => Ok(file.metadata()?.len()),
            Self::Memory(cursor) => Ok(cursor.get_ref().len() as u64),
        }
    }

    pub fn is_empty(&self) -> io::Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Read the remaining content.
    pub fn into_bytes(mut self) -> io::Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

impl Read for ByteStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::File(file) => file.read(buf),
            Self::Memory(cursor) => cursor.read(buf),
        }
    }
}

impl Seek for ByteStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            Self::File(file) => file.seek(pos),
            Self::Memory(cursor) => cursor.seek(pos),
        }
    }
}
