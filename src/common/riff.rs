use std::fmt;
use std::io::Read;
use std::str;

use byteorder::{ByteOrder, LittleEndian};

use crate::source::ReplayReader;
use crate::types::Result;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ChunkId(pub [u8; 4]);

impl ChunkId {
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        str::from_utf8(&self.0).ok()
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.as_str() {
            Some(s) => write!(f, "{:?}", s),
            None => write!(f, "{:02x?}", self.0),
        }
    }
}

pub const RIFF_CHUNK_ID: ChunkId = ChunkId(*b"RIFF");

/// Size of a chunk header: four-byte id and little-endian length.
pub const CHUNK_HEADER_SIZE: u64 = 8;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ChunkHeader {
    pub id: ChunkId,
    pub len: u32,
}

/// Reads the chunk header at `offset`.
pub fn read_chunk_header<R: Read>(source: &mut ReplayReader<R>, offset: u64) -> Result<ChunkHeader> {
    let mut buf = [0u8; CHUNK_HEADER_SIZE as usize];
    source
        .read_at(&mut buf, offset)
        .map_err(if_eof!("when reading RIFF chunk header at offset {}", offset))?;
    Ok(ChunkHeader {
        id: ChunkId([buf[0], buf[1], buf[2], buf[3]]),
        len: LittleEndian::read_u32(&buf[4..]),
    })
}

/// Reads the root `RIFF` chunk header and the form type that follows it.
pub fn read_root<R: Read>(source: &mut ReplayReader<R>) -> Result<(ChunkHeader, ChunkId)> {
    let root = read_chunk_header(source, 0)?;
    if root.id != RIFF_CHUNK_ID {
        return Err(invalid_format!("RIFF file header is invalid: {}", root.id));
    }

    let mut form = [0u8; 4];
    source
        .read_at(&mut form, CHUNK_HEADER_SIZE)
        .map_err(if_eof!("when reading RIFF form type"))?;
    Ok((root, ChunkId(form)))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use byteorder::{LittleEndian, WriteBytesExt};

    use crate::source::ReplayReader;
    use crate::types::Error;

    use super::{read_chunk_header, read_root, ChunkId};

    macro_rules! build {
        ($($arg:expr),+) => {{
            let mut data = Vec::new();
            $(data.write_all($arg).unwrap();)+
            data
        }}
    }

    fn n(n: u32) -> [u8; 4] {
        let mut r = [0u8; 4];
        (&mut r as &mut [u8]).write_u32::<LittleEndian>(n).unwrap();
        r
    }

    #[test]
    fn test_invalid_header() {
        let data = b"XXXX\x04\x00\x00\x00abcd";
        let mut prefix = Vec::new();
        let mut r = ReplayReader::new(&data[..], &mut prefix);

        match read_root(&mut r) {
            Err(Error::InvalidFormat(_)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_root_and_first_chunk() {
        let data = build! {
            b"RIFF", &n(20), b"WEBP",
            b"VP8L", &n(5), b"12345"
        };
        let mut prefix = Vec::new();
        let mut r = ReplayReader::new(&data[..], &mut prefix);

        let (root, form) = read_root(&mut r).unwrap();
        assert_eq!(root.id, ChunkId(*b"RIFF"));
        assert_eq!(root.len, 20);
        assert_eq!(form, ChunkId(*b"WEBP"));

        let chunk = read_chunk_header(&mut r, 12).unwrap();
        assert_eq!(chunk.id.as_str(), Some("VP8L"));
        assert_eq!(chunk.len, 5);
    }

    #[test]
    fn test_truncated_header() {
        let data = build! { b"RIFF", &n(20), b"WE" };
        let mut prefix = Vec::new();
        let mut r = ReplayReader::new(&data[..], &mut prefix);

        match read_root(&mut r) {
            Err(Error::UnexpectedEndOfFile(Some(_))) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
