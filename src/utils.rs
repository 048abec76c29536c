use std::io::{self, BufRead, ErrorKind, Read};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};

/// Endianness chosen at run time, e.g. from a TIFF byte order mark.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// Interprets a TIFF-style byte order mark.
    pub fn from_mark(mark: [u8; 2]) -> Option<ByteOrder> {
        match &mark {
            b"II" => Some(ByteOrder::Little),
            b"MM" => Some(ByteOrder::Big),
            _ => None,
        }
    }

    #[inline]
    pub fn u16(self, buf: &[u8]) -> u16 {
        match self {
            ByteOrder::Little => <LittleEndian as byteorder::ByteOrder>::read_u16(buf),
            ByteOrder::Big => <BigEndian as byteorder::ByteOrder>::read_u16(buf),
        }
    }

    #[inline]
    pub fn u32(self, buf: &[u8]) -> u32 {
        match self {
            ByteOrder::Little => <LittleEndian as byteorder::ByteOrder>::read_u32(buf),
            ByteOrder::Big => <BigEndian as byteorder::ByteOrder>::read_u32(buf),
        }
    }
}

pub trait ByteOrderReadExt: Read {
    #[inline]
    fn read_u16_in(&mut self, order: ByteOrder) -> io::Result<u16> {
        match order {
            ByteOrder::Little => self.read_u16::<LittleEndian>(),
            ByteOrder::Big => self.read_u16::<BigEndian>(),
        }
    }

    #[inline]
    fn read_u32_in(&mut self, order: ByteOrder) -> io::Result<u32> {
        match order {
            ByteOrder::Little => self.read_u32::<LittleEndian>(),
            ByteOrder::Big => self.read_u32::<BigEndian>(),
        }
    }
}

impl<R: Read + ?Sized> ByteOrderReadExt for R {}

pub trait BufReadExt: BufRead {
    /// Discards bytes up to and including `delim`, returning how many were
    /// dropped, or zero if the stream ended before `delim` was found.
    fn skip_until(&mut self, delim: u8) -> io::Result<usize> {
        let mut read = 0;
        loop {
            let (done, used) = {
                let available = match self.fill_buf() {
                    Ok(n) => n,
                    Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e),
                };
                match available.iter().position(|&b| b == delim) {
                    Some(i) => (true, i + 1),
                    None => (false, available.len()),
                }
            };
            self.consume(used);
            read += used;
            if done {
                return Ok(read);
            }
            if used == 0 {
                return Ok(0);
            }
        }
    }

    /// Discards up to `n` bytes, returning how many were actually dropped.
    fn skip_exact(&mut self, n: u64) -> io::Result<u64> {
        let mut skipped = 0;
        while skipped < n {
            let available = match self.fill_buf() {
                Ok(buf) => buf.len() as u64,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            if available == 0 {
                break;
            }
            let to_skip = available.min(n - skipped);
            self.consume(to_skip as usize);
            skipped += to_skip;
        }
        Ok(skipped)
    }
}

impl<R: BufRead + ?Sized> BufReadExt for R {}
