//! TIFF header and image file directory (IFD) structures, shared by TIFF
//! files and the EXIF block embedded in JPEG files.

use std::io::Read;

use crate::types::Result;
use crate::utils::ByteOrderReadExt;

pub use crate::utils::ByteOrder;

/// Size of the header: byte order mark, magic number and first IFD offset.
pub const HEADER_SIZE: usize = 8;
pub const ENTRY_SIZE: usize = 12;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Header {
    pub byte_order: ByteOrder,
    pub magic: u16,
    /// Offset of the first IFD from the start of the header.
    pub first_ifd: u32,
}

impl Header {
    pub fn parse(raw: &[u8; HEADER_SIZE]) -> Result<Header> {
        let byte_order = ByteOrder::from_mark([raw[0], raw[1]])
            .ok_or_else(|| invalid_format!("invalid byte order mark: {:02x?}", &raw[..2]))?;
        let magic = byte_order.u16(&raw[2..4]);
        let first_ifd = byte_order.u32(&raw[4..8]);
        if (first_ifd as usize) < HEADER_SIZE {
            return Err(invalid_format!("invalid IFD offset: {}", first_ifd));
        }
        Ok(Header { byte_order, magic, first_ifd })
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Tag {
    ImageWidth,
    ImageLength,
    Orientation,
    Other(u16),
}

impl Tag {
    pub fn from_u16(n: u16) -> Tag {
        match n {
            0x0100 => Tag::ImageWidth,
            0x0101 => Tag::ImageLength,
            0x0112 => Tag::Orientation,
            n => Tag::Other(n),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum FieldType {
    Short,
    Long,
    Other(u16),
}

impl FieldType {
    fn from_u16(n: u16) -> FieldType {
        match n {
            3 => FieldType::Short,
            4 => FieldType::Long,
            n => FieldType::Other(n),
        }
    }
}

/// One 12-byte directory entry. Values of four bytes or less are stored
/// inline; offsets to larger values are never followed.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Entry {
    pub tag: Tag,
    pub field_type: FieldType,
    value: [u8; 4],
    byte_order: ByteOrder,
}

impl Entry {
    pub fn parse(raw: &[u8; ENTRY_SIZE], byte_order: ByteOrder) -> Entry {
        Entry {
            tag: Tag::from_u16(byte_order.u16(&raw[0..2])),
            field_type: FieldType::from_u16(byte_order.u16(&raw[2..4])),
            value: [raw[8], raw[9], raw[10], raw[11]],
            byte_order,
        }
    }

    /// First two bytes of the value field, whatever the declared type.
    #[inline]
    pub fn short_value(&self) -> u16 {
        self.byte_order.u16(&self.value[..2])
    }

    /// Inline integer value for SHORT and LONG entries.
    pub fn integer_value(&self) -> Option<u32> {
        match self.field_type {
            FieldType::Short => Some(self.short_value() as u32),
            FieldType::Long => Some(self.byte_order.u32(&self.value)),
            FieldType::Other(_) => None,
        }
    }
}

/// Iterates over the entries of one IFD. The source must be positioned at the
/// entry count.
pub struct Entries<R> {
    source: R,
    byte_order: ByteOrder,
    count: u16,
    next: u16,
}

impl<R: Read> Entries<R> {
    pub fn new(mut source: R, byte_order: ByteOrder) -> Result<Entries<R>> {
        let count = source
            .read_u16_in(byte_order)
            .map_err(if_eof!("when reading number of IFD entries"))?;
        Ok(Entries { source, byte_order, count, next: 0 })
    }

    /// Number of entries the directory declares.
    #[inline]
    pub fn entry_count(&self) -> u16 {
        self.count
    }

    fn read_entry(&mut self) -> Result<Entry> {
        let mut raw = [0u8; ENTRY_SIZE];
        self.source
            .read_exact(&mut raw)
            .map_err(if_eof!("when reading IFD entry {}", self.next))?;
        Ok(Entry::parse(&raw, self.byte_order))
    }
}

impl<R: Read> Iterator for Entries<R> {
    type Item = Result<Entry>;

    fn next(&mut self) -> Option<Result<Entry>> {
        if self.next == self.count {
            return None;
        }
        let entry = self.read_entry();
        // a broken entry ends the directory
        self.next = if entry.is_ok() { self.next + 1 } else { self.count };
        Some(entry)
    }
}
