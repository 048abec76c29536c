//! Orientation lookup in the EXIF block of a JPEG APP1 segment.
//!
//! The block is `Exif\0\0` followed by a small TIFF structure; only the
//! orientation tag of the first directory is looked at.

use log::trace;

use crate::common::tiff::{Entries, Header, Tag, HEADER_SIZE};
use crate::types::{Error, Orientation, Result};

const EXIF_HEADER: &[u8; 4] = b"Exif";
// the header tag is followed by two padding bytes
const TIFF_START: usize = 6;

/// What an APP1 segment turned out to contain.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum App1 {
    /// Some other APP1 payload, e.g. XMP.
    Foreign,
    /// An EXIF block, with the orientation if the tag is present.
    Exif(Option<Orientation>),
}

/// Examines one APP1 segment payload.
///
/// A payload that does not start with the EXIF header is not an error. Once
/// the header matched, a malformed TIFF structure or orientation value is,
/// and so is a block cut short inside the segment: the payload is already
/// complete, so running out of it is a format error rather than a stream one.
pub fn read_app1(payload: &[u8]) -> Result<App1> {
    if !payload.starts_with(EXIF_HEADER) {
        return Ok(App1::Foreign);
    }
    read_exif(payload.get(TIFF_START..).unwrap_or(&[])).map_err(|e| match e {
        Error::UnexpectedEndOfFile(context) => match context {
            Some(context) => invalid_format!("truncated EXIF block {}", context),
            None => invalid_format!("truncated EXIF block"),
        },
        e => e,
    })
}

fn read_exif(tiff: &[u8]) -> Result<App1> {
    let mut raw = [0u8; HEADER_SIZE];
    if tiff.len() < HEADER_SIZE {
        return Err(unexpected_eof!("when reading EXIF TIFF header"));
    }
    raw.copy_from_slice(&tiff[..HEADER_SIZE]);
    // the magic number is not checked, some writers get it wrong
    let header = Header::parse(&raw)?;

    let ifd = match tiff.get(header.first_ifd as usize..) {
        Some(ifd) => ifd,
        None => return Err(unexpected_eof!("when seeking to EXIF IFD at offset {}", header.first_ifd)),
    };

    for entry in Entries::new(ifd, header.byte_order)? {
        let entry = entry?;
        if entry.tag != Tag::Orientation {
            continue;
        }
        let value = entry.short_value();
        trace!("EXIF orientation tag value {}", value);
        return Orientation::from_u16(value)
            .map(|o| App1::Exif(Some(o)))
            .ok_or_else(|| invalid_format!("invalid orientation: {}", value));
    }

    Ok(App1::Exif(None))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};

    use crate::types::{Error, MirrorDirection, Orientation, Rotation};

    use super::{read_app1, App1};

    // An EXIF payload whose directory holds a dummy tag followed by the
    // orientation tag, when given.
    fn exif<B: ByteOrder>(mark: &[u8; 2], orientation: Option<u16>) -> Vec<u8> {
        let mut data = b"Exif\0\0".to_vec();
        data.write_all(mark).unwrap();
        data.write_u16::<B>(42).unwrap();
        data.write_u32::<B>(8).unwrap();

        let count = if orientation.is_some() { 2 } else { 1 };
        data.write_u16::<B>(count).unwrap();
        // Make, ASCII, stored elsewhere
        data.write_u16::<B>(0x010f).unwrap();
        data.write_u16::<B>(2).unwrap();
        data.write_u32::<B>(6).unwrap();
        data.write_u32::<B>(0x40).unwrap();
        if let Some(value) = orientation {
            data.write_u16::<B>(0x0112).unwrap();
            data.write_u16::<B>(3).unwrap();
            data.write_u32::<B>(1).unwrap();
            data.write_u16::<B>(value).unwrap();
            data.write_u16::<B>(0).unwrap();
        }
        data.write_u32::<B>(0).unwrap();
        data
    }

    #[test]
    fn test_all_orientations() {
        let expected = [
            (1, Rotation::Deg0, MirrorDirection::None),
            (2, Rotation::Deg0, MirrorDirection::Horizontal),
            (3, Rotation::Deg180, MirrorDirection::None),
            (4, Rotation::Deg0, MirrorDirection::Vertical),
            (5, Rotation::Deg270, MirrorDirection::Horizontal),
            (6, Rotation::Deg90, MirrorDirection::None),
            (7, Rotation::Deg90, MirrorDirection::Horizontal),
            (8, Rotation::Deg270, MirrorDirection::None),
        ];
        for &(code, rotation, mirror) in &expected {
            for payload in &[exif::<BigEndian>(b"MM", Some(code)), exif::<LittleEndian>(b"II", Some(code))] {
                let o = match read_app1(payload).unwrap() {
                    App1::Exif(Some(o)) => o,
                    r => panic!("unexpected result for {}: {:?}", code, r),
                };
                assert_eq!(o, Orientation::from_u16(code).unwrap());
                assert_eq!((o.rotation(), o.mirror()), (rotation, mirror), "code {}", code);
            }
        }
    }

    #[test]
    fn test_orientation_out_of_range() {
        for &code in &[0u16, 9] {
            match read_app1(&exif::<BigEndian>(b"MM", Some(code))) {
                Err(Error::InvalidFormat(_)) => {}
                r => panic!("unexpected result for {}: {:?}", code, r),
            }
        }
    }

    #[test]
    fn test_no_orientation_tag() {
        assert_eq!(read_app1(&exif::<LittleEndian>(b"II", None)).unwrap(), App1::Exif(None));
    }

    #[test]
    fn test_foreign_payload() {
        assert_eq!(read_app1(b"http://ns.adobe.com/xap/1.0/\0<x:xmpmeta>").unwrap(), App1::Foreign);
        assert_eq!(read_app1(b"Ex").unwrap(), App1::Foreign);
        assert_eq!(read_app1(b"").unwrap(), App1::Foreign);
    }

    #[test]
    fn test_invalid_byte_order() {
        let mut payload = exif::<BigEndian>(b"MM", Some(6));
        payload[6..8].copy_from_slice(b"XY");
        match read_app1(&payload) {
            Err(Error::InvalidFormat(_)) => {}
            r => panic!("unexpected result: {:?}", r),
        }
    }

    #[test]
    fn test_invalid_offset() {
        let mut payload = exif::<BigEndian>(b"MM", Some(6));
        payload[10..14].copy_from_slice(&[0, 0, 0, 7]);
        match read_app1(&payload) {
            Err(Error::InvalidFormat(_)) => {}
            r => panic!("unexpected result: {:?}", r),
        }
    }

    #[test]
    fn test_offset_skips_padding() {
        let mut payload = b"Exif\0\0II\x2a\x00\x0c\x00\x00\x00\xde\xad\xbe\xef".to_vec();
        payload.write_u16::<LittleEndian>(1).unwrap();
        payload.write_all(&[0x12, 0x01, 0x03, 0x00, 1, 0, 0, 0, 3, 0, 0, 0]).unwrap();
        assert_eq!(read_app1(&payload).unwrap(), App1::Exif(Some(Orientation::Rotate180)));
    }

    #[test]
    fn test_truncated_block() {
        let payload = exif::<BigEndian>(b"MM", Some(6));
        // cut inside the directory, inside the TIFF header, and before IFD0
        for &end in &[20, 10] {
            match read_app1(&payload[..end]) {
                Err(ref e @ Error::InvalidFormat(_)) => assert!(!e.is_stream_error()),
                r => panic!("unexpected result for {} bytes: {:?}", end, r),
            }
        }
        let mut payload = payload;
        payload[10..14].copy_from_slice(&[0, 0, 0, 0x40]);
        match read_app1(&payload) {
            Err(Error::InvalidFormat(_)) => {}
            r => panic!("unexpected result: {:?}", r),
        }
    }
}
