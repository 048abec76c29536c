//! GIF logical screen descriptor parsing.

use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};

use crate::source::ReplayReader;
use crate::traits::{Detail, HeaderParser};
use crate::types::{ImageInfo, ImageSize, ImageType, Result};

/// GIF file version number.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Version {
    V87a,
    V89a,
}

impl Version {
    fn from_bytes(b: &[u8]) -> Option<Version> {
        match b {
            b"87a" => Some(Version::V87a),
            b"89a" => Some(Version::V89a),
            _ => None,
        }
    }
}

pub struct Gif;

impl HeaderParser for Gif {
    const IMAGE_TYPE: ImageType = ImageType::Gif;

    fn parse<R: Read>(source: &mut ReplayReader<R>, _detail: Detail, info: &mut ImageInfo) -> Result<()> {
        // signature, version, then the logical screen width and height
        let mut hdr = [0u8; 10];
        source.read_at(&mut hdr, 0).map_err(if_eof!("when reading GIF header"))?;

        if &hdr[..3] != b"GIF" {
            return Err(invalid_format!("invalid GIF signature: {:02x?}", &hdr[..3]));
        }
        if Version::from_bytes(&hdr[3..6]).is_none() {
            return Err(invalid_format!("invalid GIF version: {:02x?}", &hdr[3..6]));
        }

        info.size = ImageSize::new(
            LittleEndian::read_u16(&hdr[6..8]) as u32,
            LittleEndian::read_u16(&hdr[8..10]) as u32,
        );
        Ok(())
    }
}
