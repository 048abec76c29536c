//! PNG `IHDR` parsing.

use std::io::Read;

use byteorder::{BigEndian, ByteOrder};

use crate::source::ReplayReader;
use crate::traits::{Detail, HeaderParser};
use crate::types::{ImageInfo, ImageSize, ImageType, Result};

const SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";

pub struct Png;

impl HeaderParser for Png {
    const IMAGE_TYPE: ImageType = ImageType::Png;

    fn parse<R: Read>(source: &mut ReplayReader<R>, _detail: Detail, info: &mut ImageInfo) -> Result<()> {
        // signature, IHDR length and type, width, height
        let mut hdr = [0u8; 24];
        source.read_at(&mut hdr, 0).map_err(if_eof!("when reading PNG header"))?;

        if &hdr[..8] != SIGNATURE {
            return Err(invalid_format!("invalid PNG signature: {:02x?}", &hdr[..8]));
        }
        if &hdr[12..16] != b"IHDR" {
            return Err(invalid_format!("invalid PNG chunk: {:02x?}", &hdr[12..16]));
        }

        info.size = ImageSize::new(BigEndian::read_u32(&hdr[16..20]), BigEndian::read_u32(&hdr[20..24]));
        Ok(())
    }
}
