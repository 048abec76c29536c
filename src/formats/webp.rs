//! WEBP parsing: dimensions come from the first chunk inside the RIFF
//! container, whose layout depends on the chunk type.

use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};

use crate::common::riff::{self, ChunkId};
use crate::source::ReplayReader;
use crate::traits::{Detail, HeaderParser};
use crate::types::{ImageInfo, ImageSize, ImageType, Result};

const WEBP_CHUNK_TYPE: ChunkId = ChunkId(*b"WEBP");
const VP8_CHUNK_ID: ChunkId = ChunkId(*b"VP8 ");
const VP8L_CHUNK_ID: ChunkId = ChunkId(*b"VP8L");
const VP8X_CHUNK_ID: ChunkId = ChunkId(*b"VP8X");

// RIFF header plus the header of the first chunk
const FIRST_CHUNK_DATA: u64 = 20;

const VP8_KEY_FRAME_MAGIC: [u8; 3] = [0x9d, 0x01, 0x2a];
const VP8L_SIGNATURE: u8 = 0x2f;

pub struct Webp;

impl HeaderParser for Webp {
    const IMAGE_TYPE: ImageType = ImageType::Webp;

    fn parse<R: Read>(source: &mut ReplayReader<R>, _detail: Detail, info: &mut ImageInfo) -> Result<()> {
        let (_, form) = riff::read_root(source)?;
        if form != WEBP_CHUNK_TYPE {
            return Err(invalid_format!("invalid WEBP signature: {}", form));
        }

        let chunk = riff::read_chunk_header(source, 12)?;
        info.size = match chunk.id {
            VP8_CHUNK_ID => read_vp8(source)?,
            VP8L_CHUNK_ID => read_vp8l(source)?,
            VP8X_CHUNK_ID => read_vp8x(source)?,
            cid => return Err(invalid_format!("invalid WEBP chunk id: {}", cid)),
        };
        Ok(())
    }
}

// Lossy: a VP8 key frame header.
fn read_vp8<R: Read>(source: &mut ReplayReader<R>) -> Result<ImageSize> {
    let mut hdr = [0u8; 10];
    source
        .read_at(&mut hdr, FIRST_CHUNK_DATA)
        .map_err(if_eof!("when reading VP8 frame header"))?;

    // the first three bytes are the frame tag, bit 0 is set for interframes
    if hdr[0] & 1 != 0 {
        return Err(invalid_format!("first VP8 frame is not a key frame"));
    }
    if hdr[3..6] != VP8_KEY_FRAME_MAGIC {
        return Err(invalid_format!("VP8 key frame magic code is invalid: {:02x?}", &hdr[3..6]));
    }

    // the top two bits of each dimension hold the scaling mode
    let width = LittleEndian::read_u16(&hdr[6..8]) & 0x3fff;
    let height = LittleEndian::read_u16(&hdr[8..10]) & 0x3fff;
    Ok(ImageSize::new(width as u32, height as u32))
}

// Lossless: signature byte, then 14-bit width-1 and height-1 packed into
// the next four bytes.
fn read_vp8l<R: Read>(source: &mut ReplayReader<R>) -> Result<ImageSize> {
    let mut hdr = [0u8; 5];
    source
        .read_at(&mut hdr, FIRST_CHUNK_DATA)
        .map_err(if_eof!("when reading VP8L header"))?;

    if hdr[0] != VP8L_SIGNATURE {
        return Err(invalid_format!("invalid VP8L signature: {:#04x}", hdr[0]));
    }

    let bits = LittleEndian::read_u32(&hdr[1..]);
    let width = (bits & 0x3fff) + 1;
    let height = ((bits >> 14) & 0x3fff) + 1;
    Ok(ImageSize::new(width, height))
}

// Extended: flags and reserved bytes, then 24-bit canvas width-1 and height-1.
fn read_vp8x<R: Read>(source: &mut ReplayReader<R>) -> Result<ImageSize> {
    let mut hdr = [0u8; 10];
    source
        .read_at(&mut hdr, FIRST_CHUNK_DATA)
        .map_err(if_eof!("when reading VP8X header"))?;

    let width = LittleEndian::read_u24(&hdr[4..7]) + 1;
    let height = LittleEndian::read_u24(&hdr[7..10]) + 1;
    Ok(ImageSize::new(width, height))
}
