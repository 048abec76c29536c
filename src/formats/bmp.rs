//! BMP header parsing.

use std::io::Read;

use byteorder::{ByteOrder, LittleEndian};

use crate::source::ReplayReader;
use crate::traits::{Detail, HeaderParser};
use crate::types::{ImageInfo, ImageSize, ImageType, Result};

// file header (14 bytes), DIB header size and the two dimension fields
const HEADER_LEN: usize = 26;

/// OS/2 `BITMAPCOREHEADER`, the only DIB header with 16-bit dimensions.
const CORE_HEADER_SIZE: u32 = 12;

pub struct Bmp;

impl HeaderParser for Bmp {
    const IMAGE_TYPE: ImageType = ImageType::Bmp;

    fn parse<R: Read>(source: &mut ReplayReader<R>, _detail: Detail, info: &mut ImageInfo) -> Result<()> {
        let mut hdr = [0u8; HEADER_LEN];
        source.read_at(&mut hdr, 0).map_err(if_eof!("when reading BMP header"))?;

        let dib_size = LittleEndian::read_u32(&hdr[14..18]);
        info.size = if dib_size == CORE_HEADER_SIZE {
            ImageSize::new(
                LittleEndian::read_u16(&hdr[18..20]) as u32,
                LittleEndian::read_u16(&hdr[20..22]) as u32,
            )
        } else {
            // a negative height marks a top-down bitmap
            let width = LittleEndian::read_i32(&hdr[18..22]);
            let height = LittleEndian::read_i32(&hdr[22..26]);
            ImageSize::from_fields(width, height.unsigned_abs())?
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use byteorder::{LittleEndian, WriteBytesExt};

    use crate::source::ReplayReader;
    use crate::traits::{Detail, HeaderParser};
    use crate::types::{Error, ImageInfo, ImageSize};

    use super::Bmp;

    fn header(dib_size: u32, width: i32, height: i32) -> Vec<u8> {
        let mut data = b"BM".to_vec();
        data.write_u32::<LittleEndian>(0).unwrap();
        data.write_u32::<LittleEndian>(0).unwrap();
        data.write_u32::<LittleEndian>(14 + dib_size).unwrap();
        data.write_u32::<LittleEndian>(dib_size).unwrap();
        data.write_i32::<LittleEndian>(width).unwrap();
        data.write_i32::<LittleEndian>(height).unwrap();
        data
    }

    fn parse(data: &[u8]) -> crate::Result<ImageSize> {
        let mut prefix = Vec::new();
        let mut r = ReplayReader::new(data, &mut prefix);
        let mut info = ImageInfo::default();
        Bmp::parse(&mut r, Detail::Full, &mut info)?;
        Ok(info.size)
    }

    #[test]
    fn test_info_header() {
        assert_eq!(parse(&header(40, 640, 480)).unwrap(), ImageSize::new(640, 480));
    }

    #[test]
    fn test_top_down() {
        assert_eq!(parse(&header(124, 32, -16)).unwrap(), ImageSize::new(32, 16));
    }

    #[test]
    fn test_core_header() {
        let mut data = b"BM".to_vec();
        data.extend_from_slice(&[0; 8]);
        data.write_u32::<LittleEndian>(26).unwrap();
        data.write_u32::<LittleEndian>(12).unwrap();
        data.write_u16::<LittleEndian>(300).unwrap();
        data.write_u16::<LittleEndian>(200).unwrap();
        data.write_u16::<LittleEndian>(1).unwrap();
        data.write_u16::<LittleEndian>(24).unwrap();
        assert_eq!(parse(&data).unwrap(), ImageSize::new(300, 200));
    }

    #[test]
    fn test_negative_width() {
        match parse(&header(40, -5, 10)) {
            Err(Error::InvalidFormat(_)) => {}
            r => panic!("unexpected result: {:?}", r),
        }
    }

    #[test]
    fn test_truncated() {
        let data = header(40, 640, 480);
        match parse(&data[..20]) {
            Err(Error::UnexpectedEndOfFile(Some(_))) => {}
            r => panic!("unexpected result: {:?}", r),
        }
    }
}
