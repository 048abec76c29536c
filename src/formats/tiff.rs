//! TIFF parsing. Dimensions live in the first image file directory, which may
//! sit anywhere after the header; the parser skips forward to it without
//! retaining the bytes in between.

use std::io::Read;

use log::{debug, trace};

use crate::common::tiff::{Entries, Header, Tag, HEADER_SIZE};
use crate::source::ReplayReader;
use crate::traits::{Detail, HeaderParser};
use crate::types::{ImageInfo, ImageSize, ImageType, Orientation, Result};

const TIFF_MAGIC: u16 = 42;
const BIGTIFF_MAGIC: u16 = 43;

pub struct Tiff;

impl HeaderParser for Tiff {
    const IMAGE_TYPE: ImageType = ImageType::Tiff;

    fn parse<R: Read>(source: &mut ReplayReader<R>, detail: Detail, info: &mut ImageInfo) -> Result<()> {
        let mut raw = [0u8; HEADER_SIZE];
        source.read_at(&mut raw, 0).map_err(if_eof!("when reading TIFF header"))?;
        let header = Header::parse(&raw)?;
        match header.magic {
            TIFF_MAGIC => {}
            BIGTIFF_MAGIC => return Err(unsupported!("BigTIFF files")),
            magic => return Err(invalid_format!("invalid TIFF magic number: {}", magic)),
        }

        source
            .skip_to(header.first_ifd as u64)
            .map_err(if_eof!("when seeking to IFD at offset {}", header.first_ifd))?;

        let want_orientation = detail == Detail::Full;
        let mut width = None;
        let mut height = None;
        let mut orientation = None;

        let entries = Entries::new(&mut *source, header.byte_order)?;
        trace!("TIFF IFD at offset {} has {} entries", header.first_ifd, entries.entry_count());
        for entry in entries {
            let entry = entry?;
            match entry.tag {
                Tag::ImageWidth => width = entry.integer_value(),
                Tag::ImageLength => height = entry.integer_value(),
                Tag::Orientation if want_orientation => {
                    let value = entry.short_value();
                    orientation = Some(
                        Orientation::from_u16(value)
                            .ok_or_else(|| invalid_format!("invalid orientation: {}", value))?,
                    );
                }
                _ => continue,
            }
            if width.is_some() && height.is_some() && (!want_orientation || orientation.is_some()) {
                break;
            }
        }

        match (width, height) {
            (Some(w), Some(h)) => info.size = ImageSize::new(w, h),
            _ => return Err(invalid_format!("TIFF directory lacks image width or length")),
        }
        if let Some(o) = orientation {
            debug!("TIFF orientation: {:?}", o);
            info.orient(o);
        }
        Ok(())
    }
}
