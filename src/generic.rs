use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::debug;

use crate::formats::bmp::Bmp;
use crate::formats::gif::Gif;
use crate::formats::jpeg::Jpeg;
use crate::formats::png::Png;
use crate::formats::tiff::Tiff;
use crate::formats::webp::Webp;
use crate::limits::Limits;
use crate::source::ReplayReader;
use crate::traits::{Detail, HeaderParser};
use crate::types::{Error, ImageInfo, ImageSize, ImageType, Result};

/// Reusable detection context.
///
/// Keeps the retained header buffer and the limits between calls, so that
/// the fixed-layout formats are detected without allocating once the buffer
/// has grown. JPEG scanning still allocates its read buffer and any EXIF
/// payload per call. Calls take `&mut self`; give each thread its own
/// detector.
#[derive(Debug, Default)]
pub struct Detector {
    magic: [u8; 2],
    prefix: Vec<u8>,
    limits: Limits,
}

impl Detector {
    pub fn new() -> Detector {
        Detector::with_limits(Limits::default())
    }

    pub fn with_limits(limits: Limits) -> Detector {
        Detector {
            magic: [0; 2],
            prefix: Vec::with_capacity(32),
            limits,
        }
    }

    /// Detects the image type and size, skipping any metadata.
    pub fn detect<R: Read>(&mut self, r: R) -> Result<(ImageType, ImageSize)> {
        let info = self.run(r, Detail::SizeOnly)?;
        Ok((info.image_type, info.size))
    }

    /// Detects the image type, size and display orientation.
    pub fn detect_info<R: Read>(&mut self, r: R) -> Result<ImageInfo> {
        self.run(r, Detail::Full)
    }

    fn run<R: Read>(&mut self, r: R, detail: Detail) -> Result<ImageInfo> {
        let mut source = ReplayReader::new(r, &mut self.prefix).with_max_scan_bytes(self.limits.max_scan_bytes);

        source
            .read_at(&mut self.magic, 0)
            .map_err(if_eof!("when reading magic bytes"))?;
        let image_type = dispatch(self.magic)?;
        debug!("detected {} from magic bytes {:02x?}", image_type, self.magic);

        let mut info = ImageInfo { image_type, ..ImageInfo::default() };
        match image_type {
            ImageType::Bmp => parse_with::<Bmp, _>(&mut source, detail, &mut info)?,
            ImageType::Gif => parse_with::<Gif, _>(&mut source, detail, &mut info)?,
            ImageType::Jpeg => parse_with::<Jpeg, _>(&mut source, detail, &mut info)?,
            ImageType::Png => parse_with::<Png, _>(&mut source, detail, &mut info)?,
            ImageType::Tiff => parse_with::<Tiff, _>(&mut source, detail, &mut info)?,
            ImageType::Webp => parse_with::<Webp, _>(&mut source, detail, &mut info)?,
            ImageType::Unknown => return Err(Error::UnknownFormat(self.magic)),
        }

        if info.size.is_empty() {
            return Err(invalid_format!("{} header declares empty dimensions {}", image_type, info.size));
        }
        Ok(info)
    }
}

/// Maps the first two bytes of a stream to the format that claims them.
pub fn dispatch(magic: [u8; 2]) -> Result<ImageType> {
    ImageType::from_magic(magic).ok_or(Error::UnknownFormat(magic))
}

fn parse_with<P: HeaderParser, R: Read>(
    source: &mut ReplayReader<R>,
    detail: Detail,
    info: &mut ImageInfo,
) -> Result<()> {
    debug_assert_eq!(P::IMAGE_TYPE, info.image_type);
    P::parse(source, detail, info)
}

/// Detects the image type and size with a fresh `Detector`.
pub fn detect<R: Read>(r: R) -> Result<(ImageType, ImageSize)> {
    Detector::new().detect(r)
}

/// Detects the image type, size and orientation with a fresh `Detector`.
pub fn detect_info<R: Read>(r: R) -> Result<ImageInfo> {
    Detector::new().detect_info(r)
}

pub fn detect_info_from_file<P: AsRef<Path>>(path: P) -> Result<ImageInfo> {
    let f = File::open(path)?;
    detect_info(BufReader::new(f))
}

#[inline]
pub fn detect_info_from_buffer(buf: &[u8]) -> Result<ImageInfo> {
    detect_info(buf)
}
