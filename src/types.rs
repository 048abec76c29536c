use std::borrow::Cow;
use std::fmt;
use std::io;
use std::result;

use num::ToPrimitive;

use crate::source::ScanLimitReached;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown image format (magic bytes {0:02x?})")]
    UnknownFormat([u8; 2]),
    #[error("invalid image format: {0}")]
    InvalidFormat(Cow<'static, str>),
    #[error("unsupported image feature: {0}")]
    Unsupported(Cow<'static, str>),
    #[error("unexpected end of file{}", eof_context(.0))]
    UnexpectedEndOfFile(Option<Cow<'static, str>>),
    #[error("scan limit of {0} bytes reached before the header was complete")]
    LimitExceeded(u64),
    #[error("I/O error: {0}")]
    Io(io::Error),
}

fn eof_context(context: &Option<Cow<'static, str>>) -> String {
    match *context {
        Some(ref s) => format!(" {}", s),
        None => String::new(),
    }
}

impl Error {
    /// Whether the error came from the byte source rather than from the image header.
    pub fn is_stream_error(&self) -> bool {
        matches!(*self, Error::UnexpectedEndOfFile(_) | Error::Io(_))
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            return Error::UnexpectedEndOfFile(None);
        }
        let limit = e
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<ScanLimitReached>())
            .map(|l| l.0);
        match limit {
            Some(limit) => Error::LimitExceeded(limit),
            None => Error::Io(e),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

/// Pixel dimensions of an image.
///
/// A zero width or height means that nothing was parsed yet.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    #[inline]
    pub fn new(width: u32, height: u32) -> ImageSize {
        ImageSize { width, height }
    }

    /// Converts header fields of any primitive integer type, failing when a
    /// value is negative or does not fit into 32 bits.
    pub fn from_fields<T, U>(width: T, height: U) -> Result<ImageSize>
    where
        T: ToPrimitive + fmt::Display,
        U: ToPrimitive + fmt::Display,
    {
        match (width.to_u32(), height.to_u32()) {
            (Some(w), Some(h)) => Ok(ImageSize::new(w, h)),
            _ => Err(invalid_format!("dimensions out of range: {}x{}", width, height)),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Image container formats recognized by the detector.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub enum ImageType {
    Bmp,
    Gif,
    Jpeg,
    Png,
    Tiff,
    Webp,
    #[default]
    Unknown,
}

impl ImageType {
    /// Selects the format whose signature starts with the given two bytes.
    ///
    /// Signatures are checked in a fixed priority order; `None` means that no
    /// registered format matches.
    pub fn from_magic(magic: [u8; 2]) -> Option<ImageType> {
        match &magic {
            b"BM" => Some(ImageType::Bmp),
            [0x47, 0x49] => Some(ImageType::Gif),
            [0xff, 0xd8] => Some(ImageType::Jpeg),
            [0x89, 0x50] => Some(ImageType::Png),
            b"II" | b"MM" => Some(ImageType::Tiff),
            b"RI" => Some(ImageType::Webp),
            _ => None,
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match *self {
            ImageType::Bmp => "image/bmp",
            ImageType::Gif => "image/gif",
            ImageType::Jpeg => "image/jpeg",
            ImageType::Png => "image/png",
            ImageType::Tiff => "image/tiff",
            ImageType::Webp => "image/webp",
            ImageType::Unknown => "application/octet-stream",
        }
    }

    pub fn extension(&self) -> &'static str {
        match *self {
            ImageType::Bmp => "bmp",
            ImageType::Gif => "gif",
            ImageType::Jpeg => "jpg",
            ImageType::Png => "png",
            ImageType::Tiff => "tiff",
            ImageType::Webp => "webp",
            ImageType::Unknown => "",
        }
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            ImageType::Bmp => "BMP",
            ImageType::Gif => "GIF",
            ImageType::Jpeg => "JPEG",
            ImageType::Png => "PNG",
            ImageType::Tiff => "TIFF",
            ImageType::Webp => "WEBP",
            ImageType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub enum MirrorDirection {
    #[default]
    None,
    Horizontal,
    Vertical,
}

/// Clockwise rotation needed to display an image upright.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    #[inline]
    pub fn degrees(&self) -> u16 {
        match *self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }
}

/// Value of the EXIF/TIFF orientation tag (0x0112).
///
/// Each code is a mirror followed by a clockwise rotation; see `mirror()` and
/// `rotation()`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Orientation {
    Normal,
    MirrorHorizontal,
    Rotate180,
    MirrorVertical,
    MirrorHorizontalRotate270,
    Rotate90,
    MirrorHorizontalRotate90,
    Rotate270,
}

impl Orientation {
    pub fn from_u16(n: u16) -> Option<Orientation> {
        match n {
            1 => Some(Orientation::Normal),
            2 => Some(Orientation::MirrorHorizontal),
            3 => Some(Orientation::Rotate180),
            4 => Some(Orientation::MirrorVertical),
            5 => Some(Orientation::MirrorHorizontalRotate270),
            6 => Some(Orientation::Rotate90),
            7 => Some(Orientation::MirrorHorizontalRotate90),
            8 => Some(Orientation::Rotate270),
            _ => None,
        }
    }

    pub fn rotation(&self) -> Rotation {
        match *self {
            Orientation::Normal | Orientation::MirrorHorizontal | Orientation::MirrorVertical => {
                Rotation::Deg0
            }
            Orientation::Rotate180 => Rotation::Deg180,
            Orientation::Rotate90 | Orientation::MirrorHorizontalRotate90 => Rotation::Deg90,
            Orientation::Rotate270 | Orientation::MirrorHorizontalRotate270 => Rotation::Deg270,
        }
    }

    pub fn mirror(&self) -> MirrorDirection {
        match *self {
            Orientation::MirrorHorizontal
            | Orientation::MirrorHorizontalRotate270
            | Orientation::MirrorHorizontalRotate90 => MirrorDirection::Horizontal,
            Orientation::MirrorVertical => MirrorDirection::Vertical,
            _ => MirrorDirection::None,
        }
    }
}

/// Everything the detector reports about an image.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct ImageInfo {
    pub size: ImageSize,
    pub image_type: ImageType,
    pub rotation: Rotation,
    pub mirror: MirrorDirection,
}

impl ImageInfo {
    #[inline]
    pub fn rotation_degrees(&self) -> u16 {
        self.rotation.degrees()
    }

    /// Applies an orientation tag value to this record.
    pub fn orient(&mut self, orientation: Orientation) {
        self.rotation = orientation.rotation();
        self.mirror = orientation.mirror();
    }
}
