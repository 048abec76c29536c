use std::io::Read;

use crate::source::ReplayReader;
use crate::types::{ImageInfo, ImageType, Result};

/// How much a parser should extract besides the dimensions.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Detail {
    /// Type and size only; metadata blocks are skipped unread.
    SizeOnly,
    /// Also the display orientation, when the format carries one.
    Full,
}

/// A header parser for one container format.
///
/// Parsers start reading at offset 0 of the source, so the magic bytes which
/// were consumed for detection are replayed to them.
pub trait HeaderParser {
    const IMAGE_TYPE: ImageType;

    /// Fills `info` with what the header says. Only `size`, `rotation` and
    /// `mirror` are touched.
    fn parse<R: Read>(source: &mut ReplayReader<R>, detail: Detail, info: &mut ImageInfo) -> Result<()>;
}
