//! JPEG marker scanning.
//!
//! JPEG has no fixed header: the frame dimensions sit in a start-of-frame
//! segment preceded by any number of other segments. The scanner walks the
//! segments in stream order, skipping their payloads, until it reaches one.

use std::io::{BufRead, BufReader, Read};

use byteorder::{BigEndian, ReadBytesExt};
use log::{debug, trace};

use crate::formats::exif::{self, App1};
use crate::source::ReplayReader;
use crate::traits::{Detail, HeaderParser};
use crate::types::{ImageInfo, ImageSize, ImageType, Result};
use crate::utils::BufReadExt;

/// Marker codes the scanner distinguishes.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Marker {
    /// Start of frame for baseline, extended sequential and progressive
    /// coding (SOF0 to SOF2).
    StartOfFrame(u8),
    /// Markers without a payload: SOI, TEM and RST0 to RST7.
    Standalone(u8),
    EndOfImage,
    StartOfScan,
    /// APP1, conventionally holding EXIF or XMP.
    App1,
    Other(u8),
}

impl Marker {
    pub fn from_u8(code: u8) -> Marker {
        match code {
            0xc0..=0xc2 => Marker::StartOfFrame(code),
            0x01 | 0xd0..=0xd8 => Marker::Standalone(code),
            0xd9 => Marker::EndOfImage,
            0xda => Marker::StartOfScan,
            0xe1 => Marker::App1,
            code => Marker::Other(code),
        }
    }
}

const SUPPORTED_PRECISION: u8 = 8;

pub struct Jpeg;

impl HeaderParser for Jpeg {
    const IMAGE_TYPE: ImageType = ImageType::Jpeg;

    fn parse<R: Read>(source: &mut ReplayReader<R>, detail: Detail, info: &mut ImageInfo) -> Result<()> {
        let mut r = BufReader::new(source);
        loop {
            let marker = next_marker(&mut r)?;
            trace!("JPEG marker {:?}", marker);

            let len = match marker {
                Marker::Standalone(_) => continue,
                Marker::EndOfImage => {
                    return Err(invalid_format!("end of image reached before frame header"))
                }
                _ => segment_length(&mut r)?,
            };

            match marker {
                Marker::StartOfFrame(code) => {
                    info.size = read_frame_header(&mut r, code, len)?;
                    return Ok(());
                }
                Marker::StartOfScan => {
                    return Err(invalid_format!("reached start of scan before frame header"))
                }
                Marker::App1 if detail == Detail::Full => read_app1(&mut r, len, info)?,
                _ => skip_segment(&mut r, len)?,
            }
        }
    }
}

// Discards bytes up to the next marker and returns its code. Fill bytes
// (runs of 0xff) are collapsed and stuffed zero bytes are not markers.
fn next_marker<R: BufRead>(r: &mut R) -> Result<Marker> {
    loop {
        if r.skip_until(0xff)? == 0 {
            return Err(unexpected_eof!("when searching for a marker"));
        }
        let mut code = r.read_u8().map_err(if_eof!("when reading marker type"))?;
        while code == 0xff {
            code = r.read_u8().map_err(if_eof!("when reading marker type"))?;
        }
        if code != 0 {
            return Ok(Marker::from_u8(code));
        }
    }
}

// Returns the payload length of the segment, i.e. without the two length bytes.
fn segment_length<R: Read>(r: &mut R) -> Result<u16> {
    let len = r
        .read_u16::<BigEndian>()
        .map_err(if_eof!("when reading marker payload size"))?;
    if len < 2 {
        return Err(invalid_format!("short segment length: {}", len));
    }
    Ok(len - 2)
}

fn skip_segment<R: BufRead>(r: &mut R, len: u16) -> Result<()> {
    let len = len as u64;
    if r.skip_exact(len)? != len {
        return Err(unexpected_eof!("when skipping marker payload"));
    }
    Ok(())
}

fn read_frame_header<R: Read>(r: &mut R, code: u8, len: u16) -> Result<ImageSize> {
    if len < 5 {
        return Err(invalid_format!("SOF{} segment is too short: {} bytes", code - 0xc0, len));
    }

    let precision = r.read_u8().map_err(if_eof!("when reading sample precision"))?;
    if precision != SUPPORTED_PRECISION {
        return Err(unsupported!("{}-bit sample precision", precision));
    }
    let height = r.read_u16::<BigEndian>().map_err(if_eof!("when reading height"))?;
    let width = r.read_u16::<BigEndian>().map_err(if_eof!("when reading width"))?;
    Ok(ImageSize::new(width as u32, height as u32))
}

fn read_app1<R: Read>(r: &mut R, len: u16, info: &mut ImageInfo) -> Result<()> {
    let mut payload = vec![0u8; len as usize];
    r.read_exact(&mut payload)
        .map_err(if_eof!("when reading APP1 payload"))?;

    match exif::read_app1(&payload)? {
        App1::Foreign => debug!("ignoring non-EXIF APP1 segment of {} bytes", len),
        App1::Exif(Some(orientation)) => info.orient(orientation),
        App1::Exif(None) => debug!("EXIF block has no orientation tag"),
    }
    Ok(())
}
