//! Windows bitmap (BMP / DIB) decoder.
//!
//! Supports the OS/2 core header and the Windows info headers up to V5,
//! palette images at 1, 4 and 8 bits per pixel and direct color at 16, 24
//! and 32 bits with optional channel masks. Run-length and embedded
//! JPEG/PNG payloads are reported as unsupported.

use tracing::trace;

use crate::buffer::{ChannelLayout, ImageBuffer};
use crate::error::{Error, Result};

const FILE_HEADER_LEN: usize = 14;

const CORE_HEADER_LEN: u32 = 12;
const INFO_HEADER_LEN: u32 = 40;
const V2_HEADER_LEN: u32 = 52;
const V3_HEADER_LEN: u32 = 56;
const V4_HEADER_LEN: u32 = 108;
const V5_HEADER_LEN: u32 = 124;

/// Offset of the first channel mask, right after a 40-byte info header.
const MASKS_OFFSET: usize = FILE_HEADER_LEN + INFO_HEADER_LEN as usize;

/// `biCompression` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Rgb,
    Rle8,
    Rle4,
    Bitfields,
    Jpeg,
    Png,
    AlphaBitfields,
    Other(u32),
}

impl From<u32> for Compression {
    fn from(raw: u32) -> Self {
        match raw {
            0 => Self::Rgb,
            1 => Self::Rle8,
            2 => Self::Rle4,
            3 => Self::Bitfields,
            4 => Self::Jpeg,
            5 => Self::Png,
            6 => Self::AlphaBitfields,
            other => Self::Other(other),
        }
    }
}

/// Parsed file and info headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BmpHeader {
    pub data_offset: u32,
    pub header_size: u32,
    pub width: u32,
    pub height: u32,
    /// Rows are stored top row first (negative height in the file).
    pub top_down: bool,
    pub bits_per_pixel: u16,
    pub compression: Compression,
    pub colors_used: u32,
}

impl BmpHeader {
    const fn is_core(&self) -> bool {
        self.header_size == CORE_HEADER_LEN
    }

    /// Bytes per stored row, padded to a multiple of four.
    fn stride(&self) -> Option<u64> {
        let row_bits = u64::from(self.width).checked_mul(u64::from(self.bits_per_pixel))?;
        Some(row_bits.div_ceil(32) * 4)
    }
}

fn read_u16(bytes: &[u8], at: usize) -> Result<u16> {
    bytes
        .get(at..at + 2)
        .and_then(|b| b.try_into().ok())
        .map(u16::from_le_bytes)
        .ok_or_else(|| Error::corrupt(format!("bitmap truncated at offset {at}")))
}

fn read_u32(bytes: &[u8], at: usize) -> Result<u32> {
    bytes
        .get(at..at + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or_else(|| Error::corrupt(format!("bitmap truncated at offset {at}")))
}

fn read_i32(bytes: &[u8], at: usize) -> Result<i32> {
    read_u32(bytes, at).map(|v| v as i32)
}

/// Parse the file header and the DIB header that follows it.
///
/// # Errors
/// [`Error::InvalidFormat`] without the `BM` signature,
/// [`Error::CorruptData`] for truncated or inconsistent headers and
/// [`Error::UnsupportedFeature`] for unknown header revisions.
pub fn read_header(bytes: &[u8]) -> Result<BmpHeader> {
    if !bytes.starts_with(b"BM") {
        return Err(Error::InvalidFormat("missing BM signature".into()));
    }
    if bytes.len() < FILE_HEADER_LEN {
        return Err(Error::corrupt("bitmap file header truncated"));
    }
    let data_offset = read_u32(bytes, 10)?;
    let header_size = read_u32(bytes, FILE_HEADER_LEN)?;

    match header_size {
        CORE_HEADER_LEN | INFO_HEADER_LEN | V2_HEADER_LEN | V3_HEADER_LEN | V4_HEADER_LEN
        | V5_HEADER_LEN => {}
        other => {
            return Err(Error::unsupported(format!(
                "bitmap header of {other} bytes"
            )));
        }
    }
    let header_end = FILE_HEADER_LEN + header_size as usize;
    if bytes.len() < header_end {
        return Err(Error::corrupt(format!(
            "bitmap info header truncated: need {header_end} bytes, have {}",
            bytes.len()
        )));
    }

    let (width, raw_height, planes, bits_per_pixel, compression, colors_used) =
        if header_size == CORE_HEADER_LEN {
            (
                i64::from(read_u16(bytes, 18)?),
                i64::from(read_u16(bytes, 20)?),
                read_u16(bytes, 22)?,
                read_u16(bytes, 24)?,
                Compression::Rgb,
                0,
            )
        } else {
            (
                i64::from(read_i32(bytes, 18)?),
                i64::from(read_i32(bytes, 22)?),
                read_u16(bytes, 26)?,
                read_u16(bytes, 28)?,
                Compression::from(read_u32(bytes, 30)?),
                read_u32(bytes, 46)?,
            )
        };

    if width <= 0 {
        return Err(Error::corrupt(format!("bitmap width {width} must be positive")));
    }
    if raw_height == 0 {
        return Err(Error::corrupt("bitmap height must be non-zero"));
    }
    if planes != 1 {
        return Err(Error::corrupt(format!(
            "bitmap must have one color plane, found {planes}"
        )));
    }
    if (data_offset as usize) < header_end {
        return Err(Error::corrupt(format!(
            "pixel data offset {data_offset} points inside the header"
        )));
    }

    let header = BmpHeader {
        data_offset,
        header_size,
        width: width as u32,
        height: raw_height.unsigned_abs() as u32,
        top_down: raw_height < 0,
        bits_per_pixel,
        compression,
        colors_used,
    };
    trace!(?header, "parsed bitmap header");
    Ok(header)
}

/// A contiguous channel mask, rescaled to 8 bits on extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Mask {
    shift: u32,
    max: u64,
}

impl Mask {
    /// `None` for a zero mask.
    fn new(mask: u32) -> Result<Option<Self>> {
        if mask == 0 {
            return Ok(None);
        }
        let shift = mask.trailing_zeros();
        let shifted = mask >> shift;
        let bits = shifted.trailing_ones();
        if bits < 32 && shifted >> bits != 0 {
            return Err(Error::corrupt(format!(
                "channel mask {mask:#010X} is not contiguous"
            )));
        }
        Ok(Some(Self {
            shift,
            max: (1u64 << bits) - 1,
        }))
    }

    fn extract(self, px: u32) -> u8 {
        let value = (u64::from(px) >> self.shift) & self.max;
        ((value * 255 + self.max / 2) / self.max) as u8
    }
}

#[derive(Debug, Clone, Copy)]
struct Masks {
    red: Option<Mask>,
    green: Option<Mask>,
    blue: Option<Mask>,
    alpha: Option<Mask>,
}

impl Masks {
    fn from_raw(red: u32, green: u32, blue: u32, alpha: u32) -> Result<Self> {
        Ok(Self {
            red: Mask::new(red)?,
            green: Mask::new(green)?,
            blue: Mask::new(blue)?,
            alpha: Mask::new(alpha)?,
        })
    }

    fn channels(&self) -> ChannelLayout {
        if self.alpha.is_some() {
            ChannelLayout::Rgba
        } else {
            ChannelLayout::Rgb
        }
    }

    fn push(&self, px: u32, out: &mut Vec<u8>) {
        let get = |mask: Option<Mask>| mask.map_or(0, |m| m.extract(px));
        out.extend_from_slice(&[get(self.red), get(self.green), get(self.blue)]);
        if let Some(alpha) = self.alpha {
            out.push(alpha.extract(px));
        }
    }
}

fn read_masks(bytes: &[u8], header: &BmpHeader) -> Result<Masks> {
    let bpp = header.bits_per_pixel;
    match header.compression {
        Compression::Rgb => match bpp {
            16 => Masks::from_raw(0x7C00, 0x03E0, 0x001F, 0),
            _ => Masks::from_raw(0x00FF_0000, 0x0000_FF00, 0x0000_00FF, 0),
        },
        Compression::Bitfields | Compression::AlphaBitfields => {
            if bpp != 16 && bpp != 32 {
                return Err(Error::unsupported(format!(
                    "bitfield compression with {bpp} bits per pixel"
                )));
            }
            let red = read_u32(bytes, MASKS_OFFSET)?;
            let green = read_u32(bytes, MASKS_OFFSET + 4)?;
            let blue = read_u32(bytes, MASKS_OFFSET + 8)?;
            let has_alpha_slot = header.header_size >= V3_HEADER_LEN
                || header.compression == Compression::AlphaBitfields;
            let alpha = if has_alpha_slot {
                read_u32(bytes, MASKS_OFFSET + 12)?
            } else {
                0
            };
            Masks::from_raw(red, green, blue, alpha)
        }
        other => Err(Error::unsupported(format!("bitmap compression {other:?}"))),
    }
}

fn read_palette(bytes: &[u8], header: &BmpHeader) -> Result<Vec<[u8; 3]>> {
    let max_colors = 1u32 << header.bits_per_pixel;
    let count = match header.colors_used {
        0 => max_colors,
        n if n > max_colors => {
            return Err(Error::corrupt(format!(
                "{n} palette entries exceed the {max_colors} addressable at {} bits per pixel",
                header.bits_per_pixel
            )));
        }
        n => n,
    };
    let entry = if header.is_core() { 3 } else { 4 };
    let start = FILE_HEADER_LEN + header.header_size as usize;
    let end = start + count as usize * entry;
    let table = bytes.get(start..end).ok_or_else(|| {
        Error::corrupt(format!(
            "palette truncated: need {end} bytes, have {}",
            bytes.len()
        ))
    })?;
    Ok(table
        .chunks_exact(entry)
        .map(|bgr| [bgr[2], bgr[1], bgr[0]])
        .collect())
}

enum Pixels {
    Indexed(Vec<[u8; 3]>),
    Bgr,
    Masked(Masks),
}

/// Decode a complete BMP file.
///
/// # Errors
/// See [`read_header`]; additionally [`Error::CorruptData`] when the pixel
/// data is shorter than the dimensions require or a palette index is out
/// of range, and [`Error::UnsupportedFeature`] for unimplemented bit depths
/// and compression modes.
pub fn decode(bytes: &[u8]) -> Result<ImageBuffer> {
    let header = read_header(bytes)?;
    let bpp = header.bits_per_pixel;

    let pixels = match (bpp, header.compression) {
        (1 | 4 | 8, Compression::Rgb) => Pixels::Indexed(read_palette(bytes, &header)?),
        (24, Compression::Rgb) => Pixels::Bgr,
        (16 | 32, _) => Pixels::Masked(read_masks(bytes, &header)?),
        (1 | 4 | 8 | 24, compression) => {
            return Err(Error::unsupported(format!(
                "bitmap compression {compression:?} at {bpp} bits per pixel"
            )));
        }
        (other, _) => {
            return Err(Error::unsupported(format!("{other} bits per pixel")));
        }
    };
    let channels = match &pixels {
        Pixels::Masked(masks) => masks.channels(),
        _ => ChannelLayout::Rgb,
    };

    let stride = header
        .stride()
        .ok_or_else(|| Error::corrupt("bitmap row size overflows"))?;
    let needed = stride
        .checked_mul(u64::from(header.height))
        .and_then(|n| n.checked_add(u64::from(header.data_offset)))
        .ok_or_else(|| Error::corrupt("bitmap dimensions overflow"))?;
    if needed > bytes.len() as u64 {
        return Err(Error::corrupt(format!(
            "pixel data truncated: need {needed} bytes, have {}",
            bytes.len()
        )));
    }
    let stride = stride as usize;
    let width = header.width as usize;
    let height = header.height as usize;
    let data = &bytes[header.data_offset as usize..needed as usize];

    let mut samples = Vec::with_capacity(width * height * channels.count());
    for out_row in 0..height {
        let src_row = if header.top_down {
            out_row
        } else {
            height - 1 - out_row
        };
        let row = &data[src_row * stride..(src_row + 1) * stride];
        match &pixels {
            Pixels::Indexed(palette) => {
                let per_byte = 8 / usize::from(bpp);
                let index_mask = (1u16 << bpp) - 1;
                for x in 0..width {
                    let byte = row[x / per_byte];
                    let shift = 8 - usize::from(bpp) * (x % per_byte + 1);
                    let index = usize::from((u16::from(byte) >> shift) & index_mask);
                    let color = palette.get(index).ok_or_else(|| {
                        Error::corrupt(format!(
                            "palette index {index} out of range for {} entries",
                            palette.len()
                        ))
                    })?;
                    samples.extend_from_slice(color);
                }
            }
            Pixels::Bgr => {
                for bgr in row[..width * 3].chunks_exact(3) {
                    samples.extend_from_slice(&[bgr[2], bgr[1], bgr[0]]);
                }
            }
            Pixels::Masked(masks) if bpp == 16 => {
                for px in row[..width * 2].chunks_exact(2) {
                    masks.push(u32::from(u16::from_le_bytes([px[0], px[1]])), &mut samples);
                }
            }
            Pixels::Masked(masks) => {
                for px in row[..width * 4].chunks_exact(4) {
                    masks.push(u32::from_le_bytes([px[0], px[1], px[2], px[3]]), &mut samples);
                }
            }
        }
    }

    ImageBuffer::from_raw(header.width, header.height, channels, samples)
        .ok_or_else(|| Error::corrupt("decoded sample count does not match dimensions"))
}
