use std::io::Cursor;

use image::{DynamicImage, ImageError};
use jpeg_decoder::{Decoder as JpegDecoder, PixelFormat};

use crate::buffer::{ChannelLayout, ImageBuffer};
use crate::error::{Error, Result};

/// Largest decoded JPEG accepted, in bytes. Same ceiling as the `image`
/// crate's default allocation limit for the other formats.
const MAX_DECODED_BYTES: u64 = 512 * 1024 * 1024;

fn map_image_error(err: ImageError) -> Error {
    match err {
        ImageError::Unsupported(err) => Error::unsupported(err.to_string()),
        ImageError::Limits(err) => Error::unsupported(err.to_string()),
        ImageError::IoError(err) => Error::corrupt(format!("image stream ended early: {err}")),
        other => Error::corrupt(other.to_string()),
    }
}

fn map_jpeg_error(err: jpeg_decoder::Error) -> Error {
    match err {
        jpeg_decoder::Error::Unsupported(feature) => {
            Error::unsupported(format!("JPEG feature {feature:?}"))
        }
        other => Error::corrupt(other.to_string()),
    }
}

fn into_buffer(img: DynamicImage) -> Result<ImageBuffer> {
    let (width, height) = (img.width(), img.height());
    let color = img.color();
    let (channels, samples) = match (color.has_color(), color.has_alpha()) {
        (false, false) => (ChannelLayout::Gray, img.into_luma8().into_raw()),
        (false, true) => (ChannelLayout::GrayAlpha, img.into_luma_alpha8().into_raw()),
        (true, false) => (ChannelLayout::Rgb, img.into_rgb8().into_raw()),
        (true, true) => (ChannelLayout::Rgba, img.into_rgba8().into_raw()),
    };
    ImageBuffer::from_raw(width, height, channels, samples)
        .ok_or_else(|| Error::corrupt("decoded sample count does not match dimensions"))
}

/// Decode through the `image` crate, converting any sample depth to 8 bits.
pub(super) fn decode_with_image(bytes: &[u8], format: image::ImageFormat) -> Result<ImageBuffer> {
    let img = image::load_from_memory_with_format(bytes, format).map_err(map_image_error)?;
    into_buffer(img)
}

/// Decode a baseline or progressive JPEG.
///
/// `jpeg-decoder` reports a truncated entropy stream as an error instead of
/// padding it, so a cut-off file never yields a picture. The frame header is
/// read first and frames larger than [`MAX_DECODED_BYTES`] are rejected
/// before any pixel memory is allocated.
pub(super) fn decode_jpeg(bytes: &[u8]) -> Result<ImageBuffer> {
    let mut decoder = JpegDecoder::new(Cursor::new(bytes));
    decoder.read_info().map_err(map_jpeg_error)?;
    let info = decoder
        .info()
        .ok_or_else(|| Error::corrupt("JPEG has no frame header"))?;
    let width = u32::from(info.width);
    let height = u32::from(info.height);

    let components: u64 = match info.pixel_format {
        PixelFormat::L8 => 1,
        PixelFormat::L16 => 2,
        PixelFormat::RGB24 => 3,
        PixelFormat::CMYK32 => 4,
    };
    let decoded = u64::from(width) * u64::from(height) * components;
    if decoded > MAX_DECODED_BYTES {
        return Err(Error::unsupported(format!(
            "JPEG of {width}x{height} needs {decoded} bytes, above the {MAX_DECODED_BYTES} byte limit"
        )));
    }
    decoder.set_max_decoding_buffer_size(MAX_DECODED_BYTES as usize);
    let pixels = decoder.decode().map_err(map_jpeg_error)?;

    let (channels, samples) = match info.pixel_format {
        PixelFormat::L8 => (ChannelLayout::Gray, pixels),
        PixelFormat::RGB24 => (ChannelLayout::Rgb, pixels),
        PixelFormat::CMYK32 => {
            let mut rgb = Vec::with_capacity(pixels.len() / 4 * 3);
            for chunk in pixels.chunks_exact(4) {
                let c = f32::from(chunk[0]) / 255.0;
                let m = f32::from(chunk[1]) / 255.0;
                let y = f32::from(chunk[2]) / 255.0;
                let k = f32::from(chunk[3]) / 255.0;
                let c = c * (1.0 - k) + k;
                let m = m * (1.0 - k) + k;
                let y = y * (1.0 - k) + k;
                let r = ((1.0 - c) * 255.0).round().clamp(0.0, 255.0) as u8;
                let g = ((1.0 - m) * 255.0).round().clamp(0.0, 255.0) as u8;
                let b = ((1.0 - y) * 255.0).round().clamp(0.0, 255.0) as u8;
                rgb.extend_from_slice(&[r, g, b]);
            }
            (ChannelLayout::Rgb, rgb)
        }
        PixelFormat::L16 => {
            return Err(Error::unsupported("16-bit grayscale JPEG"));
        }
    };

    ImageBuffer::from_raw(width, height, channels, samples).ok_or_else(|| {
        Error::corrupt(format!(
            "JPEG produced a short pixel buffer for {width}x{height}"
        ))
    })
}
