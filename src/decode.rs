//! Signature-based format detection and decoding into [`ImageBuffer`].

pub mod bmp;
mod codecs;

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::debug;

use crate::buffer::ImageBuffer;
use crate::error::{Error, Result};

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_SIGNATURE: &[u8] = &[0xFF, 0xD8, 0xFF];
const BMP_SIGNATURE: &[u8] = b"BM";
const GIF87_SIGNATURE: &[u8] = b"GIF87a";
const GIF89_SIGNATURE: &[u8] = b"GIF89a";

/// Raster formats recognized by [`sniff_format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Bmp,
    Png,
    Jpeg,
    Gif,
    WebP,
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bmp => "bmp",
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::WebP => "webp",
        })
    }
}

/// Identify the image format from its leading bytes.
///
/// # Errors
/// Returns [`Error::InvalidFormat`] when no known signature matches,
/// including for empty input.
pub fn sniff_format(bytes: &[u8]) -> Result<ImageFormat> {
    if bytes.is_empty() {
        return Err(Error::InvalidFormat("input is empty".into()));
    }
    let format = if bytes.starts_with(PNG_SIGNATURE) {
        ImageFormat::Png
    } else if bytes.starts_with(JPEG_SIGNATURE) {
        ImageFormat::Jpeg
    } else if bytes.starts_with(GIF87_SIGNATURE) || bytes.starts_with(GIF89_SIGNATURE) {
        ImageFormat::Gif
    } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        ImageFormat::WebP
    } else if bytes.starts_with(BMP_SIGNATURE) {
        ImageFormat::Bmp
    } else {
        let shown = bytes.len().min(8);
        return Err(Error::InvalidFormat(format!(
            "unrecognized signature {:02X?}",
            &bytes[..shown]
        )));
    };
    Ok(format)
}

/// Decode an in-memory image file.
///
/// # Errors
/// [`Error::InvalidFormat`] for unknown signatures, [`Error::CorruptData`]
/// for truncated or inconsistent files and [`Error::UnsupportedFeature`]
/// for recognized but unimplemented variants.
pub fn decode_bytes(bytes: &[u8]) -> Result<ImageBuffer> {
    let format = sniff_format(bytes)?;
    debug!(%format, len = bytes.len(), "decoding image");
    let img = match format {
        ImageFormat::Bmp => bmp::decode(bytes)?,
        ImageFormat::Jpeg => codecs::decode_jpeg(bytes)?,
        ImageFormat::Png => codecs::decode_with_image(bytes, image::ImageFormat::Png)?,
        ImageFormat::Gif => codecs::decode_with_image(bytes, image::ImageFormat::Gif)?,
        ImageFormat::WebP => codecs::decode_with_image(bytes, image::ImageFormat::WebP)?,
    };
    debug!(
        %format,
        width = img.width(),
        height = img.height(),
        channels = %img.channels(),
        "decoded image"
    );
    Ok(img)
}

/// Read `reader` to the end and decode its contents.
///
/// # Errors
/// As [`decode_bytes`]; read failures are reported as [`Error::CorruptData`].
pub fn decode_reader<R: Read>(mut reader: R) -> Result<ImageBuffer> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|err| Error::corrupt(format!("failed to read image stream: {err}")))?;
    decode_bytes(&bytes)
}

/// Open `path` and decode the file it names.
///
/// # Errors
/// [`Error::Io`] when the file cannot be opened or read, otherwise as
/// [`decode_bytes`].
pub fn decode_file(path: impl AsRef<Path>) -> Result<ImageBuffer> {
    let path = path.as_ref();
    let io_err = |source| Error::Io {
        path: path.to_path_buf(),
        source,
    };
    let bytes = {
        let file = File::open(path).map_err(io_err)?;
        let mut bytes = Vec::new();
        BufReader::new(file)
            .read_to_end(&mut bytes)
            .map_err(io_err)?;
        bytes
    };
    decode_bytes(&bytes)
}
