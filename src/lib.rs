//! Average color of raster images.
//!
//! [`decode`] turns BMP, PNG, JPEG, GIF and WebP files into an
//! [`ImageBuffer`]; [`processing::color::reduce`] turns that into a
//! [`ColorResult`]. [`get_average_color`] chains both and formats the
//! result as `#RRGGBB`.

pub mod buffer;
pub mod config;
pub mod decode;
pub mod error;
pub mod output;
pub mod processing {
    pub mod color;
    pub mod region;
}

use std::path::Path;

pub use buffer::{ChannelLayout, ImageBuffer};
pub use decode::{ImageFormat, decode_bytes, decode_file, decode_reader, sniff_format};
pub use error::{Error, ErrorKind, Result};
pub use output::ColorFormat;
pub use processing::color::{ColorResult, reduce, reduce_region};
pub use processing::region::{FrameFraction, Rect, Sampling, reduce_frame};

/// Decode-then-reduce pipeline with its sampling and output settings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AverageColor {
    pub sampling: Sampling,
    pub format: ColorFormat,
}

impl AverageColor {
    /// # Errors
    /// Any decoding error, or [`Error::EmptyImage`].
    pub fn color_of_bytes(&self, bytes: &[u8]) -> Result<ColorResult> {
        let img = decode_bytes(bytes)?;
        self.sampling.reduce(&img)
    }

    /// # Errors
    /// [`Error::Io`] if the file cannot be read, otherwise as
    /// [`AverageColor::color_of_bytes`].
    pub fn color_of_file(&self, path: impl AsRef<Path>) -> Result<ColorResult> {
        let img = decode_file(path)?;
        self.sampling.reduce(&img)
    }

    /// Formatted average color of an in-memory image file.
    ///
    /// # Errors
    /// See [`AverageColor::color_of_bytes`].
    pub fn of_bytes(&self, bytes: &[u8]) -> Result<String> {
        Ok(self.format.render(&self.color_of_bytes(bytes)?))
    }

    /// Formatted average color of the image file at `path`.
    ///
    /// # Errors
    /// See [`AverageColor::color_of_file`].
    pub fn of_file(&self, path: impl AsRef<Path>) -> Result<String> {
        Ok(self.format.render(&self.color_of_file(path)?))
    }
}

/// Mean color of every pixel in the image at `path`, as `#RRGGBB`.
///
/// # Errors
/// Returns the specific [`Error`] variant for unreadable, unrecognized,
/// corrupt, unsupported or empty images.
pub fn get_average_color(path: impl AsRef<Path>) -> Result<String> {
    AverageColor::default().of_file(path)
}
