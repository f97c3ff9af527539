//! Owned pixel grid produced by the decoders.

use std::fmt;

/// Channel layout of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelLayout {
    Gray,
    GrayAlpha,
    Rgb,
    Rgba,
}

impl ChannelLayout {
    /// Number of samples per pixel.
    #[must_use]
    pub const fn count(self) -> usize {
        match self {
            Self::Gray => 1,
            Self::GrayAlpha => 2,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    #[must_use]
    pub const fn has_alpha(self) -> bool {
        matches!(self, Self::GrayAlpha | Self::Rgba)
    }

    #[must_use]
    pub const fn has_color(self) -> bool {
        matches!(self, Self::Rgb | Self::Rgba)
    }
}

impl fmt::Display for ChannelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Gray => "gray",
            Self::GrayAlpha => "gray+alpha",
            Self::Rgb => "rgb",
            Self::Rgba => "rgba",
        })
    }
}

/// A rectangular grid of 8-bit samples, row-major, top row first.
///
/// The sample count always equals `width * height * channels.count()`.
/// There are no mutable accessors; a buffer is fixed once built.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    channels: ChannelLayout,
    samples: Vec<u8>,
}

impl fmt::Debug for ImageBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("channels", &self.channels)
            .finish_non_exhaustive()
    }
}

impl ImageBuffer {
    /// Wrap `samples` as a `width` x `height` grid.
    ///
    /// Returns `None` if the sample count does not match the dimensions.
    #[must_use]
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: ChannelLayout,
        samples: Vec<u8>,
    ) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(channels.count())?;
        if samples.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            channels,
            samples,
        })
    }

    /// A `width` x `height` grid filled with one pixel value.
    ///
    /// Returns `None` if `pixel` does not have `channels.count()` samples.
    #[must_use]
    pub fn from_pixel(width: u32, height: u32, channels: ChannelLayout, pixel: &[u8]) -> Option<Self> {
        if pixel.len() != channels.count() {
            return None;
        }
        let count = (width as usize).checked_mul(height as usize)?;
        let samples = pixel.repeat(count);
        Self::from_raw(width, height, channels, samples)
    }

    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub const fn channels(&self) -> ChannelLayout {
        self.channels
    }

    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of pixels, `width * height`.
    #[must_use]
    pub const fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.pixel_count() == 0
    }

    /// Iterate over pixels in row-major order; each item has
    /// `channels().count()` samples.
    pub fn pixels(&self) -> std::slice::ChunksExact<'_, u8> {
        self.samples.chunks_exact(self.channels.count())
    }

    /// Samples of row `y`, or `None` when out of bounds.
    #[must_use]
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height {
            return None;
        }
        let stride = self.width as usize * self.channels.count();
        let start = y as usize * stride;
        self.samples.get(start..start + stride)
    }

    /// Samples of the pixel at `(x, y)`, or `None` when out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width {
            return None;
        }
        let n = self.channels.count();
        let start = x as usize * n;
        self.row(y)?.get(start..start + n)
    }

    /// Borrow the flat sample storage.
    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        &self.samples
    }

    #[must_use]
    pub fn into_raw(self) -> Vec<u8> {
        self.samples
    }
}
