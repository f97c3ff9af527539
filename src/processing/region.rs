//! Rectangular regions and the border "frame" sampling mode.

use serde::Deserialize;
use tracing::trace;

use crate::buffer::ImageBuffer;
use crate::error::{Error, Result};
use crate::processing::color::{ColorResult, combine, reduce, reduce_region};

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanning `[x0, x1) x [y0, y1)`; inverted bounds give an empty rect.
    #[must_use]
    pub const fn from_bounds(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self::new(x0, y0, x1.saturating_sub(x0), y1.saturating_sub(y0))
    }

    #[must_use]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Intersect with a `width` x `height` image.
    #[must_use]
    pub fn clip(self, width: u32, height: u32) -> Self {
        let x0 = self.x.min(width);
        let y0 = self.y.min(height);
        let x1 = self.x.saturating_add(self.width).min(width);
        let y1 = self.y.saturating_add(self.height).min(height);
        Self::from_bounds(x0, y0, x1, y1)
    }
}

/// Thickness of the border frame as a fraction of the image size, in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameFraction(f64);

impl FrameFraction {
    /// Default thickness of ten percent.
    pub const DEFAULT_PERCENT: f64 = 10.0;

    /// # Errors
    /// Returns [`Error::InvalidFrame`] unless `0 < percent <= 100`.
    pub fn from_percent(percent: f64) -> Result<Self> {
        if !(percent > 0.0 && percent <= 100.0) {
            return Err(Error::InvalidFrame(format!(
                "frame percentage must be in (0, 100], got {percent}"
            )));
        }
        Ok(Self(percent / 100.0))
    }

    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }
}

impl Default for FrameFraction {
    fn default() -> Self {
        Self(Self::DEFAULT_PERCENT / 100.0)
    }
}

/// Which pixels contribute to the average.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Sampling {
    /// Every pixel.
    #[default]
    Full,
    /// Only the four border strips.
    Frame(FrameFraction),
}

impl Sampling {
    /// # Errors
    /// See [`reduce`] and [`reduce_frame`].
    pub fn reduce(self, img: &ImageBuffer) -> Result<ColorResult> {
        match self {
            Self::Full => reduce(img),
            Self::Frame(fraction) => reduce_frame(img, fraction),
        }
    }
}

/// Serialized form of [`Sampling`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SamplingMode {
    #[default]
    Full,
    Frame,
}

/// Border strips of a `width` x `height` image: top, right, bottom, left.
///
/// Strip thickness is floored, so a thin image may produce empty strips.
#[must_use]
pub fn frame_regions(width: u32, height: u32, fraction: FrameFraction) -> [Rect; 4] {
    let f = fraction.get();
    let w = f64::from(width);
    let h = f64::from(height);
    let top_end = (h * f) as u32;
    let right_start = (w * (1.0 - f)) as u32;
    let bottom_start = (h * (1.0 - f)) as u32;
    let left_end = (w * f) as u32;
    [
        Rect::from_bounds(0, 0, width, top_end),
        Rect::from_bounds(right_start, 0, width, height),
        Rect::from_bounds(0, bottom_start, width, height),
        Rect::from_bounds(0, 0, left_end, height),
    ]
}

/// Average of the four border strips, each strip weighted equally.
///
/// Each non-empty strip is reduced on its own, then the strip colors are
/// combined channel-wise. Empty strips are skipped.
///
/// # Errors
/// Returns [`Error::EmptyImage`] when every strip is empty.
pub fn reduce_frame(img: &ImageBuffer, fraction: FrameFraction) -> Result<ColorResult> {
    let strips = frame_regions(img.width(), img.height(), fraction);
    let mut colors = Vec::with_capacity(strips.len());
    for rect in strips.into_iter().filter(|r| !r.is_empty()) {
        let color = reduce_region(img, rect)?;
        trace!(?rect, ?color, "frame strip");
        colors.push(color);
    }
    combine(&colors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::ChannelLayout;

    #[test]
    fn percent_bounds() {
        assert!(FrameFraction::from_percent(0.0).is_err());
        assert!(FrameFraction::from_percent(-5.0).is_err());
        assert!(FrameFraction::from_percent(100.5).is_err());
        assert!(FrameFraction::from_percent(f64::NAN).is_err());
        assert!(FrameFraction::from_percent(100.0).is_ok());
        assert!((FrameFraction::default().get() - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn regions_for_ten_percent() {
        let [top, right, bottom, left] = frame_regions(100, 50, FrameFraction::default());
        assert_eq!(top, Rect::new(0, 0, 100, 5));
        assert_eq!(right, Rect::new(90, 0, 10, 50));
        assert_eq!(bottom, Rect::new(0, 45, 100, 5));
        assert_eq!(left, Rect::new(0, 0, 10, 50));
    }

    #[test]
    fn clip_limits_to_image() {
        assert_eq!(Rect::new(3, 3, 10, 10).clip(5, 4), Rect::new(3, 3, 2, 1));
        assert!(Rect::new(9, 0, 1, 1).clip(5, 5).is_empty());
    }

    #[test]
    fn frame_ignores_interior() {
        // 10x10 white with a black 8x8 interior.
        let mut samples = vec![255u8; 10 * 10];
        for y in 1..9 {
            for x in 1..9 {
                samples[y * 10 + x] = 0;
            }
        }
        let img = ImageBuffer::from_raw(10, 10, ChannelLayout::Gray, samples).unwrap();
        let color = reduce_frame(&img, FrameFraction::default()).unwrap();
        assert_eq!(color, ColorResult::rgb(255, 255, 255));
        assert_ne!(reduce(&img).unwrap(), color);
    }

    #[test]
    fn thin_image_skips_empty_strips() {
        // 5x1: top and bottom strips at 10% are zero rows tall.
        let img = ImageBuffer::from_pixel(5, 1, ChannelLayout::Rgb, &[40, 50, 60]).unwrap();
        let [top, _, bottom, _] = frame_regions(5, 1, FrameFraction::default());
        assert!(top.is_empty());
        assert_eq!(bottom.area(), 5);
        let color = reduce_frame(&img, FrameFraction::default()).unwrap();
        assert_eq!(color, ColorResult::rgb(40, 50, 60));
    }

    #[test]
    fn full_frame_equals_mean_of_whole_strips() {
        let img = ImageBuffer::from_pixel(3, 3, ChannelLayout::Gray, &[77]).unwrap();
        let fraction = FrameFraction::from_percent(100.0).unwrap();
        assert_eq!(
            Sampling::Frame(fraction).reduce(&img).unwrap(),
            Sampling::Full.reduce(&img).unwrap()
        );
    }
}
