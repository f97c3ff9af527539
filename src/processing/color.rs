use std::fmt;

use crate::buffer::{ChannelLayout, ImageBuffer};
use crate::error::{Error, Result};
use crate::processing::region::Rect;

/// Average color of an image or region.
///
/// `a` is present only when the source had an alpha channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorResult {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: Option<u8>,
}

impl ColorResult {
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: None }
    }

    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a: Some(a) }
    }
}

impl fmt::Display for ColorResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Integer mean rounded half away from zero: `floor(sum / n + 1/2)`.
///
/// Panics if `n` is zero; callers check for empty input first.
pub(crate) fn rounded_mean(sum: u64, n: u64) -> u8 {
    let wide = (2 * u128::from(sum) + u128::from(n)) / (2 * u128::from(n));
    wide.min(255) as u8
}

/// Per-channel sums over a set of pixels.
#[derive(Debug, Clone, Copy, Default)]
struct ChannelSums {
    sums: [u64; 4],
    count: u64,
}

impl ChannelSums {
    fn add(&mut self, px: &[u8]) {
        for (acc, &v) in self.sums.iter_mut().zip(px) {
            *acc += u64::from(v);
        }
        self.count += 1;
    }

    fn finish(&self, channels: ChannelLayout) -> Result<ColorResult> {
        if self.count == 0 {
            return Err(Error::EmptyImage);
        }
        let mean = |c: usize| rounded_mean(self.sums[c], self.count);
        Ok(match channels {
            ChannelLayout::Gray => {
                let v = mean(0);
                ColorResult::rgb(v, v, v)
            }
            ChannelLayout::GrayAlpha => {
                let v = mean(0);
                ColorResult::rgba(v, v, v, mean(1))
            }
            ChannelLayout::Rgb => ColorResult::rgb(mean(0), mean(1), mean(2)),
            ChannelLayout::Rgba => ColorResult::rgba(mean(0), mean(1), mean(2), mean(3)),
        })
    }
}

/// Per-channel arithmetic mean over every pixel of `img`.
///
/// Channels are averaged independently; color is not premultiplied by
/// alpha. Means are rounded half away from zero.
///
/// # Errors
/// Returns [`Error::EmptyImage`] when `img` has no pixels.
pub fn reduce(img: &ImageBuffer) -> Result<ColorResult> {
    let mut sums = ChannelSums::default();
    for px in img.pixels() {
        sums.add(px);
    }
    sums.finish(img.channels())
}

/// Like [`reduce`], restricted to `rect` clipped to the image bounds.
///
/// # Errors
/// Returns [`Error::EmptyImage`] when the clipped region has no pixels.
pub fn reduce_region(img: &ImageBuffer, rect: Rect) -> Result<ColorResult> {
    let rect = rect.clip(img.width(), img.height());
    let n = img.channels().count();
    let mut sums = ChannelSums::default();
    for y in rect.y..rect.y + rect.height {
        let Some(row) = img.row(y) else { break };
        let start = rect.x as usize * n;
        let end = (rect.x + rect.width) as usize * n;
        for px in row[start..end].chunks_exact(n) {
            sums.add(px);
        }
    }
    sums.finish(img.channels())
}

/// Channel-wise mean of already reduced colors, with the same rounding.
///
/// Alpha is kept only when every input carries one.
///
/// # Errors
/// Returns [`Error::EmptyImage`] when `colors` is empty.
pub fn combine(colors: &[ColorResult]) -> Result<ColorResult> {
    if colors.is_empty() {
        return Err(Error::EmptyImage);
    }
    let n = colors.len() as u64;
    let sum = |f: fn(&ColorResult) -> u8| colors.iter().map(|c| u64::from(f(c))).sum::<u64>();
    let alpha = colors
        .iter()
        .map(|c| c.a.map(u64::from))
        .sum::<Option<u64>>()
        .map(|a| rounded_mean(a, n));
    Ok(ColorResult {
        r: rounded_mean(sum(|c| c.r), n),
        g: rounded_mean(sum(|c| c.g), n),
        b: rounded_mean(sum(|c| c.b), n),
        a: alpha,
    })
}
