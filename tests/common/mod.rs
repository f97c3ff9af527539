//! Fixture builders shared by the integration tests.
#![allow(dead_code)]

use std::io::Cursor;

use rand::{Rng, SeedableRng};

/// 24-bit bottom-up BMP from top-first RGB pixels.
pub fn bmp_rgb(width: u32, height: u32, pixels: &[[u8; 3]]) -> Vec<u8> {
    assert_eq!(pixels.len(), (width * height) as usize);
    let stride = (width as usize * 3).div_ceil(4) * 4;
    let mut rows = vec![0u8; stride * height as usize];
    for y in 0..height as usize {
        let dst = (height as usize - 1 - y) * stride;
        for x in 0..width as usize {
            let [r, g, b] = pixels[y * width as usize + x];
            rows[dst + x * 3..dst + x * 3 + 3].copy_from_slice(&[b, g, r]);
        }
    }
    bmp_file(width as i32, height as i32, 24, 0, &[], &rows)
}

/// 32-bit top-down BMP with an alpha mask, from top-first RGBA pixels.
pub fn bmp_rgba_top_down(width: u32, height: u32, pixels: &[[u8; 4]]) -> Vec<u8> {
    assert_eq!(pixels.len(), (width * height) as usize);
    let mut masks = Vec::new();
    for m in [0x00FF_0000u32, 0x0000_FF00, 0x0000_00FF, 0xFF00_0000] {
        masks.extend_from_slice(&m.to_le_bytes());
    }
    let rows: Vec<u8> = pixels
        .iter()
        .flat_map(|&[r, g, b, a]| [b, g, r, a])
        .collect();
    bmp_file(width as i32, -(height as i32), 32, 6, &masks, &rows)
}

/// BMP with a 40-byte info header; `extra` sits between header and pixels.
pub fn bmp_file(width: i32, height: i32, bpp: u16, compression: u32, extra: &[u8], rows: &[u8]) -> Vec<u8> {
    let offset = 14 + 40 + extra.len() as u32;
    let mut out = Vec::with_capacity(offset as usize + rows.len());
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(offset + rows.len() as u32).to_le_bytes());
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&offset.to_le_bytes());
    out.extend_from_slice(&40u32.to_le_bytes());
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&bpp.to_le_bytes());
    out.extend_from_slice(&compression.to_le_bytes());
    out.extend_from_slice(&(rows.len() as u32).to_le_bytes());
    out.extend_from_slice(&2835i32.to_le_bytes());
    out.extend_from_slice(&2835i32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(extra);
    out.extend_from_slice(rows);
    out
}

/// Uniform 24-bit BMP.
pub fn bmp_uniform(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    bmp_rgb(width, height, &vec![rgb; (width * height) as usize])
}

/// Seeded random RGB pixels.
pub fn noise(width: u32, height: u32, seed: u64) -> Vec<[u8; 3]> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    (0..width * height)
        .map(|_| {
            let mut px = [0u8; 3];
            rng.fill(&mut px[..]);
            px
        })
        .collect()
}

/// Encode an `image` crate buffer to bytes in `format`.
pub fn encode(img: impl Into<image::DynamicImage>, format: image::ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    img.into().write_to(&mut out, format).expect("encode fixture");
    out.into_inner()
}

/// Seeded random RGB picture for the `image` crate encoders.
pub fn noise_image(width: u32, height: u32, seed: u64) -> image::RgbImage {
    let mut img = image::RgbImage::new(width, height);
    for (px, rgb) in img.pixels_mut().zip(noise(width, height, seed)) {
        *px = image::Rgb(rgb);
    }
    img
}
