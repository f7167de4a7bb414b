//! Grayscale conversion and polarity correction
//!
//! Downstream stages assume bright ink on a dark background, matching the
//! training convention. The polarity heuristic handles both drawing
//! conventions (dark-on-light and light-on-dark) without requiring the
//! caller to declare which one was used.

use image::{GrayImage, Luma, RgbaImage};
use tracing::debug;

/// Convert an RGBA raster to single-channel luminance.
///
/// Uses the fixed weighted formula `L = floor(0.299 R + 0.587 G + 0.114 B)`,
/// truncating toward zero. Alpha is ignored. The `image` crate's own
/// `to_luma8` uses different weights and rounding, so the conversion is done
/// by hand to keep the output identical to the training preparation.
#[must_use]
pub fn to_luminance(raster: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(raster.width(), raster.height(), |x, y| {
        let p = raster.get_pixel(x, y);
        let l = 0.299 * f64::from(p.0[0]) + 0.587 * f64::from(p.0[1]) + 0.114 * f64::from(p.0[2]);
        Luma([l as u8])
    })
}

/// Flip polarity so ink is always bright on dark.
///
/// If the mean luminance exceeds 127 the image is predominantly light,
/// i.e. drawn as dark ink on a white background, and every sample is
/// inverted. Otherwise the buffer passes through unchanged.
#[must_use]
pub fn correct_polarity(mut luma: GrayImage) -> GrayImage {
    let sum: f64 = luma.pixels().map(|p| f64::from(p.0[0])).sum();
    let mean = sum / f64::from(luma.width() * luma.height());

    if mean > 127.0 {
        debug!(mean, "light background detected, inverting polarity");
        for p in luma.pixels_mut() {
            p.0[0] = 255 - p.0[0];
        }
    }
    luma
}
