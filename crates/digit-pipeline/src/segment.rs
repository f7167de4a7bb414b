//! Contrast stretch, foreground thresholding and ink bounding box
//!
//! Intensities are rescaled to the full 0-255 range before thresholding, so
//! the effective threshold adapts to each drawing's own contrast rather than
//! cutting at an absolute luminance. The rescale-then-threshold order is part
//! of the model contract and must not be swapped.

use image::GrayImage;
use serde::{Deserialize, Serialize};

/// Fixed margin added around the tight ink rectangle, clamped to the buffer
const BOX_MARGIN: u32 = 2;

/// Axis-aligned ink bounding box in source-buffer coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InkBox {
    /// X coordinate of the top-left corner
    pub x: u32,
    /// Y coordinate of the top-left corner
    pub y: u32,
    /// Box width, always >= 1
    pub width: u32,
    /// Box height, always >= 1
    pub height: u32,
}

/// Rescale intensities so they span the full 0-255 range.
///
/// `v' = floor((v - min) * 255 / span)` with `span = max(1, max - min)`;
/// the span floor guards a near-flat image against division by zero.
#[must_use]
pub fn stretch_contrast(luma: &GrayImage) -> GrayImage {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    for p in luma.pixels() {
        min = min.min(p.0[0]);
        max = max.max(p.0[0]);
    }
    let span = u32::from(max.saturating_sub(min)).max(1);

    let mut out = luma.clone();
    for p in out.pixels_mut() {
        p.0[0] = (u32::from(p.0[0] - min) * 255 / span) as u8;
    }
    out
}

/// Compute the expanded bounding box of all foreground cells.
///
/// A cell is foreground iff its contrast-stretched intensity is strictly
/// greater than `threshold`. Returns `None` when nothing exceeds the
/// threshold, which callers must treat as "nothing drawn".
#[must_use]
pub fn ink_bounding_box(stretched: &GrayImage, threshold: u8) -> Option<InkBox> {
    let (width, height) = stretched.dimensions();
    let mut min_x = width;
    let mut min_y = height;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut found = false;

    for (x, y, p) in stretched.enumerate_pixels() {
        if p.0[0] > threshold {
            found = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    if !found {
        return None;
    }

    let min_x = min_x.saturating_sub(BOX_MARGIN);
    let min_y = min_y.saturating_sub(BOX_MARGIN);
    let max_x = (max_x + BOX_MARGIN).min(width - 1);
    let max_y = (max_y + BOX_MARGIN).min(height - 1);

    Some(InkBox {
        x: min_x,
        y: min_y,
        width: max_x - min_x + 1,
        height: max_y - min_y + 1,
    })
}
