//! Crop, resize, pad, smoothing and center-of-mass recentering
//!
//! Bounding-box centering centers geometry, not mass. Handwritten strokes
//! are asymmetric and the classifier was trained on mass-centered data, so
//! the frame is shifted until the intensity centroid sits at the frame
//! center before encoding.

use image::imageops::{self, FilterType};
use image::GrayImage;
use tracing::debug;

use crate::segment::InkBox;
use crate::{FRAME_SIZE, INK_TARGET};

/// Crop the ink region, resize it so its longest side is [`INK_TARGET`]
/// pixels and paste it centered onto a black [`FRAME_SIZE`] frame.
///
/// With no bounding box (nothing drawn) the whole buffer is treated as the
/// crop region, which degrades gracefully into an all-black frame. The
/// resize uses Triangle (bilinear) filtering; nearest-neighbor would leave
/// stairstep artifacts the classifier is sensitive to.
#[must_use]
pub fn compose_frame(stretched: &GrayImage, ink_box: Option<InkBox>) -> GrayImage {
    let (width, height) = stretched.dimensions();
    let region = ink_box.unwrap_or(InkBox {
        x: 0,
        y: 0,
        width,
        height,
    });

    let crop = imageops::crop_imm(stretched, region.x, region.y, region.width, region.height)
        .to_image();

    let scale = INK_TARGET as f64 / f64::from(region.width.max(region.height));
    let resized_w = ((f64::from(region.width) * scale).round() as u32).max(1);
    let resized_h = ((f64::from(region.height) * scale).round() as u32).max(1);
    let resized = imageops::resize(&crop, resized_w, resized_h, FilterType::Triangle);

    let mut frame = GrayImage::new(FRAME_SIZE, FRAME_SIZE);
    let left = (FRAME_SIZE - resized_w) / 2;
    let top = (FRAME_SIZE - resized_h) / 2;
    imageops::replace(&mut frame, &resized, i64::from(left), i64::from(top));
    frame
}

/// Apply the optional Gaussian blur, then shift the frame so its intensity
/// centroid lands on the frame center.
///
/// A blank frame (zero total intensity) is left in place. Content shifted
/// past the frame edge is clipped.
#[must_use]
pub fn smooth_and_center(frame: GrayImage, blur: f32) -> GrayImage {
    let frame = if blur > 0.0 {
        imageops::blur(&frame, blur)
    } else {
        frame
    };

    let mut sum = 0.0f64;
    let mut cx = 0.0f64;
    let mut cy = 0.0f64;
    for (x, y, p) in frame.enumerate_pixels() {
        let v = f64::from(p.0[0]);
        sum += v;
        cx += f64::from(x) * v;
        cy += f64::from(y) * v;
    }
    if sum == 0.0 {
        return frame;
    }
    cx /= sum;
    cy /= sum;

    let center = f64::from(FRAME_SIZE / 2);
    let dx = (center - cx).round() as i64;
    let dy = (center - cy).round() as i64;
    if dx == 0 && dy == 0 {
        return frame;
    }
    debug!(cx, cy, dx, dy, "recentering frame on intensity centroid");

    let mut shifted = GrayImage::new(FRAME_SIZE, FRAME_SIZE);
    for (x, y, p) in frame.enumerate_pixels() {
        let nx = i64::from(x) + dx;
        let ny = i64::from(y) + dy;
        if (0..i64::from(FRAME_SIZE)).contains(&nx) && (0..i64::from(FRAME_SIZE)).contains(&ny) {
            shifted.put_pixel(nx as u32, ny as u32, *p);
        }
    }
    shifted
}
