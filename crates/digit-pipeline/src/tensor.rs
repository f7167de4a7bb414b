//! Affine tensor encoding of the canonical frame
//!
//! The mean/std pair is the dataset-wide statistic the classifier was
//! trained with. It is a protocol constant shared with the model, not a
//! tuning knob.

use image::GrayImage;
use ndarray::Array4;

use crate::FRAME_SIZE;

/// Dataset-wide intensity mean used at training time
pub const MNIST_MEAN: f32 = 0.1307;

/// Dataset-wide intensity standard deviation used at training time
pub const MNIST_STD: f32 = 0.3081;

/// Encode the 28x28 frame as an NCHW float tensor of shape (1, 1, 28, 28).
///
/// Each intensity is scaled to [0, 1] and normalized as
/// `x = (v - MNIST_MEAN) / MNIST_STD`, row-major.
///
/// # Panics
/// Panics if the frame is not exactly 28x28; frames produced by this crate
/// always are.
#[must_use]
pub fn encode(frame: &GrayImage) -> Array4<f32> {
    assert_eq!(
        frame.dimensions(),
        (FRAME_SIZE, FRAME_SIZE),
        "canonical frame must be {FRAME_SIZE}x{FRAME_SIZE}"
    );

    let side = FRAME_SIZE as usize;
    let mut tensor = Array4::zeros((1, 1, side, side));
    for (x, y, p) in frame.enumerate_pixels() {
        let v = f32::from(p.0[0]) / 255.0;
        tensor[[0, 0, y as usize, x as usize]] = (v - MNIST_MEAN) / MNIST_STD;
    }
    tensor
}
