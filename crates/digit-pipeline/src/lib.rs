//! Deterministic normalization pipeline for hand-drawn digit rasters
//!
//! This crate converts an arbitrary RGBA snapshot of a drawing surface into
//! the exact 1x1x28x28 float tensor an MNIST-style digit classifier expects.
//! The transform chain reproduces the statistics of the training-data
//! preparation pixel for pixel, which makes exactness a correctness property:
//! a mismatched pipeline degrades model accuracy silently, without ever
//! raising an error.
//!
//! # Stages
//! 1. Grayscale conversion and polarity correction (ink always bright on dark)
//! 2. Contrast stretch, foreground threshold, ink bounding box
//! 3. Crop, aspect-preserving resize (longest ink side -> 20 px), pad to 28x28
//! 4. Optional Gaussian smoothing and center-of-mass recentering
//! 5. Affine tensor encoding with the fixed training mean/std
//!
//! Every stage allocates a fresh buffer and never mutates its input, so
//! repeated runs over the same raster produce bit-identical tensors.
//!
//! # Example
//! ```
//! use digit_pipeline::{normalize, PipelineConfig};
//! use image::RgbaImage;
//!
//! # fn main() -> Result<(), digit_pipeline::PipelineError> {
//! let raster = RgbaImage::new(280, 280); // snapshot of the drawing surface
//! let digit = normalize(&raster, &PipelineConfig::default())?;
//!
//! assert_eq!(digit.frame.dimensions(), (28, 28));
//! assert_eq!(digit.tensor.len(), 784);
//! # Ok(())
//! # }
//! ```

pub mod compose;
pub mod grayscale;
pub mod segment;
pub mod tensor;

use image::imageops::{self, FilterType};
use image::{GrayImage, RgbaImage};
use ndarray::Array4;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use segment::InkBox;
pub use tensor::{MNIST_MEAN, MNIST_STD};

/// Side length of the canonical model input frame
pub const FRAME_SIZE: u32 = 28;

/// Longest side of the ink after resizing, leaving a 4 px margin in the frame
pub const INK_TARGET: u32 = 20;

/// Viewer-supplied tuning parameters for one normalization run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Foreground threshold on contrast-stretched intensities (recognized
    /// range 0-50; any value is accepted)
    pub threshold: u8,
    /// Gaussian blur sigma applied to the 28x28 frame (recognized range
    /// 0.0-1.5; 0 disables smoothing)
    pub blur: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: 10,
            blur: 0.5,
        }
    }
}

/// Errors that can occur during normalization
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input raster is empty ({width}x{height})")]
    EmptyRaster { width: u32, height: u32 },
}

/// Output bundle of one normalization run
#[derive(Debug, Clone)]
pub struct NormalizedDigit {
    /// The final 28x28 frame, exactly what the tensor was encoded from
    pub frame: GrayImage,
    /// Tight ink bounding box in source coordinates, None when the canvas
    /// held no foreground pixels
    pub ink_box: Option<InkBox>,
    /// Model-ready NCHW tensor of shape (1, 1, 28, 28)
    pub tensor: Array4<f32>,
}

/// Run the full normalization chain on a raster snapshot.
///
/// A canvas with no foreground pixels is not an error: the pipeline falls
/// back to cropping the whole buffer and yields an all-black frame, which
/// the classifier turns into a low-confidence prediction.
///
/// # Errors
/// Returns [`PipelineError::EmptyRaster`] when either raster dimension is 0.
pub fn normalize(
    raster: &RgbaImage,
    config: &PipelineConfig,
) -> Result<NormalizedDigit, PipelineError> {
    let (width, height) = raster.dimensions();
    if width == 0 || height == 0 {
        return Err(PipelineError::EmptyRaster { width, height });
    }

    let luma = grayscale::to_luminance(raster);
    let luma = grayscale::correct_polarity(luma);

    let stretched = segment::stretch_contrast(&luma);
    let ink_box = segment::ink_bounding_box(&stretched, config.threshold);
    debug!(?ink_box, threshold = config.threshold, "ink segmented");

    let frame = compose::compose_frame(&stretched, ink_box);
    let frame = compose::smooth_and_center(frame, config.blur);

    let tensor = tensor::encode(&frame);

    Ok(NormalizedDigit {
        frame,
        ink_box,
        tensor,
    })
}

/// Upscale the canonical frame for diagnostic display.
///
/// Uses nearest-neighbor interpolation on purpose: the viewer must see the
/// exact discretized model input, never a smoothed rendition of it.
#[must_use]
pub fn render_preview(frame: &GrayImage, size: u32) -> GrayImage {
    imageops::resize(frame, size, size, FilterType::Nearest)
}
