//! Digit classification over the normalization pipeline
//!
//! This crate turns raw per-class scores from an external digit model into a
//! probability distribution and a top prediction, and wires the
//! [`digit_pipeline`] normalization chain to a scorer behind the
//! [`DigitScorer`] seam. The bundled [`onnx::OnnxDigitScorer`] runs an
//! MNIST-style CNN exported to ONNX; tests substitute a fake scorer.
//!
//! # Example
//! ```no_run
//! use digit_classifier::{onnx::OnnxDigitScorer, DigitClassifier};
//! use digit_pipeline::PipelineConfig;
//!
//! # fn main() -> Result<(), digit_classifier::ClassifierError> {
//! let scorer = OnnxDigitScorer::new("models/mnist_cnn.onnx")?;
//! let mut classifier = DigitClassifier::new(scorer, PipelineConfig::default());
//!
//! let drawing = image::RgbaImage::new(280, 280);
//! let reading = classifier.classify(&drawing)?;
//! println!("{} ({:.1}%)", reading.prediction.digit, reading.prediction.confidence * 100.0);
//! # Ok(())
//! # }
//! ```

pub mod onnx;

use image::{GrayImage, RgbaImage};
use ndarray::Array4;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use digit_pipeline::{normalize, InkBox, PipelineConfig, PipelineError};

/// Number of digit classes the scorer must produce scores for
pub const DIGIT_CLASSES: usize = 10;

/// Errors that can occur during classification
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    #[error("inference error: {0}")]
    Inference(String),

    #[error("scorer returned {len} scores, expected 10")]
    ScoreCountMismatch { len: usize },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// The external scorer as an opaque capability.
///
/// Implementations take the model-ready (1, 1, 28, 28) tensor and return the
/// 10 raw class scores. `&mut self` keeps one invocation in flight per
/// scorer; callers wanting overlap must queue or drop requests themselves.
pub trait DigitScorer {
    fn score(&mut self, tensor: &Array4<f32>) -> Result<Vec<f32>, ClassifierError>;
}

/// Probability distribution and top prediction derived from raw scores
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    /// Per-class probabilities, index = digit, summing to 1
    pub probabilities: Vec<f32>,
    /// Digit with the highest probability (ties broken by lowest digit)
    pub digit: u8,
    /// Probability at the predicted digit
    pub confidence: f32,
}

/// Result of one classification request
#[derive(Debug, Clone)]
pub struct DigitReading {
    pub prediction: Prediction,
    /// The exact 28x28 frame the model saw, for diagnostic display
    pub frame: GrayImage,
    /// Ink bounding box in source coordinates, None when nothing was drawn
    pub ink_box: Option<InkBox>,
}

/// End-to-end classifier: normalization pipeline plus a scorer
pub struct DigitClassifier<S: DigitScorer> {
    scorer: S,
    config: PipelineConfig,
}

impl<S: DigitScorer> DigitClassifier<S> {
    #[must_use]
    pub fn new(scorer: S, config: PipelineConfig) -> Self {
        Self { scorer, config }
    }

    /// Update the tuning parameters for subsequent requests
    pub fn set_config(&mut self, config: PipelineConfig) {
        self.config = config;
    }

    /// Classify one raster snapshot of the drawing surface.
    ///
    /// The transform is deterministic, so failures are never retried here;
    /// only the scorer call itself may warrant retry policy, and that
    /// belongs to the scorer implementation.
    pub fn classify(&mut self, raster: &RgbaImage) -> Result<DigitReading, ClassifierError> {
        let digit = normalize(raster, &self.config)?;
        if digit.ink_box.is_none() {
            debug!("blank canvas, scoring an all-black frame");
        }

        let scores = self.scorer.score(&digit.tensor)?;
        let prediction = interpret(&scores)?;

        Ok(DigitReading {
            prediction,
            frame: digit.frame,
            ink_box: digit.ink_box,
        })
    }
}

/// Convert raw class scores into a [`Prediction`].
///
/// # Errors
/// Fails with [`ClassifierError::ScoreCountMismatch`] unless exactly 10
/// scores are supplied; anything else is a wiring bug in the scorer and must
/// not be silently papered over.
pub fn interpret(scores: &[f32]) -> Result<Prediction, ClassifierError> {
    if scores.len() != DIGIT_CLASSES {
        return Err(ClassifierError::ScoreCountMismatch { len: scores.len() });
    }

    let probabilities = softmax(scores);

    let mut digit = 0usize;
    let mut confidence = probabilities[0];
    for (i, &p) in probabilities.iter().enumerate().skip(1) {
        // Strict comparison: the first occurrence wins on ties
        if p > confidence {
            digit = i;
            confidence = p;
        }
    }

    Ok(Prediction {
        probabilities,
        digit: digit as u8,
        confidence,
    })
}

/// Numerically stable softmax: shift by the maximum before exponentiating
#[must_use]
pub fn softmax(scores: &[f32]) -> Vec<f32> {
    let max_score = scores.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let exps: Vec<f32> = scores.iter().map(|&s| (s - max_score).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|&e| e / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0, -1.0]);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        assert!(probs.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn test_softmax_handles_large_scores() {
        // Without the max shift these would overflow to infinity
        let probs = softmax(&[1000.0, 999.0]);
        assert!(probs.iter().all(|p| p.is_finite()));
        assert!(probs[0] > probs[1]);
    }

    #[test]
    fn test_interpret_dominant_class() {
        let scores = [5.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        let prediction = interpret(&scores).unwrap();

        assert_eq!(prediction.digit, 0);
        assert!(prediction.confidence > 0.1);
        assert!(prediction
            .probabilities
            .iter()
            .skip(1)
            .all(|&p| p < prediction.confidence));
        assert!((prediction.probabilities.iter().sum::<f32>() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_interpret_tie_break_lowest_digit() {
        let scores = [0.5f32; 10];
        let prediction = interpret(&scores).unwrap();
        assert_eq!(prediction.digit, 0);
        assert!((prediction.confidence - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_interpret_rejects_wrong_length() {
        let result = interpret(&[1.0, 2.0, 3.0]);
        assert!(matches!(
            result,
            Err(ClassifierError::ScoreCountMismatch { len: 3 })
        ));
    }

    #[test]
    fn test_prediction_serialization() {
        let prediction = interpret(&[0.0, 0.0, 9.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
        let json = serde_json::to_string(&prediction).unwrap();
        let back: Prediction = serde_json::from_str(&json).unwrap();
        assert_eq!(back.digit, 2);
        assert_eq!(back.probabilities.len(), 10);
    }

    struct FixedScorer(Vec<f32>);

    impl DigitScorer for FixedScorer {
        fn score(&mut self, tensor: &Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
            assert_eq!(tensor.shape(), &[1, 1, 28, 28]);
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_classify_with_fake_scorer() {
        let scores = vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 8.0, 0.0, 0.0];
        let mut classifier = DigitClassifier::new(FixedScorer(scores), PipelineConfig::default());

        let mut drawing = RgbaImage::from_pixel(100, 100, image::Rgba([255, 255, 255, 255]));
        for y in 20..80 {
            for x in 45..55 {
                drawing.put_pixel(x, y, image::Rgba([0, 0, 0, 255]));
            }
        }

        let reading = classifier.classify(&drawing).unwrap();
        assert_eq!(reading.prediction.digit, 7);
        assert!(reading.ink_box.is_some());
        assert_eq!(reading.frame.dimensions(), (28, 28));
    }

    #[test]
    fn test_classify_blank_canvas_is_defined() {
        let scores = vec![0.1f32; 10];
        let mut classifier = DigitClassifier::new(FixedScorer(scores), PipelineConfig::default());

        let blank = RgbaImage::from_pixel(64, 64, image::Rgba([255, 255, 255, 255]));
        let reading = classifier.classify(&blank).unwrap();

        assert_eq!(reading.ink_box, None);
        assert_eq!(reading.prediction.digit, 0);
        assert!((reading.prediction.confidence - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_classify_rejects_empty_raster() {
        let mut classifier =
            DigitClassifier::new(FixedScorer(vec![0.0; 10]), PipelineConfig::default());
        let empty = RgbaImage::new(0, 0);
        let result = classifier.classify(&empty);
        assert!(matches!(result, Err(ClassifierError::Pipeline(_))));
    }

    #[test]
    fn test_bad_scorer_surfaces_distinct_error() {
        // A scorer returning the wrong class count is a contract violation,
        // not a low-confidence prediction
        let mut classifier =
            DigitClassifier::new(FixedScorer(vec![1.0; 9]), PipelineConfig::default());
        let blank = RgbaImage::from_pixel(32, 32, image::Rgba([0, 0, 0, 255]));
        let result = classifier.classify(&blank);
        assert!(matches!(
            result,
            Err(ClassifierError::ScoreCountMismatch { len: 9 })
        ));
    }
}
