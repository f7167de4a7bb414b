//! ONNX Runtime scorer for the digit model
//!
//! The model contract is fixed: one float32 input of shape (1, 1, 28, 28)
//! under the `"input"` slot, one float32 output of 10 raw class scores under
//! the `"logits"` slot. Slot names and shapes are protocol constants shared
//! with the exported model, not configuration.

use ndarray::Array4;
use ort::{session::Session, value::TensorRef};
use std::path::Path;
use tracing::{debug, info};

use crate::{ClassifierError, DigitScorer};

/// Fixed input slot name of the exported digit model
pub const INPUT_NAME: &str = "input";

/// Fixed output slot name carrying the 10 raw class scores
pub const OUTPUT_NAME: &str = "logits";

/// Scorer backed by an ONNX Runtime session
pub struct OnnxDigitScorer {
    session: Session,
}

impl OnnxDigitScorer {
    /// Load the digit model from an `.onnx` file.
    ///
    /// # Errors
    /// Returns [`ClassifierError::ModelLoad`] when the session cannot be
    /// created or the file cannot be read.
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self, ClassifierError> {
        info!("loading digit model from {:?}", model_path.as_ref());

        let session = Session::builder()
            .map_err(|e| ClassifierError::ModelLoad(e.to_string()))?
            .commit_from_file(model_path)
            .map_err(|e| ClassifierError::ModelLoad(e.to_string()))?;

        info!("digit model loaded");
        Ok(Self { session })
    }
}

impl DigitScorer for OnnxDigitScorer {
    fn score(&mut self, tensor: &Array4<f32>) -> Result<Vec<f32>, ClassifierError> {
        // Zero-copy tensor: feed a view of the pipeline's buffer
        let input_tensor = TensorRef::from_array_view(tensor.view())
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let outputs = self
            .session
            .run(ort::inputs![INPUT_NAME => input_tensor])
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let (shape, data) = outputs[OUTPUT_NAME]
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        debug!(?shape, "digit model output");
        Ok(data.to_vec())
    }
}
