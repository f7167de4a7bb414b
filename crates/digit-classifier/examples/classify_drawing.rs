//! Classify a drawing saved as an image file.
//!
//! Usage:
//!     cargo run --example classify_drawing -- <model.onnx> <drawing.png> [preview.png]

use anyhow::{bail, Context, Result};
use digit_classifier::{onnx::OnnxDigitScorer, DigitClassifier};
use digit_pipeline::{render_preview, PipelineConfig};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        bail!("usage: classify_drawing <model.onnx> <drawing.png> [preview.png]");
    }

    let drawing = image::open(&args[2])
        .with_context(|| format!("failed to open {}", args[2]))?
        .to_rgba8();

    let scorer = OnnxDigitScorer::new(&args[1])?;
    let mut classifier = DigitClassifier::new(scorer, PipelineConfig::default());

    let reading = classifier.classify(&drawing)?;

    println!(
        "predicted digit: {} ({:.1}% confidence)",
        reading.prediction.digit,
        reading.prediction.confidence * 100.0
    );
    for (digit, prob) in reading.prediction.probabilities.iter().enumerate() {
        println!("  {digit}: {:5.1}%", prob * 100.0);
    }
    match reading.ink_box {
        Some(bbox) => println!("ink box: {bbox:?}"),
        None => println!("ink box: none (blank canvas)"),
    }

    if let Some(path) = args.get(3) {
        render_preview(&reading.frame, 280)
            .save(path)
            .with_context(|| format!("failed to save preview to {path}"))?;
        println!("model-input preview written to {path}");
    }

    Ok(())
}
