use digit_classifier::{onnx::OnnxDigitScorer, DigitClassifier};
use digit_pipeline::PipelineConfig;
use image::{Rgba, RgbaImage};

const MODEL_PATH: &str = "models/mnist_cnn.onnx";

/// Draw a crude vertical stroke, the closest freehand shape to a "1"
fn stroke_canvas() -> RgbaImage {
    let mut raster = RgbaImage::from_pixel(280, 280, Rgba([255, 255, 255, 255]));
    for y in 60..220 {
        for x in 132..148 {
            raster.put_pixel(x, y, Rgba([0, 0, 0, 255]));
        }
    }
    raster
}

#[test]
#[ignore] // Requires mnist_cnn.onnx model to be exported
fn test_scorer_loads_model() {
    let scorer = OnnxDigitScorer::new(MODEL_PATH);
    assert!(scorer.is_ok(), "failed to load model from {MODEL_PATH}");
}

#[test]
#[ignore] // Requires mnist_cnn.onnx model to be exported
fn test_classify_stroke() {
    let scorer = OnnxDigitScorer::new(MODEL_PATH).unwrap();
    let mut classifier = DigitClassifier::new(scorer, PipelineConfig::default());

    let reading = classifier.classify(&stroke_canvas()).unwrap();

    assert_eq!(reading.prediction.probabilities.len(), 10);
    assert!(
        (reading.prediction.probabilities.iter().sum::<f32>() - 1.0).abs() < 1e-5,
        "probabilities must sum to 1"
    );
    assert!(reading.ink_box.is_some());
    println!(
        "predicted {} with {:.1}% confidence",
        reading.prediction.digit,
        reading.prediction.confidence * 100.0
    );
}

#[test]
#[ignore] // Requires mnist_cnn.onnx model to be exported
fn test_classify_blank_canvas_low_confidence_path() {
    let scorer = OnnxDigitScorer::new(MODEL_PATH).unwrap();
    let mut classifier = DigitClassifier::new(scorer, PipelineConfig::default());

    let blank = RgbaImage::from_pixel(280, 280, Rgba([255, 255, 255, 255]));
    let reading = classifier.classify(&blank).unwrap();

    // A blank canvas is a defined path: the model scores an all-black frame
    assert_eq!(reading.ink_box, None);
    assert_eq!(reading.prediction.probabilities.len(), 10);
}

#[test]
#[ignore] // Requires mnist_cnn.onnx model to be exported
fn test_classify_is_deterministic() {
    let scorer = OnnxDigitScorer::new(MODEL_PATH).unwrap();
    let mut classifier = DigitClassifier::new(scorer, PipelineConfig::default());

    let raster = stroke_canvas();
    let a = classifier.classify(&raster).unwrap();
    let b = classifier.classify(&raster).unwrap();

    assert_eq!(a.prediction.digit, b.prediction.digit);
    assert_eq!(a.frame.as_raw(), b.frame.as_raw());
}
