#![cfg(feature = "rayon")]

use carddet::{
    softmax_rows, softmax_rows_par, Detector, DetectorConfig, ImageSize, PriorBank, PriorConfig,
};

// Deterministic pseudo-tensor so serial and parallel runs see identical
// inputs without pulling in an RNG.
fn make_logits(rows: usize, cols: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for c in 0..cols {
            let mixed = ((r * 31) ^ (c * 7) ^ (r * c)) % 97;
            data.push(mixed as f32 / 10.0 - 4.8);
        }
    }
    data
}

fn make_regressions(rows: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(rows * 4);
    for r in 0..rows {
        for c in 0..4 {
            let mixed = ((r * 13) ^ (c * 5)) % 41;
            data.push(mixed as f32 / 20.0 - 1.0);
        }
    }
    data
}

#[test]
fn parallel_softmax_matches_sequential() {
    let num_classes = 13;
    let logits = make_logits(2766, num_classes);

    let serial = softmax_rows(&logits, num_classes).unwrap();
    let parallel = softmax_rows_par(&logits, num_classes).unwrap();

    assert_eq!(serial.len(), parallel.len());
    for (s, p) in serial.iter().zip(&parallel) {
        assert!((s - p).abs() < 1e-7);
    }
}

#[test]
fn parallel_detect_matches_sequential() {
    let image = ImageSize {
        width: 300,
        height: 300,
    };
    let num_classes = 13;

    let serial_detector = Detector::new(PriorBank::new(PriorConfig::default()).unwrap());
    let parallel_detector = Detector::new(PriorBank::new(PriorConfig::default()).unwrap())
        .with_config(DetectorConfig {
            parallel: true,
            ..DetectorConfig::default()
        });

    let num_priors = serial_detector.bank().len();
    let regressions = make_regressions(num_priors);
    let scores = make_logits(num_priors, num_classes);

    let serial = serial_detector.detect(&regressions, &scores, image).unwrap();
    let parallel = parallel_detector
        .detect(&regressions, &scores, image)
        .unwrap();
    assert_eq!(serial, parallel);
}
