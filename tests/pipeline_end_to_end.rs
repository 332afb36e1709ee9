use carddet::{
    CenterBox, DetectError, Detector, DetectorConfig, ImageSize, PriorBank, PriorConfig,
};

const IMAGE: ImageSize = ImageSize {
    width: 640,
    height: 403,
};

fn centered_prior(w: f32, h: f32) -> CenterBox {
    CenterBox {
        cx: 0.5,
        cy: 0.5,
        w,
        h,
    }
}

fn disjoint_priors(n: usize) -> Vec<CenterBox> {
    (0..n)
        .map(|i| CenterBox {
            cx: 0.1 + 0.18 * i as f32,
            cy: 0.1 + 0.18 * i as f32,
            w: 0.1,
            h: 0.1,
        })
        .collect()
}

// Logit rows built so softmax reproduces the wanted class probabilities:
// a logit gap of ln(p / q) puts p and q on the two classes.
fn two_class_logits(class1_probs: &[f32]) -> Vec<f32> {
    class1_probs
        .iter()
        .flat_map(|&p| [0.0, (p / (1.0 - p)).ln()])
        .collect()
}

#[test]
fn identical_priors_collapse_to_one_detection() {
    let prior = centered_prior(0.2, 0.2);
    let detector = Detector::new(PriorBank::from_priors(vec![prior, prior]));

    let regressions = [0.0; 8];
    let scores = two_class_logits(&[0.9, 0.9]);
    let detections = detector.detect(&regressions, &scores, IMAGE).unwrap();

    assert_eq!(detections.len(), 1);
    let d = detections[0];
    assert_eq!(d.label, 1);
    assert!((d.confidence - 0.9).abs() < 1e-5);
    assert!((d.bbox.xmin - 0.4).abs() < 1e-6);
    assert!((d.bbox.ymin - 0.4).abs() < 1e-6);
    assert!((d.bbox.xmax - 0.6).abs() < 1e-6);
    assert!((d.bbox.ymax - 0.6).abs() < 1e-6);
    assert_eq!(d.image_size, IMAGE);
}

#[test]
fn candidate_pool_cap_limits_consideration() {
    let priors = disjoint_priors(5);
    let detector = Detector::new(PriorBank::from_priors(priors)).with_config(DetectorConfig {
        candidate_size: 1,
        ..DetectorConfig::default()
    });

    let regressions = [0.0; 20];
    let scores = two_class_logits(&[0.5, 0.6, 0.95, 0.7, 0.8]);
    let detections = detector.detect(&regressions, &scores, IMAGE).unwrap();

    assert_eq!(detections.len(), 1);
    assert!((detections[0].confidence - 0.95).abs() < 1e-5);
}

#[test]
fn top_k_picks_the_best_across_classes() {
    let priors = disjoint_priors(2);
    let detector = Detector::new(PriorBank::from_priors(priors)).with_config(DetectorConfig {
        top_k: 1,
        ..DetectorConfig::default()
    });

    let regressions = [0.0; 8];
    // Three classes; prior 0 favors class 1 at 0.8, prior 1 class 2 at 0.6.
    #[rustfmt::skip]
    let scores = vec![
        0.0, 8.0f32.ln(), 0.0,
        0.0, 0.0, 3.0f32.ln(),
    ];
    let detections = detector.detect(&regressions, &scores, IMAGE).unwrap();

    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].label, 1);
    assert!((detections[0].confidence - 0.8).abs() < 1e-5);
}

#[test]
fn nothing_over_threshold_is_a_normal_outcome() {
    let priors = disjoint_priors(3);
    let detector = Detector::new(PriorBank::from_priors(priors));

    let regressions = [0.0; 12];
    let scores = two_class_logits(&[0.1, 0.2, 0.25]);
    let detections = detector.detect(&regressions, &scores, IMAGE).unwrap();
    assert!(detections.is_empty());
}

#[test]
fn empty_inputs_yield_empty_detections() {
    let detector = Detector::new(PriorBank::from_priors(Vec::new()));
    assert!(detector.detect(&[], &[], IMAGE).unwrap().is_empty());

    let detector = Detector::new(PriorBank::from_priors(disjoint_priors(2)));
    assert!(detector.detect(&[], &[], IMAGE).unwrap().is_empty());
}

#[test]
fn misaligned_tensors_fail_loudly() {
    let detector = Detector::new(PriorBank::from_priors(disjoint_priors(2)));

    let err = detector
        .detect(&[0.0; 7], &two_class_logits(&[0.5, 0.5]), IMAGE)
        .err()
        .unwrap();
    assert!(matches!(
        err,
        DetectError::ShapeMismatch {
            context: "box regressions",
            ..
        }
    ));

    let err = detector.detect(&[0.0; 8], &[0.0; 5], IMAGE).err().unwrap();
    assert!(matches!(
        err,
        DetectError::ShapeMismatch {
            context: "class scores",
            ..
        }
    ));
}

#[test]
fn card_grid_with_flat_logits_detects_nothing() {
    // 13 classes of all-zero logits normalize to ~0.077 each, well under
    // the default 0.3 threshold.
    let detector = Detector::new(PriorBank::new(PriorConfig::default()).unwrap());
    detector.warm_up();
    let num_priors = detector.bank().len();
    assert_eq!(num_priors, 2766);

    let regressions = vec![0.0; num_priors * 4];
    let scores = vec![0.0; num_priors * 13];
    let detections = detector.detect(&regressions, &scores, IMAGE).unwrap();
    assert!(detections.is_empty());
}
