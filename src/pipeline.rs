//! Detection pipeline: raw tensors in, labeled detections out.

use crate::boxes::{center_form_to_corner_form, CornerBox};
use crate::decode::{decode_locations, Variances};
use crate::prior::PriorBank;
use crate::score::softmax_rows;
#[cfg(feature = "rayon")]
use crate::score::softmax_rows_par;
use crate::suppress::{suppress, SuppressParams};
use crate::trace::{trace_event, trace_span};
use crate::util::{DetectError, DetectResult};

/// Source image dimensions, attached to detections so the caller can
/// denormalize coordinates. Not used in any geometric computation here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageSize {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
}

/// A detected region with its class label and confidence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    /// Class label; 0 is reserved for background and never appears here.
    pub label: usize,
    /// Class probability in [0, 1].
    pub confidence: f32,
    /// Region in normalized corner form.
    pub bbox: CornerBox,
    /// Dimensions of the image the detection came from.
    pub image_size: ImageSize,
}

/// Pipeline tuning parameters.
#[derive(Clone, Copy, Debug)]
pub struct DetectorConfig {
    /// Variance constants matching the training-time encoding.
    pub variances: Variances,
    /// Minimum class probability for a candidate box.
    pub prob_threshold: f32,
    /// Overlap above which duplicates are suppressed.
    pub iou_threshold: f32,
    /// Per-class candidate pool cap.
    pub candidate_size: usize,
    /// Global cap on returned detections.
    pub top_k: usize,
    /// Normalize scores row-parallel (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            variances: Variances::default(),
            prob_threshold: 0.3,
            iou_threshold: 0.45,
            candidate_size: 200,
            top_k: 10,
            parallel: false,
        }
    }
}

/// Post-processor for a single-shot detector.
///
/// Owns the prior grid and turns each inference call's raw regression and
/// class-score tensors into a deduplicated detection list. All per-call
/// state is local; a `Detector` can be shared across threads.
pub struct Detector {
    bank: PriorBank,
    cfg: DetectorConfig,
}

impl Detector {
    /// Creates a detector with default tuning.
    pub fn new(bank: PriorBank) -> Self {
        Self {
            bank,
            cfg: DetectorConfig::default(),
        }
    }

    /// Replaces the tuning parameters.
    pub fn with_config(mut self, cfg: DetectorConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Eagerly computes the prior grid.
    pub fn warm_up(&self) {
        self.bank.warm_up();
    }

    /// The prior bank backing this detector.
    pub fn bank(&self) -> &PriorBank {
        &self.bank
    }

    /// Runs the full post-processing pass over one inference output.
    ///
    /// `regressions` is the flat `[num_priors][4]` offset tensor and
    /// `scores` the flat `[num_priors][num_classes]` logit tensor; the
    /// class count is derived from the tensor length. Returns an empty list
    /// when nothing clears the probability threshold or when the inputs are
    /// empty; shape mismatches fail before any computation.
    pub fn detect(
        &self,
        regressions: &[f32],
        scores: &[f32],
        image_size: ImageSize,
    ) -> DetectResult<Vec<Detection>> {
        let priors = self.bank.priors();
        // Nothing to detect is a normal outcome, not an error.
        if priors.is_empty() || scores.is_empty() {
            return Ok(Vec::new());
        }
        if scores.len() % priors.len() != 0 {
            return Err(DetectError::ShapeMismatch {
                expected: priors.len() * (scores.len() / priors.len()).max(1),
                got: scores.len(),
                context: "class scores",
            });
        }
        let num_classes = scores.len() / priors.len();

        let _span = trace_span!(
            "detect",
            priors = priors.len(),
            classes = num_classes
        )
        .entered();

        let decoded = decode_locations(regressions, priors, self.cfg.variances)?;
        let corner_boxes = center_form_to_corner_form(&decoded);
        let probs = self.normalize(scores, num_classes)?;

        let picked = suppress(
            &probs,
            num_classes,
            &corner_boxes,
            &SuppressParams {
                prob_threshold: self.cfg.prob_threshold,
                iou_threshold: self.cfg.iou_threshold,
                candidate_size: self.cfg.candidate_size,
                top_k: self.cfg.top_k,
            },
        )?;
        trace_event!("detections", count = picked.len());

        Ok(picked
            .into_iter()
            .map(|p| Detection {
                label: p.label,
                confidence: p.score,
                bbox: p.bbox,
                image_size,
            })
            .collect())
    }

    #[cfg(feature = "rayon")]
    fn normalize(&self, scores: &[f32], num_classes: usize) -> DetectResult<Vec<f32>> {
        if self.cfg.parallel {
            softmax_rows_par(scores, num_classes)
        } else {
            softmax_rows(scores, num_classes)
        }
    }

    #[cfg(not(feature = "rayon"))]
    fn normalize(&self, scores: &[f32], num_classes: usize) -> DetectResult<Vec<f32>> {
        softmax_rows(scores, num_classes)
    }
}
