//! Per-class non-maximum suppression over scored candidate boxes.

use crate::boxes::{iou, CornerBox};
use crate::util::{DetectError, DetectResult};
use std::cmp::Ordering;

/// Suppression thresholds and caps.
#[derive(Clone, Copy, Debug)]
pub struct SuppressParams {
    /// Minimum class probability for a box to become a candidate.
    pub prob_threshold: f32,
    /// Overlap above which a lower-scoring candidate is discarded.
    pub iou_threshold: f32,
    /// Per-class cap on the candidate pool, bounding suppression cost.
    pub candidate_size: usize,
    /// Global cap on survivors across all classes.
    pub top_k: usize,
}

impl Default for SuppressParams {
    fn default() -> Self {
        Self {
            prob_threshold: 0.3,
            iou_threshold: 0.45,
            candidate_size: 200,
            top_k: 10,
        }
    }
}

/// A surviving box with its class label and probability.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Picked {
    /// Class label; never 0 (background is skipped).
    pub label: usize,
    /// Class probability in [0, 1].
    pub score: f32,
    /// Box in corner form.
    pub bbox: CornerBox,
}

#[derive(Clone, Copy)]
struct Candidate {
    prior: usize,
    score: f32,
}

// Descending score with deterministic tie-breaking on the prior index, so
// equal-score outputs are reproducible across runs.
fn candidate_cmp_desc(a: &Candidate, b: &Candidate) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.prior.cmp(&b.prior))
}

fn picked_cmp_desc(a: &Picked, b: &Picked) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.label.cmp(&b.label))
}

/// Runs greedy per-class hard NMS and returns the global top-k survivors.
///
/// `probs` is a flat row-major `[num_priors][num_classes]` probability
/// matrix aligned with `boxes`; class 0 is background and is always
/// skipped. Survivors are ordered by descending score. Empty inputs yield
/// an empty result; inconsistent lengths are a `ShapeMismatch`.
pub fn suppress(
    probs: &[f32],
    num_classes: usize,
    boxes: &[CornerBox],
    params: &SuppressParams,
) -> DetectResult<Vec<Picked>> {
    if probs.is_empty() || boxes.is_empty() {
        return Ok(Vec::new());
    }
    if num_classes == 0 || probs.len() != boxes.len() * num_classes {
        return Err(DetectError::ShapeMismatch {
            expected: boxes.len() * num_classes,
            got: probs.len(),
            context: "suppression probabilities",
        });
    }

    let mut picked = Vec::new();
    let mut candidates: Vec<Candidate> = Vec::new();
    for class in 1..num_classes {
        candidates.clear();
        for (prior, row) in probs.chunks_exact(num_classes).enumerate() {
            let score = row[class];
            if score > params.prob_threshold {
                candidates.push(Candidate { prior, score });
            }
        }
        if candidates.is_empty() {
            continue;
        }

        candidates.sort_unstable_by(candidate_cmp_desc);
        candidates.truncate(params.candidate_size);

        // Greedy pass: the pool is sorted, so each candidate survives only
        // if it does not overlap a previously kept (higher-scoring) box.
        let mut kept: Vec<Picked> = Vec::new();
        'outer: for cand in candidates.iter() {
            let bbox = boxes[cand.prior];
            for kept_box in kept.iter() {
                if iou(bbox, kept_box.bbox) > params.iou_threshold {
                    continue 'outer;
                }
            }
            kept.push(Picked {
                label: class,
                score: cand.score,
                bbox,
            });
        }
        picked.extend(kept);
    }

    picked.sort_by(picked_cmp_desc);
    picked.truncate(params.top_k);
    Ok(picked)
}
