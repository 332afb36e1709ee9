//! Score normalization: raw per-class logits to probabilities.
//!
//! Rows (one per prior) are normalized independently, so the row-parallel
//! variant shares no mutable state between threads.

use crate::util::{DetectError, DetectResult};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Applies a numerically stable softmax to each row of a flat row-major
/// matrix with `num_classes` columns.
///
/// The per-row maximum is subtracted before exponentiating, so large logits
/// cannot overflow; each output row sums to 1 within floating-point
/// tolerance. An empty input yields an empty output; a length not divisible
/// by `num_classes` is a `ShapeMismatch`.
pub fn softmax_rows(logits: &[f32], num_classes: usize) -> DetectResult<Vec<f32>> {
    let mut probs = validate(logits, num_classes)?;
    probs.chunks_mut(num_classes).for_each(softmax_row);
    Ok(probs)
}

/// Row-parallel equivalent of [`softmax_rows`].
#[cfg(feature = "rayon")]
pub fn softmax_rows_par(logits: &[f32], num_classes: usize) -> DetectResult<Vec<f32>> {
    let mut probs = validate(logits, num_classes)?;
    probs.par_chunks_mut(num_classes).for_each(softmax_row);
    Ok(probs)
}

fn validate(logits: &[f32], num_classes: usize) -> DetectResult<Vec<f32>> {
    if logits.is_empty() {
        return Ok(Vec::new());
    }
    if num_classes == 0 || logits.len() % num_classes != 0 {
        let full_rows = logits.len() / num_classes.max(1);
        return Err(DetectError::ShapeMismatch {
            expected: full_rows * num_classes,
            got: logits.len(),
            context: "class scores",
        });
    }
    Ok(logits.to_vec())
}

fn softmax_row(row: &mut [f32]) {
    let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let mut sum = 0.0f32;
    for v in row.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    // Subtracting the max guarantees one exp(0) term, so sum >= 1.
    let inv = 1.0 / sum;
    for v in row.iter_mut() {
        *v *= inv;
    }
}
