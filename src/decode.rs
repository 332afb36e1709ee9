//! Regression decoding: anchor-relative offsets to absolute boxes.

use crate::boxes::CenterBox;
use crate::util::{DetectError, DetectResult};

/// Variance constants applied when reversing the training-time encoding.
#[derive(Clone, Copy, Debug)]
pub struct Variances {
    /// Scale on the center offsets.
    pub center: f32,
    /// Scale on the log-size offsets.
    pub size: f32,
}

impl Default for Variances {
    fn default() -> Self {
        Self {
            center: 0.1,
            size: 0.2,
        }
    }
}

/// Largest magnitude allowed for the size exponent. Pathological regression
/// values would otherwise overflow `exp` to infinity.
const SIZE_EXP_LIMIT: f32 = 10.0;

/// Decodes per-prior regression offsets into absolute center-form boxes.
///
/// The flat tensor holds `[dx, dy, dw, dh]` per prior, aligned
/// index-for-index with `priors`. Fails with `ShapeMismatch` when the
/// lengths disagree; a zero-offset regression reproduces the priors exactly.
pub fn decode_locations(
    regressions: &[f32],
    priors: &[CenterBox],
    variances: Variances,
) -> DetectResult<Vec<CenterBox>> {
    if regressions.len() != priors.len() * 4 {
        return Err(DetectError::ShapeMismatch {
            expected: priors.len() * 4,
            got: regressions.len(),
            context: "box regressions",
        });
    }

    let decoded = priors
        .iter()
        .zip(regressions.chunks_exact(4))
        .map(|(prior, reg)| {
            let w_exp = (reg[2] * variances.size).clamp(-SIZE_EXP_LIMIT, SIZE_EXP_LIMIT);
            let h_exp = (reg[3] * variances.size).clamp(-SIZE_EXP_LIMIT, SIZE_EXP_LIMIT);
            CenterBox {
                cx: reg[0] * variances.center * prior.w + prior.cx,
                cy: reg[1] * variances.center * prior.h + prior.cy,
                w: w_exp.exp() * prior.w,
                h: h_exp.exp() * prior.h,
            }
        })
        .collect();
    Ok(decoded)
}
