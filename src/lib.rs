//! carddet is the post-processing stage of an SSD-style single-shot
//! detector: it turns raw anchor-relative regression and class-score
//! tensors into a filtered, deduplicated list of labeled detections.
//!
//! The crate is pure CPU-bound computation over immutable inputs, with
//! optional row-parallel score normalization via the `rayon` feature and
//! optional stage instrumentation via the `tracing` feature.

pub mod boxes;
pub mod decode;
pub mod pipeline;
pub mod prior;
pub mod score;
pub mod suppress;
mod trace;
pub mod util;

pub use boxes::{center_form_to_corner_form, iou, CenterBox, CornerBox};
pub use decode::{decode_locations, Variances};
pub use pipeline::{Detection, Detector, DetectorConfig, ImageSize};
pub use prior::{generate_priors, FeatureMapSpec, PriorBank, PriorConfig};
pub use score::softmax_rows;
#[cfg(feature = "rayon")]
pub use score::softmax_rows_par;
pub use suppress::{suppress, Picked, SuppressParams};
pub use util::{DetectError, DetectResult};
