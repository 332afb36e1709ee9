//! Cached prior grids for repeated detection calls.
//!
//! Generating the prior sequence is deterministic but not free, so a
//! `PriorBank` computes it at most once and serves the cached slice to every
//! subsequent call. The slot is a `OnceLock`, which keeps first use safe
//! under concurrency: one caller computes and publishes, the rest read.

mod grid;

pub use grid::{generate_priors, FeatureMapSpec, PriorConfig};

use crate::boxes::CenterBox;
use crate::util::{DetectError, DetectResult};
use std::sync::OnceLock;

/// Owned, lazily computed prior grid.
pub struct PriorBank {
    cfg: PriorConfig,
    slot: OnceLock<Vec<CenterBox>>,
}

impl PriorBank {
    /// Creates a bank after validating the configuration.
    pub fn new(cfg: PriorConfig) -> DetectResult<Self> {
        if cfg.image_width == 0 || cfg.image_height == 0 {
            return Err(DetectError::InvalidConfig {
                reason: "image dimensions must be positive",
            });
        }
        for map in &cfg.feature_maps {
            if map.shrinkage == 0 {
                return Err(DetectError::InvalidConfig {
                    reason: "shrinkage must be positive",
                });
            }
            if map.box_min <= 0.0 || map.box_max <= 0.0 {
                return Err(DetectError::InvalidConfig {
                    reason: "box sizes must be positive",
                });
            }
            if map.aspect_ratios.iter().any(|&r| r <= 0.0) {
                return Err(DetectError::InvalidConfig {
                    reason: "aspect ratios must be positive",
                });
            }
        }
        Ok(Self {
            cfg,
            slot: OnceLock::new(),
        })
    }

    /// Creates a bank seeded with an explicit prior sequence.
    ///
    /// Intended for detectors whose grid comes from elsewhere, and for
    /// tests that need a handful of hand-written priors.
    pub fn from_priors(priors: Vec<CenterBox>) -> Self {
        let slot = OnceLock::new();
        let _ = slot.set(priors);
        Self {
            cfg: PriorConfig {
                image_width: 0,
                image_height: 0,
                feature_maps: Vec::new(),
            },
            slot,
        }
    }

    /// Returns the prior sequence, computing it on first use.
    pub fn priors(&self) -> &[CenterBox] {
        self.slot.get_or_init(|| generate_priors(&self.cfg))
    }

    /// Eagerly populates the cache.
    ///
    /// The lazy path in [`PriorBank::priors`] keeps a cold bank usable, but
    /// callers that care about first-detection latency should warm up once
    /// at startup.
    pub fn warm_up(&self) {
        let _ = self.priors();
    }

    /// Number of priors in the grid.
    pub fn len(&self) -> usize {
        self.priors().len()
    }

    /// Returns true if the grid is empty.
    pub fn is_empty(&self) -> bool {
        self.priors().is_empty()
    }

    /// The configuration this bank was built from.
    pub fn config(&self) -> &PriorConfig {
        &self.cfg
    }
}
