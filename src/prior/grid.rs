//! Prior (anchor box) generation over the detector's feature-map grids.
//!
//! Generation order is significant: regression and score tensors are aligned
//! index-for-index with this sequence. Cells are traversed row-major, and
//! within a cell boxes are emitted smallest-square first, then the
//! interpolated square, then one pair per aspect ratio.

use crate::boxes::CenterBox;

/// One feature map of the detector head.
#[derive(Clone, Debug)]
pub struct FeatureMapSpec {
    /// Cells per side of the square feature map.
    pub size: usize,
    /// Stride of the map relative to the input image, in pixels.
    pub shrinkage: u32,
    /// Smallest box edge assigned to this map, in pixels.
    pub box_min: f32,
    /// Upper box edge used for the interpolated square, in pixels.
    pub box_max: f32,
    /// Aspect ratios; each ratio contributes a wide and a tall box.
    pub aspect_ratios: Vec<f32>,
}

impl FeatureMapSpec {
    /// Number of priors emitted per cell.
    pub fn priors_per_cell(&self) -> usize {
        2 + 2 * self.aspect_ratios.len()
    }
}

/// Fixed prior-grid configuration of a detector.
#[derive(Clone, Debug)]
pub struct PriorConfig {
    /// Detector input width in pixels.
    pub image_width: u32,
    /// Detector input height in pixels.
    pub image_height: u32,
    /// Feature maps, coarsest stride last.
    pub feature_maps: Vec<FeatureMapSpec>,
}

impl Default for PriorConfig {
    /// Card-detector grid: 300x300 input, two feature maps, 2766 priors.
    fn default() -> Self {
        Self {
            image_width: 300,
            image_height: 300,
            feature_maps: vec![
                FeatureMapSpec {
                    size: 19,
                    shrinkage: 16,
                    box_min: 60.0,
                    box_max: 105.0,
                    aspect_ratios: vec![2.0, 3.0],
                },
                FeatureMapSpec {
                    size: 10,
                    shrinkage: 32,
                    box_min: 105.0,
                    box_max: 150.0,
                    aspect_ratios: vec![2.0, 3.0],
                },
            ],
        }
    }
}

impl PriorConfig {
    /// Total number of priors this configuration generates.
    pub fn num_priors(&self) -> usize {
        self.feature_maps
            .iter()
            .map(|map| map.size * map.size * map.priors_per_cell())
            .sum()
    }
}

/// Generates the ordered prior sequence for a configuration.
///
/// Deterministic and pure; callers should cache the result (see
/// [`crate::PriorBank`]) rather than regenerate it per inference.
pub fn generate_priors(cfg: &PriorConfig) -> Vec<CenterBox> {
    let img_w = cfg.image_width as f32;
    let img_h = cfg.image_height as f32;

    let mut priors = Vec::with_capacity(cfg.num_priors());
    for map in &cfg.feature_maps {
        let x_scale = img_w / map.shrinkage as f32;
        let y_scale = img_h / map.shrinkage as f32;
        for j in 0..map.size {
            for i in 0..map.size {
                let cx = (i as f32 + 0.5) / x_scale;
                let cy = (j as f32 + 0.5) / y_scale;

                let small = square(cx, cy, map.box_min, img_w, img_h);
                priors.push(small);
                priors.push(square(
                    cx,
                    cy,
                    (map.box_min * map.box_max).sqrt(),
                    img_w,
                    img_h,
                ));
                for &ratio in &map.aspect_ratios {
                    let r = ratio.sqrt();
                    priors.push(CenterBox {
                        cx,
                        cy,
                        w: small.w * r,
                        h: small.h / r,
                    });
                    priors.push(CenterBox {
                        cx,
                        cy,
                        w: small.w / r,
                        h: small.h * r,
                    });
                }
            }
        }
    }
    priors
}

fn square(cx: f32, cy: f32, edge: f32, img_w: f32, img_h: f32) -> CenterBox {
    CenterBox {
        cx,
        cy,
        w: edge / img_w,
        h: edge / img_h,
    }
}
