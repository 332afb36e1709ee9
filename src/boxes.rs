//! Box representations and overlap measures.
//!
//! Priors and decoded locations are center-form; suppression and the final
//! output work on corner-form boxes. Coordinates are normalized to the
//! detector input size and are not clamped to [0, 1]: boxes may legitimately
//! extend past the image bounds before filtering.

/// Box in center form: center coordinates plus width and height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CenterBox {
    /// X coordinate of the box center.
    pub cx: f32,
    /// Y coordinate of the box center.
    pub cy: f32,
    /// Box width.
    pub w: f32,
    /// Box height.
    pub h: f32,
}

/// Box in corner form: min/max coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CornerBox {
    /// Left edge.
    pub xmin: f32,
    /// Top edge.
    pub ymin: f32,
    /// Right edge.
    pub xmax: f32,
    /// Bottom edge.
    pub ymax: f32,
}

impl CenterBox {
    /// Converts to corner form.
    pub fn to_corner(self) -> CornerBox {
        CornerBox {
            xmin: self.cx - self.w / 2.0,
            ymin: self.cy - self.h / 2.0,
            xmax: self.cx + self.w / 2.0,
            ymax: self.cy + self.h / 2.0,
        }
    }
}

impl CornerBox {
    /// Returns the box area; degenerate boxes (non-positive extent) have
    /// zero area.
    pub fn area(self) -> f32 {
        (self.xmax - self.xmin).max(0.0) * (self.ymax - self.ymin).max(0.0)
    }
}

/// Converts a sequence of center-form boxes to corner form.
pub fn center_form_to_corner_form(boxes: &[CenterBox]) -> Vec<CornerBox> {
    boxes.iter().map(|b| b.to_corner()).collect()
}

/// Intersection over union of two corner-form boxes.
///
/// Degenerate boxes contribute zero intersection; when the union is not
/// positive (both boxes degenerate) the IoU is defined as 0.
pub fn iou(a: CornerBox, b: CornerBox) -> f32 {
    let iw = (a.xmax.min(b.xmax) - a.xmin.max(b.xmin)).max(0.0);
    let ih = (a.ymax.min(b.ymax) - a.ymin.max(b.ymin)).max(0.0);
    let intersection = iw * ih;
    let union = a.area() + b.area() - intersection;
    if union <= 0.0 {
        return 0.0;
    }
    intersection / union
}
