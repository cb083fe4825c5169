//! Live preview: draws the plan as positioned boxes instead of source text.
//!
//! Box sizes are the nominal sizes of their classes; rows stack with the same
//! gap and padding the emitted component uses.

use crate::quantize::nominal_px;
use crate::rows::{ShapeModifier, SkeletonBox, SkeletonPlan};

pub const PADDING: f64 = 16.0;
pub const GAP: f64 = 16.0;
const FILL: &str = "#e5e7eb";

/// A placed placeholder box.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub skeleton: SkeletonBox,
}

impl PreviewBox {
    pub fn corner_radius(&self) -> f64 {
        match self.skeleton.shape {
            ShapeModifier::RoundedFull => self.width.min(self.height) / 2.0,
            ShapeModifier::RoundedMd => 6.0,
            ShapeModifier::None => 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub width: f64,
    pub height: f64,
    /// Boxes row by row, left to right
    pub boxes: Vec<PreviewBox>,
}

/// Lay out `plan` inside a canvas `width` pixels wide.
pub fn render_preview(plan: &SkeletonPlan, width: f64) -> Preview {
    let content = (width - 2.0 * PADDING).max(0.0);
    let right = PADDING + content;
    let mut boxes = Vec::new();
    let mut y = PADDING;

    for (i, row) in plan.rows.iter().enumerate() {
        if i > 0 {
            y += GAP;
        }
        let mut x = PADDING;
        let mut placed: Vec<PreviewBox> = Vec::with_capacity(row.boxes.len());
        for (j, b) in row.boxes.iter().enumerate() {
            if j > 0 {
                x += GAP;
            }
            let remaining = (right - x).max(0.0);
            let w = nominal_px(b.width.label, remaining).min(remaining);
            let h = nominal_px(b.height.label, 0.0);
            placed.push(PreviewBox { x, y, width: w, height: h, skeleton: *b });
            x += w;
        }
        let row_h = placed.iter().map(|b| b.height).fold(0.0, f64::max);
        if row.is_flow() {
            for b in placed.iter_mut() {
                b.y += (row_h - b.height) / 2.0;
            }
        }
        boxes.extend(placed);
        y += row_h;
    }

    Preview { width, height: y + PADDING, boxes }
}

impl Preview {
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Standalone SVG document of the preview.
    pub fn to_svg(&self) -> String {
        let height = if self.is_empty() { 2.0 * PADDING + 24.0 } else { self.height };
        let mut out = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">\n  <rect width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>\n",
            w = self.width,
            h = height
        );
        if self.is_empty() {
            out.push_str(&format!(
                "  <text x=\"{}\" y=\"{}\" fill=\"#6b7280\" font-family=\"sans-serif\" font-size=\"14\">No elements detected</text>\n",
                PADDING,
                PADDING + 16.0
            ));
        }
        for b in &self.boxes {
            out.push_str(&format!(
                "  <rect class=\"{}\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{}\" fill=\"{}\"/>\n",
                b.skeleton.class_list(),
                b.x,
                b.y,
                b.width,
                b.height,
                b.corner_radius(),
                FILL
            ));
        }
        out.push_str("</svg>\n");
        out
    }
}
