//! Row reconstruction and the shared skeleton plan.
//!
//! Leaves are grouped into rows by vertical proximity to each row's anchor
//! (its first-inserted element), then rows are ordered top to bottom and
//! elements left to right. [`SkeletonPlan`] is the quantized result that
//! every output back end renders from.

use std::cmp::Ordering;

use log::debug;

use crate::classify::{SHAPE_AVATAR, SHAPE_CIRCLE};
use crate::quantize::{height_class, width_class, SizeClass};
use crate::ElementInfo;

/// Leaves believed to share one visual line. `elements[0]` is the anchor
/// until [`sort_rows`] reorders members by `x`; the anchor `y` is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct Row<'a> {
    pub anchor_y: f64,
    pub anchor_x: f64,
    pub elements: Vec<&'a ElementInfo>,
}

/// Group leaves (document order) into rows. Each element joins the first
/// existing row whose anchor lies strictly within `tolerance` pixels.
pub fn group_rows(elements: &[ElementInfo], tolerance: f64) -> Vec<Row<'_>> {
    let mut rows: Vec<Row<'_>> = Vec::new();
    for el in elements {
        match rows.iter_mut().find(|r| (r.anchor_y - el.y).abs() < tolerance) {
            Some(row) => row.elements.push(el),
            None => rows.push(Row { anchor_y: el.y, anchor_x: el.x, elements: vec![el] }),
        }
    }
    rows
}

fn by_position(a: &ElementInfo, b: &ElementInfo) -> Ordering {
    a.x.total_cmp(&b.x)
        .then(a.y.total_cmp(&b.y))
        .then(a.width.total_cmp(&b.width))
        .then(a.height.total_cmp(&b.height))
        .then_with(|| a.kind.cmp(&b.kind))
}

/// Rows by ascending anchor `y`, members by ascending `x`. Ties fall back to
/// the remaining geometry so the order never depends on input order.
pub fn sort_rows(rows: &mut [Row<'_>]) {
    rows.sort_by(|a, b| a.anchor_y.total_cmp(&b.anchor_y).then(a.anchor_x.total_cmp(&b.anchor_x)));
    for row in rows.iter_mut() {
        row.elements.sort_by(|a, b| by_position(a, b));
    }
}

/// Group then sort.
pub fn build_rows(elements: &[ElementInfo], tolerance: f64) -> Vec<Row<'_>> {
    let mut rows = group_rows(elements, tolerance);
    sort_rows(&mut rows);
    rows
}

/// Extra visual trait of a placeholder box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeModifier {
    RoundedFull,
    RoundedMd,
    None,
}

impl ShapeModifier {
    pub fn for_kind(kind: &str) -> Self {
        match kind {
            SHAPE_CIRCLE | SHAPE_AVATAR => ShapeModifier::RoundedFull,
            "button" => ShapeModifier::RoundedMd,
            _ => ShapeModifier::None,
        }
    }

    pub fn class(&self) -> Option<&'static str> {
        match self {
            ShapeModifier::RoundedFull => Some("rounded-full"),
            ShapeModifier::RoundedMd => Some("rounded-md"),
            ShapeModifier::None => None,
        }
    }
}

/// One placeholder box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SkeletonBox {
    pub shape: ShapeModifier,
    pub height: SizeClass,
    pub width: SizeClass,
}

impl SkeletonBox {
    pub fn from_element(el: &ElementInfo) -> Self {
        Self {
            shape: ShapeModifier::for_kind(&el.kind),
            height: height_class(el.height),
            width: width_class(el.width),
        }
    }

    /// Utility classes in output order: shape, height, width.
    pub fn class_list(&self) -> String {
        match self.shape.class() {
            Some(shape) => format!("{} {} {}", shape, self.height.label, self.width.label),
            None => format!("{} {}", self.height.label, self.width.label),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRow {
    pub boxes: Vec<SkeletonBox>,
}

impl PlanRow {
    /// Rows of more than one box are wrapped in a horizontal flow container
    pub fn is_flow(&self) -> bool {
        self.boxes.len() > 1
    }
}

/// Ordered, quantized row structure shared by all output back ends.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SkeletonPlan {
    pub rows: Vec<PlanRow>,
}

impl SkeletonPlan {
    pub fn from_elements(elements: &[ElementInfo], tolerance: f64) -> Self {
        let rows: Vec<PlanRow> = build_rows(elements, tolerance)
            .into_iter()
            .map(|row| PlanRow { boxes: row.elements.into_iter().map(SkeletonBox::from_element).collect() })
            .collect();
        debug!("planned {} rows from {} leaves", rows.len(), elements.len());
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn boxes(&self) -> impl Iterator<Item = &SkeletonBox> {
        self.rows.iter().flat_map(|r| r.boxes.iter())
    }
}
