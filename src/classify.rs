//! Leaf classifier: picks the placeholder-worthy elements out of a snapshot.

use log::debug;

use crate::snapshot::{LayoutSnapshot, SnapshotElement};
use crate::{AnalyzerConfig, ElementInfo, Error, Result};

/// Containers that are never visited, together with their descendants.
pub const SKIPPED_TAGS: &[&str] = &["script", "style", "head"];

/// Tags that are leaves regardless of their content.
pub const LEAF_TAGS: &[&str] = &["img", "button", "input", "textarea", "a"];

pub const SHAPE_CIRCLE: &str = "circle";
pub const SHAPE_AVATAR: &str = "avatar";

/// Whether `el` represents atomic visible content.
///
/// Only *direct* text children count: an element whose text sits in nested
/// elements is a container and its children are classified instead.
pub fn is_leaf(el: &SnapshotElement) -> bool {
    LEAF_TAGS.contains(&el.tag.as_str()) || (el.element_children().next().is_none() && el.has_direct_text())
}

/// Shape category of a leaf: fully rounded boxes are circles, images are
/// avatars, everything else keeps its tag name.
pub fn shape_of(el: &SnapshotElement) -> String {
    let rect = &el.rect;
    let radius = el.style.border_radius;
    if radius > 0.0 && radius >= rect.width.min(rect.height) / 2.0 {
        SHAPE_CIRCLE.to_string()
    } else if el.tag == "img" {
        SHAPE_AVATAR.to_string()
    } else {
        el.tag.clone()
    }
}

/// Collect leaves of the body subtree in document order.
pub fn classify(snapshot: &LayoutSnapshot, config: &AnalyzerConfig) -> Result<Vec<ElementInfo>> {
    let mut out = Vec::new();
    for child in snapshot.body.element_children() {
        visit(child, config, 1, &mut out)?;
    }
    debug!("classified {} leaves", out.len());
    Ok(out)
}

fn visit(el: &SnapshotElement, config: &AnalyzerConfig, depth: usize, out: &mut Vec<ElementInfo>) -> Result<()> {
    crate::with_stack(|| visit_element(el, config, depth, out))
}

fn visit_element(el: &SnapshotElement, config: &AnalyzerConfig, depth: usize, out: &mut Vec<ElementInfo>) -> Result<()> {
    if SKIPPED_TAGS.contains(&el.tag.as_str()) {
        return Ok(());
    }
    if depth > config.max_depth {
        return Err(Error::Traversal(format!("element tree deeper than {} levels", config.max_depth)));
    }
    if !el.rect.is_finite() {
        return Err(Error::Traversal(format!("<{}> has non-finite geometry", el.tag)));
    }

    let rect = &el.rect;
    let visible = rect.width > config.min_visible_px && rect.height > config.min_visible_px;
    if visible && is_leaf(el) {
        out.push(ElementInfo {
            kind: shape_of(el),
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            class_name: el.class_name.clone(),
        });
    }

    // Invisible wrappers may still hold visible content.
    for child in el.element_children() {
        visit(child, config, depth + 1, out)?;
    }
    Ok(())
}
