//! Immutable layout snapshot handed over by a rendering backend.
//!
//! A snapshot is the only thing the classifier reads: element tags, resolved
//! geometry, the handful of computed style values the pipeline needs, and the
//! child list (elements and text nodes) in document order. Backends build one
//! after layout has settled; nothing in it refers back to a live document.

use serde::{Deserialize, Serialize};

use crate::Result;

/// Border box of an element in surface pixels, relative to the viewport origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }
}

/// Computed style values consumed by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ComputedStyle {
    /// Resolved corner radius in pixels (first corner when they differ)
    #[serde(default)]
    pub border_radius: f64,
}

/// A node in the snapshot: either an element or a text run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SnapshotNode {
    Element(SnapshotElement),
    Text { text: String },
}

impl SnapshotNode {
    pub fn text(text: impl Into<String>) -> Self {
        SnapshotNode::Text { text: text.into() }
    }

    pub fn as_element(&self) -> Option<&SnapshotElement> {
        match self {
            SnapshotNode::Element(el) => Some(el),
            SnapshotNode::Text { .. } => None,
        }
    }
}

impl From<SnapshotElement> for SnapshotNode {
    fn from(el: SnapshotElement) -> Self {
        SnapshotNode::Element(el)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotElement {
    /// Lowercase tag name
    pub tag: String,
    /// Verbatim `class` attribute
    #[serde(default)]
    pub class_name: String,
    pub rect: Rect,
    #[serde(default)]
    pub style: ComputedStyle,
    #[serde(default)]
    pub children: Vec<SnapshotNode>,
}

impl SnapshotElement {
    pub fn new(tag: &str, rect: Rect) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            class_name: String::new(),
            rect,
            style: ComputedStyle::default(),
            children: Vec::new(),
        }
    }

    pub fn with_class(mut self, class_name: &str) -> Self {
        self.class_name = class_name.to_string();
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.style.border_radius = radius;
        self
    }

    pub fn with_child(mut self, child: impl Into<SnapshotNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_text(self, text: &str) -> Self {
        self.with_child(SnapshotNode::text(text))
    }

    /// Child elements in document order, text nodes skipped.
    pub fn element_children(&self) -> impl Iterator<Item = &SnapshotElement> {
        self.children.iter().filter_map(SnapshotNode::as_element)
    }

    /// Whether any *direct* text child carries non-whitespace content.
    pub fn has_direct_text(&self) -> bool {
        self.children.iter().any(|c| matches!(c, SnapshotNode::Text { text } if !text.trim().is_empty()))
    }
}

/// A laid-out document: the `<body>` element and everything below it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    pub body: SnapshotElement,
}

impl LayoutSnapshot {
    pub fn new(body: SnapshotElement) -> Self {
        Self { body }
    }

    /// Decode a snapshot of any nesting depth. The classifier's `max_depth`
    /// is the bound that applies, not the JSON parser's recursion limit.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut de = serde_json::Deserializer::from_str(json);
        de.disable_recursion_limit();
        let snapshot = Self::deserialize(serde_stacker::Deserializer::new(&mut de))?;
        de.end()?;
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_text_ignores_whitespace_and_nested_text() {
        let el = SnapshotElement::new("div", Rect::new(0.0, 0.0, 10.0, 10.0))
            .with_text("   \n ")
            .with_child(SnapshotElement::new("span", Rect::default()).with_text("nested"));
        assert!(!el.has_direct_text());

        let el = el.with_text("hi");
        assert!(el.has_direct_text());
    }

    #[test]
    fn snapshot_json_roundtrip_keeps_tree_shape() {
        let body = SnapshotElement::new("BODY", Rect::new(0.0, 0.0, 800.0, 600.0))
            .with_child(SnapshotElement::new("p", Rect::new(16.0, 16.0, 200.0, 24.0)).with_text("Hello"));
        let snap = LayoutSnapshot::new(body);
        let json = snap.to_json().unwrap();
        assert!(json.contains("\"kind\": \"element\""));
        let back = LayoutSnapshot::from_json(&json).unwrap();
        assert_eq!(back, snap);
        assert_eq!(back.body.tag, "body");
    }

    fn nested(depth: usize) -> LayoutSnapshot {
        let mut inner = SnapshotElement::new("p", Rect::new(16.0, 16.0, 200.0, 24.0)).with_text("deep");
        for _ in 0..depth {
            inner = SnapshotElement::new("div", Rect::new(16.0, 16.0, 768.0, 24.0)).with_child(inner);
        }
        LayoutSnapshot::new(SnapshotElement::new("body", Rect::new(0.0, 0.0, 800.0, 600.0)).with_child(inner))
    }

    #[test]
    fn deep_snapshot_survives_json() {
        let snap = nested(200);
        let back = LayoutSnapshot::from_json(&snap.to_json().unwrap()).unwrap();
        assert_eq!(back, snap);
        let found = crate::classify::classify(&back, &crate::AnalyzerConfig::default()).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, "p");
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        let json = nested(1).to_json().unwrap() + " {}";
        assert!(matches!(LayoutSnapshot::from_json(&json), Err(crate::Error::Snapshot(_))));
    }

    #[test]
    fn malformed_json_is_snapshot_error() {
        let err = LayoutSnapshot::from_json("{\"body\": 3}").unwrap_err();
        assert!(matches!(err, crate::Error::Snapshot(_)));
    }

    #[test]
    fn missing_style_defaults_to_zero_radius() {
        let json = r#"{"body":{"tag":"body","rect":{"x":0,"y":0,"width":10,"height":10},"children":[{"kind":"text","text":"x"}]}}"#;
        let snap = LayoutSnapshot::from_json(json).unwrap();
        assert_eq!(snap.body.style.border_radius, 0.0);
        assert!(snap.body.has_direct_text());
    }
}
