//! Built-in pure-Rust rendering backend.
//!
//! Parses the composed document with `scraper` and runs the approximate
//! layout in [`layout`]. No scripts run and nothing is fetched, so the load
//! signal fires as soon as the surface exists.

pub mod layout;
pub mod style;

use std::time::Duration;

use scraper::Html;

use crate::acquire::{Renderer, Surface};
use crate::snapshot::LayoutSnapshot;
use crate::{AnalyzerConfig, Error, Result};

pub use layout::LayoutEngine;

/// Renderer backed by [`LayoutEngine`].
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinRenderer;

impl BuiltinRenderer {
    pub fn new() -> Self {
        BuiltinRenderer
    }
}

pub struct BuiltinSurface {
    document: Option<Html>,
    engine: LayoutEngine,
}

impl Surface for BuiltinSurface {
    fn wait_for_load(&mut self, _timeout: Duration) -> Result<bool> {
        Ok(self.document.is_some())
    }

    fn snapshot(&mut self) -> Result<LayoutSnapshot> {
        let document = self
            .document
            .as_ref()
            .ok_or_else(|| Error::Acquisition("surface document is no longer reachable".into()))?;
        self.engine.layout_document(document)
    }

    fn release(&mut self) {
        self.document = None;
    }
}

impl Renderer for BuiltinRenderer {
    fn name(&self) -> &'static str {
        "builtin"
    }

    fn open_surface<'a>(&'a self, document: &str, config: &AnalyzerConfig) -> Result<Box<dyn Surface + 'a>> {
        let engine = LayoutEngine::new(config.viewport, config.body_padding_px as f64, config.max_depth);
        Ok(Box::new(BuiltinSurface { document: Some(Html::parse_document(document)), engine }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_surface_cannot_snapshot() {
        let r = BuiltinRenderer::new();
        let cfg = AnalyzerConfig::default();
        let mut s = r.open_surface("<p>x</p>", &cfg).unwrap();
        assert!(s.wait_for_load(Duration::from_millis(1)).unwrap());
        assert!(s.snapshot().is_ok());
        s.release();
        assert!(matches!(s.snapshot(), Err(Error::Acquisition(_))));
    }

    #[test]
    fn composed_document_head_is_not_laid_out() {
        let r = BuiltinRenderer::new();
        let cfg = AnalyzerConfig::default();
        let doc = crate::acquire::compose_document("<p>Hello</p>", &cfg);
        let mut s = r.open_surface(&doc, &cfg).unwrap();
        let snap = s.snapshot().unwrap();
        let tags: Vec<&str> = snap.body.element_children().map(|e| e.tag.as_str()).collect();
        assert_eq!(tags, vec!["p"]);
        let p = snap.body.element_children().next().unwrap();
        assert_eq!(p.rect.x, 16.0);
        assert_eq!(p.rect.y, 16.0);
    }
}
