//! Chrome DevTools Protocol rendering backend
//!
//! Each surface is a fresh tab navigated to a `data:` URL of the composed
//! document, so the markup never touches another page. Geometry and computed
//! style are read back by a serializer script evaluated in the tab.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine as Base64Engine;
use headless_chrome::browser::tab::Tab;
use headless_chrome::{Browser, LaunchOptions};
use log::{debug, warn};

use crate::acquire::{Renderer, Surface};
use crate::snapshot::LayoutSnapshot;
use crate::{AnalyzerConfig, Error, Result, Viewport};

/// Serializes `document.body` into the JSON layout of [`LayoutSnapshot`].
const SNAPSHOT_SCRIPT: &str = r#"
(function () {
    function walk(el) {
        var r = el.getBoundingClientRect();
        var cs = window.getComputedStyle(el);
        var children = [];
        el.childNodes.forEach(function (c) {
            if (c.nodeType === Node.ELEMENT_NODE) {
                children.push(walk(c));
            } else if (c.nodeType === Node.TEXT_NODE) {
                children.push({ kind: "text", text: c.textContent || "" });
            }
        });
        var cls = typeof el.className === "string" ? el.className : (el.getAttribute("class") || "");
        return {
            kind: "element",
            tag: el.tagName.toLowerCase(),
            class_name: cls,
            rect: { x: r.left, y: r.top, width: r.width, height: r.height },
            style: { border_radius: parseFloat(cs.borderRadius) || 0 },
            children: children
        };
    }
    if (!document.body) {
        return null;
    }
    return JSON.stringify({ body: walk(document.body) });
})()
"#;

/// Renderer that drives a headless Chrome instance (uses the `headless_chrome` crate)
pub struct CdpRenderer {
    browser: Browser,
}

impl CdpRenderer {
    /// Launch headless Chrome with a window of `viewport` size.
    pub fn new(viewport: Viewport) -> Result<Self> {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .window_size(Some((viewport.width, viewport.height)))
            .build()
            .map_err(|e| Error::Acquisition(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| Error::Acquisition(format!("Failed to launch browser: {}", e)))?;

        Ok(Self { browser })
    }
}

pub struct CdpSurface {
    tab: Option<Arc<Tab>>,
}

impl CdpSurface {
    fn tab(&self) -> Result<&Arc<Tab>> {
        self.tab
            .as_ref()
            .ok_or_else(|| Error::Acquisition("surface document is no longer reachable".into()))
    }
}

impl Surface for CdpSurface {
    fn wait_for_load(&mut self, timeout: Duration) -> Result<bool> {
        let tab = self.tab()?;
        tab.set_default_timeout(timeout);
        match tab.wait_until_navigated() {
            Ok(_) => Ok(true),
            Err(e) => {
                debug!("cdp: navigation wait ended early: {}", e);
                Ok(false)
            }
        }
    }

    fn snapshot(&mut self) -> Result<LayoutSnapshot> {
        let tab = self.tab()?;
        let result = tab
            .evaluate(SNAPSHOT_SCRIPT, false)
            .map_err(|e| Error::Traversal(format!("Snapshot script failed: {}", e)))?;

        let value = result
            .value
            .filter(|v| !v.is_null())
            .ok_or_else(|| Error::Acquisition("Cannot access surface document".into()))?;
        let json = value
            .as_str()
            .ok_or_else(|| Error::Traversal("Snapshot script returned a non-string value".into()))?;
        LayoutSnapshot::from_json(json)
    }

    fn release(&mut self) {
        if let Some(tab) = self.tab.take() {
            if let Err(e) = tab.close(false) {
                warn!("cdp: failed to close tab: {}", e);
            }
        }
    }
}

impl Renderer for CdpRenderer {
    fn name(&self) -> &'static str {
        "cdp"
    }

    fn open_surface<'a>(&'a self, document: &str, _config: &AnalyzerConfig) -> Result<Box<dyn Surface + 'a>> {
        let tab = self
            .browser
            .new_tab()
            .map_err(|e| Error::Acquisition(format!("Failed to create tab: {}", e)))?;

        let url = format!(
            "data:text/html;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(document)
        );
        let navigated = tab.navigate_to(&url).map(|_| ());
        // A failed navigation still owns a tab that must be closed.
        let mut surface = CdpSurface { tab: Some(tab) };
        if let Err(e) = navigated {
            surface.release();
            return Err(Error::Acquisition(format!("Navigation failed: {}", e)));
        }
        Ok(Box::new(surface))
    }
}
