//! Skeleton generator
//!
//! Turns an arbitrary fragment of HTML into a loading skeleton: a layout of
//! blank placeholder boxes that mirrors where the real content sits.
//!
//! # Pipeline
//!
//! 1. **Acquisition** ([`acquire`]): the markup is rendered on an isolated,
//!    offscreen surface by a [`Renderer`] backend and read back as an
//!    immutable [`LayoutSnapshot`].
//! 2. **Classification** ([`classify`]): visible content leaves are picked out
//!    and given a shape category.
//! 3. **Quantization** ([`quantize`]): pixel sizes map onto a fixed set of
//!    size classes.
//! 4. **Rows** ([`rows`]): leaves are grouped into visual rows and ordered.
//! 5. **Emission** ([`emit`]): the plan is printed as component source or
//!    drawn as a box preview.
//!
//! # Example
//!
//! ```no_run
//! use skelegen::{AnalyzerConfig, generate_skeleton_code};
//!
//! let config = AnalyzerConfig::default();
//! let result = skelegen::analyze_html(r#"<button class="w-48 h-9">Save</button>"#, &config);
//! assert!(result.error.is_none());
//! println!("{}", generate_skeleton_code(&result.elements, &config));
//! ```

use std::panic::{self, AssertUnwindSafe};

use log::{info, warn};
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

pub mod acquire;
pub mod classify;
pub mod emit;
pub mod quantize;
pub mod rows;
pub mod snapshot;

// Pure-Rust approximate layout backend
#[cfg(feature = "builtin")]
pub mod rendering;

// Headless Chrome backend
#[cfg(feature = "cdp")]
pub mod cdp;

// Serialized async front end over a worker thread
pub mod async_api;

pub use acquire::{JsonSnapshotRenderer, Renderer, Surface};
pub use rows::SkeletonPlan;
pub use snapshot::LayoutSnapshot;

/// Configuration for an analysis run
///
/// The defaults match the values the generated skeletons have always been
/// tuned against; change them only when the rendering environment differs.
///
/// # Examples
///
/// ```
/// let cfg = skelegen::AnalyzerConfig { row_tolerance_px: 12.0, ..Default::default() };
/// assert_eq!(cfg.settle_delay_ms, 300);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    /// Maximum vertical distance (exclusive) between a row's anchor and a member
    pub row_tolerance_px: f64,
    /// Delay after the load signal so asynchronously applied styles take effect
    pub settle_delay_ms: u64,
    /// Upper bound on waiting for the surface's load signal
    pub load_timeout_ms: u64,
    /// Elements must be strictly wider and taller than this to be considered
    pub min_visible_px: f64,
    /// Size of the offscreen surface
    pub viewport: Viewport,
    /// Body padding of the wrapper document
    pub body_padding_px: u32,
    /// Styling runtime injected into the wrapper document's head
    pub styling_runtime_url: Option<String>,
    /// Deepest element nesting accepted from untrusted markup
    pub max_depth: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            row_tolerance_px: 10.0,
            settle_delay_ms: 300,
            load_timeout_ms: 500,
            min_visible_px: 5.0,
            viewport: Viewport::default(),
            body_padding_px: 16,
            styling_runtime_url: Some("https://cdn.tailwindcss.com".to_string()),
            max_depth: 512,
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.row_tolerance_px.is_finite() || self.row_tolerance_px < 0.0 {
            return Err(Error::Config(format!("row tolerance must be a non-negative number, got {}", self.row_tolerance_px)));
        }
        if !self.min_visible_px.is_finite() || self.min_visible_px < 0.0 {
            return Err(Error::Config(format!("minimum visible size must be a non-negative number, got {}", self.min_visible_px)));
        }
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(Error::Config("viewport must not be empty".into()));
        }
        if self.max_depth == 0 {
            return Err(Error::Config("max depth must be at least 1".into()));
        }
        Ok(())
    }
}

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { width: 800, height: 600 }
    }
}

/// One detected content leaf.
///
/// `kind` is the shape category (`"circle"`, `"avatar"`) or the lowercase tag
/// name; it is fixed at detection time. Coordinates are surface pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementInfo {
    #[serde(rename = "type")]
    pub kind: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Source `class` attribute, for diagnostics only
    #[serde(default)]
    pub class_name: String,
}

/// Outcome of one analysis: either leaves (possibly none) or an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub elements: Vec<ElementInfo>,
    /// The input markup, verbatim
    pub html: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    pub fn success(elements: Vec<ElementInfo>, html: &str) -> Self {
        Self { elements, html: html.to_string(), error: None }
    }

    pub fn failure(html: &str, error: impl Into<String>) -> Self {
        Self { elements: Vec::new(), html: html.to_string(), error: Some(error.into()) }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Available rendering backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// Pure-Rust approximate layout
    #[default]
    Builtin,
    /// Headless Chrome over the DevTools protocol
    Cdp,
}

impl std::str::FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "builtin" => Ok(Backend::Builtin),
            "cdp" | "chrome" => Ok(Backend::Cdp),
            other => Err(Error::Config(format!("unknown backend '{}'", other))),
        }
    }
}

/// Create a renderer for `backend`, if it was compiled in.
pub fn new_renderer(backend: Backend, config: &AnalyzerConfig) -> Result<Box<dyn Renderer + Send>> {
    #[cfg(not(feature = "cdp"))]
    let _ = config;
    match backend {
        #[cfg(feature = "builtin")]
        Backend::Builtin => Ok(Box::new(rendering::BuiltinRenderer::new())),
        #[cfg(feature = "cdp")]
        Backend::Cdp => Ok(Box::new(cdp::CdpRenderer::new(config.viewport)?)),
        #[allow(unreachable_patterns)]
        other => Err(Error::Config(format!("backend {:?} is not compiled in", other))),
    }
}

// Recursive walks over untrusted trees switch to a fresh heap-allocated
// stack segment when less than the red zone is left.
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_SEGMENT: usize = 2 * 1024 * 1024;

pub(crate) fn with_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(STACK_RED_ZONE, STACK_SEGMENT, f)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown error occurred".to_string()
    }
}

/// Acquire and classify `markup` with `renderer`.
///
/// Never fails: every error, and any panic raised by the backend, is folded
/// into the returned [`AnalysisResult`].
pub fn analyze_with(renderer: &dyn Renderer, markup: &str, config: &AnalyzerConfig) -> AnalysisResult {
    let run = || -> Result<Vec<ElementInfo>> {
        config.validate()?;
        let snapshot = acquire::acquire(renderer, markup, config)?;
        classify::classify(&snapshot, config)
    };

    match panic::catch_unwind(AssertUnwindSafe(run)) {
        Ok(Ok(elements)) => {
            info!("{}: detected {} elements", renderer.name(), elements.len());
            AnalysisResult::success(elements, markup)
        }
        Ok(Err(e)) => {
            warn!("{}: analysis failed: {}", renderer.name(), e);
            AnalysisResult::failure(markup, e.to_string())
        }
        Err(payload) => {
            let msg = panic_message(payload.as_ref());
            warn!("{}: analysis panicked: {}", renderer.name(), msg);
            AnalysisResult::failure(markup, msg)
        }
    }
}

/// Analyze `markup` with the default backend.
pub fn analyze_html(markup: &str, config: &AnalyzerConfig) -> AnalysisResult {
    match new_renderer(Backend::default(), config) {
        Ok(renderer) => analyze_with(renderer.as_ref(), markup, config),
        Err(e) => AnalysisResult::failure(markup, e.to_string()),
    }
}

/// Build the row plan for `elements` using the configured tolerance.
pub fn plan(elements: &[ElementInfo], config: &AnalyzerConfig) -> SkeletonPlan {
    SkeletonPlan::from_elements(elements, config.row_tolerance_px)
}

/// Component source for `elements`.
pub fn generate_skeleton_code(elements: &[ElementInfo], config: &AnalyzerConfig) -> String {
    emit::emit_code(&plan(elements, config))
}

/// One-line detection summary: count plus distinct types in first-seen order.
pub fn summary(elements: &[ElementInfo]) -> String {
    let mut kinds: Vec<&str> = Vec::new();
    for el in elements {
        if !kinds.contains(&el.kind.as_str()) {
            kinds.push(&el.kind);
        }
    }
    format!(
        "Detected {} element{} \u{2022} Types: {}",
        elements.len(),
        if elements.len() == 1 { "" } else { "s" },
        kinds.join(", ")
    )
}
