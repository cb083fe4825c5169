//! Layout snapshot acquisition.
//!
//! A [`Renderer`] opens an isolated, offscreen [`Surface`] for a composed
//! document. [`acquire`] waits for the surface's ready signal (bounded by a
//! fallback timeout), lets asynchronously applied styling settle, reads back
//! an immutable [`LayoutSnapshot`] and releases the surface on every exit path.

use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::snapshot::LayoutSnapshot;
use crate::{AnalyzerConfig, Error, Result};

/// An offscreen rendering surface holding one laid-out document.
pub trait Surface {
    /// Block until the document's load signal fires or `timeout` elapses.
    /// Returns `false` when the timeout was hit instead.
    fn wait_for_load(&mut self, timeout: Duration) -> Result<bool>;

    /// Read back resolved geometry and computed style of the body subtree.
    fn snapshot(&mut self) -> Result<LayoutSnapshot>;

    /// Tear the surface down. Called exactly once, even after failures.
    fn release(&mut self);
}

/// A rendering backend able to create offscreen surfaces.
pub trait Renderer {
    /// Short backend name used in logs
    fn name(&self) -> &'static str;

    /// Render `document` on a fresh surface sized to `config.viewport`.
    fn open_surface<'a>(&'a self, document: &str, config: &AnalyzerConfig) -> Result<Box<dyn Surface + 'a>>;
}

/// Releases the wrapped surface when dropped.
struct SurfaceGuard<'a> {
    surface: Box<dyn Surface + 'a>,
    backend: &'static str,
}

impl Drop for SurfaceGuard<'_> {
    fn drop(&mut self) {
        self.surface.release();
        debug!("{}: surface released", self.backend);
    }
}

/// Wrap untrusted markup in a full document with the styling runtime and
/// the body reset the pipeline's geometry is measured against.
pub fn compose_document(markup: &str, config: &AnalyzerConfig) -> String {
    let runtime = config
        .styling_runtime_url
        .as_deref()
        .map(|url| format!("<script src=\"{}\"></script>", url.replace('"', "&quot;")))
        .unwrap_or_default();
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n{}\n<style>body {{ margin: 0; padding: {}px; }}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        runtime, config.body_padding_px, markup
    )
}

/// Render `markup` with `renderer` and capture a settled layout snapshot.
pub fn acquire(renderer: &dyn Renderer, markup: &str, config: &AnalyzerConfig) -> Result<LayoutSnapshot> {
    let document = compose_document(markup, config);
    let surface = renderer
        .open_surface(&document, config)
        .map_err(|e| match e {
            Error::Acquisition(_) => e,
            other => Error::Acquisition(other.to_string()),
        })?;
    debug!(
        "{}: surface opened ({}x{})",
        renderer.name(),
        config.viewport.width,
        config.viewport.height
    );
    let mut guard = SurfaceGuard { surface, backend: renderer.name() };

    let load_timeout = Duration::from_millis(config.load_timeout_ms);
    if guard.surface.wait_for_load(load_timeout)? {
        debug!("{}: load signal received", renderer.name());
    } else {
        info!(
            "{}: no load signal within {}ms, continuing",
            renderer.name(),
            config.load_timeout_ms
        );
    }

    if config.settle_delay_ms > 0 {
        debug!("{}: settling for {}ms", renderer.name(), config.settle_delay_ms);
        thread::sleep(Duration::from_millis(config.settle_delay_ms));
    }

    let snapshot = guard.surface.snapshot().inspect_err(|e| {
        warn!("{}: snapshot failed: {}", renderer.name(), e);
    })?;
    Ok(snapshot)
}

/// Serves a previously captured snapshot, e.g. one exported by an external
/// browser as JSON. The document handed to it is ignored.
pub struct JsonSnapshotRenderer {
    snapshot: LayoutSnapshot,
}

impl JsonSnapshotRenderer {
    pub fn new(snapshot: LayoutSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(LayoutSnapshot::from_json(json)?))
    }
}

struct StaticSurface<'a> {
    snapshot: &'a LayoutSnapshot,
}

impl Surface for StaticSurface<'_> {
    fn wait_for_load(&mut self, _timeout: Duration) -> Result<bool> {
        Ok(true)
    }

    fn snapshot(&mut self) -> Result<LayoutSnapshot> {
        Ok(self.snapshot.clone())
    }

    fn release(&mut self) {}
}

impl Renderer for JsonSnapshotRenderer {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    fn open_surface<'a>(&'a self, _document: &str, _config: &AnalyzerConfig) -> Result<Box<dyn Surface + 'a>> {
        Ok(Box::new(StaticSurface { snapshot: &self.snapshot }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{Rect, SnapshotElement};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    #[derive(Default)]
    struct Counters {
        opened: AtomicUsize,
        released: AtomicUsize,
    }

    struct FakeRenderer {
        counters: Arc<Counters>,
        fail_open: bool,
        fail_snapshot: bool,
        fires_load: bool,
    }

    struct FakeSurface {
        counters: Arc<Counters>,
        fail_snapshot: bool,
        fires_load: bool,
    }

    impl Surface for FakeSurface {
        fn wait_for_load(&mut self, _timeout: Duration) -> Result<bool> {
            Ok(self.fires_load)
        }

        fn snapshot(&mut self) -> Result<LayoutSnapshot> {
            if self.fail_snapshot {
                return Err(Error::Render("document detached".into()));
            }
            Ok(LayoutSnapshot::new(SnapshotElement::new("body", Rect::new(0.0, 0.0, 800.0, 600.0))))
        }

        fn release(&mut self) {
            self.counters.released.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Renderer for FakeRenderer {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn open_surface<'a>(&'a self, _document: &str, _config: &AnalyzerConfig) -> Result<Box<dyn Surface + 'a>> {
            if self.fail_open {
                return Err(Error::Render("no frame".into()));
            }
            self.counters.opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeSurface {
                counters: self.counters.clone(),
                fail_snapshot: self.fail_snapshot,
                fires_load: self.fires_load,
            }))
        }
    }

    fn fast_config() -> AnalyzerConfig {
        AnalyzerConfig { settle_delay_ms: 0, load_timeout_ms: 1, ..Default::default() }
    }

    fn renderer(fail_open: bool, fail_snapshot: bool, fires_load: bool) -> FakeRenderer {
        FakeRenderer { counters: Arc::new(Counters::default()), fail_open, fail_snapshot, fires_load }
    }

    #[test]
    fn surface_released_after_success() {
        let r = renderer(false, false, true);
        let snap = acquire(&r, "<p>x</p>", &fast_config()).unwrap();
        assert_eq!(snap.body.tag, "body");
        assert_eq!(r.counters.opened.load(Ordering::SeqCst), 1);
        assert_eq!(r.counters.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn surface_released_after_snapshot_failure() {
        let r = renderer(false, true, true);
        assert!(acquire(&r, "<p>x</p>", &fast_config()).is_err());
        assert_eq!(r.counters.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn missing_load_signal_falls_back_to_timeout() {
        let r = renderer(false, false, false);
        assert!(acquire(&r, "<p>x</p>", &fast_config()).is_ok());
        assert_eq!(r.counters.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn open_failure_is_acquisition_error() {
        let r = renderer(true, false, true);
        let err = acquire(&r, "<p>x</p>", &fast_config()).unwrap_err();
        assert!(matches!(err, Error::Acquisition(_)));
        assert_eq!(r.counters.released.load(Ordering::SeqCst), 0);
    }

    #[derive(Default)]
    struct Timings {
        load_timeout: Option<Duration>,
        loaded_at: Option<Instant>,
        snapshot_at: Option<Instant>,
    }

    struct TimedSurface {
        timings: Arc<Mutex<Timings>>,
    }

    impl Surface for TimedSurface {
        fn wait_for_load(&mut self, timeout: Duration) -> Result<bool> {
            let mut t = self.timings.lock().unwrap();
            t.load_timeout = Some(timeout);
            t.loaded_at = Some(Instant::now());
            Ok(true)
        }

        fn snapshot(&mut self) -> Result<LayoutSnapshot> {
            self.timings.lock().unwrap().snapshot_at = Some(Instant::now());
            Ok(LayoutSnapshot::new(SnapshotElement::new("body", Rect::new(0.0, 0.0, 800.0, 600.0))))
        }

        fn release(&mut self) {}
    }

    struct TimedRenderer {
        timings: Arc<Mutex<Timings>>,
    }

    impl Renderer for TimedRenderer {
        fn name(&self) -> &'static str {
            "timed"
        }

        fn open_surface<'a>(&'a self, _document: &str, _config: &AnalyzerConfig) -> Result<Box<dyn Surface + 'a>> {
            Ok(Box::new(TimedSurface { timings: self.timings.clone() }))
        }
    }

    #[test]
    fn load_wait_is_bounded_and_settle_delay_precedes_snapshot() {
        let timings = Arc::new(Mutex::new(Timings::default()));
        let r = TimedRenderer { timings: timings.clone() };
        let config = AnalyzerConfig { load_timeout_ms: 250, settle_delay_ms: 30, ..Default::default() };
        acquire(&r, "<p>x</p>", &config).unwrap();

        let t = timings.lock().unwrap();
        assert_eq!(t.load_timeout, Some(Duration::from_millis(250)));
        let settled = t.snapshot_at.unwrap().duration_since(t.loaded_at.unwrap());
        assert!(settled >= Duration::from_millis(30), "snapshot taken after only {:?}", settled);
    }

    #[test]
    fn composed_document_wraps_markup() {
        let doc = compose_document("<p>hi</p>", &AnalyzerConfig::default());
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<script src=\"https://cdn.tailwindcss.com\"></script>"));
        assert!(doc.contains("body { margin: 0; padding: 16px; }"));
        assert!(doc.contains("<body>\n<p>hi</p>\n</body>"));

        let bare = AnalyzerConfig { styling_runtime_url: None, ..Default::default() };
        assert!(!compose_document("<p>hi</p>", &bare).contains("<script"));
    }
}
