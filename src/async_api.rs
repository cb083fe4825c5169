use crate::{analyze_with, new_renderer, AnalysisResult, AnalyzerConfig, Backend, Error, Renderer, Result};
use log::debug;
use std::sync::mpsc::{self, Sender};
use std::thread;
use tokio::sync::oneshot;

/// Worker stack budget per level of `max_depth`.
const STACK_PER_LEVEL: usize = 16 * 1024;
const MIN_WORKER_STACK: usize = 2 * 1024 * 1024;
const MAX_WORKER_STACK: usize = 64 * 1024 * 1024;

enum Command {
    Analyze(String, oneshot::Sender<AnalysisResult>),
    Close(oneshot::Sender<Result<()>>),
}

/// An async-friendly analyzer backed by a dedicated worker thread.
///
/// The worker thread owns the renderer and handles one request at a time,
/// so analyses submitted from any number of tasks never overlap. Cloned
/// handles share the same worker.
#[derive(Clone)]
pub struct Analyzer {
    cmd_tx: Sender<Command>,
}

impl Analyzer {
    /// Create an analyzer over `backend` (the renderer is built on the worker thread).
    pub async fn new(config: AnalyzerConfig, backend: Backend) -> Result<Self> {
        Self::spawn(config, move |cfg| new_renderer(backend, cfg).map(|r| r as Box<dyn Renderer>)).await
    }

    /// Create an analyzer over an already constructed renderer.
    pub async fn with_renderer(config: AnalyzerConfig, renderer: Box<dyn Renderer + Send>) -> Result<Self> {
        Self::spawn(config, move |_| Ok(renderer as Box<dyn Renderer>)).await
    }

    async fn spawn<F>(config: AnalyzerConfig, factory: F) -> Result<Self>
    where
        F: FnOnce(&AnalyzerConfig) -> Result<Box<dyn Renderer>> + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Command>();
        let (init_tx, init_rx) = oneshot::channel::<Result<()>>();

        let stack_size = config.max_depth.saturating_mul(STACK_PER_LEVEL).clamp(MIN_WORKER_STACK, MAX_WORKER_STACK);
        let spawned = thread::Builder::new()
            .name("skelegen-analyzer".into())
            .stack_size(stack_size)
            .spawn(move || {
                let renderer = match factory(&config) {
                    Ok(r) => r,
                    Err(err) => {
                        let _ = init_tx.send(Err(err));
                        return;
                    }
                };
                let _ = init_tx.send(Ok(()));
                debug!("{}: analyzer worker started", renderer.name());

                while let Ok(cmd) = cmd_rx.recv() {
                    match cmd {
                        Command::Analyze(markup, resp) => {
                            let res = analyze_with(renderer.as_ref(), &markup, &config);
                            let _ = resp.send(res);
                        }
                        Command::Close(resp) => {
                            let _ = resp.send(Ok(()));
                            break;
                        }
                    }
                }
                debug!("{}: analyzer worker stopped", renderer.name());
            });
        spawned.map_err(|e| Error::Other(format!("Failed to start analyzer worker: {}", e)))?;

        init_rx
            .await
            .map_err(|e| Error::Other(format!("Worker init canceled: {}", e)))??;

        Ok(Self { cmd_tx })
    }

    /// Analyze `markup`. Requests are served in submission order.
    pub async fn analyze(&self, markup: &str) -> AnalysisResult {
        let (tx, rx) = oneshot::channel();
        if self.cmd_tx.send(Command::Analyze(markup.to_string(), tx)).is_err() {
            return AnalysisResult::failure(markup, "analyzer worker has shut down");
        }
        rx.await
            .unwrap_or_else(|_| AnalysisResult::failure(markup, "analyzer worker dropped the request"))
    }

    /// Shut down the worker thread.
    pub async fn close(self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Command::Close(tx));
        rx.await
            .map_err(|e| Error::Other(format!("Close canceled: {}", e)))?
    }
}
