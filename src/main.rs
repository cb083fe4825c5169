use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use log::info;

use skelegen::async_api::Analyzer;
use skelegen::emit::render_preview;
use skelegen::{AnalyzerConfig, Backend, JsonSnapshotRenderer, Viewport};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    /// Skeleton component source
    Jsx,
    /// The full analysis result as JSON
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BackendArg {
    Builtin,
    Cdp,
}

impl From<BackendArg> for Backend {
    fn from(b: BackendArg) -> Self {
        match b {
            BackendArg::Builtin => Backend::Builtin,
            BackendArg::Cdp => Backend::Cdp,
        }
    }
}

/// Generate a loading skeleton from an HTML fragment
#[derive(Debug, Parser)]
#[command(name = "skelegen", version)]
struct Cli {
    /// HTML file to analyze; reads stdin when omitted or "-"
    input: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Jsx)]
    format: Format,

    /// Write the output here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also draw the skeleton as an SVG preview
    #[arg(long, value_name = "FILE")]
    preview: Option<PathBuf>,

    /// Use a captured layout snapshot (JSON) instead of rendering
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = BackendArg::Builtin)]
    backend: BackendArg,

    /// Row grouping tolerance in pixels
    #[arg(long)]
    tolerance: Option<f64>,

    /// Settle delay after load in milliseconds
    #[arg(long)]
    settle_ms: Option<u64>,

    /// Upper bound on waiting for the load signal in milliseconds
    #[arg(long)]
    load_timeout_ms: Option<u64>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Do not inject the styling runtime into the rendered document
    #[arg(long)]
    no_runtime: bool,

    /// Print a detection summary to stderr
    #[arg(long)]
    stats: bool,
}

impl Cli {
    fn config(&self) -> AnalyzerConfig {
        let d = AnalyzerConfig::default();
        AnalyzerConfig {
            row_tolerance_px: self.tolerance.unwrap_or(d.row_tolerance_px),
            settle_delay_ms: self.settle_ms.unwrap_or(d.settle_delay_ms),
            load_timeout_ms: self.load_timeout_ms.unwrap_or(d.load_timeout_ms),
            viewport: Viewport {
                width: self.width.unwrap_or(d.viewport.width),
                height: self.height.unwrap_or(d.viewport.height),
            },
            styling_runtime_url: if self.no_runtime { None } else { d.styling_runtime_url.clone() },
            ..d
        }
    }
}

fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(p) if p != Path::new("-") => {
            fs::read_to_string(p).with_context(|| format!("failed to read {}", p.display()))
        }
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&Path>, text: &str) -> anyhow::Result<()> {
    match path {
        Some(p) => fs::write(p, text).with_context(|| format!("failed to write {}", p.display())),
        None => {
            let mut out = io::stdout().lock();
            writeln!(out, "{}", text)?;
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let markup = read_input(cli.input.as_deref())?;
    if markup.trim().is_empty() {
        bail!("Please provide some HTML to analyze");
    }
    let config = cli.config();

    let analyzer = match &cli.snapshot {
        Some(path) => {
            let json = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
            let renderer = JsonSnapshotRenderer::from_json(&json)?;
            Analyzer::with_renderer(config.clone(), Box::new(renderer)).await?
        }
        None => Analyzer::new(config.clone(), cli.backend.into()).await?,
    };
    let result = analyzer.analyze(&markup).await;
    analyzer.close().await?;

    if let Some(err) = &result.error {
        if let Format::Json = cli.format {
            write_output(cli.output.as_deref(), &serde_json::to_string_pretty(&result)?)?;
        }
        bail!("{}", err);
    }

    let text = match cli.format {
        Format::Jsx => skelegen::generate_skeleton_code(&result.elements, &config),
        Format::Json => serde_json::to_string_pretty(&result)?,
    };
    write_output(cli.output.as_deref(), &text)?;

    if let Some(path) = &cli.preview {
        let plan = skelegen::plan(&result.elements, &config);
        let svg = render_preview(&plan, config.viewport.width as f64).to_svg();
        fs::write(path, svg).with_context(|| format!("failed to write {}", path.display()))?;
        info!("preview written to {}", path.display());
    }

    if cli.stats && !result.elements.is_empty() {
        eprintln!("{}", skelegen::summary(&result.elements));
    }

    Ok(())
}
