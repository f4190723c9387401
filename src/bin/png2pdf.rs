//! CLI binary for png2pdf.
//!
//! A thin shim over the library crate that collects PNG inputs, maps CLI
//! flags to `ConversionConfig` and writes the resulting PDF.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use png2pdf::pipeline::input::collect_inputs;
use png2pdf::{
    convert_to_file, default_output_name, AlphaMode, Compression, ConversionConfig,
    ConversionProgressCallback, Orientation, PageSize, ProgressCallback,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a percentage bar plus one log line per page.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}%  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        let bar = ProgressBar::new(100);
        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_progress(&self, percent: f64) {
        self.bar.set_position(percent.round() as u64);
    }

    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        self.bar.set_message(format!("image {page_num}/{total_pages}"));
    }

    fn on_page_complete(&self, page_num: usize, total_pages: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}",
            green("✓"),
            page_num,
            total_pages
        ));
    }

    fn on_conversion_complete(&self, total_pages: usize, output_bytes: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} pages converted  {}",
            green("✔"),
            bold(&total_pages.to_string()),
            dim(&format!("{:.1} KiB", output_bytes as f64 / 1024.0))
        );
    }

    fn on_conversion_error(&self, error: &str) {
        self.bar.abandon();
        eprintln!("{} {}", red("✘"), red(error));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert two screenshots (writes converted-<timestamp>.pdf)
  png2pdf first.png second.png

  # Every PNG in a directory, sorted by name, into a named file
  png2pdf scans/ -o scans.pdf

  # US Letter, landscape, smallest output
  png2pdf --page-size letter --landscape --compression best *.png

  # Custom page size in millimetres
  png2pdf --page-size 100x150 photo.png

  # Machine-readable layout report
  png2pdf --json a.png b.png > report.json
"#;

/// Convert PNG images into a single multi-page PDF.
#[derive(Parser, Debug)]
#[command(
    name = "png2pdf",
    version,
    about = "Convert PNG images into a single multi-page PDF",
    long_about = "Convert PNG images into one PDF, one image per page. Each image is scaled \
to fit the page without distortion and centred on it.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PNG files or directories containing PNG files, in page order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Write the PDF to this file instead of converted-<timestamp>.pdf.
    #[arg(short, long, env = "PNG2PDF_OUTPUT")]
    output: Option<PathBuf>,

    /// Page size: a3, a4, a5, letter, legal, or WxH in millimetres.
    #[arg(long, env = "PNG2PDF_PAGE_SIZE", default_value = "a4")]
    page_size: String,

    /// Use landscape orientation.
    #[arg(long, env = "PNG2PDF_LANDSCAPE")]
    landscape: bool,

    /// Image compression effort: fast, default, best.
    #[arg(long, env = "PNG2PDF_COMPRESSION", value_enum, default_value = "fast")]
    compression: CompressionArg,

    /// Transparency handling: mask keeps it, flatten composites onto white.
    #[arg(long, env = "PNG2PDF_ALPHA", value_enum, default_value = "mask")]
    alpha: AlphaArg,

    /// Document title stored in the PDF metadata.
    #[arg(long, env = "PNG2PDF_TITLE")]
    title: Option<String>,

    /// Print the per-page layout report as JSON on stdout.
    #[arg(long, env = "PNG2PDF_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PNG2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PNG2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PNG2PDF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum CompressionArg {
    Fast,
    Default,
    Best,
}

impl From<CompressionArg> for Compression {
    fn from(v: CompressionArg) -> Self {
        match v {
            CompressionArg::Fast => Compression::Fast,
            CompressionArg::Default => Compression::Default,
            CompressionArg::Best => Compression::Best,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum AlphaArg {
    Mask,
    Flatten,
}

impl From<AlphaArg> for AlphaMode {
    fn from(v: AlphaArg) -> Self {
        match v {
            AlphaArg::Mask => AlphaMode::SoftMask,
            AlphaArg::Flatten => AlphaMode::Flatten,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs; -v always wins.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Collect inputs ───────────────────────────────────────────────────
    let inputs = collect_inputs(&cli.inputs).context("No usable input images")?;

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(default_output_name()));

    let output = convert_to_file(&inputs, &output_path, &config)
        .await
        .context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    }

    // The progress callback already printed its own summary.
    if !cli.quiet && !show_progress {
        eprintln!(
            "{}  {} pages  {}ms  →  {}",
            green("✔"),
            output.stats.total_pages,
            output.stats.total_duration_ms,
            bold(&output_path.display().to_string()),
        );
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let page_size: PageSize = cli.page_size.parse().context("Invalid --page-size")?;
    let orientation = if cli.landscape {
        Orientation::Landscape
    } else {
        Orientation::Portrait
    };

    let mut builder = ConversionConfig::builder()
        .page_size(page_size)
        .orientation(orientation)
        .compression(cli.compression.clone().into())
        .alpha(cli.alpha.clone().into());

    if let Some(ref title) = cli.title {
        builder = builder.title(title);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
