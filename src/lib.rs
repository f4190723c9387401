//! # png2pdf
//!
//! Convert an ordered list of PNG images into a single multi-page PDF,
//! one image per page.
//!
//! Each image is scaled to fit its page without changing its aspect ratio
//! and centred on the axis with room to spare: a wide screenshot spans the
//! page width and sits in the vertical middle, a tall scan spans the height.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PNG buffers
//!  │
//!  ├─ 1. Input    filter + read files in order (CLI / convert_files)
//!  ├─ 2. Decode   bytes → pixels (CPU-bound, spawn_blocking)
//!  ├─ 3. Layout   aspect-fit + centre on the configured page
//!  ├─ 4. Embed    pixels → Flate-compressed image XObject
//!  └─ 5. Output   assembled PDF bytes + per-page layout
//! ```
//!
//! Images are processed strictly one after another; the first failure
//! aborts the run and no partial PDF is returned.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use png2pdf::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let images = vec![std::fs::read("a.png")?, std::fs::read("b.png")?];
//!     let output = convert(images, &ConversionConfig::default()).await?;
//!     std::fs::write("out.pdf", &output.pdf)?;
//!     eprintln!("{} pages, {} bytes", output.stats.total_pages, output.stats.output_bytes);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `png2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod layout;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    AlphaMode, Compression, ConversionConfig, ConversionConfigBuilder, Orientation, PageSize, Unit,
};
pub use convert::{
    convert, convert_files, convert_sync, convert_to_file, default_output_name, Conversion,
    ConversionState,
};
pub use error::Png2PdfError;
pub use layout::{compute_placement, PageGeometry, Placement};
pub use output::{ConversionOutput, ConversionStats, PageResult};
pub use progress::{
    ChannelProgressCallback, ConversionProgressCallback, NoopProgressCallback, ProgressCallback,
};
