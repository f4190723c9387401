//! Conversion entry points and the per-run [`Conversion`] object.
//!
//! A run is strictly sequential: for each image in order the pipeline
//! reports progress, decodes, appends a page (except for the first image,
//! which uses the document's initial page), computes the placement and
//! embeds. The first error aborts the run and nothing is returned but the
//! error.
//!
//! ```text
//! Idle ──▶ Processing(0) ──▶ … ──▶ Processing(n-1) ──▶ Finalizing ──▶ Done
//!                 │                        │                │
//!                 └────────────────────────┴────────────────┴──▶ Failed
//! ```

use crate::config::ConversionConfig;
use crate::error::Png2PdfError;
use crate::layout::PageGeometry;
use crate::output::{ConversionOutput, ConversionStats, PageResult};
use crate::pipeline::decode::decode_image;
use crate::pipeline::document::PdfDocumentBuilder;
use crate::pipeline::embed::encode_xobject;
use crate::pipeline::input;
use crate::progress::ProgressTracker;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// Where a [`Conversion`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionState {
    /// Created, nothing processed yet.
    Idle,
    /// Working on the image with this 0-based index.
    Processing(usize),
    /// All pages embedded; serialising.
    Finalizing,
    /// Finished successfully.
    Done,
    /// Aborted. A failed conversion cannot be resumed.
    Failed,
}

/// One conversion invocation.
///
/// Owns its inputs, the growing document and the progress tracker, so
/// nothing is shared between concurrent conversions.
pub struct Conversion {
    images: Vec<Vec<u8>>,
    config: ConversionConfig,
    geometry: PageGeometry,
    state: ConversionState,
    progress: ProgressTracker,
}

impl Conversion {
    /// Prepare a run over `images` in the given order.
    ///
    /// # Errors
    /// - [`Png2PdfError::InvalidInput`] when `images` is empty
    /// - [`Png2PdfError::InvalidConfig`] when the page geometry is invalid
    pub fn new(images: Vec<Vec<u8>>, config: &ConversionConfig) -> Result<Self, Png2PdfError> {
        if images.is_empty() {
            return Err(Png2PdfError::invalid_input("no images supplied"));
        }
        let geometry = config.geometry()?;
        Ok(Self {
            images,
            config: config.clone(),
            geometry,
            state: ConversionState::Idle,
            progress: ProgressTracker::new(config.progress_callback.clone()),
        })
    }

    pub fn state(&self) -> ConversionState {
        self.state
    }

    pub fn total_pages(&self) -> usize {
        self.images.len()
    }

    /// Run the conversion to completion or failure.
    pub async fn run(mut self) -> Result<ConversionOutput, Png2PdfError> {
        let total_pages = self.images.len();
        self.progress.with(|cb| cb.on_conversion_start(total_pages));

        match self.process().await {
            Ok(output) => {
                self.state = ConversionState::Done;
                self.progress
                    .with(|cb| cb.on_conversion_complete(total_pages, output.pdf.len()));
                Ok(output)
            }
            Err(e) => {
                warn!("Conversion failed in state {:?}: {}", self.state, e);
                self.state = ConversionState::Failed;
                let msg = e.to_string();
                self.progress.with(|cb| cb.on_conversion_error(&msg));
                Err(e)
            }
        }
    }

    async fn process(&mut self) -> Result<ConversionOutput, Png2PdfError> {
        let start = Instant::now();
        let images = std::mem::take(&mut self.images);
        let total = images.len();
        let input_bytes: u64 = images.iter().map(|b| b.len() as u64).sum();
        info!(
            "Converting {} images onto {}x{} {:?} pages",
            total, self.geometry.width, self.geometry.height, self.config.unit
        );

        let mut document = PdfDocumentBuilder::new(self.geometry, self.config.unit);
        let mut pages = Vec::with_capacity(total);
        let mut decode_ms = 0u64;

        for (i, bytes) in images.into_iter().enumerate() {
            let page_num = i + 1;
            self.state = ConversionState::Processing(i);
            self.progress.report(i as f64 / total as f64 * 100.0);
            self.progress.with(|cb| cb.on_page_start(page_num, total));

            let decode_start = Instant::now();
            let asset = decode_image(page_num, bytes).await?;
            decode_ms += decode_start.elapsed().as_millis() as u64;

            if i > 0 {
                document.add_page();
            }

            let placement = self.geometry.place(asset.width(), asset.height());
            let xobject =
                encode_xobject(page_num, &asset, self.config.compression, self.config.alpha)?;
            document.draw_image(&xobject, &placement)?;
            debug!(
                "Page {}/{}: {}x{} px at {:?}",
                page_num,
                total,
                asset.width(),
                asset.height(),
                placement
            );

            pages.push(PageResult {
                page_num,
                image_width: asset.width(),
                image_height: asset.height(),
                placement,
            });
            self.progress.with(|cb| cb.on_page_complete(page_num, total));
        }

        self.progress.report(100.0);
        self.state = ConversionState::Finalizing;

        document.set_info(self.config.title.as_deref(), &self.config.producer);
        let pdf = document.finish()?;

        let stats = ConversionStats {
            total_pages: pages.len(),
            input_bytes,
            output_bytes: pdf.len() as u64,
            decode_duration_ms: decode_ms,
            total_duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            "Conversion complete: {} pages, {} bytes, {}ms",
            stats.total_pages, stats.output_bytes, stats.total_duration_ms
        );

        Ok(ConversionOutput { pdf, pages, stats })
    }
}

/// Convert an ordered list of image buffers into one PDF.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// Any failure aborts the whole run; see [`Png2PdfError`].
///
/// # Example
/// ```rust,no_run
/// use png2pdf::{convert, ConversionConfig};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let images = vec![std::fs::read("page1.png")?, std::fs::read("page2.png")?];
/// let output = convert(images, &ConversionConfig::default()).await?;
/// std::fs::write("out.pdf", &output.pdf)?;
/// # Ok(())
/// # }
/// ```
pub async fn convert(
    images: Vec<Vec<u8>>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Png2PdfError> {
    Conversion::new(images, config)?.run().await
}

/// Read image files (in the given order) and convert them.
pub async fn convert_files(
    paths: &[PathBuf],
    config: &ConversionConfig,
) -> Result<ConversionOutput, Png2PdfError> {
    if paths.is_empty() {
        return Err(Png2PdfError::invalid_input("no images supplied"));
    }
    let images = input::read_inputs(paths).await?;
    convert(images, config).await
}

/// Convert image files and write the PDF to `output_path`.
///
/// The PDF is written to a temporary file next to the target and then
/// renamed into place, so a failed run never leaves a truncated file.
pub async fn convert_to_file(
    paths: &[PathBuf],
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Png2PdfError> {
    let output = convert_files(paths, config).await?;
    let path = output_path.as_ref().to_path_buf();
    let pdf = output.pdf.clone();

    let target = path.clone();
    tokio::task::spawn_blocking(move || write_atomically(&target, &pdf))
        .await
        .map_err(|e| Png2PdfError::Internal(format!("Write task panicked: {}", e)))?
        .map_err(|source| Png2PdfError::OutputWriteFailed { path, source })?;

    Ok(output)
}

fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(&parent)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    images: Vec<Vec<u8>>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Png2PdfError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Png2PdfError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(images, config))
}

/// Suggested download name: `converted-<unix millis>.pdf`.
pub fn default_output_name() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("converted-{millis}.pdf")
}
