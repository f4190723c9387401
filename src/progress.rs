//! Progress-callback trait for conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events while the pipeline processes each image.
//!
//! Two granularities are offered. [`ConversionProgressCallback::on_progress`]
//! carries a single percentage in `[0, 100]` suitable for a progress bar; the
//! per-page hooks carry page numbers for logging. Within one run the
//! percentages never decrease and the last one is exactly `100`.
//!
//! [`ChannelProgressCallback`] forwards percentages into a Tokio channel for
//! callers that would rather poll than implement the trait.
//!
//! # Example
//!
//! ```rust
//! use png2pdf::{ConversionConfig, ConversionProgressCallback};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct Recorder {
//!     seen: Mutex<Vec<f64>>,
//! }
//!
//! impl ConversionProgressCallback for Recorder {
//!     fn on_progress(&self, percent: f64) {
//!         self.seen.lock().unwrap().push(percent);
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(Recorder::default()))
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;
use tokio::sync::mpsc;

/// Called by the conversion pipeline as it processes each image.
///
/// Implementations must be `Send + Sync` so a config can move into a
/// spawned task. All methods have default no-op implementations so callers
/// only override what they care about.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first image is decoded.
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Overall progress in percent, `0.0..=100.0`.
    ///
    /// Reported before each image starts (`index / total * 100`) and once
    /// more with `100.0` after the last page is embedded.
    fn on_progress(&self, percent: f64) {
        let _ = percent;
    }

    /// Called before an image is decoded.
    ///
    /// # Arguments
    /// * `page_num`   : 1-indexed page number
    /// * `total_pages`: number of images in the run
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called after an image has been embedded on its page.
    fn on_page_complete(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called once after the PDF has been serialised.
    fn on_conversion_complete(&self, total_pages: usize, output_bytes: usize) {
        let _ = (total_pages, output_bytes);
    }

    /// Called once when the run aborts. No further events follow.
    fn on_conversion_error(&self, error: &str) {
        let _ = error;
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

/// Forwards every percentage to an unbounded Tokio channel.
///
/// The channel closes when the callback (and every config holding it) is
/// dropped, so a receiver loop terminates on its own after the run.
pub struct ChannelProgressCallback {
    tx: mpsc::UnboundedSender<f64>,
}

impl ChannelProgressCallback {
    /// Create a callback and the receiving end of its channel.
    pub fn channel() -> (ProgressCallback, mpsc::UnboundedReceiver<f64>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

impl ConversionProgressCallback for ChannelProgressCallback {
    fn on_progress(&self, percent: f64) {
        // A dropped receiver only means nobody is listening any more.
        let _ = self.tx.send(percent);
    }
}

/// Per-run view of the progress callback.
///
/// Created fresh for every conversion, which resets the percentage, and
/// clamps reported values so they stay in `[0, 100]` and never go backwards.
pub(crate) struct ProgressTracker {
    callback: Option<ProgressCallback>,
    last: f64,
}

impl ProgressTracker {
    pub(crate) fn new(callback: Option<ProgressCallback>) -> Self {
        Self {
            callback,
            last: 0.0,
        }
    }

    pub(crate) fn report(&mut self, percent: f64) {
        let percent = percent.clamp(0.0, 100.0).max(self.last);
        self.last = percent;
        if let Some(cb) = &self.callback {
            cb.on_progress(percent);
        }
    }

    pub(crate) fn last(&self) -> f64 {
        self.last
    }

    pub(crate) fn with(&self, f: impl FnOnce(&dyn ConversionProgressCallback)) {
        if let Some(cb) = &self.callback {
            f(cb.as_ref());
        }
    }
}
