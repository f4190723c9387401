//! Result types returned by the conversion entry points.

use crate::layout::Placement;
use serde::{Deserialize, Serialize};

/// Everything a successful conversion produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The finished PDF document.
    #[serde(skip)]
    pub pdf: Vec<u8>,
    /// One entry per page, in page order.
    pub pages: Vec<PageResult>,
    pub stats: ConversionStats,
}

/// How one input image was laid out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// 1-indexed page number; equals the image's position in the input.
    pub page_num: usize,
    pub image_width: u32,
    pub image_height: u32,
    /// Placement in document units, measured from the top-left corner.
    pub placement: Placement,
}

/// Aggregate numbers for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    pub total_pages: usize,
    /// Sum of the input buffer sizes.
    pub input_bytes: u64,
    /// Size of the produced PDF.
    pub output_bytes: u64,
    /// Time spent waiting on image decoding.
    pub decode_duration_ms: u64,
    pub total_duration_ms: u64,
}
