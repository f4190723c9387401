//! Page layout: aspect-fit an image onto a fixed page and centre it.
//!
//! Everything in here is pure arithmetic. Offsets are measured from the
//! page's top-left corner in document units, which is how callers think
//! about placement; [`Placement::to_pdf_rect`] converts to the bottom-left,
//! point-based coordinate system PDF content streams use.

use crate::config::Unit;
use crate::error::Png2PdfError;
use serde::{Deserialize, Serialize};

/// Dimensions of every page in a document, in document units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
}

impl PageGeometry {
    /// Validate and build a page geometry. Both sides must be finite and > 0.
    pub fn new(width: f64, height: f64) -> Result<Self, Png2PdfError> {
        if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
            return Err(Png2PdfError::InvalidConfig(format!(
                "page dimensions must be positive, got {width} x {height}"
            )));
        }
        Ok(Self { width, height })
    }

    /// Aspect-fit an image of the given pixel size onto this page.
    pub fn place(&self, image_width: u32, image_height: u32) -> Placement {
        compute_placement(
            f64::from(image_width),
            f64::from(image_height),
            self.width,
            self.height,
        )
    }
}

/// Where and how large an image is drawn on its page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub draw_width: f64,
    pub draw_height: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// A rectangle in PDF user space: points, origin at the bottom-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Placement {
    /// True when every component is finite and the drawn size is non-zero.
    pub fn is_drawable(&self) -> bool {
        [self.draw_width, self.draw_height, self.offset_x, self.offset_y]
            .iter()
            .all(|v| v.is_finite())
            && self.draw_width > 0.0
            && self.draw_height > 0.0
    }

    /// Convert to a PDF rectangle on a page of the given geometry.
    pub fn to_pdf_rect(&self, page: &PageGeometry, unit: Unit) -> PdfRect {
        let k = unit.points_per_unit();
        PdfRect {
            x: self.offset_x * k,
            y: (page.height - self.offset_y - self.draw_height) * k,
            width: self.draw_width * k,
            height: self.draw_height * k,
        }
    }
}

/// Scale an image to fit inside a page while preserving its aspect ratio,
/// then centre it on the axis that has slack.
///
/// All four inputs must be > 0. When the image is relatively wider than the
/// page it spans the full page width; otherwise it spans the full height.
pub fn compute_placement(
    image_width: f64,
    image_height: f64,
    page_width: f64,
    page_height: f64,
) -> Placement {
    let img_ratio = image_width / image_height;
    let page_ratio = page_width / page_height;

    let (draw_width, draw_height) = if img_ratio > page_ratio {
        (page_width, page_width / img_ratio)
    } else {
        (page_height * img_ratio, page_height)
    };

    Placement {
        draw_width,
        draw_height,
        offset_x: (page_width - draw_width) / 2.0,
        offset_y: (page_height - draw_height) / 2.0,
    }
}
