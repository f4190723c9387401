//! Configuration types for PNG-to-PDF conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. One struct holds every knob so a
//! config can be cloned into a task, logged, or compared between runs.
//!
//! Page sizes are expressed in millimetres and converted into the document
//! [`Unit`] on demand; the default document unit is also millimetres, so an
//! A4 portrait page is `210 x 297`.

use crate::error::Png2PdfError;
use crate::layout::PageGeometry;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Configuration for a PNG-to-PDF conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use png2pdf::{Compression, ConversionConfig, Orientation, PageSize};
///
/// let config = ConversionConfig::builder()
///     .page_size(PageSize::Letter)
///     .orientation(Orientation::Landscape)
///     .compression(Compression::Best)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Physical page size. Default: A4.
    pub page_size: PageSize,

    /// Page orientation. Default: portrait.
    pub orientation: Orientation,

    /// Unit that page geometry and placements are expressed in. Default: mm.
    pub unit: Unit,

    /// zlib level used for image data. Default: [`Compression::Fast`].
    ///
    /// Conversion time is dominated by compressing pixel data; the fast level
    /// costs a few percent in file size and is several times quicker than
    /// [`Compression::Best`] on large screenshots.
    pub compression: Compression,

    /// How transparent pixels are written. Default: [`AlphaMode::SoftMask`].
    pub alpha: AlphaMode,

    /// Optional document title written to the PDF Info dictionary.
    pub title: Option<String>,

    /// Producer string written to the PDF Info dictionary.
    pub producer: String,

    /// Optional progress callback. See [`crate::progress`].
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            orientation: Orientation::default(),
            unit: Unit::default(),
            compression: Compression::default(),
            alpha: AlphaMode::default(),
            title: None,
            producer: concat!("png2pdf ", env!("CARGO_PKG_VERSION")).to_string(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("page_size", &self.page_size)
            .field("orientation", &self.orientation)
            .field("unit", &self.unit)
            .field("compression", &self.compression)
            .field("alpha", &self.alpha)
            .field("title", &self.title)
            .field("producer", &self.producer)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Page geometry in document units for the configured size and orientation.
    pub fn geometry(&self) -> Result<PageGeometry, Png2PdfError> {
        self.page_size.geometry(self.orientation, self.unit)
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn page_size(mut self, size: PageSize) -> Self {
        self.config.page_size = size;
        self
    }

    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.config.orientation = orientation;
        self
    }

    pub fn unit(mut self, unit: Unit) -> Self {
        self.config.unit = unit;
        self
    }

    pub fn compression(mut self, level: Compression) -> Self {
        self.config.compression = level;
        self
    }

    pub fn alpha(mut self, mode: AlphaMode) -> Self {
        self.config.alpha = mode;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = Some(title.into());
        self
    }

    pub fn producer(mut self, producer: impl Into<String>) -> Self {
        self.config.producer = producer.into();
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Png2PdfError> {
        self.config.geometry()?;
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Length unit of the document coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Unit {
    /// PDF points (1/72 inch).
    Pt,
    /// Millimetres. (default)
    #[default]
    Mm,
    /// Inches.
    In,
}

impl Unit {
    /// How many PDF points one unit spans.
    pub fn points_per_unit(self) -> f64 {
        match self {
            Unit::Pt => 1.0,
            Unit::Mm => 72.0 / 25.4,
            Unit::In => 72.0,
        }
    }

    fn scale_mm(self, mm: f64) -> f64 {
        match self {
            Unit::Mm => mm,
            _ => mm * Unit::Mm.points_per_unit() / self.points_per_unit(),
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Portrait,
    /// Long edge horizontal; width and height of the page size are swapped.
    Landscape,
}

/// Standard page sizes. Dimensions are portrait, in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PageSize {
    A3,
    /// 210 x 297 mm. (default)
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    /// Arbitrary size in millimetres.
    Custom { width: f64, height: f64 },
}

impl PageSize {
    /// Portrait `(width, height)` in millimetres.
    pub fn dimensions_mm(&self) -> (f64, f64) {
        match *self {
            PageSize::A3 => (297.0, 420.0),
            PageSize::A4 => (210.0, 297.0),
            PageSize::A5 => (148.0, 210.0),
            PageSize::Letter => (215.9, 279.4),
            PageSize::Legal => (215.9, 355.6),
            PageSize::Custom { width, height } => (width, height),
        }
    }

    /// Resolve to a validated geometry in the given unit.
    pub fn geometry(
        &self,
        orientation: Orientation,
        unit: Unit,
    ) -> Result<PageGeometry, Png2PdfError> {
        let (w, h) = self.dimensions_mm();
        let (w, h) = match orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        };
        PageGeometry::new(unit.scale_mm(w), unit.scale_mm(h))
    }
}

impl FromStr for PageSize {
    type Err = Png2PdfError;

    /// Accepts `a3`, `a4`, `a5`, `letter`, `legal` or `WxH` in millimetres.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "a3" => return Ok(PageSize::A3),
            "a4" => return Ok(PageSize::A4),
            "a5" => return Ok(PageSize::A5),
            "letter" => return Ok(PageSize::Letter),
            "legal" => return Ok(PageSize::Legal),
            _ => {}
        }

        let (w, h) = s.split_once('x').ok_or_else(|| {
            Png2PdfError::InvalidConfig(format!(
                "unknown page size '{s}' (expected a3, a4, a5, letter, legal or WxH in mm)"
            ))
        })?;
        let parse = |v: &str| {
            v.trim().parse::<f64>().map_err(|_| {
                Png2PdfError::InvalidConfig(format!("invalid page dimension '{}'", v.trim()))
            })
        };
        let size = PageSize::Custom {
            width: parse(w)?,
            height: parse(h)?,
        };
        size.geometry(Orientation::Portrait, Unit::Mm)?;
        Ok(size)
    }
}

/// zlib effort used when compressing image streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Compression {
    /// Quickest, slightly larger files. (default)
    #[default]
    Fast,
    /// zlib's default balance.
    Default,
    /// Smallest files, slowest.
    Best,
}

impl Compression {
    pub(crate) fn level(self) -> flate2::Compression {
        match self {
            Compression::Fast => flate2::Compression::fast(),
            Compression::Default => flate2::Compression::default(),
            Compression::Best => flate2::Compression::best(),
        }
    }
}

/// Treatment of the alpha channel of transparent images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlphaMode {
    /// Keep transparency as a soft mask image. (default)
    #[default]
    SoftMask,
    /// Composite onto a white background and drop the alpha channel.
    Flatten,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_a4_portrait_in_mm() {
        let config = ConversionConfig::default();
        let g = config.geometry().unwrap();
        assert_eq!((g.width, g.height), (210.0, 297.0));
        assert_eq!(config.compression, Compression::Fast);
        assert!(config.progress_callback.is_none());
    }

    #[test]
    fn landscape_swaps_axes() {
        let g = PageSize::A4
            .geometry(Orientation::Landscape, Unit::Mm)
            .unwrap();
        assert_eq!((g.width, g.height), (297.0, 210.0));
    }

    #[test]
    fn letter_in_points() {
        let g = PageSize::Letter
            .geometry(Orientation::Portrait, Unit::Pt)
            .unwrap();
        assert!((g.width - 612.0).abs() < 1e-6, "got {}", g.width);
        assert!((g.height - 792.0).abs() < 1e-6, "got {}", g.height);
    }

    #[test]
    fn a4_in_inches() {
        let g = PageSize::A4.geometry(Orientation::Portrait, Unit::In).unwrap();
        assert!((g.width - 210.0 / 25.4).abs() < 1e-9);
    }

    #[test]
    fn parse_named_and_custom_sizes() {
        assert_eq!("A4".parse::<PageSize>().unwrap(), PageSize::A4);
        assert_eq!(" letter ".parse::<PageSize>().unwrap(), PageSize::Letter);
        assert_eq!(
            "100x150".parse::<PageSize>().unwrap(),
            PageSize::Custom {
                width: 100.0,
                height: 150.0
            }
        );
        assert!("tabloid".parse::<PageSize>().is_err());
        assert!("0x150".parse::<PageSize>().is_err());
        assert!("axb".parse::<PageSize>().is_err());
    }

    #[test]
    fn builder_rejects_degenerate_custom_size() {
        let err = ConversionConfig::builder()
            .page_size(PageSize::Custom {
                width: -5.0,
                height: 100.0,
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, Png2PdfError::InvalidConfig(_)));
    }

    #[test]
    fn builder_sets_fields() {
        let config = ConversionConfig::builder()
            .page_size(PageSize::A5)
            .unit(Unit::Pt)
            .alpha(AlphaMode::Flatten)
            .title("Scans")
            .build()
            .unwrap();
        assert_eq!(config.page_size, PageSize::A5);
        assert_eq!(config.unit, Unit::Pt);
        assert_eq!(config.alpha, AlphaMode::Flatten);
        assert_eq!(config.title.as_deref(), Some("Scans"));
    }

    #[test]
    fn debug_hides_callback() {
        use crate::progress::NoopProgressCallback;
        use std::sync::Arc;

        let config = ConversionConfig::builder()
            .progress_callback(Arc::new(NoopProgressCallback))
            .build()
            .unwrap();
        let dbg = format!("{config:?}");
        assert!(dbg.contains("<dyn ConversionProgressCallback>"));
    }
}
