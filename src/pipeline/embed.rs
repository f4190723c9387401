//! Image embedding: [`ImageAsset`] → PDF image XObject data.
//!
//! PDF has no PNG filter of its own, so pixels are written raw and
//! zlib-compressed (`FlateDecode`). Grey images stay single-channel; all
//! others become 8-bit RGB. Transparency is either kept as a separate
//! `SMask` image or composited onto white, depending on [`AlphaMode`].

use crate::config::{AlphaMode, Compression};
use crate::error::Png2PdfError;
use crate::pipeline::decode::ImageAsset;
use flate2::write::ZlibEncoder;
use image::DynamicImage;
use lopdf::{dictionary, Stream};
use std::io::Write;
use tracing::debug;

/// PDF colour space of the main image stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    DeviceGray,
    DeviceRGB,
}

impl ColorSpace {
    fn name(self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRGB => "DeviceRGB",
        }
    }
}

/// Compressed image data ready to be added to a document.
#[derive(Debug, Clone)]
pub struct ImageXObject {
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpace,
    /// Flate-compressed colour samples.
    pub data: Vec<u8>,
    /// Flate-compressed 8-bit alpha samples, when a soft mask is kept.
    pub smask: Option<Vec<u8>>,
}

impl ImageXObject {
    /// Build the image stream. `smask` must reference the soft-mask stream
    /// created by [`ImageXObject::smask_stream`], if any.
    pub fn image_stream(&self, smask: Option<lopdf::ObjectId>) -> Stream {
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(self.width),
            "Height" => i64::from(self.height),
            "ColorSpace" => self.color_space.name(),
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        };
        if let Some(id) = smask {
            dict.set("SMask", id);
        }
        Stream::new(dict, self.data.clone()).with_compression(false)
    }

    /// Build the soft-mask stream, when this image has one.
    pub fn smask_stream(&self) -> Option<Stream> {
        self.smask.as_ref().map(|alpha| {
            Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(self.width),
                    "Height" => i64::from(self.height),
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                    "Filter" => "FlateDecode",
                },
                alpha.clone(),
            )
            .with_compression(false)
        })
    }
}

/// Convert a decoded image into compressed XObject data.
///
/// `page` is 1-indexed and only used for error reporting.
pub fn encode_xobject(
    page: usize,
    asset: &ImageAsset,
    compression: Compression,
    alpha: AlphaMode,
) -> Result<ImageXObject, Png2PdfError> {
    let image = asset.image();
    let has_alpha = image.color().has_alpha();
    let is_gray = !image.color().has_color();

    let (samples, alpha_samples, color_space) = match (is_gray, has_alpha, alpha) {
        (true, false, _) => (image.to_luma8().into_raw(), None, ColorSpace::DeviceGray),
        (true, true, AlphaMode::SoftMask) => {
            let (gray, a) = split_luma_alpha(image);
            (gray, Some(a), ColorSpace::DeviceGray)
        }
        (true, true, AlphaMode::Flatten) => (
            flatten_luma_alpha(image),
            None,
            ColorSpace::DeviceGray,
        ),
        (false, false, _) => (image.to_rgb8().into_raw(), None, ColorSpace::DeviceRGB),
        (false, true, AlphaMode::SoftMask) => {
            let (rgb, a) = split_rgba(image);
            (rgb, Some(a), ColorSpace::DeviceRGB)
        }
        (false, true, AlphaMode::Flatten) => {
            (flatten_rgba(image), None, ColorSpace::DeviceRGB)
        }
    };

    let embed_err = |e: std::io::Error| Png2PdfError::EmbedFailure {
        page,
        detail: format!("compressing image data: {e}"),
    };
    let data = deflate(&samples, compression).map_err(embed_err)?;
    let smask = alpha_samples
        .map(|a| deflate(&a, compression))
        .transpose()
        .map_err(embed_err)?;

    debug!(
        "Encoded image {} → {:?}, {} bytes{}",
        page,
        color_space,
        data.len(),
        if smask.is_some() { " + soft mask" } else { "" }
    );

    Ok(ImageXObject {
        width: asset.width(),
        height: asset.height(),
        color_space,
        data,
        smask,
    })
}

fn deflate(raw: &[u8], compression: Compression) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), compression.level());
    encoder.write_all(raw)?;
    encoder.finish()
}

fn split_luma_alpha(image: &DynamicImage) -> (Vec<u8>, Vec<u8>) {
    let la = image.to_luma_alpha8();
    let mut gray = Vec::with_capacity(la.pixels().len());
    let mut alpha = Vec::with_capacity(la.pixels().len());
    for p in la.pixels() {
        gray.push(p[0]);
        alpha.push(p[1]);
    }
    (gray, alpha)
}

fn split_rgba(image: &DynamicImage) -> (Vec<u8>, Vec<u8>) {
    let rgba = image.to_rgba8();
    let mut rgb = Vec::with_capacity(rgba.pixels().len() * 3);
    let mut alpha = Vec::with_capacity(rgba.pixels().len());
    for p in rgba.pixels() {
        rgb.extend_from_slice(&p.0[..3]);
        alpha.push(p[3]);
    }
    (rgb, alpha)
}

/// Composite a channel value over white.
fn over_white(channel: u8, alpha: u8) -> u8 {
    let a = u32::from(alpha);
    ((u32::from(channel) * a + 255 * (255 - a) + 127) / 255) as u8
}

fn flatten_luma_alpha(image: &DynamicImage) -> Vec<u8> {
    image
        .to_luma_alpha8()
        .pixels()
        .map(|p| over_white(p[0], p[1]))
        .collect()
}

fn flatten_rgba(image: &DynamicImage) -> Vec<u8> {
    let rgba = image.to_rgba8();
    let mut rgb = Vec::with_capacity(rgba.pixels().len() * 3);
    for p in rgba.pixels() {
        for c in 0..3 {
            rgb.push(over_white(p[c], p[3]));
        }
    }
    rgb
}
