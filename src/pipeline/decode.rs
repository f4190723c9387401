//! Image decoding: raw file bytes → [`ImageAsset`].
//!
//! Decompressing a large PNG is CPU-bound, so the work runs on Tokio's
//! blocking pool via `spawn_blocking`. The pipeline awaits each decode
//! before starting the next, which keeps page order equal to input order.

use crate::error::Png2PdfError;
use image::{DynamicImage, GenericImageView};
use tracing::debug;

/// A decoded raster image ready to be embedded on a page.
///
/// Owned by the pipeline only while its page is being built.
#[derive(Debug, Clone)]
pub struct ImageAsset {
    image: DynamicImage,
}

impl ImageAsset {
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    /// Natural width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Natural height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

/// Decode one image buffer.
///
/// `page` is the 1-indexed position of the image in the run and only used
/// for error reporting.
///
/// # Errors
/// - [`Png2PdfError::InvalidInput`] for an empty buffer
/// - [`Png2PdfError::DecodeFailure`] when the decoder rejects the data
pub async fn decode_image(page: usize, bytes: Vec<u8>) -> Result<ImageAsset, Png2PdfError> {
    if bytes.is_empty() {
        return Err(Png2PdfError::invalid_input(format!(
            "image {page} is an empty buffer"
        )));
    }

    tokio::task::spawn_blocking(move || decode_blocking(page, &bytes))
        .await
        .map_err(|e| Png2PdfError::Internal(format!("Decode task panicked: {}", e)))?
}

/// Blocking implementation of image decoding.
fn decode_blocking(page: usize, bytes: &[u8]) -> Result<ImageAsset, Png2PdfError> {
    let image = image::load_from_memory(bytes).map_err(|e| Png2PdfError::DecodeFailure {
        page,
        detail: e.to_string(),
    })?;

    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(Png2PdfError::DecodeFailure {
            page,
            detail: format!("image has no pixels ({width}x{height})"),
        });
    }

    debug!(
        "Decoded image {} → {}x{} px {:?}",
        page,
        width,
        height,
        image.color()
    );
    Ok(ImageAsset::new(image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba([10, 20, 30, 255])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .expect("encode png");
        buf
    }

    #[tokio::test]
    async fn decodes_dimensions() {
        let asset = decode_image(1, png_bytes(40, 25)).await.unwrap();
        assert_eq!((asset.width(), asset.height()), (40, 25));
    }

    #[tokio::test]
    async fn garbage_is_a_decode_failure() {
        let err = decode_image(4, b"definitely not an image".to_vec())
            .await
            .unwrap_err();
        assert!(
            matches!(err, Png2PdfError::DecodeFailure { page: 4, .. }),
            "{err}"
        );
    }

    #[tokio::test]
    async fn truncated_png_is_a_decode_failure() {
        let mut bytes = png_bytes(64, 64);
        bytes.truncate(bytes.len() / 2);
        let err = decode_image(2, bytes).await.unwrap_err();
        assert!(matches!(err, Png2PdfError::DecodeFailure { page: 2, .. }));
    }

    #[tokio::test]
    async fn empty_buffer_is_invalid_input() {
        let err = decode_image(1, Vec::new()).await.unwrap_err();
        assert!(matches!(err, Png2PdfError::InvalidInput { .. }));
    }
}
