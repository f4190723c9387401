//! Error types for the png2pdf library.
//!
//! A conversion is all-or-nothing: any failure aborts the run and no partial
//! PDF is returned. There is therefore exactly one error type,
//! [`Png2PdfError`], and every variant is terminal for the `convert*` call
//! that produced it. Variants carry enough structure for logging and tests;
//! front-ends that only want a generic message use
//! [`Png2PdfError::user_message`].

use std::path::PathBuf;
use thiserror::Error;

/// Generic message shown to end users for any failed conversion.
pub const CONVERSION_FAILED_MESSAGE: &str = "Error during conversion. Please try again.";

/// All errors returned by the png2pdf library.
#[derive(Debug, Error)]
pub enum Png2PdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// No images were supplied, or a supplied buffer cannot be an image.
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Input file was not found at the given path.
    #[error("Image file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    // ── Pipeline errors ───────────────────────────────────────────────────
    /// An image could not be decoded into pixels.
    #[error("Failed to decode image {page}: {detail}")]
    DecodeFailure { page: usize, detail: String },

    /// The document rejected an image or its placement.
    #[error("Failed to embed image on page {page}: {detail}")]
    EmbedFailure { page: usize, detail: String },

    /// The assembled document could not be written to a byte buffer.
    #[error("Failed to serialise PDF: {0}")]
    SerializationFailure(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Png2PdfError {
    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        Png2PdfError::InvalidInput {
            reason: reason.into(),
        }
    }

    /// The generic, user-facing text for this failure.
    ///
    /// Every variant maps to the same message; details belong in logs.
    pub fn user_message(&self) -> &'static str {
        CONVERSION_FAILED_MESSAGE
    }

    /// 1-indexed page the failure is attributed to, when there is one.
    pub fn page(&self) -> Option<usize> {
        match self {
            Png2PdfError::DecodeFailure { page, .. } | Png2PdfError::EmbedFailure { page, .. } => {
                Some(*page)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_failure_display() {
        let e = Png2PdfError::DecodeFailure {
            page: 3,
            detail: "bad crc".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("image 3"), "got: {msg}");
        assert!(msg.contains("bad crc"));
    }

    #[test]
    fn embed_failure_reports_page() {
        let e = Png2PdfError::EmbedFailure {
            page: 2,
            detail: "non-finite placement".into(),
        };
        assert_eq!(e.page(), Some(2));
        assert!(e.to_string().contains("page 2"));
    }

    #[test]
    fn invalid_input_has_no_page() {
        let e = Png2PdfError::invalid_input("no images supplied");
        assert_eq!(e.page(), None);
        assert!(e.to_string().contains("no images supplied"));
    }

    #[test]
    fn every_variant_shares_user_message() {
        let errors = [
            Png2PdfError::invalid_input("empty"),
            Png2PdfError::SerializationFailure("disk full".into()),
            Png2PdfError::InvalidConfig("page width".into()),
        ];
        for e in errors {
            assert_eq!(e.user_message(), CONVERSION_FAILED_MESSAGE);
        }
    }

    #[test]
    fn output_write_failed_keeps_source() {
        use std::error::Error as _;
        let e = Png2PdfError::OutputWriteFailed {
            path: PathBuf::from("/ro/out.pdf"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().contains("/ro/out.pdf"));
    }
}
