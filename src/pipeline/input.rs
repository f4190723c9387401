//! Input collection: turn user-supplied paths into an ordered list of PNGs.
//!
//! The pipeline trusts that every buffer it receives is meant to be an
//! image, so the file-type filter lives here, in front of it. A file is
//! accepted when its name ends in `.png` (any case). Directories are
//! expanded one level deep, sorted by file name, so `scans/` converts in the
//! same order a file browser shows.

use crate::error::Png2PdfError;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// The 8-byte signature every PNG file starts with.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Check whether a path names a PNG file by extension.
pub fn is_png_name(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

/// Check whether a buffer starts with the PNG signature.
pub fn has_png_signature(bytes: &[u8]) -> bool {
    bytes.starts_with(&PNG_SIGNATURE)
}

/// Expand and filter the given paths into the ordered list of PNG files.
///
/// Explicit files keep their command-line order; directory entries are
/// inserted at the directory's position, sorted by name. Non-PNG files are
/// skipped with a warning.
///
/// # Errors
/// - [`Png2PdfError::FileNotFound`] for a path that does not exist
/// - [`Png2PdfError::InvalidInput`] when nothing survives the filter
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>, Png2PdfError> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(path)
                .map_err(|e| io_error(path, e))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && is_png_name(p))
                .collect();
            entries.sort();
            debug!("Expanded {} → {} PNG files", path.display(), entries.len());
            files.extend(entries);
        } else if !path.exists() {
            return Err(Png2PdfError::FileNotFound { path: path.clone() });
        } else if is_png_name(path) {
            files.push(path.clone());
        } else {
            warn!("Skipping non-PNG input: {}", path.display());
        }
    }

    if files.is_empty() {
        return Err(Png2PdfError::invalid_input(
            "no PNG files selected; please select PNG files only",
        ));
    }

    Ok(files)
}

/// Read every file into memory, one after another, preserving order.
pub async fn read_inputs(paths: &[PathBuf]) -> Result<Vec<Vec<u8>>, Png2PdfError> {
    stream::iter(paths)
        .then(|path| async move {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| io_error(path, e))?;
            if !has_png_signature(&bytes) {
                warn!("{} does not start with a PNG signature", path.display());
            }
            debug!("Read {} ({} bytes)", path.display(), bytes.len());
            Ok::<_, Png2PdfError>(bytes)
        })
        .try_collect()
        .await
}

fn io_error(path: &Path, e: std::io::Error) -> Png2PdfError {
    match e.kind() {
        std::io::ErrorKind::NotFound => Png2PdfError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => Png2PdfError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => Png2PdfError::Internal(format!("reading '{}': {e}", path.display())),
    }
}
