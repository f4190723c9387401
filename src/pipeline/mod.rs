//! Pipeline stages for PNG-to-PDF conversion.
//!
//! Each submodule implements exactly one transformation step, so each can be
//! tested without the others.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ decode ──▶ embed ──▶ document
//! (paths)   (pixels)   (XObject)  (lopdf)
//! ```
//!
//! 1. [`input`]   : filter paths down to PNG files and read them in order
//! 2. [`decode`]  : decode bytes into an [`decode::ImageAsset`]; runs in
//!    `spawn_blocking` because decompression is CPU-bound
//! 3. [`embed`]   : compress pixels into image XObject data
//! 4. [`document`]: collect pages and serialise the PDF
//!
//! Placement between decode and embed is computed by [`crate::layout`].

pub mod decode;
pub mod document;
pub mod embed;
pub mod input;
