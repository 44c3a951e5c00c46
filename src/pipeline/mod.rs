//! Pipeline stages for tree-to-images conversion.
//!
//! ```text
//! discover ──▶ render (per PDF, sequential)
//! (walk tree)   (pdfium → PNG per page)
//! ```
//!
//! 1. [`discover`] — walk the input tree and plan one [`discover::PdfJob`] per
//!    PDF, including its mirrored output folder and image names
//! 2. [`render`] — rasterise each page of one PDF and save it; runs in
//!    `spawn_blocking` because pdfium is blocking

pub mod discover;
pub mod render;
