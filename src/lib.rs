//! # pdf2img
//!
//! Batch-convert every PDF in a folder tree into per-page PNG images.
//!
//! The output tree mirrors the input tree, with one folder per PDF holding
//! `<name>_1.png`, `<name>_2.png`, … Documents are converted one at a time
//! and the run stops at the first fault.
//!
//! ## Pipeline Overview
//!
//! ```text
//! input folder
//!  │
//!  ├─ 1. Discover  walk the tree, plan one job per *.pdf (case-insensitive)
//!  ├─ 2. Prepare   create the mirrored output folder for the PDF
//!  ├─ 3. Render    rasterise each page via pdfium (spawn_blocking)
//!  └─ 4. Save      PNG per page + a progress event per image
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2img::{convert_directory, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let report = convert_directory("scans/", "images/", &config).await?;
//!     eprintln!("{} images from {} PDFs",
//!         report.stats.pages_written,
//!         report.stats.documents_converted);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2img` binary (clap + indicatif + anyhow + tracing-subscriber) |
//! | `gui`   | on      | Enables the `pdf2img-gui` binary (slint + rfd) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod engine;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{default_output_dir, ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert_directory, convert_directory_sync, discover};
pub use error::Pdf2ImgError;
pub use output::{ConversionReport, ConversionStats, DocumentResult};
pub use pipeline::discover::PdfJob;
pub use progress::{
    status_line_callback, ConversionProgressCallback, EventCallback, NoopProgressCallback,
    ProgressCallback, ProgressEvent, StatusLine,
};
pub use stream::{convert_directory_stream, EventStream};
