//! Error types for the pdf2img library.
//!
//! There is a single, fatal error type. The conversion loop stops on the
//! first fault: a run either converts every PDF in the tree or returns the
//! [`Pdf2ImgError`] describing the document (and page) it stopped at.
//! Images already written by earlier documents stay on disk.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2img library.
#[derive(Debug, Error)]
pub enum Pdf2ImgError {
    // ── Input tree errors ─────────────────────────────────────────────────
    /// The input root does not exist.
    #[error("Input folder not found: '{path}'\nCheck the path exists and is readable.")]
    InputDirNotFound { path: PathBuf },

    /// The input root exists but is a file, not a folder.
    #[error("Input path is not a folder: '{path}'")]
    NotADirectory { path: PathBuf },

    /// A directory inside the tree could not be listed.
    #[error("Failed to read folder '{path}': {source}")]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Output errors ─────────────────────────────────────────────────────
    /// An output folder could not be created.
    #[error("Failed to create output folder '{path}': {source}")]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A rendered page could not be encoded or written as PNG.
    #[error("Failed to write image '{path}': {source}")]
    ImageWriteFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The PDF file could not be opened for reading.
    #[error("Failed to read PDF '{path}': {source}")]
    PdfReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file has a `.pdf` name but does not start with `%PDF`.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page} of '{path}': {detail}")]
    RasterisationFailed {
        path: PathBuf,
        page: usize,
        detail: String,
    },

    // ── Engine errors ─────────────────────────────────────────────────────
    /// Could not locate, download or bind a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
PDFium is normally downloaded automatically on first run.\n\
If the auto-download failed, you can:\n\
  • Check your internet connection and try again.\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. a panicked render task).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crate::engine::EngineError> for Pdf2ImgError {
    fn from(e: crate::engine::EngineError) -> Self {
        Pdf2ImgError::PdfiumBindingFailed(e.to_string())
    }
}
