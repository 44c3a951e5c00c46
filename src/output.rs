//! Result types returned by a conversion run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything produced by a successful [`crate::convert_directory`] run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    /// One entry per converted PDF, in traversal order.
    pub documents: Vec<DocumentResult>,
    pub stats: ConversionStats,
}

/// The images written for one PDF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResult {
    /// The PDF inside the input tree.
    pub source: PathBuf,
    /// Mirrored folder the page images were written to.
    pub output_dir: PathBuf,
    /// Number of pages in the document (and images written).
    pub page_count: usize,
    /// Image paths, page 1 first.
    pub images: Vec<PathBuf>,
}

/// Aggregate counters for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// PDFs discovered in the input tree.
    pub documents_found: usize,
    /// PDFs fully converted.
    pub documents_converted: usize,
    /// Page images written across all documents.
    pub pages_written: usize,
    /// Wall-clock duration of the whole run.
    pub total_duration_ms: u64,
}
