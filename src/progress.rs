//! Progress events, the callback trait that receives them, and the status
//! lines they render to.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the run walks the tree. Front ends that only want text (the GUI
//! log view) wrap a line sink with [`status_line_callback`].
//!
//! # Example
//!
//! ```rust
//! use pdf2img::{status_line_callback, ConversionConfig};
//! use std::sync::{Arc, Mutex};
//!
//! let lines = Arc::new(Mutex::new(Vec::<String>::new()));
//! let sink = lines.clone();
//! let cb = status_line_callback(move |line| sink.lock().unwrap().push(line));
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(cb))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::ConversionStats;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One step of a conversion run.
///
/// `Display` renders the status line shown in the GUI log view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// The tree has been scanned; `documents` PDFs will be converted.
    RunStarted {
        input_root: PathBuf,
        output_root: PathBuf,
        documents: usize,
    },
    /// Conversion of one PDF begins. `index` is 1-based.
    DocumentStarted {
        source: PathBuf,
        index: usize,
        total: usize,
    },
    /// One page image has been written. `page_num` is 1-based.
    PageSaved {
        source: PathBuf,
        page_num: usize,
        total_pages: usize,
        image: PathBuf,
    },
    /// Every page of one PDF has been written.
    DocumentFinished { source: PathBuf, pages: usize },
    /// The whole tree has been converted.
    RunFinished { stats: ConversionStats },
    /// The run stopped at its first fault.
    RunFailed { error: String },
}

impl ProgressEvent {
    /// `true` for the two events that end a run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProgressEvent::RunFinished { .. } | ProgressEvent::RunFailed { .. }
        )
    }
}

impl fmt::Display for ProgressEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressEvent::RunStarted { documents, .. } => {
                write!(f, "🚀 Starting conversion of {documents} PDF file(s)...")
            }
            ProgressEvent::DocumentStarted { source, .. } => {
                write!(f, "🔄 Converting {}...", source.display())
            }
            ProgressEvent::PageSaved {
                page_num, image, ..
            } => write!(f, "✅ Page {page_num} → {}", image.display()),
            ProgressEvent::DocumentFinished { source, pages } => {
                write!(f, "📄 {} done ({pages} page(s))", source.display())
            }
            ProgressEvent::RunFinished { stats } => write!(
                f,
                "✅ Conversion finished: {} PDF file(s), {} image(s).",
                stats.documents_converted, stats.pages_written
            ),
            ProgressEvent::RunFailed { error } => write!(f, "{}", StatusLine::error(error)),
        }
    }
}

/// Status lines that do not come from a run event.
pub struct StatusLine;

impl StatusLine {
    pub fn error(message: &str) -> String {
        format!("❌ Error: {message}")
    }

    /// Shown when the chosen PDF folder is empty or does not exist.
    pub fn invalid_input_dir() -> String {
        Self::error("please select a valid PDF folder.")
    }

    /// Shown when no output folder has been entered.
    pub fn missing_output_dir() -> String {
        Self::error("please select an output folder.")
    }

    /// Shown when a run's event stream ends without a finish or failure event.
    pub fn interrupted() -> String {
        Self::error("the conversion stopped unexpectedly.")
    }
}

/// Called by the conversion loop at each step of a run.
///
/// Methods run on whichever thread performs the step: page events come from
/// the blocking render thread. All methods default to no-ops.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once, after discovery and before the first document.
    fn on_run_start(&self, input_root: &Path, output_root: &Path, documents: usize) {
        let _ = (input_root, output_root, documents);
    }

    /// Called before a document's output folder is created.
    ///
    /// * `index` — 1-based position of the document in traversal order
    fn on_document_start(&self, source: &Path, index: usize, total: usize) {
        let _ = (source, index, total);
    }

    /// Called after each page image is written.
    fn on_page_saved(&self, source: &Path, page_num: usize, total_pages: usize, image: &Path) {
        let _ = (source, page_num, total_pages, image);
    }

    /// Called after the last page of a document is written.
    fn on_document_complete(&self, source: &Path, pages: usize) {
        let _ = (source, pages);
    }

    /// Called once when every document has been converted.
    fn on_run_complete(&self, stats: &ConversionStats) {
        let _ = stats;
    }

    /// Called once when the run stops on an error.
    fn on_run_failed(&self, error: &str) {
        let _ = error;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

/// Turns every callback into a [`ProgressEvent`] and hands it to `F`.
///
/// The building block for both [`status_line_callback`] and the event stream.
pub struct EventCallback<F> {
    sink: F,
}

impl<F> EventCallback<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    pub fn new(sink: F) -> Self {
        Self { sink }
    }
}

impl<F> ConversionProgressCallback for EventCallback<F>
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn on_run_start(&self, input_root: &Path, output_root: &Path, documents: usize) {
        (self.sink)(ProgressEvent::RunStarted {
            input_root: input_root.to_path_buf(),
            output_root: output_root.to_path_buf(),
            documents,
        });
    }

    fn on_document_start(&self, source: &Path, index: usize, total: usize) {
        (self.sink)(ProgressEvent::DocumentStarted {
            source: source.to_path_buf(),
            index,
            total,
        });
    }

    fn on_page_saved(&self, source: &Path, page_num: usize, total_pages: usize, image: &Path) {
        (self.sink)(ProgressEvent::PageSaved {
            source: source.to_path_buf(),
            page_num,
            total_pages,
            image: image.to_path_buf(),
        });
    }

    fn on_document_complete(&self, source: &Path, pages: usize) {
        (self.sink)(ProgressEvent::DocumentFinished {
            source: source.to_path_buf(),
            pages,
        });
    }

    fn on_run_complete(&self, stats: &ConversionStats) {
        (self.sink)(ProgressEvent::RunFinished {
            stats: stats.clone(),
        });
    }

    fn on_run_failed(&self, error: &str) {
        (self.sink)(ProgressEvent::RunFailed {
            error: error.to_string(),
        });
    }
}

/// Renders every event as its status line and hands the line to `sink`.
///
/// Failures render through [`StatusLine::error`], so a log view fed only by
/// this callback shows the same text for every outcome.
pub fn status_line_callback<F>(sink: F) -> EventCallback<impl Fn(ProgressEvent) + Send + Sync>
where
    F: Fn(String) + Send + Sync,
{
    EventCallback::new(move |event: ProgressEvent| sink(event.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_run_start(Path::new("in"), Path::new("out"), 2);
        cb.on_document_start(Path::new("in/a.pdf"), 1, 2);
        cb.on_page_saved(Path::new("in/a.pdf"), 1, 1, Path::new("out/a/a_1.png"));
        cb.on_document_complete(Path::new("in/a.pdf"), 1);
        cb.on_run_complete(&ConversionStats::default());
        cb.on_run_failed("boom");
    }

    #[test]
    fn status_lines_match_log_format() {
        let started = ProgressEvent::DocumentStarted {
            source: PathBuf::from("in/sub/report.pdf"),
            index: 1,
            total: 3,
        };
        assert_eq!(started.to_string(), "🔄 Converting in/sub/report.pdf...");

        let page = ProgressEvent::PageSaved {
            source: PathBuf::from("in/sub/report.pdf"),
            page_num: 2,
            total_pages: 4,
            image: PathBuf::from("out/sub/report/report_2.png"),
        };
        assert_eq!(page.to_string(), "✅ Page 2 → out/sub/report/report_2.png");

        let failed = ProgressEvent::RunFailed {
            error: "disk full".into(),
        };
        assert_eq!(failed.to_string(), "❌ Error: disk full");
    }

    #[test]
    fn invalid_input_line() {
        assert_eq!(
            StatusLine::invalid_input_dir(),
            "❌ Error: please select a valid PDF folder."
        );
    }

    #[test]
    fn interrupted_line_is_an_error() {
        assert_eq!(
            StatusLine::interrupted(),
            "❌ Error: the conversion stopped unexpectedly."
        );
    }

    #[test]
    fn terminal_events() {
        assert!(ProgressEvent::RunFinished {
            stats: ConversionStats::default()
        }
        .is_terminal());
        assert!(ProgressEvent::RunFailed { error: "x".into() }.is_terminal());
        assert!(!ProgressEvent::DocumentFinished {
            source: PathBuf::from("a.pdf"),
            pages: 1
        }
        .is_terminal());
    }

    #[test]
    fn status_lines_forwarded_in_order() {
        let lines = Arc::new(Mutex::new(Vec::new()));
        let sink = lines.clone();
        let cb = status_line_callback(move |l| sink.lock().unwrap().push(l));

        cb.on_run_start(Path::new("in"), Path::new("out"), 1);
        cb.on_document_start(Path::new("in/a.pdf"), 1, 1);
        cb.on_page_saved(Path::new("in/a.pdf"), 1, 1, Path::new("out/a/a_1.png"));
        cb.on_document_complete(Path::new("in/a.pdf"), 1);
        cb.on_run_complete(&ConversionStats {
            documents_found: 1,
            documents_converted: 1,
            pages_written: 1,
            total_duration_ms: 5,
        });

        let lines = lines.lock().unwrap();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("🚀"));
        assert!(lines[1].starts_with("🔄"));
        assert_eq!(lines[2], "✅ Page 1 → out/a/a_1.png");
        assert!(lines[3].starts_with("📄"));
        assert!(lines[4].starts_with("✅ Conversion finished"));
    }

    #[test]
    fn event_callback_sees_every_event() {
        let count = Arc::new(AtomicUsize::new(0));
        let terminal = Arc::new(AtomicUsize::new(0));
        let (c, t) = (count.clone(), terminal.clone());
        let cb: ProgressCallback = Arc::new(EventCallback::new(move |ev: ProgressEvent| {
            c.fetch_add(1, Ordering::SeqCst);
            if ev.is_terminal() {
                t.fetch_add(1, Ordering::SeqCst);
            }
        }));

        cb.on_run_start(Path::new("in"), Path::new("out"), 1);
        cb.on_document_start(Path::new("in/a.pdf"), 1, 1);
        cb.on_document_complete(Path::new("in/a.pdf"), 0);
        cb.on_run_failed("late failure");

        assert_eq!(count.load(Ordering::SeqCst), 4);
        assert_eq!(terminal.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn events_serialise_with_tag() {
        let ev = ProgressEvent::DocumentFinished {
            source: PathBuf::from("a.pdf"),
            pages: 2,
        };
        let json = serde_json::to_string(&ev).unwrap();
        assert!(json.contains("\"event\":\"document_finished\""), "got: {json}");
    }
}
