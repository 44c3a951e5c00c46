//! Run orchestration: walk the tree, then convert each PDF in turn.
//!
//! Documents are converted one at a time, in traversal order. The first
//! error ends the run: the callback receives `on_run_failed` and the error
//! is returned. Use [`crate::stream::convert_directory_stream`] to consume
//! the same run as a stream of events.

use crate::config::ConversionConfig;
use crate::error::Pdf2ImgError;
use crate::output::{ConversionReport, ConversionStats};
use crate::pipeline::discover::{discover_pdfs, PdfJob};
use crate::pipeline::render;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert every PDF under `input_root` into page images under `output_root`.
///
/// # Arguments
/// * `input_root`  — folder searched recursively for `*.pdf`
/// * `output_root` — created if missing; receives the mirrored tree
/// * `config`      — rendering options and progress callback
///
/// # Errors
/// The first fault aborts the run: missing input folder, unreadable folder,
/// output folder creation failure, invalid PDF, render or write failure, or
/// no usable pdfium library.
pub async fn convert_directory(
    input_root: impl AsRef<Path>,
    output_root: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionReport, Pdf2ImgError> {
    let input_root = input_root.as_ref();
    let output_root = output_root.as_ref();

    let result = run(input_root, output_root, config).await;

    if let (Err(e), Some(cb)) = (&result, &config.progress_callback) {
        cb.on_run_failed(&e.to_string());
    }
    result
}

async fn run(
    input_root: &Path,
    output_root: &Path,
    config: &ConversionConfig,
) -> Result<ConversionReport, Pdf2ImgError> {
    let total_start = Instant::now();
    info!(
        "Starting conversion: {} → {}",
        input_root.display(),
        output_root.display()
    );

    // ── Step 1: Prepare output root ──────────────────────────────────────
    create_dir(output_root).await?;

    // ── Step 2: Discover PDFs ────────────────────────────────────────────
    let jobs = discover(input_root, output_root).await?;
    if jobs.is_empty() {
        warn!("No PDF files found under {}", input_root.display());
    }
    let total = jobs.len();

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_start(input_root, output_root, total);
    }

    // ── Step 3: Convert each PDF in order ────────────────────────────────
    let mut documents = Vec::with_capacity(total);
    for (i, job) in jobs.iter().enumerate() {
        info!("[{}/{}] Converting {}", i + 1, total, job.source.display());
        if let Some(ref cb) = config.progress_callback {
            cb.on_document_start(&job.source, i + 1, total);
        }

        create_dir(&job.output_dir).await?;
        let doc = render::render_document(job, config).await?;

        if let Some(ref cb) = config.progress_callback {
            cb.on_document_complete(&doc.source, doc.page_count);
        }
        documents.push(doc);
    }

    // ── Step 4: Stats ────────────────────────────────────────────────────
    let stats = ConversionStats {
        documents_found: total,
        documents_converted: documents.len(),
        pages_written: documents.iter().map(|d| d.images.len()).sum(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} PDF(s), {} image(s), {}ms",
        stats.documents_converted, stats.pages_written, stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_run_complete(&stats);
    }

    Ok(ConversionReport { documents, stats })
}

/// Synchronous wrapper around [`convert_directory`].
///
/// Creates a temporary tokio runtime internally; do not call from async code.
pub fn convert_directory_sync(
    input_root: impl AsRef<Path>,
    output_root: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionReport, Pdf2ImgError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2ImgError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_directory(input_root, output_root, config))
}

/// List the PDFs a run would convert, with their output folders, without
/// touching the output tree or pdfium.
pub async fn discover(
    input_root: impl AsRef<Path>,
    output_root: impl AsRef<Path>,
) -> Result<Vec<PdfJob>, Pdf2ImgError> {
    let input_root = input_root.as_ref().to_path_buf();
    let output_root = output_root.as_ref().to_path_buf();

    tokio::task::spawn_blocking(move || discover_pdfs(&input_root, &output_root))
        .await
        .map_err(|e| Pdf2ImgError::Internal(format!("Discovery task panicked: {}", e)))?
}

async fn create_dir(path: &Path) -> Result<(), Pdf2ImgError> {
    debug!("Creating {}", path.display());
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| Pdf2ImgError::CreateOutputDir {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{EventCallback, ProgressEvent};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn recording_config() -> (ConversionConfig, Arc<Mutex<Vec<ProgressEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let config = ConversionConfig::builder()
            .auto_download(false)
            .progress_callback(Arc::new(EventCallback::new(move |ev| {
                sink.lock().unwrap().push(ev)
            })))
            .build()
            .unwrap();
        (config, events)
    }

    #[tokio::test]
    async fn empty_tree_creates_output_and_finishes() {
        let input = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let output_root = out.path().join("nested/out");
        std::fs::write(input.path().join("notes.txt"), b"not a pdf").unwrap();

        let (config, events) = recording_config();
        let report = convert_directory(input.path(), &output_root, &config)
            .await
            .expect("empty tree converts");

        assert!(output_root.is_dir());
        assert!(report.documents.is_empty());
        assert_eq!(report.stats.documents_found, 0);
        assert_eq!(report.stats.pages_written, 0);

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ProgressEvent::RunStarted { documents: 0, .. }));
        assert!(matches!(events[1], ProgressEvent::RunFinished { .. }));
    }

    #[tokio::test]
    async fn missing_input_reports_failure() {
        let out = TempDir::new().unwrap();
        let (config, events) = recording_config();

        let err = convert_directory(out.path().join("absent"), out.path(), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, Pdf2ImgError::InputDirNotFound { .. }));

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], ProgressEvent::RunFailed { .. }));
    }

    #[tokio::test]
    async fn first_bad_pdf_stops_the_run() {
        let input = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        std::fs::write(input.path().join("a.pdf"), b"garbage").unwrap();
        std::fs::write(input.path().join("b.pdf"), b"garbage too").unwrap();

        let (config, events) = recording_config();
        let err = convert_directory(input.path(), out.path(), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, Pdf2ImgError::NotAPdf { .. }));

        // a.pdf got its folder before failing; b.pdf was never started.
        assert!(out.path().join("a").is_dir());
        assert!(!out.path().join("b").exists());

        let events = events.lock().unwrap();
        let started: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                ProgressEvent::DocumentStarted { source, .. } => Some(source.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(started, vec![input.path().join("a.pdf")]);
        assert!(matches!(events.last(), Some(ProgressEvent::RunFailed { .. })));
    }

    #[tokio::test]
    async fn discover_lists_without_creating_output() {
        let input = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        std::fs::create_dir_all(input.path().join("sub")).unwrap();
        std::fs::write(input.path().join("sub/x.pdf"), b"%PDF").unwrap();

        let output_root = out.path().join("never-created");
        let jobs = discover(input.path(), &output_root).await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].output_dir, output_root.join("sub/x"));
        assert!(!output_root.exists());
    }

    #[test]
    fn sync_wrapper_runs_outside_async() {
        let input = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let report =
            convert_directory_sync(input.path(), out.path(), &ConversionConfig::default())
                .unwrap();
        assert_eq!(report.stats, ConversionStats {
            total_duration_ms: report.stats.total_duration_ms,
            ..ConversionStats::default()
        });
    }
}
