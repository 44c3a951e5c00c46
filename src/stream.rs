//! Streaming API: consume a conversion run as a stream of [`ProgressEvent`]s.
//!
//! ## Why stream?
//!
//! A front end that only shows a log (the GUI) does not want to implement a
//! callback trait or share state with the render thread. It spawns the run,
//! then pulls events off a stream on its own schedule. The stream always ends
//! with exactly one terminal event: [`ProgressEvent::RunFinished`] or
//! [`ProgressEvent::RunFailed`].

use crate::config::ConversionConfig;
use crate::convert::convert_directory;
use crate::progress::{ConversionProgressCallback, EventCallback, ProgressEvent};
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::Stream;
use tracing::debug;

/// A boxed stream of run events.
pub type EventStream = Pin<Box<dyn Stream<Item = ProgressEvent> + Send>>;

/// Start converting `input_root` into `output_root` and return the run's
/// events as a stream.
///
/// The run is spawned onto the current tokio runtime, so this must be called
/// from within one. A callback already present in `config` keeps receiving
/// events alongside the stream. Dropping the stream does not cancel the run.
pub fn convert_directory_stream(
    input_root: impl Into<PathBuf>,
    output_root: impl Into<PathBuf>,
    config: &ConversionConfig,
) -> EventStream {
    let input_root = input_root.into();
    let output_root = output_root.into();
    let (tx, rx) = mpsc::unbounded_channel();

    let upstream = config.progress_callback.clone();
    let forward = EventCallback::new(move |event: ProgressEvent| {
        if let Some(ref cb) = upstream {
            replay(cb.as_ref(), &event);
        }
        // Receiver gone: the caller stopped listening, the run carries on.
        let _ = tx.send(event);
    });

    let mut config = config.clone();
    config.progress_callback = Some(Arc::new(forward));

    tokio::spawn(async move {
        let outcome = convert_directory(&input_root, &output_root, &config).await;
        debug!("Streamed run ended: ok={}", outcome.is_ok());
    });

    Box::pin(UnboundedReceiverStream::new(rx))
}

/// Deliver `event` to a callback as the matching trait method.
fn replay(cb: &dyn ConversionProgressCallback, event: &ProgressEvent) {
    match event {
        ProgressEvent::RunStarted {
            input_root,
            output_root,
            documents,
        } => cb.on_run_start(input_root, output_root, *documents),
        ProgressEvent::DocumentStarted {
            source,
            index,
            total,
        } => cb.on_document_start(source, *index, *total),
        ProgressEvent::PageSaved {
            source,
            page_num,
            total_pages,
            image,
        } => cb.on_page_saved(source, *page_num, *total_pages, image),
        ProgressEvent::DocumentFinished { source, pages } => {
            cb.on_document_complete(source, *pages)
        }
        ProgressEvent::RunFinished { stats } => cb.on_run_complete(stats),
        ProgressEvent::RunFailed { error } => cb.on_run_failed(error),
    }
}
