//! Turns a run's event stream into log lines for the UI.

use futures::{Stream, StreamExt};
use pdf2img::{ProgressEvent, StatusLine};

/// Feed every event's status line to `emit(line, finished)`.
///
/// `finished` is set on the last line of a run. A stream that ends without a
/// terminal event (the run task died) still gets a final error line, so the
/// form is always unlocked.
pub async fn relay_events<S, F>(events: S, mut emit: F)
where
    S: Stream<Item = ProgressEvent>,
    F: FnMut(String, bool),
{
    futures::pin_mut!(events);
    let mut finished = false;
    while let Some(event) = events.next().await {
        finished = event.is_terminal();
        emit(event.to_string(), finished);
    }
    if !finished {
        emit(StatusLine::interrupted(), true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdf2img::ConversionStats;
    use std::path::PathBuf;

    fn started() -> ProgressEvent {
        ProgressEvent::RunStarted {
            input_root: PathBuf::from("in"),
            output_root: PathBuf::from("out"),
            documents: 1,
        }
    }

    async fn collect(events: Vec<ProgressEvent>) -> Vec<(String, bool)> {
        let mut lines = Vec::new();
        relay_events(futures::stream::iter(events), |line, done| {
            lines.push((line, done))
        })
        .await;
        lines
    }

    #[tokio::test]
    async fn finished_run_unlocks_once() {
        let lines = collect(vec![
            started(),
            ProgressEvent::RunFinished {
                stats: ConversionStats::default(),
            },
        ])
        .await;
        assert_eq!(lines.len(), 2);
        assert!(!lines[0].1);
        assert!(lines[1].1);
    }

    #[tokio::test]
    async fn stream_cut_short_still_unlocks() {
        let lines = collect(vec![started()]).await;
        assert_eq!(
            lines,
            vec![
                ("🚀 Starting conversion of 1 PDF file(s)...".to_string(), false),
                (StatusLine::interrupted(), true),
            ]
        );
    }

    #[tokio::test]
    async fn empty_stream_still_unlocks() {
        let lines = collect(Vec::new()).await;
        assert_eq!(lines, vec![(StatusLine::interrupted(), true)]);
    }
}
