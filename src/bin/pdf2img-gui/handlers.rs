//! Event handlers for the `Logic` callbacks.
//!
//! Threading model:
//! - `slint::spawn_local`: folder dialogs, which must run on the UI thread
//! - tokio runtime: the conversion run and its event stream
//! - `slint::invoke_from_event_loop`: every log line going back to the UI

use crate::form;
use crate::log_view::{append_line, post_line, set_running};
use crate::relay::relay_events;
use pdf2img::{convert_directory_stream, ConversionConfig};
use rfd::AsyncFileDialog;
use slint::ComponentHandle;
use tokio::runtime::Handle;
use tracing::{debug, info};

/// Which form field a folder dialog fills in.
#[derive(Debug, Clone, Copy)]
enum Field {
    PdfDir,
    OutputDir,
}

/// Register all `Logic` callbacks.
///
/// `runtime` is the handle of the tokio runtime owned by `main`; runs are
/// spawned on it so the UI thread never blocks.
pub fn setup_handlers(ui: &crate::AppWindow, runtime: Handle, config: ConversionConfig) {
    ui.global::<crate::Logic>().on_browse_pdf_dir({
        let ui_handle = ui.as_weak();
        move || pick_folder(ui_handle.clone(), Field::PdfDir)
    });

    ui.global::<crate::Logic>().on_browse_output_dir({
        let ui_handle = ui.as_weak();
        move || pick_folder(ui_handle.clone(), Field::OutputDir)
    });

    ui.global::<crate::Logic>().on_start_conversion({
        let ui_handle = ui.as_weak();
        move || {
            let Some(ui) = ui_handle.upgrade() else {
                return;
            };
            start_conversion(&ui, &runtime, &config);
        }
    });
}

/// Open a native folder picker; a cancelled dialog leaves the field as is.
fn pick_folder(ui_handle: slint::Weak<crate::AppWindow>, field: Field) {
    let title = match field {
        Field::PdfDir => "Select the PDF folder",
        Field::OutputDir => "Select the output folder",
    };

    let _ = slint::spawn_local(async move {
        let Some(folder) = AsyncFileDialog::new().set_title(title).pick_folder().await else {
            debug!("{:?} dialog cancelled", field);
            return;
        };
        let Some(ui) = ui_handle.upgrade() else {
            return;
        };

        let path: slint::SharedString = folder.path().display().to_string().into();
        let state = ui.global::<crate::FormState>();
        match field {
            Field::PdfDir => state.set_pdf_dir(path),
            Field::OutputDir => state.set_output_dir(path),
        }
    });
}

fn start_conversion(ui: &crate::AppWindow, runtime: &Handle, config: &ConversionConfig) {
    let state = ui.global::<crate::FormState>();
    if state.get_running() {
        return;
    }

    let request = match form::validate(&state.get_pdf_dir(), &state.get_output_dir()) {
        Ok(request) => request,
        Err(line) => {
            append_line(ui, &line);
            return;
        }
    };

    info!(
        "Starting run: {} → {}",
        request.pdf_dir.display(),
        request.output_dir.display()
    );
    set_running(ui, true);

    let ui_handle = ui.as_weak();
    let config = config.clone();
    runtime.spawn(async move {
        let events =
            convert_directory_stream(request.pdf_dir, request.output_dir, &config);
        relay_events(events, |line, finished| {
            post_line(ui_handle.clone(), line, finished)
        })
        .await;
    });
}
