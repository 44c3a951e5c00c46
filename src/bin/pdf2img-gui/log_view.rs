//! Helpers that touch the log and run-state properties of `FormState`.
//!
//! All of these must run on the UI thread. Background tasks reach them
//! through [`post_line`], which hops over with `slint::invoke_from_event_loop`.

use slint::{ComponentHandle, Model, ModelRc, SharedString, VecModel};
use std::rc::Rc;
use tracing::warn;

/// Append one line to the log view and scroll to it.
pub fn append_line(ui: &crate::AppWindow, line: &str) {
    let state = ui.global::<crate::FormState>();
    let lines = state.get_log_lines();

    // The model installed by `install_log_model` is a VecModel; anything else
    // means the property was replaced, so start a fresh one.
    match lines.as_any().downcast_ref::<VecModel<SharedString>>() {
        Some(model) => model.push(line.into()),
        None => {
            let mut existing: Vec<SharedString> = lines.iter().collect();
            existing.push(line.into());
            state.set_log_lines(ModelRc::from(Rc::new(VecModel::from(existing))));
        }
    }

    ui.invoke_scroll_log_to_end();
}

/// Give the log view an empty, growable model.
pub fn install_log_model(ui: &crate::AppWindow) {
    ui.global::<crate::FormState>()
        .set_log_lines(ModelRc::from(Rc::new(VecModel::<SharedString>::default())));
}

/// Toggle the running flag; the start button is disabled while it is set.
pub fn set_running(ui: &crate::AppWindow, running: bool) {
    ui.global::<crate::FormState>().set_running(running);
}

/// Deliver a line from any thread. `finished` re-enables the start button.
pub fn post_line(ui_handle: slint::Weak<crate::AppWindow>, line: String, finished: bool) {
    let result = slint::invoke_from_event_loop(move || {
        let Some(ui) = ui_handle.upgrade() else {
            return;
        };
        append_line(&ui, &line);
        if finished {
            set_running(&ui, false);
        }
    });
    if let Err(e) = result {
        warn!("Event loop gone, dropping log line: {}", e);
    }
}
