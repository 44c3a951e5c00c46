// Prevent console window in addition to Slint window in Windows release builds when, e.g., starting the app via file manager. Ignored on other platforms.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

slint::include_modules!();

mod form;
mod handlers;
mod log_view;
mod relay;

use anyhow::{Context, Result};
use pdf2img::{default_output_dir, ConversionConfig};
use slint::ComponentHandle;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Runs live on this runtime; it must outlive the event loop.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("pdf2img-worker")
        .build()
        .context("Failed to start tokio runtime")?;

    let app = AppWindow::new().context("Failed to create window")?;

    let state = app.global::<FormState>();
    state.set_output_dir(default_output_dir().display().to_string().into());
    log_view::install_log_model(&app);

    handlers::setup_handlers(&app, runtime.handle().clone(), ConversionConfig::default());

    app.run().context("UI event loop failed")?;

    // Let an in-flight page finish writing rather than aborting mid-file.
    runtime.shutdown_timeout(std::time::Duration::from_secs(5));
    Ok(())
}
