//! CLI binary for pdf2img.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig` and reports progress on the terminal.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2img::{
    convert_directory, default_output_dir, discover, engine, ConversionConfig,
    ConversionProgressCallback, ConversionStats, ProgressCallback,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over documents, one log line per
/// document and (in verbose mode) per page.
struct CliProgressCallback {
    bar: ProgressBar,
    show_pages: bool,
}

impl CliProgressCallback {
    /// The bar starts as a spinner; `on_run_start` turns it into a counter
    /// once discovery knows how many PDFs there are.
    fn new(show_pages: bool) -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(TICKS),
        );
        bar.set_prefix("Scanning");
        bar.set_message("Looking for PDF files…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar, show_pages })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_run_start(&self, input_root: &Path, _output_root: &Path, documents: usize) {
        self.bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  \
                 [{bar:42.green/238}] {pos:>3}/{len} PDFs  \
                 ⏱ {elapsed_precise}  {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▉▊▋▌▍▎▏  ")
            .tick_strings(TICKS),
        );
        self.bar.set_length(documents as u64);
        self.bar.set_prefix("Converting");
        self.bar.set_message("");
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!(
                "Found {documents} PDF file(s) in {}",
                input_root.display()
            ))
        ));
    }

    fn on_document_start(&self, source: &Path, _index: usize, _total: usize) {
        let name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.bar.set_message(name);
    }

    fn on_page_saved(&self, _source: &Path, page_num: usize, total_pages: usize, image: &Path) {
        if self.show_pages {
            self.bar.println(format!(
                "    {} page {page_num}/{total_pages} → {}",
                dim("·"),
                dim(&image.display().to_string())
            ));
        }
    }

    fn on_document_complete(&self, source: &Path, pages: usize) {
        self.bar.println(format!(
            "  {} {}  {}",
            green("✓"),
            source.display(),
            dim(&format!("{pages} page(s)"))
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, stats: &ConversionStats) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} PDF file(s) → {} image(s) in {}ms",
            green("✔"),
            bold(&stats.documents_converted.to_string()),
            bold(&stats.pages_written.to_string()),
            stats.total_duration_ms
        );
    }

    fn on_run_failed(&self, error: &str) {
        self.bar.abandon();
        eprintln!("{} {}", red("✘"), red(error));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a tree into the default output folder (~/ConvertionPdfToImg)
  pdf2img ~/Documents/scans

  # Choose the output folder
  pdf2img ~/Documents/scans -o ~/Pictures/scans

  # Sharper images
  pdf2img --dpi 150 ~/Documents/scans -o out/

  # Only list what would be converted
  pdf2img --list-only ~/Documents/scans

  # Machine-readable report
  pdf2img --json ~/Documents/scans -o out/ > report.json

OUTPUT LAYOUT:
  <input>/reports/q1.pdf  →  <output>/reports/q1/q1_1.png, q1_2.png, …

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH           Path to an existing libpdfium — skips auto-download
  PDF2IMG_PDFIUM_CACHE_DIR  Override the pdfium cache folder
  RUST_LOG                  Log filter (overrides -v / -q)

  PDFium (~30 MB) is downloaded automatically on first run when no library
  is found, and cached for later runs. Use --no-download to forbid this.
"#;

/// Convert every PDF in a folder tree to per-page PNG images.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2img",
    version,
    about = "Convert every PDF in a folder tree to per-page PNG images",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Folder searched recursively for PDF files.
    input: PathBuf,

    /// Output folder; mirrors the input tree. Default: ~/ConvertionPdfToImg
    #[arg(short, long, env = "PDF2IMG_OUTPUT")]
    output: Option<PathBuf>,

    /// Rendering DPI (36–600). 72 renders one pixel per PDF point.
    #[arg(long, env = "PDF2IMG_DPI", default_value_t = 72,
          value_parser = clap::value_parser!(u32).range(36..=600))]
    dpi: u32,

    /// Cap on the longest edge of each image, in pixels.
    #[arg(long, env = "PDF2IMG_MAX_PIXELS")]
    max_pixels: Option<u32>,

    /// Password for encrypted PDFs (applied to every file).
    #[arg(long, env = "PDF2IMG_PASSWORD")]
    password: Option<String>,

    /// Never download pdfium; fail if no library is found.
    #[arg(long, env = "PDF2IMG_NO_DOWNLOAD")]
    no_download: bool,

    /// Print the PDFs that would be converted, then exit.
    #[arg(long)]
    list_only: bool,

    /// Print a JSON report on stdout.
    #[arg(long, env = "PDF2IMG_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2IMG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs and per-page lines.
    #[arg(short, long, env = "PDF2IMG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2IMG_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs; verbose mode wants both.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let output_root = cli.output.clone().unwrap_or_else(default_output_dir);

    // ── List-only mode ───────────────────────────────────────────────────
    if cli.list_only {
        let jobs = discover(&cli.input, &output_root)
            .await
            .context("Failed to scan input folder")?;

        if cli.json {
            let listing: Vec<_> = jobs
                .iter()
                .map(|j| serde_json::json!({ "source": j.source, "output_dir": j.output_dir }))
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&listing).context("Failed to serialise listing")?
            );
        } else {
            for job in &jobs {
                println!("{}  →  {}", job.source.display(), job.output_dir.display());
            }
            if !cli.quiet {
                eprintln!("{} PDF file(s)", jobs.len());
            }
        }
        return Ok(());
    }

    // ── Ensure PDFium engine is available ───────────────────────────────────
    // First run without a library: download it here, with a progress bar,
    // rather than silently inside the first render.
    if !cli.no_download && !engine::is_library_cached() {
        ensure_engine(cli.quiet)?;
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new(cli.verbose) as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let report = convert_directory(&cli.input, &output_root, &config)
        .await
        .context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet && !show_progress {
        eprintln!(
            "Converted {}/{} PDF file(s) into {} image(s) in {}ms → {}",
            report.stats.documents_converted,
            report.stats.documents_found,
            report.stats.pages_written,
            report.stats.total_duration_ms,
            output_root.display()
        );
    }

    Ok(())
}

/// Download pdfium into the cache, showing a byte progress bar unless quiet.
fn ensure_engine(quiet: bool) -> Result<()> {
    if quiet {
        tokio::task::block_in_place(|| engine::ensure_library(None))
            .context("Failed to download PDFium engine")?;
        return Ok(());
    }

    let dl_bar = ProgressBar::new(0);
    dl_bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS),
    );
    dl_bar.set_prefix("PDF engine");
    dl_bar.enable_steady_tick(Duration::from_millis(80));

    let bar = dl_bar.clone();
    // block_in_place: the download is blocking and borrows the bar.
    tokio::task::block_in_place(|| {
        engine::ensure_library(Some(&|downloaded, total| {
            if let Some(t) = total {
                if bar.length().unwrap_or(0) != t {
                    bar.set_length(t);
                }
            }
            bar.set_position(downloaded);
        }))
    })
    .context("Failed to download PDFium engine")?;

    dl_bar.finish_with_message("ready ✓");
    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .dpi(cli.dpi)
        .auto_download(!cli.no_download);

    if let Some(px) = cli.max_pixels {
        builder = builder.max_rendered_pixels(px);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
