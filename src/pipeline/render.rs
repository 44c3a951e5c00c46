//! PDF rasterisation: render every page of one document to a PNG via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which is CPU-bound
//! and not async-aware. `tokio::task::spawn_blocking` moves the work onto the
//! blocking pool so the async side (and the GUI relaying its events) keeps
//! running while pages render.

use crate::config::ConversionConfig;
use crate::engine;
use crate::error::Pdf2ImgError;
use crate::output::DocumentResult;
use crate::pipeline::discover::PdfJob;
use crate::progress::ProgressCallback;
use pdfium_render::prelude::*;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Parameters copied out of [`ConversionConfig`] for the blocking thread.
#[derive(Debug, Clone)]
struct RenderParams {
    scale: f32,
    max_pixels: Option<u32>,
    password: Option<String>,
    auto_download: bool,
}

impl From<&ConversionConfig> for RenderParams {
    fn from(c: &ConversionConfig) -> Self {
        Self {
            scale: c.scale(),
            max_pixels: c.max_rendered_pixels,
            password: c.password.clone(),
            auto_download: c.auto_download,
        }
    }
}

/// Render every page of `job.source` into `job.output_dir`.
///
/// The output folder must already exist. A page that fails to render or
/// save aborts the document; images written before it stay on disk.
pub async fn render_document(
    job: &PdfJob,
    config: &ConversionConfig,
) -> Result<DocumentResult, Pdf2ImgError> {
    let job = job.clone();
    let params = RenderParams::from(config);
    let callback = config.progress_callback.clone();

    tokio::task::spawn_blocking(move || {
        check_pdf_magic(&job.source)?;
        let pdfium = engine::bind(params.auto_download)?;
        render_document_blocking(&pdfium, &job, &params, callback.as_ref())
    })
    .await
    .map_err(|e| Pdf2ImgError::Internal(format!("Render task panicked: {}", e)))?
}

/// Reject files whose first bytes are not `%PDF` before handing them to pdfium.
pub fn check_pdf_magic(path: &Path) -> Result<(), Pdf2ImgError> {
    let mut file = std::fs::File::open(path).map_err(|source| Pdf2ImgError::PdfReadFailed {
        path: path.to_path_buf(),
        source,
    })?;

    let mut magic = [0u8; 4];
    let mut filled = 0;
    while filled < magic.len() {
        match file.read(&mut magic[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(Pdf2ImgError::PdfReadFailed {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }

    if &magic != b"%PDF" {
        return Err(Pdf2ImgError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }
    Ok(())
}

fn render_document_blocking(
    pdfium: &Pdfium,
    job: &PdfJob,
    params: &RenderParams,
    callback: Option<&ProgressCallback>,
) -> Result<DocumentResult, Pdf2ImgError> {
    let password = params.password.as_deref();
    let document = pdfium
        .load_pdf_from_file(&job.source, password)
        .map_err(|e| classify_load_error(&job.source, password.is_some(), e))?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("{}: {} page(s)", job.source.display(), total_pages);

    let mut render_config = PdfRenderConfig::new().scale_page_by_factor(params.scale);
    if let Some(px) = params.max_pixels {
        let limit = pixel_limit(px);
        render_config = render_config
            .set_maximum_width(limit)
            .set_maximum_height(limit);
    }

    let mut images = Vec::with_capacity(total_pages);

    for (idx, page) in pages.iter().enumerate() {
        let page_num = idx + 1;
        let rasterisation_failed = |e: PdfiumError| Pdf2ImgError::RasterisationFailed {
            path: job.source.clone(),
            page: page_num,
            detail: format!("{:?}", e),
        };

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(rasterisation_failed)?;

        // Single fixed output: opaque RGB PNG.
        let image = bitmap.as_image().to_rgb8();
        let image_path = job.page_image_path(page_num);
        image
            .save_with_format(&image_path, image::ImageFormat::Png)
            .map_err(|source| Pdf2ImgError::ImageWriteFailed {
                path: image_path.clone(),
                source,
            })?;

        debug!(
            "Page {}/{} → {} ({}x{} px)",
            page_num,
            total_pages,
            image_path.display(),
            image.width(),
            image.height()
        );
        if let Some(cb) = callback {
            cb.on_page_saved(&job.source, page_num, total_pages, &image_path);
        }
        images.push(image_path);
    }

    Ok(DocumentResult {
        source: job.source.clone(),
        output_dir: job.output_dir.clone(),
        page_count: total_pages,
        images,
    })
}

/// pdfium takes size limits as `i32`; saturate instead of wrapping negative.
fn pixel_limit(px: u32) -> i32 {
    i32::try_from(px).unwrap_or(i32::MAX)
}

/// Map a pdfium load failure to the matching error variant.
fn classify_load_error(path: &Path, had_password: bool, e: PdfiumError) -> Pdf2ImgError {
    let detail = format!("{:?}", e);
    if detail.contains("Password") || detail.contains("password") {
        if had_password {
            Pdf2ImgError::WrongPassword {
                path: path.to_path_buf(),
            }
        } else {
            Pdf2ImgError::PasswordRequired {
                path: path.to_path_buf(),
            }
        }
    } else {
        Pdf2ImgError::CorruptPdf {
            path: path.to_path_buf(),
            detail,
        }
    }
}
