//! Configuration types for PDF-to-image conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The GUI uses the defaults; the CLI maps
//! its flags (and their `PDF2IMG_*` environment fallbacks) onto the builder.

use crate::error::Pdf2ImgError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Name of the output folder created in the user's home directory when no
/// output folder is chosen.
pub const DEFAULT_OUTPUT_DIR_NAME: &str = "ConvertionPdfToImg";

/// Lowest and highest accepted rendering resolution.
pub const MIN_DPI: u32 = 36;
pub const MAX_DPI: u32 = 600;

/// Bounds of `max_rendered_pixels`. pdfium takes the limit as an `i32`.
pub const MIN_RENDERED_PIXELS: u32 = 100;
pub const MAX_RENDERED_PIXELS: u32 = i32::MAX as u32;

/// Configuration for a directory conversion run.
///
/// # Example
/// ```rust
/// use pdf2img::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .dpi(150)
///     .max_rendered_pixels(3000)
///     .build()
///     .unwrap();
/// assert_eq!(config.dpi, 150);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Rendering resolution. Default: 72, i.e. one pixel per PDF point.
    pub dpi: u32,

    /// Cap on the longest edge of a rendered page, in pixels. Default: none.
    ///
    /// At high DPI an A0 poster renders to tens of thousands of pixels per
    /// side; the cap scales such pages down while keeping their aspect ratio.
    pub max_rendered_pixels: Option<u32>,

    /// Password applied to every encrypted PDF in the tree.
    pub password: Option<String>,

    /// Download pdfium into the cache when no library can be found. Default: true.
    pub auto_download: bool,

    /// Receives run/document/page events as the conversion proceeds.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: 72,
            max_rendered_pixels: None,
            password: None,
            auto_download: true,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("auto_download", &self.auto_download)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Scale factor handed to pdfium: PDF user space is 72 units per inch.
    pub fn scale(&self) -> f32 {
        self.dpi as f32 / 72.0
    }
}

/// Builder for [`ConversionConfig`].
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(MIN_DPI, MAX_DPI);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels =
            Some(px.clamp(MIN_RENDERED_PIXELS, MAX_RENDERED_PIXELS));
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn auto_download(mut self, v: bool) -> Self {
        self.config.auto_download = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2ImgError> {
        let c = &self.config;
        if c.dpi < MIN_DPI || c.dpi > MAX_DPI {
            return Err(Pdf2ImgError::InvalidConfig(format!(
                "DPI must be {MIN_DPI}–{MAX_DPI}, got {}",
                c.dpi
            )));
        }
        if let Some(px) = c.max_rendered_pixels {
            if !(MIN_RENDERED_PIXELS..=MAX_RENDERED_PIXELS).contains(&px) {
                return Err(Pdf2ImgError::InvalidConfig(format!(
                    "max rendered pixels must be {MIN_RENDERED_PIXELS}–{MAX_RENDERED_PIXELS}, got {px}"
                )));
            }
        }
        Ok(self.config)
    }
}

/// The output folder offered before the user picks one:
/// `<home>/ConvertionPdfToImg`, or a relative folder when no home is known.
pub fn default_output_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(DEFAULT_OUTPUT_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR_NAME))
}
