//! Locating and binding the pdfium shared library.
//!
//! `pdfium-render` only wraps pdfium; the library itself must be found at
//! runtime. [`bind`] tries, in order:
//!
//! 1. `PDFIUM_LIB_PATH`, when it points to an existing file;
//! 2. the per-version cache folder (see [`library_cache_dir`]);
//! 3. a system-wide pdfium;
//! 4. a download of the platform archive from
//!    [bblanchon/pdfium-binaries](https://github.com/bblanchon/pdfium-binaries)
//!    into the cache folder, unless auto-download is off.
//!
//! Everything here blocks. Call it from `spawn_blocking` or `block_in_place`,
//! never directly from an async task: the download uses `reqwest::blocking`.

use pdfium_render::prelude::Pdfium;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, info, warn};

/// The pdfium-binaries release tag used for downloads.
pub const PDFIUM_VERSION: &str = "7690";

/// Points at an existing pdfium library and skips every other lookup.
pub const LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Overrides the base folder of the download cache.
pub const CACHE_DIR_ENV: &str = "PDF2IMG_PDFIUM_CACHE_DIR";

const RELEASE_URL: &str = "https://github.com/bblanchon/pdfium-binaries/releases/download";

/// Callback receiving `(bytes_downloaded, total_bytes)` during a download.
pub type DownloadProgress<'a> = &'a dyn Fn(u64, Option<u64>);

/// Errors raised while locating, downloading or binding pdfium.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unsupported platform: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("Cache directory error: {0}")]
    CacheDir(#[source] std::io::Error),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Archive extraction failed: {0}")]
    Extract(String),

    #[error("Failed to bind PDFium from '{path}': {reason}")]
    Bind { path: PathBuf, reason: String },

    #[error("No PDFium library found and auto-download is disabled")]
    NotFound,
}

struct Platform {
    /// Release asset, e.g. `pdfium-linux-x64.tgz`.
    archive: &'static str,
    /// Library path inside the archive.
    member: &'static str,
    /// Library file name on disk.
    file_name: &'static str,
}

fn platform() -> Result<Platform, EngineError> {
    const SO: (&str, &str) = ("lib/libpdfium.so", "libpdfium.so");
    const DYLIB: (&str, &str) = ("lib/libpdfium.dylib", "libpdfium.dylib");
    const DLL: (&str, &str) = ("bin/pdfium.dll", "pdfium.dll");

    let (archive, (member, file_name)) = match (std::env::consts::OS, std::env::consts::ARCH) {
        ("linux", "x86_64") => ("pdfium-linux-x64.tgz", SO),
        ("linux", "aarch64") => ("pdfium-linux-arm64.tgz", SO),
        ("macos", "x86_64") => ("pdfium-mac-x64.tgz", DYLIB),
        ("macos", "aarch64") => ("pdfium-mac-arm64.tgz", DYLIB),
        ("windows", "x86_64") => ("pdfium-win-x64.tgz", DLL),
        ("windows", "aarch64") => ("pdfium-win-arm64.tgz", DLL),
        ("windows", "x86") => ("pdfium-win-x86.tgz", DLL),
        (os, arch) => {
            return Err(EngineError::UnsupportedPlatform {
                os: os.to_string(),
                arch: arch.to_string(),
            })
        }
    };

    Ok(Platform {
        archive,
        member,
        file_name,
    })
}

/// Folder the downloaded library is cached in:
/// `<cache>/pdf2img/pdfium-<VERSION>/`, where `<cache>` is
/// `$PDF2IMG_PDFIUM_CACHE_DIR` or the OS cache folder.
pub fn library_cache_dir() -> PathBuf {
    let base = std::env::var_os(CACHE_DIR_ENV)
        .map(PathBuf::from)
        .or_else(|| dirs::cache_dir().map(|c| c.join("pdf2img")))
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache").join("pdf2img")))
        .unwrap_or_else(|| std::env::temp_dir().join("pdf2img"));

    base.join(format!("pdfium-{PDFIUM_VERSION}"))
}

/// Path of a library that can be bound without network access, if any.
pub fn cached_library_path() -> Option<PathBuf> {
    if let Some(p) = std::env::var_os(LIB_PATH_ENV).map(PathBuf::from) {
        if p.is_file() {
            return Some(p);
        }
        warn!("{LIB_PATH_ENV} '{}' does not exist; ignoring", p.display());
    }
    let p = library_cache_dir().join(platform().ok()?.file_name);
    p.is_file().then_some(p)
}

/// `true` when [`cached_library_path`] finds a library.
pub fn is_library_cached() -> bool {
    cached_library_path().is_some()
}

static RESOLVED: OnceLock<PathBuf> = OnceLock::new();

/// Make sure a pdfium library is on disk, downloading it if needed, and
/// return its path. The result is memoised for the life of the process.
pub fn ensure_library(on_progress: Option<DownloadProgress<'_>>) -> Result<PathBuf, EngineError> {
    if let Some(p) = RESOLVED.get() {
        return Ok(p.clone());
    }

    let path = match cached_library_path() {
        Some(p) => p,
        None => download_library(on_progress)?,
    };
    let _ = RESOLVED.set(path.clone());
    Ok(path)
}

/// Bind to pdfium using the lookup order described in the module docs.
pub fn bind(auto_download: bool) -> Result<Pdfium, EngineError> {
    if let Some(p) = RESOLVED.get().cloned().or_else(cached_library_path) {
        return bind_from_path(&p);
    }

    match Pdfium::bind_to_system_library() {
        Ok(bindings) => {
            debug!("Bound to system pdfium");
            return Ok(Pdfium::new(bindings));
        }
        Err(e) => debug!("No system pdfium: {e}"),
    }

    if !auto_download {
        return Err(EngineError::NotFound);
    }
    let p = ensure_library(None)?;
    bind_from_path(&p)
}

/// Bind to the pdfium library at `path`.
pub fn bind_from_path(path: &Path) -> Result<Pdfium, EngineError> {
    Pdfium::bind_to_library(path)
        .map(Pdfium::new)
        .map_err(|e| EngineError::Bind {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

fn download_library(on_progress: Option<DownloadProgress<'_>>) -> Result<PathBuf, EngineError> {
    let platform = platform()?;
    let dir = library_cache_dir();
    let dest = dir.join(platform.file_name);
    let url = format!(
        "{RELEASE_URL}/chromium%2F{PDFIUM_VERSION}/{}",
        platform.archive
    );

    info!("Downloading PDFium {PDFIUM_VERSION} from {url}");
    std::fs::create_dir_all(&dir).map_err(EngineError::CacheDir)?;

    let archive = fetch(&url, on_progress)?;
    extract_member(&archive, platform.member, &dest)?;

    info!("PDFium cached at {}", dest.display());
    Ok(dest)
}

fn fetch(url: &str, on_progress: Option<DownloadProgress<'_>>) -> Result<Vec<u8>, EngineError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("pdf2img/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| EngineError::Download(e.to_string()))?;

    let mut response = client
        .get(url)
        .send()
        .map_err(|e| EngineError::Download(format!("GET {url}: {e}")))?;

    if !response.status().is_success() {
        return Err(EngineError::Download(format!(
            "HTTP {} for {url}",
            response.status()
        )));
    }

    let total = response.content_length();
    let mut buf = Vec::with_capacity(total.unwrap_or(0) as usize);
    let mut chunk = vec![0u8; 64 * 1024];

    loop {
        match response.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                if let Some(cb) = on_progress {
                    cb(buf.len() as u64, total);
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(EngineError::Download(format!("Read error: {e}"))),
        }
    }

    Ok(buf)
}

/// Copy `member` out of a `.tgz` into `dest`.
///
/// The bytes go to a temp file next to `dest` first, so an interrupted
/// extraction never leaves a truncated library in the cache.
fn extract_member(archive: &[u8], member: &str, dest: &Path) -> Result<(), EngineError> {
    let extract_err = |e: std::io::Error| EngineError::Extract(e.to_string());
    let mut tar = tar::Archive::new(flate2::read::GzDecoder::new(archive));

    for entry in tar.entries().map_err(extract_err)? {
        let mut entry = entry.map_err(extract_err)?;
        if entry.path().map_err(extract_err)?.to_string_lossy() != member {
            continue;
        }

        let dir = dest
            .parent()
            .ok_or_else(|| EngineError::Extract(format!("no parent for {}", dest.display())))?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(EngineError::CacheDir)?;
        std::io::copy(&mut entry, &mut tmp).map_err(extract_err)?;
        tmp.persist(dest)
            .map_err(|e| EngineError::Extract(e.error.to_string()))?;
        return Ok(());
    }

    Err(EngineError::Extract(format!(
        "'{member}' not found in archive"
    )))
}
