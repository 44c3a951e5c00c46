//! Tree traversal: find every PDF under the input root and decide where its
//! page images go.
//!
//! The output tree mirrors the input tree, with one extra folder per PDF:
//!
//! ```text
//! input/                      output/
//! ├── a.pdf          ──▶      ├── a/a_1.png, a/a_2.png …
//! └── reports/                └── reports/
//!     └── q1.PDF     ──▶          └── q1/q1_1.png …
//! ```
//!
//! Entries are visited in sorted order, files of a folder before its
//! subfolders, so two runs over the same tree log the same lines.

use crate::error::Pdf2ImgError;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File extension recognised as a PDF, compared case-insensitively.
pub const PDF_EXTENSION: &str = "pdf";

/// Extension of the page images written for each PDF.
pub const IMAGE_EXTENSION: &str = "png";

/// One PDF found in the input tree, with its mirrored output location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfJob {
    /// Path of the PDF (input root joined with the relative path).
    pub source: PathBuf,
    /// Folder of the PDF relative to the input root; empty at the top level.
    pub relative_dir: PathBuf,
    /// File name without its final extension. Kept as an `OsString` so
    /// names that are not valid UTF-8 survive unchanged.
    pub stem: OsString,
    /// `output_root / relative_dir / stem`.
    pub output_dir: PathBuf,
}

impl PdfJob {
    /// Path of the image for `page_num` (1-based).
    pub fn page_image_path(&self, page_num: usize) -> PathBuf {
        page_image_path(&self.output_dir, &self.stem, page_num)
    }
}

/// `output_dir / "{stem}_{page_num}.png"`.
pub fn page_image_path(output_dir: &Path, stem: &OsStr, page_num: usize) -> PathBuf {
    let mut name = stem.to_os_string();
    name.push(format!("_{page_num}.{IMAGE_EXTENSION}"));
    output_dir.join(name)
}

/// `true` when `name` ends in `.pdf`, ignoring case. Works on the raw bytes,
/// so names that are not valid UTF-8 still match.
pub fn is_pdf_name(name: &OsStr) -> bool {
    let bytes = name.as_encoded_bytes();
    let suffix_len = PDF_EXTENSION.len() + 1;
    bytes.len() >= suffix_len && {
        let (dot, ext) = bytes[bytes.len() - suffix_len..].split_at(1);
        dot == b"." && ext.eq_ignore_ascii_case(PDF_EXTENSION.as_bytes())
    }
}

/// Walk `input_root` recursively and return one [`PdfJob`] per PDF.
///
/// # Errors
/// - [`Pdf2ImgError::InputDirNotFound`] / [`Pdf2ImgError::NotADirectory`]
///   when the root is unusable
/// - [`Pdf2ImgError::DirectoryRead`] when any folder in the tree cannot be
///   listed; the walk does not skip unreadable folders
pub fn discover_pdfs(input_root: &Path, output_root: &Path) -> Result<Vec<PdfJob>, Pdf2ImgError> {
    if !input_root.exists() {
        return Err(Pdf2ImgError::InputDirNotFound {
            path: input_root.to_path_buf(),
        });
    }
    if !input_root.is_dir() {
        return Err(Pdf2ImgError::NotADirectory {
            path: input_root.to_path_buf(),
        });
    }

    let mut jobs = Vec::new();
    walk(input_root, Path::new(""), output_root, &mut jobs)?;
    debug!("Discovered {} PDF(s) under {}", jobs.len(), input_root.display());
    Ok(jobs)
}

fn walk(
    dir: &Path,
    relative_dir: &Path,
    output_root: &Path,
    jobs: &mut Vec<PdfJob>,
) -> Result<(), Pdf2ImgError> {
    let read_err = |source| Pdf2ImgError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = fs::read_dir(dir)
        .map_err(read_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_err)?;
    entries.sort_by_key(|e| e.file_name());

    let mut subdirs = Vec::new();

    for entry in entries {
        let path = entry.path();
        // file_type() does not follow symlinks: linked folders are not walked.
        let file_type = entry.file_type().map_err(read_err)?;
        let name = entry.file_name();

        if file_type.is_dir() {
            subdirs.push((path, name));
            continue;
        }

        // A symlink counts when it resolves to a regular file.
        if is_pdf_name(&name) && path.is_file() {
            let stem = Path::new(&name)
                .file_stem()
                .map(OsStr::to_os_string)
                .unwrap_or_default();
            jobs.push(PdfJob {
                output_dir: output_root.join(relative_dir).join(&stem),
                source: path,
                relative_dir: relative_dir.to_path_buf(),
                stem,
            });
        }
    }

    for (path, name) in subdirs {
        walk(&path, &relative_dir.join(name), output_root, jobs)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let p = root.join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, b"%PDF-1.4\n").unwrap();
    }

    #[test]
    fn pdf_name_matching_ignores_case() {
        let pdf = |n: &str| is_pdf_name(OsStr::new(n));
        assert!(pdf("a.pdf"));
        assert!(pdf("B.PDF"));
        assert!(pdf("c.Pdf"));
        assert!(pdf(".pdf"));
        assert!(pdf("résumé.pdf"));
        assert!(!pdf("pdf"));
        assert!(!pdf("notes.pdf.txt"));
        assert!(!pdf("scan.pdfx"));
        assert!(!pdf("résumé"));
        assert!(!pdf("xpdf"));
    }

    #[test]
    fn page_image_naming_is_one_based() {
        let p = page_image_path(Path::new("out/reports/q1"), OsStr::new("q1"), 1);
        assert_eq!(p, PathBuf::from("out/reports/q1/q1_1.png"));
    }

    #[test]
    fn missing_root_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = discover_pdfs(&tmp.path().join("nope"), tmp.path()).unwrap_err();
        assert!(matches!(err, Pdf2ImgError::InputDirNotFound { .. }));
    }

    #[test]
    fn file_root_is_an_error() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "single.pdf");
        let err = discover_pdfs(&tmp.path().join("single.pdf"), tmp.path()).unwrap_err();
        assert!(matches!(err, Pdf2ImgError::NotADirectory { .. }));
    }

    #[test]
    fn mirrors_tree_in_sorted_order() {
        let input = TempDir::new().unwrap();
        let root = input.path();
        touch(root, "b.pdf");
        touch(root, "a.PDF");
        touch(root, "notes.txt");
        touch(root, "reports/2024/q1.pdf");
        touch(root, "reports/summary.v2.pdf");
        touch(root, "empty/readme.md");

        let out = Path::new("/out");
        let jobs = discover_pdfs(root, out).unwrap();
        let sources: Vec<_> = jobs
            .iter()
            .map(|j| j.source.strip_prefix(root).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            sources,
            vec![
                PathBuf::from("a.PDF"),
                PathBuf::from("b.pdf"),
                PathBuf::from("reports/summary.v2.pdf"),
                PathBuf::from("reports/2024/q1.pdf"),
            ]
        );

        assert_eq!(jobs[0].stem, "a");
        assert_eq!(jobs[0].relative_dir, PathBuf::new());
        assert_eq!(jobs[0].output_dir, PathBuf::from("/out/a"));

        assert_eq!(jobs[2].stem, "summary.v2");
        assert_eq!(jobs[2].output_dir, PathBuf::from("/out/reports/summary.v2"));

        assert_eq!(jobs[3].relative_dir, PathBuf::from("reports/2024"));
        assert_eq!(
            jobs[3].page_image_path(2),
            PathBuf::from("/out/reports/2024/q1/q1_2.png")
        );
    }

    #[test]
    fn folder_named_like_pdf_is_walked_not_converted() {
        let input = TempDir::new().unwrap();
        touch(input.path(), "bundle.pdf/inner.pdf");
        let jobs = discover_pdfs(input.path(), Path::new("/out")).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].relative_dir, PathBuf::from("bundle.pdf"));
        assert_eq!(jobs[0].stem, "inner");
    }

    #[test]
    fn empty_tree_yields_no_jobs() {
        let input = TempDir::new().unwrap();
        assert!(discover_pdfs(input.path(), Path::new("/out"))
            .unwrap()
            .is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_folders_are_not_followed() {
        let input = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        touch(elsewhere.path(), "outside.pdf");
        touch(input.path(), "inside.pdf");
        std::os::unix::fs::symlink(elsewhere.path(), input.path().join("link")).unwrap();
        std::os::unix::fs::symlink(
            elsewhere.path().join("outside.pdf"),
            input.path().join("linked.pdf"),
        )
        .unwrap();

        let jobs = discover_pdfs(input.path(), Path::new("/out")).unwrap();
        let stems: Vec<_> = jobs.iter().map(|j| j.stem.to_str().unwrap()).collect();
        assert_eq!(stems, vec!["inside", "linked"]);
    }

    // Linux file systems accept arbitrary bytes in names; APFS does not.
    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_pdf_names_are_kept() {
        use std::os::unix::ffi::OsStrExt;

        let input = TempDir::new().unwrap();
        let name = OsStr::from_bytes(b"caf\xe9.pdf");
        fs::write(input.path().join(name), b"%PDF-1.4\n").unwrap();

        let jobs = discover_pdfs(input.path(), Path::new("/out")).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].stem, OsStr::from_bytes(b"caf\xe9"));
        assert_eq!(
            jobs[0].page_image_path(1),
            Path::new("/out")
                .join(OsStr::from_bytes(b"caf\xe9"))
                .join(OsStr::from_bytes(b"caf\xe9_1.png"))
        );
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subfolder_stops_the_walk() {
        use std::os::unix::fs::PermissionsExt;

        let input = TempDir::new().unwrap();
        touch(input.path(), "ok.pdf");
        touch(input.path(), "locked/hidden.pdf");
        let locked = input.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // root can list anything; nothing to check then.
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            println!("SKIP: folder permissions are not enforced for this user");
            return;
        }

        let result = discover_pdfs(input.path(), Path::new("/out"));
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        match result {
            Err(Pdf2ImgError::DirectoryRead { path, .. }) => assert_eq!(path, locked),
            other => panic!("expected DirectoryRead, got {other:?}"),
        }
    }
}
