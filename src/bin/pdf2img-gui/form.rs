//! Validation of the two folder fields before a run starts.

use pdf2img::StatusLine;
use std::path::{Path, PathBuf};

/// Folders for one run, taken from the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    pub pdf_dir: PathBuf,
    pub output_dir: PathBuf,
}

/// Trim both fields and check them.
///
/// The PDF folder must exist; the output folder only has to be non-empty,
/// the run creates it. On rejection the returned line goes to the log.
pub fn validate(pdf_dir: &str, output_dir: &str) -> Result<RunRequest, String> {
    let pdf_dir = pdf_dir.trim();
    let output_dir = output_dir.trim();

    if pdf_dir.is_empty() || !Path::new(pdf_dir).is_dir() {
        return Err(StatusLine::invalid_input_dir());
    }
    if output_dir.is_empty() {
        return Err(StatusLine::missing_output_dir());
    }

    Ok(RunRequest {
        pdf_dir: PathBuf::from(pdf_dir),
        output_dir: PathBuf::from(output_dir),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn empty_pdf_dir_rejected() {
        assert_eq!(validate("   ", "/tmp/out"), Err(StatusLine::invalid_input_dir()));
    }

    #[test]
    fn file_as_pdf_dir_rejected() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.pdf");
        std::fs::write(&file, b"%PDF").unwrap();
        assert_eq!(
            validate(file.to_str().unwrap(), "/tmp/out"),
            Err(StatusLine::invalid_input_dir())
        );
    }

    #[test]
    fn empty_output_dir_rejected() {
        let dir = TempDir::new().unwrap();
        assert_eq!(
            validate(dir.path().to_str().unwrap(), ""),
            Err(StatusLine::missing_output_dir())
        );
    }

    #[test]
    fn fields_are_trimmed() {
        let dir = TempDir::new().unwrap();
        let padded = format!("  {}\t", dir.path().display());
        let req = validate(&padded, " out ").unwrap();
        assert_eq!(req.pdf_dir, dir.path());
        assert_eq!(req.output_dir, PathBuf::from("out"));
    }
}
