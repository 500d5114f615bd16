//! Per-request staging files for uploaded bytes.

use crate::types::UploadedDocument;
use faqbot_core::AppResult;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Directory where uploads are written before parsing.
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    /// Create the staging directory if it does not exist.
    pub fn create(dir: impl Into<PathBuf>) -> AppResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        tracing::debug!("Staging directory ready: {:?}", dir);
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write the upload's bytes verbatim to a uniquely named file.
    pub fn stage(&self, document: &UploadedDocument) -> AppResult<StagedFile> {
        let name = format!(
            "{}-{}",
            Uuid::new_v4(),
            sanitize_basename(&document.filename)
        );
        let path = self.dir.join(name);

        fs::write(&path, &document.bytes)?;
        tracing::debug!("Staged {} bytes at {:?}", document.bytes.len(), path);

        Ok(StagedFile { path })
    }
}

/// A staged upload. The file is removed when this is dropped.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!("Failed to remove staged file {:?}: {}", self.path, e);
        }
    }
}

/// Last path component of an uploaded name, restricted to a safe charset.
fn sanitize_basename(filename: &str) -> String {
    let base = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.trim_matches('.').is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_staging_dir_created() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("nested/staging");

        let staging = StagingArea::create(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(staging.dir(), dir.as_path());

        // Idempotent
        assert!(StagingArea::create(&dir).is_ok());
    }

    #[test]
    fn test_stage_writes_bytes_and_removes_on_drop() {
        let temp_dir = TempDir::new().unwrap();
        let staging = StagingArea::create(temp_dir.path()).unwrap();
        let document = UploadedDocument::new("notes.txt", b"hello\xffworld".to_vec()).unwrap();

        let staged = staging.stage(&document).unwrap();
        let path = staged.path().to_path_buf();
        assert_eq!(fs::read(&path).unwrap(), b"hello\xffworld");
        assert!(path
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .ends_with("-notes.txt"));

        drop(staged);
        assert!(!path.exists());
    }

    #[test]
    fn test_same_name_never_collides() {
        let temp_dir = TempDir::new().unwrap();
        let staging = StagingArea::create(temp_dir.path()).unwrap();
        let document = UploadedDocument::new("same.txt", b"x".to_vec()).unwrap();

        let first = staging.stage(&document).unwrap();
        let second = staging.stage(&document).unwrap();
        assert_ne!(first.path(), second.path());
    }

    #[test]
    fn test_staged_path_stays_in_dir() {
        let temp_dir = TempDir::new().unwrap();
        let staging = StagingArea::create(temp_dir.path()).unwrap();
        let document = UploadedDocument::new("../../etc/passwd.txt", b"x".to_vec()).unwrap();

        let staged = staging.stage(&document).unwrap();
        assert_eq!(staged.path().parent().unwrap(), temp_dir.path());
    }

    #[test]
    fn test_sanitize_basename() {
        assert_eq!(sanitize_basename("report.pdf"), "report.pdf");
        assert_eq!(sanitize_basename("dir/sub/report.pdf"), "report.pdf");
        assert_eq!(sanitize_basename("C:\\docs\\my file.txt"), "my_file.txt");
        assert_eq!(sanitize_basename(".."), "upload");
        assert_eq!(sanitize_basename("dir/"), "upload");
    }
}
