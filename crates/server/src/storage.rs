//! Working directories and upload naming.

use crate::config::StorageConfig;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// The upload, output, and scratch directories shared by all requests.
#[derive(Debug, Clone)]
pub struct WorkDirs {
    upload_dir: PathBuf,
    output_dir: PathBuf,
    temp_dir: PathBuf,
}

impl WorkDirs {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            upload_dir: config.upload_dir.clone(),
            output_dir: config.output_dir.clone(),
            temp_dir: config.temp_dir.clone(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Create any missing directory. Safe to call repeatedly.
    pub async fn ensure(&self) -> io::Result<()> {
        for dir in [&self.upload_dir, &self.output_dir, &self.temp_dir] {
            tokio::fs::create_dir_all(dir).await?;
            log::debug!("Working directory ready: {}", dir.display());
        }
        Ok(())
    }

    /// Write an uploaded deck under a fresh unique name and reserve the
    /// matching output path.
    pub async fn save_upload(&self, original_name: &str, data: &[u8]) -> io::Result<StoredUpload> {
        let id = Uuid::new_v4();
        let upload_path = self
            .upload_dir
            .join(format!("{}_{}", id, sanitize_filename(original_name)));
        let pdf_filename = format!("{}.pdf", id);
        let output_path = self.output_dir.join(&pdf_filename);

        tokio::fs::write(&upload_path, data).await?;
        log::debug!("Saved {} bytes to {}", data.len(), upload_path.display());

        Ok(StoredUpload {
            id,
            upload_path,
            output_path,
            pdf_filename,
        })
    }

    /// Path of a finished PDF, or `None` when `filename` is not a plain file
    /// name inside the output directory.
    pub fn output_path(&self, filename: &str) -> Option<PathBuf> {
        if filename.is_empty()
            || filename.contains(['/', '\\'])
            || filename.contains("..")
            || filename.starts_with('.')
        {
            return None;
        }
        Some(self.output_dir.join(filename))
    }
}

/// A saved upload and where its PDF will go.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub id: Uuid,
    pub upload_path: PathBuf,
    pub output_path: PathBuf,
    pub pdf_filename: String,
}

impl StoredUpload {
    /// URL the finished PDF is served under.
    pub fn pdf_url(&self) -> String {
        format!("/pdf/{}", self.pdf_filename)
    }
}

/// Final path component of `name` with every character outside
/// `[A-Za-z0-9._-]` replaced by `_`.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
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
        "upload.pptx".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dirs(root: &Path) -> WorkDirs {
        WorkDirs::new(&StorageConfig {
            upload_dir: root.join("uploads"),
            output_dir: root.join("outputs"),
            temp_dir: root.join("temp"),
        })
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("My Deck (final).pptx"), "My_Deck__final_.pptx");
        assert_eq!(sanitize_filename("../../etc/passwd.pptx"), "passwd.pptx");
        assert_eq!(sanitize_filename("C:\\Users\\me\\talk.pptx"), "talk.pptx");
        assert_eq!(sanitize_filename("caf\u{e9}.pptx"), "caf_.pptx");
        assert_eq!(sanitize_filename(".."), "upload.pptx");
    }

    #[test]
    fn test_output_path_rejects_traversal() {
        let dirs = dirs(Path::new("/srv"));
        assert_eq!(
            dirs.output_path("abc.pdf"),
            Some(PathBuf::from("/srv/outputs/abc.pdf"))
        );
        assert_eq!(dirs.output_path("../secret.pdf"), None);
        assert_eq!(dirs.output_path("a/b.pdf"), None);
        assert_eq!(dirs.output_path("a\\b.pdf"), None);
        assert_eq!(dirs.output_path(""), None);
    }

    #[tokio::test]
    async fn test_ensure_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let dirs = dirs(root.path());

        dirs.ensure().await.unwrap();
        dirs.ensure().await.unwrap();

        assert!(dirs.upload_dir().is_dir());
        assert!(dirs.output_dir().is_dir());
        assert!(dirs.temp_dir().is_dir());
    }

    #[tokio::test]
    async fn test_save_upload_uses_unique_names() {
        let root = tempfile::tempdir().unwrap();
        let dirs = dirs(root.path());
        dirs.ensure().await.unwrap();

        let first = dirs.save_upload("My Deck.pptx", b"one").await.unwrap();
        let second = dirs.save_upload("My Deck.pptx", b"two").await.unwrap();

        assert_ne!(first.id, second.id);
        assert_ne!(first.upload_path, second.upload_path);
        assert!(first
            .upload_path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with("_My_Deck.pptx")));
        assert_eq!(first.pdf_url(), format!("/pdf/{}.pdf", first.id));
        assert_eq!(std::fs::read(&second.upload_path).unwrap(), b"two");
        assert!(!first.output_path.exists());
    }
}
