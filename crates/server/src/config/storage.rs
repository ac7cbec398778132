//! Working directory configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Locations of the upload, output, and scratch directories
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Saved uploads
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Finished PDFs served by `GET /pdf/{filename}`
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Scratch space for in-progress documents
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,
}

impl StorageConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.upload_dir.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("storage.upload_dir"));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("storage.output_dir"));
        }
        if self.temp_dir.as_os_str().is_empty() {
            return Err(ValidationError::MissingRequired("storage.temp_dir"));
        }
        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            output_dir: default_output_dir(),
            temp_dir: default_temp_dir(),
        }
    }
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_temp_dir() -> PathBuf {
    PathBuf::from("temp")
}
