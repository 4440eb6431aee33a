//! Media storage for uploaded photos
//!
//! The CRUD layer stores check-in photos through [`MediaStore`] and keeps
//! only the returned reference in the database. The disk-backed
//! implementation writes uuid-named files under the `uploads/` folder so
//! that stored references already carry the canonical marker segment.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use super::photo::UPLOAD_FOLDER;

/// Errors surfaced by photo uploads.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to write media file: {0}")]
    Io(#[from] std::io::Error),
}

/// Storage backend for uploaded photos.
///
/// `upload` returns the reference to persist alongside the record.
/// `delete` is best-effort: failures are logged and swallowed so a missing
/// or locked file never blocks the record mutation that triggered it.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, bytes: &[u8], original_name: &str) -> Result<String, MediaError>;
    async fn delete(&self, reference: &str);
}

/// Disk-backed media store rooted at the service's upload directory.
pub struct DiskMediaStore {
    root: PathBuf,
}

impl DiskMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a stored reference to the file it names inside the root.
    ///
    /// Only the final path component is used, so a reference can never
    /// escape the upload directory.
    fn file_path(&self, reference: &str) -> Option<PathBuf> {
        let name = reference.replace('\\', "/");
        let name = name.rsplit('/').next()?;
        if name.is_empty() {
            return None;
        }
        Some(self.root.join(name))
    }
}

/// File extension taken from the client-supplied name, defaulting to `.jpg`.
fn extension_of(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_else(|| ".jpg".to_string())
}

#[async_trait]
impl MediaStore for DiskMediaStore {
    async fn upload(&self, bytes: &[u8], original_name: &str) -> Result<String, MediaError> {
        let unique_name = format!("{}{}", Uuid::new_v4(), extension_of(original_name));

        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&unique_name), bytes).await?;

        let reference = format!("{UPLOAD_FOLDER}/{unique_name}");
        debug!(reference = %reference, size = bytes.len(), "photo stored");
        Ok(reference)
    }

    async fn delete(&self, reference: &str) {
        let Some(path) = self.file_path(reference) else {
            warn!(reference = %reference, "photo delete skipped, unusable reference");
            return;
        };
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!(reference = %reference, "could not delete photo from storage: {}", e);
        }
    }
}
