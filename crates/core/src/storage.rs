//! Public upload storage.
//!
//! Uploaded assets live under a single on-disk root, organized by resource
//! type. Rows store *public paths* of the form `storage/<dir>/<file>`; the
//! HTTP layer serves the root at `/storage/...` and maps stored paths back
//! to disk through [`Storage::resolve`].
//!
//! File operations are deliberately not transactional with row updates
//! (accepted risk): deletes are best-effort and a missing file is never an
//! error.

use std::path::{Component, Path, PathBuf};

use uuid::Uuid;

use crate::error::CoreError;

/// Subdirectory for category images.
pub const CATEGORIES_DIR: &str = "categories";

/// Subdirectory for project images and brochures.
pub const PROJECTS_DIR: &str = "projects";

/// Subdirectory for sponsor logos.
pub const SPONSORS_DIR: &str = "sponsors";

/// Prefix under which stored paths are exposed over HTTP.
pub const PUBLIC_PREFIX: &str = "storage";

/// Handle to the upload root.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// On-disk root directory (what the HTTP layer serves at `/storage`).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` as `<root>/<dir>/<filename>`, creating the directory if
    /// needed, and return the public path to store in the row.
    pub async fn save(&self, dir: &str, filename: &str, bytes: &[u8]) -> Result<String, CoreError> {
        let target_dir = self.root.join(dir);
        tokio::fs::create_dir_all(&target_dir)
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to create upload dir: {e}")))?;

        tokio::fs::write(target_dir.join(filename), bytes)
            .await
            .map_err(|e| CoreError::Internal(format!("Failed to write upload: {e}")))?;

        Ok(format!("{PUBLIC_PREFIX}/{dir}/{filename}"))
    }

    /// Best-effort delete of a stored public path. Returns whether a file
    /// was actually removed; a missing file or unresolvable path is `false`,
    /// never an error.
    pub async fn delete(&self, public_path: &str) -> bool {
        match self.resolve(public_path) {
            Some(disk_path) => tokio::fs::remove_file(disk_path).await.is_ok(),
            None => false,
        }
    }

    /// Read a stored public path, if it resolves and exists.
    pub async fn read(&self, public_path: &str) -> Option<Vec<u8>> {
        let disk_path = self.resolve(public_path)?;
        tokio::fs::read(disk_path).await.ok()
    }

    /// Map a stored public path (`storage/...`, leading slash tolerated)
    /// back to its on-disk location. Rejects anything that escapes the
    /// root or does not carry the public prefix.
    pub fn resolve(&self, public_path: &str) -> Option<PathBuf> {
        let trimmed = public_path.trim_start_matches('/');
        let relative = trimmed.strip_prefix(PUBLIC_PREFIX)?.strip_prefix('/')?;

        let relative = Path::new(relative);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe || relative.as_os_str().is_empty() {
            return None;
        }

        Some(self.root.join(relative))
    }
}

/// Lowercased extension of an uploaded filename.
pub fn extension(filename: &str) -> Option<String> {
    let ext = filename.rsplit_once('.')?.1;
    if ext.is_empty() || ext.contains(['/', '\\']) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Fresh `uuid.ext` name for an upload, keyed off the client filename's
/// extension.
pub fn unique_filename(original: &str) -> Result<String, CoreError> {
    let ext = extension(original).ok_or_else(|| {
        CoreError::Validation("Uploaded file name has no extension.".into())
    })?;
    Ok(format!("{}.{ext}", Uuid::new_v4()))
}

/// Thumbnail filename derived from its full-size sibling: `name.ext` ->
/// `name_thumb.ext`.
pub fn thumb_filename(full_filename: &str) -> String {
    match full_filename.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}_thumb.{ext}"),
        None => format!("{full_filename}_thumb"),
    }
}
