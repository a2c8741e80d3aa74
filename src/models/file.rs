//! Source file model.

use std::path::Path;

use crate::error::AppError;

/// A file on disk to be uploaded.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub file_name: String,
    pub file_path: String,
    pub file_size: u64,
}

impl FileEntry {
    /// Resolve a path into a file entry, reading its size from metadata.
    ///
    /// Returns an error if the path does not exist or is not a regular file.
    pub fn from_path(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AppError::Io(format!(
                "Path does not exist: {}",
                path.display()
            )));
        }
        if !path.is_file() {
            return Err(AppError::Io(format!("Not a file: {}", path.display())));
        }
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| AppError::Io(format!("Path has no file name: {}", path.display())))?;
        let metadata = std::fs::metadata(path)?;
        Ok(Self {
            file_name,
            file_path: path.to_string_lossy().to_string(),
            file_size: metadata.len(),
        })
    }
}
