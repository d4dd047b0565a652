// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! File intake: uploaded buffers and picked-folder entries

use std::path::Path;
use std::sync::Arc;

use crate::host::{guess_mime, DirEntry, DirectoryHandle, FileData, FileHandle};
use crate::{Result, SortwiseError};

/// A file handed over in memory, with no link back to where it came from
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub mime: String,
    pub size: u64,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }

    /// Read a file from disk as if it had been uploaded
    pub async fn from_path(path: &Path) -> Result<Self> {
        let name = path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| SortwiseError::NotFound(format!("{:?} has no file name", path)))?;
        let bytes = tokio::fs::read(path).await?;
        let mime = guess_mime(&name);
        Ok(Self::new(name, mime, bytes))
    }
}

/// A folder entry read into memory, still attached to its handle
pub struct FolderFile {
    pub data: FileData,
    pub handle: Arc<dyn FileHandle>,
}

impl std::fmt::Debug for FolderFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FolderFile")
            .field("name", &self.data.name)
            .field("size", &self.data.size())
            .finish()
    }
}

/// Direct file children of a folder; subdirectories are skipped
pub async fn file_handles(dir: &dyn DirectoryHandle) -> Result<Vec<Arc<dyn FileHandle>>> {
    let entries = dir.entries().await?;
    Ok(entries
        .into_iter()
        .filter_map(|entry| match entry {
            DirEntry::File(handle) => Some(handle),
            DirEntry::Directory(_) => None,
        })
        .collect())
}

/// Enumerate a folder and read every direct file into memory.
///
/// Any failure aborts the whole read.
pub async fn read_folder(dir: &dyn DirectoryHandle) -> Result<Vec<FolderFile>> {
    let mut files = Vec::new();
    for handle in file_handles(dir).await? {
        let data = handle.read().await?;
        files.push(FolderFile { data, handle });
    }
    Ok(files)
}
