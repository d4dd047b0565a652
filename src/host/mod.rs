// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Host file-system capabilities
//!
//! A picked folder is only reachable through these handles. Permission for
//! read-write access has to be queried and, if needed, requested before the
//! organizer mutates anything.

pub mod local;
pub mod memory;

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::Result;

/// Access mode a permission applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    Read,
    ReadWrite,
}

/// Permission state for one access mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    /// Not requested yet
    Prompt,
    Granted,
    Denied,
}

/// File contents plus the metadata the host reports for it
#[derive(Debug, Clone)]
pub struct FileData {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl FileData {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// One direct child of a directory
#[derive(Clone)]
pub enum DirEntry {
    File(Arc<dyn FileHandle>),
    Directory(String),
}

impl fmt::Debug for DirEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DirEntry::File(handle) => f.debug_tuple("File").field(&handle.name()).finish(),
            DirEntry::Directory(name) => f.debug_tuple("Directory").field(name).finish(),
        }
    }
}

/// Reference to a folder the user picked
#[async_trait]
pub trait DirectoryHandle: Send + Sync {
    /// Display name of the folder
    fn name(&self) -> &str;

    /// Direct children, not recursive
    async fn entries(&self) -> Result<Vec<DirEntry>>;

    async fn query_permission(&self, mode: AccessMode) -> Result<PermissionState>;

    async fn request_permission(&self, mode: AccessMode) -> Result<PermissionState>;

    /// Open a child directory, creating it when `create` is set
    async fn get_directory(&self, name: &str, create: bool) -> Result<Arc<dyn DirectoryHandle>>;

    /// Open a child file, creating it empty when `create` is set
    async fn get_file(&self, name: &str, create: bool) -> Result<Arc<dyn FileHandle>>;

    /// Remove a child entry
    async fn remove_entry(&self, name: &str) -> Result<()>;
}

/// Reference to a file inside a picked folder
#[async_trait]
pub trait FileHandle: Send + Sync {
    fn name(&self) -> &str;

    /// Read the whole file into memory
    async fn read(&self) -> Result<FileData>;

    /// Open a stream that replaces the file contents once closed
    async fn create_writable(&self) -> Result<Box<dyn WritableStream>>;
}

/// Write side of a file
#[async_trait]
pub trait WritableStream: Send {
    async fn write(&mut self, data: &[u8]) -> Result<()>;

    async fn close(&mut self) -> Result<()>;
}

/// Lets the user choose a folder.
///
/// Returns [`crate::SortwiseError::PickerCancelled`] when the user backs out.
#[async_trait]
pub trait DirectoryPicker: Send + Sync {
    async fn pick_directory(&self) -> Result<Arc<dyn DirectoryHandle>>;
}

/// Make sure read-write access is granted, asking once if it is not
pub async fn ensure_read_write(dir: &dyn DirectoryHandle) -> Result<PermissionState> {
    let state = dir.query_permission(AccessMode::ReadWrite).await?;
    if state == PermissionState::Granted {
        return Ok(state);
    }
    dir.request_permission(AccessMode::ReadWrite).await
}

/// Guess a MIME type from the file extension, empty when unknown
pub fn guess_mime(name: &str) -> String {
    mime_guess::from_path(name)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime("invoice_march.pdf"), "application/pdf");
        assert_eq!(guess_mime("photo.PNG"), "image/png");
        assert_eq!(guess_mime("README"), "");
    }
}
