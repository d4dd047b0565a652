// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Local file-system capabilities backed by tokio::fs

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::{
    guess_mime, AccessMode, DirEntry, DirectoryHandle, DirectoryPicker, FileData, FileHandle,
    PermissionState, WritableStream,
};
use crate::{Result, SortwiseError};

/// Decides whether write access to a directory may be granted
pub type Approver = Arc<dyn Fn(&Path) -> bool + Send + Sync>;

/// Approver that always says yes
pub fn approve_all() -> Approver {
    Arc::new(|_: &Path| true)
}

/// Approver that always says no
pub fn deny_all() -> Approver {
    Arc::new(|_: &Path| false)
}

/// A directory on the local disk
pub struct LocalDirectory {
    path: PathBuf,
    name: String,
    approver: Approver,
    write_state: Arc<Mutex<PermissionState>>,
}

impl LocalDirectory {
    /// Open an existing directory
    pub fn open(path: &Path, approver: Approver) -> Result<Self> {
        let meta = std::fs::metadata(path)?;
        if !meta.is_dir() {
            return Err(SortwiseError::FolderRead(format!("{:?} is not a directory", path)));
        }
        Ok(Self {
            path: path.to_path_buf(),
            name: display_name(path),
            approver,
            write_state: Arc::new(Mutex::new(PermissionState::Prompt)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Child directory sharing this directory's write grant
    fn child(&self, name: &str) -> Self {
        Self {
            path: self.path.join(name),
            name: name.to_string(),
            approver: self.approver.clone(),
            write_state: self.write_state.clone(),
        }
    }

    fn write_state(&self) -> Result<PermissionState> {
        self.write_state
            .lock()
            .map(|s| *s)
            .map_err(|e| SortwiseError::Organize(format!("Permission lock poisoned: {}", e)))
    }

    fn set_write_state(&self, state: PermissionState) -> Result<()> {
        let mut guard = self.write_state
            .lock()
            .map_err(|e| SortwiseError::Organize(format!("Permission lock poisoned: {}", e)))?;
        *guard = state;
        Ok(())
    }
}

#[async_trait]
impl DirectoryHandle for LocalDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    async fn entries(&self) -> Result<Vec<DirEntry>> {
        let mut reader = tokio::fs::read_dir(&self.path).await?;
        let mut entries = Vec::new();

        while let Some(entry) = reader.next_entry().await? {
            // Entries are addressed by name later on; a lossy name could point at another file.
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    warn!("Skipping entry with a non UTF-8 name: {:?}", raw);
                    continue;
                }
            };
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                entries.push(DirEntry::Directory(name));
            } else if file_type.is_file() {
                entries.push(DirEntry::File(Arc::new(LocalFile::new(entry.path(), name))));
            }
        }

        Ok(entries)
    }

    async fn query_permission(&self, mode: AccessMode) -> Result<PermissionState> {
        match mode {
            AccessMode::Read => Ok(PermissionState::Granted),
            AccessMode::ReadWrite => self.write_state(),
        }
    }

    async fn request_permission(&self, mode: AccessMode) -> Result<PermissionState> {
        if mode == AccessMode::Read {
            return Ok(PermissionState::Granted);
        }

        if self.write_state()? == PermissionState::Granted {
            return Ok(PermissionState::Granted);
        }

        let readonly = tokio::fs::metadata(&self.path).await?.permissions().readonly();
        let state = if !readonly && (self.approver)(&self.path) {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        };

        info!("Write permission for {:?}: {:?}", self.path, state);
        self.set_write_state(state)?;
        Ok(state)
    }

    async fn get_directory(&self, name: &str, create: bool) -> Result<Arc<dyn DirectoryHandle>> {
        check_entry_name(name)?;
        let child = self.child(name);

        match tokio::fs::metadata(&child.path).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => {
                return Err(SortwiseError::Organize(format!(
                    "{:?} exists and is not a directory",
                    child.path
                )))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && create => {
                tokio::fs::create_dir(&child.path).await?;
                debug!("Created directory {:?}", child.path);
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SortwiseError::NotFound(child.path.display().to_string()))
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Arc::new(child))
    }

    async fn get_file(&self, name: &str, create: bool) -> Result<Arc<dyn FileHandle>> {
        check_entry_name(name)?;
        let path = self.path.join(name);

        if create {
            tokio::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(false)
                .open(&path)
                .await?;
        } else if !tokio::fs::try_exists(&path).await? {
            return Err(SortwiseError::NotFound(path.display().to_string()));
        }

        Ok(Arc::new(LocalFile::new(path, name.to_string())))
    }

    async fn remove_entry(&self, name: &str) -> Result<()> {
        check_entry_name(name)?;
        let path = self.path.join(name);
        let meta = tokio::fs::symlink_metadata(&path).await?;
        if meta.is_dir() {
            tokio::fs::remove_dir(&path).await?;
        } else {
            tokio::fs::remove_file(&path).await?;
        }
        Ok(())
    }
}

/// A file on the local disk
pub struct LocalFile {
    path: PathBuf,
    name: String,
}

impl LocalFile {
    pub fn new(path: PathBuf, name: String) -> Self {
        Self { path, name }
    }
}

#[async_trait]
impl FileHandle for LocalFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self) -> Result<FileData> {
        let bytes = tokio::fs::read(&self.path).await?;
        Ok(FileData {
            name: self.name.clone(),
            mime: guess_mime(&self.name),
            bytes,
        })
    }

    async fn create_writable(&self) -> Result<Box<dyn WritableStream>> {
        let swap = swap_path(&self.path);
        let file = tokio::fs::File::create(&swap).await?;
        Ok(Box::new(LocalWritable {
            file: Some(file),
            swap,
            target: self.path.clone(),
        }))
    }
}

/// Writes go to a hidden sibling that replaces the target on close
struct LocalWritable {
    file: Option<tokio::fs::File>,
    swap: PathBuf,
    target: PathBuf,
}

#[async_trait]
impl WritableStream for LocalWritable {
    async fn write(&mut self, data: &[u8]) -> Result<()> {
        match self.file.as_mut() {
            Some(file) => Ok(file.write_all(data).await?),
            None => Err(SortwiseError::Organize("Write after close".to_string())),
        }
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut file) = self.file.take() {
            file.flush().await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&self.swap, &self.target).await?;
        }
        Ok(())
    }
}

impl Drop for LocalWritable {
    fn drop(&mut self) {
        // Abandoned before close: the target keeps its old contents.
        if self.file.is_some() {
            let _ = std::fs::remove_file(&self.swap);
        }
    }
}

fn swap_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    target.with_file_name(format!(".{}.sortwise-swap", name))
}

/// Picker that hands out a directory chosen up front, e.g. on the command line.
///
/// An absent or blank path counts as a cancelled pick.
pub struct PathPicker {
    path: Option<PathBuf>,
    approver: Approver,
}

impl PathPicker {
    pub fn new(path: Option<PathBuf>, approver: Approver) -> Self {
        let path = path.filter(|p| !p.as_os_str().is_empty());
        Self { path, approver }
    }
}

#[async_trait]
impl DirectoryPicker for PathPicker {
    async fn pick_directory(&self) -> Result<Arc<dyn DirectoryHandle>> {
        let path = self.path.as_ref().ok_or(SortwiseError::PickerCancelled)?;
        let dir = LocalDirectory::open(path, self.approver.clone())
            .map_err(|e| SortwiseError::FolderRead(format!("{:?}: {}", path, e)))?;
        Ok(Arc::new(dir))
    }
}

/// Only plain single-component names are allowed below a picked folder
fn check_entry_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(SortwiseError::Organize(format!("Invalid entry name {:?}", name))),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
