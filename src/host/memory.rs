// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! In-memory virtual file system
//!
//! Behaves like a picked browser folder: writes land when the stream is
//! closed, permissions start out unrequested. Faults can be injected per file
//! name to exercise the error paths of intake and organize.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{
    guess_mime, AccessMode, DirEntry, DirectoryHandle, DirectoryPicker, FileData, FileHandle,
    PermissionState, WritableStream,
};
use crate::{Result, SortwiseError};

/// Faults shared by every node of one tree
#[derive(Debug, Default)]
struct Faults {
    fail_enumeration: bool,
    fail_permission_query: bool,
    read_failures: HashSet<String>,
    write_failures: HashSet<String>,
    remove_failures: HashSet<String>,
}

#[derive(Debug)]
struct Permissions {
    read_write: PermissionState,
    grant_on_request: bool,
    requests: usize,
}

#[derive(Default)]
struct DirState {
    files: BTreeMap<String, Arc<MemoryFile>>,
    dirs: BTreeMap<String, Arc<MemoryDirectory>>,
}

/// A directory in the virtual file system
pub struct MemoryDirectory {
    name: String,
    state: Mutex<DirState>,
    faults: Arc<Mutex<Faults>>,
    permissions: Arc<Mutex<Permissions>>,
}

/// A file in the virtual file system
pub struct MemoryFile {
    name: String,
    content: Arc<Mutex<Vec<u8>>>,
    faults: Arc<Mutex<Faults>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Test double: a poisoned lock only means an earlier assertion panicked.
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl MemoryDirectory {
    /// New empty root folder with read-write permission not yet requested
    /// and granted on request.
    pub fn root(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            state: Mutex::new(DirState::default()),
            faults: Arc::new(Mutex::new(Faults::default())),
            permissions: Arc::new(Mutex::new(Permissions {
                read_write: PermissionState::Prompt,
                grant_on_request: true,
                requests: 0,
            })),
        })
    }

    fn child(&self, name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            state: Mutex::new(DirState::default()),
            faults: self.faults.clone(),
            permissions: self.permissions.clone(),
        })
    }

    fn new_file(&self, name: &str, bytes: Vec<u8>) -> Arc<MemoryFile> {
        Arc::new(MemoryFile {
            name: name.to_string(),
            content: Arc::new(Mutex::new(bytes)),
            faults: self.faults.clone(),
        })
    }

    /// Add or replace a file
    pub fn insert_file(&self, name: &str, bytes: &[u8]) -> &Self {
        let file = self.new_file(name, bytes.to_vec());
        lock(&self.state).files.insert(name.to_string(), file);
        self
    }

    /// Add an empty subdirectory and return it
    pub fn insert_dir(&self, name: &str) -> Arc<MemoryDirectory> {
        let dir = self.child(name);
        lock(&self.state).dirs.insert(name.to_string(), dir.clone());
        dir
    }

    /// Current contents of a direct child file
    pub fn file_contents(&self, name: &str) -> Option<Vec<u8>> {
        lock(&self.state).files.get(name).map(|f| lock(&f.content).clone())
    }

    pub fn contains_file(&self, name: &str) -> bool {
        lock(&self.state).files.contains_key(name)
    }

    /// A direct child directory
    pub fn subdirectory(&self, name: &str) -> Option<Arc<MemoryDirectory>> {
        lock(&self.state).dirs.get(name).cloned()
    }

    /// Names of direct child files, sorted
    pub fn file_names(&self) -> Vec<String> {
        lock(&self.state).files.keys().cloned().collect()
    }

    /// Names of direct child directories, sorted
    pub fn dir_names(&self) -> Vec<String> {
        lock(&self.state).dirs.keys().cloned().collect()
    }

    /// Set the current read-write state
    pub fn set_permission(&self, state: PermissionState) -> &Self {
        lock(&self.permissions).read_write = state;
        self
    }

    /// Whether a request for read-write access succeeds
    pub fn grant_on_request(&self, grant: bool) -> &Self {
        lock(&self.permissions).grant_on_request = grant;
        self
    }

    /// How many times read-write access was requested
    pub fn permission_requests(&self) -> usize {
        lock(&self.permissions).requests
    }

    pub fn fail_enumeration(&self) -> &Self {
        lock(&self.faults).fail_enumeration = true;
        self
    }

    pub fn fail_permission_query(&self) -> &Self {
        lock(&self.faults).fail_permission_query = true;
        self
    }

    /// Reads of any file with this name fail
    pub fn fail_reads_of(&self, name: &str) -> &Self {
        lock(&self.faults).read_failures.insert(name.to_string());
        self
    }

    /// Writes to any file with this name fail
    pub fn fail_writes_to(&self, name: &str) -> &Self {
        lock(&self.faults).write_failures.insert(name.to_string());
        self
    }

    /// Removing any entry with this name fails
    pub fn fail_removal_of(&self, name: &str) -> &Self {
        lock(&self.faults).remove_failures.insert(name.to_string());
        self
    }
}

#[async_trait]
impl DirectoryHandle for MemoryDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    async fn entries(&self) -> Result<Vec<DirEntry>> {
        if lock(&self.faults).fail_enumeration {
            return Err(SortwiseError::FileSystem(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "enumeration refused",
            )));
        }

        let state = lock(&self.state);
        let mut entries: Vec<DirEntry> = state.dirs.keys()
            .map(|name| DirEntry::Directory(name.clone()))
            .collect();
        entries.extend(
            state.files.values().map(|f| DirEntry::File(f.clone() as Arc<dyn FileHandle>)),
        );
        Ok(entries)
    }

    async fn query_permission(&self, mode: AccessMode) -> Result<PermissionState> {
        if lock(&self.faults).fail_permission_query {
            return Err(SortwiseError::Organize("permission query failed".to_string()));
        }
        match mode {
            AccessMode::Read => Ok(PermissionState::Granted),
            AccessMode::ReadWrite => Ok(lock(&self.permissions).read_write),
        }
    }

    async fn request_permission(&self, mode: AccessMode) -> Result<PermissionState> {
        if mode == AccessMode::Read {
            return Ok(PermissionState::Granted);
        }
        let mut permissions = lock(&self.permissions);
        permissions.requests += 1;
        if permissions.read_write == PermissionState::Prompt {
            permissions.read_write = if permissions.grant_on_request {
                PermissionState::Granted
            } else {
                PermissionState::Denied
            };
        }
        Ok(permissions.read_write)
    }

    async fn get_directory(&self, name: &str, create: bool) -> Result<Arc<dyn DirectoryHandle>> {
        let mut state = lock(&self.state);
        if state.files.contains_key(name) {
            return Err(SortwiseError::Organize(format!("'{}' is a file", name)));
        }
        if let Some(dir) = state.dirs.get(name) {
            return Ok(dir.clone());
        }
        if !create {
            return Err(SortwiseError::NotFound(name.to_string()));
        }
        let dir = self.child(name);
        state.dirs.insert(name.to_string(), dir.clone());
        Ok(dir)
    }

    async fn get_file(&self, name: &str, create: bool) -> Result<Arc<dyn FileHandle>> {
        let mut state = lock(&self.state);
        if state.dirs.contains_key(name) {
            return Err(SortwiseError::Organize(format!("'{}' is a directory", name)));
        }
        if let Some(file) = state.files.get(name) {
            return Ok(file.clone());
        }
        if !create {
            return Err(SortwiseError::NotFound(name.to_string()));
        }
        let file = self.new_file(name, Vec::new());
        state.files.insert(name.to_string(), file.clone());
        Ok(file)
    }

    async fn remove_entry(&self, name: &str) -> Result<()> {
        if lock(&self.faults).remove_failures.contains(name) {
            return Err(SortwiseError::Organize(format!("cannot remove '{}'", name)));
        }
        let mut state = lock(&self.state);
        if state.files.remove(name).is_some() || state.dirs.remove(name).is_some() {
            Ok(())
        } else {
            Err(SortwiseError::NotFound(name.to_string()))
        }
    }
}

#[async_trait]
impl FileHandle for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self) -> Result<FileData> {
        if lock(&self.faults).read_failures.contains(&self.name) {
            return Err(SortwiseError::FileSystem(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("cannot read '{}'", self.name),
            )));
        }
        Ok(FileData {
            name: self.name.clone(),
            mime: guess_mime(&self.name),
            bytes: lock(&self.content).clone(),
        })
    }

    async fn create_writable(&self) -> Result<Box<dyn WritableStream>> {
        Ok(Box::new(MemoryWritable {
            name: self.name.clone(),
            content: self.content.clone(),
            faults: self.faults.clone(),
            buffer: Vec::new(),
        }))
    }
}

/// Buffers writes and swaps them in on close
struct MemoryWritable {
    name: String,
    content: Arc<Mutex<Vec<u8>>>,
    faults: Arc<Mutex<Faults>>,
    buffer: Vec<u8>,
}

#[async_trait]
impl WritableStream for MemoryWritable {
    async fn write(&mut self, data: &[u8]) -> Result<()> {
        if lock(&self.faults).write_failures.contains(&self.name) {
            return Err(SortwiseError::FileSystem(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("disk full while writing '{}'", self.name),
            )));
        }
        self.buffer.extend_from_slice(data);
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        *lock(&self.content) = std::mem::take(&mut self.buffer);
        Ok(())
    }
}

/// What the picker does when asked for a folder
pub enum PickOutcome {
    Directory(Arc<MemoryDirectory>),
    Cancelled,
    Fail(String),
}

/// Picker returning a scripted outcome
pub struct MemoryPicker {
    outcome: PickOutcome,
}

impl MemoryPicker {
    pub fn new(outcome: PickOutcome) -> Self {
        Self { outcome }
    }

    pub fn returning(dir: Arc<MemoryDirectory>) -> Self {
        Self::new(PickOutcome::Directory(dir))
    }
}

#[async_trait]
impl DirectoryPicker for MemoryPicker {
    async fn pick_directory(&self) -> Result<Arc<dyn DirectoryHandle>> {
        match &self.outcome {
            PickOutcome::Directory(dir) => Ok(dir.clone()),
            PickOutcome::Cancelled => Err(SortwiseError::PickerCancelled),
            PickOutcome::Fail(reason) => Err(SortwiseError::FolderRead(reason.clone())),
        }
    }
}
