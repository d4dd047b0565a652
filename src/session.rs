// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Classified file records and the session state that owns them

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::categories::Category;
use crate::host::{DirectoryHandle, FileHandle};

/// A file after classification.
///
/// Category and handle are fixed at construction. Only files that came from
/// a picked folder carry a handle and can be moved on disk.
#[derive(Clone)]
pub struct OrganizedFile {
    id: String,
    name: String,
    category: Category,
    size: u64,
    mime: String,
    handle: Option<Arc<dyn FileHandle>>,
}

impl OrganizedFile {
    /// Record for an uploaded file
    pub fn uploaded(name: String, category: Category, size: u64, mime: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            category,
            size,
            mime,
            handle: None,
        }
    }

    /// Record for a file read from a picked folder
    pub fn from_folder(
        name: String,
        category: Category,
        size: u64,
        mime: String,
        handle: Arc<dyn FileHandle>,
    ) -> Self {
        Self {
            handle: Some(handle),
            ..Self::uploaded(name, category, size, mime)
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn handle(&self) -> Option<&Arc<dyn FileHandle>> {
        self.handle.as_ref()
    }

    pub fn has_handle(&self) -> bool {
        self.handle.is_some()
    }
}

impl fmt::Debug for OrganizedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrganizedFile")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("category", &self.category)
            .field("size", &self.size)
            .field("mime", &self.mime)
            .field("has_handle", &self.has_handle())
            .finish()
    }
}

impl Serialize for OrganizedFile {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("OrganizedFile", 6)?;
        s.serialize_field("id", &self.id)?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("category", &self.category)?;
        s.serialize_field("size", &self.size)?;
        s.serialize_field("type", &self.mime)?;
        s.serialize_field("has_handle", &self.has_handle())?;
        s.end()
    }
}

/// Files of one category, for the category browser
#[derive(Debug, Serialize)]
pub struct CategoryGroup<'a> {
    pub category: Category,
    pub files: Vec<&'a OrganizedFile>,
}

/// Group files by category, every category present, registry order
pub fn group_by_category(files: &[OrganizedFile]) -> Vec<CategoryGroup<'_>> {
    Category::ALL
        .iter()
        .map(|&category| CategoryGroup {
            category,
            files: files.iter().filter(|f| f.category == category).collect(),
        })
        .collect()
}

/// Human readable size: `0 Bytes`, `1.5 KB`, `2 MB`
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

/// Everything one user session holds between actions.
///
/// Files and directory are replaced wholesale by each intake action and
/// cleared after a successful organize pass.
#[derive(Default)]
pub struct Session {
    pub(crate) files: Vec<OrganizedFile>,
    pub(crate) directory: Option<Arc<dyn DirectoryHandle>>,
    pub(crate) error: Option<String>,
    pub(crate) notice: Option<String>,
    pub(crate) last_intake: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn files(&self) -> &[OrganizedFile] {
        &self.files
    }

    pub fn directory(&self) -> Option<&Arc<dyn DirectoryHandle>> {
        self.directory.as_ref()
    }

    /// Name of the picked folder, if any
    pub fn directory_name(&self) -> Option<&str> {
        self.directory.as_deref().map(|d| d.name())
    }

    /// Last user-visible error or warning
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Last user-visible success message
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn last_intake(&self) -> Option<DateTime<Utc>> {
        self.last_intake
    }

    /// Organize is offered only with a picked folder and at least one file
    pub fn can_organize(&self) -> bool {
        self.directory.is_some() && !self.files.is_empty()
    }

    pub fn grouped(&self) -> Vec<CategoryGroup<'_>> {
        group_by_category(&self.files)
    }

    /// Back to the empty pre-intake state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("files", &self.files)
            .field("directory", &self.directory_name())
            .field("error", &self.error)
            .field("notice", &self.notice)
            .finish()
    }
}

/// JSON view of a session for the API
#[derive(Debug, Serialize)]
pub struct SessionView<'a> {
    pub files: &'a [OrganizedFile],
    pub directory: Option<&'a str>,
    pub error: Option<&'a str>,
    pub notice: Option<&'a str>,
    pub can_organize: bool,
    pub last_intake: Option<DateTime<Utc>>,
}

impl<'a> From<&'a Session> for SessionView<'a> {
    fn from(session: &'a Session) -> Self {
        Self {
            files: session.files(),
            directory: session.directory_name(),
            error: session.error(),
            notice: session.notice(),
            can_organize: session.can_organize(),
            last_intake: session.last_intake(),
        }
    }
}
