// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Intake and organize flows driven against an explicit [`Session`]

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::classifier::Classifier;
use crate::fanout::{join_all_fail_fast, settle_all, spawn_all};
use crate::host::{DirectoryHandle, DirectoryPicker};
use crate::intake::{read_folder, UploadedFile};
use crate::organizer::{self, OrganizeReport};
use crate::session::{OrganizedFile, Session};
use crate::{Result, SortwiseError};

/// Result of a batch upload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    pub classified: usize,
    pub failed: usize,
}

/// Result of a folder pick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderOutcome {
    /// Folder read and classified, with this many files
    Loaded(usize),
    /// The user backed out of the picker; nothing changed
    Cancelled,
}

/// Runs the classification flows and the organize pass
#[derive(Clone)]
pub struct Orchestrator {
    classifier: Arc<Classifier>,
    picker: Option<Arc<dyn DirectoryPicker>>,
}

impl Orchestrator {
    pub fn new(classifier: Classifier) -> Self {
        Self {
            classifier: Arc::new(classifier),
            picker: None,
        }
    }

    /// Enable the folder flow with the host's picker
    pub fn with_picker(mut self, picker: Arc<dyn DirectoryPicker>) -> Self {
        self.picker = Some(picker);
        self
    }

    pub fn supports_folder_pick(&self) -> bool {
        self.picker.is_some()
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Classify uploaded files, tolerating individual failures.
    ///
    /// An empty batch changes nothing. Otherwise the session is cleared and
    /// refilled with whatever classified successfully; failures are counted
    /// into a warning.
    pub async fn upload(&self, session: &mut Session, files: Vec<UploadedFile>) -> UploadSummary {
        if files.is_empty() {
            return UploadSummary::default();
        }

        session.error = None;
        session.notice = None;
        session.directory = None;
        session.files.clear();

        info!("Classifying {} uploaded files", files.len());

        let jobs = files.into_iter().map(|file| {
            let classifier = self.classifier.clone();
            async move {
                let category = classifier.classify(&file.name).await;
                Ok::<_, SortwiseError>(OrganizedFile::uploaded(file.name, category, file.size, file.mime))
            }
        });
        let settled = settle_all(spawn_all(jobs)).await;

        if settled.failed > 0 {
            warn!("{} uploaded files could not be classified", settled.failed);
            session.error = Some(format!(
                "{} files could not be classified. Please try again.",
                settled.failed
            ));
        }

        let summary = UploadSummary {
            classified: settled.succeeded.len(),
            failed: settled.failed,
        };
        session.files = settled.succeeded;
        session.last_intake = Some(Utc::now());
        summary
    }

    /// Pick a folder, read its direct files and classify them, all or nothing.
    ///
    /// A cancelled pick leaves the session untouched. Any other failure is
    /// recorded as a user-visible error and returned.
    pub async fn select_folder(&self, session: &mut Session) -> Result<FolderOutcome> {
        let picker = match &self.picker {
            Some(picker) => picker,
            None => {
                let err = SortwiseError::CapabilityUnsupported;
                session.error = Some(err.user_message());
                return Err(err);
            }
        };

        let dir = match picker.pick_directory().await {
            Ok(dir) => dir,
            Err(e) if e.is_cancellation() => {
                info!("Folder selection cancelled");
                return Ok(FolderOutcome::Cancelled);
            }
            Err(e) => return Err(record_folder_error(session, e)),
        };

        session.directory = Some(dir.clone());
        session.files.clear();
        session.error = None;
        session.notice = None;

        info!("Reading folder {:?}", dir.name());

        let loaded = self.classify_folder(&*dir).await;

        match loaded {
            Ok(files) => {
                info!("Classified {} files in {:?}", files.len(), dir.name());
                let count = files.len();
                session.files = files;
                session.last_intake = Some(Utc::now());
                Ok(FolderOutcome::Loaded(count))
            }
            Err(e) => Err(record_folder_error(session, e)),
        }
    }

    /// Read every direct file of `dir` and classify them concurrently; the
    /// first failure fails the batch
    async fn classify_folder(&self, dir: &dyn DirectoryHandle) -> Result<Vec<OrganizedFile>> {
        let folder_files = read_folder(dir).await?;

        let jobs = folder_files.into_iter().map(|entry| {
            let classifier = self.classifier.clone();
            async move {
                let category = classifier.classify(&entry.data.name).await;
                let size = entry.data.size();
                Ok::<_, SortwiseError>(OrganizedFile::from_folder(
                    entry.data.name,
                    category,
                    size,
                    entry.data.mime,
                    entry.handle,
                ))
            }
        });
        join_all_fail_fast(spawn_all(jobs)).await
    }

    /// Move the session's files on disk.
    ///
    /// Returns `None` without doing anything unless a folder is picked and
    /// holds at least one classified file. On success the session goes back
    /// to its empty state.
    pub async fn organize(&self, session: &mut Session) -> Result<Option<OrganizeReport>> {
        let dir = match &session.directory {
            Some(dir) if !session.files.is_empty() => dir.clone(),
            _ => return Ok(None),
        };

        session.error = None;
        session.notice = None;

        match organizer::organize(&*dir, &session.files).await {
            Ok(report) => {
                session.files.clear();
                session.directory = None;
                session.notice = Some(format!("Successfully organized {} files!", report.moved));
                Ok(Some(report))
            }
            Err(e) => {
                let e = match e {
                    SortwiseError::PermissionDenied(_) => e,
                    other => SortwiseError::Organize(other.to_string()),
                };
                error!("Organize failed: {}", e);
                session.error = Some(e.user_message());
                Err(e)
            }
        }
    }
}

/// Anything but cancellation during a folder pick is a folder-read error
fn record_folder_error(session: &mut Session, e: SortwiseError) -> SortwiseError {
    let e = match e {
        SortwiseError::FolderRead(_) => e,
        other => SortwiseError::FolderRead(other.to_string()),
    };
    error!("{}", e);
    session.files.clear();
    session.error = Some(e.user_message());
    e
}
