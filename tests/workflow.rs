// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Upload, folder and organize flows against the in-memory file system

mod common;

use std::sync::Arc;

use common::{orchestrator, Reply, ScriptedOracle};
use sortwise::error::{FOLDER_READ_MESSAGE, PERMISSION_DENIED_MESSAGE, UNSUPPORTED_MESSAGE};
use sortwise::host::memory::{MemoryDirectory, MemoryPicker, PickOutcome};
use sortwise::intake::UploadedFile;
use sortwise::{Category, FolderOutcome, Session, SortwiseError, UploadSummary};

fn upload(name: &str, bytes: &[u8]) -> UploadedFile {
    UploadedFile::new(name, "application/octet-stream", bytes.to_vec())
}

fn category_of(session: &Session, name: &str) -> Option<Category> {
    session.files().iter().find(|f| f.name() == name).map(|f| f.category())
}

fn inbox() -> Arc<MemoryDirectory> {
    let root = MemoryDirectory::root("inbox");
    root.insert_file("invoice_march.pdf", b"%PDF-1.7")
        .insert_file("holiday.png", b"\x89PNG")
        .insert_file("mystery.bin", b"\x00");
    root.insert_dir("archive").insert_file("old.txt", b"old");
    root
}

fn inbox_oracle() -> ScriptedOracle {
    ScriptedOracle::new()
        .answer("invoice_march.pdf", "Invoices")
        .answer("holiday.png", "Images")
        .answer("mystery.bin", "Other")
}

#[tokio::test]
async fn upload_classifies_every_file() {
    let oracle = Arc::new(
        ScriptedOracle::new()
            .answer("holiday.png", "Images")
            .answer("report.docx", "Documents")
            .answer("song.mp3", "Audio"),
    );
    let orchestrator = orchestrator(oracle.clone());
    let mut session = Session::new();

    let summary = orchestrator
        .upload(
            &mut session,
            vec![upload("holiday.png", b"png"), upload("report.docx", b"doc"), upload("song.mp3", b"mp3")],
        )
        .await;

    assert_eq!(summary, UploadSummary { classified: 3, failed: 0 });
    assert_eq!(oracle.calls(), 3);
    assert_eq!(category_of(&session, "song.mp3"), Some(Category::Audio));
    assert!(session.error().is_none());
    assert!(session.directory_name().is_none());
    assert!(session.last_intake().is_some());
    assert!(!session.can_organize());
    assert!(session.files().iter().all(|f| !f.has_handle()));
}

#[tokio::test]
async fn upload_tolerates_some_failures() {
    let oracle = Arc::new(
        ScriptedOracle::new()
            .answer("a.png", "Images")
            .on("b.png", Reply::Panic)
            .answer("c.pdf", "Invoices")
            .on("d.zip", Reply::Panic)
            .answer("e.txt", "Documents"),
    );
    let orchestrator = orchestrator(oracle);
    let mut session = Session::new();

    let files = ["a.png", "b.png", "c.pdf", "d.zip", "e.txt"]
        .iter()
        .map(|name| upload(name, b"x"))
        .collect();
    let summary = orchestrator.upload(&mut session, files).await;

    assert_eq!(summary, UploadSummary { classified: 3, failed: 2 });
    assert_eq!(session.files().len(), 3);
    assert_eq!(
        session.error(),
        Some("2 files could not be classified. Please try again.")
    );
    assert!(category_of(&session, "b.png").is_none());
}

#[tokio::test]
async fn upload_falls_back_to_other() {
    let oracle = Arc::new(
        ScriptedOracle::new()
            .answer("chatty.png", "I think this is an image: Images")
            .answer("lower.png", "images")
            .answer("padded.png", "  Images\n")
            .on("broken.png", Reply::Error),
    );
    let orchestrator = orchestrator(oracle);
    let mut session = Session::new();

    let files = ["chatty.png", "lower.png", "padded.png", "broken.png"]
        .iter()
        .map(|name| upload(name, b"x"))
        .collect();
    let summary = orchestrator.upload(&mut session, files).await;

    assert_eq!(summary.failed, 0);
    assert!(session.error().is_none());
    assert_eq!(category_of(&session, "chatty.png"), Some(Category::Other));
    assert_eq!(category_of(&session, "lower.png"), Some(Category::Other));
    assert_eq!(category_of(&session, "padded.png"), Some(Category::Images));
    assert_eq!(category_of(&session, "broken.png"), Some(Category::Other));
}

#[tokio::test]
async fn empty_upload_changes_nothing() {
    let oracle = Arc::new(ScriptedOracle::new().answer("a.png", "Images"));
    let orchestrator = orchestrator(oracle.clone());
    let mut session = Session::new();

    orchestrator.upload(&mut session, vec![upload("a.png", b"x")]).await;
    let summary = orchestrator.upload(&mut session, Vec::new()).await;

    assert_eq!(summary, UploadSummary::default());
    assert_eq!(session.files().len(), 1);
    assert_eq!(oracle.calls(), 1);
}

#[tokio::test]
async fn upload_replaces_folder_session() {
    let root = inbox();
    let oracle = Arc::new(inbox_oracle());
    let orchestrator = orchestrator(oracle).with_picker(Arc::new(MemoryPicker::returning(root)));
    let mut session = Session::new();

    orchestrator.select_folder(&mut session).await.unwrap();
    assert!(session.can_organize());

    orchestrator.upload(&mut session, vec![upload("new.txt", b"x")]).await;
    assert!(session.directory_name().is_none());
    assert_eq!(session.files().len(), 1);
    assert!(!session.can_organize());
}

#[tokio::test]
async fn folder_classifies_direct_files_only() {
    let root = inbox();
    let orchestrator = orchestrator(Arc::new(inbox_oracle()))
        .with_picker(Arc::new(MemoryPicker::returning(root)));
    let mut session = Session::new();

    let outcome = orchestrator.select_folder(&mut session).await.unwrap();

    assert_eq!(outcome, FolderOutcome::Loaded(3));
    assert_eq!(session.directory_name(), Some("inbox"));
    assert!(session.files().iter().all(|f| f.has_handle()));
    assert!(category_of(&session, "old.txt").is_none());
    assert!(category_of(&session, "archive").is_none());

    let pdf = session.files().iter().find(|f| f.name() == "invoice_march.pdf").unwrap();
    assert_eq!(pdf.size(), 8);
    assert_eq!(pdf.mime(), "application/pdf");
}

#[tokio::test]
async fn cancelled_pick_keeps_previous_state() {
    let oracle = Arc::new(ScriptedOracle::new().answer("a.png", "Images"));
    let orchestrator = orchestrator(oracle)
        .with_picker(Arc::new(MemoryPicker::new(PickOutcome::Cancelled)));
    let mut session = Session::new();

    orchestrator.upload(&mut session, vec![upload("a.png", b"x")]).await;
    let outcome = orchestrator.select_folder(&mut session).await.unwrap();

    assert_eq!(outcome, FolderOutcome::Cancelled);
    assert_eq!(session.files().len(), 1);
    assert!(session.error().is_none());
}

#[tokio::test]
async fn missing_picker_is_reported() {
    let orchestrator = orchestrator(Arc::new(ScriptedOracle::new()));
    let mut session = Session::new();

    assert!(!orchestrator.supports_folder_pick());
    let err = orchestrator.select_folder(&mut session).await.unwrap_err();

    assert!(matches!(err, SortwiseError::CapabilityUnsupported));
    assert_eq!(session.error(), Some(UNSUPPORTED_MESSAGE));
}

#[tokio::test]
async fn failed_pick_is_a_folder_read_error() {
    let orchestrator = orchestrator(Arc::new(ScriptedOracle::new()))
        .with_picker(Arc::new(MemoryPicker::new(PickOutcome::Fail("gone".to_string()))));
    let mut session = Session::new();

    let err = orchestrator.select_folder(&mut session).await.unwrap_err();
    assert!(matches!(err, SortwiseError::FolderRead(_)));
    assert_eq!(session.error(), Some(FOLDER_READ_MESSAGE));
}

#[tokio::test]
async fn enumeration_failure_clears_files() {
    let root = inbox();
    root.fail_enumeration();
    let oracle = Arc::new(ScriptedOracle::new().answer("a.png", "Images"));
    let orchestrator = orchestrator(oracle.clone())
        .with_picker(Arc::new(MemoryPicker::returning(root)));
    let mut session = Session::new();

    orchestrator.upload(&mut session, vec![upload("a.png", b"x")]).await;
    let err = orchestrator.select_folder(&mut session).await.unwrap_err();

    assert!(matches!(err, SortwiseError::FolderRead(_)));
    assert_eq!(session.error(), Some(FOLDER_READ_MESSAGE));
    assert!(session.files().is_empty());
    assert_eq!(session.directory_name(), Some("inbox"));
    assert!(!session.can_organize());
    assert_eq!(oracle.calls(), 1);
}

#[tokio::test]
async fn one_unreadable_file_fails_the_folder() {
    let root = inbox();
    root.fail_reads_of("holiday.png");
    let oracle = Arc::new(inbox_oracle());
    let orchestrator = orchestrator(oracle.clone())
        .with_picker(Arc::new(MemoryPicker::returning(root)));
    let mut session = Session::new();

    let err = orchestrator.select_folder(&mut session).await.unwrap_err();

    assert!(matches!(err, SortwiseError::FolderRead(_)));
    assert!(session.files().is_empty());
    assert_eq!(oracle.calls(), 0);
}

#[tokio::test]
async fn one_failed_classification_fails_the_folder() {
    let root = inbox();
    let oracle = Arc::new(inbox_oracle().on("holiday.png", Reply::Panic));
    let orchestrator = orchestrator(oracle).with_picker(Arc::new(MemoryPicker::returning(root)));
    let mut session = Session::new();

    let err = orchestrator.select_folder(&mut session).await.unwrap_err();

    assert!(matches!(err, SortwiseError::FolderRead(_)));
    assert_eq!(session.error(), Some(FOLDER_READ_MESSAGE));
    assert!(session.files().is_empty());
}

#[tokio::test]
async fn empty_folder_has_nothing_to_organize() {
    let root = MemoryDirectory::root("empty");
    root.insert_dir("nested");
    let orchestrator = orchestrator(Arc::new(ScriptedOracle::new()))
        .with_picker(Arc::new(MemoryPicker::returning(root)));
    let mut session = Session::new();

    let outcome = orchestrator.select_folder(&mut session).await.unwrap();
    assert_eq!(outcome, FolderOutcome::Loaded(0));
    assert!(!session.can_organize());
    assert!(orchestrator.organize(&mut session).await.unwrap().is_none());
}

#[tokio::test]
async fn organize_without_folder_is_a_no_op() {
    let oracle = Arc::new(ScriptedOracle::new().answer("a.png", "Images"));
    let orchestrator = orchestrator(oracle);
    let mut session = Session::new();

    orchestrator.upload(&mut session, vec![upload("a.png", b"x")]).await;
    assert!(orchestrator.organize(&mut session).await.unwrap().is_none());
    assert_eq!(session.files().len(), 1);
    assert!(session.notice().is_none());
}

#[tokio::test]
async fn pick_classify_and_organize() {
    let root = inbox();
    let orchestrator = orchestrator(Arc::new(inbox_oracle()))
        .with_picker(Arc::new(MemoryPicker::returning(root.clone())));
    let mut session = Session::new();

    orchestrator.select_folder(&mut session).await.unwrap();
    let report = orchestrator.organize(&mut session).await.unwrap().unwrap();

    assert_eq!(report.moved, 2);
    assert_eq!(report.excluded, 1);
    assert_eq!(session.notice(), Some("Successfully organized 2 files!"));
    assert!(session.files().is_empty());
    assert!(session.directory_name().is_none());
    assert!(session.error().is_none());

    let invoices = root.subdirectory("Invoices").unwrap();
    assert_eq!(invoices.file_contents("invoice_march.pdf"), Some(b"%PDF-1.7".to_vec()));
    assert!(root.subdirectory("Images").unwrap().contains_file("holiday.png"));
    assert!(root.subdirectory("Other").is_none());

    let mut left = root.file_names();
    left.sort();
    assert_eq!(left, vec!["mystery.bin".to_string()]);
}

#[tokio::test]
async fn denied_permission_keeps_session() {
    let root = inbox();
    root.grant_on_request(false);
    let orchestrator = orchestrator(Arc::new(inbox_oracle()))
        .with_picker(Arc::new(MemoryPicker::returning(root.clone())));
    let mut session = Session::new();

    orchestrator.select_folder(&mut session).await.unwrap();
    let err = orchestrator.organize(&mut session).await.unwrap_err();

    assert!(matches!(err, SortwiseError::PermissionDenied(_)));
    assert_eq!(session.error(), Some(PERMISSION_DENIED_MESSAGE));
    assert_eq!(session.files().len(), 3);
    assert!(session.can_organize());
    assert!(root.dir_names().iter().all(|d| d == "archive"));
}

#[tokio::test]
async fn partial_move_failure_still_succeeds() {
    let root = inbox();
    root.fail_writes_to("holiday.png");
    let orchestrator = orchestrator(Arc::new(inbox_oracle()))
        .with_picker(Arc::new(MemoryPicker::returning(root.clone())));
    let mut session = Session::new();

    orchestrator.select_folder(&mut session).await.unwrap();
    let report = orchestrator.organize(&mut session).await.unwrap().unwrap();

    assert_eq!(report.moved, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(session.notice(), Some("Successfully organized 1 files!"));
    assert!(root.contains_file("holiday.png"));
    assert!(!root.contains_file("invoice_march.pdf"));
}
