// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Error types for Sortwise

use thiserror::Error;

/// Result type alias for Sortwise operations
pub type Result<T> = std::result::Result<T, SortwiseError>;

/// Shown when a folder could not be enumerated or read
pub const FOLDER_READ_MESSAGE: &str = "Could not read the selected directory.";

/// Shown when write access to the picked folder is refused
pub const PERMISSION_DENIED_MESSAGE: &str = "Permission to write to the directory was denied.";

/// Shown for any failure of the organize pass outside a single file move
pub const ORGANIZE_FAILED_MESSAGE: &str = "An error occurred while organizing files on disk.";

/// Shown when the host offers no way to pick a folder
pub const UNSUPPORTED_MESSAGE: &str =
    "Folder selection is not supported here. Enable it in the configuration or use the CLI.";

/// Sortwise error types
#[derive(Error, Debug)]
pub enum SortwiseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Oracle not available: {0}")]
    OracleUnavailable(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Folder selection is not supported by this host")]
    CapabilityUnsupported,

    #[error("Folder selection was cancelled")]
    PickerCancelled,

    #[error("Could not read the selected directory: {0}")]
    FolderRead(String),

    #[error("Write permission denied for directory '{0}'")]
    PermissionDenied(String),

    #[error("Organize failed: {0}")]
    Organize(String),

    #[error("Entry not found: {0}")]
    NotFound(String),

    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl SortwiseError {
    /// Message suitable for showing to the user; `Display` keeps the diagnostic detail
    pub fn user_message(&self) -> String {
        match self {
            Self::CapabilityUnsupported => UNSUPPORTED_MESSAGE.to_string(),
            Self::FolderRead(_) => FOLDER_READ_MESSAGE.to_string(),
            Self::PermissionDenied(_) => PERMISSION_DENIED_MESSAGE.to_string(),
            Self::Organize(_) => ORGANIZE_FAILED_MESSAGE.to_string(),
            Self::PickerCancelled => String::new(),
            other => other.to_string(),
        }
    }

    /// True for the picker's dedicated "aborted" signal
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::PickerCancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_detail() {
        let err = SortwiseError::FolderRead("EACCES on /srv/inbox".to_string());
        assert_eq!(err.user_message(), FOLDER_READ_MESSAGE);
        assert!(err.to_string().contains("EACCES"));
    }

    #[test]
    fn test_cancellation_detection() {
        assert!(SortwiseError::PickerCancelled.is_cancellation());
        assert!(!SortwiseError::FolderRead(String::new()).is_cancellation());
    }
}
