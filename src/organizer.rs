// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Moves classified files into per-category subdirectories

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::host::{ensure_read_write, DirectoryHandle, FileHandle, PermissionState};
use crate::session::OrganizedFile;
use crate::{Result, SortwiseError};

/// Counts from one organize pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrganizeReport {
    /// Files copied into their category folder and removed from the source
    pub moved: usize,
    /// Eligible files whose move failed part way
    pub failed: usize,
    /// Files left alone: category `Other` or no handle
    pub excluded: usize,
}

/// Move every eligible file into `<dir>/<Category>/<name>`.
///
/// Requires read-write permission on `dir`; without it nothing is touched.
/// Moves run one at a time and a failed move only skips that file. A file
/// whose copy succeeded but whose removal failed stays in both places.
pub async fn organize(dir: &dyn DirectoryHandle, files: &[OrganizedFile]) -> Result<OrganizeReport> {
    let permission = ensure_read_write(dir).await?;
    if permission != PermissionState::Granted {
        return Err(SortwiseError::PermissionDenied(dir.name().to_string()));
    }

    let mut report = OrganizeReport::default();

    for file in files {
        let handle = match file.handle() {
            Some(handle) if file.category().is_movable() => handle,
            _ => {
                debug!("Leaving {:?} in place ({})", file.name(), file.category());
                report.excluded += 1;
                continue;
            }
        };

        match move_file(dir, file, &**handle).await {
            Ok(()) => {
                info!("Moved {:?} to {}/", file.name(), file.category());
                report.moved += 1;
            }
            Err(e) => {
                warn!("Could not move file {:?}: {}", file.name(), e);
                report.failed += 1;
            }
        }
    }

    info!(
        "Organized {:?}: {} moved, {} failed, {} left in place",
        dir.name(),
        report.moved,
        report.failed,
        report.excluded
    );
    Ok(report)
}

async fn move_file(dir: &dyn DirectoryHandle, file: &OrganizedFile, source: &dyn FileHandle) -> Result<()> {
    // Read first so an unreadable source never touches an existing destination.
    let original = source.read().await?;

    let dest_dir = dir.get_directory(file.category().as_str(), true).await?;
    let dest = dest_dir.get_file(file.name(), true).await?;

    let mut writable = dest.create_writable().await?;
    writable.write(&original.bytes).await?;
    writable.close().await?;

    dir.remove_entry(file.name()).await
}
