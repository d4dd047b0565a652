// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Sortwise: AI-assisted file classifier & organizer
//!
//! Classifies files by name through a local text model and moves the files of
//! a picked folder into one subdirectory per category.

pub mod categories;
pub mod classifier;
pub mod config;
pub mod error;
pub mod fanout;
pub mod host;
pub mod intake;
pub mod ollama;
pub mod orchestrator;
pub mod organizer;
pub mod session;
pub mod web;

pub use categories::Category;
pub use config::AppConfig;
pub use error::{Result, SortwiseError};
pub use orchestrator::{FolderOutcome, Orchestrator, UploadSummary};
pub use session::{OrganizedFile, Session};
