// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Fixed registry of file categories

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A category label from the fixed registry.
///
/// Variant order is registry order, so the derived `Ord` sorts the same way
/// the category browser lists them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Invoices,
    Receipts,
    Images,
    Documents,
    Code,
    Spreadsheets,
    Presentations,
    Videos,
    Audio,
    Archives,
    Other,
}

impl Category {
    /// Every category, in registry order
    pub const ALL: [Category; 11] = [
        Category::Invoices,
        Category::Receipts,
        Category::Images,
        Category::Documents,
        Category::Code,
        Category::Spreadsheets,
        Category::Presentations,
        Category::Videos,
        Category::Audio,
        Category::Archives,
        Category::Other,
    ];

    /// The label, which is also the subdirectory name used on disk
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Invoices => "Invoices",
            Category::Receipts => "Receipts",
            Category::Images => "Images",
            Category::Documents => "Documents",
            Category::Code => "Code",
            Category::Spreadsheets => "Spreadsheets",
            Category::Presentations => "Presentations",
            Category::Videos => "Videos",
            Category::Audio => "Audio",
            Category::Archives => "Archives",
            Category::Other => "Other",
        }
    }

    /// Exact, case-sensitive membership test
    pub fn parse_exact(label: &str) -> Option<Category> {
        Self::ALL.iter().copied().find(|c| c.as_str() == label)
    }

    /// Whether files in this category get moved into a subdirectory
    pub fn is_movable(&self) -> bool {
        *self != Category::Other
    }

    /// Comma separated labels, as embedded in the classification prompt
    pub fn joined_labels() -> String {
        Self::ALL.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a label is not in the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category '{}'", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse_exact(s).ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
