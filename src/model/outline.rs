//! Outline types produced by the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Title used when no strategy could determine one.
pub const UNTITLED: &str = "Untitled Document";

/// Title used when extraction failed unexpectedly.
pub const ERROR_TITLE: &str = "Error in Processing";

/// Heading level of an outline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// Map a bookmark nesting level (1-based) to a heading level.
    ///
    /// Level 1 is `H1`, level 2 is `H2`, anything else collapses to `H3`.
    pub fn from_nesting(level: u32) -> Self {
        match level {
            1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            _ => HeadingLevel::H3,
        }
    }

    /// Numeric depth (1-3).
    pub fn depth(self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.depth())
    }
}

/// A single heading in an inferred outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// Heading level
    pub level: HeadingLevel,

    /// Normalized heading text
    pub text: String,

    /// Page number (1-indexed)
    pub page: u32,
}

impl OutlineEntry {
    /// Create a new outline entry.
    pub fn new(level: HeadingLevel, text: impl Into<String>, page: u32) -> Self {
        Self {
            level,
            text: text.into(),
            page,
        }
    }
}

/// Inferred document outline: a title plus an ordered list of headings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outline {
    /// Document title
    pub title: String,

    /// Headings in the order the producing strategy emitted them
    #[serde(rename = "outline")]
    pub entries: Vec<OutlineEntry>,
}

impl Outline {
    /// Create an outline with the given title and entries.
    pub fn new(title: impl Into<String>, entries: Vec<OutlineEntry>) -> Self {
        Self {
            title: title.into(),
            entries,
        }
    }

    /// The empty outline returned when no strategy succeeds.
    pub fn untitled() -> Self {
        Self::new(UNTITLED, Vec::new())
    }

    /// The empty outline returned when extraction faults.
    pub fn processing_error() -> Self {
        Self::new(ERROR_TITLE, Vec::new())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the outline has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count entries at a given level.
    pub fn count_level(&self, level: HeadingLevel) -> usize {
        self.entries.iter().filter(|e| e.level == level).count()
    }
}
