//! Raw material reported by a document engine.

use serde::{Deserialize, Serialize};

/// A run of laid-out text sharing one font, with position and style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    /// The text content
    pub text: String,
    /// Page number (1-indexed)
    pub page: u32,
    /// Effective font size in points
    pub font_size: f32,
    /// Whether the font appears to be bold
    pub is_bold: bool,
    /// Distance from the top of the page (smaller is higher)
    pub vertical_position: f32,
}

impl TextFragment {
    /// Create a new fragment.
    pub fn new(
        text: impl Into<String>,
        page: u32,
        font_size: f32,
        is_bold: bool,
        vertical_position: f32,
    ) -> Self {
        Self {
            text: text.into(),
            page,
            font_size,
            is_bold,
            vertical_position,
        }
    }

    /// Create a fragment whose boldness is inferred from the base font name
    /// (e.g. "Helvetica-Bold", "Arial Black").
    pub fn from_font(
        text: impl Into<String>,
        page: u32,
        font_size: f32,
        font_name: &str,
        vertical_position: f32,
    ) -> Self {
        Self::new(
            text,
            page,
            font_size,
            is_bold_font_name(font_name),
            vertical_position,
        )
    }

    /// Number of characters in the text.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Guess boldness from a PDF base font name.
pub fn is_bold_font_name(font_name: &str) -> bool {
    let lower = font_name.to_lowercase();
    lower.contains("bold")
        || lower.contains("black")
        || lower.contains("heavy")
        || lower.contains("semibold")
}

/// A native bookmark (outline item) declared by the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    /// Nesting level (1 = top level)
    pub level: u32,
    /// Raw title as stored in the document
    pub title: String,
    /// Target page (1-indexed), if the destination could be resolved
    pub page: Option<u32>,
}

impl Bookmark {
    /// Create a new bookmark.
    pub fn new(level: u32, title: impl Into<String>, page: Option<u32>) -> Self {
        Self {
            level,
            title: title.into(),
            page,
        }
    }
}
