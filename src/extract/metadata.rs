//! Outline from the document's native bookmarks.

use super::budget::TimeBudget;
use super::Strategy;
use crate::engine::DocumentHandle;
use crate::error::Result;
use crate::model::{len_within, normalize_heading, HeadingLevel, Outline, OutlineEntry, UNTITLED};

/// Longest bookmark-derived title kept as the document title.
const MAX_TITLE_CHARS: usize = 100;

/// Reads native bookmarks. Cheapest strategy and the most authoritative one
/// when present.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataStrategy;

impl MetadataStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Strategy for MetadataStrategy {
    fn name(&self) -> &'static str {
        "Bookmark"
    }

    fn extract(&self, doc: &dyn DocumentHandle, _budget: &TimeBudget) -> Result<Option<Outline>> {
        let bookmarks = doc.bookmarks()?;
        if bookmarks.is_empty() {
            return Ok(None);
        }

        let entries: Vec<OutlineEntry> = bookmarks
            .iter()
            .filter_map(|bookmark| {
                let text = normalize_heading(&bookmark.title);
                if !len_within(&text, 3, 150) {
                    return None;
                }
                let Some(page) = bookmark.page.filter(|p| *p >= 1) else {
                    log::debug!("Skipping bookmark '{}' without a target page", text);
                    return None;
                };
                Some(OutlineEntry::new(
                    HeadingLevel::from_nesting(bookmark.level),
                    text,
                    page,
                ))
            })
            .collect();

        let Some(first) = entries.first() else {
            return Ok(None);
        };

        let title = if first.text.chars().count() > MAX_TITLE_CHARS {
            UNTITLED.to_string()
        } else {
            first.text.clone()
        };

        Ok(Some(Outline::new(title, entries)))
    }
}
