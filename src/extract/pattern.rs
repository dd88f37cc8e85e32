//! Regex-only fallback over raw page text.

use regex::Regex;

use super::budget::TimeBudget;
use super::options::ExtractOptions;
use super::{read_page, Strategy};
use crate::engine::DocumentHandle;
use crate::error::Result;
use crate::model::{HeadingLevel, Outline, OutlineEntry, UNTITLED};

/// Finds numbered and chapter/section headings in raw text.
///
/// Each page's text is prefixed with an inline `[PAGE_n]` marker. Patterns
/// never cross a line break, so only text on the marker's line can match.
#[derive(Debug, Clone)]
pub struct PatternStrategy {
    numbered: Regex,
    chapter: Regex,
    title: Regex,
    options: ExtractOptions,
}

impl PatternStrategy {
    pub fn new(options: &ExtractOptions) -> Self {
        Self {
            numbered: Regex::new(r"\[PAGE_(\d+)\].*?(\d+\.\d*\s+[A-Z][^\n]{5,80})")
                .expect("numbered heading pattern"),
            chapter: Regex::new(r"(?i)\[PAGE_(\d+)\].*?((Chapter|Section)\s+\d+[^\n]{0,50})")
                .expect("chapter pattern"),
            title: Regex::new(r"\[PAGE_1\].*?([A-Z][^\n]{10,100})").expect("title pattern"),
            options: options.clone(),
        }
    }

    /// Concatenate raw page text behind `[PAGE_n]` markers.
    fn marked_text(&self, doc: &dyn DocumentHandle) -> Result<String> {
        let page_limit = doc.page_count().min(self.options.max_pages);
        let mut all_text = String::new();
        for page_index in 0..page_limit {
            all_text.push_str(&format!("[PAGE_{}]", page_index + 1));
            let text = read_page(
                self.options.error_mode,
                page_index,
                doc.page_raw_text(page_index),
            )?;
            if let Some(text) = text {
                all_text.push_str(&text);
            }
        }
        Ok(all_text)
    }

    /// Match headings and a title in marked text.
    pub fn scan(&self, marked_text: &str) -> Outline {
        let mut entries = Vec::new();

        for caps in self.numbered.captures_iter(marked_text) {
            let (Some(page), Some(heading)) = (page_number(&caps), caps.get(2)) else {
                continue;
            };
            let text = heading.as_str().trim();
            let level = if text.matches('.').count() > 1 {
                HeadingLevel::H3
            } else {
                HeadingLevel::H2
            };
            entries.push(OutlineEntry::new(level, text, page));
        }

        for caps in self.chapter.captures_iter(marked_text) {
            let (Some(page), Some(heading)) = (page_number(&caps), caps.get(2)) else {
                continue;
            };
            entries.push(OutlineEntry::new(
                HeadingLevel::H1,
                heading.as_str().trim(),
                page,
            ));
        }

        entries.truncate(self.options.pattern_max_entries);

        let title = self
            .title
            .captures(marked_text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_else(|| UNTITLED.to_string());

        Outline::new(title, entries)
    }
}

fn page_number(caps: &regex::Captures<'_>) -> Option<u32> {
    caps.get(1)?.as_str().parse().ok().filter(|p| *p >= 1)
}

impl Strategy for PatternStrategy {
    fn name(&self) -> &'static str {
        "Regex fallback"
    }

    fn extract(&self, doc: &dyn DocumentHandle, _budget: &TimeBudget) -> Result<Option<Outline>> {
        let marked = self.marked_text(doc)?;
        Ok(Some(self.scan(&marked)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy() -> PatternStrategy {
        PatternStrategy::new(&ExtractOptions::default())
    }

    #[test]
    fn test_numbered_headings_on_marker_line() {
        let text = "[PAGE_1]1. Introduction to things\nbody\n[PAGE_2]2.3 Deep Dive Topic\nmore";
        let outline = strategy().scan(text);

        assert_eq!(
            outline.entries,
            vec![
                OutlineEntry::new(HeadingLevel::H2, "1. Introduction to things", 1),
                OutlineEntry::new(HeadingLevel::H2, "2.3 Deep Dive Topic", 2),
            ]
        );
    }

    #[test]
    fn test_multi_part_number_matches_last_two_parts() {
        let outline = strategy().scan("[PAGE_2]2.1.3 Deep Dive Topic");
        assert_eq!(
            outline.entries,
            vec![OutlineEntry::new(HeadingLevel::H2, "1.3 Deep Dive Topic", 2)]
        );
    }

    #[test]
    fn test_heading_below_marker_line_is_missed() {
        let text = "[PAGE_1]Report header\n1. Introduction to things\n";
        assert!(strategy().scan(text).entries.is_empty());
    }

    #[test]
    fn test_dot_count_uses_whole_heading() {
        let text = "[PAGE_3]4. Results vs. baseline";
        let outline = strategy().scan(text);
        assert_eq!(outline.entries[0].level, HeadingLevel::H3);
    }

    #[test]
    fn test_chapter_matches_follow_numbered() {
        let text = "[PAGE_1]CHAPTER 1 Getting Started\n[PAGE_2]1. Setup the Environment\n";
        let outline = strategy().scan(text);

        assert_eq!(
            outline.entries,
            vec![
                OutlineEntry::new(HeadingLevel::H2, "1. Setup the Environment", 2),
                OutlineEntry::new(HeadingLevel::H1, "CHAPTER 1 Getting Started", 1),
            ]
        );
    }

    #[test]
    fn test_no_deduplication_across_passes() {
        let text = "[PAGE_1]Section 2. Overview of it";
        let outline = strategy().scan(text);
        let texts: Vec<_> = outline.entries.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, ["2. Overview of it", "Section 2. Overview of it"]);
    }

    #[test]
    fn test_truncates_to_twenty() {
        let text: String = (1..=30)
            .map(|i| format!("[PAGE_{i}]{i}. Heading number {i}\n"))
            .collect();
        let outline = strategy().scan(&text);
        assert_eq!(outline.len(), 20);
        assert_eq!(outline.entries[19].page, 20);
    }

    #[test]
    fn test_title_from_first_page() {
        let outline = strategy().scan("[PAGE_1]annual Report For The Year\n[PAGE_2]x");
        assert_eq!(outline.title, "Report For The Year");

        let outline = strategy().scan("[PAGE_1]short\n[PAGE_2]Long Enough Title Here");
        assert_eq!(outline.title, "Untitled Document");
    }
}
