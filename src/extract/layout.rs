//! Layout analysis: headings from font size, weight, and numbering.
//!
//! The strategy estimates the document's body font size, then treats text
//! that is noticeably larger, bold and numbered, or numbered in a
//! recognizable way as a heading.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use regex::Regex;

use super::budget::TimeBudget;
use super::options::{ExtractOptions, HeadingOrder};
use super::{read_page, Strategy};
use crate::engine::DocumentHandle;
use crate::error::Result;
use crate::model::{
    char_len, len_within, normalize_heading, HeadingLevel, Outline, OutlineEntry, TextFragment,
    UNTITLED,
};

/// Body size assumed when no unique most-common size exists.
pub const DEFAULT_BODY_SIZE: f32 = 12.0;

/// Substrings (lowercase) that mark boilerplate rather than headings.
const ARTIFACT_PHRASES: &[&str] = &["copyright", "all rights reserved", "page", "table of contents"];

/// Font size statistics for body size estimation.
#[derive(Debug, Clone, Default)]
pub struct FontStatistics {
    /// Observed font sizes (as bit patterns) with frequency
    histogram: HashMap<u32, usize>,
}

impl FontStatistics {
    /// Build statistics from fragments.
    pub fn from_fragments<'a>(fragments: impl IntoIterator<Item = &'a TextFragment>) -> Self {
        let mut stats = Self::default();
        for fragment in fragments {
            stats.add_size(fragment.font_size);
        }
        stats
    }

    /// Add a font size observation. Non-positive sizes are ignored.
    pub fn add_size(&mut self, size: f32) {
        if size > 0.0 && size.is_finite() {
            *self.histogram.entry(size.to_bits()).or_insert(0) += 1;
        }
    }

    /// The most common font size.
    ///
    /// Falls back to [`DEFAULT_BODY_SIZE`] when there are no observations or
    /// when several sizes tie for most common.
    pub fn body_size(&self) -> f32 {
        let Some(top) = self.histogram.values().copied().max() else {
            return DEFAULT_BODY_SIZE;
        };

        let mut modes = self.histogram.iter().filter(|(_, count)| **count == top);
        match (modes.next(), modes.next()) {
            (Some((bits, _)), None) => f32::from_bits(*bits),
            _ => {
                log::debug!(
                    "No unique body font size ({} sizes tie); using {}",
                    self.histogram.values().filter(|c| **c == top).count(),
                    DEFAULT_BODY_SIZE
                );
                DEFAULT_BODY_SIZE
            }
        }
    }
}

/// Compiled patterns for heading and artifact recognition.
#[derive(Debug, Clone)]
pub struct HeadingPatterns {
    numbering: Regex,
    chapter: Regex,
    numbered_title: Regex,
    numbered_subtitle: Regex,
    digits_only: Regex,
    page_label: Regex,
    link_like: Regex,
}

impl HeadingPatterns {
    pub fn new() -> Self {
        Self {
            numbering: Regex::new(r"^(\d+\.?\s+|\d+\.\d+\.?\s+|[IVXLC]+\.?\s+)")
                .expect("numbering pattern"),
            chapter: Regex::new(r"(?i)^(Chapter|Section|Part)\s+\d+").expect("chapter pattern"),
            numbered_title: Regex::new(r"^\d+\.\s+[A-Z]").expect("numbered title pattern"),
            numbered_subtitle: Regex::new(r"^\d+\.\d+\s+[A-Z]").expect("numbered subtitle pattern"),
            digits_only: Regex::new(r"^\d+$").expect("digits pattern"),
            page_label: Regex::new(r"(?i)^Page \d+").expect("page label pattern"),
            link_like: Regex::new(r"(http|www\.|@)").expect("link pattern"),
        }
    }

    /// Check whether text is a page artifact (page number, boilerplate, link).
    pub fn is_artifact(&self, text: &str) -> bool {
        if self.digits_only.is_match(text) || self.page_label.is_match(text) {
            return true;
        }
        let lower = text.to_lowercase();
        if ARTIFACT_PHRASES.iter().any(|phrase| lower.contains(phrase)) {
            return true;
        }
        self.link_like.is_match(text)
    }

    /// Heading level for a fragment, or `None` for body text.
    pub fn classify(&self, fragment: &TextFragment, body_size: f32) -> Option<HeadingLevel> {
        let text = fragment.text.as_str();
        let size_diff = fragment.font_size - body_size;
        let numbered = self.numbering.is_match(text);

        if size_diff >= 6.0 {
            return Some(HeadingLevel::H1);
        }
        if size_diff >= 4.0 {
            return Some(HeadingLevel::H2);
        }
        if size_diff >= 2.0 && fragment.is_bold {
            return Some(HeadingLevel::H3);
        }
        if fragment.is_bold && (numbered || self.chapter.is_match(text)) {
            return Some(HeadingLevel::H2);
        }
        if numbered && size_diff >= 1.0 {
            return Some(HeadingLevel::H3);
        }
        if self.numbered_title.is_match(text) {
            return Some(HeadingLevel::H2);
        }
        if self.numbered_subtitle.is_match(text) {
            return Some(HeadingLevel::H3);
        }
        None
    }
}

impl Default for HeadingPatterns {
    fn default() -> Self {
        Self::new()
    }
}

/// A heading found on a page before final ordering and cleanup.
#[derive(Debug, Clone)]
struct Candidate {
    level: HeadingLevel,
    text: String,
    page: u32,
    vertical_position: f32,
}

/// Infers an outline from positioned text fragments.
#[derive(Debug, Clone)]
pub struct LayoutStrategy {
    patterns: HeadingPatterns,
    options: ExtractOptions,
}

impl LayoutStrategy {
    pub fn new(options: &ExtractOptions) -> Self {
        Self {
            patterns: HeadingPatterns::new(),
            options: options.clone(),
        }
    }

    /// Compiled heading patterns.
    pub fn patterns(&self) -> &HeadingPatterns {
        &self.patterns
    }

    /// Collect trimmed fragments longer than two characters from the first
    /// `max_pages` pages, stopping early when the budget runs low.
    fn collect_fragments(
        &self,
        doc: &dyn DocumentHandle,
        budget: &TimeBudget,
    ) -> Result<Vec<TextFragment>> {
        let page_limit = doc.page_count().min(self.options.max_pages);
        let mut collected = Vec::new();

        for page_index in 0..page_limit {
            let fragments = read_page(
                self.options.error_mode,
                page_index,
                doc.page_fragments(page_index),
            )?;
            for mut fragment in fragments.into_iter().flatten() {
                let trimmed = fragment.text.trim();
                if char_len(trimmed) > 2 {
                    fragment.text = trimmed.to_string();
                    collected.push(fragment);
                }
            }

            if budget.remaining() < self.options.page_scan_cutoff {
                log::warn!(
                    "Time limit approaching during text extraction on page {}",
                    page_index + 1
                );
                break;
            }
        }

        Ok(collected)
    }

    /// Pick the document title from the first three pages.
    pub fn detect_title(&self, fragments: &[TextFragment], body_size: f32) -> String {
        let first_pages = || fragments.iter().filter(|f| f.page <= 3);

        let prominent = first_pages()
            .filter(|f| f.font_size > body_size + 2.0)
            .filter(|f| {
                let len = f.char_len();
                len > 5 && len < 200
            })
            .min_by(|a, b| {
                a.page.cmp(&b.page).then(
                    a.vertical_position
                        .partial_cmp(&b.vertical_position)
                        .unwrap_or(Ordering::Equal),
                )
            });

        if let Some(fragment) = prominent {
            return fragment.text.clone();
        }

        first_pages()
            .find(|f| f.char_len() > 10)
            .map(|f| f.text.clone())
            .unwrap_or_else(|| UNTITLED.to_string())
    }

    /// Classify fragments into headings, then order and clean them.
    pub fn detect_headings(
        &self,
        fragments: &[TextFragment],
        body_size: f32,
        budget: &TimeBudget,
    ) -> Vec<OutlineEntry> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut candidates = Vec::new();

        for fragment in fragments {
            let text = fragment.text.trim();
            if !seen.contains(text) && len_within(text, 3, 150) && !self.patterns.is_artifact(text)
            {
                if let Some(level) = self.patterns.classify(fragment, body_size) {
                    candidates.push(Candidate {
                        level,
                        text: text.to_string(),
                        page: fragment.page,
                        vertical_position: fragment.vertical_position,
                    });
                    seen.insert(text);
                }
            }

            if budget.remaining() < self.options.heading_scan_cutoff {
                log::warn!("Early stopping heading extraction due to time");
                break;
            }
        }

        match self.options.heading_order {
            HeadingOrder::Alphabetical => {
                candidates.sort_by(|a, b| a.page.cmp(&b.page).then_with(|| a.text.cmp(&b.text)))
            }
            HeadingOrder::ReadingOrder => candidates.sort_by(|a, b| {
                a.page.cmp(&b.page).then(
                    a.vertical_position
                        .partial_cmp(&b.vertical_position)
                        .unwrap_or(Ordering::Equal),
                )
            }),
        }

        clean_headings(candidates)
    }
}

/// Re-normalize text and drop short or repeated headings.
fn clean_headings(candidates: Vec<Candidate>) -> Vec<OutlineEntry> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter_map(|candidate| {
            let text = normalize_heading(&candidate.text);
            if char_len(&text) < 3 || !seen.insert(text.clone()) {
                return None;
            }
            Some(OutlineEntry::new(candidate.level, text, candidate.page))
        })
        .collect()
}

impl Strategy for LayoutStrategy {
    fn name(&self) -> &'static str {
        "Heuristic"
    }

    fn extract(&self, doc: &dyn DocumentHandle, budget: &TimeBudget) -> Result<Option<Outline>> {
        let fragments = self.collect_fragments(doc, budget)?;
        if fragments.is_empty() {
            log::debug!("No text fragments found");
            return Ok(None);
        }

        let body_size = FontStatistics::from_fragments(&fragments).body_size();
        log::debug!(
            "Collected {} fragments, body font size {}",
            fragments.len(),
            body_size
        );

        let title = self.detect_title(&fragments, body_size);
        let entries = self.detect_headings(&fragments, body_size, budget);
        Ok(Some(Outline::new(title, entries)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::time::Duration;

    use crate::error::Error;
    use crate::model::Bookmark;

    /// Pages of fragments; `None` marks a page that cannot be read.
    struct Pages {
        pages: Vec<Option<Vec<TextFragment>>>,
        reads: Cell<u32>,
    }

    impl Pages {
        fn new(pages: Vec<Option<Vec<TextFragment>>>) -> Self {
            Self {
                pages,
                reads: Cell::new(0),
            }
        }
    }

    impl DocumentHandle for Pages {
        fn bookmarks(&self) -> Result<Vec<Bookmark>> {
            Ok(Vec::new())
        }

        fn page_count(&self) -> u32 {
            self.pages.len() as u32
        }

        fn page_fragments(&self, page_index: u32) -> Result<Vec<TextFragment>> {
            self.reads.set(self.reads.get() + 1);
            self.pages[page_index as usize]
                .clone()
                .ok_or_else(|| Error::Corrupted(format!("page {} stream", page_index + 1)))
        }

        fn page_raw_text(&self, _page_index: u32) -> Result<String> {
            Ok(String::new())
        }
    }

    fn page(number: u32, heading: &str) -> Vec<TextFragment> {
        vec![
            frag(heading, number, 18.0, true, 100.0),
            frag("Body text for this page", number, 12.0, false, 200.0),
            frag("More body text for this page", number, 12.0, false, 220.0),
        ]
    }

    fn frag(text: &str, page: u32, size: f32, bold: bool, y: f32) -> TextFragment {
        TextFragment::new(text, page, size, bold, y)
    }

    fn strategy() -> LayoutStrategy {
        LayoutStrategy::new(&ExtractOptions::default())
    }

    #[test]
    fn test_body_size_mode() {
        let mut stats = FontStatistics::default();
        for _ in 0..100 {
            stats.add_size(10.5);
        }
        for _ in 0..5 {
            stats.add_size(18.0);
        }
        stats.add_size(0.0);
        stats.add_size(-3.0);
        assert_eq!(stats.body_size(), 10.5);
    }

    #[test]
    fn test_body_size_defaults() {
        assert_eq!(FontStatistics::default().body_size(), 12.0);

        // Two sizes tie for most common
        let mut stats = FontStatistics::default();
        for size in [9.0, 9.0, 14.0, 14.0, 20.0] {
            stats.add_size(size);
        }
        assert_eq!(stats.body_size(), 12.0);
    }

    #[test]
    fn test_classify_overview_scenario() {
        let patterns = HeadingPatterns::new();
        let fragment = frag("1. Overview", 2, 18.0, true, 0.0);
        assert_eq!(patterns.classify(&fragment, 12.0), Some(HeadingLevel::H1));
    }

    #[test]
    fn test_classify_decision_order() {
        let p = HeadingPatterns::new();
        let body = 12.0;

        assert_eq!(p.classify(&frag("Big Title", 1, 16.0, false, 0.0), body), Some(HeadingLevel::H2));
        assert_eq!(p.classify(&frag("Bold Medium", 1, 14.5, true, 0.0), body), Some(HeadingLevel::H3));
        assert_eq!(p.classify(&frag("Plain Medium", 1, 14.5, false, 0.0), body), None);
        assert_eq!(p.classify(&frag("2 Results", 1, 12.0, true, 0.0), body), Some(HeadingLevel::H2));
        assert_eq!(p.classify(&frag("chapter 4 onward", 1, 12.0, true, 0.0), body), Some(HeadingLevel::H2));
        assert_eq!(p.classify(&frag("IV. Scope", 1, 13.0, false, 0.0), body), Some(HeadingLevel::H3));
        assert_eq!(p.classify(&frag("3. Methods", 1, 12.0, false, 0.0), body), Some(HeadingLevel::H2));
        assert_eq!(p.classify(&frag("3.1 Sampling", 1, 12.0, false, 0.0), body), Some(HeadingLevel::H3));
        assert_eq!(p.classify(&frag("3.1 sampling", 1, 12.0, false, 0.0), body), None);
        assert_eq!(p.classify(&frag("Ordinary sentence.", 1, 12.0, true, 0.0), body), None);
    }

    #[test]
    fn test_artifact_filter() {
        let p = HeadingPatterns::new();
        for text in [
            "42",
            "Page 3",
            "page 12 of 30",
            "Copyright 2020",
            "All Rights Reserved.",
            "Table of Contents",
            "www.example.com",
            "See http://x.y",
            "info@example.com",
            "Homepage design",
        ] {
            assert!(p.is_artifact(text), "{text} should be an artifact");
        }
        assert!(!p.is_artifact("1. Introduction"));
        assert!(!p.is_artifact("Results and Discussion"));
    }

    #[test]
    fn test_title_prefers_topmost_prominent_fragment() {
        let fragments = vec![
            frag("Body paragraph on page one", 1, 12.0, false, 300.0),
            frag("Lower Big Text", 1, 20.0, false, 200.0),
            frag("Upper Big Text", 1, 20.0, false, 80.0),
            frag("Page Two Big Text", 2, 30.0, false, 10.0),
        ];
        assert_eq!(strategy().detect_title(&fragments, 12.0), "Upper Big Text");
    }

    #[test]
    fn test_title_fallbacks() {
        let s = strategy();
        let fragments = vec![
            frag("short", 1, 12.0, false, 0.0),
            frag("A longer opening line", 2, 12.0, false, 0.0),
        ];
        assert_eq!(s.detect_title(&fragments, 12.0), "A longer opening line");

        let fragments = vec![frag("Late but long enough", 4, 30.0, false, 0.0)];
        assert_eq!(s.detect_title(&fragments, 12.0), "Untitled Document");
    }

    #[test]
    fn test_headings_exclude_artifacts_and_duplicates() {
        let fragments = vec![
            frag("1. Introduction", 1, 18.0, true, 100.0),
            frag("Page 3", 1, 18.0, true, 700.0),
            frag("Copyright 2020", 1, 18.0, true, 720.0),
            frag("www.example.com", 1, 18.0, true, 740.0),
            frag("1. Introduction", 3, 18.0, true, 100.0),
            frag("Body text that is long enough", 1, 12.0, false, 120.0),
        ];
        let headings = strategy().detect_headings(&fragments, 12.0, &TimeBudget::default());

        assert_eq!(
            headings,
            vec![OutlineEntry::new(HeadingLevel::H1, "1. Introduction", 1)]
        );
    }

    #[test]
    fn test_headings_sorted_alphabetically_within_page() {
        // Reading order on the page is Zebra, then Apple; output is alphabetical.
        let fragments = vec![
            frag("Zebra Section", 1, 18.0, false, 100.0),
            frag("Apple Section", 1, 18.0, false, 400.0),
            frag("Middle Part", 2, 18.0, false, 50.0),
        ];
        let headings = strategy().detect_headings(&fragments, 12.0, &TimeBudget::default());
        let texts: Vec<_> = headings.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, ["Apple Section", "Zebra Section", "Middle Part"]);
    }

    #[test]
    fn test_reading_order_option() {
        let fragments = vec![
            frag("Zebra Section", 1, 18.0, false, 100.0),
            frag("Apple Section", 1, 18.0, false, 400.0),
        ];
        let s = LayoutStrategy::new(&ExtractOptions::default().reading_order());
        let headings = s.detect_headings(&fragments, 12.0, &TimeBudget::default());
        let texts: Vec<_> = headings.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, ["Zebra Section", "Apple Section"]);
    }

    #[test]
    fn test_cleanup_merges_normalized_duplicates() {
        let fragments = vec![
            frag("Results:", 1, 18.0, false, 100.0),
            frag("Results", 1, 18.0, false, 200.0),
            frag("Key   Findings", 1, 18.0, false, 300.0),
        ];
        let headings = strategy().detect_headings(&fragments, 12.0, &TimeBudget::default());
        let texts: Vec<_> = headings.iter().map(|h| h.text.as_str()).collect();
        assert_eq!(texts, ["Key Findings", "Results"]);
    }

    #[test]
    fn test_exhausted_budget_stops_after_first_fragment() {
        let fragments = vec![
            frag("Alpha Heading", 1, 18.0, false, 100.0),
            frag("Beta Heading", 1, 18.0, false, 200.0),
        ];
        let budget = TimeBudget::start_secs(0.0);
        let headings = strategy().detect_headings(&fragments, 12.0, &budget);
        assert_eq!(headings.len(), 1);
        assert_eq!(headings[0].text, "Alpha Heading");
    }

    #[test]
    fn test_low_budget_stops_page_scan_after_first_page() {
        let doc = Pages::new(vec![
            Some(page(1, "1. Opening Remarks")),
            Some(page(2, "2. Second Chapter")),
            Some(page(3, "3. Third Chapter")),
        ]);
        // 0.3s left: below the page cutoff, above the heading cutoff
        let budget = TimeBudget::start(Duration::from_secs(10))
            .with_elapsed(Duration::from_millis(9700));

        let outline = strategy().extract(&doc, &budget).unwrap().unwrap();

        assert_eq!(doc.reads.get(), 1);
        assert_eq!(outline.title, "1. Opening Remarks");
        assert_eq!(
            outline.entries,
            vec![OutlineEntry::new(HeadingLevel::H1, "1. Opening Remarks", 1)]
        );
    }

    #[test]
    fn test_lenient_skips_unreadable_page() {
        let doc = Pages::new(vec![
            None,
            Some(page(2, "2. Second Chapter")),
            Some(page(3, "3. Third Chapter")),
        ]);
        let lenient = LayoutStrategy::new(&ExtractOptions::default().lenient());

        let outline = lenient
            .extract(&doc, &TimeBudget::default())
            .unwrap()
            .unwrap();

        assert_eq!(doc.reads.get(), 3);
        let texts: Vec<_> = outline.entries.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, ["2. Second Chapter", "3. Third Chapter"]);
        assert_eq!(outline.entries[0].page, 2);
    }

    #[test]
    fn test_strict_fails_on_unreadable_page() {
        let doc = Pages::new(vec![Some(page(1, "1. Opening Remarks")), None]);
        let result = strategy().extract(&doc, &TimeBudget::default());
        assert!(matches!(result, Err(Error::Corrupted(_))));
    }
}
