//! Extraction options and configuration.

use std::time::Duration;

/// Options for outline extraction.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Wall-clock budget per document
    pub max_runtime: Duration,

    /// Pages inspected by the layout and pattern strategies
    pub max_pages: u32,

    /// Layout analysis runs only if more than this many seconds remain
    pub layout_min_remaining: f64,

    /// Pattern matching runs only if more than this many seconds remain
    pub pattern_min_remaining: f64,

    /// Page scanning stops once fewer than this many seconds remain
    pub page_scan_cutoff: f64,

    /// Heading classification stops once fewer than this many seconds remain
    pub heading_scan_cutoff: f64,

    /// Pattern matching keeps at most this many headings
    pub pattern_max_entries: usize,

    /// Smallest acceptable outline
    pub min_entries: usize,

    /// Largest acceptable outline
    pub max_entries: usize,

    /// Ordering of layout headings within a page
    pub heading_order: HeadingOrder,

    /// What happens when a single page cannot be read
    pub error_mode: ErrorMode,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-document budget.
    pub fn with_max_runtime(mut self, max_runtime: Duration) -> Self {
        self.max_runtime = max_runtime;
        self
    }

    /// Set the per-document budget in seconds.
    pub fn with_max_runtime_secs(mut self, seconds: f64) -> Self {
        self.max_runtime = Duration::try_from_secs_f64(seconds).unwrap_or(Duration::ZERO);
        self
    }

    /// Set the page scan cap.
    pub fn with_max_pages(mut self, pages: u32) -> Self {
        self.max_pages = pages;
        self
    }

    /// Set the remaining-time gates for the layout and pattern strategies.
    pub fn with_fallback_gates(mut self, layout: f64, pattern: f64) -> Self {
        self.layout_min_remaining = layout;
        self.pattern_min_remaining = pattern;
        self
    }

    /// Set the number of headings kept by pattern matching.
    pub fn with_pattern_max_entries(mut self, entries: usize) -> Self {
        self.pattern_max_entries = entries;
        self
    }

    /// Set the accepted entry count range.
    pub fn with_entry_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_entries = min;
        self.max_entries = max;
        self
    }

    /// Set heading order.
    pub fn with_heading_order(mut self, order: HeadingOrder) -> Self {
        self.heading_order = order;
        self
    }

    /// Order layout headings by position on the page.
    pub fn reading_order(mut self) -> Self {
        self.heading_order = HeadingOrder::ReadingOrder;
        self
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip unreadable pages).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_runtime: Duration::from_secs(10),
            max_pages: 50,
            layout_min_remaining: 5.0,
            pattern_min_remaining: 1.0,
            page_scan_cutoff: 0.5,
            heading_scan_cutoff: 0.2,
            pattern_max_entries: 20,
            min_entries: 1,
            max_entries: 100,
            heading_order: HeadingOrder::Alphabetical,
            error_mode: ErrorMode::Strict,
        }
    }
}

/// Ordering of headings found by layout analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadingOrder {
    /// By page, then alphabetically by text
    #[default]
    Alphabetical,
    /// By page, then top to bottom
    ReadingOrder,
}

/// Error handling mode for page-level failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// A page failure fails the whole attempt
    #[default]
    Strict,
    /// Skip the page and continue
    Lenient,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ExtractOptions::default();
        assert_eq!(options.max_runtime, Duration::from_secs(10));
        assert_eq!(options.max_pages, 50);
        assert_eq!(options.layout_min_remaining, 5.0);
        assert_eq!(options.pattern_min_remaining, 1.0);
        assert_eq!(options.pattern_max_entries, 20);
        assert_eq!((options.min_entries, options.max_entries), (1, 100));
        assert_eq!(options.heading_order, HeadingOrder::Alphabetical);
        assert_eq!(options.error_mode, ErrorMode::Strict);
    }

    #[test]
    fn test_extract_options_builder() {
        let options = ExtractOptions::new()
            .with_max_runtime_secs(2.5)
            .with_max_pages(10)
            .with_fallback_gates(1.0, 0.5)
            .reading_order()
            .lenient();

        assert_eq!(options.max_runtime, Duration::from_millis(2500));
        assert_eq!(options.max_pages, 10);
        assert_eq!(options.layout_min_remaining, 1.0);
        assert_eq!(options.pattern_min_remaining, 0.5);
        assert_eq!(options.heading_order, HeadingOrder::ReadingOrder);
        assert_eq!(options.error_mode, ErrorMode::Lenient);
    }
}
