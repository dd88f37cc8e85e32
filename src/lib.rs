//! # unoutline
//!
//! Infers a document outline (title plus H1–H3 headings with page numbers)
//! from PDF files, even when the file declares no usable bookmarks.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unoutline::extract_outline;
//!
//! let outline = extract_outline("document.pdf");
//! println!("{}", outline.title);
//! for entry in &outline.entries {
//!     println!("{} {} (p. {})", entry.level, entry.text, entry.page);
//! }
//! ```
//!
//! ## Strategies
//!
//! Three strategies are tried in order, each gated by a wall-clock budget:
//!
//! - **Bookmarks**: the document's native outline tree
//! - **Layout**: font size, weight, and numbering of positioned text
//! - **Patterns**: regular expressions over raw page text
//!
//! The first candidate with 1 to 100 entries wins. Extraction never fails:
//! a document that cannot be read yields an "Error in Processing" outline.

pub mod batch;
pub mod engine;
pub mod error;
pub mod extract;
pub mod model;

pub use batch::{process_directory, BatchOptions, BatchReport, JsonFormat};
pub use engine::{DocumentEngine, DocumentHandle, LopdfDocument, LopdfEngine};
pub use error::{Error, Result};
pub use extract::{
    ErrorMode, ExtractOptions, HeadingOrder, OutlineExtractor, ResultValidator, Strategy,
    TimeBudget,
};
pub use model::{Bookmark, HeadingLevel, Outline, OutlineEntry, TextFragment};

use std::path::Path;

/// Extract the outline of a PDF file with default options.
///
/// # Example
///
/// ```no_run
/// use unoutline::extract_outline;
///
/// let outline = extract_outline("document.pdf");
/// assert!(outline.entries.len() <= 100);
/// ```
pub fn extract_outline<P: AsRef<Path>>(path: P) -> Outline {
    OutlineExtractor::default().extract(path)
}

/// Extract the outline of a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use unoutline::{extract_outline_with_options, ExtractOptions};
///
/// let options = ExtractOptions::new()
///     .with_max_runtime_secs(5.0)
///     .lenient();
/// let outline = extract_outline_with_options("document.pdf", options);
/// ```
pub fn extract_outline_with_options<P: AsRef<Path>>(path: P, options: ExtractOptions) -> Outline {
    OutlineExtractor::new(options).extract(path)
}

/// Extract the outline of a PDF file as JSON.
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    batch::to_json(&extract_outline(path), format)
}

/// Builder for extracting outlines.
///
/// # Example
///
/// ```no_run
/// use unoutline::Unoutline;
///
/// let report = Unoutline::new()
///     .with_max_pages(20)
///     .reading_order()
///     .compact()
///     .process_directory("input", "output")?;
/// println!("{} files written", report.written.len());
/// # Ok::<(), unoutline::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Unoutline {
    extract_options: ExtractOptions,
    batch_options: BatchOptions,
}

impl Unoutline {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip unreadable pages instead of failing the document.
    pub fn lenient(mut self) -> Self {
        self.extract_options = self.extract_options.lenient();
        self
    }

    /// Order layout headings top to bottom within a page.
    pub fn reading_order(mut self) -> Self {
        self.extract_options = self.extract_options.reading_order();
        self
    }

    /// Set the per-document budget in seconds.
    pub fn with_max_runtime_secs(mut self, seconds: f64) -> Self {
        self.extract_options = self.extract_options.with_max_runtime_secs(seconds);
        self
    }

    /// Set the page scan cap.
    pub fn with_max_pages(mut self, pages: u32) -> Self {
        self.extract_options = self.extract_options.with_max_pages(pages);
        self
    }

    /// Write compact JSON in batch mode.
    pub fn compact(mut self) -> Self {
        self.batch_options = self.batch_options.compact();
        self
    }

    /// Build the extractor.
    pub fn extractor(&self) -> OutlineExtractor {
        OutlineExtractor::new(self.extract_options.clone())
    }

    /// Extract one document.
    pub fn extract<P: AsRef<Path>>(&self, path: P) -> Outline {
        self.extractor().extract(path)
    }

    /// Process every PDF in `input_dir` into `output_dir`.
    pub fn process_directory<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_dir: P,
        output_dir: Q,
    ) -> Result<BatchReport> {
        batch::process_directory(
            input_dir.as_ref(),
            output_dir.as_ref(),
            &self.extractor(),
            &self.batch_options,
        )
    }
}
