//! Document engine abstraction layer.
//!
//! Strategies read documents only through [`DocumentEngine`] and
//! [`DocumentHandle`], isolating the concrete PDF library (lopdf) from the
//! outline heuristics. A handle is released by dropping it.

mod backend;
mod content;
mod detect;

use std::path::Path;

use crate::error::Result;
use crate::model::{Bookmark, TextFragment};

pub use backend::{LopdfDocument, LopdfEngine};
pub use content::{
    collect_runs, decode_text_simple, merge_runs, runs_to_text, ContentOp, FontResolver, PdfValue,
    PositionedRun,
};
pub use detect::{detect_header_from_bytes, detect_header_from_path, is_pdf_bytes, PdfHeader};

/// Opens documents for reading.
pub trait DocumentEngine {
    /// Handle type produced by [`DocumentEngine::open`].
    type Handle: DocumentHandle;

    /// Open the document at `path`.
    fn open(&self, path: &Path) -> Result<Self::Handle>;
}

/// Read-only access to one open document.
pub trait DocumentHandle {
    /// Native bookmarks in document order, depth-first.
    fn bookmarks(&self) -> Result<Vec<Bookmark>>;

    /// Number of pages.
    fn page_count(&self) -> u32;

    /// Positioned text fragments of a page (`page_index` is 0-based).
    fn page_fragments(&self, page_index: u32) -> Result<Vec<TextFragment>>;

    /// Plain text of a page (`page_index` is 0-based).
    fn page_raw_text(&self, page_index: u32) -> Result<String>;
}
