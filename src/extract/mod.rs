//! Outline extraction strategies and the pipeline that chains them.
//!
//! Strategies run cheapest first: native bookmarks, then layout analysis,
//! then regex matching over raw text. Each candidate must pass the
//! [`ResultValidator`] before it is accepted.

mod budget;
mod layout;
mod metadata;
mod options;
mod pattern;
mod pipeline;
mod validator;

pub use budget::TimeBudget;
pub use layout::{FontStatistics, HeadingPatterns, LayoutStrategy, DEFAULT_BODY_SIZE};
pub use metadata::MetadataStrategy;
pub use options::{ErrorMode, ExtractOptions, HeadingOrder};
pub use pattern::PatternStrategy;
pub use pipeline::OutlineExtractor;
pub use validator::ResultValidator;

use crate::engine::DocumentHandle;
use crate::error::Result;
use crate::model::Outline;

/// One way of producing a candidate outline from an open document.
pub trait Strategy {
    /// Name used in log lines.
    fn name(&self) -> &'static str;

    /// Produce a candidate, or `None` when the strategy found nothing.
    fn extract(&self, doc: &dyn DocumentHandle, budget: &TimeBudget) -> Result<Option<Outline>>;
}

/// Apply the error mode to a single page read.
///
/// Strict mode propagates the failure; lenient mode logs it and yields `None`.
pub(crate) fn read_page<T>(mode: ErrorMode, page_index: u32, result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            if mode == ErrorMode::Strict {
                return Err(e);
            }
            log::warn!("Failed to read page {}: {}", page_index + 1, e);
            Ok(None)
        }
    }
}
