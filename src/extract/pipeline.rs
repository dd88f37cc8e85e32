//! Strategy chain with time gates and fault isolation.

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use super::budget::TimeBudget;
use super::layout::LayoutStrategy;
use super::metadata::MetadataStrategy;
use super::options::ExtractOptions;
use super::pattern::PatternStrategy;
use super::validator::ResultValidator;
use super::Strategy;
use crate::engine::{DocumentEngine, LopdfEngine};
use crate::error::Result;
use crate::model::Outline;

/// Extracts an outline from one document at a time.
///
/// The extractor holds no per-document state; each call starts a fresh
/// [`TimeBudget`] and opens its own handles, so one instance can process a
/// whole batch.
#[derive(Debug, Clone)]
pub struct OutlineExtractor<E: DocumentEngine = LopdfEngine> {
    engine: E,
    options: ExtractOptions,
    validator: ResultValidator,
    metadata: MetadataStrategy,
    layout: LayoutStrategy,
    pattern: PatternStrategy,
}

impl OutlineExtractor<LopdfEngine> {
    /// Create an extractor backed by lopdf.
    pub fn new(options: ExtractOptions) -> Self {
        Self::with_engine(LopdfEngine, options)
    }
}

impl Default for OutlineExtractor<LopdfEngine> {
    fn default() -> Self {
        Self::new(ExtractOptions::default())
    }
}

impl<E: DocumentEngine> OutlineExtractor<E> {
    /// Create an extractor over a custom document engine.
    pub fn with_engine(engine: E, options: ExtractOptions) -> Self {
        Self {
            engine,
            validator: ResultValidator::new(options.min_entries, options.max_entries),
            metadata: MetadataStrategy::new(),
            layout: LayoutStrategy::new(&options),
            pattern: PatternStrategy::new(&options),
            options,
        }
    }

    /// Options in effect.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract an outline. Never fails: unexpected errors, including panics
    /// inside the PDF library, yield the "Error in Processing" outline.
    pub fn extract(&self, path: impl AsRef<Path>) -> Outline {
        self.extract_with_budget(path, TimeBudget::start(self.options.max_runtime))
    }

    /// Extract an outline against an already running budget.
    pub fn extract_with_budget(&self, path: impl AsRef<Path>, budget: TimeBudget) -> Outline {
        let path = path.as_ref();
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.try_extract(path, &budget)));

        match result {
            Ok(Ok(outline)) => outline,
            Ok(Err(e)) => {
                log::error!("Exception processing {}: {}", path.display(), e);
                Outline::processing_error()
            }
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                log::error!("Panic processing {}: {}", path.display(), message);
                Outline::processing_error()
            }
        }
    }

    /// Run the strategy chain, propagating the first hard error.
    pub fn try_extract(&self, path: &Path, budget: &TimeBudget) -> Result<Outline> {
        if let Some(outline) = self.attempt(&self.metadata, path, budget)? {
            return Ok(outline);
        }

        if budget.has_more_than(self.options.layout_min_remaining) {
            if let Some(outline) = self.attempt(&self.layout, path, budget)? {
                return Ok(outline);
            }
        } else {
            log::debug!("Skipping layout analysis: {:.2}s left", budget.remaining());
        }

        if budget.has_more_than(self.options.pattern_min_remaining) {
            if let Some(outline) = self.attempt(&self.pattern, path, budget)? {
                return Ok(outline);
            }
        } else {
            log::debug!("Skipping pattern matching: {:.2}s left", budget.remaining());
        }

        log::warn!(
            "No valid outline extracted for {}; returning empty outline",
            path.display()
        );
        Ok(Outline::untitled())
    }

    /// Open a fresh handle, run one strategy, and keep the candidate only if
    /// the validator accepts it. The handle is dropped before returning.
    fn attempt(
        &self,
        strategy: &dyn Strategy,
        path: &Path,
        budget: &TimeBudget,
    ) -> Result<Option<Outline>> {
        let candidate = {
            let handle = self.engine.open(path)?;
            strategy.extract(&handle, budget)?
        };

        if !self.validator.accepts(candidate.as_ref()) {
            log::debug!(
                "{} candidate rejected ({} entries)",
                strategy.name(),
                candidate.as_ref().map_or(0, Outline::len)
            );
            return Ok(None);
        }

        log::info!(
            "{} extraction completed in {:.2} seconds (max allowed: {}s)",
            strategy.name(),
            budget.elapsed().as_secs_f64(),
            budget.max_runtime().as_secs_f64()
        );
        Ok(candidate)
    }
}
