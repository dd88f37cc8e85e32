//! Directory batch processing and JSON output.

use std::fs;
use std::path::{Path, PathBuf};

use crate::engine::DocumentEngine;
use crate::error::{Error, Result};
use crate::extract::OutlineExtractor;
use crate::model::Outline;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Two-space indented JSON
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize an outline. Non-ASCII text is written unescaped.
pub fn to_json(outline: &Outline, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(outline),
        JsonFormat::Compact => serde_json::to_string(outline),
    };

    Ok(result?)
}

/// Options for batch processing.
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Output JSON format
    pub json_format: JsonFormat,
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output JSON format.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }

    /// Write compact JSON.
    pub fn compact(mut self) -> Self {
        self.json_format = JsonFormat::Compact;
        self
    }
}

/// Progress notifications emitted while a batch runs.
#[derive(Debug)]
pub enum BatchEvent<'a> {
    /// A document is about to be processed
    Started {
        input: &'a Path,
        index: usize,
        total: usize,
    },
    /// An output file was written
    Saved { input: &'a Path, output: &'a Path },
    /// An output file could not be written
    Failed { input: &'a Path, error: &'a Error },
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Output files written, in processing order
    pub written: Vec<PathBuf>,
    /// Inputs whose output could not be written
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    /// Number of documents processed.
    pub fn total(&self) -> usize {
        self.written.len() + self.failed.len()
    }

    /// Check whether every output was written.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// List `*.pdf` files in a directory, sorted by file name.
pub fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "pdf") {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Process every PDF in `input_dir`, writing `<stem>.json` into `output_dir`.
pub fn process_directory<E: DocumentEngine>(
    input_dir: &Path,
    output_dir: &Path,
    extractor: &OutlineExtractor<E>,
    options: &BatchOptions,
) -> Result<BatchReport> {
    process_directory_with(input_dir, output_dir, extractor, options, |_| {})
}

/// Like [`process_directory`], reporting progress through `on_event`.
///
/// A missing input directory is an error and nothing is written. Once the
/// batch has started, a failure on one document never stops the others.
pub fn process_directory_with<E, F>(
    input_dir: &Path,
    output_dir: &Path,
    extractor: &OutlineExtractor<E>,
    options: &BatchOptions,
    mut on_event: F,
) -> Result<BatchReport>
where
    E: DocumentEngine,
    F: FnMut(BatchEvent<'_>),
{
    if !input_dir.is_dir() {
        return Err(Error::InputNotFound(input_dir.to_path_buf()));
    }

    let files = list_pdfs(input_dir)?;
    fs::create_dir_all(output_dir)?;

    let mut report = BatchReport::default();
    let total = files.len();

    for (index, input) in files.iter().enumerate() {
        on_event(BatchEvent::Started {
            input,
            index,
            total,
        });

        let outline = extractor.extract(input);
        let output = output_path(output_dir, input);

        match write_outline(&outline, &output, options.json_format) {
            Ok(()) => {
                on_event(BatchEvent::Saved {
                    input,
                    output: &output,
                });
                report.written.push(output);
            }
            Err(error) => {
                log::error!("Failed to write {}: {}", output.display(), error);
                on_event(BatchEvent::Failed {
                    input,
                    error: &error,
                });
                report.failed.push((input.clone(), error.to_string()));
            }
        }
    }

    Ok(report)
}

/// `<output_dir>/<stem>.json`
pub fn output_path(output_dir: &Path, input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    let mut name = stem.to_os_string();
    name.push(".json");
    output_dir.join(name)
}

fn write_outline(outline: &Outline, path: &Path, format: JsonFormat) -> Result<()> {
    let json = to_json(outline, format)?;
    fs::write(path, json)?;
    Ok(())
}
