//! PDF header sniffing done before handing a file to the engine.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Readers accept junk before the header as long as it starts within this window.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// PDF header information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfHeader {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
    /// Byte offset of the `%PDF-` marker
    pub offset: usize,
}

impl std::fmt::Display for PdfHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

/// Sniff the PDF header of a file.
///
/// # Returns
/// * `Ok(PdfHeader)` if a `%PDF-x.y` marker starts within the first kilobyte
/// * `Err(Error::UnknownFormat)` otherwise
pub fn detect_header_from_path<P: AsRef<Path>>(path: P) -> Result<PdfHeader> {
    let file = File::open(path)?;
    let mut head = Vec::with_capacity(HEADER_SEARCH_WINDOW + PDF_MAGIC.len() + VERSION_LEN);
    file.take((HEADER_SEARCH_WINDOW + PDF_MAGIC.len() + VERSION_LEN) as u64)
        .read_to_end(&mut head)?;
    detect_header_from_bytes(&head)
}

/// Sniff the PDF header from the leading bytes of a file.
pub fn detect_header_from_bytes(data: &[u8]) -> Result<PdfHeader> {
    let window = &data[..data.len().min(HEADER_SEARCH_WINDOW + PDF_MAGIC.len())];
    let offset = window
        .windows(PDF_MAGIC.len())
        .position(|w| w == PDF_MAGIC)
        .ok_or(Error::UnknownFormat)?;

    let start = offset + PDF_MAGIC.len();
    let version_bytes = data
        .get(start..start + VERSION_LEN)
        .ok_or(Error::UnknownFormat)?;
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(PdfHeader { version, offset })
}

/// Check if a version string looks like `d.d`.
fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3 && bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit()
}

/// Check if bytes start like a PDF file.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    detect_header_from_bytes(data).is_ok()
}
