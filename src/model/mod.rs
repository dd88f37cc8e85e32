//! Data model shared by the document engine and the extraction strategies.
//!
//! Fragments and bookmarks flow in from the engine; outlines flow out of the
//! pipeline. Nothing here outlives a single document.

mod fragment;
mod outline;
mod text;

pub use fragment::{is_bold_font_name, Bookmark, TextFragment};
pub use outline::{HeadingLevel, Outline, OutlineEntry, ERROR_TITLE, UNTITLED};
pub use text::{char_len, len_within, normalize_heading};
