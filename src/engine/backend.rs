//! `lopdf`-backed document engine.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId};
use unicode_normalization::UnicodeNormalization;

use super::content::{
    collect_runs, decode_text_simple, merge_runs, runs_to_text, ContentOp, FontResolver, PdfValue,
    PositionedRun,
};
use super::detect::{detect_header_from_bytes, detect_header_from_path};
use super::{DocumentEngine, DocumentHandle};
use crate::error::{Error, Result};
use crate::model::{Bookmark, TextFragment};

/// Default page height (US Letter) when no MediaBox can be found.
const DEFAULT_PAGE_HEIGHT: f32 = 792.0;

/// Guards against cyclic or absurdly deep outline and page trees.
const MAX_TREE_DEPTH: usize = 64;

/// Opens PDF files with lopdf.
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfEngine;

impl LopdfEngine {
    /// Create a new engine.
    pub fn new() -> Self {
        Self
    }
}

impl DocumentEngine for LopdfEngine {
    type Handle = LopdfDocument;

    fn open(&self, path: &Path) -> Result<LopdfDocument> {
        LopdfDocument::load_file(path)
    }
}

/// An open PDF document.
pub struct LopdfDocument {
    doc: Document,
    /// page number (1-indexed) -> page object
    pages: BTreeMap<u32, ObjectId>,
}

impl LopdfDocument {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        detect_header_from_path(path)?;
        let doc = Document::load(path).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;
        Ok(Self::from_document(doc))
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        detect_header_from_bytes(data)?;
        let doc = Document::load_mem(data).map_err(|e| match e {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::from(e),
        })?;
        Ok(Self::from_document(doc))
    }

    /// Wrap an already loaded `lopdf::Document`.
    pub fn from_document(doc: Document) -> Self {
        if doc.is_encrypted() {
            log::warn!("Document is encrypted; text extraction may be incomplete");
        }
        let pages = doc.get_pages();
        Self { doc, pages }
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &Document {
        &self.doc
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn page_id(&self, page_index: u32) -> Result<ObjectId> {
        self.pages
            .get(&(page_index + 1))
            .copied()
            .ok_or(Error::PageOutOfRange(page_index + 1, self.page_count()))
    }

    /// Height of the page's MediaBox, following inheritance through /Parent.
    fn page_height(&self, page_id: ObjectId) -> f32 {
        let mut current = self.doc.get_dictionary(page_id).ok();
        for _ in 0..MAX_TREE_DEPTH {
            let Some(dict) = current else { break };
            if let Ok(media_box) = dict.get(b"MediaBox") {
                if let Some(array) = self.resolve(media_box).and_then(|o| o.as_array().ok()) {
                    if array.len() >= 4 {
                        let y0 = number(&array[1]).unwrap_or(0.0);
                        let y1 = number(&array[3]).unwrap_or(DEFAULT_PAGE_HEIGHT);
                        return (y1 - y0).abs();
                    }
                }
            }
            current = dict
                .get(b"Parent")
                .ok()
                .and_then(|p| p.as_reference().ok())
                .and_then(|id| self.doc.get_dictionary(id).ok());
        }
        DEFAULT_PAGE_HEIGHT
    }

    /// Raw (decompressed) content stream bytes for a page.
    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let Ok(contents) = page_dict.get(b"Contents") else {
            // A page without content streams is blank, not broken.
            return Ok(Vec::new());
        };

        match self.resolve(contents) {
            Some(Object::Stream(s)) => s
                .decompressed_content()
                .or_else(|_| Ok(s.content.clone())),
            Some(Object::Array(arr)) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Some(Object::Stream(s)) = self.resolve(obj) {
                        if let Ok(data) = s.decompressed_content() {
                            content.extend_from_slice(&data);
                            content.push(b' ');
                        }
                    }
                }
                Ok(content)
            }
            _ => Err(Error::Corrupted(
                "page /Contents is neither a stream nor an array".to_string(),
            )),
        }
    }

    /// Text runs of a page in content stream order.
    fn page_runs(&self, page_id: ObjectId) -> Result<Vec<PositionedRun>> {
        let fonts = PageFonts::load(&self.doc, page_id)?;
        let content = self.page_content(page_id)?;
        let ops = decode_content(&content)?;
        Ok(collect_runs(&ops, &fonts))
    }

    /// Follow a reference, if `obj` is one.
    fn resolve<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(id) => self.doc.get_object(*id).ok(),
            other => Some(other),
        }
    }

    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        self.resolve(obj).and_then(|o| o.as_dict().ok())
    }

    fn catalog(&self) -> Option<&Dictionary> {
        self.doc.catalog().ok()
    }

    /// Walk sibling chains depth-first, collecting bookmarks.
    fn walk_outline(
        &self,
        first: ObjectId,
        level: u32,
        page_numbers: &HashMap<ObjectId, u32>,
        visited: &mut HashSet<ObjectId>,
        out: &mut Vec<Bookmark>,
    ) {
        if level as usize > MAX_TREE_DEPTH {
            return;
        }

        let mut current = Some(first);
        while let Some(item_id) = current {
            if !visited.insert(item_id) {
                log::warn!("Cyclic outline reference at {:?}", item_id);
                break;
            }
            let Ok(item) = self.doc.get_dictionary(item_id) else {
                break;
            };

            let title = item
                .get(b"Title")
                .ok()
                .and_then(|t| self.resolve(t))
                .and_then(pdf_string)
                .unwrap_or_default();
            let page = self.item_destination(item, page_numbers);
            out.push(Bookmark::new(level, title, page));

            if let Ok(child) = item.get(b"First").and_then(Object::as_reference) {
                self.walk_outline(child, level + 1, page_numbers, visited, out);
            }

            current = item.get(b"Next").and_then(Object::as_reference).ok();
        }
    }

    /// Page targeted by an outline item (/Dest, then a GoTo /A action).
    fn item_destination(
        &self,
        item: &Dictionary,
        page_numbers: &HashMap<ObjectId, u32>,
    ) -> Option<u32> {
        if let Ok(dest) = item.get(b"Dest") {
            if let Some(page) = self.resolve_destination(dest, page_numbers, 0) {
                return Some(page);
            }
        }

        let action = item.get(b"A").ok().and_then(|a| self.resolve_dict(a))?;
        match action.get(b"S").and_then(Object::as_name) {
            Ok(b"GoTo") | Err(_) => {}
            Ok(_) => return None,
        }
        let dest = action.get(b"D").ok()?;
        self.resolve_destination(dest, page_numbers, 0)
    }

    /// Resolve an explicit or named destination to a page number.
    fn resolve_destination(
        &self,
        dest: &Object,
        page_numbers: &HashMap<ObjectId, u32>,
        depth: usize,
    ) -> Option<u32> {
        if depth > 4 {
            return None;
        }
        match self.resolve(dest)? {
            Object::Array(arr) => match arr.first()? {
                Object::Reference(page_ref) => page_numbers.get(page_ref).copied(),
                _ => None,
            },
            Object::Dictionary(d) => {
                let inner = d.get(b"D").ok()?;
                self.resolve_destination(inner, page_numbers, depth + 1)
            }
            Object::String(bytes, _) => {
                let target = self.lookup_named_destination(bytes)?;
                self.resolve_destination(target, page_numbers, depth + 1)
            }
            Object::Name(name) => {
                let target = self.lookup_named_destination(name)?;
                self.resolve_destination(target, page_numbers, depth + 1)
            }
            _ => None,
        }
    }

    /// Look a destination name up in /Names /Dests, then the legacy /Dests dictionary.
    fn lookup_named_destination(&self, name: &[u8]) -> Option<&Object> {
        let catalog = self.catalog()?;

        if let Some(tree) = catalog
            .get(b"Names")
            .ok()
            .and_then(|n| self.resolve_dict(n))
            .and_then(|names| names.get(b"Dests").ok())
            .and_then(|d| self.resolve_dict(d))
        {
            if let Some(found) = self.lookup_name_tree(tree, name, 0) {
                return Some(found);
            }
        }

        catalog
            .get(b"Dests")
            .ok()
            .and_then(|d| self.resolve_dict(d))
            .and_then(|dests| dests.get(name).ok())
    }

    fn lookup_name_tree<'a>(
        &'a self,
        node: &'a Dictionary,
        name: &[u8],
        depth: usize,
    ) -> Option<&'a Object> {
        if depth > MAX_TREE_DEPTH {
            return None;
        }

        if let Some(pairs) = node
            .get(b"Names")
            .ok()
            .and_then(|n| self.resolve(n))
            .and_then(|n| n.as_array().ok())
        {
            for pair in pairs.chunks_exact(2) {
                if let Some(Object::String(key, _)) = self.resolve(&pair[0]) {
                    if key.as_slice() == name {
                        return Some(&pair[1]);
                    }
                }
            }
        }

        let kids = node
            .get(b"Kids")
            .ok()
            .and_then(|k| self.resolve(k))
            .and_then(|k| k.as_array().ok())?;
        kids.iter()
            .filter_map(|kid| self.resolve_dict(kid))
            .find_map(|kid| self.lookup_name_tree(kid, name, depth + 1))
    }
}

impl DocumentHandle for LopdfDocument {
    fn bookmarks(&self) -> Result<Vec<Bookmark>> {
        let mut bookmarks = Vec::new();

        let Some(first) = self
            .catalog()
            .and_then(|c| c.get(b"Outlines").ok())
            .and_then(|o| self.resolve_dict(o))
            .and_then(|outlines| outlines.get(b"First").ok())
            .and_then(|f| f.as_reference().ok())
        else {
            return Ok(bookmarks);
        };

        let page_numbers: HashMap<ObjectId, u32> =
            self.pages.iter().map(|(num, id)| (*id, *num)).collect();
        let mut visited = HashSet::new();
        self.walk_outline(first, 1, &page_numbers, &mut visited, &mut bookmarks);

        log::debug!("Found {} native bookmarks", bookmarks.len());
        Ok(bookmarks)
    }

    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_fragments(&self, page_index: u32) -> Result<Vec<TextFragment>> {
        let page_id = self.page_id(page_index)?;
        let runs = self.page_runs(page_id)?;
        let height = self.page_height(page_id);

        Ok(merge_runs(runs)
            .into_iter()
            .map(|run| {
                TextFragment::from_font(
                    run.text.nfc().collect::<String>(),
                    page_index + 1,
                    run.font_size,
                    &run.font_name,
                    height - run.y,
                )
            })
            .collect())
    }

    fn page_raw_text(&self, page_index: u32) -> Result<String> {
        let page_id = self.page_id(page_index)?;
        let runs = self
            .page_runs(page_id)
            .map_err(|e| Error::TextExtract(format!("Page {}: {}", page_index + 1, e)))?;
        Ok(runs_to_text(&runs).nfc().collect())
    }
}

/// Font dictionaries of one page.
struct PageFonts<'a> {
    doc: &'a Document,
    fonts: BTreeMap<Vec<u8>, &'a Dictionary>,
}

impl<'a> PageFonts<'a> {
    fn load(doc: &'a Document, page_id: ObjectId) -> Result<Self> {
        let fonts = doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;
        Ok(Self { doc, fonts })
    }
}

impl FontResolver for PageFonts<'_> {
    fn base_font(&self, resource: &[u8]) -> Option<String> {
        self.fonts
            .get(resource)
            .and_then(|f| f.get(b"BaseFont").ok())
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
    }

    fn decode(&self, resource: &[u8], bytes: &[u8]) -> String {
        if let Some(font) = self.fonts.get(resource) {
            if let Ok(encoding) = font.get_font_encoding(self.doc) {
                if let Ok(text) = Document::decode_text(&encoding, bytes) {
                    return text;
                }
            }
        }
        decode_text_simple(bytes)
    }
}

/// Parse raw content stream bytes into operations.
fn decode_content(data: &[u8]) -> Result<Vec<ContentOp>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }
    let content =
        lopdf::content::Content::decode(data).map_err(|e| Error::PdfParse(e.to_string()))?;

    Ok(content
        .operations
        .into_iter()
        .map(|op| ContentOp::new(op.operator, op.operands.iter().map(convert_object).collect()))
        .collect())
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Decode a PDF text string (UTF-16BE with BOM, UTF-8, or Latin-1).
fn pdf_string(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => Some(decode_text_simple(bytes)),
        Object::Name(bytes) => Some(String::from_utf8_lossy(bytes).to_string()),
        _ => None,
    }
}
