//! Synthetic PDF documents for integration tests.

#![allow(dead_code)]

use std::path::Path;

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

/// A bookmark to add: nesting level (1 or 2), title, 0-based target page.
pub struct Mark<'a>(pub u32, pub &'a str, pub usize);

/// Build a PDF whose pages carry the given content streams. Fonts `F1`
/// (Helvetica) and `F2` (Helvetica-Bold) are available on every page.
pub fn build_pdf(pages: &[&str], marks: &[Mark<'_>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id: ObjectId = doc.new_object_id();

    let regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let resources = dictionary! {
        "Font" => dictionary! { "F1" => regular, "F2" => bold },
    };

    let mut page_ids = Vec::new();
    for content in pages {
        let content_id = doc.add_object(Object::Stream(Stream::new(
            Dictionary::new(),
            content.as_bytes().to_vec(),
        )));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => resources.clone(),
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| Object::from(*id)).collect::<Vec<_>>(),
            "Count" => page_ids.len() as i64,
        }),
    );

    let mut catalog = dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    };
    if !marks.is_empty() {
        let outlines_id = add_outline(&mut doc, &page_ids, marks);
        catalog.set("Outlines", outlines_id);
    }

    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).expect("failed to save test PDF");
    buf
}

/// Outline tree with top-level items and children nested under the
/// preceding top-level item.
fn add_outline(doc: &mut Document, page_ids: &[ObjectId], marks: &[Mark<'_>]) -> ObjectId {
    let outlines_id = doc.new_object_id();
    let ids: Vec<ObjectId> = marks.iter().map(|_| doc.new_object_id()).collect();

    // (item, children)
    let mut tree: Vec<(usize, Vec<usize>)> = Vec::new();
    for (i, mark) in marks.iter().enumerate() {
        match tree.last_mut() {
            Some((_, children)) if mark.0 > 1 => children.push(i),
            _ => tree.push((i, Vec::new())),
        }
    }

    let link = |dict: &mut Dictionary, siblings: &[usize], pos: usize| {
        if pos > 0 {
            dict.set("Prev", ids[siblings[pos - 1]]);
        }
        if pos + 1 < siblings.len() {
            dict.set("Next", ids[siblings[pos + 1]]);
        }
    };

    let top: Vec<usize> = tree.iter().map(|(i, _)| *i).collect();
    for (pos, (item, children)) in tree.iter().enumerate() {
        for (child_pos, child) in children.iter().enumerate() {
            let mark = &marks[*child];
            let mut dict = dictionary! {
                "Title" => Object::String(mark.1.as_bytes().to_vec(), StringFormat::Literal),
                "Parent" => ids[*item],
                "Dest" => vec![page_ids[mark.2].into(), "Fit".into()],
            };
            link(&mut dict, children, child_pos);
            doc.objects.insert(ids[*child], Object::Dictionary(dict));
        }

        let mark = &marks[*item];
        let mut dict = dictionary! {
            "Title" => Object::String(mark.1.as_bytes().to_vec(), StringFormat::Literal),
            "Parent" => outlines_id,
            "Dest" => vec![page_ids[mark.2].into(), "Fit".into()],
        };
        if let (Some(first), Some(last)) = (children.first(), children.last()) {
            dict.set("First", ids[*first]);
            dict.set("Last", ids[*last]);
        }
        link(&mut dict, &top, pos);
        doc.objects.insert(ids[*item], Object::Dictionary(dict));
    }

    doc.objects.insert(
        outlines_id,
        Object::Dictionary(dictionary! {
            "Type" => "Outlines",
            "First" => ids[top[0]],
            "Last" => ids[top[top.len() - 1]],
        }),
    );
    outlines_id
}

/// Page 1: an 18pt bold numbered heading above two lines of body text.
pub const HEADING_PAGE: &str = "BT /F2 18 Tf 72 700 Td (1. Overview) Tj ET \
     BT /F1 12 Tf 72 650 Td (Body text here) Tj ET \
     BT /F1 12 Tf 72 630 Td (More body text) Tj ET";

/// Plain body text only.
pub const BODY_PAGE: &str = "BT /F1 12 Tf 72 700 Td (Nothing special here) Tj ET";

/// Two pages with bookmarks `Intro` (page 1) and nested `  Background.. ` (page 2).
pub fn bookmarked_pdf() -> Vec<u8> {
    build_pdf(
        &[HEADING_PAGE, BODY_PAGE],
        &[Mark(1, "Intro", 0), Mark(2, "  Background.. ", 1)],
    )
}

/// Two pages without bookmarks.
pub fn plain_pdf() -> Vec<u8> {
    build_pdf(&[HEADING_PAGE, BODY_PAGE], &[])
}

/// Write bytes to `dir/name` and return the path.
pub fn write(dir: &Path, name: &str, data: &[u8]) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).expect("failed to write test file");
    path
}
