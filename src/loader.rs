//! Document loading backed by `lopdf`.
//!
//! Builds the read-only [`Document`] model: page order, page geometry
//! (inherited `/MediaBox`, adjusted for `/Rotate`), native text, and the text
//! spans drawn by each page's content stream. Per-page failures degrade to an
//! empty page rather than failing the whole load.

use crate::document::{Document, Page};
use crate::error::Result;
use crate::geometry::Rect;
use crate::layout::{PageLayout, TextSpan};
use lopdf::content::Content;
use lopdf::{Dictionary, Object, ObjectId};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Page size used when no `/MediaBox` can be resolved (US Letter).
const FALLBACK_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// Maximum `/Parent` hops followed when resolving inherited attributes.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Load a PDF into a [`Document`].
///
/// Fails only when the file cannot be read or parsed as a PDF at all.
pub fn load(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref();
    let pdf = lopdf::Document::load(path)?;
    let page_ids = pdf.get_pages();

    log::debug!("Loaded {} ({} pages)", path.display(), page_ids.len());

    let pages = page_ids
        .iter()
        .enumerate()
        .map(|(index, (&page_number, &page_id))| {
            load_page(&pdf, index, page_number, page_id, path)
        })
        .collect();

    Ok(Document::new(path, pages))
}

fn load_page(
    pdf: &lopdf::Document,
    index: usize,
    page_number: u32,
    page_id: ObjectId,
    path: &Path,
) -> Page {
    let native_text = match pdf.extract_text(&[page_number]) {
        Ok(text) => text,
        Err(e) => {
            log::warn!(
                "Native text extraction failed for page {} of {}: {}",
                index,
                path.display(),
                e
            );
            String::new()
        },
    };

    let (width, height) = page_size(pdf, page_id).unwrap_or_else(|| {
        log::debug!("No usable MediaBox on page {}, assuming US Letter", index);
        FALLBACK_PAGE_SIZE
    });

    let spans = match page_spans(pdf, page_id) {
        Ok(spans) => spans,
        Err(e) => {
            log::warn!(
                "Could not read text layout of page {} of {}: {}",
                index,
                path.display(),
                e
            );
            Vec::new()
        },
    };

    Page {
        index,
        native_text,
        layout: PageLayout {
            width,
            height,
            spans,
        },
    }
}

/// Resolve an attribute on the page or the nearest ancestor in the page tree.
fn inherited_attribute<'a>(
    pdf: &'a lopdf::Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut current = Some(page_id);
    let mut depth = 0;

    while let Some(id) = current {
        if depth > MAX_INHERITANCE_DEPTH {
            log::warn!("Page tree deeper than {} levels", MAX_INHERITANCE_DEPTH);
            return None;
        }
        let dict = pdf.get_dictionary(id).ok()?;
        if let Ok(value) = dict.get(key) {
            return pdf.dereference(value).ok().map(|(_, obj)| obj);
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }

    None
}

/// Displayed page size: `/MediaBox` with width and height swapped for
/// quarter-turn rotations.
fn page_size(pdf: &lopdf::Document, page_id: ObjectId) -> Option<(f32, f32)> {
    let media_box = inherited_attribute(pdf, page_id, b"MediaBox")?.as_array().ok()?;
    if media_box.len() != 4 {
        return None;
    }
    let coords: Vec<f32> = media_box
        .iter()
        .map(|obj| pdf.dereference(obj).ok().and_then(|(_, o)| number(o)))
        .collect::<Option<Vec<f32>>>()?;
    let rect = Rect::from_points(coords[0], coords[1], coords[2], coords[3]);

    let rotation = inherited_attribute(pdf, page_id, b"Rotate")
        .and_then(|obj| obj.as_i64().ok())
        .unwrap_or(0);

    if rotation.rem_euclid(180) == 90 {
        Some((rect.height, rect.width))
    } else {
        Some((rect.width, rect.height))
    }
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

/// Drop the six-letter subset tag from embedded font names (`ABCDEF+Arial`).
fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.chars().all(|c| c.is_ascii_uppercase()) => {
            rest
        },
        _ => name,
    }
}

fn font_names(fonts: &BTreeMap<Vec<u8>, &Dictionary>) -> HashMap<Vec<u8>, String> {
    fonts
        .iter()
        .map(|(resource, dict)| {
            let base_font = dict
                .get(b"BaseFont")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| strip_subset_prefix(&String::from_utf8_lossy(n)).to_string())
                .unwrap_or_else(|| String::from_utf8_lossy(resource).to_string());
            (resource.clone(), base_font)
        })
        .collect()
}

/// Text-space state needed to place spans and size them.
#[derive(Debug, Clone, Copy)]
struct TextState {
    /// Text matrix [a b c d e f]
    tm: [f32; 6],
    /// Line matrix
    tlm: [f32; 6],
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        let identity = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        Self {
            tm: identity,
            tlm: identity,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn move_line(&mut self, tx: f32, ty: f32) {
        let [a, b, c, d, e, f] = self.tlm;
        self.tlm = [a, b, c, d, e + tx * a + ty * c, f + tx * b + ty * d];
        self.tm = self.tlm;
    }

    fn next_line(&mut self) {
        let leading = self.leading;
        self.move_line(0.0, -leading);
    }

    fn effective_size(&self, font_size: f32) -> f32 {
        let scale = (self.tm[2] * self.tm[2] + self.tm[3] * self.tm[3]).sqrt();
        if scale > 0.0 {
            font_size * scale
        } else {
            font_size
        }
    }
}

fn operand(operands: &[Object], i: usize) -> f32 {
    operands.get(i).and_then(number).unwrap_or(0.0)
}

fn shown_bytes(op: &lopdf::content::Operation) -> Vec<u8> {
    match op.operator.as_str() {
        "Tj" | "'" => match op.operands.first() {
            Some(Object::String(bytes, _)) => bytes.clone(),
            _ => Vec::new(),
        },
        "\"" => match op.operands.get(2) {
            Some(Object::String(bytes, _)) => bytes.clone(),
            _ => Vec::new(),
        },
        "TJ" => match op.operands.first() {
            Some(Object::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Object::String(bytes, _) => Some(bytes.as_slice()),
                    _ => None,
                })
                .flatten()
                .copied()
                .collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Collect one span per text-showing operator with a non-blank payload.
fn page_spans(pdf: &lopdf::Document, page_id: ObjectId) -> Result<Vec<TextSpan>> {
    let fonts = pdf.get_page_fonts(page_id)?;
    let names = font_names(&fonts);
    let content = Content::decode(&pdf.get_page_content(page_id)?)?;

    let mut spans = Vec::new();
    let mut state = TextState::default();
    let mut font_name = String::from("Unknown");
    let mut font_size = 0.0f32;

    for op in &content.operations {
        match op.operator.as_str() {
            "BT" => state = TextState::default(),
            "Tf" => {
                if let Some(Object::Name(resource)) = op.operands.first() {
                    font_name = names
                        .get(resource)
                        .cloned()
                        .unwrap_or_else(|| String::from_utf8_lossy(resource).to_string());
                }
                font_size = operand(&op.operands, 1);
            },
            "TL" => state.leading = operand(&op.operands, 0),
            "Td" => state.move_line(operand(&op.operands, 0), operand(&op.operands, 1)),
            "TD" => {
                state.leading = -operand(&op.operands, 1);
                state.move_line(operand(&op.operands, 0), operand(&op.operands, 1));
            },
            "Tm" => {
                let mut m = [0.0; 6];
                for (i, slot) in m.iter_mut().enumerate() {
                    *slot = operand(&op.operands, i);
                }
                state.tm = m;
                state.tlm = m;
            },
            "T*" => state.next_line(),
            "Tj" | "TJ" | "'" | "\"" => {
                if op.operator == "'" || op.operator == "\"" {
                    state.next_line();
                }
                let bytes = shown_bytes(op);
                if bytes.iter().all(|b| b.is_ascii_whitespace() || *b == 0) {
                    continue;
                }
                let size = state.effective_size(font_size);
                let text: String = bytes.iter().map(|&b| b as char).collect();
                let width = text.chars().count() as f32 * size * 0.5;
                spans.push(
                    TextSpan::new(text, font_name.clone(), size)
                        .with_bbox(Rect::new(state.tm[4], state.tm[5], width, size)),
                );
            },
            _ => {},
        }
    }

    Ok(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_subset_prefix() {
        assert_eq!(strip_subset_prefix("ABCDEF+Arial-Bold"), "Arial-Bold");
        assert_eq!(strip_subset_prefix("Arial"), "Arial");
        assert_eq!(strip_subset_prefix("abc+Arial"), "abc+Arial");
    }

    #[test]
    fn test_text_state_moves_and_scales() {
        let mut state = TextState::default();
        state.move_line(72.0, 700.0);
        assert_eq!(state.tm[4], 72.0);
        assert_eq!(state.tm[5], 700.0);

        state.leading = 14.0;
        state.next_line();
        assert_eq!(state.tm[5], 686.0);

        state.tm = [2.0, 0.0, 0.0, 2.0, 0.0, 0.0];
        assert_eq!(state.effective_size(10.0), 20.0);
    }

    #[test]
    fn test_shown_bytes_tj_array() {
        let op = lopdf::content::Operation::new(
            "TJ",
            vec![Object::Array(vec![
                Object::string_literal("Op"),
                Object::Integer(-250),
                Object::string_literal("10"),
            ])],
        );
        assert_eq!(shown_bytes(&op), b"Op10".to_vec());
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(load("/nonexistent/definitely/missing.pdf").is_err());
    }
}
