//! Shared helpers: synthesized PDFs and in-memory documents.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, Stream};
use po_router_split::document::{Document, Page};
use po_router_split::layout::TextSpan;
use std::path::Path;

/// Purchase-order text used across tests.
pub const PO_TEXT: &[&str] = &[
    "PURCHASE ORDER",
    "PO Number: 4471-A",
    "Vendor Name: Acme Castings",
    "Ship To: Plant 7, Dock 3",
    "Bill To: Accounts Payable",
    "Payment Terms: Net 30",
];

/// Router text used across tests.
pub const ROUTER_TEXT: &[&str] = &[
    "ROUTING SHEET",
    "OPERATION 10 SAW CUT BLANK",
    "OPERATION 20 MILL FACE",
    "SETUP 15 MINUTES AT MACHINE CENTER 4",
];

/// One page of a synthesized PDF.
#[derive(Debug, Clone)]
pub struct PageSpec {
    pub width: i64,
    pub height: i64,
    pub rotate: Option<i64>,
    /// Font resource, "F1" (Courier) or "F2" (Helvetica)
    pub font: &'static str,
    pub font_size: i64,
    pub lines: Vec<String>,
}

impl PageSpec {
    pub fn portrait(lines: &[&str]) -> Self {
        Self {
            width: 612,
            height: 792,
            rotate: None,
            font: "F1",
            font_size: 12,
            lines: lines.iter().map(|l| l.to_string()).collect(),
        }
    }

    pub fn landscape(lines: &[&str]) -> Self {
        Self {
            width: 792,
            height: 612,
            ..Self::portrait(lines)
        }
    }

    pub fn with_font(mut self, font: &'static str, size: i64) -> Self {
        self.font = font;
        self.font_size = size;
        self
    }

    pub fn with_rotate(mut self, degrees: i64) -> Self {
        self.rotate = Some(degrees);
        self
    }
}

fn page_content(spec: &PageSpec) -> Vec<u8> {
    let mut operations = Vec::new();
    let mut y = spec.height - 72;
    for line in &spec.lines {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![spec.font.into(), Object::Integer(spec.font_size)],
        ));
        operations.push(Operation::new("Td", vec![Object::Integer(72), Object::Integer(y)]));
        operations.push(Operation::new("Tj", vec![Object::string_literal(line.as_str())]));
        operations.push(Operation::new("ET", vec![]));
        y -= spec.font_size + 4;
    }
    Content { operations }.encode().unwrap()
}

/// Write a PDF with one page per spec.
pub fn write_pdf(path: &Path, pages: &[PageSpec]) {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let courier_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let helvetica_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => courier_id,
            "F2" => helvetica_id,
        },
    });

    let mut kids = Vec::new();
    for spec in pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, page_content(spec)));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(spec.width),
                Object::Integer(spec.height),
            ],
        };
        if let Some(degrees) = spec.rotate {
            page.set("Rotate", Object::Integer(degrees));
        }
        kids.push(Object::Reference(doc.add_object(page)));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

/// Page count of a PDF on disk.
pub fn pdf_page_count(path: &Path) -> usize {
    lopdf::Document::load(path).unwrap().get_pages().len()
}

/// Native text of every page of a PDF on disk.
pub fn pdf_page_texts(path: &Path) -> Vec<String> {
    let pdf = lopdf::Document::load(path).unwrap();
    let numbers: Vec<u32> = pdf.get_pages().keys().copied().collect();
    numbers
        .iter()
        .map(|n| pdf.extract_text(&[*n]).unwrap_or_default())
        .collect()
}

/// In-memory page with one span per line.
pub fn text_page(lines: &[&str], font: &str, size: f32) -> Page {
    Page::from_text(0, lines.join("\n")).with_spans(
        lines
            .iter()
            .map(|line| TextSpan::new(*line, font, size))
            .collect(),
    )
}

/// In-memory document from pages.
pub fn document(pages: Vec<Page>) -> Document {
    Document::new("memory.pdf", pages)
}
