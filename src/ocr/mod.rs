//! OCR capability for pages without usable native text.
//!
//! OCR engines are external collaborators. Whatever goes wrong inside an
//! engine (missing programs, timeouts, unreadable images) surfaces to callers
//! as an empty string, never as an error.

mod tesseract;

pub use tesseract::{TesseractConfig, TesseractOcr};

use crate::document::Document;

/// Rasterize a page and recognize its text.
pub trait OcrEngine: Send + Sync {
    /// Recognized text of `page_index`, or `""` on any failure.
    fn ocr_text(&self, document: &Document, page_index: usize, dpi: u32) -> String;
}

/// Engine used when OCR is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOcr;

impl OcrEngine for NoOcr {
    fn ocr_text(&self, _document: &Document, _page_index: usize, _dpi: u32) -> String {
        String::new()
    }
}

impl<F> OcrEngine for F
where
    F: Fn(&Document, usize, u32) -> String + Send + Sync,
{
    fn ocr_text(&self, document: &Document, page_index: usize, dpi: u32) -> String {
        self(document, page_index, dpi)
    }
}
