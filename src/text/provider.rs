//! Per-page text with OCR fallback.
//!
//! Native text is used when it carries at least `min_native_chars`
//! non-whitespace characters; otherwise the page is handed to the OCR engine
//! and whatever it reports replaces the native text, even when empty. Short
//! native text survives only when OCR is disabled.
//! Resolved text is cached per page for the lifetime of the provider, so each
//! page is OCR'd at most once per detection pass even when several detectors
//! (possibly on different threads) ask for it.

use crate::config::SplitterConfig;
use crate::document::Document;
use crate::ocr::OcrEngine;
use std::sync::OnceLock;

/// Count characters that are not whitespace.
pub fn non_whitespace_chars(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}

/// Supplies page text to the detectors.
pub struct PageTextProvider<'a> {
    document: &'a Document,
    ocr: &'a dyn OcrEngine,
    min_native_chars: usize,
    ocr_enabled: bool,
    dpi: u32,
    cache: Vec<OnceLock<String>>,
}

impl<'a> PageTextProvider<'a> {
    /// Create a provider for one detection pass over `document`.
    pub fn new(document: &'a Document, ocr: &'a dyn OcrEngine, config: &SplitterConfig) -> Self {
        Self {
            document,
            ocr,
            min_native_chars: config.min_native_text_chars,
            ocr_enabled: config.ocr_enabled,
            dpi: config.ocr_dpi,
            cache: (0..document.page_count()).map(|_| OnceLock::new()).collect(),
        }
    }

    /// The document being read.
    pub fn document(&self) -> &'a Document {
        self.document
    }

    /// Text of a page; `""` when nothing could be extracted.
    pub fn text(&self, index: usize) -> &str {
        match self.cache.get(index) {
            Some(slot) => slot.get_or_init(|| self.resolve(index)).as_str(),
            None => {
                log::warn!(
                    "Text requested for page {} of {} ({} pages)",
                    index,
                    self.document.source().display(),
                    self.document.page_count()
                );
                ""
            },
        }
    }

    /// Lower-cased text of a page.
    pub fn lowercase_text(&self, index: usize) -> String {
        self.text(index).to_lowercase()
    }

    fn resolve(&self, index: usize) -> String {
        let native = match self.document.page(index) {
            Ok(page) => page.native_text.as_str(),
            Err(e) => {
                log::warn!("{}", e);
                return String::new();
            },
        };

        if non_whitespace_chars(native) >= self.min_native_chars {
            return native.to_string();
        }

        if !self.ocr_enabled {
            return native.to_string();
        }

        log::debug!(
            "Page {} has {} native characters, falling back to OCR",
            index,
            non_whitespace_chars(native)
        );
        let recognized = self.ocr.ocr_text(self.document, index, self.dpi);
        if recognized.trim().is_empty() {
            log::warn!(
                "OCR produced no text for page {} of {}",
                index,
                self.document.source().display()
            );
        }
        recognized
    }
}
