//! In-memory document model.
//!
//! A [`Document`] is an ordered, immutable sequence of [`Page`]s built once
//! per input file, either by [`crate::loader::load`] or by hand. Detectors only
//! ever borrow it.

use crate::error::{Error, Result};
use crate::layout::{PageLayout, TextSpan};
use std::path::{Path, PathBuf};

/// A single page: native text plus layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 0-based page index
    pub index: usize,
    /// Text from native extraction, possibly empty for scanned pages
    pub native_text: String,
    /// Geometry and text spans
    pub layout: PageLayout,
}

impl Page {
    /// Create a portrait US Letter page with the given native text and no spans.
    pub fn from_text(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            native_text: text.into(),
            layout: PageLayout::default(),
        }
    }

    /// Set the page dimensions.
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.layout.width = width;
        self.layout.height = height;
        self
    }

    /// Set the text spans.
    pub fn with_spans(mut self, spans: Vec<TextSpan>) -> Self {
        self.layout.spans = spans;
        self
    }
}

/// An ordered sequence of pages with a source identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    source: PathBuf,
    pages: Vec<Page>,
}

impl Document {
    /// Create a document. Page indices are renumbered to match their position.
    pub fn new(source: impl Into<PathBuf>, pages: Vec<Page>) -> Self {
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(index, mut page)| {
                page.index = index;
                page
            })
            .collect();
        Self {
            source: source.into(),
            pages,
        }
    }

    /// Source identity (path of the file the document was loaded from).
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All pages in order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Get a page by 0-based index.
    pub fn page(&self, index: usize) -> Result<&Page> {
        self.pages.get(index).ok_or(Error::PageOutOfRange {
            index,
            page_count: self.pages.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_follow_order() {
        let doc = Document::new(
            "order.pdf",
            vec![Page::from_text(9, "a"), Page::from_text(4, "b")],
        );
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.page(0).unwrap().index, 0);
        assert_eq!(doc.page(1).unwrap().native_text, "b");
        assert_eq!(doc.page(1).unwrap().index, 1);
    }

    #[test]
    fn test_page_out_of_range() {
        let doc = Document::new("one.pdf", vec![Page::from_text(0, "only")]);
        match doc.page(1) {
            Err(Error::PageOutOfRange { index, page_count }) => {
                assert_eq!(index, 1);
                assert_eq!(page_count, 1);
            },
            other => panic!("expected PageOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_page_builders() {
        let page = Page::from_text(0, "x")
            .with_size(792.0, 612.0)
            .with_spans(vec![TextSpan::new("x", "Courier", 9.0)]);
        assert_eq!(page.layout.width, 792.0);
        assert_eq!(page.layout.spans.len(), 1);
        assert_eq!(Document::new("a.pdf", vec![page]).source(), Path::new("a.pdf"));
    }
}
