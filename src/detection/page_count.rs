//! "Page 1 of N" indicator detection.
//!
//! Purchase orders usually print their own page count on the first page. When
//! that marker is readable it tells us exactly how many pages the PO section
//! has, so the split is decided without any heuristics.
//!
//! Variants are tried in declared priority order and the first match wins.
//! The later variants tolerate common OCR confusions (`1` read as `l`, `i`
//! or `|`).

use super::{DecisionSource, SplitDecision};
use crate::text::PageTextProvider;
use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use std::sync::Arc;

/// Built-in indicator variants: (tag, pattern, OCR-tolerant).
pub const DEFAULT_INDICATOR_VARIANTS: &[(&str, &str, bool)] = &[
    ("page_1_of_n", r"page\s+1\s+of\s+(\d+)", false),
    ("page1ofn", r"page\s*1\s*of\s*(\d+)", false),
    ("page_1_slash_n", r"page\s+1\s*/\s*(\d+)", false),
    ("1_of_n_pages", r"1\s+of\s+(\d+)\s+pages?", false),
    ("1_sep_n", r"\b1\s*[/|-]\s*(\d+)\b", false),
    ("ocr_page_1_of_n", r"page\s*[il1|]\s*of?\s*(\d+)", true),
    ("ocr_page_x_of_n", r"page\s*[\dilo|]+\s*of\s*(\d+)", true),
    ("ocr_1_of_n_page", r"[il1|]\s*of\s*(\d+)\s*page", true),
];

lazy_static! {
    static ref DEFAULT_VARIANTS: Arc<Vec<PageIndicatorVariant>> = Arc::new(
        DEFAULT_INDICATOR_VARIANTS
            .iter()
            .map(|(tag, pattern, ocr_tolerant)| {
                PageIndicatorVariant::new(tag, pattern, *ocr_tolerant)
                    .expect("built-in indicator patterns are valid")
            })
            .collect()
    );
}

/// A tagged "page 1 of N" pattern. The first capture group is N.
#[derive(Debug, Clone)]
pub struct PageIndicatorVariant {
    /// Name used in logs and match reports
    pub tag: String,
    /// Whether the variant targets OCR misreadings
    pub ocr_tolerant: bool,
    regex: Regex,
}

impl PageIndicatorVariant {
    /// Compile a variant. The pattern must have a capture group for N.
    pub fn new(tag: &str, pattern: &str, ocr_tolerant: bool) -> crate::error::Result<Self> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        if regex.captures_len() < 2 {
            return Err(crate::error::Error::InvalidConfig(format!(
                "page indicator '{}' has no capture group",
                tag
            )));
        }
        Ok(Self {
            tag: tag.to_string(),
            ocr_tolerant,
            regex,
        })
    }

    /// The page count captured from `text`, if this variant matches.
    ///
    /// A captured count of zero is not a page count and counts as no match.
    pub fn captured_count(&self, text: &str) -> Option<usize> {
        let caps = self.regex.captures(text)?;
        let count: usize = caps.get(1)?.as_str().parse().ok()?;
        (count > 0).then_some(count)
    }
}

/// Which variant matched and what it reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorMatch {
    /// Tag of the matching variant
    pub tag: String,
    /// Number of PO pages (N)
    pub po_pages: usize,
    /// Whether an OCR-tolerant variant was needed
    pub ocr_tolerant: bool,
}

/// Detects the PO length from a first-page "page 1 of N" marker.
#[derive(Debug, Clone)]
pub struct PageCountDetector {
    variants: Arc<Vec<PageIndicatorVariant>>,
}

impl Default for PageCountDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl PageCountDetector {
    /// Detector with the built-in variants.
    pub fn new() -> Self {
        Self {
            variants: Arc::clone(&DEFAULT_VARIANTS),
        }
    }

    /// Detector with custom variants, evaluated in the given order.
    pub fn with_variants(variants: Vec<PageIndicatorVariant>) -> Self {
        Self {
            variants: Arc::new(variants),
        }
    }

    /// Variants in priority order.
    pub fn variants(&self) -> &[PageIndicatorVariant] {
        &self.variants
    }

    /// First variant matching `text`.
    pub fn match_indicator(&self, text: &str) -> Option<IndicatorMatch> {
        self.variants.iter().find_map(|variant| {
            variant.captured_count(text).map(|po_pages| IndicatorMatch {
                tag: variant.tag.clone(),
                po_pages,
                ocr_tolerant: variant.ocr_tolerant,
            })
        })
    }

    /// Number of PO pages announced on the first page, if any.
    pub fn detect_po_length(&self, text: &PageTextProvider<'_>) -> Option<usize> {
        if text.document().page_count() == 0 {
            return None;
        }
        let first_page = text.text(0);
        if first_page.trim().is_empty() {
            log::debug!("First page has no text, no page indicator");
            return None;
        }

        let found = self.match_indicator(first_page)?;
        log::info!(
            "Found page indicator '{}' ({}): 'Page 1 of {}'",
            found.tag,
            if found.ocr_tolerant { "OCR-tolerant" } else { "exact" },
            found.po_pages
        );
        Some(found.po_pages)
    }

    /// Split decision implied by a PO length of `po_pages`.
    ///
    /// Both outcomes carry confidence exactly 1.0.
    pub fn decide(po_pages: usize, total_pages: usize) -> SplitDecision {
        if total_pages > po_pages {
            SplitDecision {
                split_point: Some(po_pages),
                confidence: 1.0,
                explanation: format!(
                    "Page {} based on 'Page 1 of {}' indicator (confidence: 1.0)",
                    po_pages + 1,
                    po_pages
                ),
                source: DecisionSource::PageIndicator,
                candidates: Vec::new(),
            }
        } else {
            SplitDecision {
                split_point: None,
                confidence: 1.0,
                explanation: format!(
                    "single-section: document contains only PO pages \
                     ('Page 1 of {}', {} pages, no router section)",
                    po_pages, total_pages
                ),
                source: DecisionSource::SingleSection,
                candidates: Vec::new(),
            }
        }
    }
}
