//! Router vocabulary scoring, one page at a time.

use super::patterns::PatternSet;
use super::{collect_results, DetectionMethod, DetectionResult, Detector};
use crate::error::Result;
use crate::text::PageTextProvider;
use indexmap::IndexMap;
use std::sync::Arc;

/// PO hits above this count trigger the penalty.
pub const PO_PENALTY_THRESHOLD: usize = 3;
/// Confidence removed from pages that still read like a purchase order.
pub const PO_PENALTY: f64 = 0.2;
/// Distinct router patterns needed for the diversity bonus.
pub const DIVERSITY_MIN_PATTERNS: usize = 3;
/// Bonus for pages matching several distinct router patterns.
pub const DIVERSITY_BONUS: f64 = 0.1;
/// A page is reported only above this confidence.
pub const MIN_REPORT_CONFIDENCE: f64 = 0.3;

/// Flags pages whose text reads like a manufacturing router.
///
/// Each router pattern occurrence adds its tier weight to the page score.
/// Pages that still carry a lot of purchase-order vocabulary are penalized,
/// pages matching several distinct patterns get a small bonus.
#[derive(Debug, Clone)]
pub struct TextPatternDetector {
    patterns: Arc<PatternSet>,
}

impl Default for TextPatternDetector {
    fn default() -> Self {
        Self::new(PatternSet::shared_default())
    }
}

impl TextPatternDetector {
    /// Create a detector over the given pattern tables.
    pub fn new(patterns: Arc<PatternSet>) -> Self {
        Self { patterns }
    }

    /// Score one page of (already lower-cased) text.
    ///
    /// Returns `None` for blank pages and pages at or below the reporting
    /// threshold.
    pub fn score_page(&self, page: usize, text: &str) -> Option<DetectionResult> {
        if text.trim().is_empty() {
            return None;
        }

        let mut confidence = 0.0;
        let mut evidence = Vec::new();
        let mut details = IndexMap::new();
        let mut distinct = 0;

        for pattern in self.patterns.router_patterns() {
            let matches = pattern.count(text);
            if matches == 0 {
                continue;
            }
            confidence += matches as f64 * pattern.tier.text_weight();
            evidence.push(format!("{}:{}({})", pattern.tier.as_str(), pattern.source, matches));
            details.insert(pattern.source.clone(), matches as f64);
            distinct += 1;
        }

        let po_hits = self.patterns.count_po(text);
        if po_hits > PO_PENALTY_THRESHOLD {
            confidence -= PO_PENALTY;
            evidence.push(format!("po_penalty:{}", po_hits));
        }
        details.insert("po_indicators".to_string(), po_hits as f64);

        if distinct >= DIVERSITY_MIN_PATTERNS {
            confidence += DIVERSITY_BONUS;
            evidence.push("pattern_diversity_bonus".to_string());
        }

        let confidence = confidence.clamp(0.0, 1.0);
        if confidence <= MIN_REPORT_CONFIDENCE {
            return None;
        }

        log::debug!("text_patterns: page {} scored {:.2}", page, confidence);
        Some(DetectionResult::new(
            page,
            confidence,
            DetectionMethod::TextPatterns,
            evidence,
            details,
        ))
    }

    fn analyze(&self, text: &PageTextProvider<'_>, page: usize) -> Result<Option<DetectionResult>> {
        text.document().page(page)?;
        Ok(self.score_page(page, &text.lowercase_text(page)))
    }
}

impl Detector for TextPatternDetector {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::TextPatterns
    }

    fn detect(&self, text: &PageTextProvider<'_>) -> Vec<DetectionResult> {
        let pages = 0..text.document().page_count();
        collect_results(self.method(), pages, |page| self.analyze(text, page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SplitterConfig;
    use crate::document::{Document, Page};
    use crate::ocr::NoOcr;

    fn detector() -> TextPatternDetector {
        TextPatternDetector::default()
    }

    #[test]
    fn test_strong_router_page() {
        let result = detector()
            .score_page(2, "manufacturing routing\noperation sequence\nop 10 saw\nop 20 mill")
            .unwrap();
        assert_eq!(result.page, 2);
        assert_eq!(result.method, DetectionMethod::TextPatterns);
        assert_eq!(result.confidence, 1.0);
        assert!(result.evidence.contains("very_strong:manufacturing\\s+routing(1)"));
        assert!(result.evidence.contains("pattern_diversity_bonus"));
    }

    #[test]
    fn test_single_weak_mention_not_reported() {
        assert!(detector().score_page(0, "see work center 4").is_none());
    }

    #[test]
    fn test_threshold_is_exclusive() {
        // "process flow" alone is a single medium hit (0.2), three hits give 0.6.
        assert!(detector().score_page(0, "process flow").is_none());
        let result = detector()
            .score_page(0, "process flow, process flow, process flow")
            .unwrap();
        assert!((result.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_po_penalty() {
        let text = "routing sheet\npurchase order\npo number 7\nship to\nbill to";
        let result = detector().score_page(0, text).unwrap();
        // routing sheet (0.5) + routing (0.2) - penalty (0.2)
        assert!((result.confidence - 0.5).abs() < 1e-9);
        assert!(result.evidence.contains("po_penalty:4"));
        assert_eq!(result.details["po_indicators"], 4.0);
    }

    #[test]
    fn test_blank_page_skipped() {
        assert!(detector().score_page(0, "  \n ").is_none());
    }

    #[test]
    fn test_detect_over_document() {
        let doc = Document::new(
            "mixed.pdf",
            vec![
                Page::from_text(0, "Purchase Order\nVendor Name: ACME\nShip To: Plant 4"),
                Page::from_text(1, ""),
                Page::from_text(2, "ROUTING SHEET\nOPERATION 10 deburr"),
            ],
        );
        let config = SplitterConfig::default().with_ocr(false);
        let provider = PageTextProvider::new(&doc, &NoOcr, &config);

        let results = detector().detect(&provider);
        let pages: Vec<usize> = results.iter().map(|r| r.page).collect();
        assert_eq!(pages, vec![2]);
        assert!(results.iter().all(|r| (0.0..=1.0).contains(&r.confidence)));
    }
}
