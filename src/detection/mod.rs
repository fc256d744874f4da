//! Split-point detection.
//!
//! Detection runs in two stages:
//!
//! 1. [`PageCountDetector`] looks for a "page 1 of N" marker on the first
//!    page. A match decides the split outright with confidence 1.0.
//! 2. Otherwise the three heuristic [`Detector`]s each scan the document and
//!    emit zero or more [`DetectionResult`]s, which the [`aggregator`] merges
//!    into a single [`SplitDecision`].
//!
//! Heuristic detectors never fail as a whole: an error while analyzing one
//! page (or page pair) is logged and that page simply contributes no
//! evidence.

pub mod aggregator;
pub mod content;
pub mod layout;
pub mod page_count;
pub mod patterns;
pub mod text_patterns;

pub use aggregator::{aggregate, select_split_point, AggregatedCandidate};
pub use content::{ContentFeatures, ContentTransitionDetector};
pub use layout::LayoutTransitionDetector;
pub use page_count::{IndicatorMatch, PageCountDetector, PageIndicatorVariant};
pub use patterns::{PatternSet, PatternTier, TieredPattern};
pub use text_patterns::TextPatternDetector;

use crate::error::Result;
use crate::text::PageTextProvider;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Heuristic detection method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// Router vocabulary on a single page
    TextPatterns,
    /// Layout change relative to the previous page
    LayoutAnalysis,
    /// Content shift between a page and its predecessor
    ContentTransition,
}

impl DetectionMethod {
    /// Stable method tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::TextPatterns => "text_patterns",
            DetectionMethod::LayoutAnalysis => "layout_analysis",
            DetectionMethod::ContentTransition => "content_transition",
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detector's claim that a page starts the router section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionResult {
    /// 0-based page index
    pub page: usize,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Method that produced the result
    pub method: DetectionMethod,
    /// Human-readable trace of the signals that fired
    pub evidence: String,
    /// Pattern counts and feature deltas behind the confidence
    pub details: IndexMap<String, f64>,
}

impl DetectionResult {
    /// Create a result, clamping the confidence to [0, 1].
    pub fn new(
        page: usize,
        confidence: f64,
        method: DetectionMethod,
        evidence: Vec<String>,
        details: IndexMap<String, f64>,
    ) -> Self {
        Self {
            page,
            confidence: confidence.clamp(0.0, 1.0),
            method,
            evidence: evidence.join(" | "),
            details,
        }
    }
}

/// Where a split decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionSource {
    /// "Page 1 of N" marker with N smaller than the page count
    PageIndicator,
    /// "Page 1 of N" marker covering the whole document
    SingleSection,
    /// Aggregated heuristic evidence
    Heuristic,
    /// Nothing pointed at a boundary
    NoEvidence,
}

/// Outcome of split-point detection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitDecision {
    /// First page of the router section, if any
    pub split_point: Option<usize>,
    /// Confidence of the decision; may exceed 1.0 when several methods agree
    pub confidence: f64,
    /// Explanation of the decision
    pub explanation: String,
    /// Which path produced the decision
    pub source: DecisionSource,
    /// Every aggregated candidate, in page order (heuristic path only)
    pub candidates: Vec<AggregatedCandidate>,
}

impl SplitDecision {
    /// The decision when no evidence was found.
    pub fn no_evidence() -> Self {
        Self {
            split_point: None,
            confidence: 0.0,
            explanation: "no evidence: no router section detected by any method".to_string(),
            source: DecisionSource::NoEvidence,
            candidates: Vec::new(),
        }
    }
}

/// A heuristic split-point detector.
///
/// Implementations are pure functions of the document: they keep no state
/// between calls and may run concurrently with each other.
pub trait Detector: Send + Sync {
    /// Method tag attached to every result.
    fn method(&self) -> DetectionMethod;

    /// Scan the document and report candidate pages.
    fn detect(&self, text: &PageTextProvider<'_>) -> Vec<DetectionResult>;
}

/// Run `analyze` for each page (or pair), dropping failed units with a warning.
pub(crate) fn collect_results<I, F>(
    method: DetectionMethod,
    units: I,
    mut analyze: F,
) -> Vec<DetectionResult>
where
    I: IntoIterator<Item = usize>,
    F: FnMut(usize) -> Result<Option<DetectionResult>>,
{
    let mut results = Vec::new();
    for unit in units {
        match analyze(unit) {
            Ok(Some(result)) => results.push(result),
            Ok(None) => {},
            Err(e) => log::warn!("{} skipped page {}: {}", method, unit, e),
        }
    }
    results
}

/// Order results by page index, then method tag.
pub fn sort_results(results: &mut [DetectionResult]) {
    results.sort_by(|a, b| {
        a.page
            .cmp(&b.page)
            .then_with(|| a.method.as_str().cmp(b.method.as_str()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_method_tags() {
        assert_eq!(DetectionMethod::TextPatterns.as_str(), "text_patterns");
        assert_eq!(DetectionMethod::LayoutAnalysis.to_string(), "layout_analysis");
        assert_eq!(DetectionMethod::ContentTransition.as_str(), "content_transition");
    }

    #[test]
    fn test_result_confidence_clamped() {
        let high = DetectionResult::new(
            1,
            1.7,
            DetectionMethod::TextPatterns,
            vec!["a".into(), "b".into()],
            IndexMap::new(),
        );
        assert_eq!(high.confidence, 1.0);
        assert_eq!(high.evidence, "a | b");

        let low = DetectionResult::new(
            1,
            -0.3,
            DetectionMethod::TextPatterns,
            vec![],
            IndexMap::new(),
        );
        assert_eq!(low.confidence, 0.0);
    }

    #[test]
    fn test_collect_results_skips_failures() {
        let results = collect_results(DetectionMethod::LayoutAnalysis, 0..4, |page| {
            if page == 1 {
                return Err(Error::PageOutOfRange {
                    index: page,
                    page_count: 1,
                });
            }
            Ok((page % 2 == 0).then(|| {
                DetectionResult::new(
                    page,
                    0.5,
                    DetectionMethod::LayoutAnalysis,
                    vec![],
                    IndexMap::new(),
                )
            }))
        });
        let pages: Vec<usize> = results.iter().map(|r| r.page).collect();
        assert_eq!(pages, vec![0, 2]);
    }

    #[test]
    fn test_sort_results() {
        let make = |page, method| DetectionResult::new(page, 0.5, method, vec![], IndexMap::new());
        let mut results = vec![
            make(2, DetectionMethod::TextPatterns),
            make(1, DetectionMethod::TextPatterns),
            make(2, DetectionMethod::ContentTransition),
            make(2, DetectionMethod::LayoutAnalysis),
        ];
        sort_results(&mut results);
        let order: Vec<(usize, &str)> = results.iter().map(|r| (r.page, r.method.as_str())).collect();
        assert_eq!(
            order,
            vec![
                (1, "text_patterns"),
                (2, "content_transition"),
                (2, "layout_analysis"),
                (2, "text_patterns"),
            ]
        );
    }

    #[test]
    fn test_no_evidence_decision() {
        let decision = SplitDecision::no_evidence();
        assert_eq!(decision.split_point, None);
        assert_eq!(decision.confidence, 0.0);
        assert!(decision.explanation.starts_with("no evidence"));
    }
}
