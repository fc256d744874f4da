//! Content shifts between adjacent pages.
//!
//! Every page gets a small feature vector of vocabulary counts. A PO page
//! followed by a router page shows falling purchase-order vocabulary, rising
//! router vocabulary, and shop-floor details (operation numbers, times,
//! machines, measurements) appearing for the first time.

use super::patterns::PatternSet;
use super::{collect_results, DetectionMethod, DetectionResult, Detector};
use crate::text::PageTextProvider;
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;

/// Bonus for a PO-to-router vocabulary shift.
pub const CONTENT_SHIFT: f64 = 0.7;
/// PO hits must fall by more than this for a content shift.
pub const MIN_PO_DROP: i64 = 2;
/// Weighted router score must rise by more than this for a content shift.
pub const MIN_ROUTER_RISE: i64 = 3;
/// Bonus when operation mentions grow by more than one.
pub const OPERATIONS_INCREASE: f64 = 0.3;
/// Bonus when time references grow.
pub const TIME_REFERENCES_INCREASE: f64 = 0.2;
/// Bonus when machine references grow.
pub const MACHINE_REFERENCES_INCREASE: f64 = 0.2;
/// Bonus when measurement mentions grow.
pub const MEASUREMENTS_INCREASE: f64 = 0.1;
/// A pair is reported only above this confidence.
pub const MIN_REPORT_CONFIDENCE: f64 = 0.5;

/// Vocabulary counts for one page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContentFeatures {
    /// Purchase-order vocabulary hits
    pub po_content: usize,
    /// Router vocabulary hits weighted by tier
    pub router_content: u32,
    /// Operation-number mentions
    pub operations: usize,
    /// Time-duration references
    pub time_references: usize,
    /// Machine and work-center references
    pub machine_references: usize,
    /// Physical measurements
    pub measurements: usize,
}

/// Flags pages where the content turns from purchase order to router.
///
/// Results are indexed at the later page of each adjacent pair.
#[derive(Debug, Clone)]
pub struct ContentTransitionDetector {
    patterns: Arc<PatternSet>,
}

impl Default for ContentTransitionDetector {
    fn default() -> Self {
        Self::new(PatternSet::shared_default())
    }
}

impl ContentTransitionDetector {
    /// Create a detector over the given pattern tables.
    pub fn new(patterns: Arc<PatternSet>) -> Self {
        Self { patterns }
    }

    /// Feature vector of one page of (already lower-cased) text.
    pub fn features(&self, text: &str) -> ContentFeatures {
        ContentFeatures {
            po_content: self.patterns.count_po(text),
            router_content: self.patterns.router_weighted(text),
            operations: self.patterns.count_operations(text),
            time_references: self.patterns.count_time_references(text),
            machine_references: self.patterns.count_machine_references(text),
            measurements: self.patterns.count_measurements(text),
        }
    }

    /// Score the transition from `prev` to `curr`, reported at page `page`.
    pub fn compare(
        &self,
        page: usize,
        prev: &ContentFeatures,
        curr: &ContentFeatures,
    ) -> Option<DetectionResult> {
        let mut confidence = 0.0;
        let mut evidence = Vec::new();

        let po_drop = prev.po_content as i64 - curr.po_content as i64;
        let router_rise = i64::from(curr.router_content) - i64::from(prev.router_content);
        if po_drop > MIN_PO_DROP && router_rise > MIN_ROUTER_RISE {
            confidence += CONTENT_SHIFT;
            evidence.push(format!(
                "content_shift:po_drop={},router_rise={}",
                po_drop, router_rise
            ));
        }

        if curr.operations > prev.operations + 1 {
            confidence += OPERATIONS_INCREASE;
            evidence.push(format!("ops_increase:{}", curr.operations));
        }
        if curr.time_references > prev.time_references {
            confidence += TIME_REFERENCES_INCREASE;
            evidence.push("time_refs_appear".to_string());
        }
        if curr.machine_references > prev.machine_references {
            confidence += MACHINE_REFERENCES_INCREASE;
            evidence.push("machine_refs_increase".to_string());
        }
        if curr.measurements > prev.measurements {
            confidence += MEASUREMENTS_INCREASE;
            evidence.push("measurements_increase".to_string());
        }

        let confidence = confidence.clamp(0.0, 1.0);
        if confidence <= MIN_REPORT_CONFIDENCE {
            return None;
        }

        let mut details = IndexMap::new();
        details.insert("po_drop".to_string(), po_drop as f64);
        details.insert("router_rise".to_string(), router_rise as f64);
        details.insert("prev_operations".to_string(), prev.operations as f64);
        details.insert("curr_operations".to_string(), curr.operations as f64);
        details.insert("curr_time_references".to_string(), curr.time_references as f64);
        details.insert("curr_machine_references".to_string(), curr.machine_references as f64);
        details.insert("curr_measurements".to_string(), curr.measurements as f64);

        log::debug!("content_transition: page {} scored {:.2}", page, confidence);
        Some(DetectionResult::new(
            page,
            confidence,
            DetectionMethod::ContentTransition,
            evidence,
            details,
        ))
    }
}

impl Detector for ContentTransitionDetector {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::ContentTransition
    }

    fn detect(&self, text: &PageTextProvider<'_>) -> Vec<DetectionResult> {
        let page_count = text.document().page_count();
        let features: Vec<ContentFeatures> = (0..page_count)
            .map(|page| self.features(&text.lowercase_text(page)))
            .collect();

        collect_results(self.method(), 1..page_count, |page| {
            Ok(self.compare(page, &features[page - 1], &features[page]))
        })
    }
}
