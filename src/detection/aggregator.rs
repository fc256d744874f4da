//! Merging heuristic results into one decision.
//!
//! Results are grouped by page. A page's combined confidence is the mean of
//! its results plus 0.1 for every additional distinct method that agrees on
//! it. The sum is deliberately left unclamped, so agreement between methods
//! can push a page above 1.0.

use super::{sort_results, DecisionSource, DetectionMethod, DetectionResult, SplitDecision};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Bonus per additional agreeing method.
pub const METHOD_AGREEMENT_BONUS: f64 = 0.1;

/// Combined evidence for one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedCandidate {
    /// 0-based page index
    pub page: usize,
    /// Mean confidence plus the method-agreement bonus (may exceed 1.0)
    pub confidence: f64,
    /// Mean of the contributing results' confidences
    pub average_confidence: f64,
    /// Number of contributing results
    pub result_count: usize,
    /// Distinct methods that flagged the page
    pub methods: BTreeSet<DetectionMethod>,
    /// "method: evidence" entries, in result order
    pub evidence: Vec<String>,
}

impl AggregatedCandidate {
    fn explanation(&self) -> String {
        format!(
            "Page {} (confidence: {:.2}, methods: {}): {}",
            self.page + 1,
            self.confidence,
            self.result_count,
            self.evidence.join(" | ")
        )
    }
}

/// Group results by page and compute combined confidences.
///
/// Results are put into (page, method) order first so the output does not
/// depend on the order detectors finished in. Candidates come back in
/// ascending page order.
pub fn aggregate(mut results: Vec<DetectionResult>) -> Vec<AggregatedCandidate> {
    sort_results(&mut results);

    let mut by_page: BTreeMap<usize, Vec<DetectionResult>> = BTreeMap::new();
    for result in results {
        by_page.entry(result.page).or_default().push(result);
    }

    by_page
        .into_iter()
        .map(|(page, results)| {
            let total: f64 = results.iter().map(|r| r.confidence).sum();
            let average_confidence = total / results.len() as f64;
            let methods: BTreeSet<DetectionMethod> = results.iter().map(|r| r.method).collect();
            let bonus = (methods.len() - 1) as f64 * METHOD_AGREEMENT_BONUS;

            AggregatedCandidate {
                page,
                confidence: average_confidence + bonus,
                average_confidence,
                result_count: results.len(),
                methods,
                evidence: results
                    .iter()
                    .map(|r| format!("{}: {}", r.method, r.evidence))
                    .collect(),
            }
        })
        .collect()
}

/// Pick the candidate with the highest combined confidence.
///
/// Candidates are scanned in page order and only a strictly higher score
/// replaces the current best, so ties go to the lowest page.
pub fn select_split_point(candidates: Vec<AggregatedCandidate>) -> SplitDecision {
    let mut best: Option<&AggregatedCandidate> = None;
    for candidate in &candidates {
        match best {
            Some(current) if candidate.confidence <= current.confidence => {},
            _ => best = Some(candidate),
        }
    }

    let Some(winner) = best else {
        log::warn!("No split points detected by any method");
        return SplitDecision::no_evidence();
    };

    let decision = SplitDecision {
        split_point: Some(winner.page),
        confidence: winner.confidence,
        explanation: winner.explanation(),
        source: DecisionSource::Heuristic,
        candidates: Vec::new(),
    };
    log::info!("Best split point: {}", decision.explanation);

    SplitDecision {
        candidates,
        ..decision
    }
}
