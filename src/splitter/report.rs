//! Split outcomes and reports.

use crate::detection::SplitDecision;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Terminal outcome of one split invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SplitOutcome {
    /// Whole document written to the PO target
    NoSplit,
    /// PO and router sections written separately
    Split,
    /// Output could not be persisted; nothing was left behind
    Error,
}

impl SplitOutcome {
    /// Outcome tag as printed in reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            SplitOutcome::NoSplit => "NO_SPLIT",
            SplitOutcome::Split => "SPLIT",
            SplitOutcome::Error => "ERROR",
        }
    }
}

impl fmt::Display for SplitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Destinations of the two output sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitTargets {
    /// Purchase-order section (or the whole document when not split)
    pub po: PathBuf,
    /// Router section
    pub router: PathBuf,
}

impl SplitTargets {
    /// Create targets from two paths.
    pub fn new(po: impl Into<PathBuf>, router: impl Into<PathBuf>) -> Self {
        Self {
            po: po.into(),
            router: router.into(),
        }
    }
}

/// What a split invocation did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitReport {
    /// Terminal outcome
    pub outcome: SplitOutcome,
    /// Detected split point, whether or not it was acted on
    pub split_point: Option<usize>,
    /// Confidence of the detected split point
    pub confidence: f64,
    /// Threshold the confidence was compared against
    pub threshold: f64,
    /// Human-readable account of the decision
    pub explanation: String,
    /// Pages written to the PO target
    pub po_pages: usize,
    /// Pages written to the router target
    pub router_pages: usize,
}

impl SplitReport {
    /// `false` only when output could not be written.
    pub fn success(&self) -> bool {
        self.outcome != SplitOutcome::Error
    }
}

/// Whether a detection result would split at one threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdProbe {
    /// Threshold probed
    pub threshold: f64,
    /// Detected split point
    pub split_point: Option<usize>,
    /// Detected confidence
    pub confidence: f64,
    /// Whether a split would happen at this threshold
    pub would_split: bool,
}

/// Evaluate `decision` against several thresholds.
pub fn probe_thresholds(decision: &SplitDecision, levels: &[f64]) -> Vec<ThresholdProbe> {
    levels
        .iter()
        .map(|&threshold| ThresholdProbe {
            threshold,
            split_point: decision.split_point,
            confidence: decision.confidence,
            would_split: decision.split_point.is_some() && decision.confidence >= threshold,
        })
        .collect()
}
