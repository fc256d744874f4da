//! Pattern tables for router and purchase-order vocabulary.
//!
//! A [`PatternSet`] is compiled once and shared read-only by every detector
//! that needs it. Custom tables can be supplied with
//! [`PatternSet::from_sources`]; the built-in tables are available through
//! [`PatternSet::shared_default`].

use crate::error::Result;
use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};
use std::sync::Arc;

/// Strength tier of a router pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternTier {
    /// Section titles that only appear on routers
    VeryStrong,
    /// Instruction-sheet titles
    Strong,
    /// Generic routing vocabulary
    Medium,
    /// Shop-floor details (operation numbers, times, work centers)
    Weak,
}

impl PatternTier {
    /// All tiers, strongest first.
    pub const ALL: [PatternTier; 4] = [
        PatternTier::VeryStrong,
        PatternTier::Strong,
        PatternTier::Medium,
        PatternTier::Weak,
    ];

    /// Per-occurrence contribution to text-pattern confidence.
    pub fn text_weight(&self) -> f64 {
        match self {
            PatternTier::VeryStrong => 0.5,
            PatternTier::Strong => 0.3,
            PatternTier::Medium => 0.2,
            PatternTier::Weak => 0.1,
        }
    }

    /// Per-occurrence contribution to a page's weighted router content score.
    pub fn content_weight(&self) -> u32 {
        match self {
            PatternTier::VeryStrong => 4,
            PatternTier::Strong => 3,
            PatternTier::Medium => 2,
            PatternTier::Weak => 1,
        }
    }

    /// Tier name used in evidence strings.
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternTier::VeryStrong => "very_strong",
            PatternTier::Strong => "strong",
            PatternTier::Medium => "medium",
            PatternTier::Weak => "weak",
        }
    }
}

/// Built-in router patterns by tier.
pub const DEFAULT_ROUTER_PATTERNS: &[(PatternTier, &str)] = &[
    (PatternTier::VeryStrong, r"routing\s+sheet"),
    (PatternTier::VeryStrong, r"manufacturing\s+routing"),
    (PatternTier::VeryStrong, r"work\s+order\s+routing"),
    (PatternTier::VeryStrong, r"router\s+sheet"),
    (PatternTier::VeryStrong, r"process\s+routing\s+sheet"),
    (PatternTier::Strong, r"operation\s+sheet"),
    (PatternTier::Strong, r"process\s+sheet"),
    (PatternTier::Strong, r"routing\s+instructions"),
    (PatternTier::Strong, r"work\s+instructions"),
    (PatternTier::Strong, r"manufacturing\s+instructions"),
    (PatternTier::Medium, r"\brouter\b"),
    (PatternTier::Medium, r"routing"),
    (PatternTier::Medium, r"operation\s+sequence"),
    (PatternTier::Medium, r"job\s+routing"),
    (PatternTier::Medium, r"process\s+flow"),
    (PatternTier::Weak, r"op\s*\d+"),
    (PatternTier::Weak, r"operation\s+\d+"),
    (PatternTier::Weak, r"setup\s+time"),
    (PatternTier::Weak, r"cycle\s+time"),
    (PatternTier::Weak, r"machine\s+center"),
    (PatternTier::Weak, r"work\s+center"),
];

/// Built-in purchase-order vocabulary.
pub const DEFAULT_PO_PATTERNS: &[&str] = &[
    r"purchase\s+order",
    r"po\s+number",
    r"vendor\s+name",
    r"ship\s+to",
    r"bill\s+to",
    r"payment\s+terms",
    r"delivery\s+date",
    r"quantity\s+ordered",
    r"unit\s+price",
    r"total\s+amount",
];

/// Operation-number mentions ("op 10", "operation 20").
pub const DEFAULT_OPERATION_PATTERN: &str = r"op\s*\d+|operation\s+\d+";
/// Time-duration references.
pub const DEFAULT_TIME_PATTERN: &str = r"setup|cycle|run\s+time|minutes?|hours?";
/// Machine and work-center references.
pub const DEFAULT_MACHINE_PATTERN: &str = r"machine|center|station|mill|lathe|drill";
/// Physical measurements.
pub const DEFAULT_MEASUREMENT_PATTERN: &str = r"\d+\.?\d*\s*(?:in|inches|mm|cm)";

lazy_static! {
    static ref DEFAULT_SET: Arc<PatternSet> = Arc::new(
        PatternSet::from_sources(
            DEFAULT_ROUTER_PATTERNS,
            DEFAULT_PO_PATTERNS,
            [
                DEFAULT_OPERATION_PATTERN,
                DEFAULT_TIME_PATTERN,
                DEFAULT_MACHINE_PATTERN,
                DEFAULT_MEASUREMENT_PATTERN,
            ],
        )
        .expect("built-in patterns are valid")
    );
}

/// A compiled router pattern with its tier.
#[derive(Debug, Clone)]
pub struct TieredPattern {
    /// Strength tier
    pub tier: PatternTier,
    /// Source text, used as the pattern's name in evidence
    pub source: String,
    /// Compiled, case-insensitive
    pub regex: Regex,
}

impl TieredPattern {
    /// Non-overlapping occurrences in `text`.
    pub fn count(&self, text: &str) -> usize {
        self.regex.find_iter(text).count()
    }
}

/// Compiled vocabulary used by the text-pattern and content-transition detectors.
#[derive(Debug, Clone)]
pub struct PatternSet {
    router: Vec<TieredPattern>,
    po: Vec<Regex>,
    operations: Regex,
    time_references: Regex,
    machine_references: Regex,
    measurements: Regex,
}

fn compile(source: &str) -> Result<Regex> {
    Ok(RegexBuilder::new(source).case_insensitive(true).build()?)
}

impl PatternSet {
    /// Compile a pattern set.
    ///
    /// `content` holds the operation, time, machine and measurement patterns,
    /// in that order.
    pub fn from_sources(
        router: &[(PatternTier, &str)],
        po: &[&str],
        content: [&str; 4],
    ) -> Result<Self> {
        let router = router
            .iter()
            .map(|(tier, source)| {
                Ok(TieredPattern {
                    tier: *tier,
                    source: source.to_string(),
                    regex: compile(source)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let po = po.iter().map(|s| compile(s)).collect::<Result<Vec<_>>>()?;
        let [operations, time_references, machine_references, measurements] = content;

        Ok(Self {
            router,
            po,
            operations: compile(operations)?,
            time_references: compile(time_references)?,
            machine_references: compile(machine_references)?,
            measurements: compile(measurements)?,
        })
    }

    /// The built-in tables, compiled once per process.
    pub fn shared_default() -> Arc<PatternSet> {
        Arc::clone(&DEFAULT_SET)
    }

    /// Router patterns, strongest tier first.
    pub fn router_patterns(&self) -> &[TieredPattern] {
        &self.router
    }

    /// Total purchase-order vocabulary hits.
    pub fn count_po(&self, text: &str) -> usize {
        self.po.iter().map(|re| re.find_iter(text).count()).sum()
    }

    /// Router hits weighted by tier.
    pub fn router_weighted(&self, text: &str) -> u32 {
        self.router
            .iter()
            .map(|p| p.count(text) as u32 * p.tier.content_weight())
            .sum()
    }

    /// Operation-number mentions.
    pub fn count_operations(&self, text: &str) -> usize {
        self.operations.find_iter(text).count()
    }

    /// Time-duration references.
    pub fn count_time_references(&self, text: &str) -> usize {
        self.time_references.find_iter(text).count()
    }

    /// Machine and work-center references.
    pub fn count_machine_references(&self, text: &str) -> usize {
        self.machine_references.find_iter(text).count()
    }

    /// Measurement mentions.
    pub fn count_measurements(&self, text: &str) -> usize {
        self.measurements.find_iter(text).count()
    }
}
