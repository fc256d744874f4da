//! Split-point detection and execution for one document.
//!
//! [`PoRouterSplitter`] wires the text provider, the page-count fast path,
//! the three heuristic detectors and the aggregator together, then hands the
//! decision to the executor.
//!
//! # Examples
//!
//! ```no_run
//! use po_router_split::{loader, PoRouterSplitter, SplitTargets, SplitterConfig};
//!
//! # fn main() -> po_router_split::Result<()> {
//! let document = loader::load("incoming/order_4471.pdf")?;
//! let splitter = PoRouterSplitter::new(SplitterConfig::default());
//!
//! let report = splitter.split(&document, &SplitTargets::new("out/4471_PO.pdf", "out/4471_ROUTER.pdf"));
//! println!("{}: {}", report.outcome, report.explanation);
//! # Ok(())
//! # }
//! ```

mod executor;
mod report;

pub use executor::execute;
pub use report::{probe_thresholds, SplitOutcome, SplitReport, SplitTargets, ThresholdProbe};

use crate::config::SplitterConfig;
use crate::detection::{
    aggregate, select_split_point, sort_results, ContentTransitionDetector, DetectionResult,
    Detector, LayoutTransitionDetector, PageCountDetector, PatternSet, SplitDecision,
    TextPatternDetector,
};
use crate::document::Document;
use crate::ocr::{NoOcr, OcrEngine, TesseractOcr};
use crate::text::PageTextProvider;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

/// Finds the PO/router boundary of a document and writes the two sections.
pub struct PoRouterSplitter {
    config: SplitterConfig,
    ocr: Box<dyn OcrEngine>,
    page_count: PageCountDetector,
    detectors: Vec<Box<dyn Detector>>,
}

impl PoRouterSplitter {
    /// Create a splitter. OCR uses `pdftoppm` and `tesseract` unless disabled.
    pub fn new(config: SplitterConfig) -> Self {
        let ocr: Box<dyn OcrEngine> = if config.ocr_enabled {
            Box::new(TesseractOcr::new().with_timeout(config.ocr_timeout()))
        } else {
            Box::new(NoOcr)
        };
        Self {
            config,
            ocr,
            page_count: PageCountDetector::new(),
            detectors: default_detectors(PatternSet::shared_default()),
        }
    }

    /// Replace the OCR engine.
    pub fn with_ocr_engine(mut self, engine: impl OcrEngine + 'static) -> Self {
        self.ocr = Box::new(engine);
        self
    }

    /// Use custom pattern tables for the text and content detectors.
    pub fn with_patterns(mut self, patterns: Arc<PatternSet>) -> Self {
        self.detectors = default_detectors(patterns);
        self
    }

    /// Use a custom page-count detector.
    pub fn with_page_count_detector(mut self, detector: PageCountDetector) -> Self {
        self.page_count = detector;
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    /// Locate the first page of the router section.
    ///
    /// A "page 1 of N" marker on the first page decides outright with
    /// confidence 1.0. Otherwise the heuristic detectors run and their
    /// results are aggregated; the returned confidence may then exceed 1.0
    /// when several methods agree.
    pub fn find_optimal_split_point(&self, document: &Document) -> SplitDecision {
        log::info!(
            "Running split point detection on {} ({} pages)",
            document.source().display(),
            document.page_count()
        );
        let text = PageTextProvider::new(document, self.ocr.as_ref(), &self.config);

        if let Some(po_pages) = self.page_count.detect_po_length(&text) {
            let decision = PageCountDetector::decide(po_pages, document.page_count());
            log::info!("Using page indicator: {}", decision.explanation);
            return decision;
        }

        log::info!("No page indicator found, using multi-method detection");
        let mut results = if self.config.parallel_detectors {
            self.run_parallel(&text)
        } else {
            self.detectors
                .iter()
                .flat_map(|detector| run_guarded(detector.as_ref(), &text))
                .collect()
        };
        sort_results(&mut results);

        select_split_point(aggregate(results))
    }

    fn run_parallel(&self, text: &PageTextProvider<'_>) -> Vec<DetectionResult> {
        thread::scope(|scope| {
            let handles: Vec<_> = self
                .detectors
                .iter()
                .map(|detector| {
                    let detector = detector.as_ref();
                    (detector.method(), scope.spawn(move || run_guarded(detector, text)))
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|(method, handle)| {
                    handle.join().unwrap_or_else(|_| {
                        log::error!("{} detector thread died", method);
                        Vec::new()
                    })
                })
                .collect()
        })
    }

    /// Detect and split using the configured threshold.
    pub fn split(&self, document: &Document, targets: &SplitTargets) -> SplitReport {
        self.split_with_threshold(document, targets, self.config.min_confidence)
    }

    /// Detect and split using `min_confidence` instead of the configured threshold.
    pub fn split_with_threshold(
        &self,
        document: &Document,
        targets: &SplitTargets,
        min_confidence: f64,
    ) -> SplitReport {
        let decision = self.find_optimal_split_point(document);
        execute(document, &decision, min_confidence, targets)
    }

    /// Run detection once and report the split/no-split verdict at each threshold.
    pub fn sweep_thresholds(&self, document: &Document, levels: &[f64]) -> Vec<ThresholdProbe> {
        let decision = self.find_optimal_split_point(document);
        probe_thresholds(&decision, levels)
    }
}

fn default_detectors(patterns: Arc<PatternSet>) -> Vec<Box<dyn Detector>> {
    vec![
        Box::new(TextPatternDetector::new(Arc::clone(&patterns))),
        Box::new(LayoutTransitionDetector::new()),
        Box::new(ContentTransitionDetector::new(patterns)),
    ]
}

/// Run one detector, treating a panic as "no evidence from this method".
fn run_guarded(detector: &dyn Detector, text: &PageTextProvider<'_>) -> Vec<DetectionResult> {
    match panic::catch_unwind(AssertUnwindSafe(|| detector.detect(text))) {
        Ok(results) => {
            log::debug!("{} produced {} result(s)", detector.method(), results.len());
            results
        },
        Err(_) => {
            log::error!("{} detection failed, ignoring its results", detector.method());
            Vec::new()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{DecisionSource, DetectionMethod};
    use crate::document::Page;

    struct Exploding;

    impl Detector for Exploding {
        fn method(&self) -> DetectionMethod {
            DetectionMethod::LayoutAnalysis
        }

        fn detect(&self, _text: &PageTextProvider<'_>) -> Vec<DetectionResult> {
            panic!("layout backend exploded");
        }
    }

    fn splitter() -> PoRouterSplitter {
        PoRouterSplitter::new(SplitterConfig::default().with_ocr(false))
    }

    fn router_document() -> Document {
        Document::new(
            "mixed.pdf",
            vec![
                Page::from_text(0, "Purchase Order\nVendor Name: ACME\nShip To: Plant 9"),
                Page::from_text(1, "ROUTING SHEET\nOperation 10 saw\nOperation 20 mill"),
            ],
        )
    }

    #[test]
    fn test_page_indicator_short_circuits() {
        let doc = Document::new(
            "po.pdf",
            vec![
                Page::from_text(0, "Purchase Order Page 1 of 1"),
                Page::from_text(1, "ROUTING SHEET"),
            ],
        );
        let decision = splitter().find_optimal_split_point(&doc);
        assert_eq!(decision.split_point, Some(1));
        assert_eq!(decision.confidence, 1.0);
        assert_eq!(decision.source, DecisionSource::PageIndicator);
        assert!(decision.candidates.is_empty());
    }

    #[test]
    fn test_heuristic_path() {
        let decision = splitter().find_optimal_split_point(&router_document());
        assert_eq!(decision.split_point, Some(1));
        assert_eq!(decision.source, DecisionSource::Heuristic);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let doc = router_document();
        let sequential = splitter().find_optimal_split_point(&doc);
        let parallel = PoRouterSplitter::new(
            SplitterConfig::default().with_ocr(false).with_parallel_detectors(true),
        )
        .find_optimal_split_point(&doc);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_panicking_detector_is_contained() {
        let mut splitter = splitter();
        splitter.detectors.push(Box::new(Exploding));
        let decision = splitter.find_optimal_split_point(&router_document());
        assert_eq!(decision.split_point, Some(1));
    }

    #[test]
    fn test_custom_ocr_engine_used_for_blank_pages() {
        let doc = Document::new("scan.pdf", vec![Page::from_text(0, ""), Page::from_text(1, "")]);
        let ocr = |_: &Document, page: usize, _: u32| {
            if page == 0 {
                "PURCHASE ORDER   Page 1 of 1".to_string()
            } else {
                String::new()
            }
        };
        let splitter = PoRouterSplitter::new(SplitterConfig::default()).with_ocr_engine(ocr);
        let decision = splitter.find_optimal_split_point(&doc);
        assert_eq!(decision.split_point, Some(1));
    }

    #[test]
    fn test_sweep_thresholds() {
        let probes = splitter().sweep_thresholds(&router_document(), &[0.1, 5.0]);
        assert!(probes[0].would_split);
        assert!(!probes[1].would_split);
    }
}
