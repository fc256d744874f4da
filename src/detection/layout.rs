//! Layout changes between consecutive pages.
//!
//! Routers are often printed from a different system than the purchase order
//! they travel with: landscape sheets, a different typeface, sparser text.
//! Each page is compared against its immediate predecessor only.

use super::{collect_results, DetectionMethod, DetectionResult, Detector};
use crate::error::Result;
use crate::layout::LayoutDescriptor;
use crate::text::PageTextProvider;
use indexmap::IndexMap;

/// Bonus when the orientation flips.
pub const ORIENTATION_CHANGE: f64 = 0.6;
/// Bonus when the average font size moves by more than [`FONT_SIZE_DELTA`].
pub const FONT_SIZE_CHANGE: f64 = 0.4;
/// Minimum average font size difference, in points.
pub const FONT_SIZE_DELTA: f32 = 2.0;
/// Bonus when the dominant font changes.
pub const FONT_CHANGE: f64 = 0.3;
/// Bonus when the text-block count drops by more than [`DENSITY_DROP_RATIO`].
pub const DENSITY_DROP: f64 = 0.3;
/// Relative drop in text-block count that counts as a density change.
pub const DENSITY_DROP_RATIO: f64 = 0.4;
/// A page is reported only above this confidence.
pub const MIN_REPORT_CONFIDENCE: f64 = 0.4;

/// Flags pages whose layout differs sharply from the previous page.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutTransitionDetector;

impl LayoutTransitionDetector {
    /// Create a detector.
    pub fn new() -> Self {
        Self
    }

    /// Score the transition from `prev` to `curr`, reported at page `page`.
    pub fn compare(
        &self,
        page: usize,
        prev: &LayoutDescriptor,
        curr: &LayoutDescriptor,
    ) -> Option<DetectionResult> {
        let mut confidence = 0.0;
        let mut evidence = Vec::new();
        let mut details = IndexMap::new();

        if curr.orientation != prev.orientation {
            confidence += ORIENTATION_CHANGE;
            evidence.push(format!(
                "orientation_change:{}->{}",
                prev.orientation.as_str(),
                curr.orientation.as_str()
            ));
            details.insert("orientation_change".to_string(), 1.0);
        }

        if let (Some(prev_size), Some(curr_size)) = (prev.avg_font_size, curr.avg_font_size) {
            let diff = (curr_size - prev_size).abs();
            details.insert("font_size_diff".to_string(), f64::from(diff));
            if diff > FONT_SIZE_DELTA {
                confidence += FONT_SIZE_CHANGE;
                evidence.push(format!("font_size_change:{:.1}", diff));
            }
        }

        if let (Some(prev_font), Some(curr_font)) = (&prev.dominant_font, &curr.dominant_font) {
            if prev_font != curr_font {
                confidence += FONT_CHANGE;
                evidence.push(format!("font_type_change:{}->{}", prev_font, curr_font));
                details.insert("font_type_change".to_string(), 1.0);
            }
        }

        details.insert("font_variety".to_string(), curr.font_variety as f64);

        if prev.text_block_count > 0 {
            let before = prev.text_block_count as f64;
            let change = (curr.text_block_count as f64 - before) / before.max(1.0);
            details.insert("text_density_change".to_string(), change);
            if change < -DENSITY_DROP_RATIO {
                confidence += DENSITY_DROP;
                evidence.push(format!("text_density_drop:{:.2}", change));
            }
        }

        let confidence = confidence.clamp(0.0, 1.0);
        if confidence <= MIN_REPORT_CONFIDENCE {
            return None;
        }

        log::debug!("layout_analysis: page {} scored {:.2}", page, confidence);
        Some(DetectionResult::new(
            page,
            confidence,
            DetectionMethod::LayoutAnalysis,
            evidence,
            details,
        ))
    }

    fn analyze(&self, text: &PageTextProvider<'_>, page: usize) -> Result<Option<DetectionResult>> {
        let document = text.document();
        let prev = LayoutDescriptor::from_layout(&document.page(page - 1)?.layout);
        let curr = LayoutDescriptor::from_layout(&document.page(page)?.layout);
        Ok(self.compare(page, &prev, &curr))
    }
}

impl Detector for LayoutTransitionDetector {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::LayoutAnalysis
    }

    fn detect(&self, text: &PageTextProvider<'_>) -> Vec<DetectionResult> {
        let pages = 1..text.document().page_count();
        collect_results(self.method(), pages, |page| self.analyze(text, page))
    }
}
