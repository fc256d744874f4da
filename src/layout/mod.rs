//! Page layout features.
//!
//! A [`PageLayout`] is what the document loader reports about a page's
//! geometry and text spans. A [`LayoutDescriptor`] condenses it into the
//! handful of features the layout transition detector compares between
//! neighboring pages.

use crate::geometry::Rect;
use serde::Serialize;
use std::collections::HashMap;

/// A run of text drawn with a single font and size.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// The text drawn by this span
    pub text: String,
    /// Approximate bounding box
    pub bbox: Rect,
    /// Font name (the font's `BaseFont` when known)
    pub font_name: String,
    /// Effective font size in points
    pub font_size: f32,
}

impl TextSpan {
    /// Create a span with an empty bounding box.
    pub fn new(text: impl Into<String>, font_name: impl Into<String>, font_size: f32) -> Self {
        Self {
            text: text.into(),
            bbox: Rect::default(),
            font_name: font_name.into(),
            font_size,
        }
    }

    /// Set the bounding box.
    pub fn with_bbox(mut self, bbox: Rect) -> Self {
        self.bbox = bbox;
        self
    }
}

/// Geometry and text-span layout of a single page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Text spans in content-stream order
    pub spans: Vec<TextSpan>,
}

impl Default for PageLayout {
    fn default() -> Self {
        // US Letter, portrait
        Self::new(612.0, 792.0)
    }
}

impl PageLayout {
    /// Create a layout with no text spans.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            spans: Vec::new(),
        }
    }
}

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Height greater than or equal to width
    Portrait,
    /// Width greater than height
    Landscape,
}

impl Orientation {
    /// Orientation of a page with the given dimensions.
    pub fn of(width: f32, height: f32) -> Self {
        if width > height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }
}

/// Layout features of one page, computed independently of its neighbors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutDescriptor {
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Landscape when wider than tall
    pub orientation: Orientation,
    /// Most frequent font among the page's spans
    pub dominant_font: Option<String>,
    /// Mean span font size
    pub avg_font_size: Option<f32>,
    /// Number of text spans on the page
    pub text_block_count: usize,
    /// Number of distinct fonts
    pub font_variety: usize,
}

impl LayoutDescriptor {
    /// Compute the descriptor for a page layout.
    ///
    /// Pages without spans have no dominant font and no average size.
    pub fn from_layout(layout: &PageLayout) -> Self {
        let spans = &layout.spans;

        let mut font_counts: HashMap<&str, (usize, usize)> = HashMap::new();
        for (order, span) in spans.iter().enumerate() {
            let entry = font_counts.entry(span.font_name.as_str()).or_insert((0, order));
            entry.0 += 1;
        }

        // Highest count wins; ties go to the font seen first on the page.
        let dominant_font = font_counts
            .iter()
            .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(b.1 .1.cmp(&a.1 .1)))
            .map(|(name, _)| name.to_string());

        let avg_font_size = if spans.is_empty() {
            None
        } else {
            Some(spans.iter().map(|s| s.font_size).sum::<f32>() / spans.len() as f32)
        };

        Self {
            width: layout.width,
            height: layout.height,
            orientation: Orientation::of(layout.width, layout.height),
            dominant_font,
            avg_font_size,
            text_block_count: spans.len(),
            font_variety: font_counts.len(),
        }
    }
}
