//! Geometric primitives for page layout.
//!
//! Coordinates are PDF user-space points with the origin at the bottom-left
//! corner of the page.

/// A rectangle in page space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X coordinate of the lower-left corner
    pub x: f32,
    /// Y coordinate of the lower-left corner
    pub y: f32,
    /// Width of rectangle
    pub width: f32,
    /// Height of rectangle
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    ///
    /// # Examples
    ///
    /// ```
    /// use po_router_split::geometry::Rect;
    ///
    /// let rect = Rect::new(0.0, 0.0, 612.0, 792.0);
    /// assert_eq!(rect.width, 612.0);
    /// assert_eq!(rect.height, 792.0);
    /// ```
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from two corner points, in any order.
    ///
    /// PDF boxes such as `/MediaBox` are stored as `[x0 y0 x1 y1]` and may be
    /// given with the corners swapped, so the result is normalized.
    ///
    /// # Examples
    ///
    /// ```
    /// use po_router_split::geometry::Rect;
    ///
    /// let rect = Rect::from_points(792.0, 612.0, 0.0, 0.0);
    /// assert_eq!(rect.x, 0.0);
    /// assert_eq!(rect.width, 792.0);
    /// assert_eq!(rect.height, 612.0);
    /// ```
    pub fn from_points(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x: x0.min(x1),
            y: y0.min(y1),
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        }
    }
}
