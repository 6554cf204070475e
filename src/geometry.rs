//! Plane geometry primitives in points.
//!
//! The layout core works in the host's coordinate space: `y` grows
//! downwards, the origin of the content is the top-left corner, and all
//! values are `f64` points.

use serde::{Deserialize, Serialize};

/// Two sizes or coordinates closer than this are considered equal.
pub const EPSILON: f64 = 1e-6;

/// A point in content coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// The origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Horizontal extent.
    pub width: f64,
    /// Vertical extent.
    pub height: f64,
}

impl Size {
    /// The empty size.
    pub const ZERO: Self = Self {
        width: 0.0,
        height: 0.0,
    };

    /// Create a new size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Compare two sizes with [`EPSILON`] tolerance.
    pub fn approx_eq(&self, other: &Size) -> bool {
        (self.width - other.width).abs() < EPSILON && (self.height - other.height).abs() < EPSILON
    }
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner.
    pub origin: Point,
    /// Extent.
    pub size: Size,
}

impl Rect {
    /// The empty rectangle at the origin.
    pub const ZERO: Self = Self {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    /// Create a rectangle from its components.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Create a rectangle from an origin and a size.
    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Left edge.
    pub fn min_x(&self) -> f64 {
        self.origin.x
    }

    /// Right edge.
    pub fn max_x(&self) -> f64 {
        self.origin.x + self.size.width
    }

    /// Top edge.
    pub fn min_y(&self) -> f64 {
        self.origin.y
    }

    /// Bottom edge.
    pub fn max_y(&self) -> f64 {
        self.origin.y + self.size.height
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f64 {
        self.size.width
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f64 {
        self.size.height
    }

    /// Whether the two rectangles overlap.
    ///
    /// Zero-height rectangles are treated as horizontal lines so that an
    /// element of height zero sitting inside a query rect is still reported.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min_x() <= other.max_x()
            && other.min_x() <= self.max_x()
            && self.min_y() < other.max_y().max(other.min_y() + EPSILON)
            && other.min_y() < self.max_y().max(self.min_y() + EPSILON)
    }

    /// Shrinks the rectangle by the given insets.
    pub fn inset_by(&self, insets: EdgeInsets) -> Self {
        Self::new(
            self.origin.x + insets.left,
            self.origin.y + insets.top,
            self.size.width - insets.left - insets.right,
            self.size.height - insets.top - insets.bottom,
        )
    }
}

/// Insets applied to the four edges of a rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeInsets {
    /// Top inset.
    pub top: f64,
    /// Left inset.
    pub left: f64,
    /// Bottom inset.
    pub bottom: f64,
    /// Right inset.
    pub right: f64,
}

impl EdgeInsets {
    /// No insets.
    pub const ZERO: Self = Self {
        top: 0.0,
        left: 0.0,
        bottom: 0.0,
        right: 0.0,
    };

    /// Create insets from the four edges.
    pub fn new(top: f64, left: f64, bottom: f64, right: f64) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Sum of the left and right insets.
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    /// Sum of the top and bottom insets.
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// A 2D affine transform, row-vector convention.
///
/// Only used as an animation hint on layout attributes; the core never
/// applies it to geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    /// Scale / rotation component.
    pub a: f64,
    /// Shear / rotation component.
    pub b: f64,
    /// Shear / rotation component.
    pub c: f64,
    /// Scale / rotation component.
    pub d: f64,
    /// Horizontal translation.
    pub tx: f64,
    /// Vertical translation.
    pub ty: f64,
}

impl AffineTransform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// A scaling transform.
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    /// A translating transform.
    pub fn translation(tx: f64, ty: f64) -> Self {
        Self {
            tx,
            ty,
            ..Self::IDENTITY
        }
    }

    /// Whether this is the identity transform.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for AffineTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(rect.min_x(), 10.0);
        assert_eq!(rect.max_x(), 40.0);
        assert_eq!(rect.min_y(), 20.0);
        assert_eq!(rect.max_y(), 60.0);
    }

    #[test]
    fn intersects_overlapping_rects() {
        let a = Rect::new(0.0, 0.0, 100.0, 50.0);
        let b = Rect::new(0.0, 40.0, 100.0, 50.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn touching_rects_do_not_intersect_vertically() {
        let a = Rect::new(0.0, 0.0, 100.0, 50.0);
        let b = Rect::new(0.0, 50.0, 100.0, 50.0);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn zero_height_rect_inside_query_intersects() {
        let line = Rect::new(0.0, 10.0, 100.0, 0.0);
        let query = Rect::new(0.0, 0.0, 100.0, 20.0);
        assert!(line.intersects(&query));
    }

    #[test]
    fn inset_by_shrinks_all_edges() {
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0).inset_by(EdgeInsets::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(rect, Rect::new(2.0, 1.0, 94.0, 96.0));
    }

    #[test]
    fn size_approx_eq_tolerates_rounding() {
        assert!(Size::new(10.0, 20.0).approx_eq(&Size::new(10.0 + 1e-9, 20.0)));
        assert!(!Size::new(10.0, 20.0).approx_eq(&Size::new(10.0, 20.5)));
    }

    #[test]
    fn default_transform_is_identity() {
        assert!(AffineTransform::default().is_identity());
        assert!(!AffineTransform::scale(0.5, 0.5).is_identity());
    }
}
