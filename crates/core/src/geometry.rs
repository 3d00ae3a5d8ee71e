//! Page-surface geometry primitives
//!
//! All page-relative values live in the coordinate space of the page preview
//! surface: origin at the top-left corner, x to the right, y downward, one
//! unit per surface pixel at zoom 1.0.

use serde::{Deserialize, Serialize};

/// Point relative to a page surface's top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PageCoordinate {
    pub x: f32,
    pub y: f32,
}

impl PageCoordinate {
    /// Create a new page coordinate
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another coordinate
    pub fn distance_to(&self, other: &PageCoordinate) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Component-wise difference `self - other`
    pub fn offset_from(&self, other: &PageCoordinate) -> PageCoordinate {
        PageCoordinate::new(self.x - other.x, self.y - other.y)
    }
}

/// Width and height of a box or surface
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned box in page-relative coordinates
///
/// `x`/`y` is always the top-left corner; width and height are never negative
/// for boxes built through [`PageRect::from_corners`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PageRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PageRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Box spanning two arbitrary corner points
    pub fn from_corners(a: PageCoordinate, b: PageCoordinate) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    /// Box of `size` centered on `center`
    pub fn centered_on(center: PageCoordinate, size: Size) -> Self {
        Self {
            x: center.x - size.width / 2.0,
            y: center.y - size.height / 2.0,
            width: size.width,
            height: size.height,
        }
    }

    pub fn origin(&self) -> PageCoordinate {
        PageCoordinate::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn center(&self) -> PageCoordinate {
        PageCoordinate::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Inclusive point containment
    pub fn contains(&self, point: &PageCoordinate) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// Whether both dimensions reach `min`
    pub fn meets_minimum(&self, min: f32) -> bool {
        self.width >= min && self.height >= min
    }

    /// Same size, new origin
    pub fn with_origin(&self, x: f32, y: f32) -> Self {
        Self { x, y, width: self.width, height: self.height }
    }

    /// Shift the box so it lies inside `bounds` (a `0,0`-anchored surface).
    ///
    /// Boxes larger than the surface are pinned to the top-left corner.
    pub fn shifted_inside(&self, bounds: Size) -> Self {
        let max_x = (bounds.width - self.width).max(0.0);
        let max_y = (bounds.height - self.height).max(0.0);
        self.with_origin(self.x.clamp(0.0, max_x), self.y.clamp(0.0, max_y))
    }

    /// Whether the box lies entirely inside a `0,0`-anchored surface
    pub fn fits_within(&self, bounds: Size) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.right() <= bounds.width
            && self.bottom() <= bounds.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_corners_orders_points() {
        let a = PageCoordinate::new(40.0, 10.0);
        let b = PageCoordinate::new(10.0, 30.0);
        let rect = PageRect::from_corners(a, b);
        assert_eq!(rect, PageRect::new(10.0, 10.0, 30.0, 20.0));
    }

    #[test]
    fn centered_box_keeps_size() {
        let rect = PageRect::centered_on(PageCoordinate::new(100.0, 100.0), Size::new(200.0, 60.0));
        assert_eq!(rect, PageRect::new(0.0, 70.0, 200.0, 60.0));
        assert_eq!(rect.center(), PageCoordinate::new(100.0, 100.0));
    }

    #[test]
    fn shifted_inside_pulls_box_off_the_edges() {
        let surface = Size::new(600.0, 800.0);
        let rect = PageRect::new(-20.0, 780.0, 200.0, 60.0).shifted_inside(surface);
        assert_eq!(rect, PageRect::new(0.0, 740.0, 200.0, 60.0));
        assert!(rect.fits_within(surface));
    }

    #[test]
    fn oversized_box_is_pinned_to_origin() {
        let rect = PageRect::new(30.0, 30.0, 900.0, 900.0).shifted_inside(Size::new(600.0, 800.0));
        assert_eq!(rect.origin(), PageCoordinate::new(0.0, 0.0));
    }

    #[test]
    fn minimum_size_is_inclusive() {
        assert!(PageRect::new(0.0, 0.0, 10.0, 10.0).meets_minimum(10.0));
        assert!(!PageRect::new(0.0, 0.0, 10.0, 9.5).meets_minimum(10.0));
    }
}
