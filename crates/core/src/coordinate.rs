//! Viewport ↔ page-surface coordinate conversion
//!
//! Pointer events arrive in viewport coordinates. The page renderer reports
//! where it placed a page surface (its bounding box in the viewport), and the
//! conversion is a subtraction of that origin followed by division by the
//! zoom factor. At zoom 1.0 this is the plain 1:1 pixel mapping.

use crate::geometry::{PageCoordinate, PageRect, Size};
use serde::{Deserialize, Serialize};

/// Pointer position in viewport (client) coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewportPoint {
    pub x: f32,
    pub y: f32,
}

impl ViewportPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Bounding box of a page surface in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfaceBounds {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl SurfaceBounds {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    /// Inclusive containment test in viewport coordinates
    pub fn contains(&self, point: ViewportPoint) -> bool {
        point.x >= self.left
            && point.x <= self.left + self.width
            && point.y >= self.top
            && point.y <= self.top + self.height
    }
}

/// Converts between viewport and page-relative coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateSpace {
    zoom: f32,
}

impl Default for CoordinateSpace {
    fn default() -> Self {
        Self { zoom: 1.0 }
    }
}

impl CoordinateSpace {
    /// 1:1 mapping between viewport pixels and page units
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapping for a surface rendered at `zoom` (non-positive values fall back to 1.0)
    pub fn with_zoom(zoom: f32) -> Self {
        let zoom = if zoom.is_finite() && zoom > 0.0 { zoom } else { 1.0 };
        Self { zoom }
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Convert a pointer position into page-relative coordinates
    pub fn to_page_relative(
        &self,
        point: ViewportPoint,
        surface: &SurfaceBounds,
    ) -> PageCoordinate {
        PageCoordinate::new(
            (point.x - surface.left) / self.zoom,
            (point.y - surface.top) / self.zoom,
        )
    }

    /// Convert a page-relative coordinate back to the viewport for rendering
    pub fn to_viewport(&self, coord: PageCoordinate, surface: &SurfaceBounds) -> ViewportPoint {
        ViewportPoint::new(surface.left + coord.x * self.zoom, surface.top + coord.y * self.zoom)
    }

    /// Viewport rectangle covered by a page-relative box
    pub fn rect_to_viewport(&self, rect: &PageRect, surface: &SurfaceBounds) -> SurfaceBounds {
        let origin = self.to_viewport(rect.origin(), surface);
        SurfaceBounds::new(origin.x, origin.y, rect.width * self.zoom, rect.height * self.zoom)
    }

    /// Size of the surface in page units
    pub fn page_size(&self, surface: &SurfaceBounds) -> Size {
        Size::new(surface.width / self.zoom, surface.height / self.zoom)
    }

    /// Clamp a page-relative coordinate onto the surface
    pub fn clamp_to_surface(
        &self,
        coord: PageCoordinate,
        surface: &SurfaceBounds,
    ) -> PageCoordinate {
        let size = self.page_size(surface);
        PageCoordinate::new(coord.x.clamp(0.0, size.width), coord.y.clamp(0.0, size.height))
    }
}

/// Box between a drag start point and the current pointer point.
///
/// The origin is the top-left corner whichever way the pointer moved.
pub fn normalize_rect(start: PageCoordinate, current: PageCoordinate) -> PageRect {
    PageRect::from_corners(start, current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface() -> SurfaceBounds {
        SurfaceBounds::new(100.0, 40.0, 600.0, 800.0)
    }

    #[test]
    fn page_relative_is_origin_subtraction() {
        let space = CoordinateSpace::new();
        let coord = space.to_page_relative(ViewportPoint::new(150.0, 90.0), &surface());
        assert_eq!(coord, PageCoordinate::new(50.0, 50.0));
    }

    #[test]
    fn viewport_round_trip_under_zoom() {
        let space = CoordinateSpace::with_zoom(2.0);
        let point = ViewportPoint::new(300.0, 240.0);
        let coord = space.to_page_relative(point, &surface());
        assert_eq!(coord, PageCoordinate::new(100.0, 100.0));
        assert_eq!(space.to_viewport(coord, &surface()), point);
        assert_eq!(space.page_size(&surface()), Size::new(300.0, 400.0));
    }

    #[test]
    fn invalid_zoom_falls_back_to_identity() {
        assert_eq!(CoordinateSpace::with_zoom(0.0).zoom(), 1.0);
        assert_eq!(CoordinateSpace::with_zoom(f32::NAN).zoom(), 1.0);
    }

    #[test]
    fn normalize_rect_handles_every_drag_direction() {
        let anchor = PageCoordinate::new(50.0, 50.0);
        let expected = |x, y| PageRect::new(x, y, 20.0, 30.0);

        // down-right, down-left, up-right, up-left
        assert_eq!(normalize_rect(anchor, PageCoordinate::new(70.0, 80.0)), expected(50.0, 50.0));
        assert_eq!(normalize_rect(anchor, PageCoordinate::new(30.0, 80.0)), expected(30.0, 50.0));
        assert_eq!(normalize_rect(anchor, PageCoordinate::new(70.0, 20.0)), expected(50.0, 20.0));
        assert_eq!(normalize_rect(anchor, PageCoordinate::new(30.0, 20.0)), expected(30.0, 20.0));
    }

    #[test]
    fn clamp_keeps_points_on_the_surface() {
        let space = CoordinateSpace::new();
        let clamped = space.clamp_to_surface(PageCoordinate::new(-5.0, 900.0), &surface());
        assert_eq!(clamped, PageCoordinate::new(0.0, 800.0));
    }

    #[test]
    fn rect_to_viewport_scales_box() {
        let space = CoordinateSpace::with_zoom(2.0);
        let rect = space.rect_to_viewport(&PageRect::new(10.0, 10.0, 50.0, 20.0), &surface());
        assert_eq!(rect, SurfaceBounds::new(120.0, 60.0, 100.0, 40.0));
    }
}
