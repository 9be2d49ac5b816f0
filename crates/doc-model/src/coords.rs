//! Percentage-space coordinates.
//!
//! Every element position and size is stored as a percentage (0-100) of the
//! page's width or height, origin top-left. Nothing here knows about display
//! scale; renderers multiply by their own factor.

use serde::{Deserialize, Serialize};

/// Upper bound of percentage space on either axis.
pub const PERCENT_MAX: f32 = 100.0;

/// A point in percentage space (or pixel space, when the caller says so).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Clamp both coordinates into `[0, 100]`.
    pub fn clamped_to_page(self) -> Self {
        Self { x: self.x.clamp(0.0, PERCENT_MAX), y: self.y.clamp(0.0, PERCENT_MAX) }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Rotate `self` about `center` by `degrees` (clockwise on a y-down screen).
    pub fn rotated_about(self, center: Point, degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let dx = self.x - center.x;
        let dy = self.y - center.y;
        Self { x: center.x + dx * cos - dy * sin, y: center.y + dx * sin + dy * cos }
    }
}

/// Width and height of a box in percentage space. Text elements have none.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Extent {
    pub width: f32,
    pub height: f32,
}

impl Extent {
    pub const ZERO: Extent = Extent { width: 0.0, height: 0.0 };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned box in percentage space, `(x, y)` being the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn extent(&self) -> Extent {
        Extent::new(self.width, self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Keep the whole box on the page: size is capped at 100 and the origin is
    /// pushed back so that `x + width` and `y + height` stay within `[0, 100]`.
    pub fn clamped_to_page(self) -> Self {
        let width = finite_or_zero(self.width).clamp(0.0, PERCENT_MAX);
        let height = finite_or_zero(self.height).clamp(0.0, PERCENT_MAX);
        Self {
            x: finite_or_zero(self.x).clamp(0.0, PERCENT_MAX - width),
            y: finite_or_zero(self.y).clamp(0.0, PERCENT_MAX - height),
            width,
            height,
        }
    }

    /// Same as [`Rect::clamped_to_page`] after enforcing a minimum size.
    pub fn with_min_size(self, min: f32) -> Self {
        Self { width: self.width.max(min), height: self.height.max(min), ..self }.clamped_to_page()
    }
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// The two endpoints of a line symbol.
///
/// A line is stored as its bounding box plus `is_flipped_v`; this type is the
/// lossless decoding of that tuple. Flipped means the line runs from the
/// bottom-left to the top-right of its box (`/` on screen).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineEndpoints {
    pub start: Point,
    pub end: Point,
}

impl LineEndpoints {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// Decode `(x, y, width, height, is_flipped_v)` into endpoints.
    pub fn decode(rect: Rect, is_flipped_v: bool) -> Self {
        let (y1, y2) =
            if is_flipped_v { (rect.bottom(), rect.y) } else { (rect.y, rect.bottom()) };
        Self { start: Point::new(rect.x, y1), end: Point::new(rect.right(), y2) }
    }

    /// Encode endpoints back into the stored tuple.
    ///
    /// Degenerate (axis-aligned) lines are never flipped, which keeps the
    /// decode/encode pair idempotent.
    pub fn encode(&self) -> (Rect, bool) {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        let rect = Rect::new(
            self.start.x.min(self.end.x),
            self.start.y.min(self.end.y),
            dx.abs(),
            dy.abs(),
        );
        (rect, dx * dy < 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_codec_round_trips_normalized_tuples() {
        let cases = [
            (Rect::new(10.0, 20.0, 30.0, 40.0), false),
            (Rect::new(10.0, 20.0, 30.0, 40.0), true),
            (Rect::new(0.0, 50.0, 100.0, 0.0), false),
            (Rect::new(42.5, 0.0, 0.0, 12.25), false),
            (Rect::new(0.0, 0.0, 0.0, 0.0), false),
        ];

        for (rect, flipped) in cases {
            let decoded = LineEndpoints::decode(rect, flipped);
            assert_eq!(decoded.encode(), (rect, flipped), "tuple {rect:?} flipped={flipped}");
        }
    }

    #[test]
    fn endpoint_order_does_not_change_encoding() {
        let a = Point::new(70.0, 10.0);
        let b = Point::new(20.0, 60.0);

        assert_eq!(LineEndpoints::new(a, b).encode(), LineEndpoints::new(b, a).encode());
        assert!(LineEndpoints::new(a, b).encode().1, "going up-right is the flipped diagonal");
    }

    #[test]
    fn clamping_keeps_box_on_page() {
        let rect = Rect::new(95.0, -3.0, 20.0, 10.0).clamped_to_page();
        assert_eq!(rect, Rect::new(80.0, 0.0, 20.0, 10.0));

        let oversized = Rect::new(-10.0, 5.0, 140.0, 50.0).clamped_to_page();
        assert_eq!(oversized, Rect::new(0.0, 5.0, 100.0, 50.0));
    }

    #[test]
    fn rotation_about_center() {
        let p = Point::new(10.0, 0.0).rotated_about(Point::new(0.0, 0.0), 90.0);
        assert!((p.x - 0.0).abs() < 1e-4);
        assert!((p.y - 10.0).abs() < 1e-4);
    }
}
