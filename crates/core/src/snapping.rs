//! Axis and angle snapping.
//!
//! Lines snap to horizontal or vertical when they are nearly so; boxes snap
//! to equal on-screen width and height; rotations snap to fixed increments.

use folio_model::{Extent, Point};

/// Configuration for snapping behavior
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapConfig {
    /// Axis snap distance in percentage units.
    pub distance_threshold: f32,

    /// Axis snap tolerance in degrees.
    pub angle_threshold: f32,

    /// Rotation snap increments in degrees (e.g., 15.0 for 15° increments)
    pub rotation_increment: f32,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self { distance_threshold: 1.2, angle_threshold: 2.5, rotation_increment: 15.0 }
    }
}

/// Which axis a segment was snapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSnap {
    None,
    Horizontal,
    Vertical,
}

/// Classify the segment `p1 -> p2` without a modifier.
pub fn classify(p1: Point, p2: Point, config: &SnapConfig) -> AxisSnap {
    let dx = p1.x - p2.x;
    let dy = p1.y - p2.y;
    let angle = dy.atan2(dx).to_degrees().abs();

    let horizontal = dy.abs() < config.distance_threshold
        || angle < config.angle_threshold
        || angle > 180.0 - config.angle_threshold;
    let vertical =
        dx.abs() < config.distance_threshold || (angle - 90.0).abs() < config.angle_threshold;

    if horizontal {
        AxisSnap::Horizontal
    } else if vertical {
        AxisSnap::Vertical
    } else {
        AxisSnap::None
    }
}

/// Snap the moving point `p1` against the fixed point `p2`.
///
/// With `shift` the larger axis always wins; otherwise the point only snaps
/// when the segment is already within the configured tolerance.
pub fn snap_angle(p1: Point, p2: Point, shift: bool, config: &SnapConfig) -> Point {
    let snap = if shift {
        if (p1.x - p2.x).abs() > (p1.y - p2.y).abs() {
            AxisSnap::Horizontal
        } else {
            AxisSnap::Vertical
        }
    } else {
        classify(p1, p2, config)
    };

    match snap {
        AxisSnap::Horizontal => Point::new(p1.x, p2.y),
        AxisSnap::Vertical => Point::new(p2.x, p1.y),
        AxisSnap::None => p1,
    }
}

/// Make a box visually square on a page of `page_width` x `page_height`
/// (any unit; only the ratio matters). The larger visual side wins.
pub fn snap_symmetric(width: f32, height: f32, page_width: f32, page_height: f32) -> Extent {
    let visual = (width * page_width / 100.0).max(height * page_height / 100.0);
    Extent::new(visual / page_width * 100.0, visual / page_height * 100.0)
}

/// Round to the nearest multiple of `increment` degrees.
pub fn snap_rotation(degrees: f32, increment: f32) -> f32 {
    if increment > 0.0 {
        (degrees / increment).round() * increment
    } else {
        degrees
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SnapConfig {
        SnapConfig::default()
    }

    #[test]
    fn test_horizontal_snap_within_distance() {
        let snapped = snap_angle(Point::new(40.0, 21.0), Point::new(10.0, 20.0), false, &config());
        assert_eq!(snapped, Point::new(40.0, 20.0));
    }

    #[test]
    fn test_no_snap_outside_thresholds() {
        // 1.3 units off over 10: about 7.4 degrees, beyond both thresholds
        let moving = Point::new(20.0, 21.3);
        assert_eq!(snap_angle(moving, Point::new(10.0, 20.0), false, &config()), moving);
    }

    #[test]
    fn test_angle_threshold_applies_to_long_segments() {
        // 2 units off over 80: about 1.4 degrees
        let snapped = snap_angle(Point::new(90.0, 22.0), Point::new(10.0, 20.0), false, &config());
        assert_eq!(snapped.y, 20.0);
    }

    #[test]
    fn test_vertical_snap() {
        let snapped = snap_angle(Point::new(11.0, 60.0), Point::new(10.0, 20.0), false, &config());
        assert_eq!(snapped, Point::new(10.0, 60.0));
        assert_eq!(
            classify(Point::new(11.0, 60.0), Point::new(10.0, 20.0), &config()),
            AxisSnap::Vertical
        );
    }

    #[test]
    fn test_shift_forces_larger_axis() {
        let fixed = Point::new(10.0, 10.0);

        assert_eq!(snap_angle(Point::new(50.0, 30.0), fixed, true, &config()).y, 10.0);
        assert_eq!(snap_angle(Point::new(30.0, 50.0), fixed, true, &config()).x, 10.0);
    }

    #[test]
    fn test_symmetric_snap_equalizes_visual_extent() {
        // Letter page: 612 x 792
        let extent = snap_symmetric(10.0, 5.0, 612.0, 792.0);

        let visual_w = extent.width * 612.0 / 100.0;
        let visual_h = extent.height * 792.0 / 100.0;
        assert!((visual_w - visual_h).abs() < 1e-3);
        assert!((extent.width - 10.0).abs() < 1e-4, "larger visual side is kept");
    }

    #[test]
    fn test_rotation_snap() {
        assert_eq!(snap_rotation(22.0, 15.0), 15.0);
        assert_eq!(snap_rotation(23.0, 15.0), 30.0);
        assert_eq!(snap_rotation(-8.0, 15.0), -15.0);
        assert_eq!(snap_rotation(7.0, 0.0), 7.0);
    }
}
