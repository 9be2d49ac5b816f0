//! Geometry kernel for element manipulation.
//!
//! Pure functions: each takes the state captured at gesture start plus the
//! current pointer and returns new geometry in percentage space. Nothing here
//! touches the model; callers turn the results into
//! [`folio_model::GeometryUpdate`]s.

use crate::snapping::{snap_angle, snap_symmetric, SnapConfig};
use folio_model::{Extent, GeometryUpdate, LineEndpoints, Point, Rect, ShapeKind, PERCENT_MAX};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InteractionError {
    #[error("page container has no measurable size")]
    MeasurementUnavailable,
    #[error("another element is already being manipulated")]
    SurfaceBusy,
    #[error("handle {0} does not apply to this element")]
    UnsupportedHandle(&'static str),
}

/// On-screen rectangle of the page container, in client pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ContainerRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }

    /// The rect, if it can be used for percentage conversion.
    pub fn measure(self) -> Result<Self, InteractionError> {
        let finite = [self.left, self.top, self.width, self.height].iter().all(|v| v.is_finite());
        if finite && self.width > 0.0 && self.height > 0.0 {
            Ok(self)
        } else {
            Err(InteractionError::MeasurementUnavailable)
        }
    }

    /// Client pixel position to page percentage (not clamped).
    pub fn to_percent(&self, client: Point) -> Point {
        Point::new(
            (client.x - self.left) / self.width * PERCENT_MAX,
            (client.y - self.top) / self.height * PERCENT_MAX,
        )
    }

    /// Page percentage to client pixels.
    pub fn to_client(&self, percent: Point) -> Point {
        Point::new(
            self.left + percent.x / PERCENT_MAX * self.width,
            self.top + percent.y / PERCENT_MAX * self.height,
        )
    }

    /// Pointer movement between two client positions, in percentage units.
    pub fn delta_to_percent(&self, from: Point, to: Point) -> Point {
        Point::new((to.x - from.x) / self.width * PERCENT_MAX, (to.y - from.y) / self.height * PERCENT_MAX)
    }

    pub fn page_aspect(&self) -> PageAspect {
        PageAspect::new(self.width, self.height)
    }
}

/// Visual page dimensions; only their ratio matters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageAspect {
    pub width: f32,
    pub height: f32,
}

impl PageAspect {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// On-screen width/height ratio of a box of the given percentage extent.
    pub fn visual_ratio(&self, extent: Extent) -> f32 {
        let ratio = (extent.width * self.width) / (extent.height * self.height);
        if ratio.is_finite() && ratio > 0.0 {
            ratio
        } else {
            1.0
        }
    }
}

/// Box corners, in unrotated local orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Offset of this corner from the box center, as multiples of (w, h).
    fn unit_offset(self) -> (f32, f32) {
        match self {
            Corner::TopLeft => (-0.5, -0.5),
            Corner::TopRight => (0.5, -0.5),
            Corner::BottomLeft => (-0.5, 0.5),
            Corner::BottomRight => (0.5, 0.5),
        }
    }

    pub fn opposite(self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }

    /// Where this corner sits on screen for a box rotated by `rotation`.
    pub fn position(self, rect: Rect, rotation: f32) -> Point {
        let (ux, uy) = self.unit_offset();
        let center = rect.center();
        Point::new(center.x + ux * rect.width, center.y + uy * rect.height)
            .rotated_about(center, rotation)
    }
}

/// What is being resized; decides the aspect-lock rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoxKind {
    Shape(ShapeKind),
    /// `aspect_ratio` is the on-screen width/height captured at gesture start.
    Image { aspect_ratio: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeParams {
    pub shift: bool,
    pub kind: BoxKind,
    pub page: PageAspect,
    pub min_size: f32,
}

/// New line geometry as stored on the element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineGeometry {
    pub bounds: Rect,
    pub is_flipped_v: bool,
}

impl From<LineGeometry> for GeometryUpdate {
    fn from(line: LineGeometry) -> Self {
        GeometryUpdate::line(line.bounds, line.is_flipped_v)
    }
}

/// Move an element by `delta`, keeping the whole box on the page.
/// Elements without an extent (text) clamp their anchor into `[0, 100]`.
pub fn compute_drag(origin: Point, delta: Point, extent: Extent) -> Point {
    Point::new(
        (origin.x + delta.x).clamp(0.0, (PERCENT_MAX - extent.width).max(0.0)),
        (origin.y + delta.y).clamp(0.0, (PERCENT_MAX - extent.height).max(0.0)),
    )
}

/// Resize an unrotated box with `anchor` fixed and the opposite corner
/// following `pointer`.
pub fn compute_axis_aligned_resize(anchor: Point, pointer: Point, params: &ResizeParams) -> Rect {
    let pointer = pointer.clamped_to_page();
    let mut width = (pointer.x - anchor.x).abs();
    let mut height = (pointer.y - anchor.y).abs();

    if params.shift {
        match params.kind {
            BoxKind::Shape(shape) if shape.is_aspect_lockable() => {
                let extent = snap_symmetric(width, height, params.page.width, params.page.height);
                width = extent.width;
                height = extent.height;
            }
            BoxKind::Image { aspect_ratio } => {
                (width, height) = proportional(width, height, aspect_ratio, params.page);
            }
            BoxKind::Shape(_) => {}
        }
        (width, height) = fit_from_anchor(anchor, pointer, width, height);
    }

    let x = if pointer.x < anchor.x { anchor.x - width } else { anchor.x };
    let y = if pointer.y < anchor.y { anchor.y - height } else { anchor.y };

    Rect::new(x, y, width, height).with_min_size(params.min_size)
}

/// Shrink a locked box uniformly until it fits between `anchor` and the page
/// edges on the pointer's side.
fn fit_from_anchor(anchor: Point, pointer: Point, width: f32, height: f32) -> (f32, f32) {
    let room_x = if pointer.x < anchor.x { anchor.x } else { PERCENT_MAX - anchor.x };
    let room_y = if pointer.y < anchor.y { anchor.y } else { PERCENT_MAX - anchor.y };

    let mut scale: f32 = 1.0;
    if width > room_x {
        scale = scale.min(room_x / width);
    }
    if height > room_y {
        scale = scale.min(room_y / height);
    }
    (width * scale, height * scale)
}

/// The dominant on-screen dimension drives the other through `aspect_ratio`.
fn proportional(width: f32, height: f32, aspect_ratio: f32, page: PageAspect) -> (f32, f32) {
    let visual_w = width * page.width / PERCENT_MAX;
    let visual_h = height * page.height / PERCENT_MAX;

    if visual_w / aspect_ratio > visual_h {
        (width, visual_w / aspect_ratio / page.height * PERCENT_MAX)
    } else {
        (visual_h * aspect_ratio / page.width * PERCENT_MAX, height)
    }
}

/// Resize a box rotated by `rotation` degrees with `anchor` (a page-space
/// corner) fixed.
///
/// The pointer offset is projected into the box's local frame to get the new
/// size, and the center is placed half a size away from the anchor along the
/// rotated axes, so the anchor stays put on screen.
pub fn compute_rotated_resize(
    rotation: f32,
    anchor: Point,
    pointer: Point,
    params: &ResizeParams,
) -> Rect {
    let pointer = pointer.clamped_to_page();
    let (sin, cos) = rotation.to_radians().sin_cos();

    let vx = pointer.x - anchor.x;
    let vy = pointer.y - anchor.y;
    let dx_local = vx * cos + vy * sin;
    let dy_local = -vx * sin + vy * cos;

    let mut width = dx_local.abs();
    let mut height = dy_local.abs();
    if params.shift {
        if let BoxKind::Shape(shape) = params.kind {
            if shape.is_aspect_lockable() {
                let extent = snap_symmetric(width, height, params.page.width, params.page.height);
                width = extent.width;
                height = extent.height;
            }
        }
    }

    let local_cx = dx_local.signum() * width / 2.0;
    let local_cy = dy_local.signum() * height / 2.0;
    let cx = anchor.x + local_cx * cos - local_cy * sin;
    let cy = anchor.y + local_cx * sin + local_cy * cos;

    Rect::new(
        cx - width / 2.0,
        cy - height / 2.0,
        width.max(params.min_size),
        height.max(params.min_size),
    )
}

/// Page-space position of the corner opposite to the dragged one.
pub fn resize_anchor(rect: Rect, rotation: f32, dragged: Corner) -> Point {
    dragged.opposite().position(rect, rotation)
}

/// Move one endpoint of a line while the other stays fixed.
pub fn compute_line_endpoint_drag(
    fixed: Point,
    moving: Point,
    shift: bool,
    snap: &SnapConfig,
) -> LineGeometry {
    let moving = snap_angle(moving.clamped_to_page(), fixed, shift, snap);
    let (bounds, is_flipped_v) = LineEndpoints::new(moving, fixed).encode();
    LineGeometry { bounds, is_flipped_v }
}

/// Rotation for a handle below the center: straight down is 0 degrees.
/// Snapped, then normalized into `[0, 360)`.
pub fn compute_rotation(center: Point, pointer: Point, snap: &SnapConfig) -> f32 {
    let degrees = (pointer.y - center.y).atan2(pointer.x - center.x).to_degrees() - 90.0;
    let snapped = crate::snapping::snap_rotation(degrees, snap.rotation_increment);
    let normalized = snapped.rem_euclid(360.0);
    // rem_euclid can land on 360.0 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}
