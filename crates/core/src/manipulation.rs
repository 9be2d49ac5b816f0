//! Element manipulation handles and the pointer-gesture state machine
//!
//! Provides handles for selecting, moving, resizing, and rotating elements,
//! plus the [`InteractionController`] that turns pointer events on those
//! handles into [`GeometryUpdate`]s for the workspace reducer.

use crate::config::EditorConfig;
use crate::geometry::{
    compute_axis_aligned_resize, compute_drag, compute_line_endpoint_drag, compute_rotated_resize,
    compute_rotation, resize_anchor, BoxKind, ContainerRect, Corner, InteractionError, PageAspect,
    ResizeParams,
};
use crate::snapping::SnapConfig;
use folio_model::{Element, ElementId, Extent, GeometryUpdate, Point, Rect, ShapeKind};
use std::cell::RefCell;
use std::rc::Rc;

/// Distance between the bottom edge of a box and its rotate handle, in percent.
pub const ROTATE_HANDLE_GAP: f32 = 5.0;

/// Type of manipulation handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleType {
    /// Corner handles for resizing (aspect lock with shift)
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,

    /// Line endpoint dots
    LineStart,
    LineEnd,

    /// Rotation handle (below the element)
    Rotate,

    /// The element body
    Move,

    /// Drawing a freshly placed symbol from its press point
    Create,
}

impl HandleType {
    pub fn corner(self) -> Option<Corner> {
        match self {
            HandleType::TopLeft => Some(Corner::TopLeft),
            HandleType::TopRight => Some(Corner::TopRight),
            HandleType::BottomLeft => Some(Corner::BottomLeft),
            HandleType::BottomRight => Some(Corner::BottomRight),
            _ => None,
        }
    }

    fn name(self) -> &'static str {
        match self {
            HandleType::TopLeft => "top-left",
            HandleType::TopRight => "top-right",
            HandleType::BottomLeft => "bottom-left",
            HandleType::BottomRight => "bottom-right",
            HandleType::LineStart => "line-start",
            HandleType::LineEnd => "line-end",
            HandleType::Rotate => "rotate",
            HandleType::Move => "move",
            HandleType::Create => "create",
        }
    }
}

/// Manipulation handle with position and type
#[derive(Debug, Clone, PartialEq)]
pub struct ManipulationHandle {
    pub handle_type: HandleType,

    /// Position in page percentage space
    pub position: Point,

    /// Radius of the hit area
    pub size: f32,

    pub element_id: ElementId,
}

impl ManipulationHandle {
    pub fn new(handle_type: HandleType, position: Point, size: f32, element_id: ElementId) -> Self {
        Self { handle_type, position, size, element_id }
    }

    /// Check if a point hits this handle
    pub fn hit_test(&self, point: &Point, tolerance: f32) -> bool {
        point.distance_to(&self.position) <= self.size + tolerance
    }
}

/// Generate manipulation handles for an element
///
/// Lines get their two endpoint dots; other symbols get four rotated corners
/// plus a rotate handle; images get four corners. Text is moved by its body
/// only and has no handles.
pub fn generate_handles(element: &Element, handle_size: f32) -> Vec<ManipulationHandle> {
    let id = element.id();
    let handle = |handle_type: HandleType, position: Point| {
        ManipulationHandle::new(handle_type, position, handle_size, id.clone())
    };

    match element {
        Element::Text(_) => Vec::new(),
        Element::Symbol(symbol) if symbol.is_line() => {
            let endpoints = symbol.endpoints();
            vec![
                handle(HandleType::LineStart, endpoints.start),
                handle(HandleType::LineEnd, endpoints.end),
            ]
        }
        Element::Symbol(symbol) => {
            let rect = symbol.bounds();
            let mut handles = corner_handles(rect, symbol.rotation, &handle);
            let center = rect.center();
            let below = Point::new(center.x, rect.bottom() + ROTATE_HANDLE_GAP)
                .rotated_about(center, symbol.rotation);
            handles.push(handle(HandleType::Rotate, below));
            handles
        }
        Element::Image(image) => corner_handles(image.bounds(), 0.0, &handle),
    }
}

fn corner_handles(
    rect: Rect,
    rotation: f32,
    handle: &impl Fn(HandleType, Point) -> ManipulationHandle,
) -> Vec<ManipulationHandle> {
    [HandleType::TopLeft, HandleType::TopRight, HandleType::BottomLeft, HandleType::BottomRight]
        .into_iter()
        .filter_map(|handle_type| {
            let corner = handle_type.corner()?;
            Some(handle(handle_type, corner.position(rect, rotation)))
        })
        .collect()
}

/// Topmost handle under `point`, if any.
pub fn hit_handle<'a>(
    handles: &'a [ManipulationHandle],
    point: &Point,
    tolerance: f32,
) -> Option<&'a ManipulationHandle> {
    handles.iter().rev().find(|handle| handle.hit_test(point, tolerance))
}

/// Grants exclusive gesture ownership to one element per editing surface.
///
/// Clones share the same slot, so every controller on a surface can be handed
/// its own copy.
#[derive(Debug, Clone, Default)]
pub struct GestureArbiter {
    active: Rc<RefCell<Option<ElementId>>>,
}

impl GestureArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the surface for `element_id`. The claim lasts as long as the guard.
    pub fn try_capture(&self, element_id: &ElementId) -> Result<CaptureGuard, InteractionError> {
        let mut active = self.active.borrow_mut();
        match active.as_ref() {
            Some(current) if current != element_id => Err(InteractionError::SurfaceBusy),
            _ => {
                *active = Some(element_id.clone());
                Ok(CaptureGuard { active: Rc::clone(&self.active), element_id: element_id.clone() })
            }
        }
    }

    pub fn active(&self) -> Option<ElementId> {
        self.active.borrow().clone()
    }
}

/// Releases the surface when dropped.
#[derive(Debug)]
pub struct CaptureGuard {
    active: Rc<RefCell<Option<ElementId>>>,
    element_id: ElementId,
}

impl CaptureGuard {
    pub fn element_id(&self) -> &ElementId {
        &self.element_id
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        let mut active = self.active.borrow_mut();
        if active.as_ref() == Some(&self.element_id) {
            *active = None;
        }
    }
}

/// Externally visible state of an [`InteractionController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    Dragging,
    Resizing(HandleType),
    Rotating,
}

/// Everything captured at pointer-down; moves never re-read committed state.
#[derive(Debug)]
struct Gesture {
    state: InteractionState,
    container: ContainerRect,
    start_pointer: Point,
    kind: GestureKind,
    guard: CaptureGuard,
}

#[derive(Debug, Clone, Copy)]
enum GestureKind {
    Drag { origin: Point, extent: Extent },
    BoxResize { anchor: Point, rotation: f32, params: ResizeParams },
    LineEndpoint { fixed: Point },
    Rotate { center_px: Point },
}

/// Pointer-gesture state machine for one editing surface.
///
/// `pointer_down` captures the gesture; each `pointer_move` returns the
/// geometry to send as a `WorkspaceAction::UpdateElement`; `pointer_up` or
/// `cancel` release it.
#[derive(Debug)]
pub struct InteractionController {
    arbiter: GestureArbiter,
    snap: SnapConfig,
    min_element_size: f32,
    min_image_size: f32,
    gesture: Option<Gesture>,
}

impl InteractionController {
    pub fn new(arbiter: GestureArbiter, config: &EditorConfig) -> Self {
        Self {
            arbiter,
            snap: config.snap_config(),
            min_element_size: config.min_element_size,
            min_image_size: config.min_image_size,
            gesture: None,
        }
    }

    pub fn state(&self) -> InteractionState {
        self.gesture.as_ref().map_or(InteractionState::Idle, |gesture| gesture.state)
    }

    /// Element that owns the current gesture.
    pub fn active_element(&self) -> Option<&ElementId> {
        self.gesture.as_ref().map(|gesture| gesture.guard.element_id())
    }

    /// Start a gesture on `element` through `handle`.
    ///
    /// `pointer` is in client pixels; `container` is the page rect at this
    /// moment and is reused for the whole gesture.
    pub fn pointer_down(
        &mut self,
        element: &Element,
        handle: HandleType,
        pointer: Point,
        container: ContainerRect,
    ) -> Result<(), InteractionError> {
        let container = container.measure()?;
        let (state, kind) = self.plan(element, handle, container)?;
        // A stale gesture must release before the new claim.
        self.gesture = None;
        let guard = self.arbiter.try_capture(element.id())?;

        log::debug!("{} gesture started on {}", handle.name(), element.id());
        self.gesture = Some(Gesture { state, container, start_pointer: pointer, kind, guard });
        Ok(())
    }

    fn plan(
        &self,
        element: &Element,
        handle: HandleType,
        container: ContainerRect,
    ) -> Result<(InteractionState, GestureKind), InteractionError> {
        let unsupported = || InteractionError::UnsupportedHandle(handle.name());
        let page = container.page_aspect();

        if handle == HandleType::Move {
            let kind = GestureKind::Drag { origin: element.position(), extent: element.extent() };
            return Ok((InteractionState::Dragging, kind));
        }

        let kind = match (element, handle) {
            (Element::Symbol(symbol), HandleType::Rotate) if !symbol.is_line() => {
                let center_px = container.to_client(symbol.bounds().center());
                return Ok((InteractionState::Rotating, GestureKind::Rotate { center_px }));
            }
            (Element::Symbol(symbol), HandleType::Create) if symbol.is_line() => {
                GestureKind::LineEndpoint { fixed: symbol.bounds().origin() }
            }
            (Element::Symbol(symbol), HandleType::Create) => GestureKind::BoxResize {
                anchor: symbol.bounds().origin(),
                rotation: 0.0,
                params: self.shape_params(symbol.shape, page),
            },
            (Element::Symbol(symbol), HandleType::LineStart) if symbol.is_line() => {
                GestureKind::LineEndpoint { fixed: symbol.endpoints().end }
            }
            (Element::Symbol(symbol), HandleType::LineEnd) if symbol.is_line() => {
                GestureKind::LineEndpoint { fixed: symbol.endpoints().start }
            }
            (Element::Symbol(symbol), _) if !symbol.is_line() => {
                let corner = handle.corner().ok_or_else(unsupported)?;
                GestureKind::BoxResize {
                    anchor: resize_anchor(symbol.bounds(), symbol.rotation, corner),
                    rotation: symbol.rotation,
                    params: self.shape_params(symbol.shape, page),
                }
            }
            (Element::Image(image), _) => {
                let corner = handle.corner().ok_or_else(unsupported)?;
                let rect = image.bounds();
                GestureKind::BoxResize {
                    anchor: resize_anchor(rect, 0.0, corner),
                    rotation: 0.0,
                    params: ResizeParams {
                        shift: false,
                        kind: BoxKind::Image { aspect_ratio: page.visual_ratio(rect.extent()) },
                        page,
                        min_size: self.min_image_size,
                    },
                }
            }
            _ => return Err(unsupported()),
        };

        Ok((InteractionState::Resizing(handle), kind))
    }

    fn shape_params(&self, shape: ShapeKind, page: PageAspect) -> ResizeParams {
        ResizeParams { shift: false, kind: BoxKind::Shape(shape), page, min_size: self.min_element_size }
    }

    /// Feed a pointer position (client pixels). Returns `None` when idle or
    /// when the step produced no usable geometry.
    pub fn pointer_move(&mut self, pointer: Point, shift: bool) -> Option<GeometryUpdate> {
        let gesture = self.gesture.as_ref()?;
        let container = gesture.container;

        let update = match gesture.kind {
            GestureKind::Drag { origin, extent } => {
                let delta = container.delta_to_percent(gesture.start_pointer, pointer);
                GeometryUpdate::position(compute_drag(origin, delta, extent))
            }
            GestureKind::BoxResize { anchor, rotation, params } => {
                let params = ResizeParams { shift, ..params };
                let target = container.to_percent(pointer);
                let rect = if rotation.abs() > f32::EPSILON {
                    compute_rotated_resize(rotation, anchor, target, &params)
                } else {
                    compute_axis_aligned_resize(anchor, target, &params)
                };
                GeometryUpdate::bounds(rect)
            }
            GestureKind::LineEndpoint { fixed } => {
                let moving = container.to_percent(pointer);
                compute_line_endpoint_drag(fixed, moving, shift, &self.snap).into()
            }
            GestureKind::Rotate { center_px } => {
                GeometryUpdate::rotation(compute_rotation(center_px, pointer, &self.snap))
            }
        };

        update.is_finite().then_some(update)
    }

    /// End the gesture. Returns the element that was being manipulated.
    pub fn pointer_up(&mut self) -> Option<ElementId> {
        let gesture = self.gesture.take()?;
        Some(gesture.guard.element_id().clone())
    }

    /// Abandon the gesture without a final update.
    pub fn cancel(&mut self) {
        if let Some(gesture) = self.gesture.take() {
            log::debug!("gesture on {} cancelled", gesture.guard.element_id());
        }
    }
}

/// Paint order for a page: list order, with the active element moved last.
pub fn render_order<'a>(elements: &'a [Element], active: Option<&ElementId>) -> Vec<&'a Element> {
    let (mut rest, lifted): (Vec<&Element>, Vec<&Element>) =
        elements.iter().partition(|element| Some(element.id()) != active);
    rest.extend(lifted);
    rest
}
