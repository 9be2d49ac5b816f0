//! Annotation elements placed on a page.
//!
//! Three kinds exist (text, symbol, image). They share the drag/resize
//! contract through [`GeometryUpdate`] and differ only in what the exporter
//! draws for them.

use crate::coords::{Extent, LineEndpoints, Point, Rect, PERCENT_MAX};
use serde::{Deserialize, Serialize};

/// Stable identifier of an element within a page.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    /// Generate a fresh id such as `symbol-5f0c…`.
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{prefix}-{}", uuid::Uuid::new_v4()))
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    Line,
    Circle,
    Square,
    Diamond,
    ArrowLeft,
    ArrowRight,
}

impl ShapeKind {
    /// Shapes that become visually regular when the lock modifier is held.
    pub fn is_aspect_lockable(self) -> bool {
        matches!(self, ShapeKind::Circle | ShapeKind::Square)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextDecoration {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "underline")]
    Underline,
    #[serde(rename = "line-through")]
    LineThrough,
    #[serde(rename = "underline line-through")]
    UnderlineLineThrough,
}

impl TextDecoration {
    pub fn has_underline(self) -> bool {
        matches!(self, TextDecoration::Underline | TextDecoration::UnderlineLineThrough)
    }

    pub fn has_line_through(self) -> bool {
        matches!(self, TextDecoration::LineThrough | TextDecoration::UnderlineLineThrough)
    }

    fn from_flags(underline: bool, line_through: bool) -> Self {
        match (underline, line_through) {
            (false, false) => TextDecoration::None,
            (true, false) => TextDecoration::Underline,
            (false, true) => TextDecoration::LineThrough,
            (true, true) => TextDecoration::UnderlineLineThrough,
        }
    }

    pub fn toggled_underline(self) -> Self {
        Self::from_flags(!self.has_underline(), self.has_line_through())
    }

    pub fn toggled_line_through(self) -> Self {
        Self::from_flags(self.has_underline(), !self.has_line_through())
    }
}

pub const DEFAULT_FONT_FAMILY: &str = "Helvetica, Arial, sans-serif";
pub const DEFAULT_COLOR: &str = "#000000";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub id: ElementId,
    pub text: String,
    pub x: f32,
    pub y: f32,
    /// Display pixels at the reference scale.
    pub font_size: f32,
    pub color: String,
    pub font_family: String,
    #[serde(default)]
    pub font_weight: FontWeight,
    #[serde(default)]
    pub font_style: FontStyle,
    #[serde(default)]
    pub text_decoration: TextDecoration,
}

impl TextElement {
    pub fn new(id: ElementId, at: Point, font_size: f32) -> Self {
        Self {
            id,
            text: String::new(),
            x: at.x,
            y: at.y,
            font_size,
            color: DEFAULT_COLOR.to_owned(),
            font_family: DEFAULT_FONT_FAMILY.to_owned(),
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            text_decoration: TextDecoration::None,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn toggle_bold(&mut self) {
        self.font_weight = match self.font_weight {
            FontWeight::Bold => FontWeight::Normal,
            FontWeight::Normal => FontWeight::Bold,
        };
    }

    pub fn toggle_italic(&mut self) {
        self.font_style = match self.font_style {
            FontStyle::Italic => FontStyle::Normal,
            FontStyle::Normal => FontStyle::Italic,
        };
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolElement {
    pub id: ElementId,
    pub shape: ShapeKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: String,
    pub stroke_width: f32,
    #[serde(default)]
    pub fill: bool,
    /// Degrees, clockwise on screen, about the box center.
    #[serde(default)]
    pub rotation: f32,
    /// Lines only: which diagonal of the box the line follows.
    #[serde(default)]
    pub is_flipped_v: bool,
}

impl SymbolElement {
    pub fn new(id: ElementId, shape: ShapeKind, bounds: Rect, stroke_width: f32) -> Self {
        Self {
            id,
            shape,
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            color: DEFAULT_COLOR.to_owned(),
            stroke_width,
            fill: false,
            rotation: 0.0,
            is_flipped_v: false,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn is_line(&self) -> bool {
        self.shape == ShapeKind::Line
    }

    /// Endpoints of a line symbol (meaningful for [`ShapeKind::Line`] only).
    pub fn endpoints(&self) -> LineEndpoints {
        LineEndpoints::decode(self.bounds(), self.is_flipped_v)
    }

    fn set_bounds(&mut self, rect: Rect) {
        self.x = rect.x;
        self.y = rect.y;
        self.width = rect.width;
        self.height = rect.height;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageElement {
    pub id: ElementId,
    /// `data:image/png;base64,...` or `data:image/jpeg;base64,...`
    pub image_data: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ImageElement {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Partial geometry replacement produced by one interaction step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeometryUpdate {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
    pub rotation: Option<f32>,
    pub is_flipped_v: Option<bool>,
}

impl GeometryUpdate {
    pub fn position(at: Point) -> Self {
        Self { x: Some(at.x), y: Some(at.y), ..Self::default() }
    }

    pub fn bounds(rect: Rect) -> Self {
        Self {
            x: Some(rect.x),
            y: Some(rect.y),
            width: Some(rect.width),
            height: Some(rect.height),
            ..Self::default()
        }
    }

    pub fn line(rect: Rect, is_flipped_v: bool) -> Self {
        Self { is_flipped_v: Some(is_flipped_v), ..Self::bounds(rect) }
    }

    pub fn rotation(degrees: f32) -> Self {
        Self { rotation: Some(degrees), ..Self::default() }
    }

    /// Every present value is a finite number.
    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.width, self.height, self.rotation]
            .iter()
            .flatten()
            .all(|value| value.is_finite())
    }
}

/// Non-geometric edits (toolbar actions).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StylePatch {
    pub text: Option<String>,
    pub color: Option<String>,
    pub stroke_width: Option<f32>,
    pub fill: Option<bool>,
    pub font_size: Option<f32>,
    pub font_family: Option<String>,
    pub font_weight: Option<FontWeight>,
    pub font_style: Option<FontStyle>,
    pub text_decoration: Option<TextDecoration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Text,
    Symbol(ShapeKind),
    Image,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Text(TextElement),
    Symbol(SymbolElement),
    Image(ImageElement),
}

impl Element {
    pub fn id(&self) -> &ElementId {
        match self {
            Element::Text(text) => &text.id,
            Element::Symbol(symbol) => &symbol.id,
            Element::Image(image) => &image.id,
        }
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Element::Text(_) => ElementKind::Text,
            Element::Symbol(symbol) => ElementKind::Symbol(symbol.shape),
            Element::Image(_) => ElementKind::Image,
        }
    }

    pub fn position(&self) -> Point {
        match self {
            Element::Text(text) => Point::new(text.x, text.y),
            Element::Symbol(symbol) => Point::new(symbol.x, symbol.y),
            Element::Image(image) => Point::new(image.x, image.y),
        }
    }

    /// Size used for drag clamping; text has none.
    pub fn extent(&self) -> Extent {
        self.bounds().map(|rect| rect.extent()).unwrap_or(Extent::ZERO)
    }

    /// Bounding box for boxed elements.
    pub fn bounds(&self) -> Option<Rect> {
        match self {
            Element::Text(_) => None,
            Element::Symbol(symbol) => Some(symbol.bounds()),
            Element::Image(image) => Some(image.bounds()),
        }
    }

    pub fn rotation(&self) -> f32 {
        match self {
            Element::Symbol(symbol) => symbol.rotation,
            _ => 0.0,
        }
    }

    /// Apply a partial geometry replacement, then restore the page-bounds
    /// invariant. Non-finite updates are ignored.
    pub fn apply_geometry(&mut self, update: &GeometryUpdate) {
        if !update.is_finite() {
            return;
        }

        match self {
            Element::Text(text) => {
                let at = Point::new(update.x.unwrap_or(text.x), update.y.unwrap_or(text.y))
                    .clamped_to_page();
                text.x = at.x;
                text.y = at.y;
            }
            Element::Symbol(symbol) => {
                let rect = merge(symbol.bounds(), update);
                if let Some(rotation) = update.rotation {
                    symbol.rotation = rotation;
                }
                if symbol.is_line() {
                    let flipped = update.is_flipped_v.unwrap_or(symbol.is_flipped_v);
                    // Re-encode through the endpoints so degenerate lines stay unflipped.
                    let start = Point::new(rect.x, if flipped { rect.bottom() } else { rect.y })
                        .clamped_to_page();
                    let end = Point::new(rect.right(), if flipped { rect.y } else { rect.bottom() })
                        .clamped_to_page();
                    let (rect, flipped) = LineEndpoints::new(start, end).encode();
                    symbol.set_bounds(rect);
                    symbol.is_flipped_v = flipped;
                } else {
                    symbol.set_bounds(rect.clamped_to_page());
                }
            }
            Element::Image(image) => {
                let rect = merge(image.bounds(), update).clamped_to_page();
                image.x = rect.x;
                image.y = rect.y;
                image.width = rect.width;
                image.height = rect.height;
            }
        }
    }

    /// Apply toolbar edits that make sense for this kind; others are ignored.
    pub fn apply_style(&mut self, patch: &StylePatch) {
        match self {
            Element::Text(text) => {
                if let Some(value) = &patch.text {
                    text.text.clone_from(value);
                }
                if let Some(value) = &patch.color {
                    text.color.clone_from(value);
                }
                if let Some(value) = patch.font_size.filter(|size| *size > 0.0) {
                    text.font_size = value;
                }
                if let Some(value) = &patch.font_family {
                    text.font_family.clone_from(value);
                }
                if let Some(value) = patch.font_weight {
                    text.font_weight = value;
                }
                if let Some(value) = patch.font_style {
                    text.font_style = value;
                }
                if let Some(value) = patch.text_decoration {
                    text.text_decoration = value;
                }
            }
            Element::Symbol(symbol) => {
                if let Some(value) = &patch.color {
                    symbol.color.clone_from(value);
                }
                if let Some(value) = patch.stroke_width.filter(|width| *width >= 0.0) {
                    symbol.stroke_width = value;
                }
                if let Some(value) = patch.fill {
                    symbol.fill = value;
                }
            }
            Element::Image(_) => {}
        }
    }
}

fn merge(current: Rect, update: &GeometryUpdate) -> Rect {
    Rect::new(
        update.x.unwrap_or(current.x),
        update.y.unwrap_or(current.y),
        update.width.unwrap_or(current.width).clamp(0.0, PERCENT_MAX),
        update.height.unwrap_or(current.height).clamp(0.0, PERCENT_MAX),
    )
}
