//! Creating new elements on a page.
//!
//! Text and images are created in one step. Symbols are created tiny at the
//! press point and then drawn out by the same controller that resizes them.

use crate::config::EditorConfig;
use crate::data_url::{decode_image_data_url, DataUrlError};
use crate::geometry::{ContainerRect, InteractionError};
use crate::manipulation::{HandleType, InteractionController};
use folio_model::{
    Element, ElementId, ImageElement, Point, Rect, ShapeKind, SymbolElement, TextElement,
};
use std::io::Cursor;

#[derive(Debug, thiserror::Error)]
pub enum PlacementError {
    #[error(transparent)]
    DataUrl(#[from] DataUrlError),
    #[error("could not read image size: {0}")]
    Image(#[from] image::ImageError),
    #[error("image has no pixels")]
    EmptyImage,
    #[error(transparent)]
    Interaction(#[from] InteractionError),
}

/// New empty text element at `at` (percent). [`crate::Editor::place_text`]
/// adds it and opens its editor.
pub fn place_text(at: Point, config: &EditorConfig) -> Element {
    let id = ElementId::generate("text");
    Element::Text(TextElement::new(id, at.clamped_to_page(), config.default_font_size))
}

/// Create a minimal symbol under the pointer and start drawing it.
///
/// The returned element must be added to the page; the controller is left in
/// `Resizing(Create)` and subsequent moves grow the element from the press
/// point.
pub fn begin_symbol(
    controller: &mut InteractionController,
    shape: ShapeKind,
    stroke_width: f32,
    pointer: Point,
    container: ContainerRect,
    config: &EditorConfig,
) -> Result<Element, PlacementError> {
    let at = container.measure()?.to_percent(pointer).clamped_to_page();
    let size = config.min_element_size;
    let bounds = Rect::new(at.x, at.y, size, size).clamped_to_page();

    let element = Element::Symbol(SymbolElement::new(
        ElementId::generate("symbol"),
        shape,
        bounds,
        stroke_width,
    ));
    controller.pointer_down(&element, HandleType::Create, pointer, container)?;
    Ok(element)
}

/// Default placement box for an image of `pixel_width` x `pixel_height` on a
/// page of the given size: 30% of the page width, height capped at 50% of the
/// page, centered. The image keeps its physical aspect ratio.
pub fn default_image_bounds(
    pixel_width: u32,
    pixel_height: u32,
    page_width: f32,
    page_height: f32,
    config: &EditorConfig,
) -> Rect {
    let aspect = pixel_width as f32 / pixel_height as f32;

    let mut width = config.image_default_width;
    let mut height = (width * page_width / 100.0 / aspect) / (page_height / 100.0);
    if height > config.image_max_height {
        height = config.image_max_height;
        width = (height * page_height / 100.0 * aspect) / (page_width / 100.0);
    }

    Rect::new(50.0 - width / 2.0, 50.0 - height / 2.0, width, height)
        .with_min_size(config.min_image_size)
}

/// Pixel dimensions of an encoded image.
pub fn decode_image_size(bytes: &[u8]) -> Result<(u32, u32), PlacementError> {
    let (width, height) = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(image::ImageError::IoError)?
        .into_dimensions()?;

    if width == 0 || height == 0 {
        return Err(PlacementError::EmptyImage);
    }
    Ok((width, height))
}

/// Image element for a `data:` URL, sized by [`default_image_bounds`].
pub fn place_image(
    image_data: String,
    page_width: f32,
    page_height: f32,
    config: &EditorConfig,
) -> Result<Element, PlacementError> {
    let payload = decode_image_data_url(&image_data)?;
    let (pixel_width, pixel_height) = decode_image_size(&payload.bytes)?;
    let bounds = default_image_bounds(pixel_width, pixel_height, page_width, page_height, config);

    log::debug!("placing {pixel_width}x{pixel_height} image at {bounds:?}");
    Ok(Element::Image(ImageElement {
        id: ElementId::generate("image"),
        image_data,
        x: bounds.x,
        y: bounds.y,
        width: bounds.width,
        height: bounds.height,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_url::encode_image_data_url;
    use crate::manipulation::{GestureArbiter, InteractionState};
    use folio_engine::{encode_png, RgbaImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        encode_png(&RgbaImage::new(width, height)).expect("png")
    }

    #[test]
    fn test_text_defaults() {
        let element = place_text(Point::new(120.0, 40.0), &EditorConfig::default());
        let Element::Text(text) = element else { panic!("expected text") };

        assert_eq!((text.x, text.y), (100.0, 40.0));
        assert_eq!(text.font_size, 16.0);
        assert!(text.is_blank());
        assert!(text.id.0.starts_with("text"));
    }

    #[test]
    fn test_wide_image_uses_default_width() {
        // 400x200 on a square page: 30% wide, 15% tall
        let rect = default_image_bounds(400, 200, 600.0, 600.0, &EditorConfig::default());
        assert!((rect.width - 30.0).abs() < 1e-4);
        assert!((rect.height - 15.0).abs() < 1e-4);
        assert!((rect.x - 35.0).abs() < 1e-4);

        let physical = (rect.width * 600.0) / (rect.height * 600.0);
        assert!((physical - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_tall_image_is_capped_at_half_page() {
        let rect = default_image_bounds(100, 1000, 612.0, 792.0, &EditorConfig::default());
        assert!((rect.height - 50.0).abs() < 1e-4);
        assert!(rect.width < 30.0);

        let physical = (rect.width * 612.0) / (rect.height * 792.0);
        assert!((physical - 0.1).abs() < 1e-4);
        assert!((rect.y - 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_place_image_from_data_url() {
        let url = encode_image_data_url(&png(400, 200)).expect("url");
        let element = place_image(url, 612.0, 792.0, &EditorConfig::default()).expect("image");

        let Element::Image(image) = element else { panic!("expected image") };
        let physical = (image.width * 612.0) / (image.height * 792.0);
        assert!((physical - 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_decode_image_size() {
        assert_eq!(decode_image_size(&png(7, 3)).expect("size"), (7, 3));
        assert!(decode_image_size(b"not an image").is_err());
    }

    #[test]
    fn test_begin_symbol_enters_create() {
        let config = EditorConfig::default();
        let mut controller = InteractionController::new(GestureArbiter::new(), &config);
        let container = ContainerRect::new(0.0, 0.0, 500.0, 1000.0);

        let element = begin_symbol(
            &mut controller,
            ShapeKind::Square,
            2.0,
            Point::new(100.0, 100.0),
            container,
            &config,
        )
        .expect("symbol");

        assert_eq!(controller.state(), InteractionState::Resizing(HandleType::Create));
        let bounds = element.bounds().expect("bounds");
        assert!((bounds.x - 20.0).abs() < 1e-4 && (bounds.y - 10.0).abs() < 1e-4);
        assert_eq!(bounds.width, 0.1);

        let update = controller.pointer_move(Point::new(200.0, 300.0), false).expect("update");
        assert!(update.width.is_some_and(|w| (w - 20.0).abs() < 1e-3));
        assert!(update.height.is_some_and(|h| (h - 20.0).abs() < 1e-3));
    }

    #[test]
    fn test_begin_symbol_needs_measurable_container() {
        let config = EditorConfig::default();
        let mut controller = InteractionController::new(GestureArbiter::new(), &config);

        let err = begin_symbol(
            &mut controller,
            ShapeKind::Line,
            2.0,
            Point::new(1.0, 1.0),
            ContainerRect::new(0.0, 0.0, 0.0, 0.0),
            &config,
        )
        .unwrap_err();
        assert!(matches!(err, PlacementError::Interaction(InteractionError::MeasurementUnavailable)));
    }
}
