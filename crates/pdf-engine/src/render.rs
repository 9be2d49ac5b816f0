//! Page rasterization seam.
//!
//! Real rasterization lives outside this workspace; [`PlaceholderRenderer`]
//! produces a blank bordered page of the right pixel size so the rest of the
//! pipeline (render coordination, thumbnails) can be exercised.

use crate::cancel::CancellationToken;
use crate::source::SourceDocument;
use crate::EngineError;
use image::{ImageBuffer, Rgba};

pub type RgbaImage = ImageBuffer<Rgba<u8>, Vec<u8>>;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The token was cancelled; callers treat this as a quiet outcome.
    #[error("render cancelled")]
    Cancelled,
    #[error("render failed: {0}")]
    Failed(#[from] EngineError),
}

pub trait PageRenderer: Send + Sync {
    /// Rasterize `page_number` (1-based) at `scale` pixels per point, with the
    /// page's displayed `rotation` (degrees, quarter turns).
    fn render(
        &self,
        source: &SourceDocument,
        page_number: u32,
        scale: f32,
        rotation: u32,
        token: &CancellationToken,
    ) -> Result<RgbaImage, RenderError>;

    fn thumbnail(
        &self,
        source: &SourceDocument,
        page_number: u32,
        max_width: u32,
    ) -> Result<RgbaImage, RenderError>;
}

const BORDER: Rgba<u8> = Rgba([220, 220, 220, 255]);
const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);

#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderRenderer;

impl PageRenderer for PlaceholderRenderer {
    fn render(
        &self,
        source: &SourceDocument,
        page_number: u32,
        scale: f32,
        rotation: u32,
        token: &CancellationToken,
    ) -> Result<RgbaImage, RenderError> {
        if token.is_cancelled() {
            return Err(RenderError::Cancelled);
        }

        let page = source.page(page_number)?;
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        let (width_pt, height_pt) = if (page.rotation + rotation) % 180 == 90 {
            (page.height_pt, page.width_pt)
        } else {
            (page.width_pt, page.height_pt)
        };

        let width = (width_pt * scale).round().max(1.0) as u32;
        let height = (height_pt * scale).round().max(1.0) as u32;
        let mut image = RgbaImage::from_pixel(width, height, PAPER);

        if width >= 4 && height >= 4 {
            for x in 0..width {
                image.put_pixel(x, 0, BORDER);
                image.put_pixel(x, height - 1, BORDER);
            }
            for y in 0..height {
                if y % 64 == 0 && token.is_cancelled() {
                    return Err(RenderError::Cancelled);
                }
                image.put_pixel(0, y, BORDER);
                image.put_pixel(width - 1, y, BORDER);
            }
        }

        if token.is_cancelled() {
            return Err(RenderError::Cancelled);
        }
        Ok(image)
    }

    fn thumbnail(
        &self,
        source: &SourceDocument,
        page_number: u32,
        max_width: u32,
    ) -> Result<RgbaImage, RenderError> {
        let page = self.render(source, page_number, 0.25, 0, &CancellationToken::new())?;
        let width = max_width.max(1);
        let height =
            ((page.height() as f32 * width as f32 / page.width() as f32).round() as u32).max(1);

        Ok(image::imageops::thumbnail(&page, width, height))
    }
}
