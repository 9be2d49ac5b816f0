pub mod cancel;
pub mod output;
pub mod render;
pub mod source;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use cancel::CancellationToken;
pub use output::{
    encode_png, encode_win_ansi, FontHandle, Frame, ImageFormat, ImageHandle, OutputDocument,
    PageHandle, Rgb, ShapePaint, StandardFont, Stroke, TextRun, WriteError,
};
pub use render::{PageRenderer, PlaceholderRenderer, RenderError, RgbaImage};
pub use source::{PageInfo, SourceDocument, SourceRegistry};

use folio_model::SourceId;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF parse error: {0}")]
    Parse(#[from] lopdf::Error),
    #[error("unknown source {0}")]
    UnknownSource(SourceId),
    #[error("page {page} out of range (page_count={page_count})")]
    PageOutOfRange { page: u32, page_count: u32 },
    #[error("encrypted PDFs are not supported")]
    EncryptedUnsupported,
    #[error("document has no pages")]
    NoPages,
}
