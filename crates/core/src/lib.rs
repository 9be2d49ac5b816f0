//! Folio editor core.
//!
//! Interaction geometry, element placement, render coordination and the
//! export compositor that writes edited documents back to PDF.

pub mod config;
pub mod data_url;
pub mod editor;
pub mod export;
pub mod fonts;
pub mod geometry;
pub mod intake;
pub mod manipulation;
pub mod placement;
pub mod render_session;
pub mod snapping;

pub use config::{ConfigError, EditorConfig};
pub use data_url::{decode_image_data_url, encode_image_data_url, DataUrlError, ImagePayload};
pub use editor::{Editor, EditorError};
pub use export::{
    compose, export_document, export_to_file, output_file_name, ComposedDocument, ExportError,
    ExportOutcome, ExportReport, EXPORT_FAILED,
};
pub use fonts::resolve_font;
pub use geometry::{ContainerRect, InteractionError, PageAspect};
pub use intake::{validate_incoming, IncomingFile, IntakeError, PDF_MIME};
pub use manipulation::{
    generate_handles, hit_handle, render_order, GestureArbiter, HandleType, InteractionController,
    InteractionState, ManipulationHandle,
};
pub use placement::{begin_symbol, place_image, place_text, PlacementError};
pub use render_session::{RenderOutcome, RenderRequest, RenderSession, PAGE_LOAD_FAILED};
pub use snapping::SnapConfig;
