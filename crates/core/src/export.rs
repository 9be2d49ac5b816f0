//! Export compositor.
//!
//! Walks the page list in order, imports each page from its source, applies
//! the user rotation and paints every element as native drawing operations.
//!
//! Editor space is percent of the page, origin top-left, y down. Output space
//! is points, origin bottom-left, y up:
//!
//! ```text
//! out_x = x / 100 * W
//! out_y = (1 - (y + h) / 100) * H      // bottom edge of a box
//! ```

use crate::config::EditorConfig;
use crate::data_url::decode_image_data_url;
use crate::fonts::resolve_font;
use folio_engine::{
    Frame, OutputDocument, PageHandle, Rgb, ShapePaint, SourceDocument, SourceRegistry, Stroke,
    TextRun, WriteError,
};
use folio_model::{
    Color, Element, ElementId, ImageElement, LineEndpoints, Page, PageId, Point, ShapeKind,
    SourceId, SymbolElement, TextElement, Workspace,
};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Shown when an export could not be produced.
pub const EXPORT_FAILED: &str = "Fehler beim Herunterladen der PDF-Datei";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("{page} refers to {source_id}, which is not loaded")]
    SourceResolutionFailed { page: PageId, source_id: SourceId },
    #[error("image {element} could not be embedded: {reason}")]
    AssetEmbedFailed { element: ElementId, reason: String },
    #[error("export failed: {0}")]
    ExportFailed(#[from] WriteError),
    #[error("could not write {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
}

/// What the compositor left out on the way.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub pages_written: usize,
    /// Recovered problems: unresolvable sources and unembeddable images.
    pub skipped: Vec<ExportError>,
}

#[derive(Debug)]
pub struct ComposedDocument {
    pub bytes: Vec<u8>,
    pub report: ExportReport,
}

/// Build the output document for `workspace`.
///
/// Pages whose source is gone and images that fail to embed are skipped and
/// reported; anything else aborts the export.
pub fn compose(
    workspace: &Workspace,
    sources: &SourceRegistry,
    config: &EditorConfig,
) -> Result<ComposedDocument, ExportError> {
    let mut out = OutputDocument::new();
    let mut report = ExportReport::default();
    let mut resolved: HashMap<SourceId, Option<Arc<SourceDocument>>> = HashMap::new();

    for page in workspace.pages() {
        let source = resolved
            .entry(page.source_id())
            .or_insert_with(|| sources.get(page.source_id()))
            .clone();
        let Some(source) = source else {
            log::warn!("skipping {}: {} is not loaded", page.id(), page.source_id());
            report.skipped.push(ExportError::SourceResolutionFailed {
                page: page.id(),
                source_id: page.source_id(),
            });
            continue;
        };

        let handle = out.import_page(page.source_id().0, source.document(), page.page_number())?;
        apply_rotation(&mut out, handle, page)?;

        let (width, height) = out.page_size(handle)?;
        let mut painter = PagePainter { out: &mut out, page: handle, width, height, config };
        for element in page.elements() {
            if let Err(err) = painter.paint(element) {
                match err {
                    ExportError::AssetEmbedFailed { .. } => {
                        log::warn!("{err}");
                        report.skipped.push(err);
                    }
                    other => return Err(other),
                }
            }
        }

        log::debug!(
            "exported page {} ({} p.{}) with {} elements",
            report.pages_written + 1,
            page.source_id(),
            page.page_number(),
            page.elements().len()
        );
        report.pages_written += 1;
    }

    let bytes = out.save_to_bytes()?;
    Ok(ComposedDocument { bytes, report })
}

/// Rotation is additive to whatever the source page already declares.
fn apply_rotation(
    out: &mut OutputDocument,
    handle: PageHandle,
    page: &Page,
) -> Result<(), WriteError> {
    let current = out.rotation(handle)?;
    let rotation = (current + page.rotation_delta()) % 360;
    if rotation != current {
        out.set_rotation(handle, rotation)?;
    }
    Ok(())
}

fn to_rgb(hex: &str) -> Rgb {
    let color = Color::from_hex(hex).unwrap_or_else(|err| {
        log::debug!("{err}, using black");
        Color::BLACK
    });
    let (r, g, b, _) = color.to_normalized();
    Rgb::new(r, g, b)
}

struct PagePainter<'a> {
    out: &'a mut OutputDocument,
    page: PageHandle,
    width: f32,
    height: f32,
    config: &'a EditorConfig,
}

impl PagePainter<'_> {
    fn paint(&mut self, element: &Element) -> Result<(), ExportError> {
        match element {
            Element::Text(text) => self.paint_text(text)?,
            Element::Symbol(symbol) => self.paint_symbol(symbol)?,
            Element::Image(image) => self.paint_image(image)?,
        }
        Ok(())
    }

    fn to_out(&self, point: Point) -> (f32, f32) {
        (point.x / 100.0 * self.width, (1.0 - point.y / 100.0) * self.height)
    }

    fn frame(&self, x: f32, y: f32, width: f32, height: f32, rotation: f32) -> Frame {
        let w = width / 100.0 * self.width;
        let h = height / 100.0 * self.height;
        Frame {
            x: x / 100.0 * self.width,
            y: (1.0 - y / 100.0) * self.height - h,
            width: w,
            height: h,
            rotation: -rotation,
        }
    }

    fn paint_text(&mut self, text: &TextElement) -> Result<(), WriteError> {
        if text.is_blank() {
            return Ok(());
        }

        let font = self.out.embed_font(resolve_font(
            &text.font_family,
            text.font_weight,
            text.font_style,
        ));
        let size = text.font_size / self.config.reference_scale;
        let (x, top) = self.to_out(Point::new(text.x, text.y));

        let run = TextRun {
            text: text.text.clone(),
            x,
            y: top - size * self.config.ascent_factor,
            size,
            line_height: size * self.config.line_height,
            font,
            color: to_rgb(&text.color),
        };
        self.out.draw_text(self.page, &run)
    }

    fn paint_symbol(&mut self, symbol: &SymbolElement) -> Result<(), WriteError> {
        let color = to_rgb(&symbol.color);
        let width = if symbol.stroke_width > 0.0 {
            symbol.stroke_width
        } else {
            self.config.default_stroke_width
        };
        let stroke = Stroke { color, width };
        let paint = ShapePaint { stroke: Some(stroke), fill: symbol.fill.then_some(color) };
        let frame =
            self.frame(symbol.x, symbol.y, symbol.width, symbol.height, symbol.rotation);

        match symbol.shape {
            ShapeKind::Square => self.out.draw_rectangle(self.page, &frame, &paint),
            ShapeKind::Circle => self.out.draw_ellipse(self.page, &frame, &paint),
            ShapeKind::Line => {
                let LineEndpoints { start, end } = symbol.endpoints();
                self.out.draw_line(self.page, self.to_out(start), self.to_out(end), &stroke)
            }
            ShapeKind::Diamond => {
                // 5% inset, outline only
                let vertices = [(0.5, 0.95), (0.95, 0.5), (0.5, 0.05), (0.05, 0.5)]
                    .map(|(fx, fy)| local_point(&frame, fx, fy));
                for (index, start) in vertices.iter().enumerate() {
                    let end = vertices[(index + 1) % vertices.len()];
                    self.out.draw_line(self.page, *start, end, &stroke)?;
                }
                Ok(())
            }
            ShapeKind::ArrowRight | ShapeKind::ArrowLeft => {
                let (tail, tip, wing) = if symbol.shape == ShapeKind::ArrowRight {
                    (0.0, 1.0, 0.7)
                } else {
                    (1.0, 0.0, 0.3)
                };
                let tip_point = local_point(&frame, tip, 0.5);
                self.out.draw_line(self.page, local_point(&frame, tail, 0.5), tip_point, &stroke)?;
                self.out.draw_line(self.page, tip_point, local_point(&frame, wing, 0.8), &stroke)?;
                self.out.draw_line(self.page, tip_point, local_point(&frame, wing, 0.2), &stroke)
            }
        }
    }

    fn paint_image(&mut self, image: &ImageElement) -> Result<(), ExportError> {
        let embed_failed = |reason: String| ExportError::AssetEmbedFailed {
            element: image.id.clone(),
            reason,
        };

        let payload =
            decode_image_data_url(&image.image_data).map_err(|err| embed_failed(err.to_string()))?;
        let handle = self
            .out
            .embed_image(&payload.bytes, payload.format)
            .map_err(|err| embed_failed(err.to_string()))?;

        let frame = self.frame(image.x, image.y, image.width, image.height, 0.0);
        self.out.draw_image(self.page, handle, &frame)?;
        Ok(())
    }
}

/// Point at fractions `(fx, fy)` of `frame` (y up), turned with the frame.
fn local_point(frame: &Frame, fx: f32, fy: f32) -> (f32, f32) {
    let (cx, cy) = frame.center();
    let dx = frame.x + frame.width * fx - cx;
    let dy = frame.y + frame.height * fy - cy;
    let (sin, cos) = frame.rotation.to_radians().sin_cos();
    (cx + dx * cos - dy * sin, cy + dx * sin + dy * cos)
}

/// `<base><suffix>.<ext>` for the file the user opened; `.pdf` when the
/// original had no extension.
pub fn output_file_name(original: Option<&str>, suffix: &str) -> String {
    let name = original
        .and_then(|name| Path::new(name).file_name())
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or("dokument.pdf");

    match name.rsplit_once('.') {
        Some((base, ext)) if !base.is_empty() && !ext.is_empty() => format!("{base}{suffix}.{ext}"),
        _ => format!("{name}{suffix}.pdf"),
    }
}

/// Export result in the form the UI shows it.
#[derive(Debug)]
pub struct ExportOutcome {
    pub success: bool,
    pub message: String,
    pub file_name: String,
    pub bytes: Option<Vec<u8>>,
    pub report: ExportReport,
}

/// Compose and collapse every error into a failed outcome.
pub fn export_document(
    workspace: &Workspace,
    sources: &SourceRegistry,
    config: &EditorConfig,
) -> ExportOutcome {
    let file_name = output_file_name(workspace.file_name.as_deref(), &config.output_suffix);

    match compose(workspace, sources, config) {
        Ok(ComposedDocument { bytes, report }) => ExportOutcome {
            success: true,
            message: format!("{} Seiten exportiert", report.pages_written),
            file_name,
            bytes: Some(bytes),
            report,
        },
        Err(err) => {
            log::error!("export aborted: {err}");
            ExportOutcome {
                success: false,
                message: EXPORT_FAILED.to_owned(),
                file_name,
                bytes: None,
                report: ExportReport::default(),
            }
        }
    }
}

/// Export into `dir` under [`output_file_name`]. On success the outcome's
/// bytes have been written and are dropped from it.
pub fn export_to_file(
    workspace: &Workspace,
    sources: &SourceRegistry,
    config: &EditorConfig,
    dir: &Path,
) -> ExportOutcome {
    let mut outcome = export_document(workspace, sources, config);
    let Some(bytes) = outcome.bytes.take() else {
        return outcome;
    };

    let path = dir.join(&outcome.file_name);
    if let Err(source) = fs::write(&path, bytes) {
        let err = ExportError::Io { path, source };
        log::error!("export aborted: {err}");
        outcome.success = false;
        outcome.message = EXPORT_FAILED.to_owned();
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_url::encode_image_data_url;
    use folio_engine::testing::{build_pdf, TestPage};
    use folio_engine::{encode_png, RgbaImage};
    use folio_model::{
        FontStyle, FontWeight, Rect, SourcePage, StylePatch, SymbolElement, TextElement,
        WorkspaceAction,
    };
    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object};

    fn letter() -> TestPage {
        TestPage::new(612.0, 792.0)
    }

    fn open(sources: &mut SourceRegistry, workspace: &mut Workspace, pages: &[TestPage]) -> SourceId {
        let id = sources.load(build_pdf(pages)).expect("load");
        let source_pages = sources.require(id).expect("source").source_pages();
        let action = if workspace.is_empty() {
            WorkspaceAction::LoadDocument {
                file_name: "vertrag.pdf".into(),
                source_id: id,
                pages: source_pages,
            }
        } else {
            WorkspaceAction::AppendPages { source_id: id, pages: source_pages }
        };
        workspace.apply(action);
        id
    }

    fn add(workspace: &mut Workspace, index: usize, element: Element) {
        let page_id = workspace.pages()[index].id();
        workspace.apply(WorkspaceAction::AddElement { page_id, element });
    }

    fn export(workspace: &Workspace, sources: &SourceRegistry) -> (Document, ExportReport) {
        let composed = compose(workspace, sources, &EditorConfig::default()).expect("compose");
        let doc = Document::load_mem(&composed.bytes).expect("output should parse");
        (doc, composed.report)
    }

    fn operations(doc: &Document, page_number: u32) -> Vec<Operation> {
        let page_id = doc.get_pages()[&page_number];
        let bytes = doc.get_page_content(page_id).expect("content");
        Content::decode(&bytes).expect("decode").operations
    }

    fn number(object: &Object) -> Option<f32> {
        match object {
            Object::Integer(value) => Some(*value as f32),
            Object::Real(value) => Some(*value),
            _ => None,
        }
    }

    fn numbers(operation: &Operation) -> Vec<f32> {
        operation.operands.iter().filter_map(number).collect()
    }

    /// Some `operator` operation carries `expected` numeric operands.
    fn has_op(ops: &[Operation], operator: &str, expected: &[f32]) -> bool {
        ops.iter().any(|op| {
            let values = numbers(op);
            op.operator == operator
                && values.len() == expected.len()
                && values.iter().zip(expected).all(|(a, b)| (a - b).abs() < 1e-2)
        })
    }

    fn count(ops: &[Operation], operator: &str) -> usize {
        ops.iter().filter(|op| op.operator == operator).count()
    }

    fn shown_text(ops: &[Operation]) -> Vec<String> {
        ops.iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
                _ => None,
            })
            .collect()
    }

    fn media_width(doc: &Document, page_number: u32) -> f32 {
        let page_id = doc.get_pages()[&page_number];
        let dict = doc.get_dictionary(page_id).expect("page");
        let media = dict.get(b"MediaBox").and_then(Object::as_array).expect("media box");
        number(&media[2]).expect("numeric width")
    }

    fn rotation(doc: &Document, page_number: u32) -> i64 {
        let page_id = doc.get_pages()[&page_number];
        doc.get_dictionary(page_id)
            .expect("page")
            .get(b"Rotate")
            .and_then(Object::as_i64)
            .unwrap_or(0)
    }

    #[test]
    fn test_page_order_follows_page_list() {
        let mut sources = SourceRegistry::new();
        let mut workspace = Workspace::default();
        open(&mut sources, &mut workspace, &[letter(), TestPage::new(500.0, 500.0)]);
        open(&mut sources, &mut workspace, &[TestPage::new(300.0, 200.0)]);

        workspace.apply(WorkspaceAction::MovePage { from: 2, to: 0 });
        let (doc, report) = export(&workspace, &sources);

        assert_eq!(doc.get_pages().len(), 3);
        assert_eq!(media_width(&doc, 1), 300.0);
        assert_eq!(media_width(&doc, 2), 612.0);
        assert_eq!(media_width(&doc, 3), 500.0);
        assert_eq!(report.pages_written, 3);
    }

    #[test]
    fn test_rotation_is_additive() {
        let mut sources = SourceRegistry::new();
        let mut workspace = Workspace::default();
        open(&mut sources, &mut workspace, &[letter().rotated(90), letter()]);

        let first = workspace.pages()[0].id();
        for _ in 0..2 {
            workspace.apply(WorkspaceAction::RotatePage { page_id: first });
        }

        let (doc, _) = export(&workspace, &sources);
        assert_eq!(rotation(&doc, 1), 270);
        assert_eq!(rotation(&doc, 2), 0);
    }

    #[test]
    fn test_text_is_written_with_resolved_font() {
        let mut sources = SourceRegistry::new();
        let mut workspace = Workspace::default();
        open(&mut sources, &mut workspace, &[letter()]);

        let mut text = TextElement::new(ElementId("text-1".into()), Point::new(10.0, 10.0), 24.0);
        text.text = "Hallo\nWelt".into();
        text.font_family = "Georgia, serif".into();
        text.font_weight = FontWeight::Bold;
        text.font_style = FontStyle::Italic;
        text.color = "#ff0000".into();
        add(&mut workspace, 0, Element::Text(text));

        let (doc, _) = export(&workspace, &sources);
        let ops = operations(&doc, 1);

        assert!(shown_text(&ops).ends_with(&["Hallo".to_owned(), "Welt".to_owned()]));
        assert!(has_op(&ops, "rg", &[1.0, 0.0, 0.0]));
        // 24 / 1.5 = 16pt, leading 19.2, baseline 792 * 0.9 - 16 * 0.82
        assert!(has_op(&ops, "Tf", &[16.0]));
        assert!(has_op(&ops, "TL", &[19.2]));
        assert!(has_op(&ops, "Td", &[61.2, 699.68]));

        let has_font = doc
            .objects
            .values()
            .filter_map(|object| object.as_dict().ok())
            .filter_map(|dict| dict.get(b"BaseFont").ok())
            .any(|name| name.as_name().ok() == Some(b"Times-BoldItalic".as_slice()));
        assert!(has_font);
    }

    #[test]
    fn test_blank_text_is_not_drawn() {
        let mut sources = SourceRegistry::new();
        let mut workspace = Workspace::default();
        open(&mut sources, &mut workspace, &[letter()]);
        add(
            &mut workspace,
            0,
            Element::Text(TextElement::new(ElementId("t".into()), Point::new(1.0, 1.0), 16.0)),
        );

        let (doc, _) = export(&workspace, &sources);
        // Only the fixture's own "Page 1" label.
        assert_eq!(shown_text(&operations(&doc, 1)), vec!["Page 1".to_owned()]);
    }

    #[test]
    fn test_line_endpoints_follow_codec() {
        let mut sources = SourceRegistry::new();
        let mut workspace = Workspace::default();
        open(&mut sources, &mut workspace, &[TestPage::new(200.0, 100.0)]);

        // Flipped: from bottom-left to top-right on screen.
        let mut line = SymbolElement::new(
            ElementId("line".into()),
            ShapeKind::Line,
            Rect::new(10.0, 20.0, 50.0, 40.0),
            0.0,
        );
        line.is_flipped_v = true;
        add(&mut workspace, 0, Element::Symbol(line));

        let (doc, _) = export(&workspace, &sources);
        let ops = operations(&doc, 1);

        // start (10%, 60%) -> (20, 40); end (60%, 20%) -> (120, 80); width falls back to 2
        assert!(has_op(&ops, "m", &[20.0, 40.0]));
        assert!(has_op(&ops, "l", &[120.0, 80.0]));
        assert!(has_op(&ops, "w", &[2.0]));
    }

    #[test]
    fn test_diamond_and_arrows_draw_segments() {
        let mut sources = SourceRegistry::new();
        let mut workspace = Workspace::default();
        open(&mut sources, &mut workspace, &[TestPage::new(100.0, 100.0)]);

        let shapes = [ShapeKind::Diamond, ShapeKind::ArrowRight, ShapeKind::ArrowLeft];
        for (index, shape) in shapes.into_iter().enumerate() {
            let symbol = SymbolElement::new(
                ElementId(format!("s{index}")),
                shape,
                Rect::new(0.0, 0.0, 100.0, 100.0),
                3.0,
            );
            add(&mut workspace, 0, Element::Symbol(symbol));
        }

        let (doc, _) = export(&workspace, &sources);
        let ops = operations(&doc, 1);

        assert_eq!(count(&ops, "l"), 4 + 3 + 3);
        // diamond top vertex, 5% inset
        assert!(has_op(&ops, "m", &[50.0, 95.0]));
        // right arrow: tip at (100, 50), wings at 70%
        assert!(has_op(&ops, "m", &[100.0, 50.0]));
        assert!(has_op(&ops, "l", &[70.0, 80.0]));
        // left arrow wings at 30%
        assert!(has_op(&ops, "l", &[30.0, 20.0]));
        assert!(has_op(&ops, "w", &[3.0]));
    }

    #[test]
    fn test_rotated_square_turns_clockwise() {
        let mut sources = SourceRegistry::new();
        let mut workspace = Workspace::default();
        open(&mut sources, &mut workspace, &[TestPage::new(100.0, 100.0)]);

        let mut square = SymbolElement::new(
            ElementId("sq".into()),
            ShapeKind::Square,
            Rect::new(40.0, 40.0, 20.0, 10.0),
            1.0,
        );
        square.rotation = 90.0;
        add(&mut workspace, 0, Element::Symbol(square));

        let (doc, _) = export(&workspace, &sources);
        let ops = operations(&doc, 1);

        // -90 degrees about the box center (50, 55)
        assert!(has_op(&ops, "cm", &[0.0, -1.0, 1.0, 0.0, 50.0, 55.0]));
        assert!(has_op(&ops, "re", &[-10.0, -5.0, 20.0, 10.0]));
    }

    #[test]
    fn test_missing_source_skips_page() {
        let mut sources = SourceRegistry::new();
        let mut workspace = Workspace::default();
        open(&mut sources, &mut workspace, &[letter()]);
        let gone = open(&mut sources, &mut workspace, &[TestPage::new(300.0, 300.0)]);
        sources.remove(gone);

        let (doc, report) = export(&workspace, &sources);
        assert_eq!(doc.get_pages().len(), 1);
        assert!(matches!(
            report.skipped.as_slice(),
            [ExportError::SourceResolutionFailed { source_id, .. }] if *source_id == gone
        ));
        assert_eq!(
            report.skipped[0].to_string(),
            format!("page-2 refers to {gone}, which is not loaded")
        );
    }

    #[test]
    fn test_broken_image_is_skipped() {
        let mut sources = SourceRegistry::new();
        let mut workspace = Workspace::default();
        open(&mut sources, &mut workspace, &[letter()]);

        let png =
            encode_png(&RgbaImage::from_pixel(4, 2, image::Rgba([0, 0, 255, 255]))).expect("png");
        let good = ImageElement {
            id: ElementId("good".into()),
            image_data: encode_image_data_url(&png).expect("url"),
            x: 10.0,
            y: 10.0,
            width: 20.0,
            height: 10.0,
        };
        let broken = ImageElement {
            id: ElementId("broken".into()),
            image_data: "data:image/png;base64,AAAA".into(),
            ..good.clone()
        };
        add(&mut workspace, 0, Element::Image(good));
        add(&mut workspace, 0, Element::Image(broken));

        let (doc, report) = export(&workspace, &sources);
        let ops = operations(&doc, 1);

        assert_eq!(count(&ops, "Do"), 1);
        // 20% x 10% of letter at (10%, 10%) from the top
        assert!(has_op(&ops, "cm", &[122.4, 0.0, 0.0, 79.2, 61.2, 633.6]));
        assert!(matches!(
            report.skipped.as_slice(),
            [ExportError::AssetEmbedFailed { element, .. }] if element.0 == "broken"
        ));
    }

    #[test]
    fn test_style_changes_reach_export() {
        let mut sources = SourceRegistry::new();
        let mut workspace = Workspace::default();
        open(&mut sources, &mut workspace, &[letter()]);
        let square = SymbolElement::new(
            ElementId("sq".into()),
            ShapeKind::Square,
            Rect::new(10.0, 10.0, 10.0, 10.0),
            2.0,
        );
        add(&mut workspace, 0, Element::Symbol(square));

        let page_id = workspace.pages()[0].id();
        workspace.apply(WorkspaceAction::UpdateStyle {
            page_id,
            element_id: ElementId("sq".into()),
            patch: StylePatch {
                color: Some("#00ff00".into()),
                fill: Some(true),
                ..StylePatch::default()
            },
        });

        let (doc, _) = export(&workspace, &sources);
        let ops = operations(&doc, 1);
        assert!(has_op(&ops, "RG", &[0.0, 1.0, 0.0]));
        assert!(has_op(&ops, "rg", &[0.0, 1.0, 0.0]));
        assert_eq!(count(&ops, "B"), 1);
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name(Some("vertrag.pdf"), "_edited"), "vertrag_edited.pdf");
        assert_eq!(output_file_name(Some("/tmp/Scan.PDF"), "_edited"), "Scan_edited.PDF");
        assert_eq!(output_file_name(Some("a.b.pdf"), "_x"), "a.b_x.pdf");
        assert_eq!(output_file_name(Some("notes"), "_edited"), "notes_edited.pdf");
        assert_eq!(output_file_name(None, "_edited"), "dokument_edited.pdf");
    }

    #[test]
    fn test_empty_workspace_exports_empty_document() {
        let outcome =
            export_document(&Workspace::default(), &SourceRegistry::new(), &EditorConfig::default());
        assert!(outcome.success);

        let doc = Document::load_mem(outcome.bytes.as_deref().expect("bytes")).expect("parse");
        assert!(doc.get_pages().is_empty());
    }

    #[test]
    fn test_out_of_range_page_fails_export() {
        let mut sources = SourceRegistry::new();
        let id = sources.load(build_pdf(&[letter()])).expect("load");
        let mut workspace = Workspace::default();
        workspace.apply(WorkspaceAction::LoadDocument {
            file_name: "kaputt.pdf".into(),
            source_id: id,
            pages: vec![SourcePage { page_number: 4, width_pt: 612.0, height_pt: 792.0 }],
        });

        let outcome = export_document(&workspace, &sources, &EditorConfig::default());
        assert!(!outcome.success);
        assert_eq!(outcome.message, EXPORT_FAILED);
        assert!(outcome.bytes.is_none());
        assert_eq!(outcome.file_name, "kaputt_edited.pdf");
    }

    #[test]
    fn test_export_to_file_writes_named_output() {
        let mut sources = SourceRegistry::new();
        let mut workspace = Workspace::default();
        open(&mut sources, &mut workspace, &[letter()]);
        let dir = tempfile::tempdir().expect("tempdir");

        let outcome = export_to_file(&workspace, &sources, &EditorConfig::default(), dir.path());
        assert!(outcome.success, "{}", outcome.message);

        let written = fs::read(dir.path().join("vertrag_edited.pdf")).expect("written");
        let doc = Document::load_mem(&written).expect("parse");
        assert_eq!(doc.get_pages().len(), 1);
    }
}
