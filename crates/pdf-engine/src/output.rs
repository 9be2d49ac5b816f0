//! Output document writer.
//!
//! Pages are imported from parsed sources, drawn on with native PDF
//! operators, and serialized in one go by [`OutputDocument::save_to_bytes`].
//! All drawing coordinates are PDF points relative to the page's lower-left
//! corner; rotations are counter-clockwise degrees about the frame center.

use crate::source::{box_size, inherited_attribute, normalize_rotation, resolve};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::Cursor;

const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];
const KAPPA: f32 = 0.552_284_8;

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("page {page} out of range (page_count={page_count})")]
    PageOutOfRange { page: u32, page_count: u32 },
    #[error("unknown output page {0}")]
    UnknownPage(usize),
    #[error("malformed source page: {0}")]
    Malformed(#[from] lopdf::Error),
    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),
    #[error("content encoding failed: {0}")]
    Encode(String),
    #[error("serialization failed: {0}")]
    Serialize(String),
}

/// The 12 non-symbolic standard fonts every PDF reader ships.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    pub fn base_name(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::HelveticaOblique => "Helvetica-Oblique",
            StandardFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
            StandardFont::TimesItalic => "Times-Italic",
            StandardFont::TimesBoldItalic => "Times-BoldItalic",
            StandardFont::Courier => "Courier",
            StandardFont::CourierBold => "Courier-Bold",
            StandardFont::CourierOblique => "Courier-Oblique",
            StandardFont::CourierBoldOblique => "Courier-BoldOblique",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

/// DeviceRGB color, channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0.0, g: 0.0, b: 0.0 };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    fn operands(self) -> Vec<Object> {
        vec![self.r.into(), self.g.into(), self.b.into()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgb,
    pub width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShapePaint {
    pub stroke: Option<Stroke>,
    pub fill: Option<Rgb>,
}

/// A box in page points with an optional rotation about its center.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Counter-clockwise degrees.
    pub rotation: f32,
}

impl Frame {
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// One text block; `text` is split on `\n` into lines `line_height` apart.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    /// Baseline origin of the first line.
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub line_height: f32,
    pub font: FontHandle,
    pub color: Rgb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageHandle(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontHandle(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle {
    index: usize,
    pub width_px: u32,
    pub height_px: u32,
}

#[derive(Debug)]
struct OutputPage {
    id: ObjectId,
    width_pt: f32,
    height_pt: f32,
    origin: (f32, f32),
    rotation: u32,
    rotation_override: Option<u32>,
    original_contents: Vec<Object>,
    operations: Vec<Operation>,
    fonts: BTreeSet<usize>,
    images: BTreeSet<usize>,
}

#[derive(Debug)]
struct NamedResource {
    name: String,
    id: ObjectId,
}

/// Accumulates imported pages and drawing operations for one export.
#[derive(Debug)]
pub struct OutputDocument {
    doc: Document,
    pages_id: ObjectId,
    pages: Vec<OutputPage>,
    merged_sources: HashMap<u64, BTreeMap<u32, ObjectId>>,
    font_lookup: HashMap<StandardFont, FontHandle>,
    fonts: Vec<NamedResource>,
    images: Vec<NamedResource>,
}

impl Default for OutputDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputDocument {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        Self {
            doc,
            pages_id,
            pages: Vec::new(),
            merged_sources: HashMap::new(),
            font_lookup: HashMap::new(),
            fonts: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Append a copy of `page_number` (1-based) from `source`.
    ///
    /// `source_key` identifies the source across calls: its objects are merged
    /// into the output once, and every later import shares them.
    pub fn import_page(
        &mut self,
        source_key: u64,
        source: &Document,
        page_number: u32,
    ) -> Result<PageHandle, WriteError> {
        if !self.merged_sources.contains_key(&source_key) {
            self.merge_source(source_key, source);
        }

        let source_pages = self.merged_sources.get(&source_key).map(|pages| {
            (pages.get(&page_number).copied(), pages.len() as u32)
        });
        let Some((Some(source_page_id), _)) = source_pages else {
            let page_count = source_pages.map(|(_, count)| count).unwrap_or(0);
            return Err(WriteError::PageOutOfRange { page: page_number, page_count });
        };

        let mut dict = self.doc.get_dictionary(source_page_id)?.clone();
        for key in INHERITABLE {
            if !dict.has(key) {
                if let Some(value) = inherited_attribute(&self.doc, source_page_id, key) {
                    dict.set(key.to_vec(), value);
                }
            }
        }

        let media_box = dict.get(b"MediaBox").ok().and_then(|object| self.media_box(object));
        let (x0, y0, width_pt, height_pt) = media_box.unwrap_or((0.0, 0.0, 612.0, 792.0));
        let rotation = dict
            .get(b"Rotate")
            .ok()
            .and_then(|object| resolve(&self.doc, object).as_i64().ok())
            .map(normalize_rotation)
            .unwrap_or(0);
        let original_contents = match dict.remove(b"Contents") {
            Some(Object::Array(items)) => items,
            Some(contents @ Object::Reference(_)) => vec![contents],
            _ => Vec::new(),
        };

        dict.set("Parent", self.pages_id);
        let id = self.doc.add_object(dict);

        self.pages.push(OutputPage {
            id,
            width_pt,
            height_pt,
            origin: (x0, y0),
            rotation,
            rotation_override: None,
            original_contents,
            operations: Vec::new(),
            fonts: BTreeSet::new(),
            images: BTreeSet::new(),
        });
        Ok(PageHandle(self.pages.len() - 1))
    }

    /// Unrotated `(width, height)` of the page's media box in points.
    pub fn page_size(&self, page: PageHandle) -> Result<(f32, f32), WriteError> {
        let page = self.page(page)?;
        Ok((page.width_pt, page.height_pt))
    }

    /// Current `/Rotate` of the page.
    pub fn rotation(&self, page: PageHandle) -> Result<u32, WriteError> {
        let page = self.page(page)?;
        Ok(page.rotation_override.unwrap_or(page.rotation))
    }

    pub fn set_rotation(&mut self, page: PageHandle, degrees: u32) -> Result<(), WriteError> {
        self.page_mut(page)?.rotation_override = Some(normalize_rotation(i64::from(degrees)));
        Ok(())
    }

    /// Register a standard font once per document.
    pub fn embed_font(&mut self, font: StandardFont) -> FontHandle {
        if let Some(handle) = self.font_lookup.get(&font) {
            return *handle;
        }

        let id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => font.base_name(),
            "Encoding" => "WinAnsiEncoding",
        });
        let handle = FontHandle(self.fonts.len());
        self.fonts.push(NamedResource { name: format!("FolioF{}", handle.0 + 1), id });
        self.font_lookup.insert(font, handle);
        handle
    }

    pub fn embed_image(
        &mut self,
        bytes: &[u8],
        format: ImageFormat,
    ) -> Result<ImageHandle, WriteError> {
        let (stream, width_px, height_px) = match format {
            ImageFormat::Png => self.png_stream(bytes)?,
            ImageFormat::Jpeg => jpeg_stream(bytes)?,
        };

        let id = self.doc.add_object(stream);
        let index = self.images.len();
        self.images.push(NamedResource { name: format!("FolioIm{}", index + 1), id });
        Ok(ImageHandle { index, width_px, height_px })
    }

    pub fn draw_text(&mut self, page: PageHandle, run: &TextRun) -> Result<(), WriteError> {
        let font_name = self
            .fonts
            .get(run.font.0)
            .map(|font| font.name.clone())
            .ok_or(WriteError::Encode(format!("unknown font handle {}", run.font.0)))?;

        let mut operations = vec![
            Operation::new("q", vec![]),
            Operation::new("BT", vec![]),
            Operation::new("rg", run.color.operands()),
            Operation::new("Tf", vec![Object::Name(font_name.into_bytes()), run.size.into()]),
            Operation::new("TL", vec![run.line_height.into()]),
            Operation::new("Td", vec![run.x.into(), run.y.into()]),
        ];
        for (index, line) in run.text.split('\n').enumerate() {
            if index > 0 {
                operations.push(Operation::new("T*", vec![]));
            }
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(line), StringFormat::Literal)],
            ));
        }
        operations.push(Operation::new("ET", vec![]));
        operations.push(Operation::new("Q", vec![]));

        let target = self.page_mut(page)?;
        target.fonts.insert(run.font.0);
        target.operations.extend(operations);
        Ok(())
    }

    pub fn draw_rectangle(
        &mut self,
        page: PageHandle,
        frame: &Frame,
        paint: &ShapePaint,
    ) -> Result<(), WriteError> {
        let mut operations = begin_shape(frame, paint);
        operations.push(Operation::new(
            "re",
            vec![
                (-frame.width / 2.0).into(),
                (-frame.height / 2.0).into(),
                frame.width.into(),
                frame.height.into(),
            ],
        ));
        finish_shape(&mut operations, paint);
        self.push_operations(page, operations)
    }

    pub fn draw_ellipse(
        &mut self,
        page: PageHandle,
        frame: &Frame,
        paint: &ShapePaint,
    ) -> Result<(), WriteError> {
        let rx = frame.width / 2.0;
        let ry = frame.height / 2.0;
        let kx = rx * KAPPA;
        let ky = ry * KAPPA;

        let mut operations = begin_shape(frame, paint);
        operations.push(Operation::new("m", vec![rx.into(), 0.0_f32.into()]));
        for curve in [
            [rx, ky, kx, ry, 0.0, ry],
            [-kx, ry, -rx, ky, -rx, 0.0],
            [-rx, -ky, -kx, -ry, 0.0, -ry],
            [kx, -ry, rx, -ky, rx, 0.0],
        ] {
            operations.push(Operation::new("c", curve.iter().map(|v| (*v).into()).collect()));
        }
        operations.push(Operation::new("h", vec![]));
        finish_shape(&mut operations, paint);
        self.push_operations(page, operations)
    }

    /// Straight segment with round caps.
    pub fn draw_line(
        &mut self,
        page: PageHandle,
        start: (f32, f32),
        end: (f32, f32),
        stroke: &Stroke,
    ) -> Result<(), WriteError> {
        let operations = vec![
            Operation::new("q", vec![]),
            Operation::new("RG", stroke.color.operands()),
            Operation::new("w", vec![stroke.width.into()]),
            Operation::new("J", vec![Object::Integer(1)]),
            Operation::new("m", vec![start.0.into(), start.1.into()]),
            Operation::new("l", vec![end.0.into(), end.1.into()]),
            Operation::new("S", vec![]),
            Operation::new("Q", vec![]),
        ];
        self.push_operations(page, operations)
    }

    /// Draw an embedded image stretched over the (unrotated) frame.
    pub fn draw_image(
        &mut self,
        page: PageHandle,
        image: ImageHandle,
        frame: &Frame,
    ) -> Result<(), WriteError> {
        let name = self
            .images
            .get(image.index)
            .map(|resource| resource.name.clone())
            .ok_or(WriteError::Encode(format!("unknown image handle {}", image.index)))?;

        let operations = vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    frame.width.into(),
                    0.0_f32.into(),
                    0.0_f32.into(),
                    frame.height.into(),
                    frame.x.into(),
                    frame.y.into(),
                ],
            ),
            Operation::new("Do", vec![Object::Name(name.into_bytes())]),
            Operation::new("Q", vec![]),
        ];

        let target = self.page_mut(page)?;
        target.images.insert(image.index);
        target.operations.extend(operations);
        Ok(())
    }

    /// Assemble the page tree and serialize.
    pub fn save_to_bytes(mut self) -> Result<Vec<u8>, WriteError> {
        let pages = std::mem::take(&mut self.pages);
        let mut kids = Vec::with_capacity(pages.len());

        for page in pages {
            self.finish_page(page, &mut kids)?;
        }

        let count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.prune_objects();

        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes).map_err(|err| WriteError::Serialize(err.to_string()))?;
        Ok(bytes)
    }

    fn merge_source(&mut self, source_key: u64, source: &Document) {
        let mut copy = source.clone();
        copy.renumber_objects_with(self.doc.max_id + 1);

        let page_map = copy.get_pages();
        let catalog = copy.trailer.get(b"Root").and_then(Object::as_reference).ok();
        let max_id = copy.max_id;

        for (id, object) in copy.objects {
            if Some(id) != catalog {
                self.doc.objects.insert(id, object);
            }
        }
        self.doc.max_id = self.doc.max_id.max(max_id);
        self.merged_sources.insert(source_key, page_map);

        log::debug!("merged source {source_key} into output (max_id={})", self.doc.max_id);
    }

    fn media_box(&self, object: &Object) -> Option<(f32, f32, f32, f32)> {
        let (width, height) = box_size(&self.doc, object)?;
        let array = resolve(&self.doc, object).as_array().ok()?;
        let x0 = resolve(&self.doc, &array[0]).as_float().ok()?;
        let y0 = resolve(&self.doc, &array[1]).as_float().ok()?;
        let x1 = resolve(&self.doc, &array[2]).as_float().ok()?;
        let y1 = resolve(&self.doc, &array[3]).as_float().ok()?;
        Some((x0.min(x1), y0.min(y1), width, height))
    }

    fn finish_page(&mut self, page: OutputPage, kids: &mut Vec<Object>) -> Result<(), WriteError> {
        let mut contents = Vec::new();
        let mut overlay = Vec::new();

        if !page.operations.is_empty() {
            let wrap = !page.original_contents.is_empty();
            if wrap {
                contents.push(Object::Reference(self.content_stream(vec![Operation::new(
                    "q",
                    vec![],
                )])?));
                overlay.push(Operation::new("Q", vec![]));
            }
            contents.extend(page.original_contents);

            overlay.push(Operation::new("q", vec![]));
            if page.origin != (0.0, 0.0) {
                overlay.push(Operation::new(
                    "cm",
                    vec![
                        1.0_f32.into(),
                        0.0_f32.into(),
                        0.0_f32.into(),
                        1.0_f32.into(),
                        page.origin.0.into(),
                        page.origin.1.into(),
                    ],
                ));
            }
            overlay.extend(page.operations);
            overlay.push(Operation::new("Q", vec![]));
            contents.push(Object::Reference(self.content_stream(overlay)?));
        } else {
            contents.extend(page.original_contents);
        }

        let resources = self.page_resources(page.id, &page.fonts, &page.images);
        let dict = self.doc.get_object_mut(page.id).and_then(Object::as_dict_mut)?;
        dict.set("Contents", contents);
        dict.set("Resources", resources);
        if let Some(rotation) = page.rotation_override {
            dict.set("Rotate", i64::from(rotation));
        }

        kids.push(Object::Reference(page.id));
        Ok(())
    }

    fn content_stream(&mut self, operations: Vec<Operation>) -> Result<ObjectId, WriteError> {
        let encoded =
            Content { operations }.encode().map_err(|err| WriteError::Encode(err.to_string()))?;
        let mut stream = Stream::new(dictionary! {}, encoded);
        compress(&mut stream, "content");
        Ok(self.doc.add_object(stream))
    }

    /// Inline copy of the page's resources with our fonts and images added.
    fn page_resources(
        &self,
        page_id: ObjectId,
        fonts: &BTreeSet<usize>,
        images: &BTreeSet<usize>,
    ) -> Dictionary {
        let mut resources = self
            .doc
            .get_dictionary(page_id)
            .ok()
            .and_then(|dict| dict.get(b"Resources").ok())
            .and_then(|object| resolve(&self.doc, object).as_dict().ok())
            .cloned()
            .unwrap_or_default();

        let font_entries = fonts.iter().filter_map(|index| self.fonts.get(*index));
        self.extend_category(&mut resources, b"Font", font_entries);
        let image_entries = images.iter().filter_map(|index| self.images.get(*index));
        self.extend_category(&mut resources, b"XObject", image_entries);
        resources
    }

    fn extend_category<'a>(
        &self,
        resources: &mut Dictionary,
        category: &[u8],
        entries: impl Iterator<Item = &'a NamedResource>,
    ) {
        let mut entries = entries.peekable();
        if entries.peek().is_none() {
            return;
        }

        let mut dict = resources
            .get(category)
            .ok()
            .and_then(|object| resolve(&self.doc, object).as_dict().ok())
            .cloned()
            .unwrap_or_default();
        for entry in entries {
            dict.set(entry.name.as_bytes().to_vec(), Object::Reference(entry.id));
        }
        resources.set(category.to_vec(), dict);
    }

    fn png_stream(&mut self, bytes: &[u8]) -> Result<(Stream, u32, u32), WriteError> {
        let rgba = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)?.to_rgba8();
        let (width, height) = rgba.dimensions();

        let mut rgb = Vec::with_capacity((width * height * 3) as usize);
        let mut alpha = Vec::with_capacity((width * height) as usize);
        for pixel in rgba.pixels() {
            rgb.extend_from_slice(&pixel.0[..3]);
            alpha.push(pixel.0[3]);
        }

        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
        };

        if alpha.iter().any(|value| *value < u8::MAX) {
            let mut mask = Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => i64::from(width),
                    "Height" => i64::from(height),
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8_i64,
                },
                alpha,
            );
            compress(&mut mask, "soft mask");
            dict.set("SMask", self.doc.add_object(mask));
        }

        let mut stream = Stream::new(dict, rgb);
        compress(&mut stream, "image");
        Ok((stream, width, height))
    }

    fn page(&self, page: PageHandle) -> Result<&OutputPage, WriteError> {
        self.pages.get(page.0).ok_or(WriteError::UnknownPage(page.0))
    }

    fn page_mut(&mut self, page: PageHandle) -> Result<&mut OutputPage, WriteError> {
        self.pages.get_mut(page.0).ok_or(WriteError::UnknownPage(page.0))
    }

    fn push_operations(
        &mut self,
        page: PageHandle,
        operations: Vec<Operation>,
    ) -> Result<(), WriteError> {
        self.page_mut(page)?.operations.extend(operations);
        Ok(())
    }
}

fn jpeg_stream(bytes: &[u8]) -> Result<(Stream, u32, u32), WriteError> {
    let decoded = image::load_from_memory_with_format(bytes, image::ImageFormat::Jpeg)?;
    let (width, height) = (decoded.width(), decoded.height());
    let color_space = match decoded.color() {
        image::ColorType::L8 | image::ColorType::L16 => "DeviceGray",
        _ => "DeviceRGB",
    };

    let stream = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(width),
            "Height" => i64::from(height),
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8_i64,
            "Filter" => "DCTDecode",
        },
        bytes.to_vec(),
    );
    Ok((stream, width, height))
}

/// `q`, paint state, then a transform putting the frame center at the origin.
fn begin_shape(frame: &Frame, paint: &ShapePaint) -> Vec<Operation> {
    let mut operations = vec![Operation::new("q", vec![])];
    if let Some(stroke) = paint.stroke {
        operations.push(Operation::new("RG", stroke.color.operands()));
        operations.push(Operation::new("w", vec![stroke.width.into()]));
    }
    if let Some(fill) = paint.fill {
        operations.push(Operation::new("rg", fill.operands()));
    }

    let (sin, cos) = frame.rotation.to_radians().sin_cos();
    let (cx, cy) = frame.center();
    operations.push(Operation::new(
        "cm",
        vec![cos.into(), sin.into(), (-sin).into(), cos.into(), cx.into(), cy.into()],
    ));
    operations
}

fn finish_shape(operations: &mut Vec<Operation>, paint: &ShapePaint) {
    let operator = match (paint.stroke.is_some(), paint.fill.is_some()) {
        (true, true) => "B",
        (true, false) => "S",
        (false, true) => "f",
        (false, false) => "n",
    };
    operations.push(Operation::new(operator, vec![]));
    operations.push(Operation::new("Q", vec![]));
}

/// Encode for the standard fonts' WinAnsi encoding; unmappable characters
/// become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            '\t' => b' ',
            ' '..='~' => ch as u8,
            '\u{a0}'..='\u{ff}' => ch as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '„' => 0x84,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}

/// Encode an RGBA image as PNG bytes; handy for callers building data URLs.
pub fn encode_png(image: &image::RgbaImage) -> Result<Vec<u8>, WriteError> {
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, image::ImageFormat::Png)?;
    Ok(cursor.into_inner())
}

/// Flate-compress `stream`; on failure it is written uncompressed.
fn compress(stream: &mut Stream, kind: &str) {
    if let Err(err) = stream.compress() {
        log::debug!("leaving {kind} stream uncompressed: {err}");
    }
}
