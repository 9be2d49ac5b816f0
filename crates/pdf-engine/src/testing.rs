//! In-memory PDF fixtures for tests.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestPage {
    pub width_pt: f32,
    pub height_pt: f32,
    pub rotation: i64,
}

impl TestPage {
    pub fn new(width_pt: f32, height_pt: f32) -> Self {
        Self { width_pt, height_pt, rotation: 0 }
    }

    pub fn rotated(self, rotation: i64) -> Self {
        Self { rotation, ..self }
    }
}

/// A small valid PDF whose pages each print their own page number.
pub fn build_pdf(pages: &[TestPage]) -> Vec<u8> {
    build(pages, None)
}

/// Same as [`build_pdf`] but with the `/MediaBox` set on the page tree node only.
pub fn build_pdf_with_inherited_box(width_pt: f32, height_pt: f32, count: usize) -> Vec<u8> {
    let pages = vec![TestPage::new(width_pt, height_pt); count];
    build(&pages, Some((width_pt, height_pt)))
}

fn build(pages: &[TestPage], inherited_box: Option<(f32, f32)>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let kids: Vec<Object> = pages
        .iter()
        .enumerate()
        .map(|(index, page)| {
            add_page(&mut doc, pages_id, resources_id, index + 1, page, inherited_box.is_none())
                .into()
        })
        .collect();

    let mut pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => pages.len() as i64,
    };
    if let Some((width, height)) = inherited_box {
        pages_dict.set("MediaBox", media_box(width, height));
    }
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("in-memory save should succeed");
    bytes
}

fn add_page(
    doc: &mut Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    number: usize,
    page: &TestPage,
    own_box: bool,
) -> ObjectId {
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), Object::Integer(24)]),
            Operation::new("Td", vec![Object::Integer(36), Object::Integer(36)]),
            Operation::new("Tj", vec![Object::string_literal(format!("Page {number}"))]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().expect("content should encode"),
    ));

    let mut dict = dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
    };
    if own_box {
        dict.set("MediaBox", media_box(page.width_pt, page.height_pt));
    }
    if page.rotation != 0 {
        dict.set("Rotate", page.rotation);
    }
    doc.add_object(dict)
}

fn media_box(width: f32, height: f32) -> Vec<Object> {
    vec![Object::Integer(0), Object::Integer(0), width.into(), height.into()]
}
