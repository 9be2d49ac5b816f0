//! Loaded source documents.
//!
//! Every opened or appended file is parsed once and kept in a
//! [`SourceRegistry`] under a [`SourceId`]. Pages in the editor refer to their
//! source by id; the exporter imports pages straight from the parsed handle.

use crate::EngineError;
use folio_model::{SourceId, SourcePage};
use lopdf::{Document, Object, ObjectId};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use std::sync::Arc;

const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);
const MAX_TREE_DEPTH: usize = 32;

/// Geometry of one source page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageInfo {
    pub page_number: u32,
    pub width_pt: f32,
    pub height_pt: f32,
    /// Intrinsic `/Rotate`, normalized to 0, 90, 180 or 270.
    pub rotation: u32,
}

impl PageInfo {
    pub fn source_page(&self) -> SourcePage {
        SourcePage {
            page_number: self.page_number,
            width_pt: self.width_pt,
            height_pt: self.height_pt,
        }
    }
}

#[derive(Debug)]
pub struct SourceDocument {
    id: SourceId,
    bytes: Vec<u8>,
    document: Document,
    pages: Vec<PageInfo>,
}

impl SourceDocument {
    pub fn parse(id: SourceId, bytes: Vec<u8>) -> Result<Self, EngineError> {
        if bytes.windows("/Encrypt".len()).any(|window| window == b"/Encrypt") {
            return Err(EngineError::EncryptedUnsupported);
        }

        let document = Document::load_mem(&bytes)?;
        let pages = document
            .get_pages()
            .into_iter()
            .map(|(page_number, page_id)| read_page_info(&document, page_number, page_id))
            .collect::<Vec<_>>();

        if pages.is_empty() {
            return Err(EngineError::NoPages);
        }

        Ok(Self { id, bytes, document, pages })
    }

    pub fn id(&self) -> SourceId {
        self.id
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    pub fn pages(&self) -> &[PageInfo] {
        &self.pages
    }

    /// Info for the 1-based `page_number`.
    pub fn page(&self, page_number: u32) -> Result<&PageInfo, EngineError> {
        page_number
            .checked_sub(1)
            .and_then(|index| self.pages.get(index as usize))
            .ok_or(EngineError::PageOutOfRange { page: page_number, page_count: self.page_count() })
    }

    pub fn source_pages(&self) -> Vec<SourcePage> {
        self.pages.iter().map(PageInfo::source_page).collect()
    }
}

/// Owns every loaded source for the lifetime of an editing session.
#[derive(Debug, Default)]
pub struct SourceRegistry {
    next_id: u64,
    sources: HashMap<SourceId, Arc<SourceDocument>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, bytes: Vec<u8>) -> Result<SourceId, EngineError> {
        self.next_id += 1;
        let id = SourceId(self.next_id);
        self.insert(id, bytes)?;
        Ok(id)
    }

    pub fn load_path(&mut self, path: &Path) -> Result<SourceId, EngineError> {
        self.load(fs::read(path)?)
    }

    /// Register bytes under a caller-chosen id, replacing any previous entry.
    pub fn insert(&mut self, id: SourceId, bytes: Vec<u8>) -> Result<(), EngineError> {
        let source = SourceDocument::parse(id, bytes)?;
        log::debug!("loaded {id} with {} page(s)", source.page_count());

        self.next_id = self.next_id.max(id.0);
        self.sources.insert(id, Arc::new(source));
        Ok(())
    }

    pub fn get(&self, id: SourceId) -> Option<Arc<SourceDocument>> {
        self.sources.get(&id).cloned()
    }

    pub fn require(&self, id: SourceId) -> Result<Arc<SourceDocument>, EngineError> {
        self.get(id).ok_or(EngineError::UnknownSource(id))
    }

    pub fn remove(&mut self, id: SourceId) -> Option<Arc<SourceDocument>> {
        self.sources.remove(&id)
    }

    /// Drop every source not in `referenced`.
    pub fn retain_referenced(&mut self, referenced: &BTreeSet<SourceId>) {
        self.sources.retain(|id, _| referenced.contains(id));
    }

    pub fn clear(&mut self) {
        self.sources.clear();
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

fn read_page_info(document: &Document, page_number: u32, page_id: ObjectId) -> PageInfo {
    let (width_pt, height_pt) = inherited_attribute(document, page_id, b"MediaBox")
        .and_then(|object| box_size(document, &object))
        .unwrap_or(DEFAULT_PAGE_SIZE);
    let rotation = inherited_attribute(document, page_id, b"Rotate")
        .and_then(|object| resolve(document, &object).as_i64().ok())
        .map(normalize_rotation)
        .unwrap_or(0);

    PageInfo { page_number, width_pt, height_pt, rotation }
}

/// Follow a reference once; anything else is returned as is.
pub(crate) fn resolve<'a>(document: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => document.get_object(*id).unwrap_or(object),
        _ => object,
    }
}

/// Look `key` up on the page dictionary, then up the `/Parent` chain.
pub(crate) fn inherited_attribute(
    document: &Document,
    page_id: ObjectId,
    key: &[u8],
) -> Option<Object> {
    let mut node = document.get_dictionary(page_id).ok()?;

    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value.clone());
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = document.get_dictionary(parent).ok()?;
    }

    None
}

pub(crate) fn box_size(document: &Document, object: &Object) -> Option<(f32, f32)> {
    let array = resolve(document, object).as_array().ok()?;
    if array.len() != 4 {
        return None;
    }

    let coord = |index: usize| resolve(document, &array[index]).as_float().ok();
    let (x0, y0, x1, y1) = (coord(0)?, coord(1)?, coord(2)?, coord(3)?);
    Some(((x1 - x0).abs(), (y1 - y0).abs()))
}

pub(crate) fn normalize_rotation(degrees: i64) -> u32 {
    let quarter_turns = (degrees as f64 / 90.0).round() as i64;
    (quarter_turns * 90).rem_euclid(360) as u32
}
