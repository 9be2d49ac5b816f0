pub mod color;
pub mod coords;
pub mod element;

pub use color::{Color, ColorParseError};
pub use coords::{Extent, LineEndpoints, Point, Rect, PERCENT_MAX};
pub use element::{
    Element, ElementId, ElementKind, FontStyle, FontWeight, GeometryUpdate, ImageElement,
    ShapeKind, StylePatch, SymbolElement, TextDecoration, TextElement,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Identifies a loaded source document inside the source registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceId(pub u64);

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "source-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PageId(pub u64);

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "page-{}", self.0)
    }
}

/// One page of a source document as reported by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourcePage {
    /// 1-based index inside the source document.
    pub page_number: u32,
    pub width_pt: f32,
    pub height_pt: f32,
}

/// A page in the editor's page list.
///
/// Identity survives reordering; which source page it shows never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    id: PageId,
    source_id: SourceId,
    page_number: u32,
    rotation_delta: u32,
    width_pt: f32,
    height_pt: f32,
    elements: Vec<Element>,
}

impl Page {
    pub fn new(id: PageId, source_id: SourceId, source_page: SourcePage) -> Self {
        Self {
            id,
            source_id,
            page_number: source_page.page_number,
            rotation_delta: 0,
            width_pt: source_page.width_pt,
            height_pt: source_page.height_pt,
            elements: Vec::new(),
        }
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn source_id(&self) -> SourceId {
        self.source_id
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// User-applied rotation in degrees, one of 0, 90, 180, 270.
    pub fn rotation_delta(&self) -> u32 {
        self.rotation_delta
    }

    pub fn width_pt(&self) -> f32 {
        self.width_pt
    }

    pub fn height_pt(&self) -> f32 {
        self.height_pt
    }

    /// Elements in paint order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|element| element.id() == id)
    }

    fn element_mut(&mut self, id: &ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|element| element.id() == id)
    }
}

/// Editor state: the open document name, the ordered page list and the page
/// currently in view. Mutated only through [`apply_workspace_action`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Workspace {
    pub file_name: Option<String>,
    pages: Vec<Page>,
    current_page: usize,
    next_page_id: u64,
    /// Text element whose editor is open.
    #[serde(default)]
    editing: Option<(PageId, ElementId)>,
}

impl Workspace {
    /// Pages in export order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.iter().find(|page| page.id == id)
    }

    pub fn page_index(&self, id: PageId) -> Option<usize> {
        self.pages.iter().position(|page| page.id == id)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn element(&self, page_id: PageId, element_id: &ElementId) -> Option<&Element> {
        self.page(page_id)?.element(element_id)
    }

    pub fn editing(&self) -> Option<(PageId, &ElementId)> {
        self.editing.as_ref().map(|(page_id, element_id)| (*page_id, element_id))
    }

    fn is_editing(&self, page_id: PageId, element_id: &ElementId) -> bool {
        self.editing.as_ref().is_some_and(|(page, element)| *page == page_id && element == element_id)
    }

    /// Close the open text editor, dropping its element if it is blank.
    fn finish_editing(&mut self) {
        let Some((page_id, element_id)) = self.editing.take() else {
            return;
        };
        if let Some(page) = self.page_mut(page_id) {
            page.elements.retain(|element| match element {
                Element::Text(text) if text.id == element_id => !text.is_blank(),
                _ => true,
            });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Sources still shown by at least one page.
    pub fn referenced_sources(&self) -> BTreeSet<SourceId> {
        self.pages.iter().map(|page| page.source_id).collect()
    }

    pub fn apply(&mut self, action: WorkspaceAction) {
        apply_workspace_action(self, action);
    }

    fn new_page_id(&mut self) -> PageId {
        self.next_page_id += 1;
        PageId(self.next_page_id)
    }

    fn page_mut(&mut self, id: PageId) -> Option<&mut Page> {
        self.pages.iter_mut().find(|page| page.id == id)
    }

    fn push_source_pages(&mut self, source_id: SourceId, pages: Vec<SourcePage>) {
        for source_page in pages {
            let id = self.new_page_id();
            self.pages.push(Page::new(id, source_id, source_page));
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkspaceAction {
    /// Replace the page list with the pages of a freshly opened document.
    LoadDocument { file_name: String, source_id: SourceId, pages: Vec<SourcePage> },
    /// Append pages from another source to the end of the list.
    AppendPages { source_id: SourceId, pages: Vec<SourcePage> },
    MovePage { from: usize, to: usize },
    RotatePage { page_id: PageId },
    DeletePage { page_id: PageId },
    SetCurrentPage { index: usize },
    AddElement { page_id: PageId, element: Element },
    UpdateElement { page_id: PageId, element_id: ElementId, update: GeometryUpdate },
    UpdateStyle { page_id: PageId, element_id: ElementId, patch: StylePatch },
    RemoveElement { page_id: PageId, element_id: ElementId },
    /// Open the text editor on a text element, closing any other one first.
    BeginTextEdit { page_id: PageId, element_id: ElementId },
    /// Text editor lost focus: the edited element is dropped if blank.
    /// Ignored for elements that are not being edited.
    FinishTextEdit { page_id: PageId, element_id: ElementId },
    Reset,
}

pub fn apply_workspace_action(state: &mut Workspace, action: WorkspaceAction) {
    match action {
        WorkspaceAction::LoadDocument { file_name, source_id, pages } => {
            state.pages.clear();
            state.current_page = 0;
            state.editing = None;
            state.file_name = Some(file_name);
            state.push_source_pages(source_id, pages);
        }
        WorkspaceAction::AppendPages { source_id, pages } => {
            state.push_source_pages(source_id, pages);
        }
        WorkspaceAction::MovePage { from, to } => {
            if from >= state.pages.len() {
                return;
            }
            let to = to.min(state.pages.len() - 1);
            let page = state.pages.remove(from);
            state.pages.insert(to, page);
        }
        WorkspaceAction::RotatePage { page_id } => {
            if let Some(page) = state.page_mut(page_id) {
                page.rotation_delta = (page.rotation_delta + 90) % 360;
            }
        }
        WorkspaceAction::DeletePage { page_id } => {
            let Some(index) = state.page_index(page_id) else {
                return;
            };

            state.pages.remove(index);
            if state.editing.as_ref().is_some_and(|(page, _)| *page == page_id) {
                state.editing = None;
            }
            if state.current_page > index || state.current_page >= state.pages.len() {
                state.current_page = state.current_page.saturating_sub(1);
            }
        }
        WorkspaceAction::SetCurrentPage { index } => {
            state.current_page = index.min(state.pages.len().saturating_sub(1));
        }
        WorkspaceAction::AddElement { page_id, mut element } => {
            let Some(page) = state.page_mut(page_id) else {
                return;
            };
            if page.element(element.id()).is_some() {
                return;
            }

            element.apply_geometry(&GeometryUpdate::default());
            page.elements.push(element);
        }
        WorkspaceAction::UpdateElement { page_id, element_id, update } => {
            if let Some(element) =
                state.page_mut(page_id).and_then(|page| page.element_mut(&element_id))
            {
                element.apply_geometry(&update);
            }
        }
        WorkspaceAction::UpdateStyle { page_id, element_id, patch } => {
            if let Some(element) =
                state.page_mut(page_id).and_then(|page| page.element_mut(&element_id))
            {
                element.apply_style(&patch);
            }
        }
        WorkspaceAction::RemoveElement { page_id, element_id } => {
            if state.is_editing(page_id, &element_id) {
                state.editing = None;
            }
            if let Some(page) = state.page_mut(page_id) {
                page.elements.retain(|element| element.id() != &element_id);
            }
        }
        WorkspaceAction::BeginTextEdit { page_id, element_id } => {
            if state.is_editing(page_id, &element_id) {
                return;
            }
            let is_text = matches!(state.element(page_id, &element_id), Some(Element::Text(_)));
            if is_text {
                state.finish_editing();
                state.editing = Some((page_id, element_id));
            }
        }
        WorkspaceAction::FinishTextEdit { page_id, element_id } => {
            if state.is_editing(page_id, &element_id) {
                state.finish_editing();
            }
        }
        WorkspaceAction::Reset => {
            *state = Workspace::default();
        }
    }
}
