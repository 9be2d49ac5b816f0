//! Session description files for `folio-cli export`.
//!
//! ```json
//! {
//!   "sources": ["vertrag.pdf", "anlage.pdf"],
//!   "pages": [
//!     { "source": 1, "page": 1 },
//!     { "source": 0, "page": 2, "rotation": 90, "elements": [
//!       { "type": "text", "id": "text-1", "text": "Geprüft", "x": 10, "y": 12,
//!         "font_size": 16, "color": "#c00000", "font_family": "Helvetica" }
//!     ] }
//!   ]
//! }
//! ```
//!
//! Source paths are relative to the session file. Without `pages`, every page
//! of every source is exported in order.

use anyhow::{bail, Context, Result};
use folio_core::{Editor, EditorConfig, IncomingFile};
use folio_model::{Element, PageId, SourceId, WorkspaceAction};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct SessionFile {
    pub sources: Vec<PathBuf>,
    #[serde(default)]
    pub pages: Option<Vec<SessionPage>>,
}

#[derive(Debug, Deserialize)]
pub struct SessionPage {
    /// Index into `sources`.
    pub source: usize,
    /// 1-based page inside that source.
    pub page: u32,
    #[serde(default)]
    pub rotation: u32,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl SessionFile {
    pub fn read(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read session {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("invalid session file {}", path.display()))
    }

    /// Load every source into a fresh editor and replay the page list.
    pub fn build_editor(&self, base_dir: &Path, config: EditorConfig) -> Result<Editor> {
        if self.sources.is_empty() {
            bail!("session lists no sources");
        }

        let mut editor = Editor::new(config);
        let mut source_ids = Vec::with_capacity(self.sources.len());
        for path in &self.sources {
            let path = base_dir.join(path);
            source_ids.push(load_source(&mut editor, &path)?);
        }

        let Some(pages) = &self.pages else {
            return Ok(editor);
        };

        let targets = resolve_pages(&editor, &source_ids, pages)?;

        let unlisted: Vec<PageId> = editor
            .workspace()
            .pages()
            .iter()
            .map(|page| page.id())
            .filter(|id| !targets.contains(id))
            .collect();
        for page_id in unlisted {
            editor.apply(WorkspaceAction::DeletePage { page_id });
        }

        for (to, page_id) in targets.iter().enumerate() {
            if let Some(from) = editor.workspace().page_index(*page_id) {
                editor.apply(WorkspaceAction::MovePage { from, to });
            }
        }

        for (entry, &page_id) in pages.iter().zip(&targets) {
            for _ in 0..(entry.rotation / 90) % 4 {
                editor.apply(WorkspaceAction::RotatePage { page_id });
            }
            for element in &entry.elements {
                editor.apply(WorkspaceAction::AddElement { page_id, element: element.clone() });
            }
        }

        log::debug!("session replayed: {} page(s)", targets.len());
        Ok(editor)
    }
}

fn load_source(editor: &mut Editor, path: &Path) -> Result<SourceId> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let name = path.file_name().and_then(|name| name.to_str()).unwrap_or_default().to_owned();

    // No reported type: intake sniffs the content instead.
    editor
        .append(IncomingFile::new(name, "", bytes))
        .with_context(|| format!("failed to load {}", path.display()))
}

fn resolve_pages(
    editor: &Editor,
    source_ids: &[SourceId],
    pages: &[SessionPage],
) -> Result<Vec<PageId>> {
    let mut targets = Vec::with_capacity(pages.len());

    for entry in pages {
        let source_id = *source_ids
            .get(entry.source)
            .with_context(|| format!("page refers to unknown source index {}", entry.source))?;

        if entry.rotation % 90 != 0 {
            bail!("rotation must be a multiple of 90, got {}", entry.rotation);
        }

        let page_id = editor
            .workspace()
            .pages()
            .iter()
            .find(|page| page.source_id() == source_id && page.page_number() == entry.page)
            .map(|page| page.id())
            .with_context(|| format!("source {} has no page {}", entry.source, entry.page))?;

        if targets.contains(&page_id) {
            bail!("page {} of source {} is listed twice", entry.page, entry.source);
        }
        targets.push(page_id);
    }

    Ok(targets)
}
