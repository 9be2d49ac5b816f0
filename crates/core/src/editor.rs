//! Editor session: workspace state plus the source documents it shows.

use crate::config::EditorConfig;
use crate::export::{export_document, export_to_file, ExportOutcome};
use crate::intake::{validate_incoming, IncomingFile, IntakeError};
use crate::placement::place_text;
use folio_engine::{EngineError, SourceRegistry};
use folio_model::{ElementId, PageId, Point, SourceId, Workspace, WorkspaceAction};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("file rejected: {0}")]
    FileRejected(#[from] IntakeError),
    #[error("could not load document: {0}")]
    Load(#[from] EngineError),
}

impl EditorError {
    pub fn user_message(&self) -> String {
        match self {
            EditorError::FileRejected(err) => err.user_message(),
            // A PDF we cannot parse is as good as no PDF.
            EditorError::Load(_) => IntakeError::NotPdf { mime_type: String::new() }.user_message(),
        }
    }
}

/// Single writer for one editing session.
///
/// Every model change goes through [`Editor::apply`], which also drops source
/// documents that no page refers to anymore.
#[derive(Debug, Default)]
pub struct Editor {
    config: EditorConfig,
    workspace: Workspace,
    sources: SourceRegistry,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self { config, workspace: Workspace::default(), sources: SourceRegistry::new() }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn sources(&self) -> &SourceRegistry {
        &self.sources
    }

    /// Replace the current document with `file`.
    pub fn open(&mut self, file: IncomingFile) -> Result<SourceId, EditorError> {
        validate_incoming(&file, &self.config)?;
        let source_id = self.sources.load(file.bytes)?;
        let pages = self.sources.require(source_id)?.source_pages();

        log::info!("opened {} with {} pages", file.name, pages.len());
        self.apply(WorkspaceAction::LoadDocument { file_name: file.name, source_id, pages });
        Ok(source_id)
    }

    /// Append the pages of `file` to the current document.
    pub fn append(&mut self, file: IncomingFile) -> Result<SourceId, EditorError> {
        if self.workspace.is_empty() {
            return self.open(file);
        }

        validate_incoming(&file, &self.config)?;
        let source_id = self.sources.load(file.bytes)?;
        let pages = self.sources.require(source_id)?.source_pages();

        log::info!("appended {} pages from {}", pages.len(), file.name);
        self.apply(WorkspaceAction::AppendPages { source_id, pages });
        Ok(source_id)
    }

    pub fn apply(&mut self, action: WorkspaceAction) {
        self.workspace.apply(action);
        self.sources.retain_referenced(&self.workspace.referenced_sources());
    }

    /// Put an empty text element on `page_id` and open its editor.
    pub fn place_text(&mut self, page_id: PageId, at: Point) -> Option<ElementId> {
        self.workspace.page(page_id)?;

        let element = place_text(at, &self.config);
        let element_id = element.id().clone();
        self.apply(WorkspaceAction::AddElement { page_id, element });
        self.apply(WorkspaceAction::BeginTextEdit { page_id, element_id: element_id.clone() });
        Some(element_id)
    }

    /// Start over with an empty document.
    pub fn reset(&mut self) {
        self.apply(WorkspaceAction::Reset);
        self.sources.clear();
    }

    pub fn export(&self) -> ExportOutcome {
        export_document(&self.workspace, &self.sources, &self.config)
    }

    pub fn export_to(&self, dir: &Path) -> ExportOutcome {
        export_to_file(&self.workspace, &self.sources, &self.config, dir)
    }
}
