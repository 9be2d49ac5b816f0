//! Render coordination for page bitmaps.
//!
//! Each page has at most one render in flight. Starting a new render for a
//! page cancels the previous one and waits for its worker to finish before the
//! new worker is spawned, so two renders never draw the same page at once.

use folio_engine::{CancellationToken, PageRenderer, RenderError, RgbaImage, SourceDocument};
use folio_model::PageId;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Message shown when a page bitmap could not be produced.
pub const PAGE_LOAD_FAILED: &str = "Fehler beim Laden der Seite";

/// Result of one page render as seen by the UI.
#[derive(Debug)]
pub enum RenderOutcome {
    Rendered(RgbaImage),
    /// Superseded or torn down; not an error.
    Cancelled,
    Failed { message: &'static str, detail: String },
}

impl RenderOutcome {
    fn from_result(page: PageId, result: Result<RgbaImage, RenderError>) -> Self {
        match result {
            Ok(image) => RenderOutcome::Rendered(image),
            Err(RenderError::Cancelled) => RenderOutcome::Cancelled,
            Err(err) => {
                log::warn!("render of page {} failed: {err}", page.0);
                RenderOutcome::Failed { message: PAGE_LOAD_FAILED, detail: err.to_string() }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    pub page_number: u32,
    pub scale: f32,
    /// Displayed rotation: the page's user rotation delta.
    pub rotation: u32,
}

struct InFlight {
    token: CancellationToken,
    worker: JoinHandle<RenderOutcome>,
}

impl InFlight {
    fn cancel_and_join(self, page: PageId) -> RenderOutcome {
        self.token.cancel();
        join(page, self.worker)
    }
}

fn join(page: PageId, worker: JoinHandle<RenderOutcome>) -> RenderOutcome {
    worker.join().unwrap_or_else(|_| {
        log::error!("render worker for page {} panicked", page.0);
        RenderOutcome::Failed { message: PAGE_LOAD_FAILED, detail: "worker panicked".to_owned() }
    })
}

/// Owns the render workers of one editor view.
pub struct RenderSession {
    renderer: Arc<dyn PageRenderer>,
    in_flight: HashMap<PageId, InFlight>,
}

impl RenderSession {
    pub fn new(renderer: Arc<dyn PageRenderer>) -> Self {
        Self { renderer, in_flight: HashMap::new() }
    }

    /// Start rendering `page`. Any earlier render of the same page is
    /// cancelled and awaited first.
    pub fn request(&mut self, page: PageId, source: Arc<SourceDocument>, request: RenderRequest) {
        if let Some(previous) = self.in_flight.remove(&page) {
            log::debug!("superseding render of page {}", page.0);
            previous.cancel_and_join(page);
        }

        let token = CancellationToken::new();
        let renderer = Arc::clone(&self.renderer);
        let worker_token = token.clone();
        let worker = thread::spawn(move || {
            let result = renderer.render(
                &source,
                request.page_number,
                request.scale,
                request.rotation,
                &worker_token,
            );
            RenderOutcome::from_result(page, result)
        });

        self.in_flight.insert(page, InFlight { token, worker });
    }

    /// Block until the render of `page` finishes. `None` if nothing is in flight.
    pub fn wait(&mut self, page: PageId) -> Option<RenderOutcome> {
        let in_flight = self.in_flight.remove(&page)?;
        Some(join(page, in_flight.worker))
    }

    /// Cancel the render of `page` and wait for its worker.
    pub fn cancel(&mut self, page: PageId) -> Option<RenderOutcome> {
        let in_flight = self.in_flight.remove(&page)?;
        Some(in_flight.cancel_and_join(page))
    }

    pub fn cancel_all(&mut self) {
        for (page, in_flight) in self.in_flight.drain() {
            in_flight.cancel_and_join(page);
        }
    }

    pub fn is_rendering(&self, page: PageId) -> bool {
        self.in_flight.contains_key(&page)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

impl Drop for RenderSession {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
