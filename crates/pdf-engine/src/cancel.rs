//! Cooperative cancellation for page renders.
//!
//! A render worker polls [`CancellationToken::is_cancelled`] between units of
//! work and returns [`crate::RenderError::Cancelled`] once it flips.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Shared cancel flag. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Idempotent; every clone sees the cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
