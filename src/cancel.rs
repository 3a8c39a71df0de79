use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::solver::SolverFailure;

/// A cooperative cancellation flag shared between a caller and a running solve or deduction.
///
/// Checked before every engine call; a call already in progress is never interrupted.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token not yet raised.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the token for every clone of it.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether [`Self::cancel`] has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    pub(crate) fn check(&self) -> Result<(), SolverFailure> {
        if self.is_cancelled() {
            Err(SolverFailure::Cancelled)
        } else {
            Ok(())
        }
    }
}
