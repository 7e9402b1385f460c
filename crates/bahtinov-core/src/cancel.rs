use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Returned by [`CancelFlag::check`] once cancellation was requested.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("analysis cancelled")]
pub struct Cancelled;

/// Cooperative cancellation shared between a frame producer and the pipeline.
///
/// Clones observe the same flag. The pipeline only polls it between stages,
/// so a cancelled run stops at the next stage boundary.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every run observing this flag.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Cancelled)` if cancellation was requested.
    #[inline]
    pub fn check(&self) -> Result<(), Cancelled> {
        if self.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}
