//! A minimal cancellation handle (spec §5: "every operation accepts an
//! abstract cancellation handle").

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};

/// A cooperative cancellation token. Cloning shares the same underlying
/// flag; cancelling any clone cancels all of them.
#[derive(Debug, Clone, Default)]
pub struct Cancel(Arc<AtomicBool>);

impl Cancel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Observed between every blocking I/O step (query execution,
    /// statement preparation, metadata introspection, and before each row
    /// fetch during prefix iteration).
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    /// A token that is never cancelled, for callers with no cancellation
    /// source of their own.
    pub fn never() -> Self {
        Self::new()
    }
}
