//! Scoped ownership of an ephemeral store

use std::fmt;
use std::ops::{Deref, DerefMut};

use cadence_domain::Result;
use tracing::{debug, error, warn};

use super::ports::CatalogStore;

/// Exclusive handle on a store for the duration of one run.
///
/// The store is torn down exactly once: by [`StoreLease::release`], or on
/// drop when the lease goes out of scope without being released (including
/// during a panic). Teardown errors on the drop path can only be logged.
pub struct StoreLease {
    store: Box<dyn CatalogStore>,
    label: String,
    released: bool,
}

impl StoreLease {
    /// Take ownership of `store`; it is torn down when the lease ends.
    pub fn new(store: Box<dyn CatalogStore>, label: impl Into<String>) -> Self {
        Self { store, label: label.into(), released: false }
    }

    /// Where the store lives, e.g. a temp directory or schema name.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Tear the store down now and report any failure.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        debug!(store = %self.label, kind = %self.store.kind(), "releasing store");
        self.store.teardown()
    }
}

impl Deref for StoreLease {
    type Target = dyn CatalogStore;

    fn deref(&self) -> &Self::Target {
        self.store.as_ref()
    }
}

impl DerefMut for StoreLease {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.store.as_mut()
    }
}

impl Drop for StoreLease {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        if std::thread::panicking() {
            warn!(store = %self.label, "releasing store while unwinding");
        }
        if let Err(err) = self.store.teardown() {
            error!(store = %self.label, error = %err, "store teardown failed");
        }
    }
}

impl fmt::Debug for StoreLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreLease")
            .field("label", &self.label)
            .field("kind", &self.store.kind())
            .field("released", &self.released)
            .finish()
    }
}
