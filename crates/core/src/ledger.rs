//! The ledger facade.
//!
//! [`Ledger`] bundles the injected store and notifier. Its operations are
//! spread over the `trip`, `expense`, `account`, `settlement` and `balance`
//! modules as separate `impl` blocks.

use std::sync::Arc;

use crate::notify::Notifier;
use crate::store::LedgerStore;

/// Entry point for every ledger operation.
pub struct Ledger<S, N> {
    pub(crate) store: Arc<S>,
    pub(crate) notifier: Arc<N>,
}

impl<S, N> Clone for Ledger<S, N> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<S, N> std::fmt::Debug for Ledger<S, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger").finish_non_exhaustive()
    }
}

impl<S: LedgerStore, N: Notifier> Ledger<S, N> {
    /// Creates a ledger over a store and a notifier.
    #[must_use]
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self { store, notifier }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }
}
