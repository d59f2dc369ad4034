// ============================================================================
// spark-props - Signal Bus
// Keyed publish/subscribe registry for "this property changed"
// ============================================================================

use std::cell::RefCell;

use indexmap::IndexMap;
use tracing::trace;

use crate::core::error::PropError;
use crate::core::types::{Observer, PropKey};

/// Ordered observer lists per key.
///
/// Observers are append-only: there is no unsubscribe, and registering the
/// same callback twice makes it fire twice.
#[derive(Default)]
pub struct SignalBus {
    signals: RefCell<IndexMap<PropKey, Vec<Observer>>>,
}

impl SignalBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `observer` to the list for `key`, creating the list if absent.
    pub fn observe(&self, key: impl Into<PropKey>, observer: Observer) {
        let key = key.into();
        trace!(%key, "observer registered");
        self.signals.borrow_mut().entry(key).or_default().push(observer);
    }

    /// Invoke every observer of `key` in registration order.
    ///
    /// The first failing observer aborts the remaining ones and its error is
    /// returned. Unknown keys are a no-op.
    pub fn notify(&self, key: &str) -> Result<(), PropError> {
        // Collect first: observers may register more observers or write
        // properties, both of which borrow the registry again.
        let observers: Vec<Observer> = match self.signals.borrow().get(key) {
            Some(list) if !list.is_empty() => list.clone(),
            _ => return Ok(()),
        };

        trace!(key, count = observers.len(), "notify");
        for observer in observers {
            observer()?;
        }
        Ok(())
    }

    /// Number of observers registered on `key`.
    pub fn observer_count(&self, key: &str) -> usize {
        self.signals.borrow().get(key).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for SignalBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let signals = self.signals.borrow();
        f.debug_map()
            .entries(signals.iter().map(|(k, v)| (k, v.len())))
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================
