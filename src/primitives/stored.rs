// ============================================================================
// spark-props - Stored Property
// A plain mutable value whose reads become edges and whose writes notify
// ============================================================================

use std::cell::RefCell;

use tracing::{debug, warn};

use crate::core::error::PropError;
use crate::core::types::PropKey;
use crate::reactivity::signals::SignalBus;
use crate::reactivity::tracking::{ForwardSet, Tracker};

/// A stored property: holds its value directly, no caching involved.
pub struct StoredProp<V> {
    key: PropKey,
    value: RefCell<V>,
    /// Derived keys that read this property
    forward: ForwardSet,
}

impl<V: Clone> StoredProp<V> {
    pub fn new(key: PropKey, value: V) -> Self {
        Self {
            key,
            value: RefCell::new(value),
            forward: ForwardSet::default(),
        }
    }

    pub fn key(&self) -> &PropKey {
        &self.key
    }

    /// Read the value, registering an edge if a derivation is in progress.
    pub fn read(&self, tracker: &Tracker) -> V {
        tracker.depend(&self.forward, &self.key);
        self.peek()
    }

    /// Read the value without touching the dependency graph.
    pub fn peek(&self) -> V {
        self.value.borrow().clone()
    }

    /// Replace the value and announce the change.
    ///
    /// Dependents are pruned and invalidated first (cascading through
    /// derived values), then observers of this key fire, so they see the
    /// settled graph.
    pub fn write(&self, value: V, tracker: &Tracker, bus: &SignalBus) -> Result<(), PropError> {
        if let Some(target) = tracker.context().innermost_derivation() {
            warn!(key = %self.key, %target, "write rejected inside derivation");
            return Err(PropError::WriteDuringDerivation {
                key: self.key.clone(),
                target,
            });
        }

        *self.value.borrow_mut() = value;
        debug!(key = %self.key, dependents = self.forward.borrow().len(), "stored write");

        tracker.propagate(&self.forward, &self.key, bus)?;
        bus.notify(self.key.as_str())
    }

    /// Current forward edge set, stale entries included.
    pub fn dependents(&self) -> Vec<PropKey> {
        self.forward.borrow().iter().cloned().collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
