// ============================================================================
// spark-props - Derived Property
// Lazy, memoized values computed from other properties
// ============================================================================
//
// A derived property is stale (no cache) or fresh (cache populated). It
// starts stale; reading makes it fresh; a notification on its own key makes
// it stale again and cascades to whatever depends on it.
//
// The dependency graph must be acyclic. A derivation that (transitively)
// reads itself recurses until the stack is exhausted.
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tracing::debug;

use crate::core::error::PropError;
use crate::core::types::{DeriveFn, Observer, PropKey};
use crate::reactivity::tracking::ForwardSet;
use crate::reactor::{Reactor, ReactorInner};

// =============================================================================
// DERIVED PROP
// =============================================================================

pub struct DerivedProp<V> {
    key: PropKey,
    compute: DeriveFn<V>,
    /// None = stale
    cache: RefCell<Option<V>>,
    /// Derived keys that read this property
    forward: ForwardSet,
    evaluations: Cell<u64>,
}

impl<V: Clone + 'static> DerivedProp<V> {
    pub fn new(key: PropKey, compute: DeriveFn<V>) -> Self {
        Self {
            key,
            compute,
            cache: RefCell::new(None),
            forward: ForwardSet::default(),
            evaluations: Cell::new(0),
        }
    }

    pub fn key(&self) -> &PropKey {
        &self.key
    }

    /// Get the value, evaluating the derivation if the cache is stale.
    ///
    /// If another derivation is reading this one, that derivation becomes a
    /// dependent first. Reads made by this derivation are attributed to this
    /// key, and the caller's context is restored afterwards, whether the
    /// derivation succeeds or fails. A failed derivation leaves the cache
    /// stale so the next read tries again.
    pub fn read(&self, reactor: &Reactor<V>) -> Result<V, PropError> {
        let tracker = reactor.tracker();
        tracker.depend(&self.forward, &self.key);

        let cached = self.cache.borrow().clone();
        if let Some(value) = cached {
            return Ok(value);
        }

        let _guard = tracker.enter(&self.key);
        tracker.reset_subs(&self.key);

        let value = (self.compute)(reactor)?;
        let evaluations = self.evaluations.get() + 1;
        self.evaluations.set(evaluations);
        debug!(key = %self.key, evaluations, "derived evaluated");

        *self.cache.borrow_mut() = Some(value.clone());
        Ok(value)
    }

    /// Drop the cache and cascade to live dependents.
    pub fn invalidate(&self, reactor: &Reactor<V>) -> Result<(), PropError> {
        let was_fresh = self.cache.borrow_mut().take().is_some();
        debug!(key = %self.key, was_fresh, "derived invalidated");

        reactor
            .tracker()
            .propagate(&self.forward, &self.key, reactor.bus())
    }

    pub fn is_fresh(&self) -> bool {
        self.cache.borrow().is_some()
    }

    /// How many times the derivation has completed successfully.
    pub fn evaluations(&self) -> u64 {
        self.evaluations.get()
    }

    pub fn dependents(&self) -> Vec<PropKey> {
        self.forward.borrow().iter().cloned().collect()
    }
}

/// The observer a derived property registers on its own key at construction.
pub(crate) fn invalidation_observer<V: Clone + 'static>(
    reactor: Weak<ReactorInner<V>>,
    prop: Rc<DerivedProp<V>>,
) -> Observer {
    Rc::new(move || match Reactor::upgrade(&reactor) {
        Some(reactor) => prop.invalidate(&reactor),
        None => Ok(()),
    })
}

// =============================================================================
// TESTS
// =============================================================================
