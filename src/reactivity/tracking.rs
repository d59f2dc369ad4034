// ============================================================================
// spark-props - Dependency Tracking
// Evaluation context plus the edge sets between properties and dependents
// ============================================================================
//
// Edges are stored twice:
// - forward ("deps"): owned by each property, the derived keys that read it
// - reverse ("subs"): owned here, per derived key, what it read during its
//   most recent evaluation
//
// The reverse set is cleared whenever a derived value re-evaluates, so a
// forward edge is live only while the dependent still lists the source in
// its subs. Stale forward edges are dropped lazily, right before a property
// notifies its dependents.
//
// Borrow safety follows the "collect-then-mutate" pattern: edge sets are
// copied out before any notification runs, since notification re-enters
// this module.
// ============================================================================

use std::cell::RefCell;

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

use crate::core::context::{ContextGuard, EvalContext};
use crate::core::error::PropError;
use crate::core::types::PropKey;
use crate::reactivity::signals::SignalBus;

/// A property's forward edge set: derived keys that currently depend on it.
pub type ForwardSet = RefCell<IndexSet<PropKey>>;

// =============================================================================
// TRACKER
// =============================================================================

/// Dependency tracker for one reactor.
#[derive(Debug, Default)]
pub struct Tracker {
    context: EvalContext,
    subs: RefCell<IndexMap<PropKey, IndexSet<PropKey>>>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self) -> &EvalContext {
        &self.context
    }

    /// Start evaluating `key`: reads are attributed to it until the guard drops.
    pub fn enter(&self, key: &PropKey) -> ContextGuard<'_> {
        self.context.enter(key.clone())
    }

    // =========================================================================
    // DEPEND - Register an edge on read
    // =========================================================================

    /// Record that the active evaluation target read `key`.
    ///
    /// No-op outside a derivation, inside an untracked region, or when the
    /// target is `key` itself. Idempotent within one evaluation.
    pub fn depend(&self, forward: &ForwardSet, key: &PropKey) {
        let Some(target) = self.context.current() else {
            return;
        };
        if &target == key {
            return;
        }

        if forward.borrow_mut().insert(target.clone()) {
            trace!(source = %key, dependent = %target, "edge registered");
        }
        self.subs
            .borrow_mut()
            .entry(target)
            .or_default()
            .insert(key.clone());
    }

    /// Forget everything `key` read, ahead of a fresh evaluation.
    pub fn reset_subs(&self, key: &PropKey) {
        self.subs
            .borrow_mut()
            .entry(key.clone())
            .or_default()
            .clear();
    }

    // =========================================================================
    // PRUNE + NOTIFY
    // =========================================================================

    /// The entries of `forward` whose dependent still lists `key` in its subs.
    pub fn prune_stale_forward(&self, forward: &IndexSet<PropKey>, key: &PropKey) -> IndexSet<PropKey> {
        let subs = self.subs.borrow();
        forward
            .iter()
            .filter(|dependent| subs.get(*dependent).is_some_and(|read| read.contains(key)))
            .cloned()
            .collect()
    }

    /// Notify every key in `forward`, in order, stopping at the first failure.
    ///
    /// Dependents after the failing one are not notified, so their caches
    /// stay as they were.
    pub fn notify_forward(&self, forward: &IndexSet<PropKey>, bus: &SignalBus) -> Result<(), PropError> {
        for dependent in forward {
            bus.notify(dependent.as_str())?;
        }
        Ok(())
    }

    /// Prune `key`'s forward set in place, then notify the survivors.
    pub fn propagate(&self, forward: &ForwardSet, key: &PropKey, bus: &SignalBus) -> Result<(), PropError> {
        let live = self.prune_stale_forward(&forward.borrow(), key);
        let pruned = forward.borrow().len() - live.len();
        if pruned > 0 {
            debug!(%key, pruned, "stale dependents pruned");
        }
        *forward.borrow_mut() = live.clone();

        self.notify_forward(&live, bus)
    }

    // =========================================================================
    // INTROSPECTION
    // =========================================================================

    /// What `key` read during its most recent evaluation.
    pub fn dependencies(&self, key: &str) -> Vec<PropKey> {
        self.subs
            .borrow()
            .get(key)
            .map(|read| read.iter().cloned().collect())
            .unwrap_or_default()
    }
}

// =============================================================================
// TESTS
// =============================================================================
