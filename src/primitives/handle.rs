// ============================================================================
// spark-props - Property Handles
// A typed, key-bound view of one property of a reactor
// ============================================================================

use std::fmt;

use crate::core::error::PropError;
use crate::core::types::{PropKey, PropKind, Value};
use crate::reactor::Reactor;

/// A handle to one declared property.
///
/// Holds a strong reference to its reactor, so do not capture a handle
/// inside that same reactor's derivations or observers; use the reactor
/// passed to the derivation instead.
///
/// # Example
///
/// ```
/// use spark_props::Reactor;
///
/// let r = Reactor::<i64>::builder()
///     .stored("x", 2)
///     .derived("double", |r| Ok(r.get("x")? * 2))
///     .build()
///     .unwrap();
///
/// let x = r.prop("x").unwrap();
/// let double = r.prop("double").unwrap();
/// x.write(21).unwrap();
/// assert_eq!(double.read().unwrap(), 42);
/// ```
pub struct Prop<V = Value> {
    reactor: Reactor<V>,
    key: PropKey,
    kind: PropKind,
}

impl<V: Clone + 'static> Prop<V> {
    pub(crate) fn new(reactor: Reactor<V>, key: PropKey, kind: PropKind) -> Self {
        Self { reactor, key, kind }
    }

    pub fn key(&self) -> &PropKey {
        &self.key
    }

    pub fn kind(&self) -> PropKind {
        self.kind
    }

    pub fn is_derived(&self) -> bool {
        self.kind == PropKind::Derived
    }

    pub fn read(&self) -> Result<V, PropError> {
        self.reactor.get(&self.key)
    }

    /// Write the value. Fails with [`PropError::ReadOnly`] for derived handles.
    pub fn write(&self, value: impl Into<V>) -> Result<(), PropError> {
        self.reactor.set(&self.key, value)
    }

    pub fn update(&self, f: impl FnOnce(&mut V)) -> Result<(), PropError> {
        self.reactor.update(&self.key, f)
    }

    pub fn is_fresh(&self) -> Result<bool, PropError> {
        self.reactor.is_fresh(&self.key)
    }

    /// Register an observer on this handle's key.
    pub fn observe(&self, observer: impl Fn() + 'static) {
        self.reactor.observe(&self.key, observer);
    }

    pub fn reactor(&self) -> &Reactor<V> {
        &self.reactor
    }
}

impl<V> Clone for Prop<V> {
    fn clone(&self) -> Self {
        Self {
            reactor: self.reactor.clone(),
            key: self.key.clone(),
            kind: self.kind,
        }
    }
}

impl<V> fmt::Debug for Prop<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prop")
            .field("key", &self.key)
            .field("kind", &self.kind)
            .finish()
    }
}
