// ============================================================================
// spark-props - Reactor
// One engine instance: declared properties, their graph, and the signal bus
// ============================================================================
//
// A reactor owns everything the engine needs: the ordered map of property
// handles, the dependency tracker (with its evaluation context), and the
// signal bus. Nothing is thread-local, so independent reactors never share
// edges or context.
//
// Observers stored on the bus refer back to the reactor through `Weak`, so a
// reactor is freed as soon as the last `Reactor` handle is dropped.
// ============================================================================

use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, debug_span, warn};

use crate::core::error::PropError;
use crate::core::types::{Decl, DeriveFn, PropKey, PropKind, Value, WatchFn};
use crate::primitives::derived::{invalidation_observer, DerivedProp};
use crate::primitives::handle::Prop;
use crate::primitives::stored::StoredProp;
use crate::reactivity::signals::SignalBus;
use crate::reactivity::tracking::Tracker;

// =============================================================================
// PROPERTY
// =============================================================================

/// A declared property: the handle behind one key.
pub(crate) enum Property<V> {
    Stored(Rc<StoredProp<V>>),
    Derived(Rc<DerivedProp<V>>),
}

impl<V> Property<V> {
    fn kind(&self) -> PropKind {
        match self {
            Property::Stored(_) => PropKind::Stored,
            Property::Derived(_) => PropKind::Derived,
        }
    }
}

// =============================================================================
// REACTOR INNER
// =============================================================================

pub(crate) struct ReactorInner<V> {
    label: Option<String>,
    props: IndexMap<PropKey, Property<V>>,
    tracker: Tracker,
    bus: SignalBus,
}

// =============================================================================
// REACTOR
// =============================================================================

/// A set of stored and derived properties with automatic dependency tracking.
///
/// Cloning is cheap and yields another handle to the same reactor.
///
/// # Example
///
/// ```
/// use spark_props::{Reactor, Value};
///
/// let got = Reactor::<Value>::builder()
///     .stored("house", "Stark")
///     .derived("banner", |r| Ok(format!("House {}", r.get("house")?).into()))
///     .build()
///     .unwrap();
///
/// assert_eq!(got.get("banner").unwrap(), Value::from("House Stark"));
/// got.set("house", "Tyrell").unwrap();
/// assert_eq!(got.get("banner").unwrap(), Value::from("House Tyrell"));
/// ```
pub struct Reactor<V = Value> {
    pub(crate) inner: Rc<ReactorInner<V>>,
}

impl<V> Clone for Reactor<V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V: Clone + 'static> Reactor<V> {
    // =========================================================================
    // CONSTRUCTION
    // =========================================================================

    /// Build a reactor from property declarations.
    pub fn new<K>(decls: impl IntoIterator<Item = (K, Decl<V>)>) -> Result<Self, PropError>
    where
        K: Into<PropKey>,
    {
        Self::builder().decls(decls).build()
    }

    /// Build a reactor from property declarations and watchers.
    ///
    /// Each watcher is subscribed to the key of the same name and runs with
    /// the reactor as scope every time that key is notified.
    pub fn with_watchers<K, W>(
        decls: impl IntoIterator<Item = (K, Decl<V>)>,
        watchers: impl IntoIterator<Item = (W, WatchFn<V>)>,
    ) -> Result<Self, PropError>
    where
        K: Into<PropKey>,
        W: Into<PropKey>,
    {
        let mut builder = Self::builder().decls(decls);
        for (key, watcher) in watchers {
            builder.watchers.push((key.into(), watcher));
        }
        builder.build()
    }

    pub fn builder() -> ReactorBuilder<V> {
        ReactorBuilder::new()
    }

    fn install(
        label: Option<String>,
        decls: Vec<(PropKey, Decl<V>)>,
        watchers: Vec<(PropKey, WatchFn<V>)>,
    ) -> Result<Self, PropError> {
        let span = debug_span!("reactor", label = label.as_deref().unwrap_or("anonymous"));
        let _enter = span.enter();

        let mut seen = IndexSet::with_capacity(decls.len());
        for (key, _) in &decls {
            if !seen.insert(key) {
                warn!(%key, "duplicate declaration");
                return Err(PropError::DuplicateKey(key.clone()));
            }
        }

        let inner = Rc::new_cyclic(|weak: &Weak<ReactorInner<V>>| {
            let bus = SignalBus::new();
            let mut props = IndexMap::with_capacity(decls.len());

            for (key, decl) in decls {
                let prop = match decl {
                    Decl::Stored(value) => Property::Stored(Rc::new(StoredProp::new(key.clone(), value))),
                    Decl::Derived(compute) => {
                        let prop = Rc::new(DerivedProp::new(key.clone(), compute));
                        bus.observe(key.clone(), invalidation_observer(weak.clone(), prop.clone()));
                        Property::Derived(prop)
                    }
                };
                props.insert(key, prop);
            }

            // Watchers go after every invalidation observer, so a watcher on a
            // derived key always sees that key already stale.
            for (key, watcher) in watchers {
                let weak = weak.clone();
                bus.observe(
                    key,
                    Rc::new(move || match Reactor::upgrade(&weak) {
                        Some(reactor) => watcher(&reactor),
                        None => Ok(()),
                    }),
                );
            }

            ReactorInner {
                label,
                props,
                tracker: Tracker::new(),
                bus,
            }
        });

        debug!(properties = inner.props.len(), "reactor built");
        Ok(Self { inner })
    }

    pub(crate) fn upgrade(weak: &Weak<ReactorInner<V>>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    pub(crate) fn downgrade(&self) -> Weak<ReactorInner<V>> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn tracker(&self) -> &Tracker {
        &self.inner.tracker
    }

    pub(crate) fn bus(&self) -> &SignalBus {
        &self.inner.bus
    }

    fn property(&self, key: &str) -> Result<&Property<V>, PropError> {
        self.inner
            .props
            .get(key)
            .ok_or_else(|| PropError::UnknownKey(PropKey::new(key)))
    }

    // =========================================================================
    // READ / WRITE
    // =========================================================================

    /// Read a property.
    ///
    /// Inside a derivation this registers the property as a dependency of
    /// the derivation being evaluated.
    pub fn get(&self, key: impl AsRef<str>) -> Result<V, PropError> {
        match self.property(key.as_ref())? {
            Property::Stored(prop) => Ok(prop.read(self.tracker())),
            Property::Derived(prop) => prop.read(self),
        }
    }

    /// Write a stored property.
    ///
    /// Dependents are invalidated, then observers of `key` fire, all before
    /// this returns. Derived properties are read-only: writing one changes
    /// nothing and returns [`PropError::ReadOnly`].
    pub fn set(&self, key: impl AsRef<str>, value: impl Into<V>) -> Result<(), PropError> {
        match self.property(key.as_ref())? {
            Property::Stored(prop) => prop.write(value.into(), self.tracker(), self.bus()),
            Property::Derived(prop) => {
                warn!(key = %prop.key(), "write to derived property ignored");
                Err(PropError::ReadOnly(prop.key().clone()))
            }
        }
    }

    /// Modify a stored property in place, then notify as [`set`](Self::set) does.
    pub fn update(&self, key: impl AsRef<str>, f: impl FnOnce(&mut V)) -> Result<(), PropError> {
        match self.property(key.as_ref())? {
            Property::Stored(prop) => {
                let mut value = prop.peek();
                f(&mut value);
                prop.write(value, self.tracker(), self.bus())
            }
            Property::Derived(prop) => Err(PropError::ReadOnly(prop.key().clone())),
        }
    }

    /// Run `f` with dependency tracking suspended.
    pub fn untrack<R>(&self, f: impl FnOnce() -> R) -> R {
        let _quiet = self.tracker().context().enter_untracked();
        f()
    }

    /// A typed handle to one property.
    pub fn prop(&self, key: impl AsRef<str>) -> Result<Prop<V>, PropError> {
        let key = key.as_ref();
        let kind = self.property(key)?.kind();
        Ok(Prop::new(self.clone(), PropKey::new(key), kind))
    }

    // =========================================================================
    // SIGNAL BUS PASSTHROUGH
    // =========================================================================

    /// Register `observer` to run every time `key` is notified.
    ///
    /// Any key is accepted, declared or not.
    pub fn observe(&self, key: impl Into<PropKey>, observer: impl Fn() + 'static) {
        self.bus().observe(
            key,
            Rc::new(move || {
                observer();
                Ok(())
            }),
        );
    }

    /// Like [`observe`](Self::observe), for observers that can fail.
    ///
    /// A failure stops the remaining observers of that notification and is
    /// returned from the write or `notify` that triggered it.
    pub fn try_observe(
        &self,
        key: impl Into<PropKey>,
        observer: impl Fn() -> Result<(), PropError> + 'static,
    ) {
        self.bus().observe(key, Rc::new(observer));
    }

    /// Fire every observer of `key`, as if it had changed.
    pub fn notify(&self, key: impl AsRef<str>) -> Result<(), PropError> {
        self.bus().notify(key.as_ref())
    }

    // =========================================================================
    // INTROSPECTION
    // =========================================================================

    pub fn label(&self) -> Option<&str> {
        self.inner.label.as_deref()
    }

    /// Declared keys, in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &PropKey> {
        self.inner.props.keys()
    }

    pub fn contains(&self, key: impl AsRef<str>) -> bool {
        self.inner.props.contains_key(key.as_ref())
    }

    pub fn kind(&self, key: impl AsRef<str>) -> Result<PropKind, PropError> {
        Ok(self.property(key.as_ref())?.kind())
    }

    /// Whether reading `key` would be served without evaluating anything.
    /// Stored properties are always fresh.
    pub fn is_fresh(&self, key: impl AsRef<str>) -> Result<bool, PropError> {
        Ok(match self.property(key.as_ref())? {
            Property::Stored(_) => true,
            Property::Derived(prop) => prop.is_fresh(),
        })
    }

    /// Completed evaluations of a derived property (always 0 for stored).
    pub fn evaluations(&self, key: impl AsRef<str>) -> Result<u64, PropError> {
        Ok(match self.property(key.as_ref())? {
            Property::Stored(_) => 0,
            Property::Derived(prop) => prop.evaluations(),
        })
    }

    /// The forward edge set of `key`: derived keys recorded as reading it.
    ///
    /// Entries are pruned lazily, on the next change notification of `key`.
    pub fn dependents(&self, key: impl AsRef<str>) -> Result<Vec<PropKey>, PropError> {
        Ok(match self.property(key.as_ref())? {
            Property::Stored(prop) => prop.dependents(),
            Property::Derived(prop) => prop.dependents(),
        })
    }

    /// What derived `key` read during its most recent evaluation.
    pub fn dependencies(&self, key: impl AsRef<str>) -> Vec<PropKey> {
        self.tracker().dependencies(key.as_ref())
    }

    pub fn observer_count(&self, key: impl AsRef<str>) -> usize {
        self.bus().observer_count(key.as_ref())
    }

    /// Read every property, untracked, in declaration order.
    pub fn snapshot(&self) -> Result<IndexMap<PropKey, V>, PropError> {
        self.untrack(|| {
            self.inner
                .props
                .keys()
                .map(|key| Ok((key.clone(), self.get(key)?)))
                .collect()
        })
    }
}

impl<V> fmt::Debug for Reactor<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reactor")
            .field("label", &self.inner.label)
            .field(
                "props",
                &self
                    .inner
                    .props
                    .iter()
                    .map(|(key, prop)| (key, prop.kind()))
                    .collect::<Vec<_>>(),
            )
            .field("bus", &self.inner.bus)
            .finish()
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// Collects declarations and watchers, then installs them in order.
pub struct ReactorBuilder<V = Value> {
    label: Option<String>,
    decls: Vec<(PropKey, Decl<V>)>,
    watchers: Vec<(PropKey, WatchFn<V>)>,
}

impl<V: Clone + 'static> ReactorBuilder<V> {
    pub fn new() -> Self {
        Self {
            label: None,
            decls: Vec::new(),
            watchers: Vec::new(),
        }
    }

    /// Name used in log output for this reactor.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn stored(self, key: impl Into<PropKey>, value: impl Into<V>) -> Self {
        self.decl(key, Decl::Stored(value.into()))
    }

    pub fn derived<F>(self, key: impl Into<PropKey>, compute: F) -> Self
    where
        F: Fn(&Reactor<V>) -> Result<V, PropError> + 'static,
    {
        let compute: DeriveFn<V> = Rc::new(compute);
        self.decl(key, Decl::Derived(compute))
    }

    pub fn decl(mut self, key: impl Into<PropKey>, decl: Decl<V>) -> Self {
        self.decls.push((key.into(), decl));
        self
    }

    pub fn decls<K: Into<PropKey>>(mut self, decls: impl IntoIterator<Item = (K, Decl<V>)>) -> Self {
        self.decls
            .extend(decls.into_iter().map(|(key, decl)| (key.into(), decl)));
        self
    }

    /// Run `watcher` every time `key` is notified, with the reactor as scope.
    pub fn watch<F>(mut self, key: impl Into<PropKey>, watcher: F) -> Self
    where
        F: Fn(&Reactor<V>) -> Result<(), PropError> + 'static,
    {
        self.watchers.push((key.into(), Rc::new(watcher)));
        self
    }

    pub fn build(self) -> Result<Reactor<V>, PropError> {
        Reactor::install(self.label, self.decls, self.watchers)
    }
}

impl<V: Clone + 'static> Default for ReactorBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================
