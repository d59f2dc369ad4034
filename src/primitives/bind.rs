// ============================================================================
// spark-props - One-way Bindings
// Keep an external target in sync with a property
// ============================================================================
//
// This is the contract a UI binding layer relies on: one initial read and
// apply, then one observer that re-reads and re-applies on every change.
// The reverse direction (target -> property) is the caller's job, through
// ordinary writes.
// ============================================================================

use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use crate::core::error::PropError;
use crate::core::types::PropKey;
use crate::reactor::Reactor;

// =============================================================================
// SYNC
// =============================================================================

impl<V: Clone + 'static> Reactor<V> {
    /// Push `key`'s value into `apply` now and after every change.
    pub fn sync<F>(&self, key: impl Into<PropKey>, apply: F) -> Result<(), PropError>
    where
        F: Fn(V) + 'static,
    {
        let key = key.into();
        apply(self.get(&key)?);

        let reactor = self.downgrade();
        let observed = key.clone();
        self.bus().observe(
            observed,
            Rc::new(move || {
                let Some(reactor) = Reactor::upgrade(&reactor) else {
                    return Ok(());
                };
                let value = reactor.get(&key)?;
                trace!(%key, "binding refreshed");
                apply(value);
                Ok(())
            }),
        );
        Ok(())
    }

    /// A cell that always holds `key`'s latest value.
    ///
    /// # Example
    ///
    /// ```
    /// use spark_props::{Reactor, Value};
    ///
    /// let r = Reactor::<Value>::builder().stored("name", "No One").build().unwrap();
    /// let text = r.mirror("name").unwrap();
    /// assert_eq!(*text.borrow(), Value::from("No One"));
    ///
    /// r.set("name", "Arya").unwrap();
    /// assert_eq!(*text.borrow(), Value::from("Arya"));
    /// ```
    pub fn mirror(&self, key: impl Into<PropKey>) -> Result<Rc<RefCell<V>>, PropError> {
        let key = key.into();
        let cell = Rc::new(RefCell::new(self.get(&key)?));
        let target = cell.clone();
        self.sync(key, move |value| *target.borrow_mut() = value)?;
        Ok(cell)
    }
}

// =============================================================================
// TESTS
// =============================================================================
