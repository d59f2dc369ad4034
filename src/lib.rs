// ============================================================================
// spark-props - A Keyed Reactive Property Engine for Rust
// ============================================================================
//
// Properties are declared once, by name, as either stored (assigned from
// outside) or derived (computed lazily from other properties). Dependencies
// are discovered by watching which properties a derivation reads; derived
// values are memoized and invalidated exactly when something they read
// changes. Notification is synchronous: a write returns only after every
// affected cache is cleared and every observer has run.
// ============================================================================

#[macro_use]
mod macros;

pub mod core;
pub mod primitives;
pub mod reactivity;
pub mod reactor;

// Re-export core items at crate root for ergonomic access
pub use crate::core::context::{ContextGuard, EvalContext};
pub use crate::core::error::PropError;
pub use crate::core::types::{Decl, DeriveFn, Observer, PropKey, PropKind, Value, WatchFn};

pub use crate::primitives::derived::DerivedProp;
pub use crate::primitives::handle::Prop;
pub use crate::primitives::stored::StoredProp;

pub use crate::reactivity::signals::SignalBus;
pub use crate::reactivity::tracking::{ForwardSet, Tracker};

pub use crate::reactor::{Reactor, ReactorBuilder};

// =============================================================================
// TESTS
// =============================================================================
