// ============================================================================
// spark-props - Core Module
// Keys, values, declarations, errors, and the evaluation context
// ============================================================================

pub mod context;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use context::{ContextGuard, EvalContext};
pub use error::PropError;
pub use types::{Decl, DeriveFn, Observer, PropKey, PropKind, Value, WatchFn};
