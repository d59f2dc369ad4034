// ============================================================================
// spark-props - Reactivity Module
// Change notification and dependency edge bookkeeping
// ============================================================================

pub mod signals;
pub mod tracking;

pub use signals::SignalBus;
pub use tracking::{ForwardSet, Tracker};
