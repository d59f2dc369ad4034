// ============================================================================
// spark-props - Primitives Module
// Stored and derived properties, handles, and one-way bindings
// ============================================================================

pub mod bind;
pub mod derived;
pub mod handle;
pub mod stored;

// Re-export for convenience
pub use derived::DerivedProp;
pub use handle::Prop;
pub use stored::StoredProp;
