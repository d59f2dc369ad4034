// ============================================================================
// spark-props - Type Definitions
// Keys, declarations, the dynamic value type, and callable aliases
// ============================================================================

use std::borrow::Borrow;
use std::fmt;
use std::rc::Rc;

use super::error::PropError;
use crate::reactor::Reactor;

// =============================================================================
// PROPERTY KEY
// =============================================================================

/// Name of one stored or derived property within a reactor.
///
/// Cheap to clone (shared `Rc<str>`), and borrowable as `&str` so maps keyed
/// by `PropKey` can be queried with plain string slices.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropKey(Rc<str>);

impl PropKey {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Rc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PropKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PropKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PropKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for PropKey {
    fn from(name: String) -> Self {
        Self(Rc::from(name))
    }
}

impl From<&PropKey> for PropKey {
    fn from(key: &PropKey) -> Self {
        key.clone()
    }
}

impl fmt::Display for PropKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for PropKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

// =============================================================================
// CALLABLE ALIASES
// =============================================================================

/// A derivation: computes a derived property's value with the reactor as scope.
pub type DeriveFn<V> = Rc<dyn Fn(&Reactor<V>) -> Result<V, PropError>>;

/// A watcher: invoked with the reactor as scope whenever its key is notified.
pub type WatchFn<V> = Rc<dyn Fn(&Reactor<V>) -> Result<(), PropError>>;

/// A zero-argument observer registered on the signal bus.
pub type Observer = Rc<dyn Fn() -> Result<(), PropError>>;

// =============================================================================
// DECLARATIONS
// =============================================================================

/// What kind of property a key names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropKind {
    Stored,
    Derived,
}

/// A property declaration: either a stored initial value or a derivation.
pub enum Decl<V> {
    Stored(V),
    Derived(DeriveFn<V>),
}

impl<V> Decl<V> {
    /// Declare a stored property with its initial value.
    pub fn stored(value: impl Into<V>) -> Self {
        Decl::Stored(value.into())
    }

    /// Declare a derived property.
    ///
    /// # Example
    ///
    /// ```
    /// use spark_props::{Decl, Reactor};
    ///
    /// let r: Reactor<i64> = Reactor::new([
    ///     ("x", Decl::stored(2)),
    ///     ("double", Decl::derived(|r: &Reactor<i64>| Ok(r.get("x")? * 2))),
    /// ])
    /// .unwrap();
    /// assert_eq!(r.get("double").unwrap(), 4);
    /// ```
    pub fn derived<F>(f: F) -> Self
    where
        F: Fn(&Reactor<V>) -> Result<V, PropError> + 'static,
    {
        Decl::Derived(Rc::new(f))
    }

    pub fn kind(&self) -> PropKind {
        match self {
            Decl::Stored(_) => PropKind::Stored,
            Decl::Derived(_) => PropKind::Derived,
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Decl<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decl::Stored(v) => f.debug_tuple("Stored").field(v).finish(),
            Decl::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

// =============================================================================
// DYNAMIC VALUE
// =============================================================================

/// A dynamically typed property value, for property sets that mix types.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Name of the variant, used in type mismatch errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Result<bool, PropError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(other.mismatch("bool")),
        }
    }

    pub fn as_int(&self) -> Result<i64, PropError> {
        match self {
            Value::Int(n) => Ok(*n),
            other => Err(other.mismatch("int")),
        }
    }

    /// Numeric view; ints widen to floats.
    pub fn as_float(&self) -> Result<f64, PropError> {
        match self {
            Value::Float(n) => Ok(*n),
            Value::Int(n) => Ok(*n as f64),
            other => Err(other.mismatch("float")),
        }
    }

    pub fn as_str(&self) -> Result<&str, PropError> {
        match self {
            Value::Text(s) => Ok(s),
            other => Err(other.mismatch("text")),
        }
    }

    fn mismatch(&self, expected: &'static str) -> PropError {
        PropError::TypeMismatch {
            expected,
            found: self.type_name(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

// =============================================================================
// TESTS
// =============================================================================
