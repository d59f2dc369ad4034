// ============================================================================
// spark-props - Errors
// ============================================================================

use super::types::PropKey;

/// Everything that can go wrong reading, writing, or notifying properties.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropError {
    #[error("unknown property `{0}`")]
    UnknownKey(PropKey),

    #[error("property `{0}` is declared more than once")]
    DuplicateKey(PropKey),

    #[error("property `{0}` is derived and cannot be written")]
    ReadOnly(PropKey),

    #[error("cannot write `{key}` while deriving `{target}`; derivations must not have side effects")]
    WriteDuringDerivation { key: PropKey, target: PropKey },

    #[error("expected a {expected} value, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Raised by user derivations and observers.
    #[error("{0}")]
    Derivation(String),
}

impl PropError {
    /// Shorthand for a free-form failure inside a derivation or observer.
    pub fn derivation(message: impl Into<String>) -> Self {
        PropError::Derivation(message.into())
    }
}
