// ============================================================================
// spark-props - Evaluation Context
// Which derived property is currently being computed
// ============================================================================
//
// The context is a stack, not a single slot. Entering a derivation pushes its
// key; the returned guard pops it again when dropped. Nested derived reads
// therefore restore the outer key automatically, including when a derivation
// returns early with an error or unwinds.
// ============================================================================

use std::cell::RefCell;

use super::types::PropKey;

// =============================================================================
// EVAL CONTEXT
// =============================================================================

/// Per-reactor evaluation context.
///
/// Each frame is either `Some(key)` (reads are attributed to `key`) or
/// `None` (an untracked region: reads register no edges).
#[derive(Debug, Default)]
pub struct EvalContext {
    frames: RefCell<Vec<Option<PropKey>>>,
}

impl EvalContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The key reads are currently attributed to, if any.
    pub fn current(&self) -> Option<PropKey> {
        self.frames.borrow().last().cloned().flatten()
    }

    /// The innermost derivation in progress, looking through untracked frames.
    pub fn innermost_derivation(&self) -> Option<PropKey> {
        self.frames.borrow().iter().rev().find_map(Clone::clone)
    }

    /// Attribute reads to `key` until the guard is dropped.
    pub fn enter(&self, key: PropKey) -> ContextGuard<'_> {
        self.push(Some(key))
    }

    /// Suspend tracking until the guard is dropped.
    pub fn enter_untracked(&self) -> ContextGuard<'_> {
        self.push(None)
    }

    fn push(&self, frame: Option<PropKey>) -> ContextGuard<'_> {
        let mut frames = self.frames.borrow_mut();
        let depth = frames.len();
        frames.push(frame);
        ContextGuard { ctx: self, depth }
    }
}

// =============================================================================
// CONTEXT GUARD
// =============================================================================

/// Restores the evaluation context to its state before the matching `enter`.
#[must_use = "the context is restored as soon as the guard is dropped"]
pub struct ContextGuard<'a> {
    ctx: &'a EvalContext,
    depth: usize,
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.ctx.frames.borrow_mut().truncate(self.depth);
    }
}

// =============================================================================
// TESTS
// =============================================================================
