//! Per-operation in-flight flags.
//!
//! # Responsibility
//! - Reject overlapping identical board operations (double-submit guard).
//!
//! # Invariants
//! - A flag acquired for one operation does not block the others.
//! - Flags are released when the acquired guard drops, on every path.

use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};

/// Mutating board operations that carry an in-flight flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardOp {
    Load,
    Submit,
    Delete,
    Toggle,
}

impl Display for BoardOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Load => "load",
            Self::Submit => "submit",
            Self::Delete => "delete",
            Self::Toggle => "toggle",
        };
        write!(f, "{name}")
    }
}

#[derive(Default)]
pub(crate) struct InFlightFlags {
    load: AtomicBool,
    submit: AtomicBool,
    delete: AtomicBool,
    toggle: AtomicBool,
}

impl InFlightFlags {
    /// Acquires the flag for `op`, or returns `None` when an identical
    /// operation is already running.
    pub(crate) fn acquire(&self, op: BoardOp) -> Option<OpGuard<'_>> {
        let slot = self.slot(op);
        if slot
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return None;
        }
        Some(OpGuard { slot })
    }

    fn slot(&self, op: BoardOp) -> &AtomicBool {
        match op {
            BoardOp::Load => &self.load,
            BoardOp::Submit => &self.submit,
            BoardOp::Delete => &self.delete,
            BoardOp::Toggle => &self.toggle,
        }
    }
}

/// Releases its in-flight flag on drop.
pub(crate) struct OpGuard<'flags> {
    slot: &'flags AtomicBool,
}

impl Drop for OpGuard<'_> {
    fn drop(&mut self) {
        self.slot.store(false, Ordering::Release);
    }
}
