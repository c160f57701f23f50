//! Task board orchestration.
//!
//! # Responsibility
//! - Mirror the owner's task list in memory and keep it consistent with
//!   the store.
//! - Map form-level intents (submit, edit, delete, toggle) onto single
//!   repository writes.
//!
//! # Invariants
//! - The mirror only changes after a confirmed remote write.
//! - At most one task is in edit mode at a time.
//! - Overlapping identical operations are rejected, not queued.

mod in_flight;
pub mod task_board;

pub use in_flight::BoardOp;
