//! Domain model for the task board.
//!
//! # Responsibility
//! - Define the canonical task record and its write-side request shapes.
//! - Keep ownership and validation rules in one place.
//!
//! # Invariants
//! - Every task belongs to exactly one owner identity, fixed at creation.
//! - `TaskId` is stable and never reused for another task.

pub mod task;
