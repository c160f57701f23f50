//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the document-store contract the board depends on.
//! - Isolate SQLite query details from board orchestration.
//!
//! # Invariants
//! - Repository writes must validate request shapes before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to
//!   DB transport errors.

pub mod task_repo;
