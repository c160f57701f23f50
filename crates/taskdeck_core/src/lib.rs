//! Core logic for taskdeck: a session-gated personal task board.
//! This crate is the single source of truth for business invariants.

pub mod auth;
pub mod board;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use auth::provider::{
    AuthError, AuthProvider, AuthResult, AuthState, AuthSubscription, InProcessAuthProvider,
};
pub use auth::session_gate::{IdentitySource, Navigator, SessionGate, LOGIN_ROUTE};
pub use board::task_board::{
    BoardError, BoardPhase, BoardResult, SubmitOutcome, TaskBoard, TaskForm,
};
pub use board::BoardOp;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{Identity, NewTask, Priority, Task, TaskId, TaskPatch, TaskValidationError};
pub use repo::task_repo::{RepoError, RepoResult, SqliteTaskRepository, TaskRepository};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
