//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record mirrored between store and board.
//! - Define the write-side shapes (`NewTask`, `TaskPatch`) and their
//!   validation rules.
//!
//! # Invariants
//! - `id` is assigned by the store at creation and never changes.
//! - `owner_identity` is set at creation and never changes.
//! - `title` is never blank for a persisted task.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a task, generated by the store at creation.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type TaskId = Uuid;

/// Authenticated owner reference (e.g. an email address).
///
/// Scopes every query and fixes task ownership at creation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Wraps a raw identity string. Blank input is rejected at task
    /// validation time, not here, so callers can hold transient values.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Task urgency level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Default for new tasks and the creation form reset value.
    #[default]
    Low,
    Medium,
    High,
}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable store-assigned ID.
    pub id: TaskId,
    /// Short label. Never blank.
    pub title: String,
    /// Free text. May be empty.
    pub description: String,
    pub priority: Priority,
    /// Starts `false` at creation; flipped by toggle.
    pub completed: bool,
    /// Owning identity, fixed at creation.
    pub owner_identity: Identity,
}

/// Creation request. The store assigns the id and `completed` starts
/// as `false`, so neither appears here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub owner_identity: Identity,
}

impl NewTask {
    /// Checks creation-time invariants before any write is attempted.
    ///
    /// # Errors
    /// - `BlankTitle` when the title is empty or whitespace-only.
    /// - `BlankOwner` when the owner identity is empty or whitespace-only.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::BlankTitle);
        }
        if self.owner_identity.is_blank() {
            return Err(TaskValidationError::BlankOwner);
        }
        Ok(())
    }
}

/// Partial update for one task record.
///
/// `None` fields are left untouched by the store. Ownership and id are
/// deliberately absent: neither is writable after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// Patch covering the editable form fields.
    pub fn fields(title: impl Into<String>, description: impl Into<String>, priority: Priority) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description.into()),
            priority: Some(priority),
            completed: None,
        }
    }

    /// Patch flipping only the completion flag.
    pub fn completion(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.completed.is_none()
    }

    /// Checks update-time invariants before any write is attempted.
    ///
    /// # Errors
    /// - `EmptyPatch` when no field is set.
    /// - `BlankTitle` when a title is set but empty or whitespace-only.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.is_empty() {
            return Err(TaskValidationError::EmptyPatch);
        }
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(TaskValidationError::BlankTitle);
            }
        }
        Ok(())
    }
}

/// Validation failures for task writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    BlankTitle,
    BlankOwner,
    EmptyPatch,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "task title must not be blank"),
            Self::BlankOwner => write!(f, "task owner identity must not be blank"),
            Self::EmptyPatch => write!(f, "task patch must set at least one field"),
        }
    }
}

impl Error for TaskValidationError {}
