//! Task board component.
//!
//! # Responsibility
//! - Hold the in-memory mirror of the owner's task list.
//! - Map submit/edit/delete/toggle intents onto repository writes and
//!   mirror each confirmed write.
//!
//! # Invariants
//! - Every repository write happens before the corresponding mirror
//!   mutation; a failed write leaves the mirror untouched.
//! - The mirror never contains a task owned by another identity.
//! - Edit mode is modal and single-record.

use crate::auth::session_gate::IdentitySource;
use crate::board::in_flight::{BoardOp, InFlightFlags, OpGuard};
use crate::model::task::{NewTask, Priority, Task, TaskId, TaskPatch};
use crate::repo::task_repo::{RepoError, TaskRepository};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

pub type BoardResult<T> = Result<T, BoardError>;

/// Board-level failures.
#[derive(Debug)]
pub enum BoardError {
    /// No resolved identity; the session gate should have redirected.
    NotSignedIn,
    /// Creation/edit submitted with a blank title.
    EmptyTitle,
    /// The targeted task is not part of the current mirror.
    UnknownTask(TaskId),
    /// An identical operation is still running.
    InFlight(BoardOp),
    /// Store-level failure.
    Repo(RepoError),
}

impl Display for BoardError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotSignedIn => write!(f, "no signed-in identity"),
            Self::EmptyTitle => write!(f, "task title must not be blank"),
            Self::UnknownTask(id) => write!(f, "task not on the board: {id}"),
            Self::InFlight(op) => write!(f, "operation already in flight: {op}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BoardError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for BoardError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::UnknownTask(id),
            other => Self::Repo(other),
        }
    }
}

/// Board lifecycle per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardPhase {
    /// No identity resolved yet.
    Unauthenticated,
    /// Identity resolved, scoped query outstanding.
    Loading,
    /// Mirror populated.
    Ready,
}

/// Creation/edit form state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

/// Outcome of a form submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(TaskId),
    Updated(TaskId),
}

struct BoardState {
    phase: BoardPhase,
    tasks: Vec<Task>,
    form: TaskForm,
    /// Single modal edit slot; `Some` means submit performs an update.
    editing: Option<TaskId>,
}

/// Owner-scoped task list with inline editing controls.
///
/// Constructed with an explicit session object; the board never reaches
/// into provider state beyond `IdentitySource`.
pub struct TaskBoard<R: TaskRepository> {
    session: Arc<dyn IdentitySource>,
    repo: R,
    state: Mutex<BoardState>,
    in_flight: InFlightFlags,
}

impl<R: TaskRepository> TaskBoard<R> {
    pub fn new(session: Arc<dyn IdentitySource>, repo: R) -> Self {
        Self {
            session,
            repo,
            state: Mutex::new(BoardState {
                phase: BoardPhase::Unauthenticated,
                tasks: Vec::new(),
                form: TaskForm::default(),
                editing: None,
            }),
            in_flight: InFlightFlags::default(),
        }
    }

    /// Replaces the mirror with the owner's current task list.
    ///
    /// # Contract
    /// - Requires a resolved identity (`NotSignedIn` otherwise).
    /// - The result only ever contains tasks owned by that identity.
    /// - On failure the previous mirror and phase are kept.
    pub fn load(&self) -> BoardResult<usize> {
        let _guard = self.acquire(BoardOp::Load)?;

        let Some(owner) = self.session.current_identity() else {
            warn!("event=board_load module=board status=error error_code=not_signed_in");
            self.state().phase = BoardPhase::Unauthenticated;
            return Err(BoardError::NotSignedIn);
        };

        let previous_phase = {
            let mut state = self.state();
            let previous = state.phase;
            state.phase = BoardPhase::Loading;
            previous
        };

        let started_at = Instant::now();
        match self.repo.list_tasks_for_owner(&owner) {
            Ok(tasks) => {
                let count = tasks.len();
                let mut state = self.state();
                state.tasks = tasks;
                state.phase = BoardPhase::Ready;
                info!(
                    "event=board_load module=board status=ok count={count} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(count)
            }
            Err(err) => {
                self.state().phase = previous_phase;
                error!(
                    "event=board_load module=board status=error duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err.into())
            }
        }
    }

    /// Performs Update when a task is in edit mode, Create otherwise.
    ///
    /// # Contract
    /// - Blank titles are rejected before any write.
    /// - Create: on success the returned id + submitted fields are
    ///   appended to the mirror and the form resets to empty/`Low`.
    /// - Update: on success the entry's fields are replaced (id and owner
    ///   unchanged) and edit mode is exited.
    pub fn submit(&self) -> BoardResult<SubmitOutcome> {
        let _guard = self.acquire(BoardOp::Submit)?;

        let (form, editing) = {
            let state = self.state();
            (state.form.clone(), state.editing)
        };

        if form.title.trim().is_empty() {
            return Err(BoardError::EmptyTitle);
        }

        match editing {
            Some(id) => self.submit_update(id, &form),
            None => self.submit_create(&form),
        }
    }

    fn submit_create(&self, form: &TaskForm) -> BoardResult<SubmitOutcome> {
        let owner = self
            .session
            .current_identity()
            .ok_or(BoardError::NotSignedIn)?;

        let new_task = NewTask {
            title: form.title.clone(),
            description: form.description.clone(),
            priority: form.priority,
            owner_identity: owner,
        };

        let id = match self.repo.create_task(&new_task) {
            Ok(id) => id,
            Err(err) => {
                error!("event=task_create module=board status=error error={err}");
                return Err(err.into());
            }
        };

        let mut state = self.state();
        state.tasks.push(Task {
            id,
            title: new_task.title,
            description: new_task.description,
            priority: new_task.priority,
            completed: false,
            owner_identity: new_task.owner_identity,
        });
        state.form = TaskForm::default();
        info!("event=task_create module=board status=ok id={id}");
        Ok(SubmitOutcome::Created(id))
    }

    fn submit_update(&self, id: TaskId, form: &TaskForm) -> BoardResult<SubmitOutcome> {
        if !self.contains(id) {
            return Err(BoardError::UnknownTask(id));
        }

        let patch = TaskPatch::fields(form.title.clone(), form.description.clone(), form.priority);
        if let Err(err) = self.repo.update_task(id, &patch) {
            error!("event=task_update module=board status=error id={id} error={err}");
            return Err(err.into());
        }

        let mut state = self.state();
        if let Some(task) = state.tasks.iter_mut().find(|task| task.id == id) {
            task.title = form.title.clone();
            task.description = form.description.clone();
            task.priority = form.priority;
        }
        state.editing = None;
        state.form = TaskForm::default();
        info!("event=task_update module=board status=ok id={id}");
        Ok(SubmitOutcome::Updated(id))
    }

    /// Enters modal edit mode for one task, pre-filling the form.
    ///
    /// Entering edit for another task switches the single edit slot.
    pub fn begin_edit(&self, id: TaskId) -> BoardResult<()> {
        let mut state = self.state();
        let task = state
            .tasks
            .iter()
            .find(|task| task.id == id)
            .cloned()
            .ok_or(BoardError::UnknownTask(id))?;

        state.form = TaskForm {
            title: task.title,
            description: task.description,
            priority: task.priority,
        };
        state.editing = Some(id);
        Ok(())
    }

    /// Leaves edit mode and resets the form.
    pub fn cancel_edit(&self) {
        let mut state = self.state();
        state.editing = None;
        state.form = TaskForm::default();
    }

    /// Removes one task remotely, then from the mirror.
    ///
    /// # Contract
    /// - The mirror entry is only removed after the remote delete
    ///   succeeds; a failure leaves it visible.
    pub fn delete(&self, id: TaskId) -> BoardResult<()> {
        let _guard = self.acquire(BoardOp::Delete)?;

        if !self.contains(id) {
            return Err(BoardError::UnknownTask(id));
        }

        if let Err(err) = self.repo.delete_task(id) {
            error!("event=task_delete module=board status=error id={id} error={err}");
            return Err(err.into());
        }

        let mut state = self.state();
        state.tasks.retain(|task| task.id != id);
        if state.editing == Some(id) {
            state.editing = None;
            state.form = TaskForm::default();
        }
        info!("event=task_delete module=board status=ok id={id}");
        Ok(())
    }

    /// Writes the negation of the mirrored completion flag.
    ///
    /// Returns the new value. The mirror only flips after the remote
    /// write succeeds, so toggling twice is always an identity.
    pub fn toggle_completed(&self, id: TaskId) -> BoardResult<bool> {
        let _guard = self.acquire(BoardOp::Toggle)?;

        let current = {
            let state = self.state();
            state
                .tasks
                .iter()
                .find(|task| task.id == id)
                .map(|task| task.completed)
                .ok_or(BoardError::UnknownTask(id))?
        };
        let next = !current;

        if let Err(err) = self.repo.update_task(id, &TaskPatch::completion(next)) {
            error!("event=task_toggle module=board status=error id={id} error={err}");
            return Err(err.into());
        }

        let mut state = self.state();
        if let Some(task) = state.tasks.iter_mut().find(|task| task.id == id) {
            task.completed = next;
        }
        info!("event=task_toggle module=board status=ok id={id} completed={next}");
        Ok(next)
    }

    pub fn set_title(&self, value: impl Into<String>) {
        self.state().form.title = value.into();
    }

    pub fn set_description(&self, value: impl Into<String>) {
        self.state().form.description = value.into();
    }

    pub fn set_priority(&self, value: Priority) {
        self.state().form.priority = value;
    }

    /// Current form snapshot.
    pub fn form(&self) -> TaskForm {
        self.state().form.clone()
    }

    /// Mirror snapshot.
    pub fn tasks(&self) -> Vec<Task> {
        self.state().tasks.clone()
    }

    pub fn phase(&self) -> BoardPhase {
        self.state().phase
    }

    /// Id of the task currently in edit mode, if any.
    pub fn editing(&self) -> Option<TaskId> {
        self.state().editing
    }

    /// The underlying repository handle.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    fn acquire(&self, op: BoardOp) -> BoardResult<OpGuard<'_>> {
        self.in_flight.acquire(op).ok_or_else(|| {
            warn!("event=board_op module=board status=error error_code=in_flight op={op}");
            BoardError::InFlight(op)
        })
    }

    fn contains(&self, id: TaskId) -> bool {
        self.state().tasks.iter().any(|task| task.id == id)
    }

    fn state(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
