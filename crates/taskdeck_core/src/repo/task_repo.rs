//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide the document-store operations the board calls: owner-scoped
//!   query, create, partial update, delete.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths validate `NewTask`/`TaskPatch` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `create_task` assigns the stable id; callers never supply one.

use crate::db::DbError;
use crate::model::task::{Identity, NewTask, Priority, Task, TaskId, TaskPatch, TaskValidationError};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    description,
    priority,
    completed,
    owner_identity
FROM tasks";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for task persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(TaskValidationError),
    Db(DbError),
    NotFound(TaskId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Document-store contract for task records.
///
/// The board only ever talks to this trait; the SQLite implementation
/// below stands in for the remote managed store.
pub trait TaskRepository {
    /// Creates one task record and returns its store-assigned id.
    ///
    /// # Contract
    /// - `completed` starts as `false`.
    /// - The owner in `new_task` becomes the record's permanent owner.
    fn create_task(&self, new_task: &NewTask) -> RepoResult<TaskId>;
    /// Applies a partial field update to one record.
    fn update_task(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<()>;
    /// Gets one task by stable id.
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    /// Lists every task owned by `owner`, and nothing else.
    fn list_tasks_for_owner(&self, owner: &Identity) -> RepoResult<Vec<Task>>;
    /// Removes one record permanently.
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, new_task: &NewTask) -> RepoResult<TaskId> {
        new_task.validate()?;

        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO tasks (
                uuid,
                title,
                description,
                priority,
                completed,
                owner_identity
            ) VALUES (?1, ?2, ?3, ?4, 0, ?5);",
            params![
                id.to_string(),
                new_task.title.as_str(),
                new_task.description.as_str(),
                priority_to_db(new_task.priority),
                new_task.owner_identity.as_str(),
            ],
        )?;

        Ok(id)
    }

    fn update_task(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<()> {
        patch.validate()?;

        let mut assignments: Vec<&'static str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(title) = &patch.title {
            assignments.push("title = ?");
            bind_values.push(Value::Text(title.clone()));
        }
        if let Some(description) = &patch.description {
            assignments.push("description = ?");
            bind_values.push(Value::Text(description.clone()));
        }
        if let Some(priority) = patch.priority {
            assignments.push("priority = ?");
            bind_values.push(Value::Text(priority_to_db(priority).to_string()));
        }
        if let Some(completed) = patch.completed {
            assignments.push("completed = ?");
            bind_values.push(Value::Integer(bool_to_int(completed)));
        }
        assignments.push("updated_at = (strftime('%s', 'now') * 1000)");

        let sql = format!(
            "UPDATE tasks SET {} WHERE uuid = ?;",
            assignments.join(", ")
        );
        bind_values.push(Value::Text(id.to_string()));

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    fn list_tasks_for_owner(&self, owner: &Identity) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE owner_identity = ?1
             ORDER BY created_at ASC, uuid ASC;"
        ))?;

        let mut rows = stmt.query([owner.as_str()])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{uuid_text}` in tasks.uuid"))
    })?;

    let priority_text: String = row.get("priority")?;
    let priority = parse_priority(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_text}` in tasks.priority"
        ))
    })?;

    let completed = match row.get::<_, i64>("completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid completed value `{other}` in tasks.completed"
            )));
        }
    };

    let title: String = row.get("title")?;
    if title.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "blank title in persisted task {id}"
        )));
    }

    Ok(Task {
        id,
        title,
        description: row.get("description")?,
        priority,
        completed,
        owner_identity: Identity::new(row.get::<_, String>("owner_identity")?),
    })
}

fn priority_to_db(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "low",
        Priority::Medium => "medium",
        Priority::High => "high",
    }
}

fn parse_priority(value: &str) -> Option<Priority> {
    match value {
        "low" => Some(Priority::Low),
        "medium" => Some(Priority::Medium),
        "high" => Some(Priority::High),
        _ => None,
    }
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
