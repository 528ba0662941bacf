//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over the `tasks` table.
//! - Keep SQL and column encodings inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Task::validate()` before SQL mutations.
//! - Read paths reject invalid persisted state instead of masking it.
//! - `list_tasks` returns `created_at DESC, uuid ASC`, a deterministic input
//!   order for the list pipeline.

use crate::db::DbError;
use crate::model::reminder::{Reminder, ReminderId, RepeatInterval};
use crate::model::task::{Priority, Task, TaskId, TaskValidationError};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    is_completed,
    due_date,
    priority,
    notes,
    image_blob,
    created_at,
    edited_at,
    reminder_id,
    reminder_trigger_at,
    reminder_enabled,
    reminder_repeating,
    reminder_interval
FROM tasks";

const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for task persistence and query operations.
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
            Self::NotFound(_) | Self::InvalidData(_) => None,
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

/// Repository interface for task persistence.
pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    /// Full-row replacement. Returns `NotFound` when no row matches.
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self) -> RepoResult<Vec<Task>>;
    /// Tasks due on `date`, oldest first.
    fn list_tasks_due_on(&self, date: NaiveDate) -> RepoResult<Vec<Task>>;
    fn find_by_reminder_id(&self, reminder_id: ReminderId) -> RepoResult<Option<Task>>;
    /// Hard delete. Returns `NotFound` when no row matches.
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_tasks(&self, sql: &str, bind: impl rusqlite::Params) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(bind)?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;
        let reminder = ReminderColumns::from_task(task);

        self.conn.execute(
            "INSERT INTO tasks (
                uuid,
                title,
                is_completed,
                due_date,
                priority,
                notes,
                image_blob,
                created_at,
                edited_at,
                reminder_id,
                reminder_trigger_at,
                reminder_enabled,
                reminder_repeating,
                reminder_interval
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14);",
            params![
                task.id.to_string(),
                task.title.as_str(),
                bool_to_int(task.is_completed),
                task.due_date.map(due_date_to_db),
                task.priority.map(Priority::as_str),
                task.notes.as_deref(),
                task.image.as_deref(),
                task.created_at.timestamp_millis(),
                task.edited_at.map(|value| value.timestamp_millis()),
                reminder.id,
                reminder.trigger_at,
                reminder.enabled,
                reminder.repeating,
                reminder.interval,
            ],
        )?;

        Ok(task.id)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;
        let reminder = ReminderColumns::from_task(task);

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?1,
                is_completed = ?2,
                due_date = ?3,
                priority = ?4,
                notes = ?5,
                image_blob = ?6,
                edited_at = ?7,
                reminder_id = ?8,
                reminder_trigger_at = ?9,
                reminder_enabled = ?10,
                reminder_repeating = ?11,
                reminder_interval = ?12
             WHERE uuid = ?13;",
            params![
                task.title.as_str(),
                bool_to_int(task.is_completed),
                task.due_date.map(due_date_to_db),
                task.priority.map(Priority::as_str),
                task.notes.as_deref(),
                task.image.as_deref(),
                task.edited_at.map(|value| value.timestamp_millis()),
                reminder.id,
                reminder.trigger_at,
                reminder.enabled,
                reminder.repeating,
                reminder.interval,
                task.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(task.id));
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

    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        self.query_tasks(
            &format!("{TASK_SELECT_SQL} ORDER BY created_at DESC, uuid ASC;"),
            [],
        )
    }

    fn list_tasks_due_on(&self, date: NaiveDate) -> RepoResult<Vec<Task>> {
        self.query_tasks(
            &format!("{TASK_SELECT_SQL} WHERE due_date = ?1 ORDER BY created_at ASC, uuid ASC;"),
            [due_date_to_db(date)],
        )
    }

    fn find_by_reminder_id(&self, reminder_id: ReminderId) -> RepoResult<Option<Task>> {
        let uuid_text = self
            .conn
            .query_row(
                "SELECT uuid FROM tasks WHERE reminder_id = ?1;",
                [reminder_id.to_string()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        match uuid_text {
            Some(value) => self.get_task(parse_uuid(&value, "tasks.uuid")?),
            None => Ok(None),
        }
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

/// Column encoding of the optional reminder sub-record.
struct ReminderColumns {
    id: Option<String>,
    trigger_at: Option<i64>,
    enabled: i64,
    repeating: i64,
    interval: &'static str,
}

impl ReminderColumns {
    fn from_task(task: &Task) -> Self {
        match &task.reminder {
            Some(reminder) => Self {
                id: Some(reminder.id.to_string()),
                trigger_at: reminder.trigger_at.map(|value| value.timestamp_millis()),
                enabled: bool_to_int(reminder.enabled),
                repeating: bool_to_int(reminder.repeating),
                interval: reminder.interval.as_str(),
            },
            None => Self {
                id: None,
                trigger_at: None,
                enabled: 0,
                repeating: 0,
                interval: RepeatInterval::None.as_str(),
            },
        }
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "tasks.uuid")?;

    let due_date = match row.get::<_, Option<String>>("due_date")? {
        Some(value) => Some(NaiveDate::parse_from_str(&value, DUE_DATE_FORMAT).map_err(|_| {
            RepoError::InvalidData(format!("invalid due date `{value}` in tasks.due_date"))
        })?),
        None => None,
    };

    let priority = match row.get::<_, Option<String>>("priority")? {
        Some(value) => Some(Priority::parse(&value).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid priority `{value}` in tasks.priority"))
        })?),
        None => None,
    };

    let created_at = parse_millis(row.get("created_at")?, "tasks.created_at")?;
    let edited_at = row
        .get::<_, Option<i64>>("edited_at")?
        .map(|value| parse_millis(value, "tasks.edited_at"))
        .transpose()?;

    let task = Task {
        id,
        created_at,
        edited_at,
        title: row.get("title")?,
        is_completed: parse_bool(row.get("is_completed")?, "tasks.is_completed")?,
        due_date,
        priority,
        notes: row.get("notes")?,
        image: row.get("image_blob")?,
        reminder: parse_reminder(row)?,
    };
    task.validate()?;
    Ok(task)
}

fn parse_reminder(row: &Row<'_>) -> RepoResult<Option<Reminder>> {
    let Some(id_text) = row.get::<_, Option<String>>("reminder_id")? else {
        return Ok(None);
    };

    let interval_text: String = row.get("reminder_interval")?;
    let interval = RepeatInterval::parse(&interval_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid repeat interval `{interval_text}` in tasks.reminder_interval"
        ))
    })?;

    Ok(Some(Reminder {
        id: parse_uuid(&id_text, "tasks.reminder_id")?,
        trigger_at: row
            .get::<_, Option<i64>>("reminder_trigger_at")?
            .map(|value| parse_millis(value, "tasks.reminder_trigger_at"))
            .transpose()?,
        enabled: parse_bool(row.get("reminder_enabled")?, "tasks.reminder_enabled")?,
        repeating: parse_bool(row.get("reminder_repeating")?, "tasks.reminder_repeating")?,
        interval,
    }))
}

fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn parse_millis(value: i64, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(value).ok_or_else(|| {
        RepoError::InvalidData(format!("timestamp `{value}` out of range in {column}"))
    })
}

fn parse_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

fn due_date_to_db(date: NaiveDate) -> String {
    date.format(DUE_DATE_FORMAT).to_string()
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
