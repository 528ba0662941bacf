//! Task domain model.
//!
//! # Responsibility
//! - Define the single persisted entity of the app.
//! - Enforce content invariants before anything reaches storage.
//!
//! # Invariants
//! - `id` is stable, never nil and never reused for another task.
//! - `title` is never empty (whitespace-only counts as empty).
//! - New tasks start with `is_completed = false` and `edited_at = None`.
//! - `edited_at`, when set, is not earlier than `created_at`.
//! - Empty notes and empty image payloads are stored as `None`.

use crate::model::reminder::{Reminder, ReminderValidationError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable task identifier.
pub type TaskId = Uuid;

/// Task priority level. Absent priority is modelled as `Option::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Normal, Priority::High];

    /// Stable string form shared by storage and FFI.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }

    /// Parses the stable string form. Returns `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "normal" => Some(Self::Normal),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Display label used in notification subtitles.
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Normal => "Normal",
            Self::High => "High",
        }
    }

    /// Sort rank. Absent priority ranks `0`, below `Low`.
    pub fn rank(priority: Option<Self>) -> u8 {
        match priority {
            Some(Self::High) => 3,
            Some(Self::Normal) => 2,
            Some(Self::Low) => 1,
            None => 0,
        }
    }
}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaskShape")]
pub struct Task {
    pub id: TaskId,
    pub created_at: DateTime<Utc>,
    pub edited_at: Option<DateTime<Utc>>,
    pub title: String,
    pub is_completed: bool,
    /// Calendar date only; time of day is not significant.
    pub due_date: Option<NaiveDate>,
    pub priority: Option<Priority>,
    pub notes: Option<String>,
    /// Raw image bytes as picked by the user.
    pub image: Option<Vec<u8>>,
    pub reminder: Option<Reminder>,
}

impl Task {
    /// Creates a task with a generated id.
    ///
    /// # Errors
    /// - `EmptyTitle` when `title` is empty after trimming.
    pub fn new(title: impl Into<String>, now: DateTime<Utc>) -> Result<Self, TaskValidationError> {
        Self::with_id(Uuid::new_v4(), title, now)
    }

    /// Creates a task with a caller-provided id.
    ///
    /// Used by import paths where identity already exists.
    ///
    /// # Errors
    /// - `NilId` when `id` is the nil UUID.
    /// - `EmptyTitle` when `title` is empty after trimming.
    pub fn with_id(
        id: TaskId,
        title: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, TaskValidationError> {
        let task = Self {
            id,
            created_at: now,
            edited_at: None,
            title: normalize_title(&title.into()),
            is_completed: false,
            due_date: None,
            priority: None,
            notes: None,
            image: None,
            reminder: None,
        };
        task.validate()?;
        Ok(task)
    }

    /// Builds a new task from the creation form.
    pub fn from_draft(draft: TaskDraft, now: DateTime<Utc>) -> Result<Self, TaskValidationError> {
        let mut task = Self::new(draft.title, now)?;
        task.priority = draft.priority;
        task.due_date = draft.due_date;
        task.notes = normalize_notes(draft.notes);
        task.image = normalize_image(draft.image);
        Ok(task)
    }

    /// Replaces content fields and stamps `edited_at`.
    ///
    /// The task is left untouched when the edit is rejected.
    pub fn apply_edit(
        &mut self,
        edit: TaskEdit,
        now: DateTime<Utc>,
    ) -> Result<(), TaskValidationError> {
        let title = normalize_title(&edit.title);
        if title.is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        if now < self.created_at {
            return Err(TaskValidationError::EditedBeforeCreated);
        }

        self.title = title;
        self.priority = edit.priority;
        self.due_date = edit.due_date;
        self.notes = normalize_notes(edit.notes);
        match edit.image {
            ImageEdit::Keep => {}
            ImageEdit::Replace(bytes) => self.image = normalize_image(Some(bytes)),
            ImageEdit::Remove => self.image = None,
        }
        self.edited_at = Some(now);
        Ok(())
    }

    pub fn set_completed(&mut self, completed: bool) {
        self.is_completed = completed;
    }

    /// Flips completion and returns the new value.
    pub fn toggle_completed(&mut self) -> bool {
        self.is_completed = !self.is_completed;
        self.is_completed
    }

    /// Open task whose due date lies strictly before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_completed && self.due_date.is_some_and(|due| due < today)
    }

    /// True when a reminder is currently enabled.
    pub fn has_active_reminder(&self) -> bool {
        self.reminder.as_ref().is_some_and(|reminder| reminder.enabled)
    }

    /// Validates task invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        if self.edited_at.is_some_and(|edited| edited < self.created_at) {
            return Err(TaskValidationError::EditedBeforeCreated);
        }
        if let Some(reminder) = &self.reminder {
            reminder.validate()?;
        }
        Ok(())
    }
}

/// Creation form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub image: Option<Vec<u8>>,
}

impl TaskDraft {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Image change carried by an edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageEdit {
    #[default]
    Keep,
    Replace(Vec<u8>),
    Remove,
}

/// Edit form input. Content fields use full replacement semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    pub title: String,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub image: ImageEdit,
}

impl TaskEdit {
    /// Prefills an edit form with the task's current content.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            priority: task.priority,
            due_date: task.due_date,
            notes: task.notes.clone(),
            image: ImageEdit::Keep,
        }
    }
}

/// Task invariant violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyTitle,
    NilId,
    EditedBeforeCreated,
    Reminder(ReminderValidationError),
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title must not be empty"),
            Self::NilId => write!(f, "task id must not be nil"),
            Self::EditedBeforeCreated => {
                write!(f, "edited_at must not be earlier than created_at")
            }
            Self::Reminder(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Reminder(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ReminderValidationError> for TaskValidationError {
    fn from(value: ReminderValidationError) -> Self {
        Self::Reminder(value)
    }
}

#[derive(Deserialize)]
struct TaskShape {
    id: TaskId,
    created_at: DateTime<Utc>,
    edited_at: Option<DateTime<Utc>>,
    title: String,
    is_completed: bool,
    due_date: Option<NaiveDate>,
    priority: Option<Priority>,
    notes: Option<String>,
    image: Option<Vec<u8>>,
    reminder: Option<Reminder>,
}

impl TryFrom<TaskShape> for Task {
    type Error = TaskValidationError;

    fn try_from(shape: TaskShape) -> Result<Self, Self::Error> {
        let task = Self {
            id: shape.id,
            created_at: shape.created_at,
            edited_at: shape.edited_at,
            title: shape.title,
            is_completed: shape.is_completed,
            due_date: shape.due_date,
            priority: shape.priority,
            notes: shape.notes,
            image: shape.image,
            reminder: shape.reminder,
        };
        task.validate()?;
        Ok(task)
    }
}

fn normalize_title(title: &str) -> String {
    title.trim().to_string()
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes.filter(|value| !value.trim().is_empty())
}

fn normalize_image(image: Option<Vec<u8>>) -> Option<Vec<u8>> {
    image.filter(|bytes| !bytes.is_empty())
}
