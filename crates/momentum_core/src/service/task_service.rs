//! Task use-case service.
//!
//! # Responsibility
//! - Orchestrate task CRUD, reminder scheduling and list queries over one
//!   repository and one notification center.
//! - Return the persisted state after every mutation (read-back).
//!
//! # Invariants
//! - Every mutation is persisted before the service returns.
//! - Deleting a task cancels its pending request once the row is removed.
//! - A reminder whose scheduling failed is persisted as disabled.
//! - Content edits succeed even when re-registering the reminder fails.

use crate::model::reminder::ReminderSettings;
use crate::model::task::{Task, TaskDraft, TaskEdit, TaskId, TaskValidationError};
use crate::notify::center::{NotificationCenter, NotificationError};
use crate::notify::request::NotificationAction;
use crate::repo::task_repo::{RepoError, TaskRepository};
use crate::search::filter::{apply_query, TaskQuery};
use crate::service::reminder_service::ReminderScheduler;
use crate::service::stats_service::{compute_stats, TaskStats};
use chrono::{DateTime, NaiveDate, Utc};
use log::{error, info, warn};
use mockable::Clock;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for task use-cases.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Input violates task invariants; nothing was persisted.
    Validation(TaskValidationError),
    /// Target task does not exist.
    TaskNotFound(TaskId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// The notification center refused the reminder. The task was persisted
    /// with the reminder disabled.
    Reminder(NotificationError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Reminder(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent task state: {details}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Reminder(err) => Some(err),
            Self::TaskNotFound(_) | Self::InconsistentState(_) => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::TaskNotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<TaskValidationError> for TaskServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Result of handling a notification response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Task marked completed; its reminder is disabled.
    Completed(Task),
    /// Reminder re-armed as a one-shot ten minutes out.
    Snoozed(Task),
    /// Body tap; the host navigates to the task.
    Opened(Task),
}

impl ActionOutcome {
    pub fn task(&self) -> &Task {
        match self {
            Self::Completed(task) | Self::Snoozed(task) | Self::Opened(task) => task,
        }
    }
}

/// Summary of a launch-time reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResyncReport {
    /// Enabled reminders registered again because the center had lost them.
    pub rescheduled: usize,
    /// Pending requests removed because no task claims them any more.
    pub cancelled_orphans: usize,
    /// Reminders that could not be registered and were persisted disabled.
    pub failed: usize,
}

/// Task service facade over repository, scheduler and clock.
pub struct TaskService<R: TaskRepository, N: NotificationCenter, C: Clock> {
    repo: R,
    scheduler: ReminderScheduler<N>,
    clock: C,
}

impl<R: TaskRepository, N: NotificationCenter, C: Clock> TaskService<R, N, C> {
    pub fn new(repo: R, scheduler: ReminderScheduler<N>, clock: C) -> Self {
        Self {
            repo,
            scheduler,
            clock,
        }
    }

    pub fn scheduler(&self) -> &ReminderScheduler<N> {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut ReminderScheduler<N> {
        &mut self.scheduler
    }

    /// Creates one task from the creation form.
    pub fn create_task(&mut self, draft: TaskDraft) -> Result<Task, TaskServiceError> {
        let task = Task::from_draft(draft, self.clock.utc())?;
        let id = self.repo.create_task(&task)?;
        info!("event=task_create module=task status=ok task_id={id}");
        self.read_back(id, "created task not found in read-back")
    }

    /// Replaces content fields and refreshes an enabled reminder so the
    /// notification shows the new title and priority.
    pub fn update_task(&mut self, id: TaskId, edit: TaskEdit) -> Result<Task, TaskServiceError> {
        let mut task = self.load(id)?;
        task.apply_edit(edit, self.clock.utc())?;

        if let Err(err) = self.scheduler.reschedule(&mut task) {
            warn!(
                "event=task_update module=task status=warn task_id={id} error_code=reminder_refresh_failed error={err}"
            );
        }

        self.repo.update_task(&task)?;
        info!("event=task_update module=task status=ok task_id={id}");
        self.read_back(id, "updated task not found in read-back")
    }

    pub fn set_completed(&mut self, id: TaskId, completed: bool) -> Result<Task, TaskServiceError> {
        let mut task = self.load(id)?;
        task.set_completed(completed);
        self.repo.update_task(&task)?;
        info!("event=task_complete module=task status=ok task_id={id} completed={completed}");
        self.read_back(id, "completed task not found in read-back")
    }

    /// Flips completion from the list checkbox.
    pub fn toggle_completed(&mut self, id: TaskId) -> Result<Task, TaskServiceError> {
        let task = self.load(id)?;
        self.set_completed(id, !task.is_completed)
    }

    /// Removes the task and its pending notification.
    pub fn delete_task(&mut self, id: TaskId) -> Result<(), TaskServiceError> {
        let mut task = self.load(id)?;
        // Row first: a failed delete must leave the live request in place.
        self.repo.delete_task(id)?;
        self.scheduler.release(&mut task);
        info!("event=task_delete module=task status=ok task_id={id}");
        Ok(())
    }

    pub fn get_task(&self, id: TaskId) -> Result<Option<Task>, TaskServiceError> {
        Ok(self.repo.get_task(id)?)
    }

    /// Visible list for `query`.
    pub fn list_tasks(&self, query: &TaskQuery) -> Result<Vec<Task>, TaskServiceError> {
        let tasks = self.repo.list_tasks()?;
        Ok(apply_query(tasks, query))
    }

    /// Calendar day view, oldest first.
    pub fn tasks_due_on(&self, date: NaiveDate) -> Result<Vec<Task>, TaskServiceError> {
        Ok(self.repo.list_tasks_due_on(date)?)
    }

    /// Enables or reconfigures the task's reminder.
    ///
    /// # Errors
    /// - `Reminder` when the center refused the request. The task is still
    ///   persisted, with the reminder disabled.
    pub fn enable_reminder(
        &mut self,
        id: TaskId,
        settings: ReminderSettings,
    ) -> Result<Task, TaskServiceError> {
        let mut task = self.load(id)?;
        let outcome = self.scheduler.enable(&mut task, settings);
        self.persist_reminder_outcome(task, outcome)
    }

    /// One-tap reminder one hour from now.
    pub fn enable_quick_reminder(&mut self, id: TaskId) -> Result<Task, TaskServiceError> {
        let mut task = self.load(id)?;
        let outcome = self.scheduler.quick_enable(&mut task, self.clock.utc());
        self.persist_reminder_outcome(task, outcome)
    }

    /// Disables the reminder. Repeated calls are no-ops.
    pub fn disable_reminder(&mut self, id: TaskId) -> Result<Task, TaskServiceError> {
        let mut task = self.load(id)?;
        if !self.scheduler.disable(&mut task) {
            return Ok(task);
        }
        self.repo.update_task(&task)?;
        self.read_back(id, "task missing after reminder disable")
    }

    /// Applies a notification response for `task_id`.
    pub fn handle_notification_action(
        &mut self,
        task_id: TaskId,
        action: NotificationAction,
    ) -> Result<ActionOutcome, TaskServiceError> {
        let mut task = self.load(task_id)?;
        info!(
            "event=notification_action module=task status=start task_id={task_id} action={}",
            action.as_str()
        );

        match action {
            NotificationAction::Complete => {
                task.set_completed(true);
                self.scheduler.disable(&mut task);
                self.repo.update_task(&task)?;
                let task = self.read_back(task_id, "task missing after complete action")?;
                Ok(ActionOutcome::Completed(task))
            }
            NotificationAction::Snooze => {
                let outcome = self.scheduler.snooze(&mut task, self.clock.utc());
                let task = self.persist_reminder_outcome(task, outcome)?;
                Ok(ActionOutcome::Snoozed(task))
            }
            NotificationAction::Open => Ok(ActionOutcome::Opened(task)),
        }
    }

    /// Reconciles the notification center with persisted reminders.
    ///
    /// Run at launch: the platform may have dropped requests (reinstall,
    /// permission reset) or still hold requests for deleted tasks.
    pub fn resync_reminders(&mut self) -> Result<ResyncReport, TaskServiceError> {
        let tasks = self.repo.list_tasks()?;
        let mut report = ResyncReport::default();

        let live: BTreeSet<_> = tasks
            .iter()
            .filter(|task| task.has_active_reminder())
            .filter_map(|task| task.reminder.as_ref().map(|reminder| reminder.id))
            .collect();

        let pending = self.scheduler.center().pending_requests();
        for request in pending {
            if !live.contains(&request.id) {
                self.scheduler.center_mut().cancel(&request.id);
                report.cancelled_orphans += 1;
            }
        }

        for mut task in tasks {
            if !task.has_active_reminder() || self.scheduler.is_scheduled(&task) {
                continue;
            }
            match self.scheduler.reschedule(&mut task) {
                Ok(()) => report.rescheduled += 1,
                Err(_) => {
                    self.repo.update_task(&task)?;
                    report.failed += 1;
                }
            }
        }

        info!(
            "event=reminder_resync module=task status=ok rescheduled={} cancelled_orphans={} failed={}",
            report.rescheduled, report.cancelled_orphans, report.failed
        );
        Ok(report)
    }

    /// Statistics as of the clock's current local time.
    pub fn stats(&self) -> Result<TaskStats, TaskServiceError> {
        let tasks = self.repo.list_tasks()?;
        let local_now = self.clock.utc().with_timezone(&self.scheduler.offset());
        Ok(compute_stats(&tasks, local_now))
    }

    /// Asks the center for notification permission.
    pub fn request_notification_authorization(&mut self) -> bool {
        let granted = self.scheduler.center_mut().request_authorization();
        info!("event=notification_authorize module=task status=ok granted={granted}");
        granted
    }

    /// Current UTC time as seen by this service.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    fn load(&self, id: TaskId) -> Result<Task, TaskServiceError> {
        self.repo
            .get_task(id)?
            .ok_or(TaskServiceError::TaskNotFound(id))
    }

    fn read_back(&self, id: TaskId, details: &'static str) -> Result<Task, TaskServiceError> {
        self.repo
            .get_task(id)?
            .ok_or(TaskServiceError::InconsistentState(details))
    }

    fn persist_reminder_outcome(
        &mut self,
        task: Task,
        outcome: Result<(), NotificationError>,
    ) -> Result<Task, TaskServiceError> {
        self.repo.update_task(&task)?;
        match outcome {
            Ok(()) => self.read_back(task.id, "task missing after reminder update"),
            Err(err) => {
                error!(
                    "event=reminder_enable module=task status=error task_id={} error={err}",
                    task.id
                );
                Err(TaskServiceError::Reminder(err))
            }
        }
    }
}
