//! Core domain logic for Momentum.
//! Tasks, reminders, the list pipeline and the unlock gate live here; UI
//! shells talk to this crate through `momentum_ffi`.

pub mod auth;
pub mod db;
pub mod logging;
pub mod model;
pub mod notify;
pub mod repo;
pub mod search;
pub mod service;

pub use auth::gate::{AuthError, AuthGate, Authenticator, ReportedOutcome, UnlockState};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::reminder::{
    Reminder, ReminderId, ReminderSettings, ReminderValidationError, RepeatInterval,
};
pub use model::task::{
    ImageEdit, Priority, Task, TaskDraft, TaskEdit, TaskId, TaskValidationError,
};
pub use notify::center::{
    InMemoryNotificationCenter, NotificationCenter, NotificationError, NotifyResult,
};
pub use notify::request::{NotificationAction, NotificationContent, NotificationRequest};
pub use notify::trigger::{DateMatch, TriggerSpec};
pub use repo::task_repo::{RepoError, RepoResult, SqliteTaskRepository, TaskRepository};
pub use search::filter::{apply_query, PriorityFilter, SortOption, StatusFilter, TaskQuery};
pub use service::reminder_service::{ReminderScheduler, ReminderState};
pub use service::stats_service::{compute_stats, DayProgress, PriorityDistribution, TaskStats};
pub use service::task_service::{ActionOutcome, ResyncReport, TaskService, TaskServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
