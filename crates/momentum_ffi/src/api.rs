//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose task, reminder, unlock and statistics use-cases to Dart via FRB.
//! - Hold the process-wide notification center and unlock gate.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Task use-cases refuse to run while the gate is locked.
//! - Ids cross the boundary as UUID strings, instants as epoch milliseconds,
//!   due dates as `YYYY-MM-DD`.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use log::{info, warn};
use mockable::{Clock, DefaultClock};
use momentum_core::db::open_db;
use momentum_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    ActionOutcome, AuthError, AuthGate, DayProgress, ImageEdit, InMemoryNotificationCenter,
    NotificationAction, NotificationCenter, NotificationRequest, Priority, PriorityFilter,
    ReminderScheduler, ReminderSettings, RepeatInterval, ReportedOutcome, SortOption,
    SqliteTaskRepository, StatusFilter, Task, TaskDraft, TaskEdit, TaskId, TaskQuery, TaskService,
    TaskServiceError, TaskStats, UnlockState,
};
use once_cell::sync::Lazy;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use uuid::Uuid;

const DB_FILE_NAME: &str = "momentum.sqlite3";
const DB_PATH_ENV: &str = "MOMENTUM_DB_PATH";
const DUE_DATE_FORMAT: &str = "%Y-%m-%d";
const LOCKED_MESSAGE: &str = "app is locked; unlock before accessing tasks";

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static NOTIFICATION_CENTER: Lazy<Mutex<InMemoryNotificationCenter>> =
    Lazy::new(|| Mutex::new(InMemoryNotificationCenter::new()));
static AUTH_GATE: Lazy<Mutex<AuthGate<ReportedOutcome>>> = Lazy::new(|| {
    Mutex::new(AuthGate::new(ReportedOutcome(Err(AuthError::Unavailable(
        "no verification reported yet".to_string(),
    )))))
});

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Unlock gate state returned to the lock screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    pub unlocked: bool,
    /// Empty on success; failure reason otherwise.
    pub message: String,
}

/// Flat task projection for list rows and detail screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub is_completed: bool,
    /// `YYYY-MM-DD`.
    pub due_date: Option<String>,
    /// `low|normal|high`.
    pub priority: Option<String>,
    pub notes: Option<String>,
    pub image: Option<Vec<u8>>,
    pub created_at_ms: i64,
    pub edited_at_ms: Option<i64>,
    pub is_overdue: bool,
    pub reminder_enabled: bool,
    pub reminder_at_ms: Option<i64>,
    pub reminder_repeating: bool,
    /// `none|daily|weekly|monthly|yearly`.
    pub reminder_interval: String,
}

/// Single-task response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResponse {
    pub ok: bool,
    /// Affected task; `None` on failure and after delete.
    pub task: Option<TaskItem>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl TaskResponse {
    fn success(message: impl Into<String>, task: Option<TaskItem>) -> Self {
        Self {
            ok: true,
            task,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task: None,
            message: message.into(),
        }
    }
}

/// Task list response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub ok: bool,
    pub items: Vec<TaskItem>,
    pub message: String,
}

impl TaskListResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            message: message.into(),
        }
    }
}

/// Pending notification as the host should register it with the OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingNotificationItem {
    pub reminder_id: String,
    pub task_id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub body: String,
    pub category: String,
    pub repeats: bool,
    /// Next fire instant after now, `None` for a one-shot already in the past.
    pub next_fire_at_ms: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayProgressItem {
    /// `YYYY-MM-DD`.
    pub date: String,
    /// Short English weekday, e.g. `Mon`.
    pub weekday: String,
    pub total: u32,
    pub completed: u32,
}

/// Dashboard statistics envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsResponse {
    pub ok: bool,
    pub total: u32,
    pub completed: u32,
    pub pending: u32,
    pub overdue: u32,
    pub completion_rate: f64,
    pub completion_percent: u32,
    pub high: u32,
    pub normal: u32,
    pub low: u32,
    pub weekly: Vec<DayProgressItem>,
    pub recent: Vec<TaskItem>,
    pub message: String,
}

impl StatsResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            total: 0,
            completed: 0,
            pending: 0,
            overdue: 0,
            completion_rate: 0.0,
            completion_percent: 0,
            high: 0,
            normal: 0,
            low: 0,
            weekly: Vec::new(),
            recent: Vec::new(),
            message: message.into(),
        }
    }
}

/// Feeds the platform biometric result into the unlock gate.
///
/// Called once at launch and again for every manual retry.
///
/// # FFI contract
/// - `success=false, available=false` maps to "verification unavailable".
/// - `success=false, available=true` maps to "verification denied".
#[flutter_rust_bridge::frb(sync)]
pub fn auth_report_unlock(success: bool, available: bool, reason: String) -> AuthResponse {
    report_unlock(
        &mut lock_ignoring_poison(&AUTH_GATE),
        success,
        available,
        reason,
    )
}

fn report_unlock(
    gate: &mut AuthGate<ReportedOutcome>,
    success: bool,
    available: bool,
    reason: String,
) -> AuthResponse {
    let outcome = match (success, available) {
        (true, _) => Ok(()),
        (false, false) => Err(AuthError::Unavailable(reason)),
        (false, true) => Err(AuthError::Denied(reason)),
    };

    *gate.authenticator_mut() = ReportedOutcome(outcome);
    match gate.try_unlock() {
        Ok(()) => AuthResponse {
            unlocked: true,
            message: String::new(),
        },
        Err(err) => AuthResponse {
            unlocked: gate.is_unlocked(),
            message: err.to_string(),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn auth_is_unlocked() -> bool {
    lock_ignoring_poison(&AUTH_GATE).is_unlocked()
}

/// Locks the app again; the next task call is refused until unlock.
#[flutter_rust_bridge::frb(sync)]
pub fn auth_lock() {
    lock_ignoring_poison(&AUTH_GATE).lock();
}

/// Records the OS notification permission and reconciles reminders once
/// permission is granted.
///
/// Returns an empty string on success and an error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn notifications_set_authorized(granted: bool) -> String {
    lock_ignoring_poison(&NOTIFICATION_CENTER).set_authorized(granted);
    info!("event=notification_permission module=ffi status=ok granted={granted}");
    if !granted || !auth_is_unlocked() {
        return String::new();
    }

    match with_task_service(|service| service.resync_reminders()) {
        Ok(_) => String::new(),
        Err(err) => format!("notifications_set_authorized failed: {err}"),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_create(
    title: String,
    priority: Option<String>,
    due_date: Option<String>,
    notes: Option<String>,
    image: Option<Vec<u8>>,
) -> TaskResponse {
    let draft = match parse_priority(priority).and_then(|priority| {
        Ok(TaskDraft {
            title,
            priority,
            due_date: parse_due_date(due_date)?,
            notes,
            image,
        })
    }) {
        Ok(draft) => draft,
        Err(message) => return TaskResponse::failure(format!("task_create failed: {message}")),
    };

    respond_with_task("Task created.", "task_create", |service| {
        service.create_task(draft)
    })
}

/// Replaces task content.
///
/// `image_action` is one of `keep|replace|remove`; `image` is read only for
/// `replace`.
#[flutter_rust_bridge::frb(sync)]
pub fn task_update(
    id: String,
    title: String,
    priority: Option<String>,
    due_date: Option<String>,
    notes: Option<String>,
    image_action: String,
    image: Option<Vec<u8>>,
) -> TaskResponse {
    let parsed = parse_task_id(&id).and_then(|task_id| {
        let edit = TaskEdit {
            title,
            priority: parse_priority(priority)?,
            due_date: parse_due_date(due_date)?,
            notes,
            image: parse_image_edit(&image_action, image)?,
        };
        Ok((task_id, edit))
    });
    let (task_id, edit) = match parsed {
        Ok(value) => value,
        Err(message) => return TaskResponse::failure(format!("task_update failed: {message}")),
    };

    respond_with_task("Task updated.", "task_update", |service| {
        service.update_task(task_id, edit)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle(id: String) -> TaskResponse {
    let task_id = match parse_task_id(&id) {
        Ok(task_id) => task_id,
        Err(message) => return TaskResponse::failure(format!("task_toggle failed: {message}")),
    };
    respond_with_task("Task updated.", "task_toggle", |service| {
        service.toggle_completed(task_id)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(id: String) -> TaskResponse {
    let task_id = match parse_task_id(&id) {
        Ok(task_id) => task_id,
        Err(message) => return TaskResponse::failure(format!("task_delete failed: {message}")),
    };
    match with_task_service(|service| service.delete_task(task_id)) {
        Ok(()) => TaskResponse::success("Task deleted.", None),
        Err(err) => TaskResponse::failure(format!("task_delete failed: {err}")),
    }
}

/// Runs the list pipeline.
///
/// Empty `status`, `priority` or `sort` strings select the defaults
/// (`all`, `all`, `created_newest`).
#[flutter_rust_bridge::frb(sync)]
pub fn task_list(search: String, status: String, priority: String, sort: String) -> TaskListResponse {
    let query = match parse_query(search, &status, &priority, &sort) {
        Ok(query) => query,
        Err(message) => return TaskListResponse::failure(format!("task_list failed: {message}")),
    };
    list_response("task_list", |service| service.list_tasks(&query))
}

/// Calendar day view for `date` (`YYYY-MM-DD`).
#[flutter_rust_bridge::frb(sync)]
pub fn task_due_on(date: String) -> TaskListResponse {
    let day = match parse_due_date(Some(date)) {
        Ok(Some(day)) => day,
        Ok(None) => return TaskListResponse::failure("task_due_on failed: date is required"),
        Err(message) => return TaskListResponse::failure(format!("task_due_on failed: {message}")),
    };
    list_response("task_due_on", |service| service.tasks_due_on(day))
}

/// Enables a reminder at `trigger_at_ms`.
///
/// `interval` is one of `none|daily|weekly|monthly|yearly`; `repeating` with
/// `none` is stored as a one-shot.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_enable(
    id: String,
    trigger_at_ms: i64,
    repeating: bool,
    interval: String,
) -> TaskResponse {
    let parsed = parse_task_id(&id).and_then(|task_id| {
        let trigger_at = parse_instant(trigger_at_ms)?;
        let interval = RepeatInterval::parse(interval.trim())
            .ok_or_else(|| format!("unknown repeat interval `{interval}`"))?;
        let settings = if repeating {
            ReminderSettings::repeating(trigger_at, interval)
        } else {
            ReminderSettings::once(trigger_at)
        };
        Ok((task_id, settings))
    });
    let (task_id, settings) = match parsed {
        Ok(value) => value,
        Err(message) => {
            return TaskResponse::failure(format!("reminder_enable failed: {message}"))
        }
    };

    respond_with_task("Reminder scheduled.", "reminder_enable", |service| {
        service.enable_reminder(task_id, settings)
    })
}

/// One-tap reminder one hour from now.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_enable_quick(id: String) -> TaskResponse {
    let task_id = match parse_task_id(&id) {
        Ok(task_id) => task_id,
        Err(message) => {
            return TaskResponse::failure(format!("reminder_enable_quick failed: {message}"))
        }
    };
    respond_with_task("Reminder scheduled.", "reminder_enable_quick", |service| {
        service.enable_quick_reminder(task_id)
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn reminder_disable(id: String) -> TaskResponse {
    let task_id = match parse_task_id(&id) {
        Ok(task_id) => task_id,
        Err(message) => {
            return TaskResponse::failure(format!("reminder_disable failed: {message}"))
        }
    };
    respond_with_task("Reminder disabled.", "reminder_disable", |service| {
        service.disable_reminder(task_id)
    })
}

/// Requests the host must mirror into the OS scheduler.
#[flutter_rust_bridge::frb(sync)]
pub fn notification_pending() -> Vec<PendingNotificationItem> {
    let now = DefaultClock.utc();
    let offset = local_offset();
    lock_ignoring_poison(&NOTIFICATION_CENTER)
        .pending_requests()
        .into_iter()
        .map(|request| to_pending_item(request, now, &offset))
        .collect()
}

/// Applies a notification response.
///
/// `action_id` is the host action identifier: `COMPLETE`, `SNOOZE` or
/// `DEFAULT` (body tap). `task_id` comes from the notification user info.
#[flutter_rust_bridge::frb(sync)]
pub fn notification_respond(task_id: String, action_id: String) -> TaskResponse {
    let parsed = parse_task_id(&task_id).and_then(|task_id| {
        let action = NotificationAction::parse(action_id.trim())
            .ok_or_else(|| format!("unknown notification action `{action_id}`"))?;
        Ok((task_id, action))
    });
    let (task_id, action) = match parsed {
        Ok(value) => value,
        Err(message) => {
            return TaskResponse::failure(format!("notification_respond failed: {message}"))
        }
    };

    match with_task_service(|service| service.handle_notification_action(task_id, action)) {
        Ok(outcome) => {
            let message = match &outcome {
                ActionOutcome::Completed(_) => "Task completed.",
                ActionOutcome::Snoozed(_) => "Reminder snoozed.",
                ActionOutcome::Opened(_) => "Task opened.",
            };
            TaskResponse::success(message, Some(to_task_item(outcome.task(), today())))
        }
        Err(err) => TaskResponse::failure(format!("notification_respond failed: {err}")),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn task_stats() -> StatsResponse {
    match with_task_service(|service| service.stats()) {
        Ok(stats) => to_stats_response(stats),
        Err(err) => StatsResponse::failure(format!("task_stats failed: {err}")),
    }
}

type FfiTaskService<'conn, 'center> = TaskService<
    SqliteTaskRepository<'conn>,
    &'center mut InMemoryNotificationCenter,
    DefaultClock,
>;

fn with_task_service<T>(
    f: impl FnOnce(&mut FfiTaskService<'_, '_>) -> Result<T, TaskServiceError>,
) -> Result<T, String> {
    require_unlocked(&*lock_ignoring_poison(&AUTH_GATE))?;

    // The center lock also serializes database access across FFI calls.
    let mut center = lock_ignoring_poison(&NOTIFICATION_CENTER);
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("task DB open failed: {err}"))?;
    let scheduler = ReminderScheduler::new(&mut *center, local_offset());
    let mut service = TaskService::new(SqliteTaskRepository::new(&conn), scheduler, DefaultClock);
    f(&mut service).map_err(|err| err.to_string())
}

fn respond_with_task(
    success_message: &str,
    operation: &str,
    f: impl FnOnce(&mut FfiTaskService<'_, '_>) -> Result<Task, TaskServiceError>,
) -> TaskResponse {
    match with_task_service(f) {
        Ok(task) => TaskResponse::success(success_message, Some(to_task_item(&task, today()))),
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error op={operation}");
            TaskResponse::failure(format!("{operation} failed: {err}"))
        }
    }
}

fn list_response(
    operation: &str,
    f: impl FnOnce(&mut FfiTaskService<'_, '_>) -> Result<Vec<Task>, TaskServiceError>,
) -> TaskListResponse {
    match with_task_service(f) {
        Ok(tasks) => {
            let today = today();
            let items: Vec<_> = tasks.iter().map(|task| to_task_item(task, today)).collect();
            let message = if items.is_empty() {
                "No tasks.".to_string()
            } else {
                format!("Found {} task(s).", items.len())
            };
            TaskListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => TaskListResponse::failure(format!("{operation} failed: {err}")),
    }
}

fn require_unlocked(gate: &impl UnlockState) -> Result<(), String> {
    if gate.is_unlocked() {
        Ok(())
    } else {
        Err(LOCKED_MESSAGE.to_string())
    }
}

fn lock_ignoring_poison<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn local_offset() -> FixedOffset {
    *DefaultClock.local().offset()
}

fn today() -> NaiveDate {
    DefaultClock.utc().with_timezone(&local_offset()).date_naive()
}

fn parse_task_id(raw: &str) -> Result<TaskId, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid task id `{raw}`"))
}

fn parse_priority(raw: Option<String>) -> Result<Option<Priority>, String> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Priority::parse(value)
            .map(Some)
            .ok_or_else(|| format!("unknown priority `{value}`")),
    }
}

fn parse_due_date(raw: Option<String>) -> Result<Option<NaiveDate>, String> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => NaiveDate::parse_from_str(value, DUE_DATE_FORMAT)
            .map(Some)
            .map_err(|_| format!("invalid date `{value}`; expected YYYY-MM-DD")),
    }
}

fn parse_image_edit(action: &str, image: Option<Vec<u8>>) -> Result<ImageEdit, String> {
    match action.trim() {
        "" | "keep" => Ok(ImageEdit::Keep),
        "remove" => Ok(ImageEdit::Remove),
        "replace" => image
            .map(ImageEdit::Replace)
            .ok_or_else(|| "image bytes are required for `replace`".to_string()),
        other => Err(format!("unknown image action `{other}`")),
    }
}

fn parse_instant(millis: i64) -> Result<DateTime<Utc>, String> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| format!("timestamp `{millis}` is out of range"))
}

fn parse_query(search: String, status: &str, priority: &str, sort: &str) -> Result<TaskQuery, String> {
    fn or_default<T: Default>(
        raw: &str,
        parse: impl Fn(&str) -> Option<T>,
        label: &str,
    ) -> Result<T, String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(T::default());
        }
        parse(trimmed).ok_or_else(|| format!("unknown {label} `{trimmed}`"))
    }

    Ok(TaskQuery {
        search_text: search,
        status: or_default(status, StatusFilter::parse, "status filter")?,
        priority: or_default(priority, PriorityFilter::parse, "priority filter")?,
        sort: or_default(sort, SortOption::parse, "sort option")?,
    })
}

fn to_task_item(task: &Task, today: NaiveDate) -> TaskItem {
    let reminder = task.reminder.as_ref();
    TaskItem {
        id: task.id.to_string(),
        title: task.title.clone(),
        is_completed: task.is_completed,
        due_date: task
            .due_date
            .map(|date| date.format(DUE_DATE_FORMAT).to_string()),
        priority: task.priority.map(|priority| priority.as_str().to_string()),
        notes: task.notes.clone(),
        image: task.image.clone(),
        created_at_ms: task.created_at.timestamp_millis(),
        edited_at_ms: task.edited_at.map(|value| value.timestamp_millis()),
        is_overdue: task.is_overdue(today),
        reminder_enabled: reminder.is_some_and(|reminder| reminder.enabled),
        reminder_at_ms: reminder
            .and_then(|reminder| reminder.trigger_at)
            .map(|value| value.timestamp_millis()),
        reminder_repeating: reminder.is_some_and(|reminder| reminder.repeating),
        reminder_interval: reminder
            .map_or(RepeatInterval::None, |reminder| reminder.interval)
            .as_str()
            .to_string(),
    }
}

fn to_pending_item(
    request: NotificationRequest,
    now: DateTime<Utc>,
    offset: &FixedOffset,
) -> PendingNotificationItem {
    let after = now.with_timezone(offset).naive_local();
    let next_fire_at_ms = request
        .trigger
        .next_fire_after(after)
        .and_then(|local| offset.from_local_datetime(&local).single())
        .map(|instant| instant.timestamp_millis());

    PendingNotificationItem {
        reminder_id: request.id.to_string(),
        task_id: request.content.user_info.task_id.to_string(),
        title: request.content.title,
        subtitle: request.content.subtitle,
        body: request.content.body,
        category: request.content.category,
        repeats: request.trigger.repeats(),
        next_fire_at_ms,
    }
}

fn to_stats_response(stats: TaskStats) -> StatsResponse {
    let today = today();
    StatsResponse {
        ok: true,
        total: count(stats.total),
        completed: count(stats.completed),
        pending: count(stats.pending),
        overdue: count(stats.overdue),
        completion_rate: stats.completion_rate,
        completion_percent: stats.completion_percent,
        high: count(stats.priority_distribution.high),
        normal: count(stats.priority_distribution.normal),
        low: count(stats.priority_distribution.low),
        weekly: stats.weekly_progress.iter().map(to_day_item).collect(),
        recent: stats
            .recent
            .iter()
            .map(|task| to_task_item(task, today))
            .collect(),
        message: String::new(),
    }
}

fn to_day_item(day: &DayProgress) -> DayProgressItem {
    DayProgressItem {
        date: day.date.format(DUE_DATE_FORMAT).to_string(),
        weekday: day.weekday.to_string(),
        total: count(day.total),
        completed: count(day.completed),
    }
}

fn count(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{
        auth_report_unlock, core_version, init_logging, notification_pending,
        notification_respond, notifications_set_authorized, parse_image_edit, parse_query,
        ping, reminder_disable, report_unlock, reminder_enable, require_unlocked, task_create, task_delete,
        task_list, task_stats, task_toggle, LOCKED_MESSAGE,
    };
    use chrono::Utc;
    use momentum_core::{
        AuthGate, ImageEdit, ReportedOutcome, SortOption, StatusFilter, UnlockState,
    };
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unlock() {
        let response = auth_report_unlock(true, true, String::new());
        assert!(response.unlocked, "{}", response.message);
    }

    fn unique_token(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time went backwards")
            .as_nanos();
        format!("{prefix}-{nanos}")
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "/tmp/momentum-logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn locked_gate_refuses_task_access() {
        let gate = AuthGate::new(ReportedOutcome(Ok(())));
        assert_eq!(require_unlocked(&gate).expect_err("locked"), LOCKED_MESSAGE);
    }

    #[test]
    fn failed_verification_reports_reason_and_stays_locked() {
        let mut gate = AuthGate::new(ReportedOutcome(Ok(())));

        let unavailable = report_unlock(&mut gate, false, false, "no biometrics".to_string());
        assert!(!unavailable.unlocked);
        assert!(unavailable.message.contains("no biometrics"));

        let denied = report_unlock(&mut gate, false, true, "face not recognized".to_string());
        assert!(!denied.unlocked);
        assert!(denied.message.contains("face not recognized"));
        assert!(!gate.is_unlocked());

        let retried = report_unlock(&mut gate, true, true, String::new());
        assert!(retried.unlocked);
        assert!(retried.message.is_empty());
        assert!(gate.is_unlocked());
    }

    #[test]
    fn query_strings_default_when_empty() {
        let query = parse_query("milk".to_string(), "", "", "").expect("defaults");
        assert_eq!(query.status, StatusFilter::All);
        assert_eq!(query.sort, SortOption::CreatedNewest);

        let query = parse_query(String::new(), "active", "high", "alpha_za").expect("parsed");
        assert_eq!(query.status, StatusFilter::Active);
        assert_eq!(query.sort, SortOption::AlphaZA);
        assert!(parse_query(String::new(), "done", "", "").is_err());
    }

    #[test]
    fn image_edit_requires_bytes_for_replace() {
        assert_eq!(parse_image_edit("", None).expect("keep"), ImageEdit::Keep);
        assert_eq!(parse_image_edit("remove", None).expect("remove"), ImageEdit::Remove);
        assert!(parse_image_edit("replace", None).is_err());
    }

    #[test]
    fn create_toggle_list_and_delete() {
        unlock();
        let token = unique_token("ffi-task");
        let created = task_create(
            format!("Buy milk {token}"),
            Some("high".to_string()),
            Some("2030-01-15".to_string()),
            None,
            None,
        );
        assert!(created.ok, "{}", created.message);
        let item = created.task.expect("created task");
        assert_eq!(item.priority.as_deref(), Some("high"));
        assert_eq!(item.due_date.as_deref(), Some("2030-01-15"));

        let toggled = task_toggle(item.id.clone());
        assert!(toggled.task.expect("toggled task").is_completed);

        let listed = task_list(token.clone(), "completed".to_string(), "high".to_string(), String::new());
        assert!(listed.ok, "{}", listed.message);
        assert_eq!(listed.items.len(), 1);

        let deleted = task_delete(item.id);
        assert!(deleted.ok, "{}", deleted.message);
        let listed = task_list(token, String::new(), String::new(), String::new());
        assert!(listed.items.is_empty());
    }

    #[test]
    fn reminder_flow_through_notification_center() {
        unlock();
        notifications_set_authorized(true);
        let token = unique_token("ffi-reminder");
        let created = task_create(format!("Call {token}"), None, None, None, None);
        let id = created.task.expect("created task").id;

        let trigger_at_ms = Utc::now().timestamp_millis() + 3_600_000;
        let enabled = reminder_enable(id.clone(), trigger_at_ms, true, "weekly".to_string());
        assert!(enabled.ok, "{}", enabled.message);
        let item = enabled.task.expect("task with reminder");
        assert!(item.reminder_enabled);
        assert_eq!(item.reminder_interval, "weekly");

        let pending = notification_pending();
        let request = pending
            .iter()
            .find(|request| request.task_id == id)
            .expect("pending request for task");
        assert!(request.repeats);
        assert!(request.next_fire_at_ms.is_some());

        let completed = notification_respond(id.clone(), "COMPLETE".to_string());
        assert!(completed.ok, "{}", completed.message);
        assert!(!notification_pending().iter().any(|request| request.task_id == id));

        let disabled = reminder_disable(id.clone());
        assert!(disabled.ok, "{}", disabled.message);
        assert!(task_delete(id).ok);
    }

    #[test]
    fn stats_are_reported() {
        unlock();
        let created = task_create(unique_token("ffi-stats"), None, None, None, None);
        assert!(created.ok, "{}", created.message);

        let stats = task_stats();
        assert!(stats.ok, "{}", stats.message);
        assert!(stats.total >= 1);
        assert_eq!(stats.weekly.len(), 7);
        assert_eq!(stats.completed + stats.pending + stats.overdue, stats.total);
    }
}
