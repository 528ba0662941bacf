//! Reminder scheduling decisions.
//!
//! # Responsibility
//! - Map a task's reminder settings to exactly one notification request.
//! - Keep the persisted `enabled` flag in line with what the notification
//!   center acknowledged.
//!
//! # Invariants
//! - One live request per task with an enabled reminder, zero otherwise.
//! - The reminder id is allocated once and reused until the task is deleted.
//! - A failed schedule leaves the reminder disabled (id kept, fields cleared).
//! - Disabling an already-disabled reminder issues no cancellation.

use crate::model::reminder::{Reminder, ReminderSettings, RepeatInterval};
use crate::model::task::Task;
use crate::notify::center::{NotificationCenter, NotificationError, NotifyResult};
use crate::notify::request::{NotificationContent, NotificationRequest};
use crate::notify::trigger::TriggerSpec;
use chrono::{DateTime, Duration, FixedOffset, Utc};
use log::{error, info, warn};

/// Delay applied by the notification `SNOOZE` action.
pub const SNOOZE_DELAY_MINUTES: i64 = 10;
/// Delay used by the one-tap reminder action on a task row.
pub const QUICK_REMINDER_DELAY_MINUTES: i64 = 60;

/// Per-task reminder state as seen by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderState {
    NoReminder,
    Scheduled(TriggerSpec),
    /// Terminal state after the owning task was deleted.
    Cancelled,
}

/// Reminder scheduler over an injected notification center.
pub struct ReminderScheduler<N: NotificationCenter> {
    center: N,
    offset: FixedOffset,
}

impl<N: NotificationCenter> ReminderScheduler<N> {
    /// Creates a scheduler. `offset` is the device's local offset used to
    /// derive calendar components for trigger specs.
    pub fn new(center: N, offset: FixedOffset) -> Self {
        Self { center, offset }
    }

    pub fn center(&self) -> &N {
        &self.center
    }

    pub fn center_mut(&mut self) -> &mut N {
        &mut self.center
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Trigger spec for `settings` in this scheduler's local offset.
    pub fn trigger_spec(&self, settings: &ReminderSettings) -> TriggerSpec {
        TriggerSpec::for_settings(settings, &self.offset)
    }

    /// Request that must be live for `task`, or `None` when its reminder is
    /// not enabled.
    pub fn build_request(&self, task: &Task) -> Option<NotificationRequest> {
        let reminder = task.reminder.as_ref()?;
        let settings = reminder.settings()?;
        Some(NotificationRequest {
            id: reminder.id,
            content: NotificationContent::for_task(task, settings.repeating),
            trigger: self.trigger_spec(&settings),
        })
    }

    pub fn state(&self, task: &Task) -> ReminderState {
        match self.build_request(task) {
            Some(request) => ReminderState::Scheduled(request.trigger),
            None => ReminderState::NoReminder,
        }
    }

    /// True when the center currently holds a request for this task.
    pub fn is_scheduled(&self, task: &Task) -> bool {
        task.reminder.as_ref().is_some_and(|reminder| {
            self.center
                .pending_requests()
                .iter()
                .any(|request| request.id == reminder.id)
        })
    }

    /// Enables the reminder with `settings` and registers its request.
    ///
    /// # Errors
    /// - `AuthorizationDenied` when notifications are not permitted.
    /// - `SchedulingFailed` when the center rejects the request.
    ///
    /// On error the reminder is left disabled; the caller persists the task
    /// either way.
    pub fn enable(&mut self, task: &mut Task, settings: ReminderSettings) -> NotifyResult<()> {
        if settings.repeating && settings.interval == RepeatInterval::None {
            warn!(
                "event=reminder_normalize module=reminder status=warn task_id={} reason=repeat_without_interval",
                task.id
            );
        }
        let reminder = task.reminder.get_or_insert_with(Reminder::allocate);
        let reminder_id = reminder.id;
        self.center.cancel(&reminder_id);
        reminder.activate(&settings);

        self.register(task)
    }

    /// Re-registers an enabled reminder, e.g. after the title changed.
    ///
    /// No-op for tasks without an enabled reminder.
    pub fn reschedule(&mut self, task: &mut Task) -> NotifyResult<()> {
        if !task.has_active_reminder() {
            return Ok(());
        }
        self.register(task)
    }

    /// Disables the reminder. Returns `false` when there was nothing to
    /// disable, in which case the center is not touched.
    pub fn disable(&mut self, task: &mut Task) -> bool {
        let Some(reminder) = task.reminder.as_mut().filter(|reminder| reminder.enabled) else {
            return false;
        };
        self.center.cancel(&reminder.id);
        reminder.deactivate();
        info!(
            "event=reminder_disable module=reminder status=ok task_id={} reminder_id={}",
            task.id, reminder.id
        );
        true
    }

    /// Cancels any request and drops the reminder for a task being deleted.
    pub fn release(&mut self, task: &mut Task) -> ReminderState {
        if let Some(reminder) = task.reminder.take() {
            self.center.cancel(&reminder.id);
            info!(
                "event=reminder_release module=reminder status=ok task_id={} reminder_id={}",
                task.id, reminder.id
            );
        }
        ReminderState::Cancelled
    }

    /// Reschedules a one-shot reminder [`SNOOZE_DELAY_MINUTES`] after `now`.
    pub fn snooze(&mut self, task: &mut Task, now: DateTime<Utc>) -> NotifyResult<()> {
        let trigger_at = now + Duration::minutes(SNOOZE_DELAY_MINUTES);
        self.enable(task, ReminderSettings::once(trigger_at))
    }

    /// Enables a one-shot reminder [`QUICK_REMINDER_DELAY_MINUTES`] after `now`.
    pub fn quick_enable(&mut self, task: &mut Task, now: DateTime<Utc>) -> NotifyResult<()> {
        let trigger_at = now + Duration::minutes(QUICK_REMINDER_DELAY_MINUTES);
        self.enable(task, ReminderSettings::once(trigger_at))
    }

    fn register(&mut self, task: &mut Task) -> NotifyResult<()> {
        let Some(request) = self.build_request(task) else {
            return Ok(());
        };
        let reminder_id = request.id;
        let repeats = request.trigger.repeats();

        let outcome = if self.center.is_authorized() || self.center.request_authorization() {
            self.center.schedule(request)
        } else {
            Err(NotificationError::AuthorizationDenied)
        };

        match outcome {
            Ok(()) => {
                info!(
                    "event=reminder_schedule module=reminder status=ok task_id={} reminder_id={reminder_id} repeats={repeats}",
                    task.id
                );
                Ok(())
            }
            Err(err) => {
                // A previous registration may still be live under this id.
                self.center.cancel(&reminder_id);
                if let Some(reminder) = task.reminder.as_mut() {
                    reminder.deactivate();
                }
                let error_code = match err {
                    NotificationError::AuthorizationDenied => "authorization_denied",
                    NotificationError::SchedulingFailed(_) => "scheduling_failed",
                };
                error!(
                    "event=reminder_schedule module=reminder status=error task_id={} reminder_id={reminder_id} error_code={error_code}",
                    task.id
                );
                Err(err)
            }
        }
    }
}
