use chrono::{FixedOffset, TimeZone, Utc, Weekday};
use momentum_core::{
    DateMatch, InMemoryNotificationCenter, NotificationCenter, NotificationError,
    NotificationRequest, NotifyResult, ReminderId, ReminderScheduler, ReminderSettings,
    RepeatInterval, Task, TriggerSpec,
};

/// Center wrapper that counts side effects.
#[derive(Default)]
struct RecordingCenter {
    inner: InMemoryNotificationCenter,
    schedules: usize,
    cancels: usize,
    fail_next_schedule: bool,
}

impl RecordingCenter {
    fn authorized() -> Self {
        Self {
            inner: InMemoryNotificationCenter::authorized(),
            ..Self::default()
        }
    }
}

impl NotificationCenter for RecordingCenter {
    fn request_authorization(&mut self) -> bool {
        self.inner.request_authorization()
    }

    fn is_authorized(&self) -> bool {
        self.inner.is_authorized()
    }

    fn schedule(&mut self, request: NotificationRequest) -> NotifyResult<()> {
        self.schedules += 1;
        if std::mem::take(&mut self.fail_next_schedule) {
            return Err(NotificationError::SchedulingFailed("quota exceeded".to_string()));
        }
        self.inner.schedule(request)
    }

    fn cancel(&mut self, id: &ReminderId) {
        self.cancels += 1;
        self.inner.cancel(id);
    }

    fn cancel_all(&mut self) {
        self.inner.cancel_all();
    }

    fn pending_requests(&self) -> Vec<NotificationRequest> {
        self.inner.pending_requests()
    }
}

fn utc_offset() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

#[test]
fn enable_one_shot_roundtrip() {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    let t = Utc.with_ymd_and_hms(2024, 3, 2, 17, 45, 0).unwrap();
    let mut scheduler = ReminderScheduler::new(RecordingCenter::authorized(), utc_offset());
    let mut task = Task::new("Pick up parcel", now).unwrap();

    scheduler.enable(&mut task, ReminderSettings::once(t)).unwrap();

    let reminder = task.reminder.as_ref().unwrap();
    assert!(reminder.enabled);
    assert_eq!(reminder.trigger_at, Some(t));
    assert!(!reminder.repeating);
    assert_eq!(reminder.interval, RepeatInterval::None);

    let pending = scheduler.center().pending_requests();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, reminder.id);
    assert_eq!(pending[0].content.user_info.task_id, task.id);
    assert_eq!(pending[0].content.body, "Pick up parcel");
    assert_eq!(
        pending[0].trigger,
        TriggerSpec::Once(DateMatch {
            year: Some(2024),
            month: Some(3),
            day: Some(2),
            weekday: None,
            hour: 17,
            minute: 45,
        })
    );
}

#[test]
fn disable_twice_cancels_once() {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    let mut scheduler = ReminderScheduler::new(RecordingCenter::authorized(), utc_offset());
    let mut task = Task::new("Pick up parcel", now).unwrap();
    scheduler.enable(&mut task, ReminderSettings::once(now)).unwrap();
    let cancels_after_enable = scheduler.center().cancels;

    assert!(scheduler.disable(&mut task));
    let after_first = task.clone();
    assert!(!scheduler.disable(&mut task));

    assert_eq!(task, after_first);
    assert_eq!(scheduler.center().cancels, cancels_after_enable + 1);
    assert!(scheduler.center().pending_requests().is_empty());

    let reminder = task.reminder.as_ref().unwrap();
    assert!(!reminder.enabled);
    assert_eq!(reminder.trigger_at, None);
}

#[test]
fn weekly_reminder_matches_weekday_and_time_only() {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    let monday_nine = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
    let mut scheduler = ReminderScheduler::new(RecordingCenter::authorized(), utc_offset());
    let mut task = Task::new("Team sync", now).unwrap();

    scheduler
        .enable(
            &mut task,
            ReminderSettings::repeating(monday_nine, RepeatInterval::Weekly),
        )
        .unwrap();

    let pending = scheduler.center().pending_requests();
    assert_eq!(
        pending[0].trigger,
        TriggerSpec::Repeating(DateMatch {
            year: None,
            month: None,
            day: None,
            weekday: Some(Weekday::Mon),
            hour: 9,
            minute: 0,
        })
    );
    assert!(pending[0].content.user_info.is_repeating);

    let next = pending[0]
        .trigger
        .next_fire_after(monday_nine.naive_utc())
        .unwrap();
    assert_eq!(next, Utc.with_ymd_and_hms(2024, 3, 11, 9, 0, 0).unwrap().naive_utc());
}

#[test]
fn trigger_components_follow_local_offset() {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    // 23:30 UTC on Sunday is 08:30 Monday in UTC+9.
    let trigger_at = Utc.with_ymd_and_hms(2024, 3, 3, 23, 30, 0).unwrap();
    let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
    let mut scheduler = ReminderScheduler::new(RecordingCenter::authorized(), tokyo);
    let mut task = Task::new("Standup", now).unwrap();

    scheduler
        .enable(
            &mut task,
            ReminderSettings::repeating(trigger_at, RepeatInterval::Weekly),
        )
        .unwrap();

    let trigger = scheduler.center().pending_requests()[0].trigger;
    assert_eq!(trigger.date_match().weekday, Some(Weekday::Mon));
    assert_eq!(trigger.date_match().hour, 8);
    assert_eq!(trigger.date_match().minute, 30);
}

#[test]
fn unauthorized_enable_rolls_back_and_keeps_id() {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    let mut scheduler = ReminderScheduler::new(RecordingCenter::default(), utc_offset());
    let mut task = Task::new("Pick up parcel", now).unwrap();

    let err = scheduler
        .enable(&mut task, ReminderSettings::once(now))
        .unwrap_err();
    assert_eq!(err, NotificationError::AuthorizationDenied);

    let reminder = task.reminder.as_ref().unwrap();
    assert!(!reminder.enabled);
    assert_eq!(reminder.trigger_at, None);
    assert!(scheduler.center().pending_requests().is_empty());
    assert_eq!(scheduler.center().schedules, 0);

    let allocated = reminder.id;
    scheduler.center_mut().inner.set_authorized(true);
    scheduler.enable(&mut task, ReminderSettings::once(now)).unwrap();
    assert_eq!(task.reminder.as_ref().unwrap().id, allocated);
}

#[test]
fn scheduling_failure_rolls_back_enabled() {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    let mut center = RecordingCenter::authorized();
    center.fail_next_schedule = true;
    let mut scheduler = ReminderScheduler::new(center, utc_offset());
    let mut task = Task::new("Pick up parcel", now).unwrap();

    let err = scheduler
        .enable(
            &mut task,
            ReminderSettings::repeating(now, RepeatInterval::Daily),
        )
        .unwrap_err();
    assert!(matches!(err, NotificationError::SchedulingFailed(_)));
    assert!(!task.has_active_reminder());
    assert!(!scheduler.is_scheduled(&task));
}

#[test]
fn failed_reschedule_cancels_previous_request() {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    let mut scheduler = ReminderScheduler::new(RecordingCenter::authorized(), utc_offset());
    let mut task = Task::new("Call bank", now).unwrap();
    scheduler
        .enable(&mut task, ReminderSettings::repeating(now, RepeatInterval::Daily))
        .unwrap();
    assert!(scheduler.is_scheduled(&task));

    task.title = "Call bank about card".to_string();
    scheduler.center_mut().fail_next_schedule = true;
    let err = scheduler.reschedule(&mut task).unwrap_err();

    assert!(matches!(err, NotificationError::SchedulingFailed(_)));
    assert!(!task.has_active_reminder());
    assert!(scheduler.center().pending_requests().is_empty());
    assert!(!scheduler.disable(&mut task));
}

#[test]
fn release_leaves_no_orphan_request() {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    let mut scheduler = ReminderScheduler::new(RecordingCenter::authorized(), utc_offset());
    let mut keep = Task::new("Keep", now).unwrap();
    let mut drop_me = Task::new("Drop", now).unwrap();
    scheduler.enable(&mut keep, ReminderSettings::once(now)).unwrap();
    scheduler.enable(&mut drop_me, ReminderSettings::once(now)).unwrap();
    assert_eq!(scheduler.center().pending_requests().len(), 2);

    scheduler.release(&mut drop_me);

    let pending = scheduler.center().pending_requests();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].content.user_info.task_id, keep.id);
    assert!(drop_me.reminder.is_none());
}

#[test]
fn enabling_distinct_tasks_allocates_distinct_ids() {
    let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    let mut scheduler = ReminderScheduler::new(RecordingCenter::authorized(), utc_offset());
    let mut first = Task::new("First", now).unwrap();
    let mut second = Task::new("Second", now).unwrap();
    scheduler.enable(&mut first, ReminderSettings::once(now)).unwrap();
    scheduler.enable(&mut second, ReminderSettings::once(now)).unwrap();

    assert_ne!(
        first.reminder.as_ref().unwrap().id,
        second.reminder.as_ref().unwrap().id
    );
}
