use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, TimeZone, Utc};
use momentum_core::db::open_db_in_memory;
use momentum_core::{
    compute_stats, InMemoryNotificationCenter, Priority, ReminderScheduler,
    SqliteTaskRepository, Task, TaskDraft, TaskService,
};

struct FixedClock(DateTime<Utc>);

impl mockable::Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

#[test]
fn counters_split_overdue_from_pending() {
    let created = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
    let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();

    let mut done = Task::new("done", created).unwrap();
    done.set_completed(true);
    done.due_date = today.pred_opt();
    let mut late = Task::new("late", created).unwrap();
    late.due_date = today.pred_opt();
    late.priority = Some(Priority::High);
    let mut due_today = Task::new("due today", created).unwrap();
    due_today.due_date = Some(today);
    due_today.priority = Some(Priority::Low);
    let undated = Task::new("undated", created).unwrap();

    let local_now = FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2024, 5, 10, 12, 0, 0)
        .unwrap();
    let stats = compute_stats(&[done, late, due_today, undated], local_now);

    assert_eq!(stats.total, 4);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.overdue, 1);
    assert_eq!(stats.pending, 2);
    assert_eq!(stats.completion_percent, 25);
    assert!((stats.completion_rate - 0.25).abs() < f64::EPSILON);
    assert_eq!(stats.priority_distribution.high, 1);
    assert_eq!(stats.priority_distribution.low, 1);
    assert_eq!(stats.priority_distribution.normal, 2);
}

#[test]
fn service_stats_cover_last_seven_days() {
    let conn = open_db_in_memory().unwrap();
    let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
    let offset = FixedOffset::east_opt(0).unwrap();

    for days_ago in [0, 0, 3, 9] {
        let clock = FixedClock(now - Duration::days(days_ago));
        let scheduler = ReminderScheduler::new(InMemoryNotificationCenter::new(), offset);
        let mut service = TaskService::new(SqliteTaskRepository::new(&conn), scheduler, clock);
        let task = service
            .create_task(TaskDraft::titled(format!("made {days_ago} days ago")))
            .unwrap();
        if days_ago == 3 {
            service.set_completed(task.id, true).unwrap();
        }
    }

    let scheduler = ReminderScheduler::new(InMemoryNotificationCenter::new(), offset);
    let service = TaskService::new(SqliteTaskRepository::new(&conn), scheduler, FixedClock(now));
    let stats = service.stats().unwrap();

    assert_eq!(stats.total, 4);
    let week = &stats.weekly_progress;
    assert_eq!(week.len(), 7);
    assert_eq!(week[6].date, NaiveDate::from_ymd_opt(2024, 5, 10).unwrap());
    assert_eq!(week[6].total, 2);
    assert_eq!(week[3].total, 1);
    assert_eq!(week[3].completed, 1);
    assert_eq!(week.iter().map(|day| day.total).sum::<usize>(), 3);
    assert_eq!(stats.recent.len(), 4);
    assert!(stats.recent[3].title.starts_with("made 9"));
}
