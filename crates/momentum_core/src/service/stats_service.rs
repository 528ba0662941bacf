//! Dashboard statistics over the task collection.
//!
//! # Responsibility
//! - Derive counters, completion rate, priority split and the seven-day
//!   progress strip from a task snapshot.
//!
//! # Invariants
//! - `completed + pending + overdue == total`.
//! - Overdue tasks are open tasks due strictly before the local today.
//! - Absent priority is counted as `Normal`.

use crate::model::task::{Priority, Task};
use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate, Weekday};

/// Number of days covered by `weekly_progress`, today included.
pub const WEEKLY_WINDOW_DAYS: u64 = 7;
/// Number of tasks listed in `recent`.
pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriorityDistribution {
    pub high: usize,
    pub normal: usize,
    pub low: usize,
}

/// Tasks created on one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayProgress {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub total: usize,
    pub completed: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    /// Open and not overdue.
    pub pending: usize,
    pub overdue: usize,
    /// `completed / total`, `0.0` for an empty collection.
    pub completion_rate: f64,
    /// Floor of `completion_rate * 100`.
    pub completion_percent: u32,
    pub priority_distribution: PriorityDistribution,
    /// Oldest day first, ending with today.
    pub weekly_progress: Vec<DayProgress>,
    /// Newest tasks by creation time.
    pub recent: Vec<Task>,
}

/// Computes statistics for `tasks` as seen at `local_now`.
pub fn compute_stats(tasks: &[Task], local_now: DateTime<FixedOffset>) -> TaskStats {
    let today = local_now.date_naive();
    let offset = *local_now.offset();

    let total = tasks.len();
    let completed = tasks.iter().filter(|task| task.is_completed).count();
    let overdue = tasks.iter().filter(|task| task.is_overdue(today)).count();
    let pending = total - completed - overdue;

    let (completion_rate, completion_percent) = if total == 0 {
        (0.0, 0)
    } else {
        (
            completed as f64 / total as f64,
            u32::try_from(completed * 100 / total).unwrap_or(100),
        )
    };

    TaskStats {
        total,
        completed,
        pending,
        overdue,
        completion_rate,
        completion_percent,
        priority_distribution: priority_distribution(tasks),
        weekly_progress: weekly_progress(tasks, today, &offset),
        recent: recent_tasks(tasks),
    }
}

fn priority_distribution(tasks: &[Task]) -> PriorityDistribution {
    let mut distribution = PriorityDistribution::default();
    for task in tasks {
        match task.priority.unwrap_or(Priority::Normal) {
            Priority::High => distribution.high += 1,
            Priority::Normal => distribution.normal += 1,
            Priority::Low => distribution.low += 1,
        }
    }
    distribution
}

fn weekly_progress(tasks: &[Task], today: NaiveDate, offset: &FixedOffset) -> Vec<DayProgress> {
    (0..WEEKLY_WINDOW_DAYS)
        .rev()
        .filter_map(|days_back| today.checked_sub_days(Days::new(days_back)))
        .map(|date| {
            let created_that_day = tasks
                .iter()
                .filter(|task| task.created_at.with_timezone(offset).date_naive() == date);
            let (total, completed) = created_that_day.fold((0, 0), |(total, completed), task| {
                (total + 1, completed + usize::from(task.is_completed))
            });
            DayProgress {
                date,
                weekday: date.weekday(),
                total,
                completed,
            }
        })
        .collect()
}

fn recent_tasks(tasks: &[Task]) -> Vec<Task> {
    let mut newest: Vec<&Task> = tasks.iter().collect();
    newest.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    newest.into_iter().take(RECENT_LIMIT).cloned().collect()
}
