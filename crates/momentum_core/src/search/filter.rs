//! Task list filter/sort pipeline.
//!
//! # Responsibility
//! - Map (tasks, search text, status, priority, sort) to the visible list.
//!
//! # Invariants
//! - Stage order is fixed: search -> status -> priority -> sort.
//! - Filter stages only narrow; the sort stage only reorders.
//! - Sorting is stable: ties keep their input order.
//! - Pure and synchronous; cheap enough to run on every keystroke.

use crate::model::task::{Priority, Task};
use icu_collator::{Collator, CollatorOptions, Strength};
use log::warn;
use std::cmp::Ordering;

/// Completion status filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl StatusFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "active" => Some(Self::Active),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    fn accepts(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Active => !task.is_completed,
            Self::Completed => task.is_completed,
        }
    }
}

/// Priority filter. Non-`All` values require an exact match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PriorityFilter {
    #[default]
    All,
    Low,
    Normal,
    High,
}

impl PriorityFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "low" => Some(Self::Low),
            "normal" => Some(Self::Normal),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    fn required(self) -> Option<Priority> {
        match self {
            Self::All => None,
            Self::Low => Some(Priority::Low),
            Self::Normal => Some(Priority::Normal),
            Self::High => Some(Priority::High),
        }
    }
}

/// List ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOption {
    #[default]
    CreatedNewest,
    CreatedOldest,
    DueSoonest,
    DueLatest,
    PriorityHighToLow,
    PriorityLowToHigh,
    AlphaAZ,
    AlphaZA,
}

impl SortOption {
    pub const ALL: [SortOption; 8] = [
        SortOption::CreatedNewest,
        SortOption::CreatedOldest,
        SortOption::DueSoonest,
        SortOption::DueLatest,
        SortOption::PriorityHighToLow,
        SortOption::PriorityLowToHigh,
        SortOption::AlphaAZ,
        SortOption::AlphaZA,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreatedNewest => "created_newest",
            Self::CreatedOldest => "created_oldest",
            Self::DueSoonest => "due_soonest",
            Self::DueLatest => "due_latest",
            Self::PriorityHighToLow => "priority_high_to_low",
            Self::PriorityLowToHigh => "priority_low_to_high",
            Self::AlphaAZ => "alpha_az",
            Self::AlphaZA => "alpha_za",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|option| option.as_str() == value)
    }

    /// Menu label.
    pub fn label(self) -> &'static str {
        match self {
            Self::CreatedNewest => "Creation Date (Newest)",
            Self::CreatedOldest => "Creation Date (Oldest)",
            Self::DueSoonest => "Due Date (Soonest)",
            Self::DueLatest => "Due Date (Latest)",
            Self::PriorityHighToLow => "Priority (High to Low)",
            Self::PriorityLowToHigh => "Priority (Low to High)",
            Self::AlphaAZ => "Alphabetical (A-Z)",
            Self::AlphaZA => "Alphabetical (Z-A)",
        }
    }
}

/// Full set of list criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    /// Case-insensitive substring matched against title or notes.
    pub search_text: String,
    pub status: StatusFilter,
    pub priority: PriorityFilter,
    pub sort: SortOption,
}

impl TaskQuery {
    /// True when neither status nor priority narrows the list.
    pub fn has_active_filters(&self) -> bool {
        self.status != StatusFilter::All || self.priority != PriorityFilter::All
    }

    /// Resets status and priority filters ("Clear" chip).
    pub fn clear_filters(&mut self) {
        self.status = StatusFilter::All;
        self.priority = PriorityFilter::All;
    }
}

/// Runs every stage in order and returns the visible list.
pub fn apply_query(tasks: Vec<Task>, query: &TaskQuery) -> Vec<Task> {
    let tasks = filter_by_search(tasks, &query.search_text);
    let tasks = filter_by_status(tasks, query.status);
    let mut tasks = filter_by_priority(tasks, query.priority);
    sort_tasks(&mut tasks, query.sort);
    tasks
}

/// Keeps tasks whose title or notes contain `search_text`, ignoring case.
///
/// An empty search text keeps everything.
pub fn filter_by_search(mut tasks: Vec<Task>, search_text: &str) -> Vec<Task> {
    if search_text.is_empty() {
        return tasks;
    }
    let needle = search_text.to_lowercase();
    tasks.retain(|task| {
        contains_folded(&task.title, &needle)
            || task
                .notes
                .as_deref()
                .is_some_and(|notes| contains_folded(notes, &needle))
    });
    tasks
}

pub fn filter_by_status(mut tasks: Vec<Task>, status: StatusFilter) -> Vec<Task> {
    if status != StatusFilter::All {
        tasks.retain(|task| status.accepts(task));
    }
    tasks
}

/// Absent priority never matches a non-`All` filter.
pub fn filter_by_priority(mut tasks: Vec<Task>, priority: PriorityFilter) -> Vec<Task> {
    if let Some(required) = priority.required() {
        tasks.retain(|task| task.priority == Some(required));
    }
    tasks
}

/// Stable in-place sort.
pub fn sort_tasks(tasks: &mut [Task], option: SortOption) {
    match option {
        SortOption::CreatedNewest => tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOption::CreatedOldest => tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortOption::DueSoonest => tasks.sort_by(|a, b| compare_due(a, b, false)),
        SortOption::DueLatest => tasks.sort_by(|a, b| compare_due(a, b, true)),
        SortOption::PriorityHighToLow => {
            tasks.sort_by_key(|task| std::cmp::Reverse(Priority::rank(task.priority)));
        }
        SortOption::PriorityLowToHigh => tasks.sort_by_key(|task| Priority::rank(task.priority)),
        SortOption::AlphaAZ => sort_by_title(tasks, false),
        SortOption::AlphaZA => sort_by_title(tasks, true),
    }
}

/// Dated tasks always precede undated ones, whatever the direction.
fn compare_due(a: &Task, b: &Task, descending: bool) -> Ordering {
    match (a.due_date, b.due_date) {
        (Some(left), Some(right)) if descending => right.cmp(&left),
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn sort_by_title(tasks: &mut [Task], descending: bool) {
    let collator = TitleCollator::new();
    if descending {
        tasks.sort_by(|a, b| collator.compare(&b.title, &a.title));
    } else {
        tasks.sort_by(|a, b| collator.compare(&a.title, &b.title));
    }
}

/// Locale-aware, case-insensitive title ordering.
///
/// Uses the CLDR root collation at secondary strength: accents are
/// significant, letter case is not, so `"éclair"` sorts between `"Apple"`
/// and `"Zebra"` and `"apple"` ties with `"Apple"`.
pub struct TitleCollator {
    collator: Option<Collator>,
}

impl TitleCollator {
    pub fn new() -> Self {
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Secondary);
        let collator = match Collator::try_new(&Default::default(), options) {
            Ok(collator) => Some(collator),
            Err(err) => {
                warn!("event=collator_init module=search status=error error={err}");
                None
            }
        };
        Self { collator }
    }

    pub fn compare(&self, left: &str, right: &str) -> Ordering {
        match &self.collator {
            Some(collator) => collator.compare(left, right),
            None => left.to_lowercase().cmp(&right.to_lowercase()),
        }
    }
}

impl Default for TitleCollator {
    fn default() -> Self {
        Self::new()
    }
}

fn contains_folded(haystack: &str, folded_needle: &str) -> bool {
    haystack.to_lowercase().contains(folded_needle)
}
