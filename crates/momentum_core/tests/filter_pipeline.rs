use chrono::{Duration, NaiveDate, TimeZone, Utc};
use momentum_core::search::filter::{filter_by_priority, filter_by_search, sort_tasks};
use momentum_core::{apply_query, Priority, PriorityFilter, SortOption, StatusFilter, Task, TaskQuery};
use std::collections::BTreeSet;

const TITLES: [&str; 12] = [
    "Buy milk", "call Mom", "Dentist", "email boss", "File taxes", "garden",
    "Haircut", "iron shirts", "Jog", "knit scarf", "Laundry", "mow lawn",
];

/// Twelve tasks spanning every priority, completion and due-date combination.
fn fixture() -> Vec<Task> {
    let base = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
    let priorities = [None, Some(Priority::Low), Some(Priority::Normal), Some(Priority::High)];

    TITLES
        .iter()
        .enumerate()
        .map(|(index, title)| {
            let mut task = Task::new(*title, base + Duration::minutes(index as i64 * 7 % 12)).unwrap();
            task.priority = priorities[index % priorities.len()];
            task.is_completed = index % 3 == 0;
            if index % 2 == 0 {
                task.due_date = NaiveDate::from_ymd_opt(2024, 3, 1 + (index as u32 * 5) % 28);
            }
            if index % 5 == 0 {
                task.notes = Some("pick up at the MARKET".to_string());
            }
            task
        })
        .collect()
}

fn query(status: StatusFilter, priority: PriorityFilter, sort: SortOption) -> TaskQuery {
    TaskQuery {
        search_text: String::new(),
        status,
        priority,
        sort,
    }
}

fn ids(tasks: &[Task]) -> BTreeSet<uuid::Uuid> {
    tasks.iter().map(|task| task.id).collect()
}

#[test]
fn active_results_are_open_and_partition_the_filtered_set() {
    let tasks = fixture();
    for priority in [
        PriorityFilter::All,
        PriorityFilter::Low,
        PriorityFilter::Normal,
        PriorityFilter::High,
    ] {
        let all = apply_query(tasks.clone(), &query(StatusFilter::All, priority, SortOption::default()));
        let active = apply_query(tasks.clone(), &query(StatusFilter::Active, priority, SortOption::default()));
        let completed =
            apply_query(tasks.clone(), &query(StatusFilter::Completed, priority, SortOption::default()));

        assert!(active.iter().all(|task| !task.is_completed));
        assert!(completed.iter().all(|task| task.is_completed));

        let union: BTreeSet<_> = ids(&active).union(&ids(&completed)).copied().collect();
        assert_eq!(union, ids(&all));
        assert_eq!(active.len() + completed.len(), all.len());
    }
}

#[test]
fn due_soonest_never_places_dated_after_undated() {
    let tasks = fixture();
    for option in [SortOption::DueSoonest, SortOption::DueLatest] {
        let sorted = apply_query(tasks.clone(), &query(StatusFilter::All, PriorityFilter::All, option));
        let first_undated = sorted
            .iter()
            .position(|task| task.due_date.is_none())
            .unwrap_or(sorted.len());
        assert!(sorted[first_undated..].iter().all(|task| task.due_date.is_none()));

        let dates: Vec<_> = sorted[..first_undated].iter().filter_map(|task| task.due_date).collect();
        let mut expected = dates.clone();
        expected.sort();
        if option == SortOption::DueLatest {
            expected.reverse();
        }
        assert_eq!(dates, expected);
    }
}

#[test]
fn alpha_za_is_reverse_of_alpha_az() {
    let tasks = fixture();
    let az = apply_query(tasks.clone(), &query(StatusFilter::All, PriorityFilter::All, SortOption::AlphaAZ));
    let za = apply_query(tasks, &query(StatusFilter::All, PriorityFilter::All, SortOption::AlphaZA));

    let mut reversed: Vec<_> = za.iter().map(|task| task.id).collect();
    reversed.reverse();
    assert_eq!(az.iter().map(|task| task.id).collect::<Vec<_>>(), reversed);

    let titles: Vec<_> = az.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles[0], "Buy milk");
    assert_eq!(titles[1], "call Mom");
    assert_eq!(titles[11], "mow lawn");
}

#[test]
fn alpha_sort_places_accented_titles_with_their_base_letter() {
    let now = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
    let tasks: Vec<Task> = ["Zebra", "éclair", "Apple", "Eggs"]
        .into_iter()
        .map(|title| Task::new(title, now).unwrap())
        .collect();

    let mut az = tasks.clone();
    sort_tasks(&mut az, SortOption::AlphaAZ);
    let titles: Vec<_> = az.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles, vec!["Apple", "éclair", "Eggs", "Zebra"]);

    let mut za = tasks;
    sort_tasks(&mut za, SortOption::AlphaZA);
    let titles: Vec<_> = za.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles, vec!["Zebra", "Eggs", "éclair", "Apple"]);
}

#[test]
fn alpha_sort_keeps_case_only_ties_in_input_order() {
    let now = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
    let tasks: Vec<Task> = ["apple", "APPLE", "Apple"]
        .into_iter()
        .map(|title| Task::new(title, now).unwrap())
        .collect();
    let input_order: Vec<_> = tasks.iter().map(|task| task.id).collect();

    for option in [SortOption::AlphaAZ, SortOption::AlphaZA] {
        let mut sorted = tasks.clone();
        sort_tasks(&mut sorted, option);
        assert_eq!(sorted.iter().map(|task| task.id).collect::<Vec<_>>(), input_order);
    }
}

#[test]
fn absent_priority_never_matches_specific_filter() {
    let now = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
    let task = Task::new("Buy milk", now).unwrap();

    let result = apply_query(vec![task], &query(StatusFilter::All, PriorityFilter::High, SortOption::default()));
    assert!(result.is_empty());
}

#[test]
fn priority_high_to_low_puts_absent_last() {
    let now = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
    let mut high = Task::new("high", now).unwrap();
    high.priority = Some(Priority::High);
    let none = Task::new("none", now).unwrap();
    let mut low = Task::new("low", now).unwrap();
    low.priority = Some(Priority::Low);

    let mut tasks = vec![high, none, low];
    sort_tasks(&mut tasks, SortOption::PriorityHighToLow);
    let titles: Vec<_> = tasks.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles, vec!["high", "low", "none"]);

    sort_tasks(&mut tasks, SortOption::PriorityLowToHigh);
    let titles: Vec<_> = tasks.iter().map(|task| task.title.as_str()).collect();
    assert_eq!(titles, vec!["none", "low", "high"]);
}

#[test]
fn sort_is_stable_for_ties() {
    let now = Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();
    let tasks: Vec<Task> = (0..5)
        .map(|index| {
            let mut task = Task::new(format!("same {index}"), now).unwrap();
            task.priority = Some(Priority::Normal);
            task
        })
        .collect();
    let input_order: Vec<_> = tasks.iter().map(|task| task.id).collect();

    for option in [
        SortOption::CreatedNewest,
        SortOption::CreatedOldest,
        SortOption::DueSoonest,
        SortOption::PriorityHighToLow,
    ] {
        let mut sorted = tasks.clone();
        sort_tasks(&mut sorted, option);
        assert_eq!(sorted.iter().map(|task| task.id).collect::<Vec<_>>(), input_order);
    }
}

#[test]
fn search_matches_title_or_notes_ignoring_case() {
    let tasks = fixture();
    let by_notes = filter_by_search(tasks.clone(), "market");
    assert_eq!(by_notes.len(), 3);

    let by_title = filter_by_search(tasks.clone(), "MILK");
    assert_eq!(by_title.len(), 1);
    assert_eq!(by_title[0].title, "Buy milk");

    assert_eq!(filter_by_search(tasks.clone(), "").len(), tasks.len());
    assert!(filter_by_search(tasks, "zebra").is_empty());
}

#[test]
fn stages_only_narrow() {
    let tasks = fixture();
    let mut search = TaskQuery {
        search_text: "a".to_string(),
        ..TaskQuery::default()
    };
    let searched = apply_query(tasks.clone(), &search);
    assert!(ids(&searched).is_subset(&ids(&tasks)));

    search.priority = PriorityFilter::Low;
    let narrowed = apply_query(tasks.clone(), &search);
    assert!(ids(&narrowed).is_subset(&ids(&searched)));
    assert_eq!(
        ids(&narrowed),
        ids(&filter_by_priority(searched, PriorityFilter::Low))
    );
}
