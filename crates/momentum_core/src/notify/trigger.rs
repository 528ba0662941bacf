//! Trigger specs for local notification requests.
//!
//! # Responsibility
//! - Turn reminder settings into calendar component matches.
//! - Compute the next wall-clock fire time of a spec.
//!
//! # Invariants
//! - One-shot specs carry the full `{year, month, day, hour, minute}` set.
//! - Repeating specs carry only the components implied by their interval.
//! - Components are expressed in the local offset the spec was built with.

use crate::model::reminder::{ReminderSettings, RepeatInterval};
use chrono::{Datelike, FixedOffset, NaiveDate, NaiveDateTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

/// Upper bound for the day-by-day search in [`TriggerSpec::next_fire_after`].
///
/// Eight years covers the longest gap between two February 29ths.
const MAX_SEARCH_DAYS: u32 = 366 * 8;

/// Calendar components a trigger matches against. `None` means "any".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateMatch {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
    pub weekday: Option<Weekday>,
    pub hour: u32,
    pub minute: u32,
}

impl DateMatch {
    fn time_only(local: &NaiveDateTime) -> Self {
        Self {
            year: None,
            month: None,
            day: None,
            weekday: None,
            hour: local.hour(),
            minute: local.minute(),
        }
    }

    fn matches_date(&self, date: NaiveDate) -> bool {
        self.year.map_or(true, |year| date.year() == year)
            && self.month.map_or(true, |month| date.month() == month)
            && self.day.map_or(true, |day| date.day() == day)
            && self.weekday.map_or(true, |weekday| date.weekday() == weekday)
    }
}

/// Rule governing when a reminder fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "match", rename_all = "snake_case")]
pub enum TriggerSpec {
    /// Fires once at an absolute date and time.
    Once(DateMatch),
    /// Fires every time the partial match occurs.
    Repeating(DateMatch),
}

impl TriggerSpec {
    /// Builds the spec for normalized reminder settings.
    ///
    /// `offset` is the local offset the calendar components are taken in.
    pub fn for_settings(settings: &ReminderSettings, offset: &FixedOffset) -> Self {
        let settings = settings.normalized();
        let local = settings.trigger_at.with_timezone(offset).naive_local();
        let base = DateMatch::time_only(&local);

        if !settings.repeating {
            return Self::Once(DateMatch {
                year: Some(local.year()),
                month: Some(local.month()),
                day: Some(local.day()),
                ..base
            });
        }

        match settings.interval {
            RepeatInterval::Daily => Self::Repeating(base),
            RepeatInterval::Weekly => Self::Repeating(DateMatch {
                weekday: Some(local.weekday()),
                ..base
            }),
            RepeatInterval::Monthly => Self::Repeating(DateMatch {
                day: Some(local.day()),
                ..base
            }),
            RepeatInterval::Yearly => Self::Repeating(DateMatch {
                month: Some(local.month()),
                day: Some(local.day()),
                ..base
            }),
            // `normalized()` never yields a repeating `None`.
            RepeatInterval::None => Self::Once(DateMatch {
                year: Some(local.year()),
                month: Some(local.month()),
                day: Some(local.day()),
                ..base
            }),
        }
    }

    pub fn date_match(&self) -> &DateMatch {
        match self {
            Self::Once(date_match) | Self::Repeating(date_match) => date_match,
        }
    }

    pub fn repeats(&self) -> bool {
        matches!(self, Self::Repeating(_))
    }

    /// Returns the first local wall-clock time strictly after `after` at
    /// which this spec fires, or `None` when it never fires again.
    pub fn next_fire_after(&self, after: NaiveDateTime) -> Option<NaiveDateTime> {
        let date_match = self.date_match();
        let mut date = after.date();

        for _ in 0..=MAX_SEARCH_DAYS {
            if date_match.matches_date(date) {
                let candidate = date.and_hms_opt(date_match.hour, date_match.minute, 0)?;
                if candidate > after {
                    return Some(candidate);
                }
            }
            if let Some(year) = date_match.year {
                if date.year() > year {
                    return None;
                }
            }
            date = date.succ_opt()?;
        }

        None
    }
}
