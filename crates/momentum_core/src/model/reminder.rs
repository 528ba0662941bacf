//! Reminder sub-record attached to a task.
//!
//! # Responsibility
//! - Hold the persisted reminder configuration for one task.
//! - Normalize user input before it reaches the scheduler.
//!
//! # Invariants
//! - `id` is allocated once and reused across enable/disable cycles.
//! - `enabled` implies `trigger_at` is set.
//! - `interval` is `RepeatInterval::None` whenever `repeating` is false.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Identifier under which the notification request is registered.
pub type ReminderId = Uuid;

/// Recurrence rule for repeating reminders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatInterval {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RepeatInterval {
    /// Stable string form shared by storage and FFI.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Parses the stable string form. Returns `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }
}

/// Persisted reminder configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: ReminderId,
    /// Absolute fire time for one-shot reminders, template for repeating ones.
    pub trigger_at: Option<DateTime<Utc>>,
    /// True only after the notification center acknowledged the request.
    pub enabled: bool,
    pub repeating: bool,
    pub interval: RepeatInterval,
}

impl Reminder {
    /// Creates a disabled reminder with a freshly allocated id.
    pub fn allocate() -> Self {
        Self::disabled(Uuid::new_v4())
    }

    /// Creates a disabled reminder that keeps an existing id.
    pub fn disabled(id: ReminderId) -> Self {
        Self {
            id,
            trigger_at: None,
            enabled: false,
            repeating: false,
            interval: RepeatInterval::None,
        }
    }

    /// Marks the reminder active with normalized settings.
    pub fn activate(&mut self, settings: &ReminderSettings) {
        let settings = settings.normalized();
        self.trigger_at = Some(settings.trigger_at);
        self.enabled = true;
        self.repeating = settings.repeating;
        self.interval = settings.interval;
    }

    /// Clears everything but the id.
    pub fn deactivate(&mut self) {
        *self = Self::disabled(self.id);
    }

    /// Returns the settings this reminder was enabled with, if enabled.
    pub fn settings(&self) -> Option<ReminderSettings> {
        if !self.enabled {
            return None;
        }
        self.trigger_at.map(|trigger_at| ReminderSettings {
            trigger_at,
            repeating: self.repeating,
            interval: self.interval,
        })
    }

    /// Validates reminder invariants.
    ///
    /// # Errors
    /// - `NilId` when the id is the nil UUID.
    /// - `EnabledWithoutTrigger` when enabled but no trigger time is set.
    /// - `IntervalWithoutRepeat` when a non-`None` interval is set on a
    ///   one-shot reminder.
    pub fn validate(&self) -> Result<(), ReminderValidationError> {
        if self.id.is_nil() {
            return Err(ReminderValidationError::NilId);
        }
        if self.enabled && self.trigger_at.is_none() {
            return Err(ReminderValidationError::EnabledWithoutTrigger);
        }
        if !self.repeating && self.interval != RepeatInterval::None {
            return Err(ReminderValidationError::IntervalWithoutRepeat(self.interval));
        }
        Ok(())
    }
}

/// Input used to enable a reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderSettings {
    pub trigger_at: DateTime<Utc>,
    pub repeating: bool,
    pub interval: RepeatInterval,
}

impl ReminderSettings {
    /// One-shot reminder at `trigger_at`.
    pub fn once(trigger_at: DateTime<Utc>) -> Self {
        Self {
            trigger_at,
            repeating: false,
            interval: RepeatInterval::None,
        }
    }

    /// Repeating reminder anchored at `trigger_at`.
    pub fn repeating(trigger_at: DateTime<Utc>, interval: RepeatInterval) -> Self {
        Self {
            trigger_at,
            repeating: true,
            interval,
        }
    }

    /// Applies the repeat rules:
    /// - a one-shot reminder never carries an interval;
    /// - `repeating` with `RepeatInterval::None` is treated as a one-shot.
    pub fn normalized(&self) -> Self {
        if !self.repeating || self.interval == RepeatInterval::None {
            return Self::once(self.trigger_at);
        }
        *self
    }
}

/// Reminder invariant violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderValidationError {
    NilId,
    EnabledWithoutTrigger,
    IntervalWithoutRepeat(RepeatInterval),
}

impl Display for ReminderValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "reminder id must not be nil"),
            Self::EnabledWithoutTrigger => {
                write!(f, "enabled reminder must have a trigger time")
            }
            Self::IntervalWithoutRepeat(interval) => write!(
                f,
                "reminder interval `{}` requires repeating to be enabled",
                interval.as_str()
            ),
        }
    }
}

impl Error for ReminderValidationError {}
