//! Notification request payloads and host responses.

use crate::model::reminder::ReminderId;
use crate::model::task::{Task, TaskId};
use crate::notify::trigger::TriggerSpec;
use serde::{Deserialize, Serialize};

/// Title shown on every reminder notification.
pub const REMINDER_TITLE: &str = "Task Reminder";
/// Category the host registers the `COMPLETE`/`SNOOZE` actions under.
pub const REMINDER_CATEGORY: &str = "TASK_REMINDER";
/// Action id sent by the host when the user completes a task from a banner.
pub const ACTION_COMPLETE: &str = "COMPLETE";
/// Action id sent by the host when the user snoozes a reminder.
pub const ACTION_SNOOZE: &str = "SNOOZE";
/// Action id sent by the host when the notification itself is tapped.
pub const ACTION_DEFAULT: &str = "DEFAULT";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationSound {
    #[default]
    Default,
    Silent,
}

/// Routing data echoed back by the host with every response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationUserInfo {
    pub task_id: TaskId,
    pub task_title: String,
    pub is_repeating: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    pub title: String,
    /// `Priority: <level>` when the task has a priority.
    pub subtitle: Option<String>,
    pub body: String,
    pub sound: NotificationSound,
    pub category: String,
    pub user_info: NotificationUserInfo,
}

impl NotificationContent {
    /// Builds reminder content for `task`.
    pub fn for_task(task: &Task, is_repeating: bool) -> Self {
        Self {
            title: REMINDER_TITLE.to_string(),
            subtitle: task
                .priority
                .map(|priority| format!("Priority: {}", priority.label())),
            body: task.title.clone(),
            sound: NotificationSound::Default,
            category: REMINDER_CATEGORY.to_string(),
            user_info: NotificationUserInfo {
                task_id: task.id,
                task_title: task.title.clone(),
                is_repeating,
            },
        }
    }
}

/// One pending local notification, keyed by reminder id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    pub id: ReminderId,
    pub content: NotificationContent,
    pub trigger: TriggerSpec,
}

/// User response reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAction {
    Complete,
    Snooze,
    /// Default tap on the notification body.
    Open,
}

impl NotificationAction {
    /// Maps a host action identifier. Unknown identifiers are ignored.
    pub fn parse(identifier: &str) -> Option<Self> {
        match identifier {
            ACTION_COMPLETE => Some(Self::Complete),
            ACTION_SNOOZE => Some(Self::Snooze),
            ACTION_DEFAULT => Some(Self::Open),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Complete => ACTION_COMPLETE,
            Self::Snooze => ACTION_SNOOZE,
            Self::Open => ACTION_DEFAULT,
        }
    }
}
