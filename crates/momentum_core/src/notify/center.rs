//! Notification center capability and the in-process implementation.
//!
//! # Responsibility
//! - Define the injected boundary the reminder scheduler talks to.
//! - Provide an in-process pending set the host can mirror into the OS.
//!
//! # Invariants
//! - At most one pending request exists per reminder id.
//! - Scheduling while unauthorized fails and leaves the pending set unchanged.

use crate::model::reminder::ReminderId;
use crate::notify::request::NotificationRequest;
use log::{info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type NotifyResult<T> = Result<T, NotificationError>;

/// Failure reported by a notification center.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    /// The user has not granted notification permission.
    AuthorizationDenied,
    /// The platform refused or failed to register the request.
    SchedulingFailed(String),
}

impl Display for NotificationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthorizationDenied => write!(f, "notification authorization denied"),
            Self::SchedulingFailed(reason) => {
                write!(f, "notification scheduling failed: {reason}")
            }
        }
    }
}

impl Error for NotificationError {}

/// Local notification capability.
///
/// Platform adapters marshal asynchronous completions back onto the caller
/// before returning, so the contract here is synchronous.
pub trait NotificationCenter {
    /// Asks the user for permission. Returns the resulting grant state.
    fn request_authorization(&mut self) -> bool;
    fn is_authorized(&self) -> bool;
    /// Registers `request`, replacing any pending request with the same id.
    fn schedule(&mut self, request: NotificationRequest) -> NotifyResult<()>;
    /// Removes the pending request for `id`. No-op when none exists.
    fn cancel(&mut self, id: &ReminderId);
    fn cancel_all(&mut self);
    fn pending_requests(&self) -> Vec<NotificationRequest>;
}

impl<T: NotificationCenter + ?Sized> NotificationCenter for &mut T {
    fn request_authorization(&mut self) -> bool {
        (**self).request_authorization()
    }

    fn is_authorized(&self) -> bool {
        (**self).is_authorized()
    }

    fn schedule(&mut self, request: NotificationRequest) -> NotifyResult<()> {
        (**self).schedule(request)
    }

    fn cancel(&mut self, id: &ReminderId) {
        (**self).cancel(id);
    }

    fn cancel_all(&mut self) {
        (**self).cancel_all();
    }

    fn pending_requests(&self) -> Vec<NotificationRequest> {
        (**self).pending_requests()
    }
}

/// In-process notification center.
///
/// The host grants authorization through [`set_authorized`] after the OS
/// prompt resolves, then mirrors [`pending_requests`] into the platform
/// scheduler.
///
/// [`set_authorized`]: InMemoryNotificationCenter::set_authorized
/// [`pending_requests`]: NotificationCenter::pending_requests
#[derive(Debug, Default)]
pub struct InMemoryNotificationCenter {
    authorized: bool,
    pending: BTreeMap<ReminderId, NotificationRequest>,
}

impl InMemoryNotificationCenter {
    /// Creates an unauthorized, empty center.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an authorized, empty center.
    pub fn authorized() -> Self {
        Self {
            authorized: true,
            pending: BTreeMap::new(),
        }
    }

    /// Records the platform grant state.
    pub fn set_authorized(&mut self, authorized: bool) {
        self.authorized = authorized;
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn get(&self, id: &ReminderId) -> Option<&NotificationRequest> {
        self.pending.get(id)
    }
}

impl NotificationCenter for InMemoryNotificationCenter {
    fn request_authorization(&mut self) -> bool {
        self.authorized
    }

    fn is_authorized(&self) -> bool {
        self.authorized
    }

    fn schedule(&mut self, request: NotificationRequest) -> NotifyResult<()> {
        if !self.authorized {
            warn!(
                "event=notification_schedule module=notify status=error error_code=authorization_denied reminder_id={}",
                request.id
            );
            return Err(NotificationError::AuthorizationDenied);
        }
        info!(
            "event=notification_schedule module=notify status=ok reminder_id={} repeats={}",
            request.id,
            request.trigger.repeats()
        );
        self.pending.insert(request.id, request);
        Ok(())
    }

    fn cancel(&mut self, id: &ReminderId) {
        if self.pending.remove(id).is_some() {
            info!("event=notification_cancel module=notify status=ok reminder_id={id}");
        }
    }

    fn cancel_all(&mut self) {
        info!(
            "event=notification_cancel_all module=notify status=ok count={}",
            self.pending.len()
        );
        self.pending.clear();
    }

    fn pending_requests(&self) -> Vec<NotificationRequest> {
        self.pending.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{InMemoryNotificationCenter, NotificationCenter, NotificationError};
    use crate::model::reminder::ReminderSettings;
    use crate::model::task::Task;
    use crate::notify::request::{NotificationContent, NotificationRequest};
    use crate::notify::trigger::TriggerSpec;
    use chrono::{FixedOffset, TimeZone, Utc};
    use uuid::Uuid;

    fn request() -> NotificationRequest {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let task = Task::new("Call mom", now).expect("valid title");
        NotificationRequest {
            id: Uuid::new_v4(),
            content: NotificationContent::for_task(&task, false),
            trigger: TriggerSpec::for_settings(
                &ReminderSettings::once(now),
                &FixedOffset::east_opt(0).expect("offset"),
            ),
        }
    }

    #[test]
    fn unauthorized_center_rejects_and_stays_empty() {
        let mut center = InMemoryNotificationCenter::new();
        let err = center.schedule(request()).expect_err("must be denied");
        assert_eq!(err, NotificationError::AuthorizationDenied);
        assert_eq!(center.pending_count(), 0);
    }

    #[test]
    fn schedule_replaces_request_with_same_id() {
        let mut center = InMemoryNotificationCenter::authorized();
        let first = request();
        let mut second = request();
        second.id = first.id;
        second.content.body = "Call dad".to_string();

        center.schedule(first).expect("first schedule");
        center.schedule(second.clone()).expect("second schedule");
        assert_eq!(center.pending_requests(), vec![second]);
    }

    #[test]
    fn cancel_and_cancel_all_remove_requests() {
        let mut center = InMemoryNotificationCenter::authorized();
        let first = request();
        let second = request();
        center.schedule(first.clone()).expect("schedule first");
        center.schedule(second).expect("schedule second");

        center.cancel(&first.id);
        assert_eq!(center.pending_count(), 1);
        assert!(center.get(&first.id).is_none());

        center.cancel_all();
        assert_eq!(center.pending_count(), 0);
    }
}
