//! User-facing notifications
//!
//! The core never renders anything. It publishes [`Notification`]s and the
//! view layer decides how to show them (toast, spinner, log line).

use crate::error::ApiErrorKind;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Notification id used for the "backend warming up" progress message
pub const RETRY_NOTIFICATION_ID: &str = "db-retry";

/// A message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// In-progress message that later updates or dismissals replace by id
    Progress { id: String, message: String },

    /// Remove a progress message
    Dismiss { id: String },

    /// Terminal failure
    Error {
        kind: Option<ApiErrorKind>,
        message: String,
    },

    /// Completed action
    Success { message: String },
}

impl Notification {
    /// Create a progress notification
    pub fn progress(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Progress {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Create a dismiss notification
    pub fn dismiss(id: impl Into<String>) -> Self {
        Self::Dismiss { id: id.into() }
    }

    /// Create an error notification for an API failure
    pub fn api_error(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self::Error {
            kind: Some(kind),
            message: message.into(),
        }
    }

    /// Create an error notification that is not tied to an API failure
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            kind: None,
            message: message.into(),
        }
    }

    /// Create a success notification
    pub fn success(message: impl Into<String>) -> Self {
        Self::Success {
            message: message.into(),
        }
    }

    /// Get the notification type name
    pub fn notification_type(&self) -> &'static str {
        match self {
            Self::Progress { .. } => "progress",
            Self::Dismiss { .. } => "dismiss",
            Self::Error { .. } => "error",
            Self::Success { .. } => "success",
        }
    }
}

/// Sink for notifications
pub trait Notifier: Send + Sync {
    /// Deliver a notification; must not block
    fn notify(&self, notification: Notification);
}

/// Notifier that drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _notification: Notification) {}
}

/// Broadcast bus for notifications
///
/// Every subscriber receives a copy of every notification published after it
/// subscribed.
///
/// # Example
///
/// ```rust
/// use academy_core::events::{Notification, NotificationBus};
///
/// #[tokio::main]
/// async fn main() {
///     let bus = NotificationBus::new(16);
///     let mut subscriber = bus.subscribe();
///
///     bus.publish(Notification::success("Enrolled successfully!"));
///
///     let notification = subscriber.recv().await.unwrap();
///     assert_eq!(notification.notification_type(), "success");
/// }
/// ```
#[derive(Debug, Clone)]
pub struct NotificationBus {
    sender: broadcast::Sender<Notification>,
    capacity: usize,
}

impl NotificationBus {
    /// Create a new bus with the specified capacity
    ///
    /// The capacity determines how many notifications can be buffered before
    /// slow subscribers start losing them.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender, capacity }
    }

    /// Publish to all subscribers, returning how many received it
    pub fn publish(&self, notification: Notification) -> usize {
        self.sender.send(notification).unwrap_or(0)
    }

    /// Subscribe to notifications published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Get the channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Notifier for NotificationBus {
    fn notify(&self, notification: Notification) {
        tracing::trace!(kind = notification.notification_type(), "notification");
        self.publish(notification);
    }
}

/// Shared notifier handle
pub type SharedNotifier = Arc<dyn Notifier>;

/// Drain everything currently buffered on a receiver
pub fn drain(receiver: &mut broadcast::Receiver<Notification>) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(notification) = receiver.try_recv() {
        out.push(notification);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bus_basic() {
        let bus = NotificationBus::new(8);
        let mut subscriber = bus.subscribe();

        let sent = bus.publish(Notification::progress(RETRY_NOTIFICATION_ID, "Retrying (1/3)"));
        assert_eq!(sent, 1);

        let received = subscriber.recv().await.unwrap();
        assert_eq!(
            received,
            Notification::progress(RETRY_NOTIFICATION_ID, "Retrying (1/3)")
        );
    }

    #[tokio::test]
    async fn test_no_subscribers() {
        let bus = NotificationBus::new(8);
        assert_eq!(bus.publish(Notification::dismiss(RETRY_NOTIFICATION_ID)), 0);
    }

    #[tokio::test]
    async fn test_clone_shares_channel() {
        let bus = NotificationBus::new(8);
        let clone = bus.clone();
        let mut subscriber = bus.subscribe();

        clone.notify(Notification::success("Logged out successfully"));

        assert_eq!(drain(&mut subscriber).len(), 1);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[test]
    fn test_notification_types() {
        let types: Vec<_> = [
            Notification::progress("a", "b"),
            Notification::dismiss("a"),
            Notification::api_error(ApiErrorKind::NotFound, "Resource not found."),
            Notification::success("done"),
        ]
        .iter()
        .map(|n| n.notification_type())
        .collect();
        assert_eq!(types, vec!["progress", "dismiss", "error", "success"]);
    }
}
