// Transient user notifications ("toasts")
//
// Fire-and-forget: a notification is shown and dismissed by time alone.
// There is no queue and no acknowledgement.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

pub const DEFAULT_DURATION: Duration = Duration::from_millis(4000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl std::fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            NotificationLevel::Info => "info",
            NotificationLevel::Success => "success",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub level: NotificationLevel,
    pub message: String,
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
            duration: DEFAULT_DURATION,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

mod duration_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }
}

/// Where notifications go. The default for every method but `notify` is a
/// shorthand, so implementors only provide delivery.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);

    fn info(&self, message: &str) {
        self.notify(Notification::new(NotificationLevel::Info, message));
    }

    fn success(&self, message: &str) {
        self.notify(Notification::new(NotificationLevel::Success, message));
    }

    fn warning(&self, message: &str) {
        self.notify(Notification::new(NotificationLevel::Warning, message));
    }

    fn error(&self, message: &str) {
        self.notify(Notification::new(NotificationLevel::Error, message));
    }
}

/// Drops every notification. Used when a front end shows none.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notification: Notification) {}
}

/// Visible toasts, each removed once its duration has elapsed.
#[derive(Debug, Default)]
pub struct ToastBoard {
    toasts: Mutex<Vec<(Notification, Instant)>>,
}

impl ToastBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_at(&self, notification: Notification, now: Instant) {
        let expires = now + notification.duration;
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.push((notification, expires));
        }
    }

    /// Toasts still on screen at `now`; expired ones are discarded.
    pub fn visible_at(&self, now: Instant) -> Vec<Notification> {
        let Ok(mut toasts) = self.toasts.lock() else {
            return Vec::new();
        };
        toasts.retain(|(_, expires)| *expires > now);
        toasts.iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn visible(&self) -> Vec<Notification> {
        self.visible_at(Instant::now())
    }

    pub fn dismiss(&self, id: Uuid) {
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.retain(|(n, _)| n.id != id);
        }
    }
}

impl Notifier for ToastBoard {
    fn notify(&self, notification: Notification) {
        self.show_at(notification, Instant::now());
    }
}

/// Forwards notifications to whoever holds the receiving end.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            debug!("Notification dropped, no listener");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toasts_auto_dismiss() {
        let board = ToastBoard::new();
        let start = Instant::now();

        board.show_at(Notification::new(NotificationLevel::Info, "short").with_duration(Duration::from_secs(1)), start);
        board.show_at(Notification::new(NotificationLevel::Error, "long"), start);
        assert_eq!(board.visible_at(start).len(), 2);

        let later = board.visible_at(start + Duration::from_secs(2));
        assert_eq!(later.len(), 1);
        assert_eq!(later[0].message, "long");

        assert!(board.visible_at(start + DEFAULT_DURATION).is_empty());
    }

    #[test]
    fn test_dismiss_removes_only_that_toast() {
        let board = ToastBoard::new();
        let keep = Notification::new(NotificationLevel::Info, "keep");
        let gone = Notification::new(NotificationLevel::Info, "gone");
        let gone_id = gone.id;

        board.notify(keep);
        board.notify(gone);
        board.dismiss(gone_id);

        let visible = board.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].message, "keep");
    }

    #[tokio::test]
    async fn test_channel_notifier_delivers_in_order() {
        let (notifier, mut rx) = ChannelNotifier::new();
        notifier.warning("first");
        notifier.success("second");

        let first = rx.recv().await.unwrap();
        assert_eq!(first.level, NotificationLevel::Warning);
        assert_eq!(first.message, "first");
        assert_eq!(rx.recv().await.unwrap().level, NotificationLevel::Success);
    }

    #[test]
    fn test_channel_notifier_without_listener_does_not_panic() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        notifier.error("nobody hears this");
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(Notification::new(NotificationLevel::Success, "ok")).unwrap();
        assert_eq!(json["level"], "success");
        assert_eq!(json["duration"], 4000);
    }
}
