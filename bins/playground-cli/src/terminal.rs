// Terminal implementations of the UI capabilities

use playground_common::editor::LoadingIndicator;
use playground_common::notify::{Notification, NotificationLevel, Notifier};

/// Prints each notification to stderr once; a terminal has nothing to dismiss.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        let icon = match notification.level {
            NotificationLevel::Info => "ℹ️ ",
            NotificationLevel::Success => "✅",
            NotificationLevel::Warning => "⚠️ ",
            NotificationLevel::Error => "❌",
        };
        eprintln!("{} {}", icon, notification.message);
    }
}

pub struct TerminalLoading;

impl LoadingIndicator for TerminalLoading {
    fn show(&self, message: &str) {
        eprintln!("🚀 {}", message);
    }

    fn hide(&self) {}
}
