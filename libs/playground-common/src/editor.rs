// Capabilities the run controller needs from the surrounding UI.
//
// Each has a no-op implementation so a front end that lacks a piece (no
// loading overlay, say) wires in the no-op explicitly.

use std::sync::{Arc, Mutex};

use crate::languages;
use crate::storage::Preferences;

/// A text editing widget.
pub trait Editor: Send + Sync {
    fn text(&self) -> String;

    fn set_text(&self, text: &str);

    fn set_language_mode(&self, mode: &str);

    fn focus(&self) {}

    fn layout(&self) {}
}

/// The "Run" button.
pub trait RunTrigger: Send + Sync {
    fn set_enabled(&self, enabled: bool);

    /// Busy affordance for the duration of a run; disabled while running.
    fn set_running(&self, running: bool) {
        self.set_enabled(!running);
    }
}

/// A large busy indicator, separate from the output panel's own spinner.
pub trait LoadingIndicator: Send + Sync {
    fn show(&self, message: &str);

    fn hide(&self);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTrigger;

impl RunTrigger for NoopTrigger {
    fn set_enabled(&self, _enabled: bool) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLoading;

impl LoadingIndicator for NoopLoading {
    fn show(&self, _message: &str) {}

    fn hide(&self) {}
}

/// Editor backed by an in-memory buffer, for terminal front ends and tests.
///
/// With preferences attached, every edit is saved as the last edited code.
pub struct BufferEditor {
    text: Mutex<String>,
    mode: Mutex<String>,
    prefs: Option<Arc<Preferences>>,
}

impl BufferEditor {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: Mutex::new(text.into()),
            mode: Mutex::new(languages::DEFAULT_LANGUAGE.to_string()),
            prefs: None,
        }
    }

    pub fn with_preferences(mut self, prefs: Arc<Preferences>) -> Self {
        self.prefs = Some(prefs);
        self
    }

    pub fn language_mode(&self) -> String {
        self.mode.lock().map(|m| m.clone()).unwrap_or_default()
    }

    /// Empty the buffer and forget the saved code.
    pub fn clear(&self) {
        if let Ok(mut text) = self.text.lock() {
            text.clear();
        }
        if let Some(prefs) = &self.prefs {
            prefs.clear_code();
        }
    }
}

impl Editor for BufferEditor {
    fn text(&self) -> String {
        self.text.lock().map(|t| t.clone()).unwrap_or_default()
    }

    fn set_text(&self, text: &str) {
        if let Ok(mut current) = self.text.lock() {
            *current = text.to_string();
        }
        if let Some(prefs) = &self.prefs {
            prefs.save_code(text);
        }
    }

    fn set_language_mode(&self, mode: &str) {
        if let Ok(mut current) = self.mode.lock() {
            *current = mode.to_string();
        }
    }
}

/// What the editor opens with: the saved code, else the language's sample.
pub fn initial_text(prefs: &Preferences, language: &str) -> String {
    prefs
        .code()
        .or_else(|| languages::sample(language).map(str::to_string))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_text_prefers_saved_code() {
        let prefs = Preferences::in_memory();
        assert!(initial_text(&prefs, "ruby").starts_with("# Ruby"));

        prefs.save_code("puts 1");
        assert_eq!(initial_text(&prefs, "ruby"), "puts 1");
    }

    #[test]
    fn test_initial_text_for_unknown_language_is_empty() {
        let prefs = Preferences::in_memory();
        assert_eq!(initial_text(&prefs, "cobol"), "");
    }

    #[test]
    fn test_buffer_editor_saves_edits() {
        let prefs = Arc::new(Preferences::in_memory());
        let editor = BufferEditor::new("").with_preferences(prefs.clone());

        editor.set_text("fn main() {}");
        assert_eq!(editor.text(), "fn main() {}");
        assert_eq!(prefs.code().as_deref(), Some("fn main() {}"));

        editor.set_language_mode("rust");
        assert_eq!(editor.language_mode(), "rust");

        editor.clear();
        assert_eq!(editor.text(), "");
        assert_eq!(prefs.code(), None);
    }
}
