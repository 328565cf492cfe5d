// Dark/light theme choice with persistence

use std::sync::{Arc, Mutex};

use crate::storage::Preferences;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark-theme",
            Theme::Light => "light-theme",
        }
    }

    /// Name of the matching editor color scheme.
    pub fn editor_theme(&self) -> &'static str {
        match self {
            Theme::Dark => "custom-dark",
            Theme::Light => "custom-light",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dark-theme" | "dark" => Some(Theme::Dark),
            "light-theme" | "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct ThemeToggle {
    current: Mutex<Theme>,
    prefs: Arc<Preferences>,
}

impl ThemeToggle {
    pub fn load(prefs: Arc<Preferences>) -> Self {
        let theme = prefs
            .theme()
            .and_then(|saved| Theme::parse(&saved))
            .unwrap_or_default();
        Self {
            current: Mutex::new(theme),
            prefs,
        }
    }

    pub fn current(&self) -> Theme {
        self.current.lock().map(|t| *t).unwrap_or_default()
    }

    pub fn is_dark(&self) -> bool {
        self.current() == Theme::Dark
    }

    pub fn set(&self, theme: Theme) {
        if let Ok(mut current) = self.current.lock() {
            *current = theme;
        }
        self.prefs.save_theme(theme.as_str());
    }

    pub fn toggle(&self) -> Theme {
        let next = self.current().toggled();
        self.set(next);
        next
    }

    /// Follow the system color scheme, but only while the user has not
    /// picked a theme themselves.
    pub fn follow_system(&self, prefers_dark: bool) {
        if self.prefs.theme().is_some() {
            return;
        }
        if let Ok(mut current) = self.current.lock() {
            *current = if prefers_dark { Theme::Dark } else { Theme::Light };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_dark() {
        let toggle = ThemeToggle::load(Arc::new(Preferences::in_memory()));
        assert!(toggle.is_dark());
        assert_eq!(toggle.current().editor_theme(), "custom-dark");
    }

    #[test]
    fn test_toggle_persists() {
        let prefs = Arc::new(Preferences::in_memory());
        let toggle = ThemeToggle::load(prefs.clone());

        assert_eq!(toggle.toggle(), Theme::Light);
        assert_eq!(prefs.theme().as_deref(), Some("light-theme"));
        assert_eq!(ThemeToggle::load(prefs).current(), Theme::Light);
    }

    #[test]
    fn test_system_preference_yields_to_saved_choice() {
        let prefs = Arc::new(Preferences::in_memory());
        let toggle = ThemeToggle::load(prefs.clone());

        toggle.follow_system(false);
        assert_eq!(toggle.current(), Theme::Light);
        assert_eq!(prefs.theme(), None);

        toggle.set(Theme::Dark);
        toggle.follow_system(false);
        assert_eq!(toggle.current(), Theme::Dark);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Theme::parse("light"), Some(Theme::Light));
        assert_eq!(Theme::parse("dark-theme"), Some(Theme::Dark));
        assert_eq!(Theme::parse("solarized"), None);
    }
}
