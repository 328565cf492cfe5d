// Language selection, persisted and broadcast to anyone who follows it

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::editor::Editor;
use crate::error::SelectionError;
use crate::languages::{self, LanguageConfig};
use crate::storage::Preferences;

pub struct LanguageSelector {
    current: watch::Sender<&'static LanguageConfig>,
    prefs: Arc<Preferences>,
}

impl LanguageSelector {
    /// Start from the saved choice when it is still a registered language.
    pub fn load(prefs: Arc<Preferences>) -> Self {
        let initial = match prefs.language() {
            Some(saved) => languages::get(&saved).unwrap_or_else(|| {
                warn!(language = %saved, "Ignoring saved language that is no longer supported");
                languages::default_language()
            }),
            None => languages::default_language(),
        };

        let (current, _) = watch::channel(initial);
        Self { current, prefs }
    }

    pub fn current(&self) -> &'static LanguageConfig {
        *self.current.borrow()
    }

    pub fn current_id(&self) -> &'static str {
        self.current().id
    }

    /// Switch languages. Unknown ids leave the selection untouched.
    pub fn set_language(
        &self,
        id: &str,
        editor: &dyn Editor,
    ) -> Result<&'static LanguageConfig, SelectionError> {
        let Some(config) = languages::get(id) else {
            warn!(language = %id, "Unsupported language");
            return Err(SelectionError::UnsupportedLanguage(id.to_string()));
        };

        self.prefs.save_language(config.id);
        editor.set_language_mode(config.editor_mode);
        self.current.send_replace(config);

        info!(language = config.id, "Language changed");
        Ok(config)
    }

    pub fn subscribe(&self) -> watch::Receiver<&'static LanguageConfig> {
        self.current.subscribe()
    }
}
