// Client configuration, read from the environment with sane defaults

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

pub const API_URL_VAR: &str = "PLAYGROUND_API_URL";
pub const TIMEOUT_VAR: &str = "PLAYGROUND_TIMEOUT_SECS";
pub const STATE_PATH_VAR: &str = "PLAYGROUND_STATE_PATH";

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    /// Transport timeout. `None` leaves the request open until the backend answers.
    pub timeout: Option<Duration>,
    pub state_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: None,
            state_path: default_state_path(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup(API_URL_VAR).filter(|u| !u.trim().is_empty()) {
            config.api_url = url;
        }

        if let Some(raw) = lookup(TIMEOUT_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(0) => config.timeout = None,
                Ok(secs) => config.timeout = Some(Duration::from_secs(secs)),
                Err(_) => warn!(value = %raw, "Ignoring invalid {}", TIMEOUT_VAR),
            }
        }

        if let Some(path) = lookup(STATE_PATH_VAR).filter(|p| !p.trim().is_empty()) {
            config.state_path = PathBuf::from(path);
        }

        config
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn execute_url(&self) -> String {
        self.endpoint("/api/execute")
    }

    pub fn health_url(&self) -> String {
        self.endpoint("/api/health")
    }

    pub fn languages_url(&self) -> String {
        self.endpoint("/api/languages")
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url.trim_end_matches('/'), path)
    }
}

/// `$XDG_STATE_HOME/playground/state.json`, then `~/.local/state/...`,
/// then the working directory.
fn default_state_path() -> PathBuf {
    if let Ok(state_home) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(state_home).join("playground").join("state.json");
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("state")
            .join("playground")
            .join("state.json");
    }
    PathBuf::from(".playground").join("state.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout, None);
        assert_eq!(config.execute_url(), "http://localhost:8000/api/execute");
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (API_URL_VAR, "https://run.example.com/"),
            (TIMEOUT_VAR, "15"),
            (STATE_PATH_VAR, "/tmp/prefs.json"),
        ]));

        assert_eq!(config.health_url(), "https://run.example.com/api/health");
        assert_eq!(config.languages_url(), "https://run.example.com/api/languages");
        assert_eq!(config.timeout, Some(Duration::from_secs(15)));
        assert_eq!(config.state_path, PathBuf::from("/tmp/prefs.json"));
    }

    #[test]
    fn test_invalid_timeout_is_ignored() {
        let config = ClientConfig::from_lookup(lookup_from(&[(TIMEOUT_VAR, "soon")]));
        assert_eq!(config.timeout, None);
    }
}
