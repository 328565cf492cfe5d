//! Execution client: one request to the backend per run, normalized into an
//! [`ExecutionResult`] or a [`ClientError`].
//!
//! The client is also the only writer of the shared [`RateLimitState`]. Every
//! change is published on a `watch` channel so any part of the UI can follow
//! the remaining budget without polling.

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{ClientError, EXECUTION_FAILED_MESSAGE};
use crate::types::{
    ExecutionRequest, ExecutionResult, HealthStatus, RateLimitState, RawExecutionResponse,
};

pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RATE_LIMIT_LIMIT_HEADER: &str = "x-ratelimit-limit";
pub const RATE_LIMIT_RESET_HEADER: &str = "x-ratelimit-reset";

/// The run path the controller depends on.
///
/// Callers must not overlap calls to `execute`; the run controller's
/// Idle/Running guard is what enforces a single request in flight.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExecutionClient: Send + Sync {
    /// `language` is forwarded verbatim; validating it is the backend's job.
    async fn execute(&self, code: &str, language: &str) -> Result<ExecutionResult, ClientError>;

    /// Snapshot of the current request budget.
    fn rate_limit(&self) -> RateLimitState;

    fn subscribe(&self) -> watch::Receiver<RateLimitState>;

    /// Restore the full budget once the window is known to have rolled over.
    fn reset_rate_limit(&self);
}

pub struct HttpExecutionClient {
    http: reqwest::Client,
    config: ClientConfig,
    rate_limit: watch::Sender<RateLimitState>,
}

impl HttpExecutionClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::Unexpected(Some(e.to_string())))?;

        let (rate_limit, _) = watch::channel(RateLimitState::default());

        Ok(Self {
            http,
            config,
            rate_limit,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// GET /api/health. Never fails: anything that goes wrong is reported as
    /// an unreachable backend.
    pub async fn check_health(&self) -> HealthStatus {
        let response = match self.http.get(self.config.health_url()).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "Health check failed");
                return HealthStatus::unreachable();
            }
        };

        match response.json::<HealthStatus>().await {
            Ok(health) => health,
            Err(e) => {
                debug!(error = %e, "Health check returned an unreadable body");
                HealthStatus::unreachable()
            }
        }
    }

    /// GET /api/languages, if the deployment offers it.
    pub async fn supported_languages(&self) -> Option<serde_json::Value> {
        let response = match self.http.get(self.config.languages_url()).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                debug!(status = %response.status(), "Language list not available");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Could not fetch supported languages");
                return None;
            }
        };

        response.json().await.ok()
    }

    fn record_rate_limit(&self, headers: &HeaderMap, status: StatusCode) {
        let changed = self
            .rate_limit
            .send_if_modified(|state| apply_rate_limit_headers(state, headers, status));

        if changed {
            let state = self.rate_limit.borrow();
            debug!(
                remaining = state.remaining,
                limit = state.limit,
                reset = ?state.reset_time,
                "Rate limit updated"
            );
        }
    }
}

#[async_trait]
impl ExecutionClient for HttpExecutionClient {
    async fn execute(&self, code: &str, language: &str) -> Result<ExecutionResult, ClientError> {
        let request = ExecutionRequest::new(code, language);

        let response = self
            .http
            .post(self.config.execute_url())
            .json(&request)
            .send()
            .await
            .map_err(ClientError::from_request)?;

        let status = response.status();
        self.record_rate_limit(response.headers(), status);

        if !status.is_success() {
            info!(status = status.as_u16(), language, "Backend rejected execution");
            if status == StatusCode::TOO_MANY_REQUESTS {
                return Err(ClientError::RateLimited);
            }
            // A truncated error body still gets the generic message.
            let body = response.bytes().await.unwrap_or_else(|e| {
                debug!(error = %e, "Could not read error body");
                Default::default()
            });
            return Err(ClientError::Application {
                status: status.as_u16(),
                message: error_message_from_body(&body),
            });
        }

        let body = response.bytes().await.map_err(ClientError::from_request)?;

        let raw: RawExecutionResponse = serde_json::from_slice(&body)
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        Ok(raw.normalize())
    }

    fn rate_limit(&self) -> RateLimitState {
        self.rate_limit.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<RateLimitState> {
        self.rate_limit.subscribe()
    }

    fn reset_rate_limit(&self) {
        self.rate_limit.send_modify(|state| {
            state.remaining = state.limit;
            state.reset_time = None;
        });
    }
}

/// Fold `X-RateLimit-*` headers into `state`. Returns whether anything changed.
///
/// A 429 without a remaining count still means the budget is spent.
pub fn apply_rate_limit_headers(
    state: &mut RateLimitState,
    headers: &HeaderMap,
    status: StatusCode,
) -> bool {
    let remaining = header_number::<u32>(headers, RATE_LIMIT_REMAINING_HEADER);
    let limit = header_number::<u32>(headers, RATE_LIMIT_LIMIT_HEADER).filter(|l| *l > 0);
    let reset = header_number::<i64>(headers, RATE_LIMIT_RESET_HEADER)
        .and_then(|secs| DateTime::from_timestamp(secs, 0));

    let before = state.clone();

    if let Some(limit) = limit {
        state.limit = limit;
    }
    if let Some(remaining) = remaining {
        state.remaining = remaining;
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        state.remaining = 0;
    }
    if reset.is_some() {
        state.reset_time = reset;
    }
    state.remaining = state.remaining.min(state.limit);

    *state != before
}

fn header_number<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Prefer the server's `detail`, then `message`, then the generic text.
fn error_message_from_body(body: &[u8]) -> String {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) else {
        return EXECUTION_FAILED_MESSAGE.to_string();
    };

    match value.get("detail") {
        Some(serde_json::Value::String(detail)) if !detail.is_empty() => return detail.clone(),
        // Validation errors arrive as a list of {loc, msg, type}
        Some(serde_json::Value::Array(items)) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if !messages.is_empty() {
                return messages.join("; ");
            }
        }
        _ => {}
    }

    value
        .get("message")
        .and_then(|m| m.as_str())
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| EXECUTION_FAILED_MESSAGE.to_string())
}
