use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Exit code recorded for a failure that carries none of its own.
pub const DEFAULT_FAILURE_EXIT_CODE: i32 = 1;

/// Body of `POST /api/execute`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub code: String,
    pub language: String,
}

impl ExecutionRequest {
    pub fn new(code: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            language: language.into(),
        }
    }
}

/// Normalized outcome of one run. Exactly one variant per request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutionResult {
    Success {
        stdout: String,
        stderr: Option<String>,
        exit_code: i32,
        execution_time_seconds: Option<f64>,
    },
    Failure {
        error_message: String,
        exit_code: i32,
    },
}

impl ExecutionResult {
    pub fn success(stdout: impl Into<String>) -> Self {
        ExecutionResult::Success {
            stdout: stdout.into(),
            stderr: None,
            exit_code: 0,
            execution_time_seconds: None,
        }
    }

    pub fn failure(error_message: impl Into<String>) -> Self {
        ExecutionResult::Failure {
            error_message: error_message.into(),
            exit_code: DEFAULT_FAILURE_EXIT_CODE,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            ExecutionResult::Success { exit_code, .. } | ExecutionResult::Failure { exit_code, .. } => {
                *exit_code
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success { .. })
    }
}

/// Response body as the backend sends it.
///
/// Older deployments answer with `{status, output}`, newer ones with
/// `{stdout, stderr, exit_code, execution_time}`; both deserialize here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawExecutionResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default, alias = "exitCode")]
    pub exit_code: Option<i32>,
    #[serde(default, alias = "executionTime")]
    pub execution_time: Option<f64>,
    #[serde(default)]
    pub error: Option<String>,
}

impl RawExecutionResponse {
    pub fn normalize(self) -> ExecutionResult {
        if let Some(error) = self.error.filter(|e| !e.is_empty()) {
            return ExecutionResult::Failure {
                error_message: error,
                exit_code: self.exit_code.unwrap_or(DEFAULT_FAILURE_EXIT_CODE),
            };
        }

        let stdout = self
            .stdout
            .filter(|s| !s.is_empty())
            .or(self.output)
            .unwrap_or_default();

        ExecutionResult::Success {
            stdout,
            stderr: self.stderr.filter(|s| !s.is_empty()),
            exit_code: self.exit_code.unwrap_or(0),
            execution_time_seconds: self.execution_time,
        }
    }
}

/// Request budget reported by the backend through `X-RateLimit-*` headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitState {
    pub remaining: u32,
    pub limit: u32,
    pub reset_time: Option<DateTime<Utc>>,
}

impl Default for RateLimitState {
    fn default() -> Self {
        Self {
            remaining: 10,
            limit: 10,
            reset_time: None,
        }
    }
}

impl RateLimitState {
    /// True while no request may be sent: nothing remains and the window
    /// has not yet been reported as reset.
    pub fn is_exhausted(&self, now: DateTime<Utc>) -> bool {
        if self.remaining > 0 {
            return false;
        }
        match self.reset_time {
            Some(reset) => reset > now,
            None => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunLifecycleState {
    #[default]
    Idle,
    Running,
}

/// Payload of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl HealthStatus {
    pub fn unreachable() -> Self {
        Self {
            status: "error".to_string(),
            message: Some("backend unreachable".to_string()),
            extra: serde_json::Map::new(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self.status.as_str(), "ok" | "healthy" | "success")
    }
}
