//! Run controller: owns the Idle/Running lifecycle of a run and drives the
//! output panel, notifications and the run trigger from the client's result.
//!
//! ```text
//!   trigger ──▶ guard: Idle? ──▶ text blank? ──▶ budget left? ──▶ Running
//!                  │ no            │ yes            │ no              │
//!                  ▼               ▼                ▼                 ▼
//!               no-op          warn, stay Idle   warn, stay Idle   execute().await
//!                                                                     │
//!                              Idle ◀── guard dropped (every path) ◀──┘
//! ```
//!
//! The return to Idle lives in a drop guard, so an error, a panic in a
//! collaborator, or dropping the run future part way all end back at Idle
//! with the trigger re-enabled if the budget allows. Only one request is
//! ever in flight: the guard refuses a second run while the first is Running.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::client::ExecutionClient;
use crate::editor::{Editor, LoadingIndicator, NoopLoading, NoopTrigger, RunTrigger};
use crate::error::RATE_LIMIT_MESSAGE;
use crate::notify::{NoopNotifier, Notifier};
use crate::render::{NoopOutput, OutputSink, OutputView, RUNNING_TEXT};
use crate::selector::LanguageSelector;
use crate::types::{ExecutionResult, RunLifecycleState};

pub const EMPTY_SOURCE_MESSAGE: &str = "Please enter some code to run";
pub const LOADING_MESSAGE: &str = "Running your code...";
pub const SUCCESS_MESSAGE: &str = "Code executed successfully";
pub const COMPLETED_WITH_ERRORS_MESSAGE: &str = "Execution completed with errors";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyRunning,
    EmptySource,
    RateLimited,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// No request was sent.
    Skipped(SkipReason),
    Completed(ExecutionResult),
}

pub struct RunController {
    client: Arc<dyn ExecutionClient>,
    editor: Arc<dyn Editor>,
    selector: Arc<LanguageSelector>,
    output: Arc<dyn OutputSink>,
    notifier: Arc<dyn Notifier>,
    trigger: Arc<dyn RunTrigger>,
    loading: Arc<dyn LoadingIndicator>,
    state: Mutex<RunLifecycleState>,
}

pub struct RunControllerBuilder {
    client: Arc<dyn ExecutionClient>,
    editor: Arc<dyn Editor>,
    selector: Arc<LanguageSelector>,
    output: Arc<dyn OutputSink>,
    notifier: Arc<dyn Notifier>,
    trigger: Arc<dyn RunTrigger>,
    loading: Arc<dyn LoadingIndicator>,
}

impl RunControllerBuilder {
    pub fn output(mut self, output: Arc<dyn OutputSink>) -> Self {
        self.output = output;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn trigger(mut self, trigger: Arc<dyn RunTrigger>) -> Self {
        self.trigger = trigger;
        self
    }

    pub fn loading(mut self, loading: Arc<dyn LoadingIndicator>) -> Self {
        self.loading = loading;
        self
    }

    pub fn build(self) -> RunController {
        RunController {
            client: self.client,
            editor: self.editor,
            selector: self.selector,
            output: self.output,
            notifier: self.notifier,
            trigger: self.trigger,
            loading: self.loading,
            state: Mutex::new(RunLifecycleState::Idle),
        }
    }
}

impl RunController {
    /// Output, notifications, trigger and loading indicator default to no-ops.
    pub fn builder(
        client: Arc<dyn ExecutionClient>,
        editor: Arc<dyn Editor>,
        selector: Arc<LanguageSelector>,
    ) -> RunControllerBuilder {
        RunControllerBuilder {
            client,
            editor,
            selector,
            output: Arc::new(NoopOutput),
            notifier: Arc::new(NoopNotifier),
            trigger: Arc::new(NoopTrigger),
            loading: Arc::new(NoopLoading),
        }
    }

    pub fn state(&self) -> RunLifecycleState {
        *self.lock_state()
    }

    pub fn is_running(&self) -> bool {
        self.state() == RunLifecycleState::Running
    }

    /// Handle a press of the run trigger.
    #[instrument(skip(self), fields(language = self.selector.current_id()))]
    pub async fn on_run_triggered(&self) -> RunOutcome {
        if self.is_running() {
            debug!("Run already in progress, ignoring trigger");
            return RunOutcome::Skipped(SkipReason::AlreadyRunning);
        }

        let code = self.editor.text();
        let language = self.selector.current_id();

        if code.trim().is_empty() {
            self.notifier.warning(EMPTY_SOURCE_MESSAGE);
            self.editor.focus();
            return RunOutcome::Skipped(SkipReason::EmptySource);
        }

        if self.client.rate_limit().is_exhausted(Utc::now()) {
            self.notifier.warning(RATE_LIMIT_MESSAGE);
            self.trigger.set_enabled(false);
            return RunOutcome::Skipped(SkipReason::RateLimited);
        }

        let Some(mut guard) = self.begin() else {
            return RunOutcome::Skipped(SkipReason::AlreadyRunning);
        };

        let run_id = Uuid::new_v4();
        self.output.display(OutputView::Running(RUNNING_TEXT.to_string()));
        self.loading.show(LOADING_MESSAGE);

        info!(run_id = %run_id, source_size = code.len(), "Run started");
        let started = Instant::now();

        let settled = self.client.execute(&code, language).await;

        guard.settle();
        drop(guard);

        let result = match settled {
            Ok(result) => {
                info!(
                    run_id = %run_id,
                    exit_code = result.exit_code(),
                    success = result.is_success(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Run completed"
                );
                match &result {
                    ExecutionResult::Success { exit_code: 0, .. } => {
                        self.notifier.success(SUCCESS_MESSAGE)
                    }
                    ExecutionResult::Success { .. } => {
                        self.notifier.warning(COMPLETED_WITH_ERRORS_MESSAGE)
                    }
                    ExecutionResult::Failure { error_message, .. } => {
                        self.notifier.error(error_message)
                    }
                }
                result
            }
            Err(e) => {
                let message = e.to_string();
                warn!(
                    run_id = %run_id,
                    error = ?e,
                    transport = e.is_transport(),
                    "Run failed"
                );
                self.notifier.error(&message);
                ExecutionResult::failure(message)
            }
        };

        self.output.display(OutputView::Result(result.clone()));

        RunOutcome::Completed(result)
    }

    /// Enable the trigger unless a run is in flight or the budget is spent.
    pub fn refresh_trigger(&self) {
        if self.is_running() {
            return;
        }
        let exhausted = self.client.rate_limit().is_exhausted(Utc::now());
        self.trigger.set_enabled(!exhausted);
    }

    /// Keep the trigger in step with the client's rate-limit broadcasts.
    /// Returns once the client is dropped.
    pub async fn follow_rate_limit(&self) {
        let mut updates = self.client.subscribe();
        while updates.changed().await.is_ok() {
            self.refresh_trigger();
        }
    }

    fn begin(&self) -> Option<RunningGuard<'_>> {
        {
            let mut state = self.lock_state();
            if *state == RunLifecycleState::Running {
                return None;
            }
            *state = RunLifecycleState::Running;
        }
        self.trigger.set_running(true);
        Some(RunningGuard {
            controller: self,
            settled: false,
        })
    }

    fn lock_state(&self) -> MutexGuard<'_, RunLifecycleState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Returns the controller to Idle when dropped. The trigger only comes back
/// if the budget allows another run; a run dropped before the client settled
/// puts the placeholder back in the output panel.
struct RunningGuard<'a> {
    controller: &'a RunController,
    settled: bool,
}

impl RunningGuard<'_> {
    fn settle(&mut self) {
        self.settled = true;
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        *self.controller.lock_state() = RunLifecycleState::Idle;
        self.controller.loading.hide();
        if !self.settled {
            debug!("Run dropped before the client settled");
            self.controller.output.display(OutputView::Placeholder);
        }
        self.controller.refresh_trigger();
    }
}
