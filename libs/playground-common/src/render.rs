//! Output renderer: a pure mapping from what the output panel should show
//! to a display representation, with markup and plain-text forms.
//!
//! Program output is untrusted. Every string is escaped before it is placed
//! in markup; `to_text` is for terminals and leaves text as is.

use std::sync::Mutex;

use crate::notify::Notifier;
use crate::types::ExecutionResult;

pub const PLACEHOLDER_TEXT: &str = "Run your code to see the output here";
pub const NO_OUTPUT_TEXT: &str = "Program executed successfully with no output.";
pub const RUNNING_TEXT: &str = "Executing...";

#[derive(Debug, Clone, PartialEq, Default)]
pub enum OutputView {
    #[default]
    Placeholder,
    Running(String),
    Result(ExecutionResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStyle {
    Neutral,
    Running,
    Success,
    Error,
}

impl OutputStyle {
    pub fn css_class(&self) -> &'static str {
        match self {
            OutputStyle::Neutral => "output-content",
            OutputStyle::Running => "output-content running",
            OutputStyle::Success => "output-content success",
            OutputStyle::Error => "output-content error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedOutput {
    pub style: OutputStyle,
    /// Section heading; absent for placeholder and running states.
    pub title: Option<&'static str>,
    pub body: String,
    pub stderr: Option<String>,
    /// Exit code and timing, when there is something worth showing.
    pub meta: Option<String>,
}

pub fn render(view: &OutputView) -> RenderedOutput {
    match view {
        OutputView::Placeholder => RenderedOutput {
            style: OutputStyle::Neutral,
            title: None,
            body: PLACEHOLDER_TEXT.to_string(),
            stderr: None,
            meta: None,
        },
        OutputView::Running(message) => RenderedOutput {
            style: OutputStyle::Running,
            title: None,
            body: message.clone(),
            stderr: None,
            meta: None,
        },
        OutputView::Result(ExecutionResult::Failure { error_message, .. }) => RenderedOutput {
            style: OutputStyle::Error,
            title: Some("Error"),
            body: error_message.clone(),
            stderr: None,
            meta: None,
        },
        OutputView::Result(ExecutionResult::Success {
            stdout,
            stderr,
            exit_code,
            execution_time_seconds,
        }) => {
            let body = if stdout.trim().is_empty() {
                NO_OUTPUT_TEXT.to_string()
            } else {
                stdout.clone()
            };

            RenderedOutput {
                style: OutputStyle::Success,
                title: Some("Output"),
                body,
                stderr: stderr.clone().filter(|s| !s.trim().is_empty()),
                meta: meta_line(*exit_code, *execution_time_seconds),
            }
        }
    }
}

fn meta_line(exit_code: i32, execution_time: Option<f64>) -> Option<String> {
    match execution_time {
        Some(secs) => Some(format!("Exit code: {} | Time: {:.3}s", exit_code, secs)),
        None if exit_code != 0 => Some(format!("Exit code: {}", exit_code)),
        None => None,
    }
}

impl RenderedOutput {
    pub fn to_html(&self) -> String {
        let mut html = format!("<div class=\"{}\">", self.style.css_class());

        match self.style {
            OutputStyle::Neutral => {
                html.push_str(&format!(
                    "<div class=\"output-placeholder\"><p>{}</p></div>",
                    escape_html(&self.body)
                ));
            }
            OutputStyle::Running => {
                html.push_str(&format!(
                    "<div class=\"output-placeholder\"><span class=\"spinner\"></span><p>{}</p></div>",
                    escape_html(&self.body)
                ));
            }
            OutputStyle::Success | OutputStyle::Error => {
                let pre_class = if self.style == OutputStyle::Error {
                    "output-stderr"
                } else {
                    "output-stdout"
                };
                html.push_str(&section(self.title.unwrap_or("Output"), pre_class, &self.body));

                if let Some(stderr) = &self.stderr {
                    html.push_str(&section("Stderr", "output-stderr", stderr));
                }
                if let Some(meta) = &self.meta {
                    html.push_str(&format!("<div class=\"output-meta\">{}</div>", escape_html(meta)));
                }
            }
        }

        html.push_str("</div>");
        html
    }

    pub fn to_text(&self) -> String {
        let mut text = match self.style {
            OutputStyle::Running => format!("... {}", self.body),
            OutputStyle::Error => format!("Error: {}", self.body),
            OutputStyle::Neutral | OutputStyle::Success => self.body.clone(),
        };

        if let Some(stderr) = &self.stderr {
            if !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str("--- stderr ---\n");
            text.push_str(stderr);
        }
        if let Some(meta) = &self.meta {
            if !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(meta);
        }
        text
    }
}

fn section(title: &str, pre_class: &str, content: &str) -> String {
    format!(
        "<div class=\"output-section\"><div class=\"output-section-title\">{}</div><pre class=\"{}\">{}</pre></div>",
        escape_html(title),
        pre_class,
        escape_html(content)
    )
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Where the controller sends the output panel's next state.
pub trait OutputSink: Send + Sync {
    fn display(&self, view: OutputView);
}

/// Ignores every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopOutput;

impl OutputSink for NoopOutput {
    fn display(&self, _view: OutputView) {}
}

/// The output panel's current state.
#[derive(Debug, Default)]
pub struct OutputPanel {
    view: Mutex<OutputView>,
}

impl OutputPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> OutputView {
        self.view
            .lock()
            .map(|view| view.clone())
            .unwrap_or_default()
    }

    pub fn rendered(&self) -> RenderedOutput {
        render(&self.current())
    }

    /// Back to the placeholder.
    pub fn clear(&self, notifier: &dyn Notifier) {
        self.display(OutputView::Placeholder);
        notifier.info("Output cleared");
    }
}

impl OutputSink for OutputPanel {
    fn display(&self, view: OutputView) {
        if let Ok(mut current) = self.view.lock() {
            *current = view;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{NotificationLevel, ToastBoard};

    #[test]
    fn test_placeholder() {
        let rendered = render(&OutputView::Placeholder);
        assert_eq!(rendered.style, OutputStyle::Neutral);
        assert_eq!(rendered.body, PLACEHOLDER_TEXT);
        assert!(rendered.to_html().contains("output-placeholder"));
    }

    #[test]
    fn test_running_shows_spinner_and_message() {
        let html = render(&OutputView::Running(RUNNING_TEXT.to_string())).to_html();
        assert!(html.contains("spinner"));
        assert!(html.contains("Executing..."));
        assert!(html.starts_with("<div class=\"output-content running\">"));
    }

    #[test]
    fn test_hello_world_success() {
        let rendered = render(&OutputView::Result(ExecutionResult::success("Hello, World!")));
        assert_eq!(rendered.style, OutputStyle::Success);
        assert_eq!(rendered.body, "Hello, World!");
        assert_eq!(rendered.meta, None);

        let html = rendered.to_html();
        assert!(html.contains("<pre class=\"output-stdout\">Hello, World!</pre>"));
        assert!(!html.contains("output-stderr"));
        assert!(!html.contains("error"));
    }

    #[test]
    fn test_blank_output_uses_fixed_message() {
        for stdout in ["", "  \n\t"] {
            let rendered = render(&OutputView::Result(ExecutionResult::success(stdout)));
            assert_eq!(rendered.body, NO_OUTPUT_TEXT);
        }
    }

    #[test]
    fn test_stdout_is_verbatim() {
        let rendered = render(&OutputView::Result(ExecutionResult::success("  indented\n\n")));
        assert_eq!(rendered.body, "  indented\n\n");
    }

    #[test]
    fn test_failure_shows_message_only() {
        let rendered = render(&OutputView::Result(ExecutionResult::failure("Rate limit exceeded")));
        assert_eq!(rendered.style, OutputStyle::Error);
        assert_eq!(rendered.title, Some("Error"));
        assert_eq!(rendered.stderr, None);
        assert_eq!(rendered.meta, None);
        assert_eq!(rendered.to_text(), "Error: Rate limit exceeded");
    }

    #[test]
    fn test_markup_in_output_is_escaped() {
        let result = ExecutionResult::Success {
            stdout: "<script>alert('x')</script>".to_string(),
            stderr: Some("a & b".to_string()),
            exit_code: 0,
            execution_time_seconds: None,
        };
        let html = render(&OutputView::Result(result)).to_html();

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(html.contains("a &amp; b"));

        let failure = render(&OutputView::Result(ExecutionResult::failure("<b>bad</b>"))).to_html();
        assert!(failure.contains("&lt;b&gt;bad&lt;/b&gt;"));
    }

    #[test]
    fn test_meta_line_and_stderr() {
        let result = ExecutionResult::Success {
            stdout: "out".to_string(),
            stderr: Some("Traceback".to_string()),
            exit_code: 1,
            execution_time_seconds: Some(0.5),
        };
        let rendered = render(&OutputView::Result(result));

        assert_eq!(rendered.meta.as_deref(), Some("Exit code: 1 | Time: 0.500s"));
        assert_eq!(rendered.to_text(), "out\n--- stderr ---\nTraceback\nExit code: 1 | Time: 0.500s");
        assert!(rendered.to_html().contains("<div class=\"output-meta\">"));
    }

    #[test]
    fn test_nonzero_exit_without_timing() {
        let result = ExecutionResult::Success {
            stdout: String::new(),
            stderr: None,
            exit_code: 2,
            execution_time_seconds: None,
        };
        assert_eq!(render(&OutputView::Result(result)).meta.as_deref(), Some("Exit code: 2"));
    }

    #[test]
    fn test_panel_clear() {
        let panel = OutputPanel::new();
        let board = ToastBoard::new();

        panel.display(OutputView::Result(ExecutionResult::success("x")));
        assert!(matches!(panel.current(), OutputView::Result(_)));

        panel.clear(&board);
        assert_eq!(panel.current(), OutputView::Placeholder);
        let toasts = board.visible();
        assert_eq!(toasts[0].level, NotificationLevel::Info);
        assert_eq!(toasts[0].message, "Output cleared");
    }
}
