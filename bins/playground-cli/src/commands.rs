// CLI commands for the playground
use std::fs;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use playground_common::controller::{RunController, RunOutcome};
use playground_common::editor::{initial_text, BufferEditor, Editor};
use playground_common::languages;
use playground_common::notify::Notifier;
use playground_common::render::OutputPanel;
use playground_common::selector::LanguageSelector;
use playground_common::storage::{FileStore, Preferences};
use playground_common::theme::{Theme, ThemeToggle};
use playground_common::{ClientConfig, ExecutionResult, HttpExecutionClient};
use tracing::debug;

use crate::terminal::{TerminalLoading, TerminalNotifier};

fn open_preferences(config: &ClientConfig) -> Arc<Preferences> {
    debug!(path = %config.state_path.display(), "Using preferences file");
    Arc::new(Preferences::new(FileStore::new(&config.state_path)))
}

/// Run code from a file, the saved buffer, or the language sample
pub async fn run(
    config: &ClientConfig,
    file: Option<&Path>,
    language: Option<&str>,
    html: bool,
) -> Result<ExitCode> {
    let prefs = open_preferences(config);
    let selector = Arc::new(LanguageSelector::load(prefs.clone()));

    let from_file = match file {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        None => None,
    };

    // Only the saved buffer is written back; a file run leaves it alone.
    let editor = match from_file {
        Some(_) => Arc::new(BufferEditor::new("")),
        None => Arc::new(BufferEditor::new("").with_preferences(prefs.clone())),
    };

    if let Some(language) = language {
        selector.set_language(language, &*editor)?;
    } else {
        editor.set_language_mode(selector.current().editor_mode);
    }

    let source = match from_file {
        Some(source) => source,
        None => initial_text(&prefs, selector.current_id()),
    };
    editor.set_text(&source);

    let client = Arc::new(HttpExecutionClient::new(config.clone())?);
    let panel = Arc::new(OutputPanel::new());

    let controller = RunController::builder(client, editor, selector)
        .output(panel.clone())
        .notifier(Arc::new(TerminalNotifier))
        .loading(Arc::new(TerminalLoading))
        .build();

    let result = match controller.on_run_triggered().await {
        RunOutcome::Completed(result) => result,
        RunOutcome::Skipped(reason) => {
            debug!(?reason, "Run skipped");
            return Ok(ExitCode::FAILURE);
        }
    };

    let rendered = panel.rendered();
    if html {
        println!("{}", rendered.to_html());
    } else {
        println!("{}", rendered.to_text().trim_end_matches('\n'));
    }

    Ok(match result {
        ExecutionResult::Success { exit_code: 0, .. } => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

/// Print the language registry, and optionally the backend's own list
pub async fn list_languages(config: &ClientConfig, remote: bool) -> Result<ExitCode> {
    let prefs = open_preferences(config);
    let current = LanguageSelector::load(prefs).current_id();

    println!("📋 Supported languages:");
    for lang in languages::all() {
        let marker = if lang.id == current { "*" } else { " " };
        println!("  {} {:<12} {}", marker, lang.id, lang.display_name);
    }

    if remote {
        let client = HttpExecutionClient::new(config.clone())?;
        match client.supported_languages().await {
            Some(list) => {
                println!("\n🌐 Backend reports:");
                println!("{}", serde_json::to_string_pretty(&list)?);
            }
            None => println!("\n⚠️  Backend did not report its languages"),
        }
    }

    Ok(ExitCode::SUCCESS)
}

pub fn print_sample(config: &ClientConfig, language: Option<&str>) -> Result<ExitCode> {
    let id = match language {
        Some(id) => id.to_string(),
        None => LanguageSelector::load(open_preferences(config))
            .current_id()
            .to_string(),
    };

    let Some(sample) = languages::sample(&id) else {
        bail!("Unsupported language: {}", id);
    };
    print!("{}", sample);
    Ok(ExitCode::SUCCESS)
}

pub fn set_language(config: &ClientConfig, name: &str) -> Result<ExitCode> {
    let prefs = open_preferences(config);
    let selector = LanguageSelector::load(prefs.clone());
    let editor = BufferEditor::new("");

    let lang = selector.set_language(name, &editor)?;
    println!("✅ Language set to {}", lang.display_name);
    Ok(ExitCode::SUCCESS)
}

pub fn theme(config: &ClientConfig, toggle: bool, set: Option<&str>) -> Result<ExitCode> {
    let themes = ThemeToggle::load(open_preferences(config));

    if toggle {
        themes.toggle();
    } else if let Some(value) = set {
        let Some(theme) = Theme::parse(value) else {
            bail!("Unknown theme '{}' (expected dark or light)", value);
        };
        themes.set(theme);
    }

    let current = themes.current();
    println!("🎨 Theme: {} (editor: {})", current, current.editor_theme());
    Ok(ExitCode::SUCCESS)
}

pub async fn health(config: &ClientConfig) -> Result<ExitCode> {
    let client = HttpExecutionClient::new(config.clone())?;
    let status = client.check_health().await;

    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(if status.is_healthy() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

pub fn clear(config: &ClientConfig) -> Result<ExitCode> {
    let editor = BufferEditor::new("").with_preferences(open_preferences(config));
    editor.clear();
    TerminalNotifier.info("Editor cleared");
    Ok(ExitCode::SUCCESS)
}
