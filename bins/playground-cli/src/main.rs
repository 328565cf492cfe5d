mod commands;
mod terminal;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use playground_common::ClientConfig;

#[derive(Parser)]
#[command(name = "playground")]
#[command(about = "Playground CLI - Run code on the execution backend from a terminal", long_about = None)]
struct Cli {
    /// Backend base URL (overrides PLAYGROUND_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Preferences file (overrides PLAYGROUND_STATE_PATH)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true, default_value = "false")]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run code and print its output
    Run {
        /// Source file, run without touching the saved code; defaults to the saved code, then the language sample
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Language to run as (also becomes the saved choice)
        #[arg(short, long)]
        language: Option<String>,

        /// Print the output panel as HTML instead of plain text
        #[arg(long, default_value = "false")]
        html: bool,
    },

    /// List supported languages
    Languages {
        /// Also ask the backend which languages it accepts
        #[arg(long, default_value = "false")]
        remote: bool,
    },

    /// Print the sample program for a language
    Sample {
        /// Language name (defaults to the saved choice)
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Save the language used by later runs
    SetLanguage {
        /// Language name (e.g., python, rust, cpp)
        name: String,
    },

    /// Show or change the color theme
    Theme {
        /// Switch between dark and light
        #[arg(long, default_value = "false", conflicts_with = "set")]
        toggle: bool,

        /// Set the theme explicitly (dark or light)
        #[arg(long)]
        set: Option<String>,
    },

    /// Check that the backend is up
    Health,

    /// Forget the last edited code
    Clear,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // stdout carries program output, so logs go to stderr
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let mut config = ClientConfig::from_env();
    if let Some(api_url) = cli.api_url {
        config = config.with_api_url(api_url);
    }
    if let Some(state) = cli.state {
        config.state_path = state;
    }

    match cli.command {
        Commands::Run {
            file,
            language,
            html,
        } => commands::run(&config, file.as_deref(), language.as_deref(), html).await,
        Commands::Languages { remote } => commands::list_languages(&config, remote).await,
        Commands::Sample { language } => commands::print_sample(&config, language.as_deref()),
        Commands::SetLanguage { name } => commands::set_language(&config, &name),
        Commands::Theme { toggle, set } => commands::theme(&config, toggle, set.as_deref()),
        Commands::Health => commands::health(&config).await,
        Commands::Clear => commands::clear(&config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::parse_from(["playground", "run", "-l", "rust", "--html", "--api-url", "http://x"]);
        assert_eq!(cli.api_url.as_deref(), Some("http://x"));
        match cli.command {
            Commands::Run { language, html, file } => {
                assert_eq!(language.as_deref(), Some("rust"));
                assert!(html);
                assert!(file.is_none());
            }
            _ => panic!("expected run"),
        }
    }
}
