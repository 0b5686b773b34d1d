//! Taskhawk CLI — the main entry point.
//!
//! Commands:
//! - `run`    — Run a task through the session retry loop
//! - `tools`  — List the registered tools
//! - `config` — Show the resolved configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "taskhawk",
    about = "Taskhawk — retrying runner for tool-using task sessions",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a task until it answers or the attempt budget runs out
    Run(commands::run::RunArgs),

    /// List the registered tools
    Tools,

    /// Show the resolved configuration (secrets redacted)
    Config {
        /// Write a default config file first, if none exists
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Run(args) => commands::run::run(args).await,
        Commands::Tools => commands::tools::run(),
        Commands::Config { init } => commands::config_cmd::run(init),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_with_flags() {
        let cli = Cli::parse_from([
            "taskhawk",
            "run",
            "what is 2+2",
            "--max-turns",
            "4",
            "--specify",
        ]);
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.task.as_deref(), Some("what is 2+2"));
                assert_eq!(args.max_turns, Some(4));
                assert!(args.specify);
            }
            _ => panic!("expected the run subcommand"),
        }
    }

    #[test]
    fn parses_config_init() {
        let cli = Cli::parse_from(["taskhawk", "config", "--init"]);
        assert!(matches!(cli.command, Commands::Config { init: true }));
    }

    #[test]
    fn task_and_file_are_exclusive() {
        let result = Cli::try_parse_from([
            "taskhawk",
            "run",
            "inline task",
            "--file",
            "task.txt",
        ]);
        assert!(result.is_err());
    }
}
