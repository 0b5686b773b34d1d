//! `taskhawk run` — drive one task through the session retry loop.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Args;
use taskhawk_config::AppConfig;
use taskhawk_core::task::TaskSpec;
use taskhawk_session::{RetryPolicy, RetryRunner, RolePlaySession, RunError};
use tracing::info;

#[derive(Args)]
pub struct RunArgs {
    /// The task, as free text
    pub task: Option<String>,

    /// Read the task from a file instead
    #[arg(short, long, conflicts_with = "task")]
    pub file: Option<PathBuf>,

    /// Override the per-session turn budget
    #[arg(long)]
    pub max_turns: Option<u32>,

    /// Rewrite the task into a more specific statement before starting
    #[arg(long)]
    pub specify: bool,

    /// Override the maximum number of attempts
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Override the model for both roles
    #[arg(short, long)]
    pub model: Option<String>,
}

pub async fn run(args: RunArgs) -> anyhow::Result<()> {
    let mut config = AppConfig::load().context("Failed to load config")?;
    if let Some(model) = args.model {
        config.default_model = model;
    }
    if let Some(n) = args.max_attempts {
        config.retry.max_attempts = n;
    }

    // Check for API key early — give a clear error
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    OPENAI_API_KEY   = 'sk-...'");
        eprintln!("    TASKHAWK_API_KEY = 'sk-...'   (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        bail!("No API key found. See above for setup instructions.");
    }

    let prompt = match (args.task, args.file) {
        (Some(text), _) => text,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read task file {}", path.display()))?,
        (None, None) => bail!("Provide a task as an argument, or --file <PATH>"),
    };

    let mut task = TaskSpec::new(prompt.trim())?.with_task_specify(args.specify);
    if let Some(turns) = args.max_turns {
        task = task.with_turn_budget(turns);
    }

    let provider = taskhawk_providers::build_from_config(&config);
    let registry = Arc::new(
        taskhawk_tools::default_registry(&config.tools).context("Failed to build toolkits")?,
    );
    info!(tools = ?registry.names(), "tools registered");

    // Toolkits keep their HTTP clients and output directory alive for the
    // whole run; only the conversational state is rebuilt per attempt.
    let session = RolePlaySession::new(
        provider,
        registry,
        config.session.clone(),
        config.user_model(),
        config.assistant_model(),
    )
    .with_temperature(config.default_temperature)
    .with_max_tokens(config.default_max_tokens);

    let runner = RetryRunner::new(RetryPolicy::from(&config.retry));

    match runner.run(&session, &task).await {
        Ok(report) => {
            println!();
            println!("Answer:");
            println!("{}", report.answer);
            println!();
            println!(
                "  Attempts: {}/{}   Tokens: {}",
                report.attempts, config.retry.max_attempts, report.usage.total_tokens
            );
            println!("  Verify the answer against the task before relying on it.");
            println!(
                "  Files written by tools (if any) are under: {}",
                config.tools.output_dir
            );
            println!();
            Ok(())
        }
        Err(e @ RunError::Exhausted { .. }) => {
            eprintln!();
            eprintln!("  Task did not complete: {e}");
            eprintln!();
            Err(e.into())
        }
        Err(e) => Err(e).context("Task run failed"),
    }
}
