use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use mathlens::ai::{GeminiBackend, InsightClient};
use mathlens::calculator::{EvalError, evaluate};
use mathlens::config::{Config, load_config};
use mathlens::history::{HISTORY_CAPACITY, HistoryStore};
use mathlens::ui::{Controller, ErrorFeedback, Session};

#[derive(Parser)]
#[command(name = "mathlens", version, about = "A calculator that explains its results")]
struct Cli {
    /// Path to a config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Gemini model to use
    #[arg(long, global = true)]
    model: Option<String>,

    /// Seconds to wait for an AI answer
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Show AI failures instead of only logging them
    #[arg(long, global = true)]
    surface_errors: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate an expression
    Eval {
        #[arg(required = true, allow_hyphen_values = true)]
        expression: Vec<String>,
    },
    /// Evaluate an expression and explain the result
    Explain {
        #[arg(required = true, allow_hyphen_values = true)]
        expression: Vec<String>,
    },
    /// Answer a word problem
    Solve {
        #[arg(required = true)]
        problem: Vec<String>,
    },
    /// Interactive calculator (default)
    Repl,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    init_tracing();

    if let Err(e) = run(Cli::parse()).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mathlens=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command.as_ref().unwrap_or(&Commands::Repl) {
        Commands::Eval { expression } => eval(&expression.join(" ")),
        Commands::Explain { expression } => {
            let client = build_client(&cli, &config)?;
            let controller = Controller::new().with_error_feedback(ErrorFeedback::Surface);
            let mut session = Session::new(controller, &client, std::io::stdout());

            session.handle_line(&expression.join(" "))?;
            if session.controller().history().is_empty() {
                std::process::exit(1);
            }
            session.handle_line(":explain 1")?;
            session.drain().await
        }
        Commands::Solve { problem } => {
            let client = build_client(&cli, &config)?;
            let controller = Controller::new().with_error_feedback(ErrorFeedback::Surface);
            let mut session = Session::new(controller, &client, std::io::stdout());

            session.handle_line(&format!(":solve {}", problem.join(" ")))?;
            session.drain().await
        }
        Commands::Repl => repl(&cli, &config).await,
    }
}

fn eval(expression: &str) -> Result<()> {
    match evaluate(expression) {
        Ok(result) => {
            println!("{}", result);
            Ok(())
        }
        Err(e) => {
            println!("{}", EvalError::DISPLAY);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

async fn repl(cli: &Cli, config: &Config) -> Result<()> {
    let client = build_client(cli, config)?;

    let feedback = if cli.surface_errors {
        ErrorFeedback::Surface
    } else {
        config.ui.error_feedback
    };

    let history_path = config
        .history
        .persist
        .then(|| config.history.resolved_path())
        .flatten();

    let history = match &history_path {
        Some(path) => HistoryStore::load(path, HISTORY_CAPACITY)
            .with_context(|| format!("loading history from {}", path.display()))?,
        None => HistoryStore::new(),
    };

    let controller = Controller::new()
        .with_history(history)
        .with_error_feedback(feedback);

    let mut session = Session::new(controller, &client, std::io::stdout());
    if let Some(path) = history_path {
        session = session.persist_to(path);
    }

    println!(
        "mathlens using {}. Type :help for commands.",
        client.backend().model()
    );
    session.run().await
}

fn build_client(cli: &Cli, config: &Config) -> Result<InsightClient<GeminiBackend>> {
    let model = cli.model.as_deref().unwrap_or(&config.ai.model);
    let timeout = config.ai.timeout_or(cli.timeout);

    let backend = GeminiBackend::from_env(&config.ai.api_key_env, model)
        .context("Gemini is not configured")?;

    info!(model, timeout_secs = timeout.as_secs(), "Gemini client ready");
    Ok(InsightClient::new(backend).with_timeout(timeout))
}
