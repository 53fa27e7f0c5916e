//! TokenMeter CLI - Main entry point

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokenmeter_foundation::{StoreScope, TokenCounter, TokenFamily, TokenizerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// TokenMeter - count LLM tokens for OpenAI, Claude and Gemini
#[derive(Parser, Debug)]
#[command(name = "tokenmeter")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Config file to use instead of the global/project config
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Count tokens for a text (reads stdin when TEXT is omitted)
    Count {
        /// Tokenizer family (openai, claude, gemini)
        #[arg(short, long, default_value = "openai")]
        family: TokenFamily,

        /// OpenAI model to count with (counts as --family openai)
        #[arg(short, long, conflicts_with = "family")]
        model: Option<String>,

        text: Option<String>,
    },
    /// Count tokens for a JSON array of strings
    Batch {
        /// Tokenizer family (openai, claude, gemini)
        #[arg(short, long, default_value = "openai")]
        family: TokenFamily,

        /// JSON file (reads stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Benchmark every tokenizer family on the same text
    Bench {
        /// Rounds per family (defaults to config, then 10)
        #[arg(short, long)]
        iterations: Option<usize>,

        text: Option<String>,
    },
    /// Build the tokenizer engine cache and report what loaded
    Warmup,
    /// Write a config file with the defaults filled in
    Init {
        /// Write ./.tokenmeter/config.json instead of the global config
        #[arg(short, long)]
        project: bool,

        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging (stderr, stdout is for results)
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config_path = args.config.as_deref();

    match args.command {
        Command::Count {
            family,
            model,
            text,
        } => {
            let (_, counter) = open_counter(config_path)?;
            let text = cli::read_text(text)?;
            cli::run_count(&counter, &text, family, model.as_deref(), args.json).await
        }
        Command::Batch { family, file } => {
            let (_, counter) = open_counter(config_path)?;
            let input = cli::read_batch(file.as_deref())?;
            cli::run_batch(&counter, &input, family, args.json).await
        }
        Command::Bench { iterations, text } => {
            let (config, counter) = open_counter(config_path)?;
            let text = cli::read_text(text)?;
            let iterations = iterations.unwrap_or_else(|| config.benchmark_iterations());
            cli::run_bench(&counter, &text, iterations, args.json).await
        }
        Command::Warmup => {
            let (_, counter) = open_counter(config_path)?;
            cli::run_warm_up(&counter, args.json).await
        }
        Command::Init { project, force } => {
            let scope = if project {
                StoreScope::Project
            } else {
                StoreScope::Global
            };
            cli::run_init(scope, force)
        }
    }
}

fn open_counter(
    config_path: Option<&std::path::Path>,
) -> anyhow::Result<(TokenizerConfig, TokenCounter)> {
    let config = load_config(config_path)?;
    tracing::debug!(
        "Using default model {}, Claude API {}",
        config.default_model(),
        if config.claude.has_api_key() { "enabled" } else { "disabled" }
    );
    let counter = TokenCounter::new(&config);
    Ok((config, counter))
}

/// Explicit config file, or global + project config with env overrides
fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<TokenizerConfig> {
    if let Some(path) = path {
        return Ok(TokenizerConfig::load_from(path)?);
    }

    Ok(TokenizerConfig::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config: {}", e);
        let mut config = TokenizerConfig::default();
        config.apply_env();
        config
    }))
}
