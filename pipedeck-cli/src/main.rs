//! Pipedeck CLI
//!
//! Command-line console for a pipeline-orchestration backend: browse and
//! manage pipelines, pipeline versions, recurring jobs, runs and experiments.

use anyhow::Result;
use clap::Parser;
use colored::*;
use pipedeck_cli::commands::{Commands, handle_command};
use pipedeck_cli::config::Config;
use tracing::error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pipedeck")]
#[command(about = "Pipeline orchestration console", long_about = None)]
struct Cli {
    /// Backend URL
    #[arg(long, env = "PIPEDECK_API_URL", default_value = "http://localhost:8888")]
    api_url: String,

    /// Bearer token for the backend
    #[arg(long, env = "PIPEDECK_API_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Rows per page for list commands
    #[arg(long, env = "PIPEDECK_PAGE_SIZE", default_value_t = pipedeck_core::list::DEFAULT_PAGE_SIZE)]
    page_size: u32,

    /// Log filter, e.g. `pipedeck=debug` (RUST_LOG takes precedence)
    #[arg(long, env = "PIPEDECK_LOG", default_value = "pipedeck=warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.log_level.clone().into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config {
        api_url: cli.api_url,
        token: cli.token,
        page_size: cli.page_size,
    };

    if let Err(err) = handle_command(cli.command, &config).await {
        error!(error = %format!("{:#}", err), "command failed");
        print_error(&err);
        std::process::exit(1);
    }

    Ok(())
}

/// Titled error block: the outermost context, then its causes
fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "✗".red().bold(), err.to_string().red().bold());
    for cause in err.chain().skip(1) {
        eprintln!("  {}", cause.to_string().dimmed());
    }
}
