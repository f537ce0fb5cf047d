//! Commands module
//!
//! Defines all CLI commands and their handlers, plus the listing and output
//! helpers they share.

mod experiment;
mod job;
mod pipeline;
mod run;
mod version;

pub use experiment::ExperimentCommands;
pub use job::JobCommands;
pub use pipeline::PipelineCommands;
pub use run::RunCommands;
pub use version::VersionCommands;

use anyhow::{Result, anyhow};
use clap::{Args, Subcommand};
use colored::*;
use pipedeck_core::domain::pipeline::Timestamp;
use pipedeck_core::list::SortBy;
use tracing::error;

use crate::config::Config;
use crate::table::{ErrorSink, ListSource, ListView, ViewState};

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Pipeline management
    Pipeline {
        #[command(subcommand)]
        command: PipelineCommands,
    },
    /// Pipeline version management
    Version {
        #[command(subcommand)]
        command: VersionCommands,
    },
    /// Recurring job management
    Job {
        #[command(subcommand)]
        command: JobCommands,
    },
    /// Run management
    Run {
        #[command(subcommand)]
        command: RunCommands,
    },
    /// Experiment management
    Experiment {
        #[command(subcommand)]
        command: ExperimentCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Pipeline { command } => pipeline::handle_pipeline_command(command, config).await,
        Commands::Version { command } => version::handle_version_command(command, config).await,
        Commands::Job { command } => job::handle_job_command(command, config).await,
        Commands::Run { command } => run::handle_run_command(command, config).await,
        Commands::Experiment { command } => {
            experiment::handle_experiment_command(command, config).await
        }
    }
}

// =============================================================================
// Listing
// =============================================================================

/// Paging, sorting and filtering flags shared by list commands
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Sort as `field` or `field desc`; an empty value uses server order
    #[arg(long)]
    pub sort: Option<String>,

    /// Only rows whose name contains this text
    #[arg(long)]
    pub filter: Option<String>,

    /// Token printed by a previous page
    #[arg(long)]
    pub page_token: Option<String>,
}

impl ListArgs {
    /// Apply the flags to a fresh view
    pub fn configure<S: ListSource>(&self, view: ListView<S>) -> Result<ListView<S>> {
        let view = match &self.sort {
            Some(sort) => view.with_sort(SortBy::parse(sort)?),
            None => view,
        };
        Ok(match &self.filter {
            Some(text) => view.with_filter(text.clone()),
            None => view,
        })
    }

    /// Load the requested page; returns the next-page token
    pub async fn load<S: ListSource>(&self, view: &ListView<S>) -> Result<String> {
        let mut request = view.current_request();
        if let Some(token) = &self.page_token {
            request.page_token = token.clone();
        }
        let next_page_token = view.reload_with(request).await;
        ensure_loaded(view)?;
        Ok(next_page_token)
    }
}

/// Error sink for list views: every failure is logged, and the command
/// reports the banner once the reload returns
pub fn banner_sink() -> ErrorSink {
    Box::new(|message, err| error!(error = %format!("{:#}", err), "{}", message))
}

/// Turn an errored view into the page's error banner
pub fn ensure_loaded<S: ListSource>(view: &ListView<S>) -> Result<()> {
    match view.state() {
        ViewState::Errored(detail) => Err(anyhow!(detail).context(view.error_message().to_string())),
        _ => Ok(()),
    }
}

pub fn print_next_page_hint(next_page_token: &str) {
    if !next_page_token.is_empty() {
        println!(
            "{}",
            format!("More results: --page-token {}", next_page_token).dimmed()
        );
    }
}

// =============================================================================
// Output
// =============================================================================

/// Format an optional timestamp for display
pub fn format_time(time: Option<Timestamp>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Parse a single key=value pair
pub fn parse_key_val(s: &str) -> Result<(String, String)> {
    let pos = s
        .find('=')
        .ok_or_else(|| anyhow!("invalid KEY=value: no `=` found in `{}`", s))?;
    Ok((s[..pos].to_string(), s[pos + 1..].to_string()))
}

/// Report one outcome of a bulk action; returns 1 for a failure
///
/// `action` is a past participle such as `deleted`.
pub fn report_outcome(kind: &str, id: &str, result: Result<()>, action: &str) -> usize {
    match result {
        Ok(()) => {
            println!("{} {} {} {}", "✓".green(), kind, id.cyan(), action);
            0
        }
        Err(err) => {
            error!(error = %format!("{:#}", err), id, "{} not {}", kind, action);
            eprintln!("{} {} {} not {}: {:#}", "✗".red(), kind, id, action, err);
            1
        }
    }
}
