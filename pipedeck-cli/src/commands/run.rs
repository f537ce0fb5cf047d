//! Run command handlers

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use colored::*;
use pipedeck_client::ApiClient;
use pipedeck_core::domain::reference::{ResourceType, find_reference};
use pipedeck_core::domain::run::{Run, RunDetail, StorageState};
use pipedeck_core::list::{Filter, Predicate, PredicateOp};
use pipedeck_core::routes;

use super::{ListArgs, banner_sink, format_time, print_next_page_hint, report_outcome};
use crate::config::Config;
use crate::id_resolver::{resolve_experiment_id, resolve_run_id};
use crate::table::{ListView, RunSource};
use crate::types::IdOrPrefix;

/// Run subcommands
#[derive(Subcommand)]
pub enum RunCommands {
    /// List runs
    List {
        /// Only runs of this experiment (ID or prefix)
        #[arg(short, long)]
        experiment: Option<String>,

        /// List archived runs instead of active ones
        #[arg(long)]
        archived: bool,

        #[command(flatten)]
        list: ListArgs,
    },
    /// Get run details
    Get {
        /// Run ID or unambiguous prefix
        id: String,
    },
    /// Archive runs
    Archive {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Restore archived runs
    Unarchive {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Delete runs
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Clone, Copy)]
enum RunAction {
    Archive,
    Unarchive,
    Delete,
}

impl RunAction {
    fn past_tense(self) -> &'static str {
        match self {
            RunAction::Archive => "archived",
            RunAction::Unarchive => "restored",
            RunAction::Delete => "deleted",
        }
    }
}

/// Handle run commands
pub async fn handle_run_command(command: RunCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        RunCommands::List {
            experiment,
            archived,
            list,
        } => list_runs(&client, config, experiment.as_deref(), archived, &list).await,
        RunCommands::Get { id } => get_run(&client, &id).await,
        RunCommands::Archive { ids } => apply_to_runs(&client, &ids, RunAction::Archive).await,
        RunCommands::Unarchive { ids } => {
            apply_to_runs(&client, &ids, RunAction::Unarchive).await
        }
        RunCommands::Delete { ids } => apply_to_runs(&client, &ids, RunAction::Delete).await,
    }
}

/// Filter selecting active or archived runs
fn storage_filter(archived: bool) -> Filter {
    let op = if archived {
        PredicateOp::Equals
    } else {
        PredicateOp::NotEquals
    };
    Filter::default().and(Predicate::string(
        "storage_state",
        op,
        StorageState::Archived.as_str(),
    ))
}

async fn list_runs(
    client: &ApiClient,
    config: &Config,
    experiment: Option<&str>,
    archived: bool,
    list: &ListArgs,
) -> Result<()> {
    let experiment_id = match experiment {
        Some(e) => Some(resolve_experiment_id(client, &IdOrPrefix::parse(e)).await?),
        None => None,
    };

    let view = list.configure(
        ListView::new(
            RunSource::new(client.clone(), experiment_id.as_deref()),
            config.page_size,
            banner_sink(),
        )
        .with_base_filter(storage_filter(archived))
        .with_error_message("Error: failed to fetch runs."),
    )?;
    let next_page_token = list.load(&view).await?;

    let runs = view.rows();
    if runs.is_empty() {
        println!("{}", "No runs found.".yellow());
    } else {
        println!("{}", format!("Found {} run(s):", runs.len()).bold());
        println!();
        for run in runs.iter() {
            print_run_summary(run);
        }
    }
    print_next_page_hint(&next_page_token);

    Ok(())
}

async fn get_run(client: &ApiClient, id: &str) -> Result<()> {
    let run_id = resolve_run_id(client, &IdOrPrefix::parse(id)).await?;
    let detail = client.get_run(&run_id).await.context("Failed to fetch run")?;

    print_run_details(&detail);

    Ok(())
}

async fn apply_to_runs(client: &ApiClient, ids: &[String], action: RunAction) -> Result<()> {
    let mut failures = 0;
    for id in ids {
        let result = async {
            let run_id = resolve_run_id(client, &IdOrPrefix::parse(id)).await?;
            match action {
                RunAction::Archive => client.archive_run(&run_id).await?,
                RunAction::Unarchive => client.unarchive_run(&run_id).await?,
                RunAction::Delete => client.delete_run(&run_id).await?,
            }
            Ok::<(), anyhow::Error>(())
        }
        .await;
        failures += report_outcome("Run", id, result, action.past_tense());
    }

    if failures > 0 {
        bail!(
            "{} of {} run(s) could not be {}",
            failures,
            ids.len(),
            action.past_tense()
        );
    }
    Ok(())
}

fn colorize_status(status: Option<&str>) -> ColoredString {
    match status {
        Some("Succeeded") => "Succeeded".green(),
        Some("Failed") | Some("Error") => status.unwrap_or_default().red(),
        Some("Running") | Some("Pending") => status.unwrap_or_default().yellow(),
        Some(other) => other.normal(),
        None => "-".dimmed(),
    }
}

fn print_run_summary(run: &Run) {
    println!("  {} {}", "▸".cyan(), run.name.bold());
    println!("    ID:      {}", run.id.dimmed());
    println!("    Status:  {}", colorize_status(run.status.as_deref()));
    println!("    Created: {}", format_time(run.created_at).dimmed());
    if run.storage_state == StorageState::Archived {
        println!("    {}", "archived".dimmed());
    }
    println!();
}

fn print_run_details(detail: &RunDetail) {
    let run = &detail.run;

    println!("{}", "Run Details:".bold());
    println!("  ID:          {}", run.id.cyan());
    println!("  Name:        {}", run.name.bold());
    if let Some(description) = &run.description {
        println!("  Description: {}", description);
    }
    println!("  Status:      {}", colorize_status(run.status.as_deref()));
    println!("  Storage:     {}", run.storage_state.as_str().dimmed());
    println!("  Created:     {}", format_time(run.created_at));
    println!("  Scheduled:   {}", format_time(run.scheduled_at));
    println!("  Finished:    {}", format_time(run.finished_at));

    if let (Some(created), Some(finished)) = (run.created_at, run.finished_at) {
        let seconds = finished.signed_duration_since(created).num_seconds();
        println!("  Duration:    {}s", seconds);
    }
    if let Some(experiment) = find_reference(&run.resource_references, ResourceType::Experiment) {
        println!("  Experiment:  {}", experiment.dimmed());
    }
    if let Some(error) = &run.error {
        println!("  Error:       {}", error.red());
    }

    if let Some(spec) = &run.pipeline_spec {
        if !spec.parameters.is_empty() {
            println!("\n{}", "Parameters:".bold());
            for param in &spec.parameters {
                println!(
                    "  {} = {}",
                    param.name.cyan(),
                    param.value.as_deref().unwrap_or("").dimmed()
                );
            }
        }
    }

    if detail
        .pipeline_runtime
        .as_ref()
        .is_some_and(|r| r.workflow_manifest.is_some())
    {
        println!("\n  {}", "Workflow manifest available".dimmed());
    }
    println!("\n  {}", routes::run_details(&run.id).dimmed());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_filter_selects_state() {
        let active = storage_filter(false);
        assert_eq!(active.predicates[0].op, PredicateOp::NotEquals);
        assert_eq!(
            active.predicates[0].string_value.as_deref(),
            Some("STORAGESTATE_ARCHIVED")
        );

        let archived = storage_filter(true);
        assert_eq!(archived.predicates[0].op, PredicateOp::Equals);
        assert_eq!(archived.predicates[0].key, "storage_state");
    }
}
