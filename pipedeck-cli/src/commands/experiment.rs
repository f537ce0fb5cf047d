//! Experiment command handlers

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use colored::*;
use pipedeck_client::ApiClient;
use pipedeck_core::domain::experiment::Experiment;
use pipedeck_core::routes;

use super::{ListArgs, banner_sink, format_time, print_next_page_hint, report_outcome};
use crate::config::Config;
use crate::id_resolver::resolve_experiment_id;
use crate::table::{ExperimentSource, ListView};
use crate::types::IdOrPrefix;

/// Experiment subcommands
#[derive(Subcommand)]
pub enum ExperimentCommands {
    /// List experiments
    List {
        #[command(flatten)]
        list: ListArgs,
    },
    /// Get experiment details
    Get {
        /// Experiment ID or unambiguous prefix
        id: String,
    },
    /// Create an experiment
    Create {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        description: Option<String>,
    },
    /// Delete experiments
    Delete {
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

/// Handle experiment commands
pub async fn handle_experiment_command(command: ExperimentCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        ExperimentCommands::List { list } => list_experiments(&client, config, &list).await,
        ExperimentCommands::Get { id } => get_experiment(&client, &id).await,
        ExperimentCommands::Create { name, description } => {
            create_experiment(&client, name, description).await
        }
        ExperimentCommands::Delete { ids } => delete_experiments(&client, &ids).await,
    }
}

async fn list_experiments(client: &ApiClient, config: &Config, list: &ListArgs) -> Result<()> {
    let view = list.configure(
        ListView::new(
            ExperimentSource::new(client.clone()),
            config.page_size,
            banner_sink(),
        )
        .with_error_message("Error: failed to retrieve list of experiments."),
    )?;
    let next_page_token = list.load(&view).await?;

    let experiments = view.rows();
    if experiments.is_empty() {
        println!("{}", "No experiments found.".yellow());
    } else {
        println!(
            "{}",
            format!("Found {} experiment(s):", experiments.len()).bold()
        );
        println!();
        for experiment in experiments.iter() {
            println!("  {} {}", "▸".cyan(), experiment.name.bold());
            println!("    ID:      {}", experiment.id.dimmed());
            if let Some(description) = &experiment.description {
                println!("    Desc:    {}", description.dimmed());
            }
            println!("    Created: {}", format_time(experiment.created_at).dimmed());
            println!();
        }
    }
    print_next_page_hint(&next_page_token);

    Ok(())
}

async fn get_experiment(client: &ApiClient, id: &str) -> Result<()> {
    let experiment_id = resolve_experiment_id(client, &IdOrPrefix::parse(id)).await?;
    let experiment = client
        .get_experiment(&experiment_id)
        .await
        .context("Failed to fetch experiment")?;

    print_experiment_details(&experiment);

    Ok(())
}

async fn create_experiment(
    client: &ApiClient,
    name: String,
    description: Option<String>,
) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Experiment name is required");
    }

    let experiment = client
        .create_experiment(&Experiment::new(name, description))
        .await
        .context("Experiment creation failed")?;

    println!("{}", "✓ Experiment created successfully!".green().bold());
    println!("  ID:   {}", experiment.id.cyan());
    println!("  Name: {}", experiment.name.bold());
    println!("  Page: {}", routes::experiment_details(&experiment.id).dimmed());

    Ok(())
}

async fn delete_experiments(client: &ApiClient, ids: &[String]) -> Result<()> {
    let mut failures = 0;
    for id in ids {
        let result = async {
            let experiment_id = resolve_experiment_id(client, &IdOrPrefix::parse(id)).await?;
            client.delete_experiment(&experiment_id).await?;
            Ok::<(), anyhow::Error>(())
        }
        .await;
        failures += report_outcome("Experiment", id, result, "deleted");
    }

    if failures > 0 {
        bail!("Failed to delete {} of {} experiment(s)", failures, ids.len());
    }
    Ok(())
}

fn print_experiment_details(experiment: &Experiment) {
    println!("{}", "Experiment Details:".bold());
    println!("  ID:          {}", experiment.id.cyan());
    println!("  Name:        {}", experiment.name.bold());
    if let Some(description) = &experiment.description {
        println!("  Description: {}", description);
    }
    println!("  Created:     {}", format_time(experiment.created_at));
    println!("  Storage:     {}", experiment.storage_state.as_str().dimmed());
}
