//! Recurring job command handlers
//!
//! Handles listing, inspecting, scheduling, enabling/disabling and deleting
//! recurring jobs.

use anyhow::{Context, Result, bail};
use clap::{ArgGroup, Subcommand};
use colored::*;
use pipedeck_client::ApiClient;
use pipedeck_core::domain::job::{Job, JobMode, PipelineSpec, Trigger};
use pipedeck_core::domain::pipeline::Parameter;
use pipedeck_core::domain::reference::{ResourceReference, ResourceType, find_reference};
use pipedeck_core::routes;

use super::{ListArgs, banner_sink, format_time, parse_key_val, print_next_page_hint, report_outcome};
use crate::config::Config;
use crate::id_resolver::{resolve_experiment_id, resolve_job_id, resolve_pipeline_id};
use crate::table::{JobSource, ListView};
use crate::types::IdOrPrefix;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// List recurring jobs
    List {
        /// Only jobs of this experiment (ID or prefix)
        #[arg(short, long)]
        experiment: Option<String>,

        #[command(flatten)]
        list: ListArgs,
    },
    /// Get job details
    Get {
        /// Job ID or unambiguous prefix
        id: String,
    },
    /// Schedule a pipeline
    #[command(group(ArgGroup::new("trigger").required(true).args(["cron", "interval"])))]
    Create {
        #[arg(short, long)]
        name: String,

        /// Pipeline ID or unambiguous prefix
        #[arg(short, long)]
        pipeline: String,

        /// Cron expression with seconds, e.g. "0 0 * * * *"
        #[arg(long)]
        cron: Option<String>,

        /// Run every N seconds
        #[arg(long)]
        interval: Option<u64>,

        /// Experiment the job belongs to (ID or prefix)
        #[arg(short, long)]
        experiment: Option<String>,

        /// Maximum concurrent runs
        #[arg(long)]
        max_concurrency: Option<u32>,

        #[arg(short, long)]
        description: Option<String>,

        /// Parameters as key=value pairs
        #[arg(long, value_parser = parse_key_val)]
        param: Vec<(String, String)>,
    },
    /// Enable a job's trigger
    Enable {
        /// Job ID or unambiguous prefix
        id: String,
    },
    /// Disable a job's trigger
    Disable {
        /// Job ID or unambiguous prefix
        id: String,
    },
    /// Delete one or more jobs
    Delete {
        /// Job IDs or unambiguous prefixes
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

/// Handle job commands
///
/// # Arguments
/// * `command` - The job command to execute
/// * `config` - The CLI configuration
pub async fn handle_job_command(command: JobCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        JobCommands::List { experiment, list } => {
            list_jobs(&client, config, experiment.as_deref(), &list).await
        }
        JobCommands::Get { id } => get_job(&client, &id).await,
        JobCommands::Create {
            name,
            pipeline,
            cron,
            interval,
            experiment,
            max_concurrency,
            description,
            param,
        } => {
            let trigger = match (cron, interval) {
                (Some(expression), _) => Trigger::cron(expression),
                (None, Some(seconds)) => Trigger::every_seconds(seconds),
                (None, None) => bail!("A cron expression or an interval is required"),
            };
            let draft = JobDraft {
                name,
                description,
                trigger,
                max_concurrency,
                parameters: param,
            };
            create_job(&client, draft, &pipeline, experiment.as_deref()).await
        }
        JobCommands::Enable { id } => set_enabled(&client, &id, true).await,
        JobCommands::Disable { id } => set_enabled(&client, &id, false).await,
        JobCommands::Delete { ids } => delete_jobs(&client, &ids).await,
    }
}

/// List one page of jobs
async fn list_jobs(
    client: &ApiClient,
    config: &Config,
    experiment: Option<&str>,
    list: &ListArgs,
) -> Result<()> {
    let experiment_id = match experiment {
        Some(e) => Some(resolve_experiment_id(client, &IdOrPrefix::parse(e)).await?),
        None => None,
    };

    let view = list.configure(
        ListView::new(
            JobSource::new(client.clone(), experiment_id.as_deref()),
            config.page_size,
            banner_sink(),
        )
        .with_error_message("Error: failed to retrieve list of recurring runs."),
    )?;
    let next_page_token = list.load(&view).await?;

    let jobs = view.rows();
    if jobs.is_empty() {
        println!("{}", "No jobs found.".yellow());
    } else {
        println!("{}", format!("Found {} job(s):", jobs.len()).bold());
        println!();
        for job in jobs.iter() {
            print_job_summary(job);
        }
    }
    print_next_page_hint(&next_page_token);

    Ok(())
}

/// Get and display a single job
async fn get_job(client: &ApiClient, id: &str) -> Result<()> {
    let job_id = resolve_job_id(client, &IdOrPrefix::parse(id)).await?;
    let job = client.get_job(&job_id).await.context("Failed to fetch job")?;

    print_job_details(&job);

    Ok(())
}

/// Command-line input for a new job
struct JobDraft {
    name: String,
    description: Option<String>,
    trigger: Trigger,
    max_concurrency: Option<u32>,
    parameters: Vec<(String, String)>,
}

impl JobDraft {
    fn into_job(self, pipeline_id: &str, experiment_id: Option<&str>) -> Job {
        let parameters = self
            .parameters
            .into_iter()
            .map(|(name, value)| Parameter::new(name, value))
            .collect();

        Job {
            name: self.name,
            description: self.description,
            pipeline_spec: Some(PipelineSpec::by_pipeline_id(pipeline_id, parameters)),
            resource_references: experiment_id
                .map(ResourceReference::owned_by_experiment)
                .into_iter()
                .collect(),
            max_concurrency: self.max_concurrency.map(|n| n.to_string()),
            trigger: Some(self.trigger),
            enabled: true,
            ..Default::default()
        }
    }
}

async fn create_job(
    client: &ApiClient,
    draft: JobDraft,
    pipeline: &str,
    experiment: Option<&str>,
) -> Result<()> {
    let pipeline_id = resolve_pipeline_id(client, &IdOrPrefix::parse(pipeline)).await?;
    let experiment_id = match experiment {
        Some(e) => Some(resolve_experiment_id(client, &IdOrPrefix::parse(e)).await?),
        None => None,
    };

    let job = draft.into_job(&pipeline_id, experiment_id.as_deref());
    let job = client
        .create_job(&job)
        .await
        .context("Failed to create recurring run")?;

    println!("{}", "✓ Job scheduled successfully!".green().bold());
    println!("  ID:      {}", job.id.cyan());
    println!("  Name:    {}", job.name.bold());
    if let Some(trigger) = &job.trigger {
        println!("  Trigger: {}", trigger.describe().dimmed());
    }
    println!("  Page:    {}", routes::job_details(&job.id).dimmed());

    Ok(())
}

async fn set_enabled(client: &ApiClient, id: &str, enabled: bool) -> Result<()> {
    let job_id = resolve_job_id(client, &IdOrPrefix::parse(id)).await?;

    if enabled {
        client.enable_job(&job_id).await.context("Failed to enable job")?;
        println!("{} Job {} enabled", "✓".green(), job_id.cyan());
    } else {
        client.disable_job(&job_id).await.context("Failed to disable job")?;
        println!("{} Job {} disabled", "✓".green(), job_id.cyan());
    }

    Ok(())
}

async fn delete_jobs(client: &ApiClient, ids: &[String]) -> Result<()> {
    let mut failures = 0;
    for id in ids {
        let result = async {
            let job_id = resolve_job_id(client, &IdOrPrefix::parse(id)).await?;
            client.delete_job(&job_id).await?;
            Ok::<(), anyhow::Error>(())
        }
        .await;
        failures += report_outcome("Job", id, result, "deleted");
    }

    if failures > 0 {
        bail!("Failed to delete {} of {} job(s)", failures, ids.len());
    }
    Ok(())
}

fn colorize_mode(job: &Job) -> ColoredString {
    match job.mode {
        JobMode::Enabled => "ENABLED".green(),
        JobMode::Disabled => "DISABLED".yellow(),
        JobMode::UnknownMode if job.enabled => "ENABLED".green(),
        JobMode::UnknownMode => "UNKNOWN".dimmed(),
    }
}

/// Print a job summary
fn print_job_summary(job: &Job) {
    println!("  {} {}", "▸".cyan(), job.name.bold());
    println!("    ID:      {}", job.id.dimmed());
    println!("    Mode:    {}", colorize_mode(job));
    if let Some(trigger) = &job.trigger {
        println!("    Trigger: {}", trigger.describe().dimmed());
    }
    println!("    Created: {}", format_time(job.created_at).dimmed());
    println!();
}

/// Print detailed job information
fn print_job_details(job: &Job) {
    println!("{}", "Job Details:".bold());
    println!("  ID:          {}", job.id.cyan());
    println!("  Name:        {}", job.name.bold());
    if let Some(description) = &job.description {
        println!("  Description: {}", description);
    }
    println!("  Mode:        {}", colorize_mode(job));
    if let Some(trigger) = &job.trigger {
        println!("  Trigger:     {}", trigger.describe());
    }
    if let Some(max) = &job.max_concurrency {
        println!("  Concurrency: {}", max);
    }
    if let Some(experiment) = find_reference(&job.resource_references, ResourceType::Experiment) {
        println!("  Experiment:  {}", experiment.dimmed());
    }
    println!("  Created:     {}", format_time(job.created_at));
    println!("  Updated:     {}", format_time(job.updated_at));
    if let Some(status) = &job.status {
        println!("  Status:      {}", status);
    }
    if let Some(error) = &job.error {
        println!("  Error:       {}", error.red());
    }

    if let Some(spec) = &job.pipeline_spec {
        if let Some(pipeline_id) = &spec.pipeline_id {
            println!("  Pipeline:    {}", pipeline_id.dimmed());
        }
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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_builds_job_with_references() {
        let draft = JobDraft {
            name: "nightly".to_string(),
            description: None,
            trigger: Trigger::every_seconds(86400),
            max_concurrency: Some(2),
            parameters: vec![("lr".to_string(), "0.1".to_string())],
        };

        let job = draft.into_job("p-1", Some("e-1"));

        assert_eq!(job.max_concurrency.as_deref(), Some("2"));
        assert_eq!(
            find_reference(&job.resource_references, ResourceType::Experiment),
            Some("e-1")
        );
        let spec = job.pipeline_spec.unwrap();
        assert_eq!(spec.pipeline_id.as_deref(), Some("p-1"));
        assert_eq!(spec.parameters, vec![Parameter::new("lr", "0.1")]);
        assert!(job.enabled);
    }

    #[test]
    fn test_draft_without_experiment_has_no_references() {
        let draft = JobDraft {
            name: "hourly".to_string(),
            description: None,
            trigger: Trigger::cron("0 0 * * * *"),
            max_concurrency: None,
            parameters: Vec::new(),
        };
        let job = draft.into_job("p-1", None);
        assert!(job.resource_references.is_empty());
        assert_eq!(job.max_concurrency, None);
    }
}
