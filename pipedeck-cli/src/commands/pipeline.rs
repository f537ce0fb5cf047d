//! Pipeline command handlers
//!
//! Handles pipeline listing (optionally with nested versions), details,
//! templates, deletion and package uploads.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{ArgGroup, Subcommand};
use colored::*;
use pipedeck_client::ApiClient;
use pipedeck_core::domain::pipeline::{Pipeline, PipelineVersion};
use pipedeck_core::routes;

use super::{ListArgs, banner_sink, ensure_loaded, format_time, print_next_page_hint, report_outcome};
use crate::config::Config;
use crate::forms::upload::{self, UploadDialog};
use crate::id_resolver::resolve_pipeline_id;
use crate::table::{ListView, PipelineBrowser, PipelineSource, PipelineVersionSource};
use crate::types::IdOrPrefix;

pub const PIPELINE_LIST_ERROR: &str = "Error: failed to retrieve list of pipelines.";
pub const VERSION_LIST_ERROR: &str = "Error: failed to retrieve list of pipeline versions.";

/// Pipeline subcommands
#[derive(Subcommand)]
pub enum PipelineCommands {
    /// List pipelines
    List {
        #[command(flatten)]
        list: ListArgs,

        /// Show each pipeline's versions underneath it
        #[arg(long)]
        expand: bool,
    },
    /// Get pipeline details
    Get {
        /// Pipeline ID or unambiguous prefix
        id: String,
    },
    /// Print a pipeline's workflow template
    Template {
        /// Pipeline ID or unambiguous prefix
        id: String,
    },
    /// Delete one or more pipelines
    Delete {
        /// Pipeline IDs or unambiguous prefixes
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Upload a pipeline package
    #[command(group(ArgGroup::new("package").required(true).args(["file", "url"])))]
    Upload {
        /// Pipeline name (defaults to the file's base name)
        #[arg(short, long)]
        name: Option<String>,

        /// Local .yaml, .zip or .tar.gz package
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Package URL the backend fetches
        #[arg(short, long)]
        url: Option<String>,

        #[arg(short, long)]
        description: Option<String>,
    },
    /// List the versions of a pipeline
    Versions {
        /// Pipeline ID or unambiguous prefix
        pipeline: String,

        #[command(flatten)]
        list: ListArgs,
    },
}

/// Handle pipeline commands
///
/// # Arguments
/// * `command` - The pipeline command to execute
/// * `config` - The CLI configuration
pub async fn handle_pipeline_command(command: PipelineCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        PipelineCommands::List { list, expand } => {
            list_pipelines(&client, config, &list, expand).await
        }
        PipelineCommands::Get { id } => get_pipeline(&client, &id).await,
        PipelineCommands::Template { id } => get_template(&client, &id).await,
        PipelineCommands::Delete { ids } => delete_pipelines(&client, &ids).await,
        PipelineCommands::Upload {
            name,
            file,
            url,
            description,
        } => upload_pipeline(&client, config, name, file, url, description).await,
        PipelineCommands::Versions { pipeline, list } => {
            list_versions(&client, config, &pipeline, &list).await
        }
    }
}

fn pipeline_view(client: &ApiClient, config: &Config) -> ListView<PipelineSource> {
    ListView::new(PipelineSource::new(client.clone()), config.page_size, banner_sink())
        .with_error_message(PIPELINE_LIST_ERROR)
}

fn version_view(
    client: &ApiClient,
    page_size: u32,
    pipeline_id: &str,
) -> ListView<PipelineVersionSource> {
    ListView::new(
        PipelineVersionSource::new(client.clone(), pipeline_id),
        page_size,
        banner_sink(),
    )
    .with_error_message(VERSION_LIST_ERROR)
}

/// List one page of pipelines
async fn list_pipelines(
    client: &ApiClient,
    config: &Config,
    list: &ListArgs,
    expand: bool,
) -> Result<()> {
    let view = list.configure(pipeline_view(client, config))?;
    let next_page_token = list.load(&view).await?;

    if !expand {
        print_pipelines(&view.rows());
        print_next_page_hint(&next_page_token);
        return Ok(());
    }

    let version_client = client.clone();
    let page_size = config.page_size;
    let mut browser = PipelineBrowser::new(view, move |pipeline_id| {
        version_view(&version_client, page_size, pipeline_id)
    });

    let pipelines = browser.pipelines().rows();
    if pipelines.is_empty() {
        println!("{}", "No pipelines found.".yellow());
    }
    for pipeline in pipelines.iter() {
        print_pipeline_summary(pipeline);
        browser.toggle_expansion(&pipeline.id).await;
        if let Some(versions) = browser.versions(&pipeline.id) {
            match ensure_loaded(versions) {
                Ok(()) => {
                    for version in versions.rows().iter() {
                        print_version_line(version);
                    }
                }
                Err(err) => eprintln!("      {} {:#}", "✗".red(), err),
            }
        }
        println!();
    }
    print_next_page_hint(&next_page_token);

    Ok(())
}

fn print_pipelines(pipelines: &[Pipeline]) {
    if pipelines.is_empty() {
        println!("{}", "No pipelines found.".yellow());
        return;
    }

    println!("{}", format!("Found {} pipeline(s):", pipelines.len()).bold());
    println!();
    for pipeline in pipelines {
        print_pipeline_summary(pipeline);
        println!();
    }
}

/// Get and display a single pipeline
async fn get_pipeline(client: &ApiClient, id: &str) -> Result<()> {
    let pipeline_id = resolve_pipeline_id(client, &IdOrPrefix::parse(id)).await?;
    let pipeline = client
        .get_pipeline(&pipeline_id)
        .await
        .context("Failed to fetch pipeline")?;

    print_pipeline_details(&pipeline);

    Ok(())
}

async fn get_template(client: &ApiClient, id: &str) -> Result<()> {
    let pipeline_id = resolve_pipeline_id(client, &IdOrPrefix::parse(id)).await?;
    let template = client
        .get_template(&pipeline_id)
        .await
        .context("Failed to fetch pipeline template")?;

    println!("{}", template);

    Ok(())
}

/// Delete pipelines one by one, continuing past failures
async fn delete_pipelines(client: &ApiClient, ids: &[String]) -> Result<()> {
    let mut failures = 0;
    for id in ids {
        let result = async {
            let pipeline_id = resolve_pipeline_id(client, &IdOrPrefix::parse(id)).await?;
            client.delete_pipeline(&pipeline_id).await?;
            Ok::<(), anyhow::Error>(())
        }
        .await;
        failures += report_outcome("Pipeline", id, result, "deleted");
    }

    if failures > 0 {
        bail!("Failed to delete {} of {} pipeline(s)", failures, ids.len());
    }
    Ok(())
}

/// Upload a package through the upload dialog, then refresh the list
async fn upload_pipeline(
    client: &ApiClient,
    config: &Config,
    name: Option<String>,
    file: Option<PathBuf>,
    url: Option<String>,
    description: Option<String>,
) -> Result<()> {
    let mut dialog = UploadDialog::new();
    dialog.open();
    if let Some(name) = name {
        dialog.set_name(name);
    }
    if let Some(description) = description {
        dialog.set_description(description);
    }
    match (file, url) {
        (Some(file), _) => dialog.set_file(file),
        (None, Some(url)) => dialog.set_url(url),
        (None, None) => {}
    }

    if dialog.name().is_empty() {
        bail!("Pipeline name is required");
    }
    let Some(request) = dialog.close(true) else {
        bail!("Please specify a pipeline package in .yaml, .zip, or .tar.gz");
    };

    let pipeline = upload::upload(client, &request)
        .await
        .context("Failed to upload pipeline")?;

    println!("{}", "✓ Pipeline uploaded successfully!".green().bold());
    println!("  ID:   {}", pipeline.id.cyan());
    println!("  Name: {}", pipeline.name.bold());
    println!("  Page: {}", routes::pipeline_details(&pipeline.id, None).dimmed());
    println!();

    let view = pipeline_view(client, config);
    ListArgs::default().load(&view).await?;
    print_pipelines(&view.rows());

    Ok(())
}

/// List one page of a pipeline's versions
async fn list_versions(
    client: &ApiClient,
    config: &Config,
    pipeline: &str,
    list: &ListArgs,
) -> Result<()> {
    let pipeline_id = resolve_pipeline_id(client, &IdOrPrefix::parse(pipeline)).await?;
    let view = list.configure(version_view(client, config.page_size, &pipeline_id))?;
    let next_page_token = list.load(&view).await?;

    let versions = view.rows();
    if versions.is_empty() {
        println!(
            "{}",
            format!("No versions found for pipeline {}.", pipeline_id).yellow()
        );
    } else {
        println!(
            "{}",
            format!(
                "Found {} version(s) for pipeline {}:",
                versions.len(),
                pipeline_id
            )
            .bold()
        );
        println!();
        for version in versions.iter() {
            print_version_line(version);
        }
    }
    print_next_page_hint(&next_page_token);

    Ok(())
}

fn print_pipeline_summary(pipeline: &Pipeline) {
    println!("  {} {}", "▸".cyan(), pipeline.name.bold());
    println!("    ID:      {}", pipeline.id.dimmed());
    if let Some(description) = &pipeline.description {
        println!("    Desc:    {}", description.dimmed());
    }
    println!("    Created: {}", format_time(pipeline.created_at).dimmed());
}

fn print_version_line(version: &PipelineVersion) {
    println!(
        "      {} {}  {}  {}",
        "◦".cyan(),
        version.name,
        version.id.dimmed(),
        format_time(version.created_at).dimmed()
    );
}

/// Print detailed pipeline information
fn print_pipeline_details(pipeline: &Pipeline) {
    println!("{}", "Pipeline Details:".bold());
    println!("  ID:          {}", pipeline.id.cyan());
    println!("  Name:        {}", pipeline.name.bold());
    if let Some(description) = &pipeline.description {
        println!("  Description: {}", description);
    }
    println!("  Created:     {}", format_time(pipeline.created_at));
    if let Some(url) = &pipeline.url {
        println!("  Package:     {}", url.pipeline_url.dimmed());
    }
    if let Some(version) = &pipeline.default_version {
        println!("  Default:     {} ({})", version.name, version.id.dimmed());
    }
    if let Some(error) = &pipeline.error {
        println!("  Error:       {}", error.red());
    }

    if !pipeline.parameters.is_empty() {
        println!("\n{}", "Parameters:".bold());
        for param in &pipeline.parameters {
            println!(
                "  {} = {}",
                param.name.cyan(),
                param.value.as_deref().unwrap_or("").dimmed()
            );
        }
    }

    println!(
        "\n  {}",
        format!(
            "New version: {}",
            routes::new_pipeline_version(Some(&pipeline.id))
        )
        .dimmed()
    );
    println!(
        "  {}",
        routes::pipeline_details(
            &pipeline.id,
            pipeline.default_version.as_ref().map(|v| v.id.as_str())
        )
        .dimmed()
    );
}
