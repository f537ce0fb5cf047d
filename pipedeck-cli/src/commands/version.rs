//! Pipeline version command handlers

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{ArgGroup, Subcommand};
use colored::*;
use pipedeck_client::ApiClient;
use pipedeck_core::domain::pipeline::PipelineVersion;
use pipedeck_core::routes;

use super::{format_time, report_outcome};
use crate::config::Config;
use crate::forms::{ImportMethod, NewVersionForm};
use crate::id_resolver::{resolve_pipeline_id, resolve_version_id};
use crate::types::IdOrPrefix;

/// Pipeline version subcommands
#[derive(Subcommand)]
pub enum VersionCommands {
    /// Create a pipeline version, optionally under a new pipeline
    #[command(group(ArgGroup::new("parent").required(true).args(["pipeline", "new_pipeline_name"])))]
    #[command(group(ArgGroup::new("package").required(true).args(["package_url", "file"])))]
    Create {
        /// Existing pipeline ID or unambiguous prefix
        #[arg(short, long)]
        pipeline: Option<String>,

        /// Create a new pipeline with this name
        #[arg(long)]
        new_pipeline_name: Option<String>,

        #[arg(long, requires = "new_pipeline_name")]
        new_pipeline_description: Option<String>,

        /// Version name (defaults to `<pipeline>_version_at_<time>`)
        #[arg(short, long)]
        name: Option<String>,

        /// Package URL the backend fetches
        #[arg(long)]
        package_url: Option<String>,

        /// Local .yaml, .zip or .tar.gz package
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Link to the version's source code
        #[arg(long)]
        code_source: Option<String>,
    },
    /// Get pipeline version details
    Get {
        /// Version ID, or a prefix when --pipeline is given
        id: String,

        /// Owning pipeline (ID or prefix); without it the version ID is used as given
        #[arg(short, long)]
        pipeline: Option<String>,
    },
    /// Delete one or more pipeline versions
    Delete {
        /// Version IDs, or prefixes when --pipeline is given
        #[arg(required = true)]
        ids: Vec<String>,

        /// Owning pipeline (ID or prefix); without it version IDs are used as given
        #[arg(short, long)]
        pipeline: Option<String>,
    },
    /// Print a version's workflow template
    Template {
        /// Version ID, or a prefix when --pipeline is given
        id: String,

        /// Owning pipeline (ID or prefix); without it the version ID is used as given
        #[arg(short, long)]
        pipeline: Option<String>,
    },
}

/// Handle pipeline version commands
pub async fn handle_version_command(command: VersionCommands, config: &Config) -> Result<()> {
    let client = config.client();

    match command {
        VersionCommands::Create {
            pipeline,
            new_pipeline_name,
            new_pipeline_description,
            name,
            package_url,
            file,
            code_source,
        } => {
            let mut form = match pipeline {
                Some(pipeline) => {
                    let pipeline_id =
                        resolve_pipeline_id(&client, &IdOrPrefix::parse(&pipeline)).await?;
                    NewVersionForm::from_query(&client, Some(&pipeline_id)).await?
                }
                None => {
                    let mut form = NewVersionForm::new();
                    form.set_pipeline_name(new_pipeline_name.unwrap_or_default());
                    form.set_pipeline_description(new_pipeline_description.unwrap_or_default());
                    form
                }
            };
            if let Some(name) = name {
                form.set_version_name(name);
            }
            if let Some(url) = code_source {
                form.set_code_source_url(url);
            }
            match (package_url, file) {
                (Some(url), _) => form.set_package_url(url),
                (None, Some(file)) => {
                    form.set_import_method(ImportMethod::Local);
                    form.set_file(Some(file));
                }
                (None, None) => {}
            }
            create_version(&client, form).await
        }
        VersionCommands::Get { id, pipeline } => {
            let owner = resolve_owner(&client, pipeline.as_deref()).await?;
            get_version(&client, owner.as_deref(), &id).await
        }
        VersionCommands::Delete { ids, pipeline } => {
            let owner = resolve_owner(&client, pipeline.as_deref()).await?;
            delete_versions(&client, owner.as_deref(), &ids).await
        }
        VersionCommands::Template { id, pipeline } => {
            let owner = resolve_owner(&client, pipeline.as_deref()).await?;
            get_template(&client, owner.as_deref(), &id).await
        }
    }
}

/// Submit the new-version form
async fn create_version(client: &ApiClient, mut form: NewVersionForm) -> Result<()> {
    // Validation failures print inline and never reach the backend
    if !form.can_submit() {
        bail!("{}", form.validation_error());
    }

    let created = form.submit(client).await?;

    println!("{}", format!("✓ {}", created.notification.message).green().bold());
    println!("  Pipeline: {}", created.pipeline_id.cyan());
    println!("  Version:  {}", created.version.id.cyan());
    println!("  Page:     {}", created.route.dimmed());

    Ok(())
}

async fn resolve_owner(client: &ApiClient, pipeline: Option<&str>) -> Result<Option<String>> {
    match pipeline {
        Some(pipeline) => Ok(Some(
            resolve_pipeline_id(client, &IdOrPrefix::parse(pipeline)).await?,
        )),
        None => Ok(None),
    }
}

/// Full version id; prefixes only resolve inside a known pipeline
async fn version_id(client: &ApiClient, owner: Option<&str>, id: &str) -> Result<String> {
    match owner {
        Some(pipeline_id) => resolve_version_id(client, pipeline_id, &IdOrPrefix::parse(id)).await,
        None => Ok(id.to_string()),
    }
}

async fn get_version(client: &ApiClient, owner: Option<&str>, id: &str) -> Result<()> {
    let version_id = version_id(client, owner, id).await?;
    let version = client
        .get_pipeline_version(&version_id)
        .await
        .context("Failed to fetch pipeline version")?;

    print_version_details(&version);

    Ok(())
}

async fn delete_versions(client: &ApiClient, owner: Option<&str>, ids: &[String]) -> Result<()> {
    let mut failures = 0;
    for id in ids {
        let result = async {
            let version_id = version_id(client, owner, id).await?;
            client.delete_pipeline_version(&version_id).await?;
            Ok::<(), anyhow::Error>(())
        }
        .await;
        failures += report_outcome("Version", id, result, "deleted");
    }

    if failures > 0 {
        bail!(
            "Failed to delete {} of {} pipeline version(s)",
            failures,
            ids.len()
        );
    }
    Ok(())
}

async fn get_template(client: &ApiClient, owner: Option<&str>, id: &str) -> Result<()> {
    let version_id = version_id(client, owner, id).await?;
    let template = client
        .get_pipeline_version_template(&version_id)
        .await
        .context("Failed to fetch pipeline version template")?;

    println!("{}", template);

    Ok(())
}

fn print_version_details(version: &PipelineVersion) {
    println!("{}", "Pipeline Version Details:".bold());
    println!("  ID:          {}", version.id.cyan());
    println!("  Name:        {}", version.name.bold());
    println!("  Created:     {}", format_time(version.created_at));
    if let Some(pipeline_id) = version.owning_pipeline_id() {
        println!("  Pipeline:    {}", pipeline_id.dimmed());
    }
    if let Some(url) = &version.package_url {
        println!("  Package:     {}", url.pipeline_url.dimmed());
    }
    if let Some(source) = &version.code_source_url {
        println!("  Source:      {}", source.dimmed());
    }

    if !version.parameters.is_empty() {
        println!("\n{}", "Parameters:".bold());
        for param in &version.parameters {
            println!(
                "  {} = {}",
                param.name.cyan(),
                param.value.as_deref().unwrap_or("").dimmed()
            );
        }
    }

    if let Some(pipeline_id) = version.owning_pipeline_id() {
        println!(
            "\n  {}",
            routes::pipeline_details(pipeline_id, Some(&version.id)).dimmed()
        );
    }
}
