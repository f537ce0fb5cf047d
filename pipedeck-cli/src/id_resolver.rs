//! ID resolver module
//!
//! Resolves short id prefixes to full resource ids by paging through the
//! matching list endpoint. This lets users type `3f25` instead of a full UUID.

use anyhow::{Result, anyhow, bail};
use pipedeck_client::ApiClient;

use crate::table::{
    ExperimentSource, JobSource, ListSource, ListView, PipelineSource, PipelineVersionSource,
    RunSource, TableRow, ViewState, log_errors,
};
use crate::types::IdOrPrefix;

/// Rows fetched per page while resolving
const RESOLVE_PAGE_SIZE: u32 = 100;

/// Find the single row whose id starts with `id_or_prefix`
///
/// Pages through the whole listing, one reload per page. An exact id match
/// wins over longer ids sharing it as a prefix.
///
/// # Errors
/// Returns an error if:
/// - No row matches the prefix
/// - Multiple rows match the prefix (ambiguous)
/// - A page fails to load
pub async fn resolve_id<S: ListSource>(
    source: S,
    kind: &str,
    id_or_prefix: &IdOrPrefix,
) -> Result<String> {
    if let Some(id) = id_or_prefix.as_full() {
        return Ok(id.to_string());
    }

    let prefix = id_or_prefix.as_str();
    let view = ListView::new(source, RESOLVE_PAGE_SIZE, log_errors());
    let mut matches = Vec::new();

    view.reload().await;
    loop {
        if let ViewState::Errored(message) = view.state() {
            bail!("Failed to fetch {}s for ID resolution: {}", kind, message);
        }
        matches.extend(
            view.rows()
                .iter()
                .map(|row| row.id().to_string())
                .filter(|id| id.to_lowercase().starts_with(prefix)),
        );
        if view.next_page().await.is_none() {
            break;
        }
    }

    pick_match(kind, prefix, matches)
}

fn pick_match(kind: &str, prefix: &str, mut matches: Vec<String>) -> Result<String> {
    if let Some(exact) = matches.iter().find(|id| id.to_lowercase() == prefix) {
        return Ok(exact.clone());
    }

    match matches.len() {
        0 => Err(anyhow!(
            "No {} found with ID starting with '{}'",
            kind,
            prefix
        )),
        1 => Ok(matches.remove(0)),
        _ => Err(anyhow!(
            "Ambiguous prefix '{}' matches multiple {}s: {}",
            prefix,
            kind,
            matches.join(", ")
        )),
    }
}

pub async fn resolve_pipeline_id(client: &ApiClient, id_or_prefix: &IdOrPrefix) -> Result<String> {
    resolve_id(PipelineSource::new(client.clone()), "pipeline", id_or_prefix).await
}

/// Versions are only listed per pipeline, so a prefix resolves within one
pub async fn resolve_version_id(
    client: &ApiClient,
    pipeline_id: &str,
    id_or_prefix: &IdOrPrefix,
) -> Result<String> {
    resolve_id(
        PipelineVersionSource::new(client.clone(), pipeline_id),
        "pipeline version",
        id_or_prefix,
    )
    .await
}

pub async fn resolve_job_id(client: &ApiClient, id_or_prefix: &IdOrPrefix) -> Result<String> {
    resolve_id(JobSource::new(client.clone(), None), "job", id_or_prefix).await
}

pub async fn resolve_run_id(client: &ApiClient, id_or_prefix: &IdOrPrefix) -> Result<String> {
    resolve_id(RunSource::new(client.clone(), None), "run", id_or_prefix).await
}

pub async fn resolve_experiment_id(
    client: &ApiClient,
    id_or_prefix: &IdOrPrefix,
) -> Result<String> {
    resolve_id(ExperimentSource::new(client.clone()), "experiment", id_or_prefix).await
}
