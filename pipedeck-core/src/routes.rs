//! Console routes
//!
//! Paths of the console pages, with `{pipelineId}` / `{pipelineVersionId}`
//! path parameters filled in and the `pipelineId` query parameter used by the
//! new-version flow. Ids are percent-encoded like URI components.

use urlencoding::encode;

pub const PIPELINES: &str = "/pipelines";
pub const PIPELINE_DETAILS: &str = "/pipelines/details/:pid/version/:vid";
pub const PIPELINE_DETAILS_NO_VERSION: &str = "/pipelines/details/:pid";
pub const NEW_PIPELINE_VERSION: &str = "/pipeline_versions/new";
pub const JOB_DETAILS: &str = "/recurringrun/details/:rrid";
pub const RUN_DETAILS: &str = "/runs/details/:rid";
pub const EXPERIMENT_DETAILS: &str = "/experiments/details/:eid";

/// Query parameter carrying the pipeline id into the new-version flow
pub const PIPELINE_ID_QUERY: &str = "pipelineId";

pub fn pipelines() -> String {
    PIPELINES.to_string()
}

/// Details page of a pipeline, optionally focused on one version
pub fn pipeline_details(pipeline_id: &str, version_id: Option<&str>) -> String {
    match version_id {
        Some(vid) => PIPELINE_DETAILS
            .replace(":pid", &encode(pipeline_id))
            .replace(":vid", &encode(vid)),
        None => PIPELINE_DETAILS_NO_VERSION.replace(":pid", &encode(pipeline_id)),
    }
}

pub fn new_pipeline_version(pipeline_id: Option<&str>) -> String {
    match pipeline_id {
        Some(id) => format!("{}?{}={}", NEW_PIPELINE_VERSION, PIPELINE_ID_QUERY, encode(id)),
        None => NEW_PIPELINE_VERSION.to_string(),
    }
}

pub fn job_details(job_id: &str) -> String {
    JOB_DETAILS.replace(":rrid", &encode(job_id))
}

pub fn run_details(run_id: &str) -> String {
    RUN_DETAILS.replace(":rid", &encode(run_id))
}

pub fn experiment_details(experiment_id: &str) -> String {
    EXPERIMENT_DETAILS.replace(":eid", &encode(experiment_id))
}
