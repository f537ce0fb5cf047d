//! Data Transfer Objects
//!
//! Response envelopes returned by the list endpoints and the error body the
//! backend sends with non-2xx responses.

use serde::{Deserialize, Serialize};

use crate::domain::experiment::Experiment;
use crate::domain::job::Job;
use crate::domain::pipeline::{Pipeline, PipelineVersion};
use crate::domain::run::Run;

/// One page of pipelines
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListPipelinesResponse {
    pub pipelines: Vec<Pipeline>,
    pub total_size: i32,
    pub next_page_token: String,
}

/// One page of pipeline versions
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListPipelineVersionsResponse {
    pub versions: Vec<PipelineVersion>,
    pub total_size: i32,
    pub next_page_token: String,
}

/// One page of jobs
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListJobsResponse {
    pub jobs: Vec<Job>,
    pub total_size: i32,
    pub next_page_token: String,
}

/// One page of runs
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListRunsResponse {
    pub runs: Vec<Run>,
    pub total_size: i32,
    pub next_page_token: String,
}

/// One page of experiments
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListExperimentsResponse {
    pub experiments: Vec<Experiment>,
    pub total_size: i32,
    pub next_page_token: String,
}

/// Error body sent by the backend with failed requests
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiStatus {
    pub error: String,
    pub code: i32,
    pub details: Vec<serde_json::Value>,
}
