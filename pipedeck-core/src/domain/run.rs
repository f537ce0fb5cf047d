//! Run domain types

use serde::{Deserialize, Serialize};

use super::job::PipelineSpec;
use super::pipeline::Timestamp;
use super::reference::ResourceReference;

/// Single execution of a pipeline
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Run {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline_spec: Option<PipelineSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resource_references: Vec<ResourceReference>,
    pub storage_state: StorageState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run together with its runtime status
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunDetail {
    pub run: Run,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline_runtime: Option<PipelineRuntime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineRuntime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline_manifest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_manifest: Option<String>,
}

/// Archive state shared by runs and experiments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StorageState {
    #[default]
    #[serde(rename = "STORAGESTATE_AVAILABLE")]
    Available,
    #[serde(rename = "STORAGESTATE_ARCHIVED")]
    Archived,
}

impl StorageState {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageState::Available => "STORAGESTATE_AVAILABLE",
            StorageState::Archived => "STORAGESTATE_ARCHIVED",
        }
    }
}
