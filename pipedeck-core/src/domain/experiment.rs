//! Experiment domain types

use serde::{Deserialize, Serialize};

use super::pipeline::Timestamp;
use super::reference::ResourceReference;
use super::run::StorageState;

/// Named group of runs and jobs
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Experiment {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resource_references: Vec<ResourceReference>,
    pub storage_state: StorageState,
}

impl Experiment {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
            ..Default::default()
        }
    }
}
