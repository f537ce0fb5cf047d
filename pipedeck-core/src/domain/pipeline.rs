//! Pipeline domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::reference::{ResourceReference, ResourceType, find_reference};

/// Timestamp type used by every resource
pub type Timestamp = DateTime<Utc>;

/// Pipeline definition
///
/// A named workflow template. Identity is `id`; names are not unique.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Pipeline {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_version: Option<PipelineVersion>,
}

impl Pipeline {
    /// Draft pipeline imported from a remote package URL
    pub fn from_url(
        name: impl Into<String>,
        description: Option<String>,
        package_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            url: Some(Url::new(package_url)),
            ..Default::default()
        }
    }
}

/// Immutable snapshot of a pipeline package, owned by exactly one pipeline
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineVersion {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package_url: Option<Url>,
    pub resource_references: Vec<ResourceReference>,
}

impl PipelineVersion {
    /// Draft version owned by `pipeline_id`
    ///
    /// The draft carries exactly one `PIPELINE` reference with an `OWNER`
    /// relationship, which is what the backend requires on creation.
    pub fn for_pipeline(
        pipeline_id: impl Into<String>,
        name: impl Into<String>,
        package_url: impl Into<String>,
        code_source_url: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            code_source_url,
            package_url: Some(Url::new(package_url)),
            resource_references: vec![ResourceReference::owned_by_pipeline(pipeline_id)],
            ..Default::default()
        }
    }

    /// Id of the pipeline this version belongs to
    pub fn owning_pipeline_id(&self) -> Option<&str> {
        find_reference(&self.resource_references, ResourceType::Pipeline)
    }
}

/// Check a version draft before it is submitted for creation
pub fn validate_new_version(version: &PipelineVersion) -> Result<(), String> {
    let owners = version
        .resource_references
        .iter()
        .filter(|r| r.key.resource_type == ResourceType::Pipeline)
        .count();

    match owners {
        1 => Ok(()),
        0 => Err("Pipeline version must reference its owning pipeline".to_string()),
        n => Err(format!(
            "Pipeline version must reference exactly one pipeline, found {}",
            n
        )),
    }
}

/// Named pipeline parameter
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameter {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

/// Package location
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Url {
    pub pipeline_url: String,
}

impl Url {
    pub fn new(pipeline_url: impl Into<String>) -> Self {
        Self {
            pipeline_url: pipeline_url.into(),
        }
    }
}

/// Response of the template endpoints
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    pub template: String,
}
