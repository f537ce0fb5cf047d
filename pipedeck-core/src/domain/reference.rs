//! Resource reference types

use serde::{Deserialize, Serialize};

/// Kind of resource a reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    #[default]
    UnknownResourceType,
    Experiment,
    Job,
    Pipeline,
    PipelineVersion,
}

impl ResourceType {
    /// Wire name, as used in `resource_reference_key.type`
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::UnknownResourceType => "UNKNOWN_RESOURCE_TYPE",
            ResourceType::Experiment => "EXPERIMENT",
            ResourceType::Job => "JOB",
            ResourceType::Pipeline => "PIPELINE",
            ResourceType::PipelineVersion => "PIPELINE_VERSION",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the referencing resource relates to the referenced one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Relationship {
    #[default]
    UnknownRelationship,
    Owner,
    Creator,
}

/// Typed key identifying a single resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ResourceKey {
    #[serde(rename = "type", default)]
    pub resource_type: ResourceType,
    #[serde(default)]
    pub id: String,
}

impl ResourceKey {
    pub fn new(resource_type: ResourceType, id: impl Into<String>) -> Self {
        Self {
            resource_type,
            id: id.into(),
        }
    }

    pub fn pipeline(id: impl Into<String>) -> Self {
        Self::new(ResourceType::Pipeline, id)
    }

    pub fn experiment(id: impl Into<String>) -> Self {
        Self::new(ResourceType::Experiment, id)
    }
}

/// Weak, typed link from one resource to another
///
/// References are back-links only; the console never follows them as
/// ownership edges.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceReference {
    #[serde(default)]
    pub key: ResourceKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub relationship: Relationship,
}

impl ResourceReference {
    pub fn new(key: ResourceKey, relationship: Relationship) -> Self {
        Self {
            key,
            name: None,
            relationship,
        }
    }

    /// Reference marking `pipeline_id` as the owner of the referencing resource
    pub fn owned_by_pipeline(pipeline_id: impl Into<String>) -> Self {
        Self::new(ResourceKey::pipeline(pipeline_id), Relationship::Owner)
    }

    pub fn owned_by_experiment(experiment_id: impl Into<String>) -> Self {
        Self::new(ResourceKey::experiment(experiment_id), Relationship::Owner)
    }
}

/// Find the id of the first reference of the given type
pub fn find_reference(references: &[ResourceReference], resource_type: ResourceType) -> Option<&str> {
    references
        .iter()
        .find(|r| r.key.resource_type == resource_type)
        .map(|r| r.key.id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_wire_format() {
        let reference = ResourceReference::owned_by_pipeline("p-1");
        let json = serde_json::to_value(&reference).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "key": { "type": "PIPELINE", "id": "p-1" },
                "relationship": "OWNER"
            })
        );
    }

    #[test]
    fn test_reference_defaults_when_fields_missing() {
        let reference: ResourceReference = serde_json::from_str(r#"{"key":{"id":"x"}}"#).unwrap();
        assert_eq!(reference.key.resource_type, ResourceType::UnknownResourceType);
        assert_eq!(reference.relationship, Relationship::UnknownRelationship);
    }

    #[test]
    fn test_find_reference() {
        let refs = vec![
            ResourceReference::owned_by_experiment("e-1"),
            ResourceReference::owned_by_pipeline("p-1"),
        ];
        assert_eq!(find_reference(&refs, ResourceType::Pipeline), Some("p-1"));
        assert_eq!(find_reference(&refs, ResourceType::Job), None);
    }
}
