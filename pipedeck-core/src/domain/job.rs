//! Job domain types

use serde::{Deserialize, Serialize};

use super::pipeline::{Parameter, Timestamp};
use super::reference::ResourceReference;

/// Scheduled execution definition
///
/// A job runs a pipeline spec on a trigger. Which experiment it belongs to
/// is expressed through `resource_references`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Job {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline_spec: Option<PipelineSpec>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resource_references: Vec<ResourceReference>,
    /// int64 on the wire, which JSON carries as a string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<Trigger>,
    pub mode: JobMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub enabled: bool,
}

/// Whether a job's trigger is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobMode {
    #[default]
    UnknownMode,
    Enabled,
    Disabled,
}

/// What the job runs: a pipeline by id, or an inline manifest
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_manifest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline_manifest: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
}

impl PipelineSpec {
    pub fn by_pipeline_id(pipeline_id: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        Self {
            pipeline_id: Some(pipeline_id.into()),
            parameters,
            ..Default::default()
        }
    }

    pub fn inline_manifest(manifest: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        Self {
            workflow_manifest: Some(manifest.into()),
            parameters,
            ..Default::default()
        }
    }
}

/// Job trigger
///
/// Exactly one schedule kind is present. On the wire this is an object with
/// either a `cron_schedule` or a `periodic_schedule` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    CronSchedule(CronSchedule),
    PeriodicSchedule(PeriodicSchedule),
}

impl Trigger {
    pub fn cron(expression: impl Into<String>) -> Self {
        Trigger::CronSchedule(CronSchedule {
            cron: expression.into(),
            start_time: None,
            end_time: None,
        })
    }

    pub fn every_seconds(interval: u64) -> Self {
        Trigger::PeriodicSchedule(PeriodicSchedule {
            interval_second: interval.to_string(),
            start_time: None,
            end_time: None,
        })
    }

    /// Short human-readable description
    pub fn describe(&self) -> String {
        match self {
            Trigger::CronSchedule(c) => format!("cron '{}'", c.cron),
            Trigger::PeriodicSchedule(p) => format!("every {}s", p.interval_second),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CronSchedule {
    pub cron: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodicSchedule {
    pub interval_second: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<Timestamp>,
}
