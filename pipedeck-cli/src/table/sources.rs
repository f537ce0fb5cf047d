//! `ListSource` implementations backed by the REST client

use anyhow::Result;
use async_trait::async_trait;
use pipedeck_client::ApiClient;
use pipedeck_core::domain::experiment::Experiment;
use pipedeck_core::domain::job::Job;
use pipedeck_core::domain::pipeline::{Pipeline, PipelineVersion, Timestamp};
use pipedeck_core::domain::reference::ResourceKey;
use pipedeck_core::domain::run::Run;
use pipedeck_core::list::ListRequest;

use super::{ListPage, ListSource, TableRow, sort_newest_first};

macro_rules! table_row {
    ($ty:ty) => {
        impl TableRow for $ty {
            fn id(&self) -> &str {
                &self.id
            }

            fn created_at(&self) -> Option<Timestamp> {
                self.created_at
            }
        }
    };
}

table_row!(Pipeline);
table_row!(PipelineVersion);
table_row!(Job);
table_row!(Run);
table_row!(Experiment);

pub struct PipelineSource {
    client: ApiClient,
}

impl PipelineSource {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ListSource for PipelineSource {
    type Row = Pipeline;

    async fn list(&self, request: &ListRequest) -> Result<ListPage<Pipeline>> {
        let response = self.client.list_pipelines(request).await?;
        Ok(ListPage::new(response.pipelines, response.next_page_token))
    }
}

/// Versions of one pipeline
pub struct PipelineVersionSource {
    client: ApiClient,
    key: ResourceKey,
}

impl PipelineVersionSource {
    pub fn new(client: ApiClient, pipeline_id: &str) -> Self {
        Self {
            client,
            key: ResourceKey::pipeline(pipeline_id),
        }
    }
}

#[async_trait]
impl ListSource for PipelineVersionSource {
    type Row = PipelineVersion;

    async fn list(&self, request: &ListRequest) -> Result<ListPage<PipelineVersion>> {
        let response = self.client.list_pipeline_versions(&self.key, request).await?;
        Ok(ListPage::new(
            order_versions(request, response.versions),
            response.next_page_token,
        ))
    }
}

/// Versions come back newest first unless the caller asked for an order
fn order_versions(request: &ListRequest, versions: Vec<PipelineVersion>) -> Vec<PipelineVersion> {
    if request.sort_by.is_empty() {
        sort_newest_first(&versions)
    } else {
        versions
    }
}

/// Jobs, optionally scoped to an experiment
pub struct JobSource {
    client: ApiClient,
    key: Option<ResourceKey>,
}

impl JobSource {
    pub fn new(client: ApiClient, experiment_id: Option<&str>) -> Self {
        Self {
            client,
            key: experiment_id.map(ResourceKey::experiment),
        }
    }
}

#[async_trait]
impl ListSource for JobSource {
    type Row = Job;

    async fn list(&self, request: &ListRequest) -> Result<ListPage<Job>> {
        let response = self.client.list_jobs(self.key.as_ref(), request).await?;
        Ok(ListPage::new(response.jobs, response.next_page_token))
    }
}

/// Runs, optionally scoped to an experiment
pub struct RunSource {
    client: ApiClient,
    key: Option<ResourceKey>,
}

impl RunSource {
    pub fn new(client: ApiClient, experiment_id: Option<&str>) -> Self {
        Self {
            client,
            key: experiment_id.map(ResourceKey::experiment),
        }
    }
}

#[async_trait]
impl ListSource for RunSource {
    type Row = Run;

    async fn list(&self, request: &ListRequest) -> Result<ListPage<Run>> {
        let response = self.client.list_runs(self.key.as_ref(), request).await?;
        Ok(ListPage::new(response.runs, response.next_page_token))
    }
}

pub struct ExperimentSource {
    client: ApiClient,
}

impl ExperimentSource {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ListSource for ExperimentSource {
    type Row = Experiment;

    async fn list(&self, request: &ListRequest) -> Result<ListPage<Experiment>> {
        let response = self.client.list_experiments(request).await?;
        Ok(ListPage::new(response.experiments, response.next_page_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn dated(id: &str, month: Option<u32>) -> PipelineVersion {
        PipelineVersion {
            id: id.to_string(),
            created_at: month.map(|m| Utc.with_ymd_and_hms(2020, m, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn test_unsorted_request_orders_versions_newest_first() {
        let versions = vec![dated("1", Some(1)), dated("2", None), dated("3", Some(3))];
        let ordered = order_versions(&ListRequest::default(), versions);
        let ids: Vec<&str> = ordered.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "1"]);
    }

    #[test]
    fn test_explicit_sort_keeps_server_order() {
        let versions = vec![dated("1", Some(1)), dated("3", Some(3))];
        let request = ListRequest {
            sort_by: "name".to_string(),
            ..Default::default()
        };
        let ordered = order_versions(&request, versions);
        assert_eq!(ordered[0].id, "1");
    }

    #[test]
    fn test_table_row_exposes_id_and_timestamp() {
        let version = dated("v-9", Some(5));
        assert_eq!(TableRow::id(&version), "v-9");
        assert!(TableRow::created_at(&version).is_some());
    }
}
