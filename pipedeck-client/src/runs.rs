//! Run-related API endpoints

use crate::ApiClient;
use crate::error::Result;
use crate::request::RequestSpec;
use pipedeck_core::domain::reference::ResourceKey;
use pipedeck_core::domain::run::RunDetail;
use pipedeck_core::dto::ListRunsResponse;
use pipedeck_core::list::ListRequest;

impl ApiClient {
    /// Get a run and its runtime status
    pub async fn get_run(&self, run_id: &str) -> Result<RunDetail> {
        self.fetch(RequestSpec::get("/runs").segment(run_id))
            .await
    }

    /// List one page of runs
    ///
    /// # Arguments
    /// * `key` - Optional owning resource (an experiment or a job)
    /// * `request` - Paging, sort and filter parameters, forwarded unchanged
    pub async fn list_runs(
        &self,
        key: Option<&ResourceKey>,
        request: &ListRequest,
    ) -> Result<ListRunsResponse> {
        self.fetch(RequestSpec::get("/runs").resource_key(key).list(request))
            .await
    }

    pub async fn archive_run(&self, run_id: &str) -> Result<()> {
        self.execute(RequestSpec::post("/runs").segment(format!("{}:archive", run_id)))
            .await
    }

    pub async fn unarchive_run(&self, run_id: &str) -> Result<()> {
        self.execute(RequestSpec::post("/runs").segment(format!("{}:unarchive", run_id)))
            .await
    }

    pub async fn delete_run(&self, run_id: &str) -> Result<()> {
        self.execute(RequestSpec::delete("/runs").segment(run_id))
            .await
    }
}
