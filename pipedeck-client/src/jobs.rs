//! Job-related API endpoints

use crate::ApiClient;
use crate::error::{ClientError, Result};
use crate::request::RequestSpec;
use pipedeck_core::domain::job::Job;
use pipedeck_core::domain::reference::ResourceKey;
use pipedeck_core::dto::ListJobsResponse;
use pipedeck_core::list::ListRequest;

impl ApiClient {
    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    /// Create a scheduled job
    ///
    /// # Arguments
    /// * `job` - Draft job; it must carry a pipeline spec and a trigger
    ///
    /// # Returns
    /// The created job
    pub async fn create_job(&self, job: &Job) -> Result<Job> {
        if job.pipeline_spec.is_none() {
            return Err(ClientError::InvalidRequest(
                "job requires a pipeline spec".to_string(),
            ));
        }
        if job.trigger.is_none() {
            return Err(ClientError::InvalidRequest(
                "job requires a cron or periodic trigger".to_string(),
            ));
        }

        self.send_json(RequestSpec::post("/jobs"), job).await
    }

    /// Get a job by ID
    pub async fn get_job(&self, job_id: &str) -> Result<Job> {
        self.fetch(RequestSpec::get("/jobs").segment(job_id))
            .await
    }

    /// List one page of jobs
    ///
    /// # Arguments
    /// * `key` - Optional owning resource (normally an experiment)
    /// * `request` - Paging, sort and filter parameters, forwarded unchanged
    pub async fn list_jobs(
        &self,
        key: Option<&ResourceKey>,
        request: &ListRequest,
    ) -> Result<ListJobsResponse> {
        self.fetch(RequestSpec::get("/jobs").resource_key(key).list(request))
            .await
    }

    /// Delete a job
    pub async fn delete_job(&self, job_id: &str) -> Result<()> {
        self.execute(RequestSpec::delete("/jobs").segment(job_id))
            .await
    }

    /// Enable a job's trigger
    pub async fn enable_job(&self, job_id: &str) -> Result<()> {
        self.execute(RequestSpec::post("/jobs").segment(job_id).segment("enable"))
            .await
    }

    /// Disable a job's trigger
    pub async fn disable_job(&self, job_id: &str) -> Result<()> {
        self.execute(RequestSpec::post("/jobs").segment(job_id).segment("disable"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipedeck_core::domain::job::PipelineSpec;

    #[tokio::test]
    async fn test_create_job_requires_trigger() {
        let client = ApiClient::new("http://127.0.0.1:9");
        let job = Job {
            name: "nightly".to_string(),
            pipeline_spec: Some(PipelineSpec::by_pipeline_id("p-1", Vec::new())),
            ..Default::default()
        };

        let err = client.create_job(&job).await.unwrap_err();
        assert!(err.to_string().contains("trigger"));
    }
}
