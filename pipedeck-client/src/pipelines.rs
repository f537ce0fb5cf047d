//! Pipeline-related API endpoints

use crate::ApiClient;
use crate::error::Result;
use crate::request::RequestSpec;
use pipedeck_core::domain::pipeline::{Pipeline, Template};
use pipedeck_core::dto::ListPipelinesResponse;
use pipedeck_core::list::ListRequest;

impl ApiClient {
    // =============================================================================
    // Pipeline Management
    // =============================================================================

    /// Create a pipeline from a remote package URL
    ///
    /// # Arguments
    /// * `pipeline` - Draft pipeline; `name` and `url` are required by the backend
    ///
    /// # Returns
    /// The created pipeline, including its server-assigned id
    ///
    /// # Example
    /// ```no_run
    /// # use pipedeck_client::ApiClient;
    /// # use pipedeck_core::domain::pipeline::Pipeline;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = ApiClient::new("http://localhost:8888");
    /// let pipeline = client
    ///     .create_pipeline(&Pipeline::from_url(
    ///         "my-pipeline",
    ///         None,
    ///         "https://example.com/pipeline.yaml",
    ///     ))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_pipeline(&self, pipeline: &Pipeline) -> Result<Pipeline> {
        self.send_json(RequestSpec::post("/pipelines"), pipeline)
            .await
    }

    /// List one page of pipelines
    ///
    /// # Arguments
    /// * `request` - Paging, sort and filter parameters, forwarded unchanged
    pub async fn list_pipelines(&self, request: &ListRequest) -> Result<ListPipelinesResponse> {
        self.fetch(RequestSpec::get("/pipelines").list(request))
            .await
    }

    /// Get a pipeline by ID
    pub async fn get_pipeline(&self, pipeline_id: &str) -> Result<Pipeline> {
        self.fetch(RequestSpec::get("/pipelines").segment(pipeline_id))
            .await
    }

    /// Delete a pipeline and all of its versions
    pub async fn delete_pipeline(&self, pipeline_id: &str) -> Result<()> {
        self.execute(RequestSpec::delete("/pipelines").segment(pipeline_id))
            .await
    }

    /// Get the manifest of a pipeline's default version
    ///
    /// # Returns
    /// The raw template text
    pub async fn get_template(&self, pipeline_id: &str) -> Result<String> {
        let template: Template = self
            .fetch(RequestSpec::get("/pipelines").segment(pipeline_id).segment("templates"))
            .await?;

        Ok(template.template)
    }
}
