//! Pipeline version API endpoints

use crate::ApiClient;
use crate::error::{ClientError, Result};
use crate::request::RequestSpec;
use pipedeck_core::domain::pipeline::{PipelineVersion, Template, validate_new_version};
use pipedeck_core::domain::reference::ResourceKey;
use pipedeck_core::dto::ListPipelineVersionsResponse;
use pipedeck_core::list::ListRequest;

impl ApiClient {
    // =============================================================================
    // Pipeline Versions
    // =============================================================================

    /// Create a pipeline version from a remote package URL
    ///
    /// The draft must reference exactly one owning pipeline; this is checked
    /// before anything is sent.
    ///
    /// # Arguments
    /// * `version` - Draft version, usually built with `PipelineVersion::for_pipeline`
    pub async fn create_pipeline_version(
        &self,
        version: &PipelineVersion,
    ) -> Result<PipelineVersion> {
        validate_new_version(version).map_err(ClientError::InvalidRequest)?;

        self.send_json(RequestSpec::post("/pipeline_versions"), version)
            .await
    }

    /// List one page of versions belonging to a resource (normally a pipeline)
    ///
    /// # Arguments
    /// * `key` - The owning resource
    /// * `request` - Paging, sort and filter parameters, forwarded unchanged
    pub async fn list_pipeline_versions(
        &self,
        key: &ResourceKey,
        request: &ListRequest,
    ) -> Result<ListPipelineVersionsResponse> {
        self.fetch(
            RequestSpec::get("/pipeline_versions")
                .resource_key(Some(key))
                .list(request),
        )
        .await
    }

    /// Get a pipeline version by ID
    pub async fn get_pipeline_version(&self, version_id: &str) -> Result<PipelineVersion> {
        self.fetch(RequestSpec::get("/pipeline_versions").segment(version_id))
            .await
    }

    /// Delete a pipeline version
    pub async fn delete_pipeline_version(&self, version_id: &str) -> Result<()> {
        self.execute(RequestSpec::delete("/pipeline_versions").segment(version_id))
        .await
    }

    /// Get the manifest of a pipeline version
    pub async fn get_pipeline_version_template(&self, version_id: &str) -> Result<String> {
        let template: Template = self
            .fetch(
                RequestSpec::get("/pipeline_versions")
                    .segment(version_id)
                    .segment("templates"),
            )
            .await?;

        Ok(template.template)
    }
}
