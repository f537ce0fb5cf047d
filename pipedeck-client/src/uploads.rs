//! Multipart package uploads

use std::path::Path;

use crate::ApiClient;
use crate::error::{ClientError, Result};
use crate::request::RequestSpec;
use pipedeck_core::domain::pipeline::{Pipeline, PipelineVersion};
use reqwest::multipart::{Form, Part};
use tracing::debug;

/// Multipart field the backend reads the package from
const UPLOAD_FIELD: &str = "uploadfile";

impl ApiClient {
    // =============================================================================
    // Package Uploads
    // =============================================================================

    /// Upload a local package file as a new pipeline
    ///
    /// # Arguments
    /// * `name` - Pipeline name
    /// * `description` - Optional pipeline description
    /// * `file` - Path to a `.yaml`, `.zip` or `.tar.gz` package
    pub async fn upload_pipeline(
        &self,
        name: &str,
        description: Option<&str>,
        file: &Path,
    ) -> Result<Pipeline> {
        let spec = upload_pipeline_spec(name, description);
        self.upload(spec, file).await
    }

    /// Upload a local package file as a new version of `pipeline_id`
    ///
    /// # Arguments
    /// * `name` - Version name
    /// * `file` - Path to the package
    /// * `pipeline_id` - Owning pipeline
    /// * `code_source_url` - Optional link to the version's source
    pub async fn upload_pipeline_version(
        &self,
        name: &str,
        file: &Path,
        pipeline_id: &str,
        code_source_url: Option<&str>,
    ) -> Result<PipelineVersion> {
        let spec = upload_version_spec(name, pipeline_id, code_source_url);
        self.upload(spec, file).await
    }

    async fn upload<T: serde::de::DeserializeOwned>(
        &self,
        spec: RequestSpec,
        file: &Path,
    ) -> Result<T> {
        let bytes = tokio::fs::read(file).await.map_err(|e| {
            ClientError::InvalidRequest(format!("cannot read {}: {}", file.display(), e))
        })?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "package".to_string());

        debug!(file = %file.display(), size = bytes.len(), "uploading package");

        let form = Form::new().part(UPLOAD_FIELD, Part::bytes(bytes).file_name(file_name));
        let response = self.request(&spec)?.multipart(form).send().await?;

        self.handle_response(response).await
    }
}

fn upload_pipeline_spec(name: &str, description: Option<&str>) -> RequestSpec {
    RequestSpec::post("/pipelines/upload")
        .query("name", name)
        .query_non_empty("description", description.unwrap_or_default())
}

fn upload_version_spec(name: &str, pipeline_id: &str, code_source_url: Option<&str>) -> RequestSpec {
    RequestSpec::post("/pipelines/upload_version")
        .query("name", name)
        .query("pipelineid", pipeline_id)
        .query_non_empty("code_source_url", code_source_url.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_pipeline_url() {
        let url = upload_pipeline_spec("my pipeline", Some("demo"))
            .url("http://h")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://h/apis/v1beta1/pipelines/upload?name=my+pipeline&description=demo"
        );
    }

    #[test]
    fn test_upload_version_url() {
        let url = upload_version_spec("v2", "p-1", None).url("http://h").unwrap();
        assert_eq!(
            url.as_str(),
            "http://h/apis/v1beta1/pipelines/upload_version?name=v2&pipelineid=p-1"
        );

        let spec = upload_version_spec("v2", "p-1", Some("https://git/x"));
        assert_eq!(spec.query.len(), 3);
    }

    #[tokio::test]
    async fn test_upload_missing_file_fails_before_sending() {
        let client = ApiClient::new("http://127.0.0.1:9");
        let err = client
            .upload_pipeline("p", None, Path::new("/definitely/not/here.yaml"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }
}
