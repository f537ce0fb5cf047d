//! Create-resource flows
//!
//! The forms hold user input, validate it synchronously and talk to the
//! backend only through `VersionBackend`, so they can be driven by fakes.

pub mod new_version;
pub mod upload;

pub use new_version::{CreatedVersion, NewVersionForm};
pub use upload::{PackageSource, UploadDialog, UploadRequest};

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use pipedeck_client::ApiClient;
use pipedeck_core::domain::pipeline::{Pipeline, PipelineVersion};

/// How a package reaches the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMethod {
    /// Uploaded from a local file
    Local,
    /// Fetched by the backend from a URL
    #[default]
    Url,
}

/// Transient success message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub auto_hide: Duration,
}

impl Notification {
    /// Notification hidden after ten seconds
    pub fn timed(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            auto_hide: Duration::from_secs(10),
        }
    }
}

/// Backend calls needed to create pipelines and versions
#[async_trait]
pub trait VersionBackend: Send + Sync {
    async fn get_pipeline(&self, pipeline_id: &str) -> Result<Pipeline>;

    async fn create_pipeline(&self, pipeline: &Pipeline) -> Result<Pipeline>;

    async fn upload_pipeline(
        &self,
        name: &str,
        description: Option<&str>,
        file: &Path,
    ) -> Result<Pipeline>;

    async fn create_pipeline_version(&self, version: &PipelineVersion) -> Result<PipelineVersion>;

    async fn upload_pipeline_version(
        &self,
        name: &str,
        file: &Path,
        pipeline_id: &str,
        code_source_url: Option<&str>,
    ) -> Result<PipelineVersion>;
}

#[async_trait]
impl VersionBackend for ApiClient {
    async fn get_pipeline(&self, pipeline_id: &str) -> Result<Pipeline> {
        Ok(ApiClient::get_pipeline(self, pipeline_id).await?)
    }

    async fn create_pipeline(&self, pipeline: &Pipeline) -> Result<Pipeline> {
        Ok(ApiClient::create_pipeline(self, pipeline).await?)
    }

    async fn upload_pipeline(
        &self,
        name: &str,
        description: Option<&str>,
        file: &Path,
    ) -> Result<Pipeline> {
        Ok(ApiClient::upload_pipeline(self, name, description, file).await?)
    }

    async fn create_pipeline_version(&self, version: &PipelineVersion) -> Result<PipelineVersion> {
        Ok(ApiClient::create_pipeline_version(self, version).await?)
    }

    async fn upload_pipeline_version(
        &self,
        name: &str,
        file: &Path,
        pipeline_id: &str,
        code_source_url: Option<&str>,
    ) -> Result<PipelineVersion> {
        Ok(ApiClient::upload_pipeline_version(self, name, file, pipeline_id, code_source_url).await?)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Records calls and answers with canned resources
    #[derive(Default)]
    pub struct FakeBackend {
        pub calls: Mutex<Vec<String>>,
        pub created_pipelines: Mutex<Vec<Pipeline>>,
        pub created_versions: Mutex<Vec<PipelineVersion>>,
        pub uploads: Mutex<Vec<(String, PathBuf)>>,
        pub fail_versions: bool,
    }

    impl FakeBackend {
        pub fn failing_versions() -> Self {
            Self {
                fail_versions: true,
                ..Default::default()
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }
    }

    #[async_trait]
    impl VersionBackend for FakeBackend {
        async fn get_pipeline(&self, pipeline_id: &str) -> Result<Pipeline> {
            self.record(format!("get_pipeline {}", pipeline_id));
            Ok(Pipeline {
                id: pipeline_id.to_string(),
                name: "test pipeline name".to_string(),
                ..Default::default()
            })
        }

        async fn create_pipeline(&self, pipeline: &Pipeline) -> Result<Pipeline> {
            self.record(format!("create_pipeline {}", pipeline.name));
            self.created_pipelines.lock().unwrap().push(pipeline.clone());
            Ok(Pipeline {
                id: "new-pipeline-id".to_string(),
                ..pipeline.clone()
            })
        }

        async fn upload_pipeline(
            &self,
            name: &str,
            _description: Option<&str>,
            file: &Path,
        ) -> Result<Pipeline> {
            self.record(format!("upload_pipeline {}", name));
            self.uploads
                .lock()
                .unwrap()
                .push((name.to_string(), file.to_path_buf()));
            Ok(Pipeline {
                id: "uploaded-pipeline-id".to_string(),
                name: name.to_string(),
                ..Default::default()
            })
        }

        async fn create_pipeline_version(
            &self,
            version: &PipelineVersion,
        ) -> Result<PipelineVersion> {
            self.record(format!("create_pipeline_version {}", version.name));
            if self.fail_versions {
                anyhow::bail!("version already exists");
            }
            self.created_versions.lock().unwrap().push(version.clone());
            Ok(PipelineVersion {
                id: "new-version-id".to_string(),
                ..version.clone()
            })
        }

        async fn upload_pipeline_version(
            &self,
            name: &str,
            file: &Path,
            pipeline_id: &str,
            _code_source_url: Option<&str>,
        ) -> Result<PipelineVersion> {
            self.record(format!("upload_pipeline_version {} {}", name, pipeline_id));
            self.uploads
                .lock()
                .unwrap()
                .push((name.to_string(), file.to_path_buf()));
            Ok(PipelineVersion {
                id: "uploaded-version-id".to_string(),
                name: name.to_string(),
                ..Default::default()
            })
        }
    }
}
