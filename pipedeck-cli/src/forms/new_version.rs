//! New pipeline version form
//!
//! Creates a version under an existing pipeline, or a new pipeline together
//! with its first explicitly named version. Submission is two steps: resolve
//! (or create) the parent pipeline, then create the version under it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use chrono::{SecondsFormat, Utc};
use pipedeck_core::domain::pipeline::{Pipeline, PipelineVersion, Timestamp};
use pipedeck_core::routes;
use tracing::{error, info};

use super::{ImportMethod, Notification, VersionBackend};
use crate::dialog::Selector;

pub const VERSION_NAME_REQUIRED: &str = "Pipeline version name is required";
pub const PIPELINE_REQUIRED: &str = "Pipeline is required";
pub const PACKAGE_REQUIRED: &str = "Please specify a pipeline package in .yaml, .zip, or .tar.gz";
pub const CREATION_FAILED: &str = "Pipeline version creation failed";

/// Default version name for a pipeline: `<name>_version_at_<ISO time>`
pub fn suggest_version_name(pipeline_name: &str, now: Timestamp) -> String {
    format!(
        "{}_version_at_{}",
        pipeline_name,
        now.to_rfc3339_opts(SecondsFormat::Millis, true)
    )
}

/// Result of a successful submission
#[derive(Debug, Clone)]
pub struct CreatedVersion {
    pub pipeline_id: String,
    pub version: PipelineVersion,
    /// Details page of the new version
    pub route: String,
    pub notification: Notification,
}

#[derive(Debug, Clone)]
pub struct NewVersionForm {
    new_pipeline: bool,
    pipeline: Option<Pipeline>,
    pipeline_id: String,
    pipeline_name: String,
    pipeline_description: String,
    version_name: String,
    code_source_url: String,
    import_method: ImportMethod,
    package_url: String,
    file: Option<PathBuf>,
    busy: bool,
    validation_error: String,
}

impl Default for NewVersionForm {
    fn default() -> Self {
        let mut form = Self {
            new_pipeline: true,
            pipeline: None,
            pipeline_id: String::new(),
            pipeline_name: String::new(),
            pipeline_description: String::new(),
            version_name: String::new(),
            code_source_url: String::new(),
            import_method: ImportMethod::default(),
            package_url: String::new(),
            file: None,
            busy: false,
            validation_error: String::new(),
        };
        form.validate();
        form
    }
}

impl NewVersionForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Form opened for a given pipeline, as from `?pipelineId=<id>`
    ///
    /// With no id this is the blank new-pipeline form.
    pub async fn from_query(
        backend: &dyn VersionBackend,
        pipeline_id: Option<&str>,
    ) -> Result<Self> {
        let mut form = Self::new();
        let Some(pipeline_id) = pipeline_id.filter(|id| !id.is_empty()) else {
            return Ok(form);
        };

        let pipeline = backend
            .get_pipeline(pipeline_id)
            .await
            .with_context(|| format!("Failed to fetch pipeline {}", pipeline_id))?;

        form.new_pipeline = false;
        form.apply_pipeline(pipeline);
        form.validate();
        Ok(form)
    }

    // =============================================================================
    // Field Updates
    // =============================================================================

    pub fn set_new_pipeline(&mut self, new_pipeline: bool) {
        self.new_pipeline = new_pipeline;
        self.validate();
    }

    /// Name of the pipeline to create; also suggests a version name
    pub fn set_pipeline_name(&mut self, name: impl Into<String>) {
        self.pipeline_name = name.into();
        self.version_name = suggest_version_name(&self.pipeline_name, Utc::now());
        self.validate();
    }

    pub fn set_pipeline_description(&mut self, description: impl Into<String>) {
        self.pipeline_description = description.into();
        self.validate();
    }

    pub fn set_version_name(&mut self, name: impl Into<String>) {
        self.version_name = name.into();
        self.validate();
    }

    pub fn set_code_source_url(&mut self, url: impl Into<String>) {
        self.code_source_url = url.into();
        self.validate();
    }

    pub fn set_import_method(&mut self, method: ImportMethod) {
        self.import_method = method;
        self.validate();
    }

    pub fn set_package_url(&mut self, url: impl Into<String>) {
        self.package_url = url.into();
        self.validate();
    }

    pub fn set_file(&mut self, file: Option<PathBuf>) {
        self.file = file;
        self.validate();
    }

    /// Apply the outcome of the pipeline selector
    pub fn pipeline_selector_closed(&mut self, confirmed: bool, selector: &mut Selector<Pipeline>) {
        if let Some(pipeline) = selector.close(confirmed) {
            self.apply_pipeline(pipeline);
        }
        self.validate();
    }

    fn apply_pipeline(&mut self, pipeline: Pipeline) {
        self.pipeline_id = pipeline.id.clone();
        self.pipeline_name = pipeline.name.clone();
        self.version_name = suggest_version_name(&pipeline.name, Utc::now());
        self.pipeline = Some(pipeline);
    }

    // =============================================================================
    // Validation
    // =============================================================================

    fn validate(&mut self) {
        self.validation_error = self.first_error().unwrap_or_default().to_string();
    }

    fn first_error(&self) -> Option<&'static str> {
        if self.version_name.is_empty() {
            return Some(VERSION_NAME_REQUIRED);
        }
        if !self.new_pipeline && self.pipeline_id.is_empty() {
            return Some(PIPELINE_REQUIRED);
        }
        let has_package = match self.import_method {
            ImportMethod::Url => !self.package_url.is_empty(),
            ImportMethod::Local => self.file.is_some(),
        };
        if !has_package {
            return Some(PACKAGE_REQUIRED);
        }
        None
    }

    /// Empty when the form is valid
    pub fn validation_error(&self) -> &str {
        &self.validation_error
    }

    pub fn can_submit(&self) -> bool {
        self.validation_error.is_empty() && !self.busy
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn version_name(&self) -> &str {
        &self.version_name
    }

    pub fn pipeline_id(&self) -> &str {
        &self.pipeline_id
    }

    pub fn pipeline_name(&self) -> &str {
        &self.pipeline_name
    }

    // =============================================================================
    // Submission
    // =============================================================================

    /// Create the version, and its pipeline when `new_pipeline` is set
    ///
    /// On failure every field is kept so the user can correct and retry.
    pub async fn submit(&mut self, backend: &dyn VersionBackend) -> Result<CreatedVersion> {
        if !self.validation_error.is_empty() {
            bail!(self.validation_error.clone());
        }
        if self.busy {
            bail!("A pipeline version is already being created");
        }

        self.busy = true;
        let result = self.create(backend).await;
        self.busy = false;

        match result {
            Ok(created) => {
                info!(
                    pipeline_id = %created.pipeline_id,
                    version_id = %created.version.id,
                    "created pipeline version"
                );
                Ok(created)
            }
            Err(err) => {
                error!(error = %format!("{:#}", err), "Error creating pipeline version");
                Err(err.context(CREATION_FAILED))
            }
        }
    }

    async fn create(&self, backend: &dyn VersionBackend) -> Result<CreatedVersion> {
        let pipeline_id = self.resolve_or_create_parent(backend).await?;

        let code_source_url = Some(self.code_source_url.as_str()).filter(|u| !u.is_empty());
        let version = match self.import_method {
            ImportMethod::Url => {
                let draft = PipelineVersion::for_pipeline(
                    pipeline_id.clone(),
                    self.version_name.clone(),
                    self.package_url.clone(),
                    code_source_url.map(str::to_string),
                );
                backend.create_pipeline_version(&draft).await?
            }
            ImportMethod::Local => {
                let file = self.local_file()?;
                backend
                    .upload_pipeline_version(&self.version_name, file, &pipeline_id, code_source_url)
                    .await?
            }
        };

        let pipeline_id = version
            .owning_pipeline_id()
            .map(str::to_string)
            .unwrap_or(pipeline_id);

        Ok(CreatedVersion {
            route: routes::pipeline_details(&pipeline_id, Some(&version.id)),
            notification: Notification::timed(format!(
                "Successfully created new pipeline version: {}",
                version.name
            )),
            pipeline_id,
            version,
        })
    }

    /// Id of the pipeline the version goes under, creating it if needed
    pub async fn resolve_or_create_parent(&self, backend: &dyn VersionBackend) -> Result<String> {
        if !self.new_pipeline {
            return Ok(self.pipeline_id.clone());
        }

        let description = Some(self.pipeline_description.as_str()).filter(|d| !d.is_empty());
        let pipeline = match self.import_method {
            ImportMethod::Url => {
                let draft = Pipeline::from_url(
                    self.pipeline_name.clone(),
                    description.map(str::to_string),
                    self.package_url.clone(),
                );
                backend.create_pipeline(&draft).await?
            }
            ImportMethod::Local => {
                backend
                    .upload_pipeline(&self.pipeline_name, description, self.local_file()?)
                    .await?
            }
        };

        info!(pipeline_id = %pipeline.id, name = %pipeline.name, "created pipeline");
        Ok(pipeline.id)
    }

    fn local_file(&self) -> Result<&Path> {
        self.file.as_deref().ok_or_else(|| anyhow!(PACKAGE_REQUIRED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::testing::FakeBackend;
    use chrono::TimeZone;
    use pipedeck_core::domain::reference::{Relationship, ResourceType};

    fn existing_pipeline_form() -> NewVersionForm {
        let mut form = NewVersionForm::new();
        form.set_new_pipeline(false);
        let mut selector = Selector::new("Choose a pipeline");
        selector.open();
        selector.choose(Pipeline {
            id: "test-pipeline-id".to_string(),
            name: "test pipeline name".to_string(),
            ..Default::default()
        });
        form.pipeline_selector_closed(true, &mut selector);
        form
    }

    #[test]
    fn test_suggested_version_name_format() {
        let now = Utc.with_ymd_and_hms(2019, 9, 22, 11, 5, 48).unwrap();
        assert_eq!(
            suggest_version_name("my pipeline", now),
            "my pipeline_version_at_2019-09-22T11:05:48.000Z"
        );
    }

    #[test]
    fn test_validation_rules_apply_in_order() {
        let mut form = NewVersionForm::new();
        form.set_new_pipeline(false);
        assert_eq!(form.validation_error(), VERSION_NAME_REQUIRED);

        form.set_version_name("v1");
        assert_eq!(form.validation_error(), PIPELINE_REQUIRED);

        let mut form = existing_pipeline_form();
        assert_eq!(form.validation_error(), PACKAGE_REQUIRED);

        form.set_package_url("https://storage/p.yaml");
        assert_eq!(form.validation_error(), "");
        assert!(form.can_submit());

        form.set_import_method(ImportMethod::Local);
        assert_eq!(form.validation_error(), PACKAGE_REQUIRED);
        form.set_file(Some(PathBuf::from("pipeline.yaml")));
        assert_eq!(form.validation_error(), "");
    }

    #[test]
    fn test_new_pipeline_does_not_require_selection() {
        let mut form = NewVersionForm::new();
        form.set_pipeline_name("fresh");
        form.set_package_url("https://storage/p.yaml");

        assert!(form.version_name().starts_with("fresh_version_at_"));
        assert_eq!(form.validation_error(), "");
    }

    #[test]
    fn test_cancelled_selector_keeps_previous_pipeline() {
        let mut form = existing_pipeline_form();
        let mut selector = Selector::new("Choose a pipeline");
        selector.open();
        selector.choose(Pipeline {
            id: "other".to_string(),
            ..Default::default()
        });

        form.pipeline_selector_closed(false, &mut selector);

        assert_eq!(form.pipeline_id(), "test-pipeline-id");
        assert!(!selector.is_open());
    }

    #[tokio::test]
    async fn test_from_query_prefills_pipeline() {
        let backend = FakeBackend::default();
        let form = NewVersionForm::from_query(&backend, Some("test-pipeline-id"))
            .await
            .unwrap();

        assert_eq!(form.pipeline_id(), "test-pipeline-id");
        assert_eq!(form.pipeline_name(), "test pipeline name");
        assert!(
            form.version_name()
                .starts_with("test pipeline name_version_at_")
        );
        assert_eq!(form.validation_error(), PACKAGE_REQUIRED);
        assert_eq!(backend.calls(), vec!["get_pipeline test-pipeline-id"]);
    }

    #[tokio::test]
    async fn test_submit_under_existing_pipeline() {
        let backend = FakeBackend::default();
        let mut form = existing_pipeline_form();
        form.set_version_name("test version name");
        form.set_package_url("https://storage/p.yaml");
        form.set_code_source_url("https://git/src");

        let created = form.submit(&backend).await.unwrap();

        assert_eq!(
            backend.calls(),
            vec!["create_pipeline_version test version name"]
        );
        let sent = backend.created_versions.lock().unwrap()[0].clone();
        assert_eq!(sent.resource_references.len(), 1);
        assert_eq!(sent.resource_references[0].key.resource_type, ResourceType::Pipeline);
        assert_eq!(sent.resource_references[0].key.id, "test-pipeline-id");
        assert_eq!(sent.resource_references[0].relationship, Relationship::Owner);
        assert_eq!(sent.code_source_url.as_deref(), Some("https://git/src"));

        assert_eq!(created.pipeline_id, "test-pipeline-id");
        assert_eq!(
            created.route,
            "/pipelines/details/test-pipeline-id/version/new-version-id"
        );
        assert_eq!(
            created.notification.message,
            "Successfully created new pipeline version: test version name"
        );
        assert_eq!(created.notification.auto_hide.as_secs(), 10);
        assert!(!form.is_busy());
    }

    #[tokio::test]
    async fn test_submit_creates_parent_before_version() {
        let backend = FakeBackend::default();
        let mut form = NewVersionForm::new();
        form.set_pipeline_name("fresh");
        form.set_pipeline_description("desc");
        form.set_version_name("v1");
        form.set_package_url("https://storage/p.yaml");

        let created = form.submit(&backend).await.unwrap();

        assert_eq!(
            backend.calls(),
            vec!["create_pipeline fresh", "create_pipeline_version v1"]
        );
        let parent = backend.created_pipelines.lock().unwrap()[0].clone();
        assert_eq!(parent.description.as_deref(), Some("desc"));
        assert_eq!(
            parent.url.map(|u| u.pipeline_url),
            Some("https://storage/p.yaml".to_string())
        );
        assert_eq!(created.pipeline_id, "new-pipeline-id");
    }

    #[tokio::test]
    async fn test_local_submit_uploads_file() {
        let backend = FakeBackend::default();
        let mut form = existing_pipeline_form();
        form.set_version_name("v2");
        form.set_import_method(ImportMethod::Local);
        form.set_file(Some(PathBuf::from("/tmp/p.tar.gz")));

        let created = form.submit(&backend).await.unwrap();

        assert_eq!(
            backend.calls(),
            vec!["upload_pipeline_version v2 test-pipeline-id"]
        );
        assert_eq!(created.version.id, "uploaded-version-id");
        assert_eq!(created.pipeline_id, "test-pipeline-id");
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_fields_and_titles_error() {
        let backend = FakeBackend::failing_versions();
        let mut form = existing_pipeline_form();
        form.set_version_name("dup");
        form.set_package_url("https://storage/p.yaml");

        let err = form.submit(&backend).await.unwrap_err();

        assert_eq!(err.to_string(), CREATION_FAILED);
        assert!(format!("{:#}", err).contains("version already exists"));
        assert_eq!(form.version_name(), "dup");
        assert!(form.can_submit());
    }

    #[tokio::test]
    async fn test_invalid_form_never_calls_backend() {
        let backend = FakeBackend::default();
        let mut form = NewVersionForm::new();

        let err = form.submit(&backend).await.unwrap_err();

        assert_eq!(err.to_string(), VERSION_NAME_REQUIRED);
        assert!(backend.calls().is_empty());
    }
}
