//! Upload-pipeline dialog

use std::path::PathBuf;

use anyhow::{Context, Result};
use pipedeck_core::domain::pipeline::Pipeline;
use tracing::info;

use super::{ImportMethod, VersionBackend};

/// Where the uploaded package comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageSource {
    Local(PathBuf),
    Url(String),
}

/// A confirmed upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub name: String,
    pub description: Option<String>,
    pub source: PackageSource,
}

#[derive(Debug, Clone, Default)]
pub struct UploadDialog {
    open: bool,
    name: String,
    description: String,
    import_method: ImportMethod,
    file: Option<PathBuf>,
    url: String,
}

impl UploadDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_import_method(&mut self, method: ImportMethod) {
        self.import_method = method;
    }

    /// Pick a local package; an unnamed upload takes the file's base name
    pub fn set_file(&mut self, file: PathBuf) {
        if self.name.is_empty() {
            if let Some(stem) = file
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.split('.').next())
            {
                self.name = stem.to_string();
            }
        }
        self.import_method = ImportMethod::Local;
        self.file = Some(file);
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.import_method = ImportMethod::Url;
        self.url = url.into();
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Close the dialog, yielding the upload when confirmed and complete
    pub fn close(&mut self, confirmed: bool) -> Option<UploadRequest> {
        self.open = false;
        if !confirmed {
            return None;
        }

        let source = match self.import_method {
            ImportMethod::Local => PackageSource::Local(self.file.clone()?),
            ImportMethod::Url if self.url.is_empty() => return None,
            ImportMethod::Url => PackageSource::Url(self.url.clone()),
        };

        Some(UploadRequest {
            name: self.name.clone(),
            description: Some(self.description.clone()).filter(|d| !d.is_empty()),
            source,
        })
    }
}

/// Create the pipeline described by a confirmed upload
pub async fn upload(backend: &dyn VersionBackend, request: &UploadRequest) -> Result<Pipeline> {
    let pipeline = match &request.source {
        PackageSource::Local(file) => backend
            .upload_pipeline(&request.name, request.description.as_deref(), file)
            .await
            .with_context(|| format!("Failed to upload {}", file.display()))?,
        PackageSource::Url(url) => {
            let draft = Pipeline::from_url(request.name.clone(), request.description.clone(), url);
            backend.create_pipeline(&draft).await?
        }
    };

    info!(pipeline_id = %pipeline.id, name = %pipeline.name, "uploaded pipeline");
    Ok(pipeline)
}
