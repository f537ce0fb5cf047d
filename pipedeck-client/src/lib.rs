//! Pipedeck HTTP Client
//!
//! A type-safe HTTP client for the pipeline backend's `/apis/v1beta1` REST API.
//!
//! `ApiClient` is the single facade the console talks to: one group of methods
//! per backend resource (pipelines, pipeline versions, jobs, runs,
//! experiments) plus the multipart upload helpers.
//!
//! # Example
//!
//! ```no_run
//! use pipedeck_client::ApiClient;
//! use pipedeck_core::list::ListRequest;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ApiClient::new("http://localhost:8888");
//!
//!     let page = client.list_pipelines(&ListRequest::first_page(10)).await?;
//!     for pipeline in page.pipelines {
//!         println!("{} {}", pipeline.id, pipeline.name);
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod experiments;
mod jobs;
mod pipelines;
pub mod request;
mod runs;
mod uploads;
mod versions;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use request::{API_BASE_PATH, RequestSpec};

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// HTTP client for the pipeline backend API
///
/// This client provides methods for all endpoints the console uses, organized
/// into logical groups:
/// - Pipelines (create, list, get, delete, template)
/// - Pipeline versions (create, list by pipeline, get, delete, template)
/// - Jobs (create, list, get, enable/disable, delete)
/// - Runs (list, get, archive/unarchive, delete)
/// - Experiments (create, list, get, delete)
/// - Package uploads
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Base URL of the backend (e.g., "http://localhost:8888")
    base_url: String,
    /// Bearer token sent with every request, when configured
    token: Option<String>,
    /// HTTP client instance
    client: Client,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the backend (e.g., "http://localhost:8888")
    ///
    /// # Example
    /// ```
    /// use pipedeck_client::ApiClient;
    ///
    /// let client = ApiClient::new("http://localhost:8888");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new API client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use pipedeck_client::ApiClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = ApiClient::with_client("http://localhost:8888", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
            client,
        }
    }

    /// Send `token` as a bearer token with every request
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.token = if token.is_empty() { None } else { Some(token) };
        self
    }

    /// Get the base URL of the backend
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether requests carry a bearer token
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    // =============================================================================
    // Request Dispatch
    // =============================================================================

    /// Turn a spec into a ready-to-send request builder
    fn request(&self, spec: &RequestSpec) -> Result<reqwest::RequestBuilder> {
        let url = spec.url(&self.base_url)?;
        debug!(method = %spec.method, %url, "api request");

        let builder = self.client.request(spec.method.clone(), url);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Send a request without a body and deserialize the JSON response
    async fn fetch<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<T> {
        let response = self.request(&spec)?.send().await?;
        self.handle_response(response).await
    }

    /// Send a JSON body and deserialize the JSON response
    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        spec: RequestSpec,
        body: &B,
    ) -> Result<T> {
        let response = self.request(&spec)?.json(body).send().await?;
        self.handle_response(response).await
    }

    /// Send a request whose response carries no useful body
    async fn execute(&self, spec: RequestSpec) -> Result<()> {
        let response = self.request(&spec)?.send().await?;
        self.handle_empty_response(response).await
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClientError::from_body(status.as_u16(), &error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response that returns no content (e.g., DELETE operations)
    ///
    /// This method checks the status code and returns an error if the request failed.
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ClientError::from_body(status.as_u16(), &error_text));
        }

        Ok(())
    }
}
