//! Typed request builder
//!
//! Every endpoint call is first described as a `RequestSpec` (verb, literal
//! path relative to the API base path, id segments, query pairs). Building
//! the spec does no I/O, so URL templating and query assembly are testable
//! on their own.
//!
//! Ids never go into `path`. They are appended with `segment` and
//! percent-encoded one segment at a time, so `/`, `?` or `#` inside an id
//! cannot reach another endpoint.

use pipedeck_core::domain::reference::ResourceKey;
use pipedeck_core::list::ListRequest;
use reqwest::{Method, Url};

use crate::error::{ClientError, Result};

/// Versioned prefix of every backend path
pub const API_BASE_PATH: &str = "/apis/v1beta1";

/// Description of a single API request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
}

impl RequestSpec {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            segments: Vec::new(),
            query: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append one path segment, encoded when the URL is built
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    /// Append a query pair
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Append a query pair unless the value is empty
    pub fn query_non_empty(self, key: &str, value: &str) -> Self {
        if value.is_empty() {
            self
        } else {
            self.query(key, value)
        }
    }

    /// Append paging, sorting and filtering parameters
    pub fn list(self, request: &ListRequest) -> Self {
        let spec = self.query_non_empty("page_token", &request.page_token);
        let spec = if request.page_size > 0 {
            spec.query("page_size", request.page_size)
        } else {
            spec
        };
        spec.query_non_empty("sort_by", &request.sort_by)
            .query_non_empty("filter", &request.filter)
    }

    /// Restrict a list call to resources referencing `key`
    pub fn resource_key(self, key: Option<&ResourceKey>) -> Self {
        match key {
            Some(key) => self
                .query("resource_reference_key.type", key.resource_type.as_str())
                .query("resource_reference_key.id", &key.id),
            None => self,
        }
    }

    /// Full URL against `base_url`
    pub fn url(&self, base_url: &str) -> Result<Url> {
        let raw = format!(
            "{}{}{}",
            base_url.trim_end_matches('/'),
            API_BASE_PATH,
            self.path
        );
        let mut url = Url::parse(&raw)
            .map_err(|e| ClientError::InvalidRequest(format!("invalid URL {}: {}", raw, e)))?;

        if !self.segments.is_empty() {
            if let Some(bad) = self
                .segments
                .iter()
                .find(|s| matches!(s.as_str(), "" | "." | ".."))
            {
                return Err(ClientError::InvalidRequest(format!(
                    "invalid path segment '{}'",
                    bad
                )));
            }
            url.path_segments_mut()
                .map_err(|_| ClientError::InvalidRequest(format!("URL {} has no path", raw)))?
                .pop_if_empty()
                .extend(&self.segments);
        }

        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }

        Ok(url)
    }
}
