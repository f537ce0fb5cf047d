//! List queries
//!
//! `ListRequest` is the paging/sort/filter descriptor built for every list
//! fetch. Sort strings follow the backend grammar (`field`, `field asc`,
//! `field desc`) and filters travel as a base64-encoded JSON blob.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::pipeline::Timestamp;

/// Default number of rows per page
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Sort keys understood by the pipeline, job, run and experiment endpoints
pub mod sort_keys {
    pub const NAME: &str = "name";
    pub const CREATED_AT: &str = "created_at";
}

/// Errors raised while building list queries
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ListQueryError {
    #[error(
        "Received invalid sort by format {0:?}. Supported format: \"field_name\", \"field_name desc\", or \"field_name asc\""
    )]
    InvalidSortBy(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
}

/// Parameters for a single list fetch
///
/// Empty strings and a zero page size mean "not set"; the server then
/// applies its defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListRequest {
    pub page_token: String,
    pub page_size: u32,
    pub sort_by: String,
    pub filter: String,
}

impl ListRequest {
    /// First page with the given size, no sort and no filter
    pub fn first_page(page_size: u32) -> Self {
        Self {
            page_size,
            ..Default::default()
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Parsed `sort_by` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortBy {
    pub field: String,
    pub order: SortOrder,
}

impl SortBy {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    /// Parse `field`, `field asc` or `field desc`
    ///
    /// Matching is case-insensitive and a bare field sorts ascending. An
    /// empty string yields `None`.
    pub fn parse(input: &str) -> Result<Option<Self>, ListQueryError> {
        let lowered = input.to_lowercase();
        let parts: Vec<&str> = lowered.split_whitespace().collect();

        match parts.as_slice() {
            [] => Ok(None),
            [field] => Ok(Some(Self::new(*field, SortOrder::Asc))),
            [field, "asc"] => Ok(Some(Self::new(*field, SortOrder::Asc))),
            [field, "desc"] => Ok(Some(Self::new(*field, SortOrder::Desc))),
            _ => Err(ListQueryError::InvalidSortBy(input.to_string())),
        }
    }
}

impl std::fmt::Display for SortBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.order {
            SortOrder::Asc => write!(f, "{}", self.field),
            SortOrder::Desc => write!(f, "{} desc", self.field),
        }
    }
}

/// Predicate comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PredicateOp {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanEquals,
    LessThan,
    LessThanEquals,
    In,
    IsSubstring,
}

/// Single filter predicate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    pub key: String,
    pub op: PredicateOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub int_value: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_value: Option<Timestamp>,
}

impl Predicate {
    pub fn string(key: impl Into<String>, op: PredicateOp, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            op,
            string_value: Some(value.into()),
            int_value: None,
            long_value: None,
            timestamp_value: None,
        }
    }
}

/// Conjunction of predicates
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Filter {
    #[serde(default)]
    pub predicates: Vec<Predicate>,
}

impl Filter {
    /// Filter matching names that contain `text`
    pub fn name_contains(text: impl Into<String>) -> Self {
        Self {
            predicates: vec![Predicate::string(
                sort_keys::NAME,
                PredicateOp::IsSubstring,
                text,
            )],
        }
    }

    pub fn and(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Encode as the base64 JSON blob sent in the `filter` query parameter
    pub fn encode(&self) -> String {
        if self.is_empty() {
            return String::new();
        }
        // A struct of strings and numbers always serializes.
        let json = serde_json::to_vec(self).unwrap_or_default();
        STANDARD.encode(json)
    }

    /// Decode a blob produced by [`Filter::encode`]
    pub fn decode(encoded: &str) -> Result<Self, ListQueryError> {
        if encoded.is_empty() {
            return Ok(Self::default());
        }
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| ListQueryError::InvalidFilter(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| ListQueryError::InvalidFilter(e.to_string()))
    }
}
