//! Pipedeck Core
//!
//! Core types shared by the pipedeck client and console.
//!
//! This crate contains:
//! - Domain types: the backend resources (Pipeline, PipelineVersion, Job, Run, Experiment)
//! - DTOs: list responses and the backend error body
//! - List queries: `ListRequest`, sort keys and filter encoding
//! - Routes: console paths for pipelines, versions, jobs and runs

pub mod domain;
pub mod dto;
pub mod list;
pub mod routes;
