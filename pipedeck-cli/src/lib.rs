//! Pipedeck console
//!
//! The pieces behind the `pipedeck` binary, usable on their own:
//! - [`table`]: the paged, sortable, filterable list protocol and its sources
//! - [`forms`]: the create-version and upload flows
//! - [`dialog`]: confirm/cancel selectors
//! - [`id_resolver`]: id-prefix resolution over list endpoints
//! - [`commands`]: the clap command tree

pub mod commands;
pub mod config;
pub mod dialog;
pub mod forms;
pub mod id_resolver;
pub mod table;
pub mod types;
