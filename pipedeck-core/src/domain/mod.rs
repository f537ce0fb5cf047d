//! Core domain types
//!
//! The resources exposed by the `/apis/v1beta1` backend. The console only ever
//! holds request-scoped copies of them: every value here comes from, or is
//! about to be sent to, a server round trip.

pub mod experiment;
pub mod job;
pub mod pipeline;
pub mod reference;
pub mod run;
