//! revpipe: AI review glue for CI (library crate).
//!
//! Re-exports public modules for integration tests and external use.

pub mod config;
pub mod constants;
pub mod diff;
pub mod dispatch;
pub mod env;
pub mod models;
pub mod orchestrator;
pub mod output;
pub mod prompt;
pub mod providers;
pub mod response;
pub mod scanners;
