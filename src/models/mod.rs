//! Shared types used across all modules.
//!
//! This module defines the review payload, findings and the agent-result
//! contract. Other modules import from here rather than reaching into each
//! other's internals.

pub mod agent;
pub mod finding;
pub mod review;

pub use agent::{AgentResult, Artifact};
pub use finding::{Finding, Severity};
pub use review::{ReviewPayload, TestCase};
