//! Configuration loading and layering.
//!
//! Handles environment variable resolution, the optional YAML agent
//! config, and the built-in defaults.

pub mod agents;
pub mod loader;

pub use agents::{AgentsConfig, RoleSettings};
pub use loader::{tuning_notes, Config, ConfigError, ProviderConfig, ReviewConfig};
