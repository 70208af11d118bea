//! Environment access behind a small reader type.
//!
//! [`Env::real()`] reads the process environment; [`Env::mock()`] reads a
//! fixed map so tests can describe an environment without touching the
//! process-wide one.

use std::collections::HashMap;

/// Reads environment variables from the process or from a fixed map.
#[derive(Clone, Debug)]
pub struct Env {
    fixed: Option<HashMap<String, String>>,
}

impl Env {
    /// Reader over the process environment.
    pub fn real() -> Self {
        Self { fixed: None }
    }

    /// Reader over exactly `vars`.
    pub fn mock(vars: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        Self {
            fixed: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Raw lookup; empty values are returned as-is.
    pub fn var(&self, name: &str) -> Result<String, std::env::VarError> {
        match &self.fixed {
            Some(map) => map.get(name).cloned().ok_or(std::env::VarError::NotPresent),
            None => std::env::var(name),
        }
    }

    /// Look up a variable, treating empty or whitespace-only values as unset.
    pub fn non_empty(&self, name: &str) -> Option<String> {
        self.var(name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// Returns `true` if the variable is present with a non-empty value.
    pub fn is_set(&self, name: &str) -> bool {
        self.non_empty(name).is_some()
    }

    /// Names of all variables visible through this reader, sorted.
    ///
    /// Variables whose name is not valid UTF-8 are skipped.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = match &self.fixed {
            Some(map) => map.keys().cloned().collect(),
            None => std::env::vars_os()
                .filter_map(|(k, _)| k.into_string().ok())
                .collect(),
        };
        keys.sort();
        keys
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::real()
    }
}
