//! Task dispatcher: run a named handler with a JSON payload and return its
//! validated result.

pub mod handlers;
pub mod validate;

use std::path::PathBuf;

use serde_json::{Map, Value};
use strum::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::env::Env;
use crate::models::AgentResult;

pub use validate::{validate, ValidationError};

/// Errors from dispatching a task.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),

    #[error("payload must be a JSON object")]
    PayloadNotObject,

    #[error("failed to serialize result: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("invalid result: {0}")]
    InvalidResult(#[from] ValidationError),
}

/// The closed set of dispatchable tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum TaskKind {
    EnvGuard,
    DbModeler,
    #[strum(to_string = "i18n_reviewer")]
    I18nReviewer,
}

impl TaskKind {
    /// Run the handler for this task.
    pub fn run(self, ctx: &HandlerContext, payload: &Map<String, Value>) -> AgentResult {
        match self {
            TaskKind::EnvGuard => handlers::env_guard(ctx, payload),
            TaskKind::DbModeler => handlers::db_modeler(ctx, payload),
            TaskKind::I18nReviewer => handlers::i18n_reviewer(ctx, payload),
        }
    }
}

/// What handlers may read besides their payload.
#[derive(Debug, Clone)]
pub struct HandlerContext {
    pub env: Env,
    /// Directory relative payload paths resolve against.
    pub root: PathBuf,
}

/// Parse the payload text. Blank input is an empty object.
pub fn parse_payload(text: &str) -> Result<Map<String, Value>, DispatchError> {
    if text.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str(text).map_err(DispatchError::InvalidPayload)? {
        Value::Object(map) => Ok(map),
        _ => Err(DispatchError::PayloadNotObject),
    }
}

/// Resolve `task`, run it on `payload`, and validate the result.
pub fn dispatch(ctx: &HandlerContext, task: &str, payload: &str) -> Result<Value, DispatchError> {
    let kind: TaskKind = task
        .trim()
        .parse()
        .map_err(|_| DispatchError::UnknownTask(task.to_string()))?;
    let payload = parse_payload(payload)?;
    tracing::debug!(task = %kind, "dispatching");

    let result = kind.run(ctx, &payload);
    let value = serde_json::to_value(&result).map_err(DispatchError::Serialize)?;
    Ok(validate(value)?)
}
