//! Structural validation of handler results.

use serde_json::{Value, json};
use thiserror::Error;

/// Why a handler result was rejected.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("result must be a JSON object")]
    NotAnObject,

    #[error("missing field {0}")]
    MissingField(&'static str),

    #[error("{field} must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

/// Check the agent-result contract, defaulting `artifacts` and
/// `next_actions` to empty lists when absent.
pub fn validate(value: Value) -> Result<Value, ValidationError> {
    let Value::Object(mut map) = value else {
        return Err(ValidationError::NotAnObject);
    };

    match map.get("ok") {
        None => return Err(ValidationError::MissingField("ok")),
        Some(Value::Bool(_)) => {}
        Some(_) => {
            return Err(ValidationError::WrongType {
                field: "ok",
                expected: "boolean",
            });
        }
    }
    match map.get("summary") {
        None => return Err(ValidationError::MissingField("summary")),
        Some(Value::String(_)) => {}
        Some(_) => {
            return Err(ValidationError::WrongType {
                field: "summary",
                expected: "a string",
            });
        }
    }
    for field in ["artifacts", "next_actions"] {
        match map.get(field) {
            None => {
                map.insert(field.to_string(), json!([]));
            }
            Some(Value::Array(_)) => {}
            Some(_) => {
                return Err(ValidationError::WrongType {
                    field,
                    expected: "an array",
                });
            }
        }
    }
    Ok(Value::Object(map))
}
