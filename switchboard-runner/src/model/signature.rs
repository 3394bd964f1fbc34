//! Keyword argument binding against declared parameters.

use std::collections::BTreeSet;

use serde_json::{Map, Value};
use switchboard_common::{ParamKind, ParamSpec};

/// Provided keyword arguments do not fit a declared parameter list.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SignatureMismatch {
    #[error("unexpected keyword argument '{0}'")]
    Unexpected(String),

    #[error("missing required argument '{0}'")]
    Missing(String),

    #[error("argument '{name}' expects {expected}, got {actual}")]
    WrongKind {
        name: String,
        expected: ParamKind,
        actual: &'static str,
    },

    /// The callee itself rejected the arguments.
    #[error("{0}")]
    Rejected(String),
}

/// Check `provided` against `params` and return the arguments to pass on,
/// with defaults of omitted optional parameters filled in.
///
/// Optional parameters accept `null`, which stands for the declared default
/// when there is one. Unknown names are reported before missing ones.
pub fn bind(params: &[ParamSpec], provided: &Map<String, Value>) -> Result<Map<String, Value>, SignatureMismatch> {
    if let Some(unknown) = provided
        .keys()
        .find(|key| !params.iter().any(|p| &p.name == *key))
    {
        return Err(SignatureMismatch::Unexpected(unknown.clone()));
    }

    let mut bound = Map::new();
    for param in params {
        match provided.get(&param.name) {
            Some(Value::Null) if !param.required => {
                let value = param.default.clone().unwrap_or(Value::Null);
                bound.insert(param.name.clone(), value);
            }
            Some(value) => {
                if !param.kind.accepts(value) {
                    return Err(SignatureMismatch::WrongKind {
                        name: param.name.clone(),
                        expected: param.kind,
                        actual: value_kind(value),
                    });
                }
                bound.insert(param.name.clone(), value.clone());
            }
            None if param.required => return Err(SignatureMismatch::Missing(param.name.clone())),
            None => {
                if let Some(default) = &param.default {
                    bound.insert(param.name.clone(), default.clone());
                }
            }
        }
    }

    Ok(bound)
}

/// Convert arguments that arrived as untyped text to the declared kind of
/// their parameter.
///
/// Only names in `text` are touched. Text meant for a `string` or `any`
/// parameter is left alone, and text that does not parse as the declared
/// kind stays a string so [`bind`] reports the mismatch.
pub fn coerce_text(
    params: &[ParamSpec],
    provided: &Map<String, Value>,
    text: &BTreeSet<String>,
) -> Map<String, Value> {
    provided
        .iter()
        .map(|(name, value)| {
            let kind = params.iter().find(|p| &p.name == name).map(|p| p.kind);
            let value = match (value, kind) {
                (Value::String(raw), Some(kind)) if text.contains(name) => {
                    parse_text(kind, raw).unwrap_or_else(|| value.clone())
                }
                _ => value.clone(),
            };
            (name.clone(), value)
        })
        .collect()
}

fn parse_text(kind: ParamKind, raw: &str) -> Option<Value> {
    match kind {
        ParamKind::String | ParamKind::Any => None,
        _ => serde_json::from_str::<Value>(raw)
            .ok()
            .filter(|value| value.is_null() || kind.accepts(value)),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
