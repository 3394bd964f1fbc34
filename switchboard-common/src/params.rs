//! Parameter descriptors for model constructors and exposed functions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type tag for a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    String,
    /// Whole numbers only.
    Integer,
    /// Any JSON number.
    Number,
    Boolean,
    Array,
    Object,
    /// Accepts every value, including null.
    Any,
}

impl ParamKind {
    /// Check whether a JSON value is acceptable for this kind.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            ParamKind::String => value.is_string(),
            ParamKind::Integer => value.is_i64() || value.is_u64(),
            ParamKind::Number => value.is_number(),
            ParamKind::Boolean => value.is_boolean(),
            ParamKind::Array => value.is_array(),
            ParamKind::Object => value.is_object(),
            ParamKind::Any => true,
        }
    }
}

impl std::fmt::Display for ParamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamKind::String => write!(f, "string"),
            ParamKind::Integer => write!(f, "integer"),
            ParamKind::Number => write!(f, "number"),
            ParamKind::Boolean => write!(f, "boolean"),
            ParamKind::Array => write!(f, "array"),
            ParamKind::Object => write!(f, "object"),
            ParamKind::Any => write!(f, "any"),
        }
    }
}

/// A single declared keyword parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    /// Whether the caller must provide this parameter.
    #[serde(default)]
    pub required: bool,
    /// Value used when an optional parameter is omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl ParamSpec {
    /// A parameter the caller must always provide.
    pub fn required(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            default: None,
        }
    }

    /// An optional parameter with no default; omitted means absent.
    pub fn optional(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: None,
        }
    }

    /// An optional parameter filled with `default` when omitted.
    pub fn with_default(name: impl Into<String>, kind: ParamKind, default: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: Some(default.into()),
        }
    }
}

impl std::fmt::Display for ParamSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.kind)?;
        match (&self.default, self.required) {
            (Some(default), _) => write!(f, " = {}", default),
            (None, false) => write!(f, " = null"),
            (None, true) => Ok(()),
        }
    }
}

/// Render a parameter list as a human-readable signature.
///
/// Example: `(text: string, max_length: integer = 100)`
pub fn render_signature(params: &[ParamSpec]) -> String {
    let rendered: Vec<String> = params.iter().map(ToString::to_string).collect();
    format!("({})", rendered.join(", "))
}
