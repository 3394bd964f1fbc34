//! Dispatch protocol types.
//!
//! A request names an action, a model, a function and keyword parameters.
//! Every response is a single flat JSON object: successful invocations carry
//! `result`, failures carry `error` plus optional context fields, never both.
//!
//! # Actions
//!
//! - `list_models`: describe every registered model
//! - `function_signature`: describe one exposed function of one model
//! - anything else, or no action at all: invoke `model.function(**parameters)`
//!
//! # Query-string form
//!
//! Hosts that accept GET requests can decode the query string with
//! [`DispatchRequest::from_query_pairs`]. Parameters are given either as
//! `parameters[name]=value` pairs or as a JSON object in `parameters=`.
//! Bracketed values are kept as text and listed in
//! [`DispatchRequest::text_parameters`]; the receiver converts them once it
//! knows the declared kind of each parameter.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Action requested by a dispatch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ListModels,
    FunctionSignature,
    Invoke,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ListModels => "list_models",
            Action::FunctionSignature => "function_signature",
            Action::Invoke => "invoke",
        }
    }
}

/// Generic inbound request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    /// Keyword arguments; `null` is treated as no arguments.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub parameters: Map<String, Value>,
    /// Parameters whose value arrived as untyped text.
    #[serde(skip)]
    pub text_parameters: BTreeSet<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Failure to turn raw input into a [`DispatchRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError(pub String);

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for DecodeError {}

impl DispatchRequest {
    /// Build an invocation request.
    pub fn invoke(model: impl Into<String>, function: impl Into<String>, parameters: Map<String, Value>) -> Self {
        Self {
            action: None,
            model: Some(model.into()),
            function: Some(function.into()),
            parameters,
            text_parameters: BTreeSet::new(),
        }
    }

    /// Build a request for a non-invoke action.
    pub fn with_action(action: Action) -> Self {
        Self {
            action: Some(action.as_str().to_string()),
            ..Default::default()
        }
    }

    /// Decode a JSON body. The body must be a JSON object.
    pub fn from_json(body: &[u8]) -> Result<Self, DecodeError> {
        serde_json::from_slice(body).map_err(|e| DecodeError(e.to_string()))
    }

    /// Decode URL query pairs (already percent-decoded).
    ///
    /// `parameters[key]=value` pairs become string arguments and are recorded
    /// in `text_parameters`. A plain `parameters=` pair must hold a JSON
    /// object and is merged first, keeping its JSON types.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Result<Self, DecodeError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut request = DispatchRequest::default();
        let mut bracketed = Vec::new();

        for (key, value) in pairs {
            let (key, value) = (key.as_ref(), value.as_ref());
            match key {
                "action" => request.action = Some(value.to_string()),
                "model" => request.model = Some(value.to_string()),
                "function" => request.function = Some(value.to_string()),
                "parameters" => {
                    let parsed: Value = serde_json::from_str(value)
                        .map_err(|e| DecodeError(format!("invalid parameters: {}", e)))?;
                    match parsed {
                        Value::Object(map) => request.parameters.extend(map),
                        Value::Null => {}
                        other => {
                            return Err(DecodeError(format!(
                                "invalid parameters: expected a JSON object, got {}",
                                other
                            )))
                        }
                    }
                }
                _ => {
                    if let Some(name) = key
                        .strip_prefix("parameters[")
                        .and_then(|rest| rest.strip_suffix(']'))
                    {
                        if name.is_empty() {
                            return Err(DecodeError("empty parameter name in query".to_string()));
                        }
                        bracketed.push((name.to_string(), value.to_string()));
                    }
                    // Other query keys are ignored.
                }
            }
        }

        for (name, value) in bracketed {
            request.parameters.insert(name.clone(), Value::String(value));
            request.text_parameters.insert(name);
        }
        Ok(request)
    }

    /// The action this request asks for.
    pub fn action(&self) -> Action {
        match self.action.as_deref() {
            Some("list_models") => Action::ListModels,
            Some("function_signature") => Action::FunctionSignature,
            _ => Action::Invoke,
        }
    }

    /// Model name, treating an empty string as absent.
    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref().filter(|m| !m.is_empty())
    }

    /// Function name, treating an empty string as absent.
    pub fn function_name(&self) -> Option<&str> {
        self.function.as_deref().filter(|f| !f.is_empty())
    }
}

/// Any response produced by the dispatcher.
///
/// Serialized untagged, so the wire form is the flat object of the variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DispatchResponse {
    Error(ErrorResponse),
    Invoked(InvokeResponse),
    Signature(FunctionSignature),
    Models(ModelsResponse),
}

impl DispatchResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, DispatchResponse::Error(_))
    }
}

impl From<ErrorResponse> for DispatchResponse {
    fn from(e: ErrorResponse) -> Self {
        DispatchResponse::Error(e)
    }
}

impl From<InvokeResponse> for DispatchResponse {
    fn from(r: InvokeResponse) -> Self {
        DispatchResponse::Invoked(r)
    }
}

impl From<FunctionSignature> for DispatchResponse {
    fn from(s: FunctionSignature) -> Self {
        DispatchResponse::Signature(s)
    }
}

impl From<ModelsResponse> for DispatchResponse {
    fn from(m: ModelsResponse) -> Self {
        DispatchResponse::Models(m)
    }
}

/// Successful invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvokeResponse {
    pub result: Value,
    pub model: String,
    pub function: String,
    /// The parameters exactly as the caller provided them.
    pub parameters: Map<String, Value>,
}

/// Failure payload. Context fields are only present for the failures they
/// describe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Name of the failure kind, for decode errors and model failures.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_models: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_functions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provided_parameters: Option<Map<String, Value>>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, error_type: impl Into<String>) -> Self {
        self.error_type = Some(error_type.into());
        self
    }

    pub fn with_available_models(mut self, models: Vec<String>) -> Self {
        self.available_models = Some(models);
        self
    }

    pub fn with_available_functions(mut self, functions: Vec<String>) -> Self {
        self.available_functions = Some(functions);
        self
    }

    pub fn with_signature(mut self, expected: impl Into<String>, provided: Map<String, Value>) -> Self {
        self.expected_signature = Some(expected.into());
        self.provided_parameters = Some(provided);
        self
    }
}

/// Introspection result for one exposed function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSignature {
    pub name: String,
    /// Rendered form, e.g. `(text: string, max_length: integer = 100)`.
    pub signature: String,
    /// Declared parameter names in order.
    pub parameters: Vec<String>,
    pub doc: String,
}

/// Response to `list_models`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub models: BTreeMap<String, ModelSummary>,
}

/// Listing entry for one registered model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    /// Type name of the hosted model object.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Exposed function names.
    pub functions: Vec<String>,
    /// Originating descriptor, or an empty object for programmatic registration.
    pub config: Value,
    pub registered_at: DateTime<Utc>,
    /// Declared functions that were dropped because the model lacks them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_functions: Vec<String>,
}
