//! Request dispatcher.
//!
//! Turns a generic [`DispatchRequest`] into a registry operation or a model
//! call, and every outcome into a [`DispatchResponse`]. Nothing a single
//! request does can escape as an error or a panic.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use switchboard_common::{
    Action, DecodeError, DispatchRequest, DispatchResponse, ErrorResponse, InvokeResponse,
};

use crate::model::signature::{self, SignatureMismatch};
use crate::model::{ModelError, ModelRegistry};

const SIGNATURE_ARGS_REQUIRED: &str =
    "Both 'model' and 'function' parameters required for function_signature action";

/// Stateless request handler over a shared registry.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<ModelRegistry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    /// Decode a JSON body and dispatch it.
    pub async fn dispatch_json(&self, body: &[u8]) -> DispatchResponse {
        match DispatchRequest::from_json(body) {
            Ok(request) => self.dispatch(request).await,
            Err(e) => decode_failure(e),
        }
    }

    /// Decode URL query pairs and dispatch them.
    pub async fn dispatch_query<I, K, V>(&self, pairs: I) -> DispatchResponse
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        match DispatchRequest::from_query_pairs(pairs) {
            Ok(request) => self.dispatch(request).await,
            Err(e) => decode_failure(e),
        }
    }

    /// Dispatch an already decoded request.
    pub async fn dispatch(&self, request: DispatchRequest) -> DispatchResponse {
        tracing::debug!(
            action = request.action().as_str(),
            model = ?request.model,
            function = ?request.function,
            "Dispatching request"
        );

        match request.action() {
            Action::ListModels => self.registry.list().await.into(),
            Action::FunctionSignature => match (request.model_name(), request.function_name()) {
                (Some(model), Some(function)) => {
                    match self.registry.function_signature(model, function).await {
                        Ok(signature) => signature.into(),
                        Err(e) => ErrorResponse::new(e.to_string()).into(),
                    }
                }
                _ => ErrorResponse::new(SIGNATURE_ARGS_REQUIRED).into(),
            },
            Action::Invoke => self.invoke(request).await,
        }
    }

    async fn invoke(&self, request: DispatchRequest) -> DispatchResponse {
        let Some(model_name) = request.model_name() else {
            return ErrorResponse::new("Model name is required")
                .with_available_models(self.registry.model_names().await)
                .into();
        };
        let Some(function_name) = request.function_name() else {
            return ErrorResponse::new("Function name is required").into();
        };

        let Some(entry) = self.registry.get(model_name).await else {
            return ErrorResponse::new(format!("Model '{}' not found", model_name))
                .with_available_models(self.registry.model_names().await)
                .into();
        };
        let Some(binding) = entry.function(function_name) else {
            return ErrorResponse::new(format!(
                "Function '{}' not found for model '{}'",
                function_name, model_name
            ))
            .with_available_functions(entry.function_names())
            .into();
        };

        let provided = signature::coerce_text(&binding.params, &request.parameters, &request.text_parameters);

        let mismatch = |cause: SignatureMismatch| -> DispatchResponse {
            tracing::debug!(model = model_name, function = function_name, "Signature mismatch: {}", cause);
            ErrorResponse::new(format!("Function signature mismatch: {}", cause))
                .with_signature(binding.signature(), provided.clone())
                .into()
        };

        let args = match signature::bind(&binding.params, &provided) {
            Ok(args) => args,
            Err(cause) => return mismatch(cause),
        };

        let outcome = AssertUnwindSafe(entry.invoke(binding, args))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(result)) => InvokeResponse {
                result,
                model: model_name.to_string(),
                function: function_name.to_string(),
                parameters: provided.clone(),
            }
            .into(),
            Ok(Err(ModelError::InvalidArguments(msg))) => mismatch(SignatureMismatch::Rejected(msg)),
            Ok(Err(e)) => {
                tracing::warn!(
                    model = model_name,
                    function = function_name,
                    kind = e.kind(),
                    "Model call failed: {}",
                    e
                );
                ErrorResponse::new(e.to_string()).with_type(e.kind()).into()
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(
                    model = model_name,
                    function = function_name,
                    "Model call panicked: {}",
                    message
                );
                ErrorResponse::new(message).with_type("Panic").into()
            }
        }
    }
}

fn decode_failure(e: DecodeError) -> DispatchResponse {
    tracing::debug!("Failed to decode request: {}", e);
    ErrorResponse::new(e.to_string()).with_type("DecodeError").into()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "model call panicked".to_string()
    }
}
