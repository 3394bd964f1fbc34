//! Model hosting layer.
//!
//! This module defines the `ModelObject` capability trait that every hosted
//! model implements, and the `ModelFactory` trait used to construct models
//! from declarative configuration. Models are opaque to the rest of the
//! runner: only their advertised methods are ever touched.

pub mod demo;
pub mod descriptor;
pub mod functions;
mod registry;
pub mod resolver;
pub mod signature;

pub use descriptor::{FunctionSpec, ModelDescriptor};
pub use functions::{FunctionBinding, FunctionTable, SkippedFunction};
pub use registry::{ModelEntry, ModelRegistry, RegistrationReport};
pub use resolver::{ClassResolver, ResolutionCause, ResolutionError};
pub use signature::SignatureMismatch;

use async_trait::async_trait;
use serde_json::{Map, Value};
use switchboard_common::ParamSpec;

/// Description of one callable advertised by a model.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSpec {
    pub name: String,
    /// Declared keyword parameters, in order.
    pub params: Vec<ParamSpec>,
    pub doc: Option<String>,
}

impl MethodSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            doc: None,
        }
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }
}

/// Failure raised by a model while constructing or running a method.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    /// Arguments were well-formed but rejected by the model.
    #[error("{0}")]
    InvalidArguments(String),

    /// The method ran and failed.
    #[error("{message}")]
    Failed { kind: String, message: String },

    /// The model was asked for a method it does not handle.
    #[error("Unknown method '{0}'")]
    UnknownMethod(String),
}

impl ModelError {
    pub fn failed(kind: impl Into<String>, message: impl Into<String>) -> Self {
        ModelError::Failed {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Name of the failure kind, reported to callers as `type`.
    pub fn kind(&self) -> &str {
        match self {
            ModelError::InvalidArguments(_) => "InvalidArguments",
            ModelError::Failed { kind, .. } => kind,
            ModelError::UnknownMethod(_) => "UnknownMethod",
        }
    }
}

/// Capability every hosted model provides.
///
/// `methods` is the full callable surface the model is willing to expose,
/// including names starting with `_` which are treated as private by
/// auto-discovery. `call` receives arguments that were already validated
/// against the advertised parameters, with defaults filled in.
#[async_trait]
pub trait ModelObject: Send + Sync {
    /// Type name shown in model listings (e.g., "Greeter").
    fn type_name(&self) -> &str;

    /// Methods this model can run.
    fn methods(&self) -> Vec<MethodSpec>;

    /// Run a method with keyword arguments.
    async fn call(&self, method: &str, args: Map<String, Value>) -> Result<Value, ModelError>;
}

/// Constructor for a model type, registered in a [`ClassResolver`] catalog.
pub trait ModelFactory: Send + Sync {
    /// Symbol name under which the factory is resolved (e.g., "Greeter").
    fn type_name(&self) -> &'static str;

    /// Declared constructor parameters.
    fn parameters(&self) -> Vec<ParamSpec>;

    /// Build a model from validated constructor parameters.
    fn construct(&self, params: Map<String, Value>) -> Result<Box<dyn ModelObject>, ModelError>;
}
