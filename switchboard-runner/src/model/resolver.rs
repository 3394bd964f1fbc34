//! Class path resolution.
//!
//! A class path such as `demo.Greeter` names a namespace and a symbol within
//! it. Only factories registered in the resolver's catalog can be
//! constructed; configuration can never reach any other code.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::signature::{self, SignatureMismatch};
use super::{ModelError, ModelFactory, ModelObject};

/// Failure to turn a class path into a live model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Failed to import and instantiate {class_path}: {cause}")]
pub struct ResolutionError {
    pub class_path: String,
    pub cause: ResolutionCause,
}

/// Why a class path could not be resolved.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolutionCause {
    #[error("class path must have the form 'namespace.Symbol'")]
    InvalidPath,

    #[error("namespace '{0}' not found")]
    NamespaceNotFound(String),

    #[error("symbol '{symbol}' not found in namespace '{namespace}'")]
    SymbolNotFound { namespace: String, symbol: String },

    #[error("invalid constructor parameters: {0}")]
    InvalidParameters(SignatureMismatch),

    #[error("constructor failed: {0}")]
    ConstructorFailed(ModelError),
}

/// Catalog of model factories addressable by class path.
#[derive(Default)]
pub struct ClassResolver {
    namespaces: HashMap<String, HashMap<String, Arc<dyn ModelFactory>>>,
}

impl ClassResolver {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog holding the bundled `demo` namespace.
    pub fn with_demo_models() -> Self {
        let mut resolver = Self::new();
        super::demo::install(&mut resolver);
        resolver
    }

    /// Make `factory` resolvable as `<namespace>.<factory.type_name()>`.
    ///
    /// Registering the same path twice replaces the earlier factory.
    pub fn register_factory(&mut self, namespace: &str, factory: Arc<dyn ModelFactory>) {
        let symbol = factory.type_name().to_string();
        tracing::debug!("Registered factory {}.{}", namespace, symbol);
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(symbol, factory);
    }

    /// All resolvable class paths, sorted.
    pub fn class_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .namespaces
            .iter()
            .flat_map(|(ns, symbols)| symbols.keys().map(move |s| format!("{}.{}", ns, s)))
            .collect();
        paths.sort();
        paths
    }

    /// Resolve `class_path` and construct a model with `init_params`.
    pub fn resolve(
        &self,
        class_path: &str,
        init_params: &Map<String, Value>,
    ) -> Result<Box<dyn ModelObject>, ResolutionError> {
        let fail = |cause| ResolutionError {
            class_path: class_path.to_string(),
            cause,
        };

        let (namespace, symbol) = class_path
            .rsplit_once('.')
            .filter(|(ns, sym)| !ns.is_empty() && !sym.is_empty())
            .ok_or_else(|| fail(ResolutionCause::InvalidPath))?;

        let symbols = self
            .namespaces
            .get(namespace)
            .ok_or_else(|| fail(ResolutionCause::NamespaceNotFound(namespace.to_string())))?;

        let factory = symbols.get(symbol).ok_or_else(|| {
            fail(ResolutionCause::SymbolNotFound {
                namespace: namespace.to_string(),
                symbol: symbol.to_string(),
            })
        })?;

        let params = signature::bind(&factory.parameters(), init_params)
            .map_err(|e| fail(ResolutionCause::InvalidParameters(e)))?;

        factory.construct(params).map_err(|e| match e {
            ModelError::InvalidArguments(msg) => {
                fail(ResolutionCause::InvalidParameters(SignatureMismatch::Rejected(msg)))
            }
            other => fail(ResolutionCause::ConstructorFailed(other)),
        })
    }
}
