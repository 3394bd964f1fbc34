//! Model registry for hosting multiple models behind one dispatcher.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use switchboard_common::{FunctionSignature, ModelSummary, ModelsResponse};
use tokio::sync::RwLock;

use super::functions::{self, FunctionBinding, FunctionTable, SkippedFunction};
use super::resolver::ClassResolver;
use super::{FunctionSpec, ModelDescriptor, ModelError, ModelObject};
use crate::error::{Error, Result};

/// A registered model with its exposed functions.
///
/// Entries are immutable; re-registering a name swaps in a new entry.
pub struct ModelEntry {
    model: Box<dyn ModelObject>,
    functions: FunctionTable,
    descriptor: Option<ModelDescriptor>,
    skipped: Vec<SkippedFunction>,
    registered_at: DateTime<Utc>,
}

impl ModelEntry {
    pub fn type_name(&self) -> &str {
        self.model.type_name()
    }

    pub fn function(&self, exposed_name: &str) -> Option<&FunctionBinding> {
        self.functions.get(exposed_name)
    }

    /// Exposed function names, sorted.
    pub fn function_names(&self) -> Vec<String> {
        self.functions.keys().cloned().collect()
    }

    /// Descriptor the entry was built from, if it came from configuration.
    pub fn descriptor(&self) -> Option<&ModelDescriptor> {
        self.descriptor.as_ref()
    }

    pub fn skipped(&self) -> &[SkippedFunction] {
        &self.skipped
    }

    /// Run the method behind `binding` with already bound arguments.
    pub async fn invoke(&self, binding: &FunctionBinding, args: Map<String, Value>) -> std::result::Result<Value, ModelError> {
        self.model.call(&binding.method_name, args).await
    }

    fn summary(&self) -> ModelSummary {
        ModelSummary {
            type_name: self.type_name().to_string(),
            functions: self.function_names(),
            config: self
                .descriptor
                .as_ref()
                .map(ModelDescriptor::to_value)
                .unwrap_or_else(|| Value::Object(Map::new())),
            registered_at: self.registered_at,
            skipped_functions: self.skipped.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Outcome of registering a batch of descriptors.
#[derive(Debug, Default)]
pub struct RegistrationReport {
    /// Names registered successfully, in input order.
    pub registered: Vec<String>,
    /// Models that could not be constructed.
    pub failed: Vec<(String, Error)>,
}

/// Registry of all servable models.
///
/// Lookups hand out `Arc<ModelEntry>` snapshots, so a caller keeps using the
/// entry it looked up even if the name is replaced or removed meanwhile.
pub struct ModelRegistry {
    resolver: ClassResolver,
    entries: RwLock<HashMap<String, Arc<ModelEntry>>>,
}

impl ModelRegistry {
    pub fn new(resolver: ClassResolver) -> Self {
        Self {
            resolver,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Construct the model described by `descriptor` and register it under
    /// `descriptor.name`, replacing any previous entry.
    pub async fn register_from_config(&self, descriptor: ModelDescriptor) -> Result<Vec<SkippedFunction>> {
        let model = self
            .resolver
            .resolve(&descriptor.class_path, &descriptor.init_params)?;
        let name = descriptor.name.clone();
        let spec = descriptor.functions.clone();
        Ok(self.insert(name, model, &spec, Some(descriptor)).await)
    }

    /// Register an already constructed model, replacing any previous entry.
    ///
    /// Returns the declared functions that were dropped.
    pub async fn register(
        &self,
        name: impl Into<String>,
        model: Box<dyn ModelObject>,
        spec: FunctionSpec,
    ) -> Vec<SkippedFunction> {
        self.insert(name.into(), model, &spec, None).await
    }

    /// Register every descriptor. A model that fails to resolve is logged and
    /// reported; the others are still registered.
    pub async fn register_all(&self, descriptors: Vec<ModelDescriptor>) -> RegistrationReport {
        let mut report = RegistrationReport::default();
        for descriptor in descriptors {
            let name = descriptor.name.clone();
            match self.register_from_config(descriptor).await {
                Ok(_) => report.registered.push(name),
                Err(e) => {
                    tracing::error!(model = %name, "Failed to register model: {}", e);
                    report.failed.push((name, e));
                }
            }
        }
        report
    }

    async fn insert(
        &self,
        name: String,
        model: Box<dyn ModelObject>,
        spec: &FunctionSpec,
        descriptor: Option<ModelDescriptor>,
    ) -> Vec<SkippedFunction> {
        // Build the whole entry before taking the write lock.
        let (functions, skipped) = functions::build(model.as_ref(), spec);

        for skip in &skipped {
            tracing::warn!(
                model = %name,
                function = %skip.exposed_name,
                method = %skip.method_name,
                "Declared function not provided by model, skipping"
            );
        }

        let entry = Arc::new(ModelEntry {
            model,
            functions,
            descriptor,
            skipped: skipped.clone(),
            registered_at: Utc::now(),
        });

        tracing::info!(
            model = %name,
            model_type = entry.type_name(),
            functions = ?entry.function_names(),
            "Registered model"
        );

        let replaced = self.entries.write().await.insert(name.clone(), entry);
        if replaced.is_some() {
            tracing::info!(model = %name, "Replaced previously registered model");
        }

        skipped
    }

    /// Remove a model. Removing an unknown name is a no-op.
    ///
    /// Returns whether an entry was removed.
    pub async fn unregister(&self, name: &str) -> bool {
        let removed = self.entries.write().await.remove(name).is_some();
        if removed {
            tracing::info!(model = %name, "Unregistered model");
        }
        removed
    }

    /// Get a model entry by name.
    pub async fn get(&self, name: &str) -> Option<Arc<ModelEntry>> {
        self.entries.read().await.get(name).cloned()
    }

    /// Registered model names, sorted.
    pub async fn model_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Describe every registered model.
    pub async fn list(&self) -> ModelsResponse {
        let entries = self.entries.read().await;
        let models: BTreeMap<String, ModelSummary> = entries
            .iter()
            .map(|(name, entry)| (name.clone(), entry.summary()))
            .collect();
        ModelsResponse { models }
    }

    /// Describe one exposed function.
    pub async fn function_signature(&self, model: &str, function: &str) -> Result<FunctionSignature> {
        let entry = self
            .get(model)
            .await
            .ok_or_else(|| Error::ModelNotFound(model.to_string()))?;
        let binding = entry.function(function).ok_or_else(|| Error::FunctionNotFound {
            model: model.to_string(),
            function: function.to_string(),
        })?;
        Ok(binding.describe())
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new(ClassResolver::with_demo_models())
    }
}
