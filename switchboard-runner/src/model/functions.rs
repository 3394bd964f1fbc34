//! Exposed function tables.

use std::collections::BTreeMap;

use switchboard_common::{render_signature, FunctionSignature, ParamSpec};

use super::{FunctionSpec, MethodSpec, ModelObject};

/// Methods starting with this prefix are private to the model.
pub const PRIVATE_PREFIX: &str = "_";

const NO_DOCUMENTATION: &str = "No documentation available";

/// One externally callable function of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionBinding {
    /// Name callers use.
    pub exposed_name: String,
    /// Name of the model method that runs.
    pub method_name: String,
    pub params: Vec<ParamSpec>,
    pub doc: Option<String>,
}

impl FunctionBinding {
    fn new(exposed_name: &str, method: &MethodSpec) -> Self {
        Self {
            exposed_name: exposed_name.to_string(),
            method_name: method.name.clone(),
            params: method.params.clone(),
            doc: method.doc.clone(),
        }
    }

    /// Rendered parameter list, e.g. `(text: string, max_words: integer = 50)`.
    pub fn signature(&self) -> String {
        render_signature(&self.params)
    }

    pub fn parameter_names(&self) -> Vec<String> {
        self.params.iter().map(|p| p.name.clone()).collect()
    }

    /// Introspection view of this binding.
    pub fn describe(&self) -> FunctionSignature {
        FunctionSignature {
            name: self.exposed_name.clone(),
            signature: self.signature(),
            parameters: self.parameter_names(),
            doc: self
                .doc
                .clone()
                .unwrap_or_else(|| NO_DOCUMENTATION.to_string()),
        }
    }
}

/// A declared function the model does not provide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFunction {
    pub exposed_name: String,
    pub method_name: String,
}

impl std::fmt::Display for SkippedFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.exposed_name == self.method_name {
            write!(f, "{}", self.method_name)
        } else {
            write!(f, "{} -> {}", self.exposed_name, self.method_name)
        }
    }
}

/// Exposed name to binding, ordered by name.
pub type FunctionTable = BTreeMap<String, FunctionBinding>;

/// Build the exposed surface of `model` according to `spec`.
///
/// Declared functions the model does not advertise are left out of the table
/// and returned as skipped; they are never an error.
pub fn build(model: &dyn ModelObject, spec: &FunctionSpec) -> (FunctionTable, Vec<SkippedFunction>) {
    let methods: BTreeMap<String, MethodSpec> = model
        .methods()
        .into_iter()
        .map(|m| (m.name.clone(), m))
        .collect();

    let mut table = FunctionTable::new();
    let mut skipped = Vec::new();

    let mut bind = |exposed: &str, method_name: &str| match methods.get(method_name) {
        Some(method) => {
            table.insert(exposed.to_string(), FunctionBinding::new(exposed, method));
        }
        None => skipped.push(SkippedFunction {
            exposed_name: exposed.to_string(),
            method_name: method_name.to_string(),
        }),
    };

    match spec {
        FunctionSpec::ExplicitList(names) => {
            for name in names {
                bind(name, name);
            }
        }
        FunctionSpec::RenameMap(mapping) => {
            for (exposed, method_name) in mapping {
                bind(exposed, method_name);
            }
        }
        FunctionSpec::AutoDiscover => {
            for name in methods.keys().filter(|n| !n.starts_with(PRIVATE_PREFIX)) {
                bind(name, name);
            }
        }
    }

    (table, skipped)
}
