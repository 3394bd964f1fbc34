//! Declarative model descriptors and the YAML document they are loaded from.
//!
//! ```yaml
//! models:
//!   - name: greeter
//!     class_path: demo.Greeter
//!     init_params: { name: World }
//!     functions: [sayHello]
//!   - name: ml_model
//!     class_path: demo.MLModel
//!     init_params: { model_name: bert-base-uncased }
//!     functions: { predict: forward, classify: classify_text }
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Which of a model's methods are exposed, and under which names.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FunctionSpec {
    /// Expose these methods under their own names.
    ExplicitList(Vec<String>),
    /// Expose `method` under `exposed` for each `exposed: method` pair.
    RenameMap(BTreeMap<String, String>),
    /// Expose every public method the model advertises.
    #[default]
    AutoDiscover,
}

impl FunctionSpec {
    pub fn is_auto_discover(&self) -> bool {
        matches!(self, FunctionSpec::AutoDiscover)
    }

    /// Build an explicit list, dropping repeated names.
    pub fn list<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let names = names
            .into_iter()
            .map(Into::into)
            .filter(|name: &String| seen.insert(name.clone()))
            .collect();
        FunctionSpec::ExplicitList(names)
    }

    /// Build a rename map from `(exposed, method)` pairs.
    pub fn rename<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        FunctionSpec::RenameMap(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// How to construct and expose one model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelDescriptor {
    pub name: String,
    /// `namespace.Symbol` reference resolved by the [`ClassResolver`](super::ClassResolver).
    pub class_path: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub init_params: Map<String, Value>,
    #[serde(skip_serializing_if = "FunctionSpec::is_auto_discover")]
    pub functions: FunctionSpec,
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>, class_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            class_path: class_path.into(),
            init_params: Map::new(),
            functions: FunctionSpec::AutoDiscover,
        }
    }

    pub fn with_init_params(mut self, init_params: Map<String, Value>) -> Self {
        self.init_params = init_params;
        self
    }

    pub fn with_functions(mut self, functions: FunctionSpec) -> Self {
        self.functions = functions;
        self
    }

    /// JSON form used in model listings.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }
}

#[derive(Debug, Deserialize)]
struct ModelDocument {
    #[serde(default)]
    models: Option<Vec<RawDescriptor>>,
}

#[derive(Debug, Deserialize)]
struct RawDescriptor {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "class_ref")]
    class_path: Option<String>,
    #[serde(default)]
    init_params: Option<Map<String, Value>>,
    #[serde(default)]
    functions: Option<FunctionSpec>,
}

/// Load descriptors from a YAML file.
pub fn load(path: impl AsRef<Path>) -> Result<Vec<ModelDescriptor>> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.display().to_string(),
        source,
    })?;
    parse_document(&text, &path.display().to_string())
}

/// Parse descriptors from YAML text.
pub fn parse(text: &str) -> Result<Vec<ModelDescriptor>> {
    parse_document(text, "<inline>")
}

fn parse_document(text: &str, origin: &str) -> Result<Vec<ModelDescriptor>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let document: ModelDocument = serde_yaml::from_str(text).map_err(|e| Error::ConfigParse {
        path: origin.to_string(),
        message: e.to_string(),
    })?;

    let mut seen = HashSet::new();
    let mut descriptors = Vec::new();

    for (index, raw) in document.models.unwrap_or_default().into_iter().enumerate() {
        let name = required_field(raw.name, index, "name")?;
        let class_path = required_field(raw.class_path, index, "class_path")?;

        if !seen.insert(name.clone()) {
            return Err(Error::ConfigSchema(format!(
                "models[{}]: duplicate model name '{}'",
                index, name
            )));
        }

        let functions = match raw.functions {
            Some(FunctionSpec::ExplicitList(names)) => FunctionSpec::list(names),
            Some(spec) => spec,
            None => FunctionSpec::AutoDiscover,
        };

        descriptors.push(ModelDescriptor {
            name,
            class_path,
            init_params: raw.init_params.unwrap_or_default(),
            functions,
        });
    }

    Ok(descriptors)
}

fn required_field(value: Option<String>, index: usize, field: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(Error::ConfigSchema(format!(
            "models[{}]: missing required field '{}'",
            index, field
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_parse_all_function_forms() {
        let yaml = r#"
models:
  - name: greeter
    class_path: demo.Greeter
    init_params:
      name: World
    functions: [sayHello, sayHello, getInfo]
  - name: ml_model
    class_path: demo.MLModel
    functions:
      predict: forward
      classify: classify_text
  - name: text_processor
    class_ref: demo.TextProcessor
"#;
        let descriptors = parse(yaml).unwrap();
        assert_eq!(descriptors.len(), 3);

        assert_eq!(descriptors[0].init_params["name"], json!("World"));
        assert_eq!(
            descriptors[0].functions,
            FunctionSpec::ExplicitList(vec!["sayHello".into(), "getInfo".into()])
        );
        assert_eq!(
            descriptors[1].functions,
            FunctionSpec::rename([("predict", "forward"), ("classify", "classify_text")])
        );
        assert_eq!(descriptors[2].class_path, "demo.TextProcessor");
        assert!(descriptors[2].functions.is_auto_discover());
        assert!(descriptors[2].init_params.is_empty());
    }

    #[test]
    fn test_missing_name_is_schema_error() {
        let yaml = "models:\n  - class_path: demo.Greeter\n";
        let err = parse(yaml).unwrap_err();
        assert!(matches!(err, Error::ConfigSchema(_)));
        assert!(err.to_string().contains("'name'"));
    }

    #[test]
    fn test_missing_class_path_is_schema_error() {
        let yaml = "models:\n  - name: greeter\n    class_path: \"\"\n";
        let err = parse(yaml).unwrap_err();
        assert!(matches!(err, Error::ConfigSchema(_)));
        assert!(err.to_string().contains("class_path"));
    }

    #[test]
    fn test_duplicate_name_is_schema_error() {
        let yaml = r#"
models:
  - name: a
    class_path: demo.Greeter
  - name: a
    class_path: demo.MLModel
"#;
        let err = parse(yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate model name 'a'"));
    }

    #[test]
    fn test_malformed_yaml_is_parse_error() {
        let err = parse("models: [ {name: a").unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));

        let err = parse("models:\n  - name: a\n    class_path: x.Y\n    functions: 5\n").unwrap_err();
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_empty_document() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("models: []").unwrap().is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "models:\n  - name: greeter\n    class_path: demo.Greeter").unwrap();

        let descriptors = load(file.path()).unwrap();
        assert_eq!(descriptors[0].name, "greeter");

        let err = load("/definitely/not/here.yml").unwrap_err();
        assert!(matches!(err, Error::ConfigRead { .. }));
    }

    #[test]
    fn test_descriptor_listing_form() {
        let descriptor = ModelDescriptor::new("greeter", "demo.Greeter")
            .with_functions(FunctionSpec::list(["sayHello"]));
        assert_eq!(
            descriptor.to_value(),
            json!({"name": "greeter", "class_path": "demo.Greeter", "functions": ["sayHello"]})
        );
    }
}
