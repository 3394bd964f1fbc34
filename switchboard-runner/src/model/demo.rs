//! Bundled `demo` namespace.
//!
//! Small models used by the sample configuration and the tests:
//! `demo.Greeter`, `demo.TextProcessor` and `demo.MLModel`.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use switchboard_common::{ParamKind, ParamSpec};

use super::resolver::ClassResolver;
use super::{MethodSpec, ModelError, ModelFactory, ModelObject};

pub const NAMESPACE: &str = "demo";

/// Install every demo factory into `resolver`.
pub fn install(resolver: &mut ClassResolver) {
    resolver.register_factory(NAMESPACE, Arc::new(GreeterFactory));
    resolver.register_factory(NAMESPACE, Arc::new(TextProcessorFactory));
    resolver.register_factory(NAMESPACE, Arc::new(MLModelFactory));
}

fn str_arg<'a>(args: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    args.get(name).and_then(Value::as_str)
}

fn required_str<'a>(args: &'a Map<String, Value>, name: &str) -> Result<&'a str, ModelError> {
    str_arg(args, name)
        .ok_or_else(|| ModelError::InvalidArguments(format!("'{}' must be a string", name)))
}

fn required_count(args: &Map<String, Value>, name: &str) -> Result<usize, ModelError> {
    args.get(name)
        .and_then(Value::as_u64)
        .map(|n| n as usize)
        .ok_or_else(|| ModelError::InvalidArguments(format!("'{}' must be a non-negative integer", name)))
}

// ============================================================================
// Greeter
// ============================================================================

/// Greets people by name, falling back to the name it was built with.
pub struct Greeter {
    name: String,
}

impl Greeter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn greet(&self, salutation: &str, args: &Map<String, Value>) -> Value {
        let name = str_arg(args, "name")
            .filter(|n| !n.is_empty())
            .unwrap_or(self.name.as_str());
        Value::String(format!("{} {}", salutation, name))
    }
}

#[async_trait]
impl ModelObject for Greeter {
    fn type_name(&self) -> &str {
        "Greeter"
    }

    fn methods(&self) -> Vec<MethodSpec> {
        vec![
            MethodSpec::new("sayHello")
                .param(ParamSpec::optional("name", ParamKind::String))
                .doc("Say hello to a specific name or use the default name"),
            MethodSpec::new("sayGoodbye")
                .param(ParamSpec::optional("name", ParamKind::String))
                .doc("Say goodbye to a specific name or use the default name"),
            MethodSpec::new("getInfo").doc("Get information about the greeter"),
            MethodSpec::new("_template"),
        ]
    }

    async fn call(&self, method: &str, args: Map<String, Value>) -> Result<Value, ModelError> {
        match method {
            "sayHello" => Ok(self.greet("Hello", &args)),
            "sayGoodbye" => Ok(self.greet("Goodbye", &args)),
            "getInfo" => Ok(json!({
                "name": self.name,
                "type": "Greeter",
                "available_functions": ["sayHello", "sayGoodbye", "getInfo"],
            })),
            "_template" => Ok(Value::String("{salutation} {name}".to_string())),
            other => Err(ModelError::UnknownMethod(other.to_string())),
        }
    }
}

struct GreeterFactory;

impl ModelFactory for GreeterFactory {
    fn type_name(&self) -> &'static str {
        "Greeter"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::required("name", ParamKind::String)]
    }

    fn construct(&self, params: Map<String, Value>) -> Result<Box<dyn ModelObject>, ModelError> {
        Ok(Box::new(Greeter::new(required_str(&params, "name")?)))
    }
}

// ============================================================================
// TextProcessor
// ============================================================================

/// Mock text processing model.
pub struct TextProcessor {
    model_path: String,
    device: String,
}

#[async_trait]
impl ModelObject for TextProcessor {
    fn type_name(&self) -> &str {
        "TextProcessor"
    }

    fn methods(&self) -> Vec<MethodSpec> {
        vec![
            MethodSpec::new("process_text")
                .param(ParamSpec::required("text", ParamKind::String))
                .param(ParamSpec::with_default("max_length", ParamKind::Integer, 100))
                .doc("Process text and return processed result"),
            MethodSpec::new("summarize")
                .param(ParamSpec::required("text", ParamKind::String))
                .param(ParamSpec::with_default("max_words", ParamKind::Integer, 50))
                .doc("Summarize text"),
            MethodSpec::new("translate")
                .param(ParamSpec::required("text", ParamKind::String))
                .param(ParamSpec::with_default("target_language", ParamKind::String, "es"))
                .doc("Translate text (mock implementation)"),
        ]
    }

    async fn call(&self, method: &str, args: Map<String, Value>) -> Result<Value, ModelError> {
        tracing::trace!(model_path = %self.model_path, device = %self.device, method, "TextProcessor call");
        let text = required_str(&args, "text")?;
        match method {
            "process_text" => {
                let max_length = required_count(&args, "max_length")?;
                let truncated: String = text.chars().take(max_length).collect();
                Ok(Value::String(format!("Processed: {}", truncated)))
            }
            "summarize" => {
                let max_words = required_count(&args, "max_words")?;
                let summary: Vec<&str> = text.split_whitespace().take(max_words).collect();
                Ok(Value::String(format!("Summary: {}", summary.join(" "))))
            }
            "translate" => {
                let target = required_str(&args, "target_language")?;
                Ok(Value::String(format!("Translated to {}: {}", target, text)))
            }
            other => Err(ModelError::UnknownMethod(other.to_string())),
        }
    }
}

struct TextProcessorFactory;

impl ModelFactory for TextProcessorFactory {
    fn type_name(&self) -> &'static str {
        "TextProcessor"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("model_path", ParamKind::String),
            ParamSpec::with_default("device", ParamKind::String, "cpu"),
        ]
    }

    fn construct(&self, params: Map<String, Value>) -> Result<Box<dyn ModelObject>, ModelError> {
        let model_path = required_str(&params, "model_path")?.to_string();
        let device = required_str(&params, "device")?.to_string();
        tracing::info!("Initialized TextProcessor with model: {} on {}", model_path, device);
        Ok(Box::new(TextProcessor { model_path, device }))
    }
}

// ============================================================================
// MLModel
// ============================================================================

/// Mock ML model with prediction, encoding and classification.
pub struct MLModel {
    model_name: String,
    max_length: usize,
}

#[async_trait]
impl ModelObject for MLModel {
    fn type_name(&self) -> &str {
        "MLModel"
    }

    fn methods(&self) -> Vec<MethodSpec> {
        vec![
            MethodSpec::new("forward")
                .param(ParamSpec::required("input_data", ParamKind::String))
                .doc("Forward pass through the model"),
            MethodSpec::new("encode_text")
                .param(ParamSpec::required("text", ParamKind::String))
                .doc("Encode text to embeddings"),
            MethodSpec::new("classify_text")
                .param(ParamSpec::required("text", ParamKind::String))
                .param(ParamSpec::with_default("num_classes", ParamKind::Integer, 3))
                .doc("Classify text"),
        ]
    }

    async fn call(&self, method: &str, args: Map<String, Value>) -> Result<Value, ModelError> {
        match method {
            "forward" => {
                let input = required_str(&args, "input_data")?;
                Ok(Value::String(format!("ML prediction for: {}", input)))
            }
            "encode_text" => {
                let text = required_str(&args, "text")?;
                let encoded: String = text.chars().take(self.max_length).collect();
                Ok(Value::String(format!("Encoded: {}", encoded)))
            }
            "classify_text" => {
                let text = required_str(&args, "text")?;
                let num_classes = required_count(&args, "num_classes")?;
                if num_classes == 0 {
                    return Err(ModelError::failed("ValueError", "num_classes must be positive"));
                }
                let mut hasher = DefaultHasher::new();
                (&self.model_name, text).hash(&mut hasher);
                let class = hasher.finish() % num_classes as u64;
                Ok(Value::String(format!("Classification result: class_{}", class)))
            }
            other => Err(ModelError::UnknownMethod(other.to_string())),
        }
    }
}

struct MLModelFactory;

impl ModelFactory for MLModelFactory {
    fn type_name(&self) -> &'static str {
        "MLModel"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("model_name", ParamKind::String),
            ParamSpec::with_default("max_length", ParamKind::Integer, 512),
        ]
    }

    fn construct(&self, params: Map<String, Value>) -> Result<Box<dyn ModelObject>, ModelError> {
        let model_name = required_str(&params, "model_name")?.to_string();
        let max_length = required_count(&params, "max_length")?;
        if max_length == 0 {
            return Err(ModelError::failed("ValueError", "max_length must be positive"));
        }
        tracing::info!("Initialized MLModel: {}", model_name);
        Ok(Box::new(MLModel { model_name, max_length }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_greeter_uses_default_name() {
        let greeter = Greeter::new("World");
        let result = greeter.call("sayHello", Map::new()).await.unwrap();
        assert_eq!(result, json!("Hello World"));

        let result = greeter
            .call("sayGoodbye", args(json!({"name": "Ada"})))
            .await
            .unwrap();
        assert_eq!(result, json!("Goodbye Ada"));
    }

    #[tokio::test]
    async fn test_greeter_unknown_method() {
        let greeter = Greeter::new("World");
        let err = greeter.call("shout", Map::new()).await.unwrap_err();
        assert_eq!(err, ModelError::UnknownMethod("shout".into()));
    }

    #[tokio::test]
    async fn test_text_processor() {
        let model = TextProcessor {
            model_path: "/models/text".into(),
            device: "cpu".into(),
        };
        let result = model
            .call("summarize", args(json!({"text": "one two three four", "max_words": 2})))
            .await
            .unwrap();
        assert_eq!(result, json!("Summary: one two"));

        let result = model
            .call("process_text", args(json!({"text": "abcdef", "max_length": 3})))
            .await
            .unwrap();
        assert_eq!(result, json!("Processed: abc"));
    }

    #[tokio::test]
    async fn test_ml_model_classification_is_stable() {
        let model = MLModel {
            model_name: "bert".into(),
            max_length: 8,
        };
        let call = || model.call("classify_text", args(json!({"text": "great", "num_classes": 3})));
        let first = call().await.unwrap();
        let second = call().await.unwrap();
        assert_eq!(first, second);
        assert!(first.as_str().unwrap().starts_with("Classification result: class_"));

        let err = model
            .call("classify_text", args(json!({"text": "great", "num_classes": 0})))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "ValueError");
    }
}
