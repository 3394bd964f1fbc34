//! Integration tests for the switchboard-runner HTTP API.

use std::io::Write;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use switchboard_runner::model::descriptor;
use switchboard_runner::{api, AppState, ClassResolver, Config, ModelRegistry};

const MODELS_YAML: &str = r#"
models:
  - name: greeter
    class_path: demo.Greeter
    init_params:
      name: World
    functions: ["sayHello"]
  - name: text_processor
    class_path: demo.TextProcessor
    init_params:
      model_path: /path/to/model
      device: cpu
    functions: [process_text, summarize, translate]
  - name: ml_model
    class_path: demo.MLModel
    init_params:
      model_name: bert-base-uncased
    functions:
      predict: forward
      encode: encode_text
      classify: classify_text
  - name: broken
    class_path: demo.DoesNotExist
"#;

async fn create_test_app() -> Router {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(MODELS_YAML.as_bytes()).unwrap();

    let registry = Arc::new(ModelRegistry::new(ClassResolver::with_demo_models()));
    let descriptors = descriptor::load(file.path()).unwrap();
    let report = registry.register_all(descriptors).await;
    assert_eq!(report.failed.len(), 1);

    let state = Arc::new(AppState::new(&Config::default(), registry));
    api::app(state)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app().await;
    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["stage"], "development");
    assert_eq!(body["models"], 3);
    assert!(body["deployment_name"]
        .as_str()
        .unwrap()
        .starts_with("switchboard_"));
}

#[tokio::test]
async fn test_greeter_end_to_end() {
    let app = create_test_app().await;
    let (status, body) = send(
        &app,
        post_json(json!({
            "model": "greeter",
            "function": "sayHello",
            "parameters": {"name": "Ada"}
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "result": "Hello Ada",
            "model": "greeter",
            "function": "sayHello",
            "parameters": {"name": "Ada"}
        })
    );
}

#[tokio::test]
async fn test_renamed_function() {
    let app = create_test_app().await;
    let (_, body) = send(
        &app,
        post_json(json!({
            "model": "ml_model",
            "function": "predict",
            "parameters": {"input_data": "Sample input for ML model"}
        })),
    )
    .await;
    assert_eq!(body["result"], "ML prediction for: Sample input for ML model");

    // The underlying method name is not exposed.
    let (_, body) = send(
        &app,
        post_json(json!({"model": "ml_model", "function": "forward"})),
    )
    .await;
    assert_eq!(
        body["available_functions"],
        json!(["classify", "encode", "predict"])
    );
}

#[tokio::test]
async fn test_list_models_via_query() {
    let app = create_test_app().await;
    let (status, body) = send(&app, get("/?action=list_models")).await;

    assert_eq!(status, StatusCode::OK);
    let models = body["models"].as_object().unwrap();
    let mut names: Vec<&String> = models.keys().collect();
    names.sort();
    assert_eq!(names, vec!["greeter", "ml_model", "text_processor"]);
    assert_eq!(models["greeter"]["functions"], json!(["sayHello"]));
    assert_eq!(models["greeter"]["type"], "Greeter");
    assert_eq!(models["greeter"]["config"]["class_path"], "demo.Greeter");
}

#[tokio::test]
async fn test_invoke_via_query_parameters() {
    let app = create_test_app().await;
    let (_, body) = send(
        &app,
        get("/?model=text_processor&function=summarize&parameters%5Btext%5D=one%20two%20three&parameters%5Bmax_words%5D=2"),
    )
    .await;

    assert_eq!(body["result"], "Summary: one two");
    assert_eq!(body["parameters"]["max_words"], 2);
}

#[tokio::test]
async fn test_numeric_looking_text_via_query() {
    let app = create_test_app().await;
    let (_, body) = send(
        &app,
        get("/?model=text_processor&function=translate&parameters%5Btext%5D=2024"),
    )
    .await;
    assert_eq!(body["result"], "Translated to es: 2024");
    assert_eq!(body["parameters"]["text"], "2024");

    let (_, body) = send(
        &app,
        get("/?model=greeter&function=sayHello&parameters%5Bname%5D=42"),
    )
    .await;
    assert_eq!(body["result"], "Hello 42");
}

#[tokio::test]
async fn test_null_optional_parameter_uses_default() {
    let app = create_test_app().await;
    let (status, body) = send(
        &app,
        post_json(json!({
            "model": "text_processor",
            "function": "process_text",
            "parameters": {"text": "abc", "max_length": null}
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"], "Processed: abc");
    assert_eq!(body["parameters"], json!({"text": "abc", "max_length": null}));
}

#[tokio::test]
async fn test_function_signature_via_query() {
    let app = create_test_app().await;
    let (_, body) = send(
        &app,
        get("/?action=function_signature&model=text_processor&function=process_text"),
    )
    .await;

    assert_eq!(body["name"], "process_text");
    assert_eq!(body["parameters"], json!(["text", "max_length"]));
    assert_eq!(body["signature"], "(text: string, max_length: integer = 100)");
    assert_eq!(body["doc"], "Process text and return processed result");
}

#[tokio::test]
async fn test_signature_mismatch_never_fails_request() {
    let app = create_test_app().await;
    let (status, body) = send(
        &app,
        post_json(json!({
            "model": "text_processor",
            "function": "process_text",
            "parameters": {"txt": "typo"}
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Function signature mismatch:"));
    assert_eq!(
        body["expected_signature"],
        "(text: string, max_length: integer = 100)"
    );
    assert_eq!(body["provided_parameters"], json!({"txt": "typo"}));
}

#[tokio::test]
async fn test_malformed_body_is_structured() {
    let app = create_test_app().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/")
        .body(Body::from("{\"model\": "))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "DecodeError");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_v1_function_signature_endpoint() {
    let app = create_test_app().await;

    let (status, body) = send(&app, get("/v1/models/greeter/functions/sayHello")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["parameters"], json!(["name"]));

    let (status, body) = send(&app, get("/v1/models/greeter/functions/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], "function_not_found");

    let (status, body) = send(&app, get("/v1/models/nope/functions/sayHello")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Model 'nope' not found");
}

#[tokio::test]
async fn test_unregister_twice() {
    let app = create_test_app().await;
    let delete = || {
        Request::builder()
            .method(Method::DELETE)
            .uri("/v1/models/greeter")
            .body(Body::empty())
            .unwrap()
    };

    let (status, _) = send(&app, delete()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, delete()).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, get("/v1/models")).await;
    assert!(body["models"].get("greeter").is_none());
    assert!(body["models"].get("ml_model").is_some());

    let (_, body) = send(
        &app,
        post_json(json!({"model": "greeter", "function": "sayHello"})),
    )
    .await;
    assert_eq!(body["error"], "Model 'greeter' not found");
}
