use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::io::{Cursor, Read};
use std::sync::Arc;
use tower::ServiceExt;

use tm_analyzer::{
    analysis::{LanguageModel, prompt::PairPrompt},
    config::Config,
    errors::{InstructionError, InstructionResult, LlmError, LlmResult},
    instructions::DocumentSource,
    web::{AppState, WebServer},
};

/// Instruction host that is never reachable
struct OfflineSource;

#[async_trait]
impl DocumentSource for OfflineSource {
    async fn fetch_text(&self, url: &str) -> InstructionResult<String> {
        Err(InstructionError::fetch(url, "connection refused"))
    }
}

/// Model that answers every prompt with the same reply (or fails)
struct CannedModel(Option<String>);

#[async_trait]
impl LanguageModel for CannedModel {
    async fn complete(&self, _prompt: &PairPrompt) -> LlmResult<String> {
        self.0.clone().ok_or(LlmError::MissingCredential)
    }
}

fn app_with(model: CannedModel) -> Router {
    let state = AppState::new(Config::default(), Arc::new(OfflineSource), Arc::new(model))
        .expect("state builds from default config");
    WebServer::create_router(state)
}

fn failing_app() -> Router {
    app_with(CannedModel(None))
}

fn scored_reply(risk: u8) -> String {
    json!({
        "identical_test": {"is_identical": false, "percentage": 10, "details": "Не тотожні"},
        "similarity_analysis": {
            "phonetic": {"percentage": 70, "details": "Співзвучні"},
            "graphic": {"percentage": 40, "details": "Різне написання"},
            "semantic": {"percentage": 20, "details": "Різний зміст"},
            "visual": {"percentage": 0, "details": "Зображення відсутні"}
        },
        "goods_services_relation": {"are_related": true, "details": "Клас 30 збігається"},
        "overall_risk": risk,
        "confusion_likelihood": "середня",
        "recommendations": ["Змінити назву"]
    })
    .to_string()
}

fn analyze_body() -> Value {
    json!({
        "desired_trademark": {
            "name": "СОНЯШНИК",
            "description": "Олія соняшникова",
            "classes": "29, 30"
        },
        "existing_trademarks": [{
            "application_number": "m202400123",
            "owner": "ТОВ \"Сонях\"",
            "name": "СОНЯХ",
            "classes": "30"
        }]
    })
}

// Helper function to send requests to the app
async fn send_request(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request_builder = Request::builder().method(method).uri(uri);

    let request = if let Some(body) = body {
        request_builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap()
    } else {
        request_builder.body(Body::empty()).unwrap()
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json: Value = if body_bytes.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(json!({}))
    };

    (status, json)
}

async fn fetch_raw(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn analysis_id(app: &Router) -> String {
    let (status, report) =
        send_request(app, Method::POST, "/api/analyze", Some(analyze_body())).await;
    assert_eq!(status, StatusCode::OK);
    report["analysis_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_analyze_with_failing_model_returns_default_records() {
    let app = failing_app();

    let (status, report) =
        send_request(&app, Method::POST, "/api/analyze", Some(analyze_body())).await;

    assert_eq!(status, StatusCode::OK);
    let results = report["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["overall_risk"], 0);
    assert_eq!(results[0]["confusion_likelihood"], "невідомо");
    assert_eq!(results[0]["trademark_info"]["application_number"], "m202400123");
    for dimension in ["phonetic", "graphic", "semantic", "visual"] {
        let score = &results[0]["similarity_analysis"][dimension];
        assert!(score.is_object(), "missing {dimension}");
        assert_eq!(score["percentage"], 0);
    }
    assert!(results[0]["identical_test"].is_object());
    assert!(results[0]["goods_services_relation"].is_object());
    assert_eq!(results[0]["recommendations"].as_array().unwrap().len(), 2);
    assert_eq!(report["overall_chance"], 95);
    assert!(!report["analysis_id"].as_str().unwrap().is_empty());
    assert!(report["analysis_date"].is_string());
}

#[tokio::test]
async fn test_analyze_uses_model_scores() {
    let app = app_with(CannedModel(Some(format!("```json\n{}\n```", scored_reply(65)))));

    let (status, report) =
        send_request(&app, Method::POST, "/api/analyze", Some(analyze_body())).await;

    assert_eq!(status, StatusCode::OK);
    let result = &report["results"][0];
    assert_eq!(result["overall_risk"], 65);
    assert_eq!(result["similarity_analysis"]["phonetic"]["percentage"], 70);
    assert_eq!(result["goods_services_relation"]["are_related"], true);
    assert_eq!(result["trademark_info"]["name"], "СОНЯХ");
    assert_eq!(report["overall_chance"], 30);
}

#[tokio::test]
async fn test_analyze_without_existing_trademarks() {
    let app = failing_app();
    let body = json!({
        "desired_trademark": {"name": "НОВА", "description": "", "classes": "9"},
        "existing_trademarks": []
    });

    let (status, report) = send_request(&app, Method::POST, "/api/analyze", Some(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["results"], json!([]));
    assert_eq!(report["overall_chance"], 95);
}

#[tokio::test]
async fn test_analyze_rejects_blank_name() {
    let app = failing_app();
    let mut body = analyze_body();
    body["desired_trademark"]["name"] = json!("   ");

    let (status, response) = send_request(&app, Method::POST, "/api/analyze", Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"].as_str().unwrap().contains("name"));
}

#[tokio::test]
async fn test_analyze_rejects_malformed_json() {
    let app = failing_app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/analyze")
        .header("content-type", "application/json")
        .body(Body::from("{\"desired_trademark\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_export_docx_contains_report() {
    let app = failing_app();
    let id = analysis_id(&app).await;

    let response = fetch_raw(&app, &format!("/api/export/docx/{id}")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment"));
    assert!(disposition.contains(&format!("trademark_analysis_{id}.docx")));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
    let mut document = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut document)
        .unwrap();
    assert!(document.contains("СОНЯХ"));
    assert!(document.contains("m202400123"));
    // owner quotes are XML-escaped
    assert!(document.contains("ТОВ &quot;Сонях&quot;"));
}

#[tokio::test]
async fn test_export_pdf() {
    let app = failing_app();
    let id = analysis_id(&app).await;

    let response = fetch_raw(&app, &format!("/api/export/pdf/{id}")).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn test_export_unknown_analysis_is_not_found() {
    let app = failing_app();

    let (status, response) =
        send_request(&app, Method::GET, "/api/export/pdf/01HZZZZZZZZZZZZZZZZZZZZZZZ", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(response["error"].is_string());
}

#[tokio::test]
async fn test_export_unknown_format_is_rejected() {
    let app = failing_app();
    let id = analysis_id(&app).await;

    let (status, response) =
        send_request(&app, Method::GET, &format!("/api/export/xlsx/{id}"), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"].as_str().unwrap().contains("xlsx"));
}

#[tokio::test]
async fn test_health_reports_stored_analyses() {
    let app = failing_app();
    analysis_id(&app).await;

    let (status, health) = send_request(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["stored_analyses"], 1);
    assert_eq!(health["language_model_configured"], false);
    // the offline source never populated the cache
    assert_eq!(health["instructions"]["cached"], false);
}

#[tokio::test]
async fn test_cors_preflight_on_api() {
    let app = failing_app();
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/analyze")
        .header(header::ORIGIN, "https://example.org")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}

#[tokio::test]
async fn test_index_serves_form_page() {
    let app = failing_app();

    let response = fetch_raw(&app, "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    assert!(response.headers().contains_key("x-request-id"));
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&body).contains("tm-analyzer-form"));
}

#[tokio::test]
async fn test_static_script_is_served() {
    let app = failing_app();

    let response = fetch_raw(&app, "/static/app.js").await;

    assert_eq!(response.status(), StatusCode::OK);
    let missing = fetch_raw(&app, "/static/missing.js").await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
