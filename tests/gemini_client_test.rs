//! Gemini client against a local stand-in server
//!
//! Each test binds an axum server on an ephemeral port that answers the
//! `generateContent` route the way the real API does.

use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use marcacheck::{
    advisory::{AdvisoryEngine, GeminiClient, GenerativeModel},
    errors::AdvisoryFailure,
    types::{AdvisoryResult, AdvisorySource},
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

/// Start `app` on 127.0.0.1 and return its base URL
async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(base: &str) -> GeminiClient {
    GeminiClient::with_config(base, "gemini-test", "test-key", Duration::from_secs(5)).unwrap()
}

fn candidate(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn test_generate_sends_prompt_and_key() {
    let app = Router::new().route(
        "/v1/models/:call",
        post(|Path(call): Path<String>, headers: HeaderMap, Json(body): Json<Value>| async move {
            assert_eq!(call, "gemini-test:generateContent");
            assert_eq!(headers["x-goog-api-key"], "test-key");
            let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap_or_default().to_string();
            Json(candidate(&format!("echo: {}", prompt)))
        }),
    );
    let base = spawn(app).await;

    let reply = client(&base).generate("hola").await.unwrap();
    assert_eq!(reply, "echo: hola");
}

#[tokio::test]
async fn test_engine_parses_fenced_reply() {
    let app = Router::new().route(
        "/v1/models/:call",
        post(|| async {
            Json(candidate(
                "```json\n{\"viabilidad\": 80, \"clases\": [\"Clase 9\"], \"nota\": \"distinctive name\"}\n```",
            ))
        }),
    );
    let base = spawn(app).await;

    let engine = AdvisoryEngine::new(Arc::new(client(&base)));
    let (result, source) = engine.assess("Zyrqon", "software tools").await;

    assert_eq!(source, AdvisorySource::Model);
    assert_eq!(result, AdvisoryResult::new(80, vec!["Clase 9".to_string()], "distinctive name"));
}

#[tokio::test]
async fn test_server_error_surfaces_status() {
    let app = Router::new().route(
        "/v1/models/:call",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "backend exploded") }),
    );
    let base = spawn(app).await;

    let result = client(&base).generate("hola").await;
    match result {
        Err(AdvisoryFailure::ApiStatus { status, body }) => {
            assert_eq!(status, 500);
            assert!(body.contains("backend exploded"));
        }
        other => panic!("unexpected: {:?}", other),
    }

    let engine = AdvisoryEngine::new(Arc::new(client(&base)));
    assert_eq!(engine.evaluate("Zyrqon", "software tools").await, AdvisoryResult::default());
}

#[tokio::test]
async fn test_garbage_reply_falls_back() {
    let app = Router::new().route(
        "/v1/models/:call",
        post(|| async { Json(candidate("No tengo suficiente información.")) }),
    );
    let base = spawn(app).await;

    let engine = AdvisoryEngine::new(Arc::new(client(&base)));
    let result = engine.try_evaluate("Zyrqon", "software tools").await;
    assert!(matches!(result, Err(AdvisoryFailure::NoJsonObject)));

    let (fallback, source) = engine.assess("Zyrqon", "software tools").await;
    assert_eq!(source, AdvisorySource::Fallback);
    assert_eq!(fallback, AdvisoryResult::default());
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let result = client(&base).generate("hola").await;
    assert!(matches!(result, Err(AdvisoryFailure::Transport(_))));
}
