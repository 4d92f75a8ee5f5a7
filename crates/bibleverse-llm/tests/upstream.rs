//! Provider clients against a local stub upstream
//!
//! Each test binds an axum app on an ephemeral port that mimics the
//! provider's REST shape, then drives the real reqwest-based provider at it.

use std::collections::HashMap;
use std::time::Duration;

use axum::{
    extract::{Path, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use bibleverse_llm::{
    AnthropicConfig, ExtractionError, GeminiConfig, HuggingFaceConfig, LLMError, LLMRouter,
    LLMRouterBuilder, ProviderKind,
};
use serde_json::{json, Value};

const VERSE_JSON: &str = r#"{"reference":"빌립보서 4:6","text":"아무 것도 염려하지 말고 다만 모든 일에 기도와 간구로 너희 구할 것을 감사함으로 하나님께 아뢰라","prayer":"아멘"}"#;

async fn spawn_upstream(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn huggingface_router(base_url: String, timeout: Duration) -> LLMRouter {
    LLMRouterBuilder::new()
        .with_kind(ProviderKind::HuggingFace)
        .with_timeout(timeout)
        .with_huggingface(HuggingFaceConfig {
            api_key: Some("hf-test".to_string()),
            base_url,
            model: "mistralai/Mistral-7B-Instruct-v0.3".to_string(),
        })
        .build()
        .unwrap()
}

// =============================================================================
// Hugging Face
// =============================================================================

async fn huggingface_generate(
    Path(model): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some("Bearer hf-test");
    if !authorized || model != "mistralai/Mistral-7B-Instruct-v0.3" {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad auth"})));
    }

    let inputs = body["inputs"].as_str().unwrap_or_default();
    if !inputs.contains("\"불안하고 두려울 때\" 상황") || body["parameters"]["return_full_text"] != json!(false) {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "bad body"})));
    }

    (
        StatusCode::OK,
        Json(json!([{ "generated_text": format!("```json\n{}\n```", VERSE_JSON) }])),
    )
}

#[tokio::test]
async fn test_huggingface_success() {
    let app = Router::new().route("/models/*model", post(huggingface_generate));
    let base_url = spawn_upstream(app).await;

    let verse = huggingface_router(base_url, Duration::from_secs(5))
        .recommend("불안하고 두려울 때")
        .await
        .unwrap();

    assert_eq!(verse.reference, "빌립보서 4:6");
    assert_eq!(verse.prayer.as_deref(), Some("아멘"));
    assert!(verse.context.is_none());
}

#[tokio::test]
async fn test_huggingface_model_loading() {
    let app = Router::new().route(
        "/models/*model",
        post(|| async {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"error": "Model is currently loading", "estimated_time": 20.0})),
            )
        }),
    );
    let base_url = spawn_upstream(app).await;

    let err = huggingface_router(base_url, Duration::from_secs(5))
        .recommend("감사할 때")
        .await
        .unwrap_err();

    assert!(err.is_model_loading());
    match err {
        LLMError::UpstreamStatus { status, body } => {
            assert_eq!(status, 503);
            assert!(body.contains("loading"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_huggingface_unparseable_output() {
    let app = Router::new().route(
        "/models/*model",
        post(|| async { Json(json!([{"generated_text": "말씀을 찾을 수 없습니다."}])) }),
    );
    let base_url = spawn_upstream(app).await;

    let err = huggingface_router(base_url, Duration::from_secs(5))
        .recommend("감사할 때")
        .await
        .unwrap_err();

    assert!(matches!(err, LLMError::Extraction(ExtractionError::NoJsonObject)));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = huggingface_router(format!("http://{}", addr), Duration::from_secs(5))
        .recommend("감사할 때")
        .await
        .unwrap_err();

    assert!(matches!(err, LLMError::NetworkError { .. }));
}

#[tokio::test]
async fn test_timeout_is_network_error() {
    let app = Router::new().route(
        "/models/*model",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!([]))
        }),
    );
    let base_url = spawn_upstream(app).await;

    let err = huggingface_router(base_url, Duration::from_millis(200))
        .recommend("감사할 때")
        .await
        .unwrap_err();

    match err {
        LLMError::NetworkError { message } => assert!(message.contains("timed out")),
        other => panic!("unexpected error: {other}"),
    }
}

// =============================================================================
// Gemini
// =============================================================================

async fn gemini_generate(
    Path(target): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    if target != "gemini-test:generateContent" || query.get("key").map(String::as_str) != Some("gm-test") {
        return (StatusCode::FORBIDDEN, Json(json!({"error": {"code": 403}})));
    }
    if body["contents"][0]["parts"][0]["text"].as_str().is_none() {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": {"code": 400}})));
    }

    (
        StatusCode::OK,
        Json(json!({
            "candidates": [{
                "content": {
                    "parts": [{"text": format!("추천 구절입니다: {} 평안하세요!", VERSE_JSON)}],
                    "role": "model"
                },
                "finishReason": "STOP"
            }]
        })),
    )
}

#[tokio::test]
async fn test_gemini_success() {
    let app = Router::new().route("/v1beta/models/*target", post(gemini_generate));
    let base_url = spawn_upstream(app).await;

    let router = LLMRouterBuilder::new()
        .with_kind(ProviderKind::Gemini)
        .with_gemini(GeminiConfig {
            api_key: Some("gm-test".to_string()),
            base_url,
            model: "gemini-test".to_string(),
        })
        .build()
        .unwrap();

    let verse = router.recommend("위로가 필요할 때").await.unwrap();
    assert_eq!(verse.reference, "빌립보서 4:6");
}

#[tokio::test]
async fn test_gemini_wrong_key_passes_status_through() {
    let app = Router::new().route("/v1beta/models/*target", post(gemini_generate));
    let base_url = spawn_upstream(app).await;

    let router = LLMRouterBuilder::new()
        .with_kind(ProviderKind::Gemini)
        .with_gemini(GeminiConfig {
            api_key: Some("wrong".to_string()),
            base_url,
            model: "gemini-test".to_string(),
        })
        .build()
        .unwrap();

    let err = router.recommend("위로가 필요할 때").await.unwrap_err();
    assert!(matches!(err, LLMError::UpstreamStatus { status: 403, .. }));
}

// =============================================================================
// Anthropic
// =============================================================================

async fn anthropic_messages(headers: HeaderMap, Json(body): Json<Value>) -> impl IntoResponse {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
    if header("x-api-key").as_deref() != Some("sk-test")
        || header("anthropic-version").as_deref() != Some(AnthropicConfig::API_VERSION)
    {
        return (StatusCode::UNAUTHORIZED, Json(json!({"type": "error"})));
    }
    if body["model"] != json!("claude-test") || body["messages"][0]["role"] != json!("user") {
        return (StatusCode::BAD_REQUEST, Json(json!({"type": "error"})));
    }

    (
        StatusCode::OK,
        Json(json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": VERSE_JSON}],
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 120, "output_tokens": 80}
        })),
    )
}

#[tokio::test]
async fn test_anthropic_success() {
    let app = Router::new().route("/v1/messages", post(anthropic_messages));
    let base_url = spawn_upstream(app).await;

    let router = LLMRouterBuilder::new()
        .with_kind(ProviderKind::Anthropic)
        .with_anthropic(AnthropicConfig {
            api_key: Some("sk-test".to_string()),
            base_url,
            model: "claude-test".to_string(),
        })
        .build()
        .unwrap();

    let verse = router.recommend("힘이 필요할 때").await.unwrap();
    assert_eq!(verse.reference, "빌립보서 4:6");
    assert_eq!(verse.text.chars().next(), Some('아'));
}
