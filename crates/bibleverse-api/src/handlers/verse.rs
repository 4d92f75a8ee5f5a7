//! Verse Recommendation Handlers
//!
//! Endpoint:
//! - POST /api/get-verse - Generate a verse for a situation
//!
//! The handler is the same for every provider. Invalid input and a missing
//! API key are always errors. Everything that goes wrong after the outbound
//! call is settled by the configured [`FailurePolicy`].

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bibleverse_llm::{LLMError, ProviderKind};
use bibleverse_types::{FailurePolicy, SituationId, VerseResult};
use std::sync::Arc;

use crate::dto::GetVerseRequest;
use crate::error::{ApiError, ApiResult};
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// Response header telling whether the verse came from the model or the fallback table
pub const VERSE_SOURCE_HEADER: &str = "x-verse-source";

/// Counter incremented once per verse request
pub const VERSE_REQUESTS_METRIC: &str = "verse_requests_total";

// =============================================================================
// Get Verse
// =============================================================================

/// Recommend a verse for a situation
#[utoipa::path(
    post,
    path = "/api/get-verse",
    tag = "Verse",
    request_body = GetVerseRequest,
    responses(
        (status = 200, description = "Recommended verse", body = VerseResult),
        (status = 400, description = "Missing or invalid situation", body = crate::error::ErrorResponse),
        (status = 405, description = "Method not allowed", body = crate::error::ErrorResponse),
        (status = 500, description = "API key missing or generation failed", body = crate::error::ErrorResponse),
        (status = 503, description = "Model is loading", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_verse(
    State(state): State<Arc<AppState>>,
    payload: Result<ValidatedJson<GetVerseRequest>, ApiError>,
) -> ApiResult<Response> {
    let provider = state.llm.kind();

    let situation = payload
        .and_then(|ValidatedJson(request)| request.situation().map(str::to_string))
        .map_err(|e| {
            tracing::debug!(provider = %provider, error = %e, "Rejected verse request");
            record_outcome(provider, "rejected");
            e
        })?;

    if !state.llm.is_configured() {
        tracing::error!(
            provider = %provider,
            env = provider.api_key_env(),
            "API key not configured"
        );
        record_outcome(provider, "rejected");
        return Err(ApiError::ApiKeyNotConfigured);
    }

    let situation_id = state.catalog.resolve(&situation);

    match state.llm.recommend(&situation).await {
        Ok(verse) => {
            tracing::info!(
                provider = %provider,
                situation_id = situation_label(situation_id),
                reference = %verse.reference,
                "Verse generated"
            );
            record_outcome(provider, "generated");
            Ok(verse_response(verse, "generated"))
        }
        Err(err) if should_fall_back(state.policy, &err) => {
            let verse = state.fallback.select(situation_id).clone();
            tracing::warn!(
                provider = %provider,
                situation_id = situation_label(situation_id),
                reason = err.kind_label(),
                error = %err,
                fallback = %verse.reference,
                "Serving fallback verse"
            );
            record_outcome(provider, "fallback");
            Ok(verse_response(verse, "fallback"))
        }
        Err(err) => {
            tracing::warn!(
                provider = %provider,
                situation_id = situation_label(situation_id),
                reason = err.kind_label(),
                error = %err,
                "Verse generation failed"
            );
            record_outcome(provider, "error");
            Err(err.into())
        }
    }
}

/// OPTIONS for `/api/get-verse`
///
/// Only reached when the CORS layer is disabled; otherwise that layer answers
/// every OPTIONS request itself.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Any method other than POST or OPTIONS
pub async fn method_not_allowed() -> impl IntoResponse {
    ([(header::ALLOW, "POST, OPTIONS")], ApiError::MethodNotAllowed)
}

fn should_fall_back(policy: FailurePolicy, err: &LLMError) -> bool {
    policy == FailurePolicy::Fallback && !matches!(err, LLMError::ApiKeyMissing { .. })
}

fn situation_label(id: Option<SituationId>) -> &'static str {
    id.map(|id| id.as_str()).unwrap_or("custom")
}

fn verse_response(verse: VerseResult, source: &'static str) -> Response {
    ([(VERSE_SOURCE_HEADER, source)], Json(verse)).into_response()
}

fn record_outcome(provider: ProviderKind, outcome: &'static str) {
    metrics::counter!(
        VERSE_REQUESTS_METRIC,
        "provider" => provider.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bibleverse_llm::{ExtractionError, LLMProvider, LLMRouter};
    use bibleverse_types::FallbackTable;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};
    use serde_json::Value;

    /// Answers with fixed model output, or fails as unreachable when `None`
    struct FixedProvider {
        configured: bool,
        output: Option<&'static str>,
    }

    #[async_trait]
    impl LLMProvider for FixedProvider {
        fn name(&self) -> &'static str {
            "Fixed"
        }

        fn kind(&self) -> ProviderKind {
            ProviderKind::Gemini
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        fn build_prompt(&self, situation: &str) -> String {
            situation.to_string()
        }

        async fn send(&self, _prompt: &str) -> bibleverse_llm::Result<Value> {
            match self.output {
                Some(text) => Ok(Value::String(text.to_string())),
                None => Err(LLMError::NetworkError { message: "connection refused".to_string() }),
            }
        }

        fn extract_text(&self, raw: &Value) -> bibleverse_llm::Result<String> {
            Ok(raw.as_str().unwrap_or_default().to_string())
        }
    }

    const VERSE_JSON: &str = r#"{"reference":"시편 23:1","text":"여호와는 나의 목자시니"}"#;

    fn app_state(configured: bool, output: Option<&'static str>, policy: FailurePolicy) -> Arc<AppState> {
        let llm = LLMRouter::new(Arc::new(FixedProvider { configured, output }));
        Arc::new(AppState::new(llm, FallbackTable::builtin().unwrap(), policy))
    }

    fn request(situation: &str) -> Result<ValidatedJson<GetVerseRequest>, ApiError> {
        Ok(ValidatedJson(GetVerseRequest { situation: Some(situation.to_string()) }))
    }

    /// Run one request and return the `(provider, outcome, count)` of every counter recorded
    fn recorded_outcomes(
        state: Arc<AppState>,
        payload: Result<ValidatedJson<GetVerseRequest>, ApiError>,
    ) -> Vec<(String, String, u64)> {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        metrics::with_local_recorder(&recorder, || {
            let _ = runtime.block_on(get_verse(State(state), payload));
        });

        snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .filter(|(key, ..)| key.key().name() == VERSE_REQUESTS_METRIC)
            .map(|(key, _, _, value)| {
                let label = |name: &str| {
                    key.key()
                        .labels()
                        .find(|l| l.key() == name)
                        .map(|l| l.value().to_string())
                        .unwrap_or_default()
                };
                let count = match value {
                    DebugValue::Counter(count) => count,
                    other => panic!("unexpected metric value {other:?}"),
                };
                (label("provider"), label("outcome"), count)
            })
            .collect()
    }

    fn single(outcome: &str) -> Vec<(String, String, u64)> {
        vec![("gemini".to_string(), outcome.to_string(), 1)]
    }

    #[test]
    fn test_outcome_generated() {
        let state = app_state(true, Some(VERSE_JSON), FailurePolicy::Fallback);
        assert_eq!(recorded_outcomes(state, request("감사할 때")), single("generated"));
    }

    #[test]
    fn test_outcome_fallback() {
        let state = app_state(true, None, FailurePolicy::Fallback);
        assert_eq!(recorded_outcomes(state, request("감사할 때")), single("fallback"));

        let state = app_state(true, Some("no json here"), FailurePolicy::Fallback);
        assert_eq!(recorded_outcomes(state, request("감사할 때")), single("fallback"));
    }

    #[test]
    fn test_outcome_error_policy() {
        let state = app_state(true, None, FailurePolicy::Error);
        assert_eq!(recorded_outcomes(state, request("감사할 때")), single("error"));
    }

    #[test]
    fn test_outcome_rejected_for_blank_situation() {
        let state = app_state(true, Some(VERSE_JSON), FailurePolicy::Fallback);
        assert_eq!(recorded_outcomes(state.clone(), request("   ")), single("rejected"));

        let invalid = Err(ApiError::InvalidRequestBody("expected value".to_string()));
        assert_eq!(recorded_outcomes(state, invalid), single("rejected"));
    }

    #[test]
    fn test_outcome_rejected_for_missing_key() {
        let state = app_state(false, Some(VERSE_JSON), FailurePolicy::Fallback);
        assert_eq!(recorded_outcomes(state, request("감사할 때")), single("rejected"));
    }

    #[test]
    fn test_fallback_policy_covers_upstream_failures() {
        let failures = [
            LLMError::UpstreamStatus { status: 503, body: String::new() },
            LLMError::NetworkError { message: "refused".to_string() },
            LLMError::Extraction(ExtractionError::NoJsonObject),
        ];
        for err in &failures {
            assert!(should_fall_back(FailurePolicy::Fallback, err));
            assert!(!should_fall_back(FailurePolicy::Error, err));
        }
    }

    #[test]
    fn test_missing_key_never_falls_back() {
        let err = LLMError::ApiKeyMissing { provider: ProviderKind::HuggingFace };
        assert!(!should_fall_back(FailurePolicy::Fallback, &err));
    }

    #[test]
    fn test_situation_label() {
        assert_eq!(situation_label(Some(SituationId::Gratitude)), "gratitude");
        assert_eq!(situation_label(None), "custom");
    }
}
