//! The API-key gateway and the in-app test console.
//!
//! Both answer in a mock API envelope around a normal dispatch. The gateway
//! authenticates with an API key; the console runs on behalf of a signed-in
//! user with one of their keys.

use axum::{Json, body::Bytes, extract::State, http::HeaderMap};
use chrono::{SecondsFormat, Utc};
use nexus_ai::{ContentKind, ConverseRequest, GenerationConfig, InferenceResult, ModelPersona};
use nexus_conversation::render::image_xml;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument};

use crate::auth::{RequireAuth, bearer_token};
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

/// Output token ceiling for unlimited keys.
pub const UNLIMITED_MAX_OUTPUT_TOKENS: u32 = 8192;

const INVALID_KEY_MESSAGE: &str = "Invalid API Key";
const INVALID_JSON_MESSAGE: &str = "Invalid JSON body";
const NO_KEYS_MESSAGE: &str = "No keys found. Please go to API Access to generate one.";

/// Token usage reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GatewayTokens {
    Count(usize),
    Label(&'static str),
}

#[derive(Debug, Serialize)]
pub struct GatewayData {
    content: String,
    #[serde(rename = "type")]
    kind: ContentKind,
    xml_output: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GatewayUsage {
    tokens: GatewayTokens,
}

/// Body answered by `/v1/generate`.
#[derive(Debug, Serialize)]
pub struct GatewayResponse {
    status: u16,
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<Value>,
    data: GatewayData,
    usage: GatewayUsage,
}

/// Estimated tokens for a metered key: a quarter of the characters of each
/// side, rounded down.
#[must_use]
pub fn metered_tokens(prompt: &str, completion: &str) -> usize {
    prompt.chars().count() / 4 + completion.chars().count() / 4
}

/// Runs a prompt for an API client.
///
/// The key is checked before the body is read, so an unknown key with a
/// malformed body still answers Unauthorized.
#[instrument(skip_all)]
pub async fn generate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<GatewayResponse>, ApiError> {
    let key = match bearer_token(&headers) {
        Some(token) => state.records.api_key_details(token).await?,
        None => None,
    }
    .ok_or_else(|| ApiError::unauthorized(INVALID_KEY_MESSAGE))?;

    let parsed: Value = serde_json::from_slice(&body)
        .map_err(|_| ApiError::bad_request(INVALID_JSON_MESSAGE))?;

    let model = parsed.get("model").cloned();
    let persona =
        ModelPersona::from_model_name(model.as_ref().and_then(Value::as_str).unwrap_or(""));
    let prompt = parsed
        .get("prompt")
        .and_then(Value::as_str)
        .unwrap_or_default();

    let unlimited = key.is_unlimited();
    let mut overrides = GenerationConfig::new();
    if unlimited {
        overrides = overrides.with_max_output_tokens(UNLIMITED_MAX_OUTPUT_TOKENS);
    }
    debug!(key_id = %key.id, %persona, unlimited, "gateway request");

    let request = ConverseRequest::new(prompt, persona).with_overrides(overrides);
    let result = state.dispatcher.converse(&request).await;

    let tokens = if unlimited {
        GatewayTokens::Label("Infinite")
    } else {
        GatewayTokens::Count(metered_tokens(prompt, &result.text))
    };

    Ok(Json(GatewayResponse {
        status: 200,
        id: format!("resp_{}", Utc::now().timestamp_millis()),
        model,
        data: GatewayData {
            xml_output: xml_output(&result),
            content: result.text,
            kind: result.kind,
        },
        usage: GatewayUsage { tokens },
    }))
}

fn xml_output(result: &InferenceResult) -> Option<String> {
    match (result.kind, result.image_url.as_deref()) {
        (ContentKind::Image, Some(url)) => Some(image_xml(url)),
        _ => None,
    }
}

/// A console run.
#[derive(Debug, Deserialize)]
pub struct TestRequest {
    /// Key to run with; the caller's first key when absent.
    #[serde(default)]
    key: Option<String>,
    prompt: String,
}

#[derive(Debug, Serialize)]
pub struct TestMetadata {
    model: String,
    latency_ms: u64,
    timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct TestData {
    content: String,
    #[serde(rename = "type")]
    kind: ContentKind,
    generated_image_url: Option<String>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct TestUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
    total_tokens: usize,
}

impl TestUsage {
    /// A quarter of the characters, rounded up, per side and in total.
    #[must_use]
    pub fn estimate(prompt: &str, completion: &str) -> Self {
        let prompt = prompt.chars().count();
        let completion = completion.chars().count();
        Self {
            prompt_tokens: prompt.div_ceil(4),
            completion_tokens: completion.div_ceil(4),
            total_tokens: (prompt + completion).div_ceil(4),
        }
    }
}

/// Body answered by `/api/test-request`.
#[derive(Debug, Serialize)]
pub struct TestResponse {
    status: &'static str,
    code: u16,
    metadata: TestMetadata,
    data: TestData,
    usage: TestUsage,
}

/// Runs a prompt on behalf of the caller with one of their keys.
#[instrument(skip_all)]
pub async fn test_request(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
    ApiJson(body): ApiJson<TestRequest>,
) -> Result<Json<TestResponse>, ApiError> {
    if body.prompt.trim().is_empty() {
        return Err(ApiError::bad_request("Prompt must not be empty"));
    }

    let keys = state.records.user_keys(&user.id).await?;
    if keys.is_empty() {
        return Err(ApiError::bad_request(NO_KEYS_MESSAGE));
    }
    let key = match body.key.as_deref() {
        Some(requested) => keys.iter().find(|k| k.key == requested),
        None => keys.first(),
    }
    .ok_or_else(|| ApiError::unauthorized(INVALID_KEY_MESSAGE))?;
    debug!(key_id = %key.id, "running console request");

    let started = Instant::now();
    let request = ConverseRequest::new(body.prompt.clone(), ModelPersona::Malevolent);
    let result = state.dispatcher.converse(&request).await;
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    Ok(Json(TestResponse {
        status: "success",
        code: 200,
        metadata: TestMetadata {
            model: state.dispatcher.text_model().to_string(),
            latency_ms,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        },
        usage: TestUsage::estimate(&body.prompt, &result.text),
        data: TestData {
            content: result.text,
            kind: result.kind,
            generated_image_url: result.image_url,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metered_tokens_round_down_per_side() {
        assert_eq!(metered_tokens("abcdefg", "abc"), 1);
        assert_eq!(metered_tokens("abcd", "abcd"), 2);
        assert_eq!(metered_tokens("", ""), 0);
    }

    #[test]
    fn console_usage_rounds_up() {
        let usage = TestUsage::estimate("abcde", "abc");
        assert_eq!(
            usage,
            TestUsage {
                prompt_tokens: 2,
                completion_tokens: 1,
                total_tokens: 2,
            }
        );
    }

    #[test]
    fn unlimited_tokens_serialize_as_label() {
        let json = serde_json::to_value(GatewayTokens::Label("Infinite")).expect("json");
        assert_eq!(json, serde_json::json!("Infinite"));
        let json = serde_json::to_value(GatewayTokens::Count(3)).expect("json");
        assert_eq!(json, serde_json::json!(3));
    }

    #[test]
    fn only_images_get_xml() {
        let image = InferenceResult::image("done", "data:image/png;base64,AA");
        assert_eq!(
            xml_output(&image).as_deref(),
            Some("<image><url>data:image/png;base64,AA</url></image>")
        );
        assert_eq!(xml_output(&InferenceResult::text("hi")), None);
    }
}
