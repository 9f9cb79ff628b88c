//! Upstream Gemini client.
//!
//! One non-streaming `generateContent` call per proxy request:
//!   POST {base}/v1beta/models/{model}:generateContent?key={api_key}
//!
//! The call is bounded by the configured timeout and never retried; failures
//! are classified into the proxy's error kinds.

use std::time::Duration;

use crate::error::ProxyError;
use crate::models::UpstreamCallParams;

/// Generation settings carried on every call, matching the service's tuned
/// defaults rather than the API's.
fn generation_config() -> serde_json::Value {
    serde_json::json!({
        "temperature": 0.7,
        "topP": 0.95,
        "topK": 40,
        "maxOutputTokens": 8192,
    })
}

/// Issue exactly one completion call and extract the response text.
pub async fn generate(
    client: &reqwest::Client,
    base_url: &str,
    params: &UpstreamCallParams,
    prompt: &str,
    timeout: Duration,
) -> Result<String, ProxyError> {
    let url = format!(
        "{}/v1beta/models/{}:generateContent?key={}",
        base_url, params.effective_model, params.effective_api_key
    );

    let body = serde_json::json!({
        "contents": [
            {"role": "user", "parts": [{"text": prompt}]}
        ],
        "generationConfig": generation_config(),
    });

    tracing::info!(
        model = %params.effective_model,
        prompt_chars = prompt.chars().count(),
        "calling Gemini API"
    );

    let resp = client
        .post(&url)
        .header(http::header::CONTENT_TYPE, "application/json")
        .timeout(timeout)
        .json(&body)
        .send()
        .await
        .map_err(|e| classify_transport_error(e, timeout))?;

    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(classify_upstream_status(
            status,
            &text,
            &params.effective_model,
        ));
    }

    let value: serde_json::Value = resp
        .json()
        .await
        .map_err(|e| ProxyError::Upstream(format!("malformed Gemini response: {e}")))?;

    extract_text(&value)
}

fn classify_transport_error(e: reqwest::Error, timeout: Duration) -> ProxyError {
    if e.is_timeout() {
        ProxyError::Timeout {
            seconds: timeout.as_secs(),
        }
    } else {
        ProxyError::Upstream(format!("Gemini API request failed: {e}"))
    }
}

/// Map a non-2xx upstream status (plus its error body, when parseable) to a
/// proxy error kind.
fn classify_upstream_status(
    status: reqwest::StatusCode,
    body: &str,
    model: &str,
) -> ProxyError {
    let upstream_message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v["error"]["message"]
                .as_str()
                .map(|s| s.to_string())
                .or_else(|| v["error"]["status"].as_str().map(|s| s.to_string()))
        })
        .unwrap_or_else(|| body.trim().to_string());

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || upstream_message.contains("RESOURCE_EXHAUSTED")
    {
        return ProxyError::Quota;
    }

    let lowered = upstream_message.to_lowercase();
    if status == reqwest::StatusCode::NOT_FOUND
        || lowered.contains("not found")
        || lowered.contains("does not exist")
    {
        return ProxyError::ModelNotFound {
            message: format!("Model '{model}' not found or not accessible."),
            upstream: true,
        };
    }

    if upstream_message.is_empty() {
        ProxyError::Upstream(format!("Gemini API error: HTTP {status}"))
    } else {
        ProxyError::Upstream(format!("Gemini API error: {upstream_message}"))
    }
}

/// Pull the candidate text out of a `generateContent` response.
///
/// Shape: candidates[0].content.parts[].text — multiple parts are joined.
fn extract_text(value: &serde_json::Value) -> Result<String, ProxyError> {
    if let Some(err_msg) = value["error"]["message"].as_str() {
        return Err(ProxyError::Upstream(format!("Gemini API error: {err_msg}")));
    }

    let parts = value["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| {
            ProxyError::Upstream("Gemini response contained no candidates".to_string())
        })?;

    let text: String = parts
        .iter()
        .filter_map(|p| p["text"].as_str())
        .collect::<Vec<_>>()
        .join("");

    if text.is_empty() {
        return Err(ProxyError::Upstream(
            "Gemini response contained no text parts".to_string(),
        ));
    }

    Ok(text.trim().to_string())
}
