use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// Inbound forwarding request body for `POST /gemini-proxy`.
///
/// Notes:
/// - `prompt` defaults to empty so a missing field is rejected by prompt
///   validation rather than by the JSON layer.
/// - `model` and `api_key` must be supplied together or not at all; the
///   pairing rule is enforced in `proxy::resolve_params`, with blank strings
///   treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Model and credential actually used for one upstream call, after applying
/// the defaults-or-both-supplied resolution rule. Built per request and
/// discarded after the call.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamCallParams {
    pub effective_model: String,
    pub effective_api_key: String,
}

/// Successful outcome of one proxy cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxySuccess {
    pub response_text: String,
    pub model: String,
    pub elapsed_ms: u64,
}

/// One error entry in the failure envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// Payload of the success envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyData {
    pub response: String,
    pub model: String,
    /// Elapsed wall-clock time for the request, in milliseconds.
    pub time: u64,
}

/// Normalized response envelope shared by every endpoint outcome:
/// `{"result": "OK", "data": {...}}` or `{"result": "Failed", "errors": [...]}`.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope {
    pub result: String,
    #[serde(default)]
    pub data: Option<ProxyData>,
    #[serde(default)]
    pub errors: Option<Vec<ApiError>>,
}

impl ApiEnvelope {
    pub fn success(data: ProxyData) -> Self {
        Self {
            result: "OK".to_string(),
            data: Some(data),
            errors: None,
        }
    }

    pub fn failure(errors: Vec<ApiError>) -> Self {
        Self {
            result: "Failed".to_string(),
            data: None,
            errors: Some(errors),
        }
    }
}

impl From<ProxySuccess> for ApiEnvelope {
    fn from(s: ProxySuccess) -> Self {
        Self::success(ProxyData {
            response: s.response_text,
            model: s.model,
            time: s.elapsed_ms,
        })
    }
}
