//! The forwarding pipeline: auth gate, prompt shape, both-or-neither
//! credential resolution, model validation, one upstream call, envelope
//! translation. Each request is a single linear pass with no shared mutable
//! state.

use std::time::Instant;

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::gemini;
use crate::models::{ProxyRequest, ProxySuccess, UpstreamCallParams};

/// Model name families this proxy will forward.
const MODEL_FAMILIES: &[&str] = &["gemini-", "gemma-"];

/// Run one full proxy cycle. Validation happens strictly before the single
/// upstream call; `elapsed_ms` covers the whole cycle from entry.
///
/// Fixed validation order (observable through error codes): auth, prompt
/// shape, parameter pairing, model name.
pub async fn handle(
    config: &ProxyConfig,
    client: &reqwest::Client,
    request: &ProxyRequest,
    client_credential: Option<&str>,
) -> Result<ProxySuccess, ProxyError> {
    let started = Instant::now();

    authorize(config, client_credential)?;
    validate_prompt(&request.prompt, config.max_prompt_chars)?;
    let params = resolve_params(config, request)?;
    validate_model(&params.effective_model)?;

    let response_text = gemini::generate(
        client,
        &config.upstream_base_url,
        &params,
        &request.prompt,
        config.upstream_timeout,
    )
    .await?;

    Ok(ProxySuccess {
        response_text,
        model: params.effective_model,
        elapsed_ms: started.elapsed().as_millis() as u64,
    })
}

/// Auth gate: the credential must be non-empty and present in the allow-list.
/// Runs first so unauthenticated requests never reach the upstream.
fn authorize(config: &ProxyConfig, credential: Option<&str>) -> Result<(), ProxyError> {
    match credential {
        Some(key) if !key.is_empty() && config.client_keys.contains(key) => Ok(()),
        _ => Err(ProxyError::Unauthorized),
    }
}

fn validate_prompt(prompt: &str, max_chars: usize) -> Result<(), ProxyError> {
    if prompt.trim().is_empty() {
        return Err(ProxyError::InvalidPrompt("Prompt is required".to_string()));
    }
    if prompt.chars().count() > max_chars {
        return Err(ProxyError::InvalidPrompt(format!(
            "Prompt too long. Maximum {max_chars} characters allowed"
        )));
    }
    Ok(())
}

/// Apply the both-or-neither rule: either the client supplies model and
/// api_key together, or the process defaults are used for both. Blank
/// strings count as absent.
fn resolve_params(
    config: &ProxyConfig,
    request: &ProxyRequest,
) -> Result<UpstreamCallParams, ProxyError> {
    let custom_model = request
        .model
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let custom_key = request
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match (custom_model, custom_key) {
        (Some(model), Some(key)) => Ok(UpstreamCallParams {
            effective_model: model.to_string(),
            effective_api_key: key.to_string(),
        }),
        (None, None) => Ok(UpstreamCallParams {
            effective_model: config.default_model.clone(),
            effective_api_key: config.upstream_api_key.clone(),
        }),
        _ => Err(ProxyError::InvalidParameters(
            "Must provide both model and api_key together, or omit both to use defaults."
                .to_string(),
        )),
    }
}

/// Local model check: plausible length and a known family prefix. Anything
/// else fails without an upstream call.
fn validate_model(model: &str) -> Result<(), ProxyError> {
    let trimmed = model.trim();
    if trimmed.len() < 3 {
        return Err(ProxyError::ModelNotFound {
            message: "Invalid model name format".to_string(),
            upstream: false,
        });
    }
    if !MODEL_FAMILIES.iter().any(|f| trimmed.starts_with(f)) {
        return Err(ProxyError::ModelNotFound {
            message: format!("Model '{trimmed}' is not a supported model family."),
            upstream: false,
        });
    }
    Ok(())
}
