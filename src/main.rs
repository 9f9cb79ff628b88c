use gemini_proxy::server::{build_router, AppState};
use gemini_proxy::util::{build_http_client_from_env, env_bind_addr, init_tracing};
use gemini_proxy::ProxyConfig;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ProxyConfig::from_env();
    if config.client_keys.is_empty() {
        tracing::warn!("API_KEYS is empty; every request will be rejected as unauthorized");
    }
    if config.upstream_api_key.is_empty() {
        tracing::warn!(
            "GEMINI_API_KEY is not set; requests without a client-supplied key will fail upstream"
        );
    }
    tracing::info!(
        default_model = %config.default_model,
        upstream_timeout_secs = config.upstream_timeout.as_secs(),
        client_keys = config.client_keys.len(),
        "configuration loaded"
    );

    let state = Arc::new(AppState::new(config, build_http_client_from_env()));

    let addr = env_bind_addr();
    tracing::info!("Gemini proxy listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
