use tracing_subscriber::{fmt, EnvFilter};

/// Initialize dotenv and structured tracing based on RUST_LOG.
///
/// Loads `.env` from the working directory when present (existing process
/// variables win), then installs the fmt subscriber.
pub fn init_tracing() {
    let env_loaded = dotenvy::dotenv().is_ok();

    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=info".into());
    let subscriber = fmt().with_env_filter(EnvFilter::new(filter)).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    if env_loaded {
        tracing::info!("Environment loaded from .env");
    }
}

/// Get the bind address for the HTTP server from env or default to 0.0.0.0:8088.
pub fn env_bind_addr() -> String {
    std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8088".into())
}

/// Build the pooled upstream HTTP client.
///
/// Environment:
/// - GEMINI_PROXY_NO_PROXY = 1|true|yes|on -> disable all proxies
/// - HTTP_PROXY / HTTPS_PROXY              -> honored by reqwest's env defaults
///
/// The per-call timeout is applied at request time from `ProxyConfig`, not
/// here, so the bound stays visible at the call site. A connect timeout keeps
/// dead upstreams from tying up the pool.
pub fn build_http_client_from_env() -> reqwest::Client {
    let mut builder = reqwest::Client::builder()
        .connect_timeout(std::time::Duration::from_secs(10))
        .user_agent(format!("gemini-proxy/{}", env!("CARGO_PKG_VERSION")));

    let no_proxy = std::env::var("GEMINI_PROXY_NO_PROXY")
        .map(|v| v.trim().to_ascii_lowercase())
        .map(|v| v == "1" || v == "true" || v == "yes" || v == "on")
        .unwrap_or(false);
    if no_proxy {
        builder = builder.no_proxy();
    }

    builder.build().unwrap_or_else(|_| reqwest::Client::new())
}

/// Build a CORS layer from environment variables.
///
/// Environment variables:
/// - CORS_ALLOWED_ORIGINS: "*" or comma-separated origins
/// - CORS_ALLOWED_METHODS: "*" or comma-separated methods
/// - CORS_ALLOWED_HEADERS: "*" or comma-separated request header names
///
/// Defaults are permissive (Any) to match the original deployment.
pub fn cors_layer_from_env() -> tower_http::cors::CorsLayer {
    use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

    let mut layer = CorsLayer::new();

    match std::env::var("CORS_ALLOWED_ORIGINS") {
        Ok(origins) if origins.trim() != "*" => {
            let vals: Vec<http::HeaderValue> = origins
                .split(',')
                .filter_map(|p| http::HeaderValue::from_str(p.trim()).ok())
                .collect();
            if vals.is_empty() {
                layer = layer.allow_origin(Any);
            } else {
                layer = layer.allow_origin(AllowOrigin::list(vals));
            }
        }
        _ => layer = layer.allow_origin(Any),
    }

    match std::env::var("CORS_ALLOWED_METHODS") {
        Ok(methods) if methods.trim() != "*" => {
            let vals: Vec<http::Method> = methods
                .split(',')
                .filter_map(|p| http::Method::from_bytes(p.trim().to_ascii_uppercase().as_bytes()).ok())
                .collect();
            if vals.is_empty() {
                layer = layer.allow_methods(Any);
            } else {
                layer = layer.allow_methods(AllowMethods::list(vals));
            }
        }
        _ => layer = layer.allow_methods(Any),
    }

    match std::env::var("CORS_ALLOWED_HEADERS") {
        Ok(headers) if headers.trim() != "*" => {
            let vals: Vec<http::HeaderName> = headers
                .split(',')
                .filter_map(|p| http::HeaderName::try_from(p.trim()).ok())
                .collect();
            if vals.is_empty() {
                layer = layer.allow_headers(Any);
            } else {
                layer = layer.allow_headers(AllowHeaders::list(vals));
            }
        }
        _ => layer = layer.allow_headers(Any),
    }

    layer
}
