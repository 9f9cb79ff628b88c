#![forbid(unsafe_code)]
#![doc = r#"
Gemini Proxy

Thin authenticated forwarding proxy for the Google Gemini completion API:
validate a client credential, resolve the effective model and key, issue one
upstream call, and return a normalized success/error envelope.

Crate highlights
- Library: the full pipeline via `proxy::handle(&config, &client, &request, credential)`.
- HTTP server (in `server`): `POST /gemini-proxy`, `GET /health`, `GET /metrics`.
- No persistent state; configuration is loaded once and injected.

Modules
- `config`: Immutable process configuration loaded from the environment.
- `models`: Request, envelope, and call-parameter types.
- `error`: Typed proxy error with wire codes and HTTP status mapping.
- `proxy`: Validation pipeline and upstream-call orchestration.
- `gemini`: The upstream `generateContent` client.
- `metrics`: Prometheus counters/histogram recorder.
- `server`: Axum router and handlers.
- `util`: Shared helpers (tracing, env, HTTP client, CORS).
"#]

pub mod config;
pub mod error;
pub mod gemini;
pub mod metrics;
pub mod models;
pub mod proxy;
pub mod server;
pub mod util;

// Re-export the types most library users need.
pub use crate::config::ProxyConfig;
pub use crate::error::ProxyError;
pub use crate::models::{ApiEnvelope, ProxyRequest, ProxySuccess};
pub use crate::server::{build_router, AppState};
