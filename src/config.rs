use std::collections::HashSet;
use std::time::Duration;

/// Default model used when the client does not supply one.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default cap on prompt length, in characters.
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 10_000;

/// Default bound on a single upstream call.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 60;

/// Public Gemini API origin.
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Immutable process-wide configuration, loaded once at startup and shared
/// read-only across all in-flight requests.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Upstream Gemini key used when the client does not supply its own.
    pub upstream_api_key: String,
    /// Model used when the client does not supply one.
    pub default_model: String,
    /// Allow-list of client credentials accepted in `X-API-KEY`.
    pub client_keys: HashSet<String>,
    /// Bound on a single upstream call.
    pub upstream_timeout: Duration,
    /// Maximum accepted prompt length, in characters.
    pub max_prompt_chars: usize,
    /// Upstream API origin. Overridable for tests and private endpoints.
    pub upstream_base_url: String,
}

impl ProxyConfig {
    /// Load configuration from the environment.
    ///
    /// Environment:
    /// - GEMINI_API_KEY            -> upstream key used for default-credential calls
    /// - GEMINI_DEFAULT_MODEL      -> default model name
    /// - API_KEYS                  -> comma-separated client credential allow-list
    /// - UPSTREAM_TIMEOUT_SECS     -> upstream call timeout (u64 seconds)
    /// - MAX_PROMPT_CHARS          -> maximum prompt length (usize)
    /// - GEMINI_BASE_URL           -> upstream origin override
    ///
    /// Unparsable numeric values fall back to the defaults.
    pub fn from_env() -> Self {
        let upstream_api_key = std::env::var("GEMINI_API_KEY")
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        let default_model = std::env::var("GEMINI_DEFAULT_MODEL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let client_keys: HashSet<String> = std::env::var("API_KEYS")
            .unwrap_or_default()
            .split(',')
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();

        let upstream_timeout = std::env::var("UPSTREAM_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS));

        let max_prompt_chars = std::env::var("MAX_PROMPT_CHARS")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_PROMPT_CHARS);

        let upstream_base_url = std::env::var("GEMINI_BASE_URL")
            .ok()
            .map(|s| s.trim().trim_end_matches('/').to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_UPSTREAM_BASE_URL.to_string());

        Self {
            upstream_api_key,
            default_model,
            client_keys,
            upstream_timeout,
            max_prompt_chars,
            upstream_base_url,
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            upstream_api_key: String::new(),
            default_model: DEFAULT_MODEL.to_string(),
            client_keys: HashSet::new(),
            upstream_timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
            upstream_base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
        }
    }
}
