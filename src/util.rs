use actix_web::http::StatusCode;
use actix_web::middleware::DefaultHeaders;
use actix_web::HttpResponse;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

use crate::routing_config::RoutingConfig;

/// Initialize dotenv and structured tracing based on RUST_LOG.
/// - Supports explicit env file paths via ENV_FILE, DOTENV_PATH
/// - Falls back to default .env discovery
/// - Logs the source used
pub fn init_tracing() {
    let mut env_source: String = "none".into();
    for key in ["ENV_FILE", "DOTENV_PATH"] {
        if let Ok(p) = std::env::var(key) {
            let p = p.trim();
            if !p.is_empty()
                && std::path::Path::new(p).is_file()
                && dotenvy::from_filename(p).is_ok()
            {
                env_source = format!("{p} ({key})");
                break;
            }
        }
    }

    if env_source == "none" && dotenvy::dotenv().is_ok() {
        env_source = ".env".into();
    }

    // Initialize tracing (respects RUST_LOG potentially provided by the env file)
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let subscriber = fmt().with_env_filter(EnvFilter::new(filter)).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    tracing::info!("Environment loaded from: {}", env_source);
}

/// Shared application state used by the HTTP server and handlers.
pub struct AppState {
    pub http: reqwest::Client,
    /// Immutable lookup tables
    pub routing: Arc<RoutingConfig>,
    /// Inbound bearer secret
    pub api_key: String,
}

impl AppState {
    pub fn new(routing: RoutingConfig, api_key: impl Into<String>) -> Self {
        Self {
            http: build_http_client_from_env(),
            routing: Arc::new(routing),
            api_key: api_key.into(),
        }
    }
}

fn env_truthy(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v.trim().to_ascii_lowercase())
        .map(|v| v == "1" || v == "true" || v == "yes" || v == "on")
        .unwrap_or(false)
}

/// Build an HTTP client honoring proxy and timeout environment variables.
///
/// Environment:
/// - ROUTER_NO_PROXY = 1|true|yes|on   -> disable all proxies
/// - ROUTER_PROXY_URL = <url>          -> proxy for all schemes
/// - ROUTER_HTTP_TIMEOUT_SECONDS       -> overall request timeout (u64), none by default
pub fn build_http_client_from_env() -> reqwest::Client {
    let mut builder = reqwest::Client::builder();

    if let Ok(secs) = std::env::var("ROUTER_HTTP_TIMEOUT_SECONDS") {
        if let Ok(n) = secs.trim().parse::<u64>() {
            builder = builder.timeout(std::time::Duration::from_secs(n));
        }
    }

    if env_truthy("ROUTER_NO_PROXY") {
        builder = builder.no_proxy();
    } else if let Ok(url) = std::env::var("ROUTER_PROXY_URL") {
        let u = url.trim();
        if !u.is_empty() {
            match reqwest::Proxy::all(u) {
                Ok(p) => builder = builder.proxy(p),
                Err(e) => tracing::warn!("Ignoring invalid ROUTER_PROXY_URL: {}", e),
            }
        }
    }

    builder = builder.user_agent(format!("aham-router/{}", env!("CARGO_PKG_VERSION")));

    builder.build().unwrap_or_else(|_| reqwest::Client::new())
}

/// Build a JSON error response `{"error": msg}` with the given HTTP status.
pub fn error_response(status: StatusCode, msg: &str) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({ "error": msg }))
}

/// Map an upstream (http 1.x) status onto actix's status type.
pub fn relay_status(status: http::StatusCode) -> StatusCode {
    StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY)
}

/// Maximum accepted request body size (ROUTER_MAX_BODY_BYTES, default 25 MiB).
pub fn max_body_bytes_from_env() -> usize {
    std::env::var("ROUTER_MAX_BODY_BYTES")
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(25 * 1024 * 1024)
}

/// CORS header values attached to every response.
#[derive(Debug, Clone, PartialEq)]
pub struct CorsHeaders {
    pub allow_origin: String,
    pub allow_methods: String,
    pub allow_headers: String,
}

impl Default for CorsHeaders {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_string(),
            allow_methods: "GET, POST, PUT, DELETE, OPTIONS".to_string(),
            allow_headers: "Content-Type, Authorization".to_string(),
        }
    }
}

impl CorsHeaders {
    /// Environment variables:
    /// - CORS_ALLOWED_ORIGINS
    /// - CORS_ALLOWED_METHODS
    /// - CORS_ALLOWED_HEADERS
    ///
    /// Defaults are permissive.
    pub fn from_env() -> Self {
        let read = |name: &str| {
            std::env::var(name)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();
        Self {
            allow_origin: read("CORS_ALLOWED_ORIGINS").unwrap_or(defaults.allow_origin),
            allow_methods: read("CORS_ALLOWED_METHODS").unwrap_or(defaults.allow_methods),
            allow_headers: read("CORS_ALLOWED_HEADERS").unwrap_or(defaults.allow_headers),
        }
    }

    /// Middleware adding the CORS headers to every response, errors included.
    pub fn middleware(&self) -> DefaultHeaders {
        DefaultHeaders::new()
            .add(("Access-Control-Allow-Origin", self.allow_origin.clone()))
            .add(("Access-Control-Allow-Methods", self.allow_methods.clone()))
            .add(("Access-Control-Allow-Headers", self.allow_headers.clone()))
    }
}

/// Truthiness of a loosely typed request field: missing, null, false, 0, NaN
/// and "" are false.
pub fn is_truthy(value: Option<&serde_json::Value>) -> bool {
    use serde_json::Value;

    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Text form of a request field when spliced into a URL, message or script:
/// missing -> "undefined", strings verbatim, everything else as compact JSON.
pub fn interpolate(value: Option<&serde_json::Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(serde_json::Value::Number(n)) if !n.is_i64() && !n.is_u64() => {
            match n.as_f64() {
                // Integral floats print without a fraction: 100.0 -> "100"
                Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e21 => {
                    format!("{:.0}", f + 0.0)
                }
                _ => n.to_string(),
            }
        }
        Some(other) => other.to_string(),
    }
}
