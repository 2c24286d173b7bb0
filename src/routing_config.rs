//! Routing Configuration Module
//!
//! Immutable lookup tables that drive the router:
//! - Model aliasing (public model names → internal provider identifiers)
//! - Chat routes (internal identifier → upstream URL)
//! - Image models (image model name → provider base URL and dimensions)
//! - Ordered credential rules (upstream URL substring → bearer secret)
//! - Default model selections
//!
//! The tables are built once at startup, either from the built-in set or from a
//! JSON/YAML file, and are never written afterwards.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ApiError;

/// Model alias configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelAlias {
    /// Public model name accepted from callers
    pub alias: String,

    /// Internal provider-specific model identifier
    pub target: String,
}

/// Upstream URL for an internal model identifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatRoute {
    pub model: String,
    pub url: String,
}

/// Image generation model served by a prompt-in-path provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageModel {
    pub id: String,
    pub provider: String,
    /// Prefix the percent-encoded prompt is appended to
    pub base_url: String,
    pub display_name: String,
    #[serde(default = "default_dimension")]
    pub width: u32,
    #[serde(default = "default_dimension")]
    pub height: u32,
}

fn default_dimension() -> u32 {
    1024
}

/// Bearer credential applied to upstream URLs containing `url_contains`.
///
/// Rules are evaluated top-down; when none match, the last rule applies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CredentialRule {
    /// Substring of the upstream URL; `None` matches everything
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_contains: Option<String>,

    /// Environment variable holding the secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_env: Option<String>,

    /// Literal secret, used when `key_env` is unset or empty
    #[serde(default, skip_serializing)]
    pub key: Option<String>,
}

impl CredentialRule {
    fn matches(&self, url: &str) -> bool {
        match self.url_contains.as_deref() {
            Some(needle) => url.contains(needle),
            None => true,
        }
    }
}

/// Default model selections advertised to clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DefaultModels {
    pub vision: String,
    pub web_search: String,
}

/// Main routing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Public name → internal identifier, in listing order
    pub aliases: Vec<ModelAlias>,

    /// Internal identifier → upstream chat completions URL
    pub routes: Vec<ChatRoute>,

    /// Image models, in listing order
    #[serde(default)]
    pub image_models: Vec<ImageModel>,

    pub defaults: DefaultModels,

    /// Ordered credential rules; the last one is the fallback
    #[serde(default)]
    pub credentials: Vec<CredentialRule>,
}

/// Resolved upstream for a chat request
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRoute {
    /// Internal identifier written into the forwarded body
    pub model_id: String,
    pub url: String,
    pub bearer: Option<String>,
}

/// Routing statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingStats {
    pub total_aliases: usize,
    pub total_routes: usize,
    pub total_image_models: usize,
    pub total_credential_rules: usize,
    pub dangling_aliases: Vec<String>,
}

const LM0_CHAT_URL: &str = "https://lm.0.sdk.li/v1/chat/completions";
const SAMURAI_CHAT_URL: &str = "https://samuraiapi.in/v1/chat/completions";
const RPROXY_CHAT_URL: &str = "https://rproxy-nine.vercel.app/v1/chat/completions";
const POLLINATIONS_PROMPT_URL: &str = "https://image.pollinations.ai/prompt/";

impl RoutingConfig {
    /// Built-in tables. Secrets are not resolved yet; call
    /// [`RoutingConfig::resolve_secrets`] before serving.
    pub fn builtin() -> Self {
        let aliases = [
            ("claude-4-sonnet", "io-8/claude-4-sonnet"),
            ("claude-4-opus", "io-8/claude-4-opus"),
            ("claude-3.7-sonnet", "io-8/claude-3.7-sonnet"),
            ("claude-3.5-sonnet", "io-8/claude-3.5-sonnet"),
            ("kimi-k2", "io-6/kimi-k2"),
            ("grok-3", "grok-3(clinesp)"),
            (
                "qwen3-coder-480B-A35B-instruct",
                "provider5-Qwen/Qwen3-Coder-480B-A35B-Instruct",
            ),
            (
                "deepseek-chat-v3-0324-free",
                "deepseek-chat-v3-0324:free(clinesp)",
            ),
            ("sonar", "io-4/sonar"),
            ("sonar-pro", "io-4/sonar-pro"),
            ("claude-sonnet-4-2", "claude-sonnet-4"),
            ("claude-opus-4-2", "claude-opus-4"),
        ];

        let routes = [
            ("io-8/claude-4-sonnet", LM0_CHAT_URL),
            ("io-8/claude-4-opus", LM0_CHAT_URL),
            ("io-8/claude-3.7-sonnet", LM0_CHAT_URL),
            ("io-8/claude-3.5-sonnet", LM0_CHAT_URL),
            ("io-6/kimi-k2", LM0_CHAT_URL),
            ("grok-3(clinesp)", SAMURAI_CHAT_URL),
            (
                "provider5-Qwen/Qwen3-Coder-480B-A35B-Instruct",
                SAMURAI_CHAT_URL,
            ),
            ("deepseek-chat-v3-0324:free(clinesp)", SAMURAI_CHAT_URL),
            ("io-4/sonar", LM0_CHAT_URL),
            ("io-4/sonar-pro", LM0_CHAT_URL),
            ("claude-sonnet-4", RPROXY_CHAT_URL),
            ("claude-opus-4", RPROXY_CHAT_URL),
        ];

        let image_model = |id: &str, display_name: &str| ImageModel {
            id: id.to_string(),
            provider: "pollinations".to_string(),
            base_url: POLLINATIONS_PROMPT_URL.to_string(),
            display_name: display_name.to_string(),
            width: 1024,
            height: 1024,
        };

        Self {
            aliases: aliases
                .iter()
                .map(|(alias, target)| ModelAlias {
                    alias: alias.to_string(),
                    target: target.to_string(),
                })
                .collect(),
            routes: routes
                .iter()
                .map(|(model, url)| ChatRoute {
                    model: model.to_string(),
                    url: url.to_string(),
                })
                .collect(),
            image_models: vec![
                image_model("flux", "Flux - High Quality"),
                image_model("turbo", "Turbo - Fast Generation"),
            ],
            defaults: DefaultModels {
                vision: "claude-4-sonnet".to_string(),
                web_search: "sonar".to_string(),
            },
            credentials: vec![
                // rproxy accepts any bearer
                CredentialRule {
                    url_contains: Some("rproxy-nine.vercel.app".to_string()),
                    key_env: Some("RPROXY_API_KEY".to_string()),
                    key: Some("dummy-key".to_string()),
                },
                CredentialRule {
                    url_contains: Some("samuraiapi.in".to_string()),
                    key_env: Some("SAMURAI_API_KEY".to_string()),
                    key: None,
                },
                CredentialRule {
                    url_contains: None,
                    key_env: Some("LM0_API_KEY".to_string()),
                    key: None,
                },
            ],
        }
    }

    /// Load routing config from a JSON or YAML file (by extension).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading routing config {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let config: RoutingConfig = if is_yaml {
            serde_yaml::from_str(&content)
                .with_context(|| format!("parsing YAML routing config {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("parsing JSON routing config {}", path.display()))?
        };

        Ok(config)
    }

    /// Fill credential secrets from their environment variables.
    ///
    /// A non-empty `key_env` value wins over the literal `key`.
    pub fn resolve_secrets(&mut self) {
        for rule in &mut self.credentials {
            if let Some(var) = rule.key_env.as_deref() {
                if let Ok(v) = std::env::var(var) {
                    if !v.trim().is_empty() {
                        rule.key = Some(v.trim().to_string());
                        continue;
                    }
                }
            }
            if rule.key.is_none() {
                tracing::warn!(
                    "No secret for credential rule {:?} (key_env={:?}); requests will be sent without Authorization",
                    rule.url_contains,
                    rule.key_env
                );
            }
        }
    }

    /// Resolve a public model name to its internal identifier
    pub fn resolve_alias(&self, model: &str) -> Option<&str> {
        self.aliases
            .iter()
            .find(|a| a.alias == model)
            .map(|a| a.target.as_str())
    }

    /// Upstream URL for an internal identifier
    pub fn route_url(&self, model_id: &str) -> Option<&str> {
        self.routes
            .iter()
            .find(|r| r.model == model_id)
            .map(|r| r.url.as_str())
    }

    /// Pick the bearer secret for an upstream URL.
    pub fn select_credential(&self, url: &str) -> Option<&str> {
        self.credentials
            .iter()
            .find(|rule| rule.matches(url))
            .or_else(|| self.credentials.last())
            .and_then(|rule| rule.key.as_deref())
    }

    /// Resolve a public chat model to its upstream target
    pub fn resolve_route(&self, model: &str) -> Result<ResolvedRoute, ApiError> {
        let unsupported = || ApiError::UnsupportedModel(model.to_string());
        let model_id = self.resolve_alias(model).ok_or_else(unsupported)?;
        let url = self.route_url(model_id).ok_or_else(unsupported)?;

        Ok(ResolvedRoute {
            model_id: model_id.to_string(),
            url: url.to_string(),
            bearer: self.select_credential(url).map(str::to_string),
        })
    }

    pub fn image_model(&self, id: &str) -> Option<&ImageModel> {
        self.image_models.iter().find(|m| m.id == id)
    }

    /// Get statistics about the routing tables
    pub fn stats(&self) -> RoutingStats {
        let dangling_aliases = self
            .aliases
            .iter()
            .filter(|a| self.route_url(&a.target).is_none())
            .map(|a| a.alias.clone())
            .collect();

        RoutingStats {
            total_aliases: self.aliases.len(),
            total_routes: self.routes.len(),
            total_image_models: self.image_models.len(),
            total_credential_rules: self.credentials.len(),
            dangling_aliases,
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self::builtin()
    }
}
