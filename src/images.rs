//! Image generation request mapping.
//!
//! Image providers take the prompt as the last path segment and generation
//! options as query parameters, so a request becomes a single GET URL.

use reqwest::Url;
use serde_json::Value;

use crate::error::ApiError;
use crate::routing_config::RoutingConfig;
use crate::util::{interpolate, is_truthy};

pub const DEFAULT_IMAGE_MODEL: &str = "flux";
pub const REFERRER: &str = "aham-ai";

/// Resolved image request: the model id and the provider URL to fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRequest {
    pub model: String,
    pub url: Url,
}

fn field_or(body: &Value, key: &str, default: impl Into<String>) -> String {
    let value = body.get(key);
    if is_truthy(value) {
        interpolate(value)
    } else {
        default.into()
    }
}

fn flag(body: &Value, key: &str) -> &'static str {
    if is_truthy(body.get(key)) {
        "true"
    } else {
        "false"
    }
}

/// Build the provider URL for an image generation body.
pub fn build_image_request(config: &RoutingConfig, body: &Value) -> Result<ImageRequest, ApiError> {
    let model = field_or(body, "model", DEFAULT_IMAGE_MODEL);
    let image_model = config
        .image_model(&model)
        .ok_or_else(|| ApiError::UnsupportedImageModel(model.clone()))?;

    let prompt = field_or(body, "prompt", "");
    let raw = format!("{}{}", image_model.base_url, urlencoding::encode(&prompt));
    let mut url = Url::parse(&raw).map_err(|e| ApiError::InvalidUpstreamUrl(e.to_string()))?;

    url.query_pairs_mut()
        .append_pair("model", &model)
        .append_pair("width", &field_or(body, "width", image_model.width.to_string()))
        .append_pair("height", &field_or(body, "height", image_model.height.to_string()))
        .append_pair("seed", &field_or(body, "seed", ""))
        .append_pair("image", &field_or(body, "image", ""))
        .append_pair("private", "true")
        .append_pair("enhance", flag(body, "enhance"))
        .append_pair("safe", flag(body, "safe"))
        .append_pair("transparent", flag(body, "transparent"))
        .append_pair("nologo", "true")
        .append_pair("referrer", REFERRER);

    Ok(ImageRequest { model, url })
}
