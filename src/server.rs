use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::{header, Method};
use actix_web::middleware::Next;
use actix_web::{web, HttpResponse, ResponseError};
use futures_util::TryStreamExt;
use serde_json::Value;
use tracing::{debug, warn, Instrument};

use crate::auth::verify_bearer;
use crate::automation::{self, AutomationRequest};
use crate::error::ApiError;
use crate::images::build_image_request;
use crate::models;
use crate::util::{interpolate, max_body_bytes_from_env, relay_status, AppState};

/// Attach a request id span to everything logged while handling a request.
pub async fn trace_request(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let span = tracing::info_span!(
        "request",
        id = %uuid::Uuid::new_v4(),
        method = %req.method(),
        path = %req.path()
    );
    let resp = next.call(req).instrument(span.clone()).await?;
    span.in_scope(|| tracing::info!(status = resp.status().as_u16(), "request handled"));
    Ok(resp)
}

/// Answer CORS preflight without auth, reject everything else lacking the
/// configured bearer secret before routing.
pub async fn require_bearer(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    if req.method() == Method::OPTIONS {
        return Ok(req
            .into_response(HttpResponse::Ok().finish())
            .map_into_right_body());
    }

    let verification = {
        let auth = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        match req.app_data::<web::Data<AppState>>() {
            Some(state) => verify_bearer(&state.api_key, auth),
            None => crate::auth::Verification::Invalid,
        }
    };

    if !verification.is_valid() {
        warn!("Rejected request: {:?} bearer", verification);
        return Ok(req
            .into_response(ApiError::Unauthorized.error_response())
            .map_into_right_body());
    }

    next.call(req).await.map(ServiceResponse::map_into_left_body)
}

fn endpoint(path: &str, route: actix_web::Route) -> actix_web::Resource {
    // Known path with the wrong method is still "Not found"
    web::resource(path)
        .route(route)
        .default_service(web::to(not_found))
}

/// Configure Actix-web routes. Expects `web::Data<AppState>` in app data.
pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PayloadConfig::new(max_body_bytes_from_env()))
        .service(endpoint("/", web::get().to(list_models)))
        .service(endpoint(
            "/v1/chat/completions",
            web::post().to(chat_completions),
        ))
        .service(endpoint(
            "/v1/images/generations",
            web::post().to(image_generations),
        ))
        .service(endpoint("/images", web::post().to(image_generations)))
        .service(endpoint("/v1/models", web::get().to(list_models)))
        .service(endpoint("/v1/chat/models", web::get().to(list_chat_models)))
        .service(endpoint(
            "/v1/images/models",
            web::get().to(list_image_models),
        ))
        .service(endpoint("/v1/defaults", web::get().to(defaults)))
        .service(endpoint(
            "/v1/automation/url",
            web::post().to(url_automation),
        ))
        .default_service(web::to(not_found));
}

async fn not_found() -> HttpResponse {
    ApiError::NotFound.error_response()
}

fn parse_body<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    Ok(serde_json::from_slice(body)?)
}

/// Relay a chat completion to the upstream that serves the requested alias.
async fn chat_completions(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let mut body: Value = parse_body(&body)?;

    let requested = body.get("model");
    let route = match requested.and_then(Value::as_str) {
        Some(model) => state.routing.resolve_route(model)?,
        None => return Err(ApiError::UnsupportedModel(interpolate(requested))),
    };
    let stream = body.get("stream") == Some(&Value::Bool(true));

    debug!(
        "Routing chat model to {} at {} (stream={})",
        route.model_id, route.url, stream
    );

    if let Some(obj) = body.as_object_mut() {
        obj.insert("model".to_string(), Value::String(route.model_id.clone()));
    }

    let mut rb = state
        .http
        .post(&route.url)
        .header(reqwest::header::CONTENT_TYPE, "application/json");
    if let Some(bearer) = route.bearer.as_deref() {
        rb = rb.bearer_auth(bearer);
    }

    let up = rb.json(&body).send().await.map_err(|e| {
        warn!("Chat upstream {} unreachable: {}", route.url, e);
        ApiError::from(e)
    })?;
    let status = relay_status(up.status());
    if !up.status().is_success() {
        warn!("Chat upstream {} answered {}", route.url, up.status());
    }

    if stream {
        let upstream = up
            .bytes_stream()
            .map_err(|e| std::io::Error::other(e.to_string()));
        Ok(HttpResponse::build(status)
            .insert_header((header::CONTENT_TYPE, "text/event-stream"))
            .insert_header((header::CACHE_CONTROL, "no-cache"))
            .streaming(upstream))
    } else {
        let bytes = up.bytes().await?;
        Ok(HttpResponse::build(status)
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .body(bytes))
    }
}

/// Fetch a generated image and relay it unchanged.
async fn image_generations(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let body: Value = parse_body(&body)?;
    let image = build_image_request(&state.routing, &body)?;

    debug!(
        "Fetching image model {} from {}",
        image.model,
        image.url.host_str().unwrap_or_default()
    );

    let up = state.http.get(image.url).send().await.map_err(|e| {
        warn!("Image upstream unreachable: {}", e);
        ApiError::from(e)
    })?;
    let status = relay_status(up.status());
    let content_type = up
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("image/jpeg")
        .to_string();

    let upstream = up
        .bytes_stream()
        .map_err(|e| std::io::Error::other(e.to_string()));
    Ok(HttpResponse::build(status)
        .insert_header((header::CONTENT_TYPE, content_type))
        .streaming(upstream))
}

async fn list_models(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(models::all_models(&state.routing))
}

async fn list_chat_models(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(models::chat_models(&state.routing))
}

async fn list_image_models(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(models::image_models(&state.routing))
}

async fn defaults(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(models::defaults(&state.routing))
}

async fn url_automation(body: web::Bytes) -> Result<HttpResponse, ApiError> {
    let body: Value = parse_body(&body)?;
    Ok(HttpResponse::Ok().json(automation::process(AutomationRequest::from(body))))
}
