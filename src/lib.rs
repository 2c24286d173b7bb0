#![forbid(unsafe_code)]
#![doc = r#"
Aham Router

Route OpenAI-compatible chat and image generation requests to provider upstreams behind a single bearer-protected endpoint.

Crate highlights
- Library: pure table lookups via `RoutingConfig::resolve_route` and image URL construction via `build_image_request`.
- HTTP server (in `server`): chat relay (buffered or streamed), image relay, static model listings and a URL automation stub.
- Configuration: built-in provider tables, or a JSON/YAML file with the same shape.

Modules
- `routing_config`: Alias, route, image model and credential tables.
- `auth`: Inbound static bearer check.
- `images`: Image request → provider URL mapping.
- `automation`: URL automation response synthesis.
- `models`: Listing response shapes.
- `server`: Actix-web middleware, handlers and route table.
- `error`: HTTP-facing error taxonomy.
- `util`: Shared helpers (tracing, env, HTTP client, CORS headers).
"#]

pub mod auth;
pub mod automation;
pub mod error;
pub mod images;
pub mod models;
pub mod routing_config;
pub mod server;
pub mod util;

pub use crate::auth::{verify_bearer, Verification};
pub use crate::automation::{AutomationRequest, AutomationResponse};
pub use crate::error::ApiError;
pub use crate::images::{build_image_request, ImageRequest};
pub use crate::routing_config::{
    ChatRoute, CredentialRule, DefaultModels, ImageModel, ModelAlias, ResolvedRoute,
    RoutingConfig, RoutingStats,
};
pub use crate::util::{AppState, CorsHeaders};
