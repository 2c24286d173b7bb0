use std::path::PathBuf;

use actix_web::middleware::from_fn;
use actix_web::{web, App, HttpServer};
use anyhow::{bail, Context, Result};
use clap::Parser;

use aham_router::server::{config_routes, require_bearer, trace_request};
use aham_router::util::{init_tracing, AppState, CorsHeaders};
use aham_router::RoutingConfig;

#[derive(Debug, Parser)]
#[command(name = "aham-router", version, about = "OpenAI-compatible chat and image router")]
struct Args {
    /// Address to listen on
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8088")]
    bind: String,

    /// JSON or YAML routing tables replacing the built-in set
    #[arg(long, env = "ROUTER_CONFIG")]
    config: Option<PathBuf>,

    /// Bearer secret callers must present
    #[arg(long, env = "ROUTER_API_KEY", hide_env_values = true)]
    api_key: String,
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Env files must be loaded before clap reads env-backed args
    init_tracing();
    let args = Args::parse();

    if args.api_key.trim().is_empty() {
        bail!("ROUTER_API_KEY must not be empty");
    }

    let mut routing = match args.config.as_deref() {
        Some(path) => {
            tracing::info!("Loading routing tables from {}", path.display());
            RoutingConfig::load_from_file(path)?
        }
        None => RoutingConfig::builtin(),
    };
    routing.resolve_secrets();

    let stats = routing.stats();
    for alias in &stats.dangling_aliases {
        tracing::warn!("Alias {} has no upstream route; requests for it will get 400", alias);
    }
    tracing::info!(
        "Routing {} aliases over {} routes, {} image models, {} credential rules",
        stats.total_aliases,
        stats.total_routes,
        stats.total_image_models,
        stats.total_credential_rules
    );

    let state = web::Data::new(AppState::new(routing, args.api_key));
    let cors = CorsHeaders::from_env();

    tracing::info!("Listening on {}", args.bind);
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(from_fn(require_bearer))
            .wrap(from_fn(trace_request))
            .wrap(cors.middleware())
            .configure(config_routes)
    })
    .bind(args.bind.as_str())
    .with_context(|| format!("binding {}", args.bind))?
    .run()
    .await?;

    Ok(())
}
