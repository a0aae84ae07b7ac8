#![forbid(unsafe_code)]
//! geonear HTTP server.
//!
//! Exposes:
//! - `GET /live`: process liveness
//! - `GET /ready`: readiness (directory/storage checks)
//! - `POST /users`: register a user
//! - `GET /users/:id`: user with profile
//! - `PUT /users/me/profile`: replace the requester's profile
//! - `PUT/DELETE /users/me/location`: set or clear the requester's location
//! - `DELETE /users/me`: remove the requester
//! - `GET /users?page=&limit=&distance=`: users near the requester

use std::time::Duration;

use anyhow::{Context, Result};
use axum::error_handling::HandleErrorLayer;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderName, Request};
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, put};
use axum::Router;
use geonear_core::{load_directory, UserDirectory};
use tower::limit::ConcurrencyLimitLayer;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing_subscriber::EnvFilter;

mod auth;
mod config;
mod env_utils;
mod errors;
mod handler_utils;
mod handlers;
mod handlers_health;
mod handlers_search;
mod models;
mod persistence;
mod state;

use crate::auth::{auth_audit, AuthConfig};
use crate::config::AppConfig;
use crate::errors::handle_middleware_error;
use crate::handlers::{
    clear_location, get_user, live, ready, register_user, remove_user, search_nearby,
    update_location, update_profile,
};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let auth_config = AuthConfig::from_env().context("invalid auth configuration")?;
    let bind = config.bind;
    let directory = load_initial_directory(&config)?;
    tracing::info!(
        users = directory.len(),
        located = directory.located_len(),
        "directory loaded"
    );
    let state = AppState::with_directory_and_auth(config.clone(), directory, auth_config.clone());
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind server socket on {bind}"))?;

    tracing::info!(
        %bind,
        max_page_size = config.max_page_size,
        max_distance_km = config.max_distance_km,
        timeout_ms = config.request_timeout_ms,
        max_body_bytes = config.max_body_bytes,
        max_concurrency = config.max_concurrency,
        persistence_enabled = config.persistence_enabled,
        auth_mode = ?auth_config.mode,
        "geonear server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server exited unexpectedly")?;

    Ok(())
}

fn load_initial_directory(config: &AppConfig) -> Result<UserDirectory> {
    if !config.persistence_enabled {
        return Ok(UserDirectory::new());
    }
    load_directory(&config.snapshot_path, &config.wal_path).with_context(|| {
        format!(
            "failed to load persisted state from {} and {}",
            config.snapshot_path.display(),
            config.wal_path.display()
        )
    })
}

fn build_app(state: AppState) -> Router {
    let request_id_header = HeaderName::from_static("x-request-id");
    let config = state.config.clone();
    let timeout = Duration::from_millis(config.request_timeout_ms);

    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(HandleErrorLayer::new(handle_middleware_error))
        .layer(TimeoutLayer::new(timeout))
        .layer(ConcurrencyLimitLayer::new(config.max_concurrency))
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(move |request: &Request<_>| {
                    let request_id = request
                        .headers()
                        .get(&request_id_header)
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id
                    )
                })
                .on_response(DefaultOnResponse::new().latency_unit(LatencyUnit::Millis)),
        );

    let users = Router::new()
        .route("/users", get(search_nearby).post(register_user))
        .route("/users/me", delete(remove_user))
        .route("/users/me/profile", put(update_profile))
        .route(
            "/users/me/location",
            put(update_location).delete(clear_location),
        )
        .route("/users/:id", get(get_user))
        .route_layer(from_fn_with_state(state.clone(), auth_audit));

    Router::new()
        .route("/live", get(live))
        .route("/ready", get(ready))
        .merge(users)
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(middleware)
        .with_state(state)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(error) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        eprintln!("failed to initialize tracing subscriber: {error}");
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(error) => tracing::error!(%error, "failed to install Ctrl-C handler"),
    }
}
