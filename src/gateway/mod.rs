pub mod error;
pub mod extract;
pub mod handlers;
pub mod state;
pub mod types;

use anyhow::{Context, Result};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::account::handlers as account;
use crate::catalog::handlers as catalog;
use crate::config::AppConfig;
use crate::entries::handlers as entries;
use crate::user_auth::handlers as auth;
use crate::user_auth::{Gate, RouteAccess, gate_middleware};
use crate::voucher::handlers as voucher;
use error::ApiError;
use state::AppState;

fn cors_layer(config: &AppConfig) -> Result<CorsLayer> {
    let origin = config
        .gateway
        .cors_origin
        .as_deref()
        .unwrap_or(config.auth.frontend_url.as_str());

    let allow_origin = if origin == "*" {
        AllowOrigin::from(Any)
    } else {
        let value = HeaderValue::from_str(origin.trim_end_matches('/'))
            .with_context(|| format!("Invalid CORS origin: {}", origin))?;
        AllowOrigin::exact(value)
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]))
}

/// Build the full `/api` router.
///
/// Routes are grouped by what they require of the caller; each protected
/// group carries its own gate, applied before any handler in the group runs.
pub fn build_router(config: &AppConfig, state: Arc<AppState>) -> Result<Router> {
    let tokens = state.tokens().clone();
    let authenticated = Gate::new(tokens.clone(), RouteAccess::Authenticated);
    let admin_only = Gate::new(tokens, RouteAccess::ADMIN_ONLY);

    // ==========================================================================
    // Public Routes (no auth required)
    // ==========================================================================
    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/auth/login", post(auth::login))
        .route("/auth/forgot-password", post(auth::forgot_password))
        .route("/auth/reset-password", post(auth::reset_password));

    // ==========================================================================
    // Authenticated Routes (any valid session)
    // ==========================================================================
    let session_routes = Router::new()
        .route("/auth/verify", get(auth::verify))
        .route("/users/me", get(account::get_me).patch(account::update_me))
        .route("/committees", get(catalog::list_committees))
        .route("/committees/{id}", get(catalog::get_committee))
        .route("/roles", get(catalog::list_roles))
        .route(
            "/entries",
            get(entries::list_entries).post(entries::create_entry),
        )
        .route(
            "/entries/{id}",
            get(entries::get_entry)
                .patch(entries::update_entry)
                .delete(entries::delete_entry),
        )
        .route(
            "/entries/{id}/voucher",
            get(voucher::voucher_info).put(voucher::upload_voucher),
        )
        .route("/entries/{id}/voucher/raw", get(voucher::voucher_raw))
        .route_layer(from_fn_with_state(authenticated, gate_middleware));

    // ==========================================================================
    // Administrator Routes
    // ==========================================================================
    let admin_routes = Router::new()
        .route(
            "/users",
            get(account::list_accounts).post(account::register),
        )
        .route("/users/{id}/role", patch(account::set_role))
        .route("/users/{id}/status", patch(account::set_status))
        .route("/committees", post(catalog::create_committee))
        .route("/committees/{id}", delete(catalog::delete_committee))
        .route("/roles", post(catalog::create_role))
        .route("/roles/{id}", delete(catalog::delete_role))
        .route_layer(from_fn_with_state(admin_only, gate_middleware));

    let api = public_routes.merge(session_routes).merge(admin_routes);

    Ok(Router::new()
        .nest("/api", api)
        .fallback(route_not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.gateway.max_body_bytes))
        .layer(cors_layer(config)?)
        .layer(TraceLayer::new_for_http()))
}

async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}

/// Start HTTP Gateway server; returns after ctrl-c.
pub async fn run_server(config: &AppConfig, state: Arc<AppState>) -> Result<()> {
    let app = build_router(config, state)?;

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {} (port already in use?)", addr))?;

    tracing::info!("Gateway listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
