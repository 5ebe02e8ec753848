//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store backend selection, token service, bootstrap admin
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: JSON extractor and nested response views
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::trace::TraceLayer;

use hrportal_auth::CredentialVerifier;
use hrportal_infra::AppConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub async fn build_app(config: &AppConfig) -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services(config).await?);
    let verifier: Arc<dyn CredentialVerifier> = services.tokens.clone();
    let auth_state = middleware::AuthState { verifier };

    // Every route sees an `Authentication`; guards decide what it must be.
    let api = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ))
        .layer(CookieManagerLayer::new());

    Ok(Router::new()
        .route("/health", get(routes::system::health))
        .merge(api)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http())))
}
