#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! HTTP server assembly for the CultureLens backend
//!
//! Wires configuration into the router: route handlers, request
//! logging, CORS, authentication and rate limiting. The binary calls
//! [`Server::serve`]; tests take [`Server::into_router`] and drive it
//! directly.

mod auth;
mod cors;
mod health;
mod rate_limit;
mod request_log;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use lens_api::ApiError;
use lens_auth::TokenVerifier;
use lens_config::Config;
use lens_core::{Plan, Role, VerifiedUser};
use lens_ratelimit::RequestLimiter;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the rate limiter or token verifier cannot be
    /// constructed from the configuration
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 4820)));

        let limiter = config
            .server
            .rate_limit
            .as_ref()
            .map(lens_ratelimit::create_request_limiter)
            .transpose()
            .map_err(|e| anyhow::anyhow!("rate limiter configuration: {e}"))?
            .map(Arc::new);

        let state = AppState::new(config, limiter.clone());

        let mut app = Router::new();

        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        app = app.merge(routes::api_router());

        let mut app = app.fallback(fallback).with_state(state);

        // Middleware, innermost first

        // Rate limiting (after auth, so the verified user is available)
        if let Some(limiter) = limiter {
            app = app.layer(axum::middleware::from_fn(move |req, next| {
                let limiter: Arc<RequestLimiter> = Arc::clone(&limiter);
                async move { rate_limit::rate_limit_middleware(limiter, req, next).await }
            }));
        }

        // Authentication
        if let Some(ref auth_config) = config.auth {
            let verifier = TokenVerifier::new(
                auth_config.identity_url.clone(),
                auth_config.service_secret.clone(),
                Duration::from_secs(auth_config.cache_ttl_seconds),
                auth_config.cache_capacity,
            )?;
            let public_paths = auth_config.public_paths.clone();
            app = app.layer(axum::middleware::from_fn(move |req, next| {
                let verifier = verifier.clone();
                let public_paths = public_paths.clone();
                async move { auth::auth_middleware(verifier, public_paths, req, next).await }
            }));
        } else {
            tracing::warn!("auth not configured, all requests share a local identity");
            let user = Arc::new(local_user());
            app = app.layer(axum::middleware::from_fn(move |req, next| {
                let user = Arc::clone(&user);
                async move { auth::local_identity_middleware(user, req, next).await }
            }));
        }

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        // CORS
        if let Some(ref cors_config) = config.server.cors {
            app = app.layer(cors::cors_layer(cors_config));
        }

        // Request logging (outermost, sees the final status of everything)
        app = app.layer(axum::middleware::from_fn(request_log::request_log_middleware));

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}

/// Unmatched routes still answer with the envelope
async fn fallback() -> ApiError {
    ApiError::not_found("route")
}

/// Shared identity for deployments without an `[auth]` section
fn local_user() -> VerifiedUser {
    VerifiedUser {
        uid: "local".to_owned(),
        email: None,
        display_name: Some("Local User".to_owned()),
        photo_url: None,
        role: Role::User,
        plan: Plan::Free,
        email_verified: false,
    }
}
