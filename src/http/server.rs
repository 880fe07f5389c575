//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router over the session registry
//! - Wire up middleware (tracing, request timeout)
//! - Degrade every route to a configuration error when the app id is missing
//! - Serve until the shutdown future resolves

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::blockchain::ChainReader;
use crate::config::{RecoveryConfig, ValidationError};
use crate::error::RecoveryError;
use crate::http::handlers;
use crate::http::response::ErrorBody;
use crate::reconcile::{LookupTargets, SessionRegistry};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry>,
    pub reader: Arc<dyn ChainReader>,
}

impl AppState {
    pub fn new(config: &RecoveryConfig, reader: Arc<dyn ChainReader>) -> Self {
        let targets = LookupTargets::from_config(config);
        let idle_ttl = Duration::from_secs(config.server.session_idle_secs);
        Self {
            registry: Arc::new(SessionRegistry::new(reader.clone(), targets, idle_ttl)),
            reader,
        }
    }
}

/// Longest pause between idle-session sweeps.
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// HTTP server for the recovery diagnostic.
pub struct HttpServer {
    router: Router,
    registry: Option<Arc<SessionRegistry>>,
    config: RecoveryConfig,
}

impl HttpServer {
    /// Serve sessions, or only the configuration error when the app id is
    /// missing.
    pub fn new(config: RecoveryConfig, reader: Arc<dyn ChainReader>) -> Self {
        let (router, registry) = if config.app_id().is_some() {
            let state = AppState::new(&config, reader);
            let registry = state.registry.clone();
            (build_router(state, request_timeout(&config)), Some(registry))
        } else {
            let error = RecoveryError::Configuration(ValidationError::MissingAppId.to_string());
            tracing::error!(error = %error, "Serving configuration error only");
            (config_error_router(error.to_string()), None)
        };
        Self {
            router,
            registry,
            config,
        }
    }

    /// The session registry, absent when serving only the configuration error.
    pub fn registry(&self) -> Option<&Arc<SessionRegistry>> {
        self.registry.as_ref()
    }

    /// A clone of the router, for driving requests without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server on `listener` until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            configured = self.config.app_id().is_some(),
            "HTTP server starting"
        );

        // Dropping `stop_tx` ends the sweeper.
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let sweeper = self.registry.map(|registry| {
            let interval = sweep_interval(registry.idle_ttl());
            tokio::spawn(registry.run_sweeper(interval, async move {
                let _ = stop_rx.await;
            }))
        });

        let served = axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await;

        drop(stop_tx);
        if let Some(sweeper) = sweeper {
            if let Err(e) = sweeper.await {
                tracing::warn!(error = %e, "Session sweeper ended abnormally");
            }
        }
        served?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &RecoveryConfig {
        &self.config
    }
}

fn request_timeout(config: &RecoveryConfig) -> Duration {
    Duration::from_secs(config.server.request_timeout_secs)
}

fn sweep_interval(idle_ttl: Duration) -> Duration {
    (idle_ttl / 2).clamp(Duration::from_millis(10), MAX_SWEEP_INTERVAL)
}

/// Session routes with middleware layers.
#[allow(deprecated)]
pub fn build_router(state: AppState, timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/sessions", post(handlers::create_session))
        .route(
            "/sessions/{id}",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/sessions/{id}/provider", put(handlers::set_provider))
        .route(
            "/sessions/{id}/identity",
            put(handlers::authenticate).delete(handlers::logout),
        )
        .route("/sessions/{id}/contract", put(handlers::set_contract))
        .route("/sessions/{id}/contract/lookup", post(handlers::lookup_contract))
        .route("/sessions/{id}/balances/refresh", post(handlers::refresh_balances))
        .route("/sessions/{id}/export", post(handlers::record_export))
        .route("/sessions/{id}/summary", get(handlers::summary))
        .with_state(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
}

/// Answers every request with 503 and `message`.
pub fn config_error_router(message: String) -> Router {
    Router::new()
        .fallback(config_error)
        .with_state(Arc::<str>::from(message))
        .layer(TraceLayer::new_for_http())
}

async fn config_error(State(message): State<Arc<str>>) -> impl IntoResponse {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}
