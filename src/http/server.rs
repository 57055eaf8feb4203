//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, panic catching, timeout)
//! - Bind server to listener with graceful shutdown
//! - Start the optional scheduler alongside the server

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::error_handling::HandleErrorLayer;
use axum::http::Request;
use axum::routing::{any, get};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::config::AggregatorConfig;
use crate::http::handlers;
use crate::http::request::{request_id, UuidRequestId};
use crate::http::response::{panic_response, timeout_response};
use crate::visits::scheduler::VisitScheduler;
use crate::visits::{StartupError, VisitAggregator};

/// Path of the aggregation trigger.
pub const VISITS_PATH: &str = "/api/get-visits";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<VisitAggregator>,
}

/// HTTP server for the aggregator.
pub struct HttpServer {
    router: Router,
    config: AggregatorConfig,
    aggregator: Arc<VisitAggregator>,
}

impl HttpServer {
    /// Build the aggregator from configuration and wire up the router.
    pub fn new(config: AggregatorConfig) -> Result<Self, StartupError> {
        let aggregator = Arc::new(VisitAggregator::from_config(&config)?);
        Ok(Self::with_aggregator(config, aggregator))
    }

    pub fn with_aggregator(config: AggregatorConfig, aggregator: Arc<VisitAggregator>) -> Self {
        let state = AppState {
            aggregator: aggregator.clone(),
        };
        let router = Self::build_router(&config, state);
        Self {
            router,
            config,
            aggregator,
        }
    }

    fn build_router(config: &AggregatorConfig, state: AppState) -> Router {
        let routes = Router::new()
            .route(VISITS_PATH, any(handlers::get_visits))
            .route("/health", get(handlers::health))
            .with_state(state);

        with_middleware(routes, Duration::from_secs(config.timeouts.request_secs))
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            locations = self.aggregator.locations().len(),
            "HTTP server starting"
        );

        if self.config.schedule.enabled {
            let scheduler = VisitScheduler::new(self.aggregator.clone(), self.config.schedule.clone());
            let scheduler_shutdown = shutdown.resubscribe();
            tokio::spawn(async move {
                scheduler.run(scheduler_shutdown).await;
            });
        }

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }
}

/// Outermost first: request ID, trace span, ID echo, panic → 500, timeout → 500.
fn with_middleware(router: Router, request_timeout: Duration) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id(request.headers()),
                )
            }))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(HandleErrorLayer::new(timeout_response))
            .layer(TimeoutLayer::new(request_timeout)),
    )
}
