//! HTTP API Layer
//!
//! This crate provides the REST API for the CVM Capital core using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: periods, distribution, participants, balances, ledger
//!   entry corrections, configuration, requests and health
//! - **Middleware**: JWT authentication and audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent JSON error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, Services};
//!
//! let services = Services::from_store(Arc::new(PostgresStore::new(pool)));
//! let app = create_router(services, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
    middleware as axum_middleware,
};
use tower_http::trace::TraceLayer;
use tower_http::cors::{CorsLayer, Any};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use core_kernel::HealthCheckable;
use domain_distribution::{
    ConfigurationPort, ConfigurationService, DistributionEngine, DistributionStore,
    NotificationSink, PeriodManager, PeriodPort,
};
use domain_ledger::{ApprovalService, BalanceCalculator, CorrectionService, LedgerPort, RequestPort};
use domain_participant::ParticipantDirectory;

use crate::config::ApiConfig;
use crate::middleware::{auth_middleware, audit_middleware};
use crate::handlers::{balance, configuration, distribution, entry, health, participant, period, request};

/// Domain services the handlers call into
#[derive(Clone)]
pub struct Services {
    pub directory: Arc<dyn ParticipantDirectory>,
    pub health: Arc<dyn HealthCheckable>,
    pub periods: PeriodManager,
    pub configurations: ConfigurationService,
    pub engine: DistributionEngine,
    pub balances: BalanceCalculator,
    pub approvals: ApprovalService,
    pub corrections: CorrectionService,
}

impl Services {
    /// Wires every service on top of one store that serves all ports
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: ParticipantDirectory
            + LedgerPort
            + RequestPort
            + PeriodPort
            + ConfigurationPort
            + DistributionStore
            + NotificationSink
            + HealthCheckable,
    {
        Self {
            directory: store.clone(),
            health: store.clone(),
            periods: PeriodManager::new(store.clone()),
            configurations: ConfigurationService::new(store.clone()),
            engine: DistributionEngine::from_store(store.clone(), store.clone()),
            balances: BalanceCalculator::new(store.clone(), store.clone()),
            approvals: ApprovalService::new(store.clone(), store.clone(), store.clone()),
            corrections: CorrectionService::new(store),
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub config: ApiConfig,
}

/// Creates the main API router
pub fn create_router(services: Services, config: ApiConfig) -> Router {
    let state = AppState { services, config };

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let period_routes = Router::new()
        .route("/", get(period::list_periods).post(period::create_period))
        .route("/next-sequence", get(period::next_sequence_number))
        .route("/:id", get(period::get_period).delete(period::delete_period))
        .route("/:id/distribution/preview", post(distribution::preview))
        .route("/:id/distribution/commit", post(distribution::commit));

    let participant_routes = Router::new()
        .route("/", get(participant::list_participants).post(participant::create_participant))
        .route("/:id", get(participant::get_participant).delete(participant::delete_participant))
        .route("/:id/active", put(participant::set_active))
        .route("/:id/balance", get(balance::get_balance))
        .route("/:id/statement", get(balance::get_statement));

    let configuration_routes = Router::new()
        .route("/", get(configuration::current).post(configuration::save))
        .route("/history", get(configuration::history));

    let request_routes = Router::new()
        .route("/", get(request::list_requests).post(request::submit_request))
        .route("/:id/approve", post(request::approve_request))
        .route("/:id/reject", post(request::reject_request));

    let entry_routes = Router::new()
        .route(
            "/:id",
            get(entry::get_entry).put(entry::correct_entry).delete(entry::delete_entry),
        );

    // Protected API routes
    let api_routes = Router::new()
        .nest("/periods", period_routes)
        .nest("/participants", participant_routes)
        .nest("/configuration", configuration_routes)
        .nest("/requests", request_routes)
        .nest("/entries", entry_routes)
        .route("/capital", get(balance::total_capital))
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        // Outermost: every request carries an `x-request-id`, echoed on the response
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}
