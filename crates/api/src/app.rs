use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::{
    AssignmentResolver, NotificationService, PaymentCoupling, RequestQueries,
    StatusTransitionEngine,
};
use domain::store::{RequestStore, ServiceCatalog};
use shared::jwt::{JwtConfig, JwtError};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, require_user_auth, security_headers_middleware, trace_id,
};
use crate::routes::{admin, citizen, head, health, officer};
use crate::services::LogNotificationService;

/// The backing stores the workflow runs against.
#[derive(Clone)]
pub struct Stores {
    pub requests: Arc<dyn RequestStore>,
    pub catalog: Arc<dyn ServiceCatalog>,
}

/// Workflow services shared by all handlers.
pub struct Workflow {
    pub assignment: AssignmentResolver,
    pub transitions: StatusTransitionEngine,
    pub payments: PaymentCoupling,
    pub queries: RequestQueries,
}

impl Workflow {
    pub fn new(stores: &Stores, notifier: Arc<dyn NotificationService>) -> Self {
        Self {
            assignment: AssignmentResolver::new(stores.requests.clone()),
            transitions: StatusTransitionEngine::new(stores.requests.clone(), notifier),
            payments: PaymentCoupling::new(stores.requests.clone(), stores.catalog.clone()),
            queries: RequestQueries::new(stores.requests.clone()),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn RequestStore>,
    pub workflow: Arc<Workflow>,
    pub jwt: Arc<JwtConfig>,
}

impl AppState {
    /// Builds state with the notifier selected by `notifications.enabled`.
    pub fn new(config: Config, stores: Stores) -> Result<Self, JwtError> {
        let notifier = Arc::new(LogNotificationService::new(config.notifications.enabled));
        Self::with_notifier(config, stores, notifier)
    }

    pub fn with_notifier(
        config: Config,
        stores: Stores,
        notifier: Arc<dyn NotificationService>,
    ) -> Result<Self, JwtError> {
        let jwt = config.jwt.build()?;
        Ok(Self {
            workflow: Arc::new(Workflow::new(&stores, notifier)),
            store: stores.requests,
            jwt: Arc::new(jwt),
            config: Arc::new(config),
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    let config = state.config.clone();

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Every workflow route needs a valid access token; role checks happen in
    // the handlers and the domain services.
    let protected_routes = Router::new()
        .route("/api/v1/officer/requests", get(officer::list_requests))
        .route("/api/v1/officer/requests/:request_id", get(officer::open_request))
        .route(
            "/api/v1/officer/requests/:request_id/status",
            post(officer::update_status),
        )
        .route("/api/v1/head/workload", get(head::workload))
        .route("/api/v1/admin/requests", get(admin::list_requests))
        .route("/api/v1/admin/stats", get(admin::stats))
        .route(
            "/api/v1/citizen/requests",
            post(citizen::create_request).get(citizen::list_requests),
        )
        .route("/api/v1/citizen/requests/:request_id", get(citizen::get_request))
        .route(
            "/api/v1/citizen/requests/:request_id/payment/confirm",
            post(citizen::confirm_payment),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
