//! API routes.

pub mod computers;
pub mod employees;
pub mod health;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, put},
    Router,
};
use tower_http::{compression::CompressionLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracker_core::validation::validate_employee_abbreviation;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::middleware::rate_limit::rate_limit;
use crate::middleware::security::{cors, with_security_headers};
use crate::response::ApiError;
use crate::state::AppState;

/// Creates the API router.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let api = Router::new()
        .route(
            "/computers",
            get(computers::list_computers).post(computers::create_computer),
        )
        .route(
            "/computers/:id",
            get(computers::get_computer)
                .put(computers::update_computer)
                .delete(computers::delete_computer),
        )
        .route(
            "/employees/:code/computers",
            get(employees::list_employee_computers),
        )
        .route(
            "/employees/:code/computers/:id",
            put(employees::assign_computer).delete(employees::unassign_computer),
        )
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::ready_handler))
        .route("/health/live", get(health::live_handler))
        .route("/metrics", get(health::metrics_handler));

    // Innermost first. CORS stays outermost so preflights never reach the limiter.
    let app = Router::new()
        .nest("/api/v1", api)
        .layer(from_fn_with_state(state.clone(), rate_limit))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors(config));

    with_security_headers(app).with_state(state)
}

/// Parse a computer ID path segment.
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::bad_request(format!("invalid computer ID: {}", raw)))
}

/// Validate an employee code path segment.
pub(crate) fn parse_employee_code(raw: &str) -> Result<String, ApiError> {
    if raw.is_empty() {
        return Err(ApiError::bad_request("employee abbreviation is required"));
    }
    validate_employee_abbreviation(raw).map_err(ApiError::bad_request)?;
    Ok(raw.to_string())
}
