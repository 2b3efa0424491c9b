use axum::{extract::State, response::Json};
use chrono::Utc;
use tracing::{instrument, warn};

use crate::schemas::{AppState, HealthResponse, ServiceIndex};

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 500, description = "Service is unhealthy", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    // Test database connection
    let db_status = match state.db.ping().await {
        Ok(_) => "connected".to_string(),
        Err(e) => {
            warn!("Database ping failed: {}", e);
            "disconnected".to_string()
        }
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Service index listing the main endpoints
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Service is running", body = ServiceIndex)
    )
)]
#[instrument]
pub async fn service_index() -> Json<ServiceIndex> {
    let endpoints = [
        "/ - Server status",
        "/health - Health check",
        "/registerVolunteer - Register new volunteer",
        "/loginVolunteer - Volunteer login",
        "/registerAdmin - Register new admin",
        "/loginAdmin - Admin login",
        "/createActivity - Create new activity",
        "/getActivities - Get all activities",
        "/markAttendance - Mark attendance",
        "/addIndividualWork - Assign individual work",
        "/getTopPerformers - Monthly top performers",
        "/swagger-ui - API documentation",
    ];

    Json(ServiceIndex {
        message: "NSS Volunteer Management Server is running!".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: endpoints.iter().map(|e| e.to_string()).collect(),
    })
}
