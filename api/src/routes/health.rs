use actix_web::{web, HttpResponse};
use chrono::Utc;

use mq_core::services::ShutdownPhase;
use mq_shared::types::{HealthResponse, HealthStatus};

use crate::state::AppState;

/// GET /v1/healthcheck
///
/// Answers 503 once shutdown has begun so load balancers stop routing here.
pub async fn healthcheck(state: web::Data<AppState>) -> HttpResponse {
    let phase = state.shutdown.phase();
    let status = match phase {
        ShutdownPhase::Running => HealthStatus::Available,
        ShutdownPhase::Draining | ShutdownPhase::Stopped => HealthStatus::Draining,
    };

    let body = HealthResponse {
        status,
        environment: state.environment.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        phase: phase.as_str().to_string(),
        timestamp: Utc::now(),
    };

    match status {
        HealthStatus::Available => HttpResponse::Ok().json(body),
        HealthStatus::Draining => HttpResponse::ServiceUnavailable().json(body),
    }
}
