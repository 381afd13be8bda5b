use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use reorder_core::service::RecommendationService;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    service: Arc<RecommendationService>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub data: HealthCheck,
    pub checked_at: String,
}

pub fn router(service: Arc<RecommendationService>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { service })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let data = data_check(&state.service);
    let ready = data.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "reorder-server runtime initialized".to_string(),
        },
        data,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

/// Ready only with a non-empty forecast; history gaps degrade individual
/// metrics, not the service.
fn data_check(service: &RecommendationService) -> HealthCheck {
    let engine = service.engine();
    let forecast = engine.forecast();

    if let Some(reason) = forecast.unavailable_reason() {
        return HealthCheck { status: "degraded", detail: reason.to_string() };
    }
    if forecast.is_empty() {
        return HealthCheck {
            status: "degraded",
            detail: "forecast snapshot has no rows".to_string(),
        };
    }

    let history_detail = if engine.metrics().is_empty() {
        "no purchase history"
    } else {
        "history metrics ready"
    };
    HealthCheck {
        status: "ready",
        detail: format!("{} forecast rows loaded, {history_detail}", forecast.len()),
    }
}
