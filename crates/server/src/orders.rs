//! Order recommendation API.
//!
//! - `GET    /api/orders/recommended` recommendations for the week of `target_date`
//! - `GET    /api/orders/customers`   customers present in the forecast
//! - `GET    /api/orders/dates`       week-ending Sundays, optionally by `data_split`
//! - `DELETE /api/orders/cache`       drop cached responses
//! - `POST   /api/data/reload`        re-read both CSV snapshots and swap the engine

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use reorder_core::config::DataConfig;
use reorder_core::domain::DataSplit;
use reorder_core::errors::{ApplicationError, InterfaceError};
use reorder_core::recommend::{RecommendationPolicy, RecommendationResponse};
use reorder_core::service::RecommendationService;
use reorder_data::Snapshot;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct OrdersState {
    service: Arc<RecommendationService>,
    data: DataConfig,
    policy: RecommendationPolicy,
}

impl OrdersState {
    pub fn new(
        service: Arc<RecommendationService>,
        data: DataConfig,
        policy: RecommendationPolicy,
    ) -> Self {
        Self { service, data, policy }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RecommendedQuery {
    pub target_date: Option<String>,
    pub customer: Option<String>,
    pub use_cache: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
pub struct DatesQuery {
    pub data_split: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CustomersResponse {
    pub success: bool,
    pub customers: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DatesResponse {
    pub success: bool,
    pub dates: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct CacheClearResponse {
    pub success: bool,
    pub message: String,
    pub evicted: usize,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub success: bool,
    pub message: String,
    pub history_rows: usize,
    pub forecast_rows: usize,
    pub evicted: usize,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub correlation_id: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

pub fn router(state: OrdersState) -> Router {
    Router::new()
        .route("/api/orders/recommended", get(recommended_orders))
        .route("/api/orders/customers", get(customers))
        .route("/api/orders/dates", get(available_dates))
        .route("/api/orders/cache", delete(clear_cache))
        .route("/api/data/reload", post(reload_data))
        .with_state(state)
}

/// Data gaps are reported in the body with `success = false`; only bad input
/// maps to an HTTP error.
async fn recommended_orders(
    State(state): State<OrdersState>,
    Query(query): Query<RecommendedQuery>,
) -> ApiResult<RecommendationResponse> {
    let correlation_id = correlation_id();
    let Some(target_date) = query.target_date.as_deref().filter(|date| !date.trim().is_empty())
    else {
        return Err(bad_request("`target_date` query parameter is required", correlation_id));
    };
    let customer = query.customer.as_deref().filter(|customer| !customer.is_empty());
    let use_cache = query.use_cache.unwrap_or(true);

    match state.service.recommend(target_date, customer, use_cache) {
        Ok(response) => {
            info!(
                event_name = "api.orders.recommended",
                correlation_id = %correlation_id,
                week = %response.week,
                customer = customer.unwrap_or("all"),
                success = response.success,
                rows = response.rows.len(),
                "recommendations served"
            );
            Ok(Json(response))
        }
        Err(error) => {
            warn!(
                event_name = "api.orders.invalid_date",
                correlation_id = %correlation_id,
                target_date = %target_date,
                "rejected recommendation request"
            );
            Err(interface_error(ApplicationError::from(error).into_interface(correlation_id)))
        }
    }
}

async fn customers(State(state): State<OrdersState>) -> ApiResult<CustomersResponse> {
    Ok(Json(CustomersResponse { success: true, customers: state.service.customers() }))
}

async fn available_dates(
    State(state): State<OrdersState>,
    Query(query): Query<DatesQuery>,
) -> ApiResult<DatesResponse> {
    let split = match query.data_split.as_deref().filter(|split| !split.trim().is_empty()) {
        Some(raw) => match raw.parse::<DataSplit>() {
            Ok(split) => Some(split),
            Err(_) => {
                return Err(bad_request(
                    format!("unknown data_split `{raw}` (expected Train|Test|Forecast)"),
                    correlation_id(),
                ));
            }
        },
        None => None,
    };

    let dates: Vec<String> =
        state.service.available_weeks(split).into_iter().map(|week| week.to_string()).collect();
    Ok(Json(DatesResponse { success: true, count: dates.len(), dates }))
}

async fn clear_cache(State(state): State<OrdersState>) -> ApiResult<CacheClearResponse> {
    let evicted = state.service.clear_cache();
    Ok(Json(CacheClearResponse {
        success: true,
        message: "Cache cleared successfully".to_string(),
        evicted,
    }))
}

/// Requests already holding the old engine finish against it; the cache is
/// emptied together with the swap.
async fn reload_data(State(state): State<OrdersState>) -> ApiResult<ReloadResponse> {
    let correlation_id = correlation_id();
    let data = state.data.clone();

    let loaded = match tokio::task::spawn_blocking(move || Snapshot::load(&data)).await {
        Ok(loaded) => loaded,
        Err(join_error) => {
            error!(
                event_name = "api.data.reload_panicked",
                correlation_id = %correlation_id,
                error = %join_error,
                "snapshot reload task failed"
            );
            let failure = ApplicationError::Internal(join_error.to_string());
            return Err(interface_error(failure.into_interface(correlation_id)));
        }
    };

    let snapshot = match loaded {
        Ok(snapshot) => snapshot,
        Err(load_error) => {
            error!(
                event_name = "api.data.reload_failed",
                correlation_id = %correlation_id,
                error = %load_error,
                "snapshot reload failed; keeping the current engine"
            );
            let failure = ApplicationError::DataLoad(load_error.to_string());
            return Err(interface_error(failure.into_interface(correlation_id)));
        }
    };

    let history_rows = snapshot.history.len();
    let forecast_rows = snapshot.forecast.len();
    let forecast_available = snapshot.forecast.is_available();
    let evicted = state.service.replace_engine(snapshot.into_engine(state.policy));

    info!(
        event_name = "api.data.reloaded",
        correlation_id = %correlation_id,
        history_rows,
        forecast_rows,
        evicted,
        "data snapshot reloaded"
    );

    Ok(Json(ReloadResponse {
        success: forecast_available,
        message: if forecast_available {
            "Data reloaded successfully".to_string()
        } else {
            "Data reloaded without forecast rows".to_string()
        },
        history_rows,
        forecast_rows,
        evicted,
    }))
}

fn correlation_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn bad_request(message: impl Into<String>, correlation_id: String) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_REQUEST, Json(ApiError { error: message.into(), correlation_id }))
}

/// Internal failures keep their detail in the logs, not the body.
fn interface_error(error: InterfaceError) -> (StatusCode, Json<ApiError>) {
    let correlation_id = error.correlation_id().to_string();
    match error {
        InterfaceError::BadRequest { message, .. } => {
            (StatusCode::BAD_REQUEST, Json(ApiError { error: message, correlation_id }))
        }
        InterfaceError::ServiceUnavailable { message, .. } => {
            (StatusCode::SERVICE_UNAVAILABLE, Json(ApiError { error: message, correlation_id }))
        }
        error @ InterfaceError::Internal { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError { error: error.user_message().to_string(), correlation_id }),
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
        Router,
    };
    use reorder_core::config::DataConfig;
    use reorder_core::recommend::RecommendationPolicy;
    use reorder_core::service::RecommendationService;
    use reorder_data::fixtures::{self, DEMO_FORECAST_WEEK, DEMO_TEST_WEEK};
    use reorder_data::Snapshot;
    use serde_json::Value;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::{router, OrdersState};

    struct Harness {
        _dir: TempDir,
        data: DataConfig,
        service: Arc<RecommendationService>,
    }

    impl Harness {
        fn seeded() -> Self {
            let dir = TempDir::new().expect("temp dir");
            let paths = fixtures::write_demo_csv(dir.path()).expect("seed demo data");
            let data = DataConfig { history_path: paths.history, forecast_path: paths.forecast };
            let snapshot = Snapshot::load(&data).expect("load seeded snapshot");
            let engine = snapshot.into_engine(RecommendationPolicy::default());
            Self { _dir: dir, data, service: Arc::new(RecommendationService::new(engine)) }
        }

        fn app(&self) -> Router {
            router(OrdersState::new(
                self.service.clone(),
                self.data.clone(),
                RecommendationPolicy::default(),
            ))
        }
    }

    async fn call(app: Router, method: Method, uri: &str) -> (StatusCode, Value) {
        let request =
            Request::builder().method(method).uri(uri).body(Body::empty()).expect("request");
        let response = app.oneshot(request).await.expect("router response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body bytes");
        let payload = serde_json::from_slice(&bytes).expect("json body");
        (status, payload)
    }

    #[tokio::test]
    async fn recommended_aligns_the_date_and_reports_the_week() {
        let harness = Harness::seeded();

        let (status, payload) =
            call(harness.app(), Method::GET, "/api/orders/recommended?target_date=2025-01-22")
                .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["success"], true);
        assert_eq!(payload["week"], DEMO_TEST_WEEK);
        assert_eq!(payload["rows"].as_array().map(Vec::len), Some(5));
        assert_eq!(payload["summary"]["customer_filter"], "All");
        assert_eq!(harness.service.cache().len(), 1);
    }

    #[tokio::test]
    async fn recommended_filters_by_customer_and_can_bypass_the_cache() {
        let harness = Harness::seeded();
        let uri = format!(
            "/api/orders/recommended?target_date={DEMO_FORECAST_WEEK}\
             &customer=Sunrise%20Deli&use_cache=false"
        );

        let (status, payload) = call(harness.app(), Method::GET, &uri).await;

        assert_eq!(status, StatusCode::OK);
        let rows = payload["rows"].as_array().expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["item_code"], "3001");
        assert!(harness.service.cache().is_empty());
    }

    #[tokio::test]
    async fn recommended_rejects_invalid_and_missing_dates() {
        let harness = Harness::seeded();

        let (status, payload) =
            call(harness.app(), Method::GET, "/api/orders/recommended?target_date=2025-13-40")
                .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(payload["error"].as_str().unwrap_or_default().contains("2025-13-40"));
        assert!(!payload["correlation_id"].as_str().unwrap_or_default().is_empty());

        let (status, payload) = call(harness.app(), Method::GET, "/api/orders/recommended").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(payload["error"].as_str().unwrap_or_default().contains("target_date"));
    }

    #[tokio::test]
    async fn weeks_without_rows_fail_in_the_body() {
        let harness = Harness::seeded();

        let (status, payload) =
            call(harness.app(), Method::GET, "/api/orders/recommended?target_date=2025-03-05")
                .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["success"], false);
        assert_eq!(payload["error"], "No prediction data available for date 2025-03-09");
        assert!(harness.service.cache().is_empty());
    }

    #[tokio::test]
    async fn customers_and_dates_list_the_forecast() {
        let harness = Harness::seeded();

        let (_, customers) = call(harness.app(), Method::GET, "/api/orders/customers").await;
        assert_eq!(
            customers["customers"],
            serde_json::json!(["Corner Market", "Harbor Cafe", "Sunrise Deli"])
        );

        let (_, all) = call(harness.app(), Method::GET, "/api/orders/dates").await;
        assert_eq!(all["dates"], serde_json::json!([DEMO_TEST_WEEK, DEMO_FORECAST_WEEK]));
        assert_eq!(all["count"], 2);

        let (_, tested) =
            call(harness.app(), Method::GET, "/api/orders/dates?data_split=Test").await;
        assert_eq!(tested["dates"], serde_json::json!([DEMO_TEST_WEEK]));

        let (status, _) =
            call(harness.app(), Method::GET, "/api/orders/dates?data_split=Holdout").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn clearing_the_cache_reports_evictions() {
        let harness = Harness::seeded();
        harness.service.recommend(DEMO_TEST_WEEK, None, true).expect("valid date");
        harness.service.recommend(DEMO_FORECAST_WEEK, None, true).expect("valid date");

        let (status, payload) = call(harness.app(), Method::DELETE, "/api/orders/cache").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["success"], true);
        assert_eq!(payload["evicted"], 2);
        assert!(harness.service.cache().is_empty());
    }

    #[tokio::test]
    async fn reload_swaps_the_engine_and_clears_the_cache() {
        let harness = Harness::seeded();
        harness.service.recommend(DEMO_TEST_WEEK, None, true).expect("valid date");
        std::fs::remove_file(&harness.data.forecast_path).expect("remove forecast");

        let (status, payload) = call(harness.app(), Method::POST, "/api/data/reload").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload["success"], false);
        assert_eq!(payload["forecast_rows"], 0);
        assert_eq!(payload["evicted"], 1);

        let response = harness.service.recommend(DEMO_TEST_WEEK, None, true).expect("valid date");
        assert_eq!(response.error.as_deref(), Some("Prediction data not available"));
    }

    #[tokio::test]
    async fn reload_keeps_the_current_engine_when_rows_are_malformed() {
        let harness = Harness::seeded();
        std::fs::write(
            &harness.data.history_path,
            "CustomerName,ItemCode,ItemName,TrxDate,TotalQuantity\nAcme,1,Milk,2025-01-05,lots\n",
        )
        .expect("write malformed history");

        let (status, payload) = call(harness.app(), Method::POST, "/api/data/reload").await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(payload["error"].as_str().unwrap_or_default().contains("TotalQuantity"));

        let response = harness.service.recommend(DEMO_TEST_WEEK, None, true).expect("valid date");
        assert!(response.success);
    }
}
