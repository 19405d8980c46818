//! API router

use std::sync::Arc;
use std::time::Instant;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::modules::{bookings, health, metrics, parking_lots, reports, sensors};
use crate::application::ParkingService;

/// Build the full router. `/metrics` is mounted only when a Prometheus
/// recorder is installed.
pub fn create_api_router(
    service: ParkingService,
    started_at: Instant,
    prometheus: Option<PrometheusHandle>,
) -> Router {
    let health_state = health::HealthState {
        service: service.clone(),
        started_at: Arc::new(started_at),
    };

    let api_routes = Router::new()
        .route("/api/bookings", post(bookings::create_booking))
        .route("/api/sensors/updates", post(sensors::apply_sensor_updates))
        .route("/api/reports", post(reports::create_report))
        .route(
            "/api/parking-lots/{id}/availability",
            get(parking_lots::lot_availability),
        )
        .with_state(service);

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health_state);

    let mut app = Router::new().merge(api_routes).merge(health_routes);

    if let Some(handle) = prometheus {
        let metrics_routes = Router::new()
            .route("/metrics", get(metrics::prometheus_metrics))
            .with_state(metrics::MetricsState { handle });
        app = app.merge(metrics_routes);
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    app.layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
