//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use tracing::debug;

use crate::opendata::FetchError;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/sensors", get(list_sensors))
        .route("/sensors/:id", get(get_sensor))
        .route("/sensors/:id/refresh", post(refresh_sensor))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Sensor state of every configured station.
async fn list_sensors(State(state): State<AppState>) -> Json<SensorListResponse> {
    let now = Utc::now();
    let mut sensors = Vec::new();

    for (id, coordinator) in state.registry.entries().await {
        sensors.push(SensorResponse {
            id,
            sensor: coordinator.sensor_state(now).await,
        });
    }

    Json(SensorListResponse { sensors })
}

/// Sensor state of one station.
async fn get_sensor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SensorResponse>, AppError> {
    let coordinator = state
        .registry
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound {
            message: format!("unknown station: {id}"),
        })?;

    let sensor = coordinator.sensor_state(Utc::now()).await;
    Ok(Json(SensorResponse { id, sensor }))
}

/// Refresh one station immediately and return the new state.
async fn refresh_sensor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SensorResponse>, AppError> {
    let coordinator = state
        .registry
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound {
            message: format!("unknown station: {id}"),
        })?;

    coordinator.refresh_now().await?;

    let sensor = coordinator.sensor_state(Utc::now()).await;
    Ok(Json(SensorResponse { id, sensor }))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    NotFound { message: String },
    Upstream { message: String },
}

impl From<FetchError> for AppError {
    fn from(e: FetchError) -> Self {
        AppError::Upstream {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Upstream { message } => (StatusCode::BAD_GATEWAY, message),
        };

        debug!(%status, message = %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
