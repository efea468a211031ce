use std::{collections::BTreeMap, sync::Arc};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::Value;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::{
    report::Report,
    room::{DeviceSettingsUpdate, DeviceStatus, Room},
    sensor::{IngestResult, Metric, RawNumber, Sample},
    thresholds::{Settings, SettingsUpdate},
};

type RoomArc = Arc<Room>;

pub fn router(room: RoomArc) -> Router {
    Router::new()
        .route("/api/device/send", post(send))
        .route("/api/device/settings", post(update_devices))
        .route("/api/get/report", get(report))
        .route("/api/get/settings", get(settings))
        .route("/api/get/device_status", get(device_status))
        .route("/api/get/data", get(data))
        .route("/api/common/settings", post(update_settings))
        .with_state(room)
        .layer(TraceLayer::new_for_http())
}

pub fn status_code(result: IngestResult) -> StatusCode {
    match result {
        IngestResult::AuthRequired => StatusCode::FORBIDDEN,
        IngestResult::AuthRejected => StatusCode::UNAUTHORIZED,
        IngestResult::BadRequest => StatusCode::BAD_REQUEST,
        IngestResult::Accepted => StatusCode::CREATED,
    }
}

/// Both fields are taken as loose JSON so that the token is always checked
/// before the value's shape.
#[derive(Debug, Deserialize)]
struct SendRequest {
    #[serde(rename = "Auth", default)]
    auth: Option<Value>,

    #[serde(default)]
    value: Option<RawNumber>,
}

async fn send(State(room): State<RoomArc>, Json(req): Json<SendRequest>) -> StatusCode {
    let token = req.auth.as_ref().and_then(Value::as_str);
    let result = room.ingest(token, req.value.as_ref()).await;

    if result == IngestResult::Accepted {
        room.evaluate().await;
    }

    status_code(result)
}

#[derive(Debug, Default, Deserialize)]
struct PeriodQuery {
    period: Option<f64>,
}

async fn report(
    State(room): State<RoomArc>,
    Query(query): Query<PeriodQuery>,
) -> Json<Option<Report>> {
    Json(room.make_report(query.period).await)
}

async fn settings(State(room): State<RoomArc>) -> Json<Settings> {
    Json(room.settings().await)
}

async fn update_settings(
    State(room): State<RoomArc>,
    Json(update): Json<SettingsUpdate>,
) -> StatusCode {
    room.update_settings(&update).await;

    StatusCode::OK
}

async fn device_status(State(room): State<RoomArc>) -> Json<DeviceStatus> {
    Json(room.device_status().await)
}

async fn update_devices(
    State(room): State<RoomArc>,
    Json(update): Json<DeviceSettingsUpdate>,
) -> StatusCode {
    room.update_devices(&update).await;

    StatusCode::OK
}

async fn data(
    State(room): State<RoomArc>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<BTreeMap<Metric, Vec<Sample>>>, (StatusCode, String)> {
    let period = query
        .period
        .unwrap_or(room.settings().await.period.report.as_secs_f64());

    room.data(period).await.map(Json).map_err(|e| {
        error!("failed to read samples: {e:#}");
        (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}"))
    })
}
