use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{error, info, warn};

use crate::{
    error::{RelayError, Result},
    position::map_position,
    uplink::Uplink,
};

use super::state::AppState;

/// Handle an uplink webhook from TTN and forward it to Traccar
pub async fn handle_webhook(State(state): State<AppState>, body: Bytes) -> Response {
    match forward_uplink(&state, &body).await {
        Ok(()) => Json(json!({ "message": "Data forwarded successfully" })).into_response(),
        Err(e @ RelayError::DeviceIdMissing) => {
            warn!("Uplink without device id, nothing forwarded");
            e.into_response()
        }
        Err(e) => {
            error!("Error processing request: {}", e);
            e.into_response()
        }
    }
}

async fn forward_uplink(state: &AppState, body: &[u8]) -> Result<()> {
    let uplink = Uplink::from_slice(body)?;
    info!(payload = %uplink, "Received data from TTN");

    let device_id = uplink.device_id().ok_or(RelayError::DeviceIdMissing)?;
    let keys = &state.config.payload_keys;
    let mapped = map_position(device_id.as_str(), uplink.decoded_payload(), keys);

    if !mapped.missing.is_empty() {
        warn!(device_id = %device_id, "Missing payload fields: {}", mapped.missing.join(", "));
    }

    state.osmand.send_position(&mapped.params).await
}

/// Health check endpoint handler
pub async fn health_check() -> impl IntoResponse {
    "OK"
}
