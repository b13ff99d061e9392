use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use constant_time_eq::constant_time_eq;
use headers::{authorization::Basic, Authorization, HeaderMapExt};
use tracing::warn;

use crate::{config::RelayConfig, error::RelayError};

use super::state::AppState;

/// Reject requests without the configured basic-auth credentials before the
/// body is read.
pub async fn require_basic_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RelayError> {
    match request.headers().typed_get::<Authorization<Basic>>() {
        Some(credentials) if is_authorized(&state.config, &credentials) => {
            Ok(next.run(request).await)
        }
        Some(credentials) => {
            warn!(
                username = credentials.username(),
                "Rejected webhook with invalid credentials"
            );
            Err(RelayError::Unauthorized)
        }
        None => {
            warn!("Rejected webhook without basic-auth credentials");
            Err(RelayError::Unauthorized)
        }
    }
}

/// Compare credentials in constant time. Both fields are always compared.
fn is_authorized(config: &RelayConfig, credentials: &Authorization<Basic>) -> bool {
    let username_ok =
        constant_time_eq(credentials.username().as_bytes(), config.ttn_webhook_username.as_bytes());
    let password_ok =
        constant_time_eq(credentials.password().as_bytes(), config.ttn_webhook_password.as_bytes());
    username_ok & password_ok
}
