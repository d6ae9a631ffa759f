//! Robot callback endpoint.
//!
//! The callback address receives two kinds of POST requests:
//! - Form-encoded handshakes carrying `signature`, `rn`, `timestamp` and `echostr`.
//! - Encrypted message callbacks, answered immediately and processed in the background.

use axum::{
    Router,
    body::Bytes,
    extract::{Form, FromRequest, Request, State},
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::{debug, error, instrument, warn};

use crate::{
    infoflow::{CallbackEnvelope, ProtocolError, codec, signature},
    runtime::Runtime,
};

use super::command;

/// Path the robot posts callbacks to.
pub const CALLBACK_PATH: &str = "/infoflow-robot-callback";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Handshake form; missing fields are empty.
#[derive(Debug, Default, Deserialize)]
struct HandshakeParams {
    #[serde(default)]
    signature: String,
    #[serde(default)]
    rn: String,
    #[serde(default)]
    echostr: String,
    #[serde(default)]
    timestamp: String,
}

/// Build the application router.
pub fn router(runtime: Runtime) -> Router {
    Router::new()
        .route(CALLBACK_PATH, post(receive_callback))
        .route("/health", get(health_check))
        .with_state(runtime)
}

async fn health_check() -> &'static str {
    "OK"
}

#[instrument(skip_all)]
async fn receive_callback(State(runtime): State<Runtime>, request: Request) -> Response {
    let is_handshake = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with(FORM_CONTENT_TYPE));

    if is_handshake {
        handle_handshake(&runtime, request).await
    } else {
        handle_message(runtime, request).await
    }
}

async fn handle_handshake(runtime: &Runtime, request: Request) -> Response {
    let params = match Form::<HandshakeParams>::from_request(request, &()).await {
        Ok(Form(params)) => params,
        Err(rejection) => {
            warn!("Unreadable handshake form: {}", rejection);
            HandshakeParams::default()
        }
    };

    if !signature::verify(&params.rn, &params.timestamp, &runtime.config.infoflow_robot_token, &params.signature) {
        error!("Handshake rejected: {}", ProtocolError::Auth);
        return ProtocolError::Auth.status_code().into_response();
    }

    debug!("Handshake accepted");

    (StatusCode::OK, params.echostr).into_response()
}

async fn handle_message(runtime: Runtime, request: Request) -> Response {
    let body = match Bytes::from_request(request, &()).await {
        Ok(body) => body,
        Err(rejection) => {
            error!("Unreadable callback body: {}", rejection);
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    match decode_callback(&body, &runtime.config.infoflow_robot_encoding_aes_key) {
        Ok(envelope) => {
            command::dispatch_callback(envelope, runtime);
            StatusCode::OK.into_response()
        }
        Err(err) => {
            error!("Callback rejected: {}", err);
            err.status_code().into_response()
        }
    }
}

fn decode_callback(body: &[u8], secret: &str) -> Result<CallbackEnvelope, ProtocolError> {
    let plaintext = codec::decode_payload(body, secret)?;
    debug!("Callback plaintext: {}", String::from_utf8_lossy(&plaintext));

    CallbackEnvelope::parse(&plaintext)
}
