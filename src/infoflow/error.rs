//! Error types for the Infoflow protocol layer.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors raised while speaking the Infoflow robot protocol.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Handshake signature did not match.
    #[error("signature mismatch")]
    Auth,

    /// Inbound body could not be turned into plaintext (base64, key, cipher or padding failure).
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Decrypted plaintext is not a valid callback envelope.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(#[source] serde_json::Error),

    /// Outbound message violates the protocol before it is sent.
    #[error("invalid message: {0}")]
    InvalidMessage(&'static str),

    /// Outbound message could not be serialized or deserialized.
    #[error("message codec error: {0}")]
    MessageCodec(#[source] serde_json::Error),

    /// Outbound response body is not valid JSON.
    #[error("failed to parse response: {0}")]
    ResponseParse(#[source] serde_json::Error),

    /// The platform answered with a non-zero error code.
    #[error("infoflow api error {code}: {description} ({message})")]
    Api { code: i64, description: &'static str, message: String },

    /// The platform answered with a non-2xx HTTP status.
    #[error("transport error: HTTP {status}")]
    TransportStatus { status: u16 },

    /// The request never produced a response (connect, timeout, body read).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ProtocolError {
    /// HTTP status used when this error terminates an inbound webhook request.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ProtocolError::Auth => StatusCode::UNAUTHORIZED,
            ProtocolError::MalformedPayload(_) | ProtocolError::MalformedEnvelope(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
