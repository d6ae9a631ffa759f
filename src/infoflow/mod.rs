//! Infoflow robot protocol.
//!
//! This module contains everything that touches the platform's wire formats:
//! - Handshake signature verification for the callback address.
//! - Decryption of message callbacks and the decoded callback envelope.
//! - Outbound message encoding, response decoding, and the error code table.
//! - The HTTP client used to post replies to the robot webhook.

pub mod callback;
pub mod client;
pub mod codec;
pub mod error;
pub mod message;
pub mod signature;

pub use callback::{CallbackEnvelope, CallbackItem, CallbackItemKind, CallbackMessage};
pub use client::{RobotClient, RobotConfig};
pub use error::ProtocolError;
pub use message::{MessageOptions, OutboundItem, OutboundMessage, OutboundResponse};
