//! Library root for `grafana-copilot`.
//!
//! Grafana-copilot is an Infoflow group-chat robot that answers `/grafana` requests:
//! - Authenticates the robot's callback address handshake
//! - Decrypts and decodes message callbacks
//! - Asks an LLM which Grafana dashboards match the request
//! - Replies in the group with links to the suggested dashboards
//!
//! The protocol layer lives in [`infoflow`]; the LLM, chat, and dashboard integrations are
//! extensible traits in [`service`] so each can be swapped or mocked.

pub mod base;
pub mod infoflow;
pub mod interaction;
pub mod runtime;
pub mod service;

use std::net::SocketAddr;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::{info, warn};

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the grafana-copilot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with LLM, chat, and dashboard clients
/// - Serves the callback endpoint until shutdown
pub async fn start(config: Config, addr: SocketAddr) -> Void {
    info!("Starting grafana-copilot ...");

    // Start the crypto provider.
    if crypto::ring::default_provider().install_default().is_err() {
        warn!("A crypto provider was already installed.");
    }

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config)?;

    // Start the runtime.
    runtime.start(addr).await?;

    Ok(())
}
