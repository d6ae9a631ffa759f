//! Runtime services and shared state for grafana-copilot.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    interaction::webhook,
    service::{chat::ChatClient, dashboard::DashboardClient, llm::LlmClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration and every service client, and doubles as the axum
/// state. It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The LLM client instance.
    pub llm: LlmClient,
    /// The chat client instance.
    pub chat: ChatClient,
    /// The dashboard catalog instance.
    pub dashboards: DashboardClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub fn new(config: Config) -> Res<Self> {
        // Initialize the LLM client.
        let llm = LlmClient::openai(&config);

        // Initialize the robot client.
        let chat = ChatClient::infoflow(&config)?;

        // Initialize the grafana client.
        let dashboards = DashboardClient::grafana(&config)?;

        Ok(Self { config, llm, chat, dashboards })
    }

    /// Serve the callback endpoint on `addr` until Ctrl-C.
    pub async fn start(&self, addr: SocketAddr) -> Void {
        let listener = TcpListener::bind(addr).await?;
        info!("Listening on {}", listener.local_addr()?);

        axum::serve(listener, webhook::router(self.clone())).with_graceful_shutdown(shutdown_signal()).await?;

        info!("Server stopped.");

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", err);
        std::future::pending::<()>().await;
    }

    info!("Shutting down ...");
}
