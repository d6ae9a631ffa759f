//! Infoflow robot implementation of the chat seam.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;

use crate::{
    base::{config::Config, types::Res},
    infoflow::{OutboundMessage, OutboundResponse, RobotClient, RobotConfig},
};

use super::{ChatClient, GenericChatClient};

// Extra methods on `ChatClient` applied by the infoflow implementation.

impl ChatClient {
    pub fn infoflow(config: &Config) -> Res<Self> {
        let client = InfoflowChatClient::new(config)?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Specific implementations.

/// Posts replies through the robot webhook.
#[derive(Debug, Clone)]
pub struct InfoflowChatClient {
    robot: RobotClient,
}

impl InfoflowChatClient {
    #[instrument(name = "InfoflowChatClient::new", skip_all)]
    pub fn new(config: &Config) -> Res<Self> {
        let robot = RobotClient::new(&RobotConfig {
            webhook_address: config.infoflow_robot_webhook_address.clone(),
            timeout: Some(config.infoflow_robot_timeout()),
        })?;

        Ok(Self { robot })
    }
}

#[async_trait]
impl GenericChatClient for InfoflowChatClient {
    async fn send_message(&self, message: &OutboundMessage) -> Res<OutboundResponse> {
        Ok(self.robot.send(message).await?)
    }
}
