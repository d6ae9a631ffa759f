//! HTTP client for the robot webhook.
//!
//! A send is a single POST; no retries are attempted here.

use std::time::Duration;

use reqwest::{Client, header::CONTENT_TYPE};
use tracing::{debug, instrument, warn};

use super::{
    error::ProtocolError,
    message::{MessageOptions, OutboundItem, OutboundMessage, OutboundResponse},
};

/// Default timeout for a single send.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct RobotConfig {
    /// Full webhook URL of the robot, including its access token.
    pub webhook_address: String,
    /// Request timeout; [`DEFAULT_TIMEOUT`] when unset.
    pub timeout: Option<Duration>,
}

/// Sends outbound messages to the robot webhook.
#[derive(Debug, Clone)]
pub struct RobotClient {
    http_client: Client,
    webhook_address: String,
}

impl RobotClient {
    pub fn new(config: &RobotConfig) -> Result<Self, ProtocolError> {
        let http_client = Client::builder().timeout(config.timeout.unwrap_or(DEFAULT_TIMEOUT)).build()?;
        Ok(Self::with_http_client(config, http_client))
    }

    pub fn with_http_client(config: &RobotConfig, http_client: Client) -> Self {
        Self {
            http_client,
            webhook_address: config.webhook_address.clone(),
        }
    }

    /// Send a text message, followed by a mention when `options` enables one.
    pub async fn send_text(&self, group_ids: Vec<i64>, content: &str, options: Option<&MessageOptions>) -> Result<OutboundResponse, ProtocolError> {
        self.send(&with_mention(group_ids, OutboundItem::text(content), options)).await
    }

    /// Send a link message, followed by a mention when `options` enables one.
    pub async fn send_link(&self, group_ids: Vec<i64>, href: &str, options: Option<&MessageOptions>) -> Result<OutboundResponse, ProtocolError> {
        self.send(&with_mention(group_ids, OutboundItem::link(href), options)).await
    }

    pub async fn send_image(&self, group_ids: Vec<i64>, image: &[u8]) -> Result<OutboundResponse, ProtocolError> {
        self.send(&OutboundMessage::new(group_ids, vec![OutboundItem::image(image)])).await
    }

    pub async fn send_markdown(&self, group_ids: Vec<i64>, content: &str) -> Result<OutboundResponse, ProtocolError> {
        self.send(&OutboundMessage::new(group_ids, vec![OutboundItem::markdown(content)])).await
    }

    /// POST `message` and interpret the platform's answer.
    #[instrument(name = "RobotClient::send", skip_all)]
    pub async fn send(&self, message: &OutboundMessage) -> Result<OutboundResponse, ProtocolError> {
        let body = message.encode()?;

        debug!("Sending {} byte message to {} group(s)", body.len(), message.header.to_ids.len());

        let response = self.http_client.post(&self.webhook_address).header(CONTENT_TYPE, "application/json").body(body).send().await?;

        let status = response.status();
        // The body is read in every case so the connection can go back to the pool.
        let bytes = response.bytes().await;

        if !status.is_success() {
            warn!("Robot webhook answered with HTTP {}", status);
            return Err(ProtocolError::TransportStatus { status: status.as_u16() });
        }

        let response = OutboundResponse::decode(&bytes?)?.into_result()?;

        if !response.data.failed.is_empty() {
            warn!("Message not delivered to: {:?}", response.data.failed);
        }

        Ok(response)
    }
}

fn with_mention(group_ids: Vec<i64>, item: OutboundItem, options: Option<&MessageOptions>) -> OutboundMessage {
    let mut body = vec![item];

    if let Some(options) = options.filter(|o| o.is_at_enabled()) {
        body.push(options.at_item());
    }

    OutboundMessage::new(group_ids, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;

    fn client_for(server: &MockServer, timeout: Option<Duration>) -> RobotClient {
        RobotClient::new(&RobotConfig {
            webhook_address: server.url("/msg/groupmsgsend?access_token=abc"),
            timeout,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn send_text_posts_json_with_mention() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/msg/groupmsgsend")
                    .query_param("access_token", "abc")
                    .header("content-type", "application/json")
                    .json_body(json!({
                        "message": {
                            "header": { "toid": [5678] },
                            "body": [
                                { "type": "TEXT", "content": "hello" },
                                { "type": "AT", "atuserids": ["zhangsan"] }
                            ]
                        }
                    }));
                then.status(200).header("content-type", "application/json").body(r#"{"errcode":0,"errmsg":"ok","data":{"fail":{}}}"#);
            })
            .await;

        let options = MessageOptions::at_users(vec!["zhangsan".into()]);
        let response = client_for(&server, None).send_text(vec![5678], "hello", Some(&options)).await.unwrap();

        assert!(response.is_success());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn send_link_without_options_has_single_item() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/msg/groupmsgsend").json_body(json!({
                    "message": {
                        "header": { "toid": [1] },
                        "body": [{ "type": "LINK", "href": "https://example.com" }]
                    }
                }));
                then.status(200).body(r#"{"errcode":0,"errmsg":"ok"}"#);
            })
            .await;

        client_for(&server, None).send_link(vec![1], "https://example.com", None).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn send_image_encodes_base64() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/msg/groupmsgsend").json_body(json!({
                    "message": {
                        "header": { "toid": [1] },
                        "body": [{ "type": "IMAGE", "content": "cG5n" }]
                    }
                }));
                then.status(200).body(r#"{"errcode":0,"errmsg":"ok"}"#);
            })
            .await;

        client_for(&server, None).send_image(vec![1], b"png").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_2xx_is_transport_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(502).body("bad gateway");
            })
            .await;

        let err = client_for(&server, None).send_markdown(vec![1], "# hi").await.unwrap_err();

        assert!(matches!(err, ProtocolError::TransportStatus { status: 502 }));
    }

    #[tokio::test]
    async fn non_zero_code_is_api_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).body(r#"{"errcode":40044,"errmsg":"robot not in group"}"#);
            })
            .await;

        let err = client_for(&server, None).send_text(vec![1], "hi", None).await.unwrap_err();

        assert!(matches!(err, ProtocolError::Api { code: 40044, .. }));
    }

    #[tokio::test]
    async fn garbage_body_is_parse_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).body("<html></html>");
            })
            .await;

        let err = client_for(&server, None).send_text(vec![1], "hi", None).await.unwrap_err();

        assert!(matches!(err, ProtocolError::ResponseParse(_)));
    }

    #[tokio::test]
    async fn slow_webhook_times_out() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).delay(Duration::from_millis(500)).body(r#"{"errcode":0}"#);
            })
            .await;

        let err = client_for(&server, Some(Duration::from_millis(50))).send_text(vec![1], "hi", None).await.unwrap_err();

        assert!(matches!(err, ProtocolError::Transport(_)));
    }

    #[tokio::test]
    async fn invalid_message_is_not_sent() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).body(r#"{"errcode":0}"#);
            })
            .await;

        let err = client_for(&server, None).send_text(vec![], "hi", None).await.unwrap_err();

        assert!(matches!(err, ProtocolError::InvalidMessage(_)));
        mock.assert_hits_async(0).await;
    }
}
