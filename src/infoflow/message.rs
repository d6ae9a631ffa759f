//! Outbound robot messages, their wire encoding, and the platform's error codes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_with::{DefaultOnNull, base64::Base64, serde_as};

use super::error::ProtocolError;

/// Error code of a successful send.
pub const ERR_NONE: i64 = 0;

/// Human readable description of a platform error code; empty for unknown codes.
pub fn error_description(code: i64) -> &'static str {
    match code {
        ERR_NONE => "",
        -1 => "系统错误",
        40000 => "参数错误",
        40035 => "群聊ID不合法",
        40036 => "群聊非企业群",
        40040 => "参数错误",
        40044 => "机器人未被添加到群中",
        40045 => "agentId不合法",
        40046 => "发送消息频率超限",
        40047 => "文件上传失败",
        40060 => "body超过9k",
        40061 => "text类型文本总长度超过2k",
        40062 => "link类型单个链接长度超过1k",
        40063 => "image类型图片数量超过1个",
        40064 => "header中offlinenotify长度超过1k",
        40065 => "header中compatible长度超过1k",
        40066 => "image类型图片大小超过1m",
        40067 => "markdown类型数量超过1个",
        40068 => "markdown内容长度超过2048个字符",
        40069 => "message属性格式不正确",
        40071 => "at超过50人",
        40200 => "机器人发送消息权限已被封禁",
        40201 => "机器人接受消息权限已被封禁",
        40300 => "机器人已被停用",
        _ => "",
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// A reply to one or more groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub header: OutboundHeader,
    pub body: Vec<OutboundItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundHeader {
    /// Recipient group IDs.
    #[serde(rename = "toid")]
    pub to_ids: Vec<i64>,
}

/// A body item of an outbound message.
///
/// Both mention variants share the `AT` tag on the wire; `AtAll` never carries user IDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "WireItem", from = "WireItem")]
pub enum OutboundItem {
    Text { content: String },
    Link { href: String },
    /// Raw image bytes, base64 encoded on the wire.
    Image { content: Vec<u8> },
    Markdown { content: String },
    AtAll,
    AtUsers { at_user_ids: Vec<String> },
}

impl OutboundItem {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text { content: content.into() }
    }

    pub fn link(href: impl Into<String>) -> Self {
        Self::Link { href: href.into() }
    }

    pub fn image(content: impl Into<Vec<u8>>) -> Self {
        Self::Image { content: content.into() }
    }

    pub fn markdown(content: impl Into<String>) -> Self {
        Self::Markdown { content: content.into() }
    }

    pub fn at_all() -> Self {
        Self::AtAll
    }

    pub fn at_users(user_ids: Vec<String>) -> Self {
        Self::AtUsers { at_user_ids: user_ids }
    }
}

/// Wire shape of a body item; empty fields are not serialized at all.
#[serde_as]
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
enum WireItem {
    #[serde(rename = "TEXT")]
    Text {
        #[serde(default, skip_serializing_if = "String::is_empty")]
        content: String,
    },
    #[serde(rename = "LINK")]
    Link {
        #[serde(default, skip_serializing_if = "String::is_empty")]
        href: String,
    },
    #[serde(rename = "IMAGE")]
    Image {
        #[serde_as(as = "Base64")]
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        content: Vec<u8>,
    },
    #[serde(rename = "MD")]
    Markdown {
        #[serde(default, skip_serializing_if = "String::is_empty")]
        content: String,
    },
    #[serde(rename = "AT")]
    At {
        #[serde(rename = "atall", default, skip_serializing_if = "is_false")]
        at_all: bool,
        #[serde(rename = "atuserids", default, skip_serializing_if = "Vec::is_empty")]
        at_user_ids: Vec<String>,
    },
}

impl From<OutboundItem> for WireItem {
    fn from(item: OutboundItem) -> Self {
        match item {
            OutboundItem::Text { content } => WireItem::Text { content },
            OutboundItem::Link { href } => WireItem::Link { href },
            OutboundItem::Image { content } => WireItem::Image { content },
            OutboundItem::Markdown { content } => WireItem::Markdown { content },
            OutboundItem::AtAll => WireItem::At {
                at_all: true,
                at_user_ids: Vec::new(),
            },
            OutboundItem::AtUsers { at_user_ids } => WireItem::At { at_all: false, at_user_ids },
        }
    }
}

impl From<WireItem> for OutboundItem {
    fn from(item: WireItem) -> Self {
        match item {
            WireItem::Text { content } => OutboundItem::Text { content },
            WireItem::Link { href } => OutboundItem::Link { href },
            WireItem::Image { content } => OutboundItem::Image { content },
            WireItem::Markdown { content } => OutboundItem::Markdown { content },
            WireItem::At { at_all: true, .. } => OutboundItem::AtAll,
            WireItem::At { at_user_ids, .. } => OutboundItem::AtUsers { at_user_ids },
        }
    }
}

/// Mention settings appended to text and link messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageOptions {
    pub at_user_ids: Vec<String>,
    pub at_all: bool,
}

impl MessageOptions {
    /// Mention the given users.
    pub fn at_users(user_ids: Vec<String>) -> Self {
        Self { at_user_ids: user_ids, at_all: false }
    }

    pub fn is_at_enabled(&self) -> bool {
        self.at_all || !self.at_user_ids.is_empty()
    }

    /// The AT item for these options; "everyone" wins over explicit users.
    pub fn at_item(&self) -> OutboundItem {
        if self.at_all {
            OutboundItem::at_all()
        } else {
            OutboundItem::at_users(self.at_user_ids.clone())
        }
    }
}

#[derive(Serialize)]
struct RequestBodyRef<'a> {
    message: &'a OutboundMessage,
}

#[derive(Deserialize)]
struct RequestBody {
    message: OutboundMessage,
}

impl OutboundMessage {
    pub fn new(to_ids: Vec<i64>, body: Vec<OutboundItem>) -> Self {
        Self {
            header: OutboundHeader { to_ids },
            body,
        }
    }

    /// Check the invariants the platform enforces: recipients and body are both non-empty.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.header.to_ids.is_empty() {
            return Err(ProtocolError::InvalidMessage("message has no recipients"));
        }

        if self.body.is_empty() {
            return Err(ProtocolError::InvalidMessage("message has no body items"));
        }

        Ok(())
    }

    /// Serialize as the request body `{"message": ...}`.
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        self.validate()?;
        serde_json::to_vec(&RequestBodyRef { message: self }).map_err(ProtocolError::MessageCodec)
    }

    /// Parse a request body produced by [`OutboundMessage::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        let request: RequestBody = serde_json::from_slice(bytes).map_err(ProtocolError::MessageCodec)?;
        request.message.validate()?;
        Ok(request.message)
    }
}

/// Response of the robot webhook.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundResponse {
    #[serde(rename = "errcode", default)]
    pub error_code: i64,
    #[serde(rename = "errmsg", default)]
    pub error_message: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub data: ResponseData,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseData {
    /// Recipients the message could not be delivered to, with a per-recipient code.
    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "fail", default)]
    pub failed: HashMap<String, i64>,
}

impl OutboundResponse {
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        serde_json::from_slice(bytes).map_err(ProtocolError::ResponseParse)
    }

    pub fn is_success(&self) -> bool {
        self.error_code == ERR_NONE
    }

    pub fn description(&self) -> &'static str {
        error_description(self.error_code)
    }

    /// Surface a non-zero error code as [`ProtocolError::Api`].
    pub fn into_result(self) -> Result<Self, ProtocolError> {
        if self.is_success() {
            return Ok(self);
        }

        Err(ProtocolError::Api {
            code: self.error_code,
            description: self.description(),
            message: self.error_message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn encoded(message: &OutboundMessage) -> Value {
        serde_json::from_slice(&message.encode().unwrap()).unwrap()
    }

    #[test]
    fn encode_wraps_message_and_omits_empty_fields() {
        let message = OutboundMessage::new(
            vec![5678],
            vec![
                OutboundItem::text("hi"),
                OutboundItem::link("https://grafana.example.com/d/abc"),
                OutboundItem::image(b"png".to_vec()),
                OutboundItem::markdown("**bold**"),
                OutboundItem::at_users(vec!["zhangsan".into()]),
                OutboundItem::at_all(),
            ],
        );

        assert_eq!(
            encoded(&message),
            json!({
                "message": {
                    "header": { "toid": [5678] },
                    "body": [
                        { "type": "TEXT", "content": "hi" },
                        { "type": "LINK", "href": "https://grafana.example.com/d/abc" },
                        { "type": "IMAGE", "content": "cG5n" },
                        { "type": "MD", "content": "**bold**" },
                        { "type": "AT", "atuserids": ["zhangsan"] },
                        { "type": "AT", "atall": true }
                    ]
                }
            })
        );
    }

    #[test]
    fn decode_restores_every_variant() {
        let message = OutboundMessage::new(
            vec![1, 2],
            vec![
                OutboundItem::text("for you:\n"),
                OutboundItem::link("https://example.com"),
                OutboundItem::image(vec![0, 159, 255]),
                OutboundItem::markdown("# title"),
                OutboundItem::at_users(vec!["a".into(), "b".into()]),
                OutboundItem::at_all(),
            ],
        );

        assert_eq!(OutboundMessage::decode(&message.encode().unwrap()).unwrap(), message);
    }

    #[test]
    fn empty_image_omits_content_and_decodes_back() {
        let message = OutboundMessage::new(vec![1], vec![OutboundItem::image(Vec::<u8>::new())]);

        assert_eq!(
            encoded(&message),
            json!({ "message": { "header": { "toid": [1] }, "body": [{ "type": "IMAGE" }] } })
        );
        assert_eq!(OutboundMessage::decode(&message.encode().unwrap()).unwrap(), message);
    }

    #[test]
    fn mention_of_everyone_never_lists_users() {
        let decoded = OutboundMessage::decode(br#"{"message":{"header":{"toid":[1]},"body":[{"type":"AT","atall":true,"atuserids":["a"]}]}}"#).unwrap();
        assert_eq!(decoded.body, vec![OutboundItem::AtAll]);

        let message = OutboundMessage::new(vec![1], decoded.body);
        assert_eq!(
            encoded(&message),
            json!({ "message": { "header": { "toid": [1] }, "body": [{ "type": "AT", "atall": true }] } })
        );
    }

    #[test]
    fn encode_rejects_empty_recipients_and_body() {
        let no_recipients = OutboundMessage::new(vec![], vec![OutboundItem::text("hi")]);
        let no_body = OutboundMessage::new(vec![1], vec![]);

        assert!(matches!(no_recipients.encode(), Err(ProtocolError::InvalidMessage(_))));
        assert!(matches!(no_body.encode(), Err(ProtocolError::InvalidMessage(_))));
    }

    #[test]
    fn options_build_at_items() {
        assert!(!MessageOptions::default().is_at_enabled());

        let users = MessageOptions::at_users(vec!["zhangsan".into()]);
        assert!(users.is_at_enabled());
        assert_eq!(users.at_item(), OutboundItem::at_users(vec!["zhangsan".into()]));

        let everyone = MessageOptions {
            at_user_ids: vec!["ignored".into()],
            at_all: true,
        };
        assert_eq!(everyone.at_item(), OutboundItem::at_all());
    }

    #[test]
    fn decode_response_reads_failures() {
        let response = OutboundResponse::decode(br#"{"errcode":0,"errmsg":"ok","data":{"fail":{"5678":40044}}}"#).unwrap();

        assert!(response.is_success());
        assert_eq!(response.data.failed.get("5678"), Some(&40044));
    }

    #[test]
    fn decode_response_tolerates_null_data() {
        let response = OutboundResponse::decode(br#"{"errcode":0,"errmsg":"ok","data":null}"#).unwrap();

        assert!(response.data.failed.is_empty());
    }

    #[test]
    fn decode_response_rejects_invalid_json() {
        assert!(matches!(OutboundResponse::decode(b"<html>"), Err(ProtocolError::ResponseParse(_))));
    }

    #[test]
    fn non_zero_code_becomes_api_error() {
        let response = OutboundResponse::decode(br#"{"errcode":40044,"errmsg":"robot not in group"}"#).unwrap();

        match response.into_result() {
            Err(ProtocolError::Api { code, description, message }) => {
                assert_eq!(code, 40044);
                assert_eq!(description, "机器人未被添加到群中");
                assert_eq!(message, "robot not in group");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn error_table_lookups() {
        assert_eq!(error_description(ERR_NONE), "");
        assert_eq!(error_description(40044), "机器人未被添加到群中");
        assert_eq!(error_description(99999), "");

        let unknown = OutboundResponse {
            error_code: 99999,
            ..Default::default()
        };
        assert!(!unknown.is_success());
        assert!(matches!(unknown.into_result(), Err(ProtocolError::Api { description: "", .. })));
    }
}
