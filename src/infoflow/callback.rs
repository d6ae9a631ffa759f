//! Decoded robot callback envelopes.

use serde::Deserialize;
use serde_with::{DefaultOnNull, serde_as};

use super::error::ProtocolError;

/// One decoded inbound chat event.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CallbackEnvelope {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "eventtype", default)]
    pub event_type: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "agentid", default)]
    pub agent_id: i64,
    /// Group the message was posted in; replies are addressed here.
    #[serde(rename = "groupid")]
    pub group_id: i64,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "corpid", default)]
    pub corp_id: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub time: i64,
    pub message: CallbackMessage,
}

impl CallbackEnvelope {
    /// Parse decrypted plaintext into an envelope.
    pub fn parse(plaintext: &[u8]) -> Result<Self, ProtocolError> {
        serde_json::from_slice(plaintext).map_err(ProtocolError::MalformedEnvelope)
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CallbackMessage {
    pub header: CallbackMessageHeader,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub body: Vec<CallbackItem>,
}

impl CallbackMessage {
    /// Text the user typed, with link labels on their own lines.
    ///
    /// Items are concatenated in body order: a non-empty LINK label contributes `label + "\n"`, a
    /// non-empty TEXT content contributes itself verbatim.
    pub fn user_input(&self) -> String {
        let mut input = String::new();

        for item in &self.body {
            match &item.kind {
                CallbackItemKind::Link { label, .. } if !label.is_empty() => {
                    input.push_str(label);
                    input.push('\n');
                }
                CallbackItemKind::Text { content } if !content.is_empty() => input.push_str(content),
                _ => {}
            }
        }

        input
    }

    /// Name of the first slash command in the body, or `""` when there is none.
    pub fn user_command(&self) -> &str {
        self.body
            .iter()
            .find_map(|item| match &item.kind {
                CallbackItemKind::Command { command_name } => Some(command_name.as_str()),
                _ => None,
            })
            .unwrap_or_default()
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CallbackMessageHeader {
    /// Sender of the message; mentioned in the reply.
    #[serde(rename = "fromuserid")]
    pub from_user_id: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "toid", default)]
    pub to_id: i64,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "totype", default)]
    pub to_type: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "msgtype", default)]
    pub msg_type: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "clientmsgid", default)]
    pub client_msg_id: i64,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "messageid", default)]
    pub message_id: i64,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "msgseqid", default)]
    pub msg_seq_id: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub at: CallbackAt,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub compatible: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "offlinenotify", default)]
    pub offline_notify: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub extra: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "servertime", default)]
    pub server_time: i64,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "clienttime", default)]
    pub client_time: i64,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "updatetime", default)]
    pub update_time: i64,
}

#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CallbackAt {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "atrobotids", default)]
    pub at_robot_ids: Vec<i64>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "atuserids", default)]
    pub at_user_ids: Vec<String>,
}

/// A body item; the fields it carries depend on its `type` tag.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CallbackItem {
    #[serde(flatten)]
    pub kind: CallbackItemKind,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "userid", default)]
    pub user_id: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub name: String,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(rename = "robotid", default)]
    pub robot_id: i64,
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum CallbackItemKind {
    #[serde(rename = "TEXT")]
    Text {
        #[serde_as(as = "DefaultOnNull")]
        #[serde(default)]
        content: String,
    },
    #[serde(rename = "LINK")]
    Link {
        #[serde_as(as = "DefaultOnNull")]
        #[serde(default)]
        label: String,
        #[serde_as(as = "DefaultOnNull")]
        #[serde(default)]
        href: String,
        #[serde_as(as = "DefaultOnNull")]
        #[serde(rename = "downloadurl", default)]
        download_url: String,
    },
    #[serde(rename = "command")]
    Command {
        #[serde_as(as = "DefaultOnNull")]
        #[serde(rename = "commandname", default)]
        command_name: String,
    },
    /// Mentions, images and anything else the robot does not interpret.
    #[serde(other)]
    Other,
}
