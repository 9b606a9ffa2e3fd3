//! Message types shared between channel adapters and the downstream pipeline.

use serde::{Deserialize, Serialize};

/// Kind of conversation an inbound message arrived from.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    /// Direct (one-to-one) message.
    #[default]
    Dm,
    /// Group conversation.
    Group,
    /// Broadcast channel.
    Channel,
}

/// A normalized inbound event, produced by a channel adapter and handed to
/// the terminal inbound handler after the middleware chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Channel type identifier (e.g. "telegram", "cli").
    pub channel_type: String,
    /// ID of the channel configuration this event arrived through.
    pub config_id: String,
    /// Bot the configuration belongs to.
    pub bot_id: String,
    /// Platform identity of the sender.
    pub peer_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    /// Chat/conversation the message belongs to (reply target).
    pub chat_id: String,
    #[serde(default)]
    pub chat_type: ChatType,
    /// Local session the event is bound to, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub text: String,
    /// Adapter-specific extras (thread IDs, attachments, raw identifiers).
    #[serde(default)]
    pub metadata: serde_json::Value,
    /// Unix timestamp (seconds) when the adapter received the event.
    pub received_at: i64,
}

impl InboundMessage {
    /// Minimal constructor for the common case; optional fields default.
    pub fn new(
        channel_type: impl Into<String>,
        config_id: impl Into<String>,
        bot_id: impl Into<String>,
        peer_id: impl Into<String>,
        chat_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            channel_type: channel_type.into(),
            config_id: config_id.into(),
            bot_id: bot_id.into(),
            peer_id: peer_id.into(),
            username: None,
            sender_name: None,
            chat_id: chat_id.into(),
            chat_type: ChatType::default(),
            session_id: None,
            text: text.into(),
            metadata: serde_json::Value::Null,
            received_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// An outbound message on its way to a channel adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Adapter-specific delivery target (chat ID, session ID, ...).
    pub target: String,
    pub text: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl OutboundMessage {
    pub fn text(target: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            text: text.into(),
            metadata: serde_json::Value::Null,
        }
    }

    /// True when there is no content to deliver.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn chat_type_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ChatType::Dm).unwrap(), "\"dm\"");
        assert_eq!(serde_json::to_string(&ChatType::Group).unwrap(), "\"group\"");
    }

    #[test]
    fn outbound_empty_detection() {
        assert!(OutboundMessage::text("t", "   ").is_empty());
        assert!(!OutboundMessage::text("t", "hi").is_empty());
    }
}
