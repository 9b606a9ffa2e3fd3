use std::sync::Arc;

use async_trait::async_trait;

use {
    botgate_channels::{
        ChannelAdapter, ChannelCapabilities, ChannelConfig, Descriptor, Error, Result, Sender,
    },
    botgate_common::types::OutboundMessage,
};

use crate::hub::SessionHub;

/// Local CLI channel: outbound delivery to an attached terminal session.
#[derive(Clone)]
pub struct CliChannel {
    hub: Arc<SessionHub>,
}

impl CliChannel {
    #[must_use]
    pub fn new(hub: Arc<SessionHub>) -> Self {
        Self { hub }
    }
}

impl ChannelAdapter for CliChannel {
    fn descriptor(&self) -> Descriptor {
        Descriptor {
            channel_type: "cli".into(),
            display_name: "CLI".into(),
            configless: true,
            capabilities: ChannelCapabilities {
                text: true,
                reply: true,
                attachments: true,
            },
        }
    }

    fn sender(&self) -> Option<Arc<dyn Sender>> {
        Some(Arc::new(self.clone()))
    }
}

#[async_trait]
impl Sender for CliChannel {
    async fn send(&self, _config: &ChannelConfig, message: OutboundMessage) -> Result<()> {
        let target = message.target.trim().to_string();
        if target.is_empty() {
            return Err(Error::invalid_input("cli target is required"));
        }
        if message.is_empty() {
            return Err(Error::invalid_input("message is required"));
        }
        self.hub.publish(&target, message).await;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn config() -> ChannelConfig {
        ChannelConfig {
            id: String::new(),
            bot_id: "b1".into(),
            channel_type: "cli".into(),
            credentials: serde_json::json!({}),
            external_identity: None,
            status: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn send_validates_target_and_text() {
        let channel = CliChannel::new(Arc::new(SessionHub::new()));

        let err = channel
            .send(&config(), OutboundMessage::text("  ", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));

        let err = channel
            .send(&config(), OutboundMessage::text("cli:1", "   "))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn send_publishes_to_session() {
        let hub = Arc::new(SessionHub::new());
        let channel = CliChannel::new(Arc::clone(&hub));
        let mut rx = hub.subscribe("cli:1").await;

        channel
            .send(&config(), OutboundMessage::text("cli:1", "hello"))
            .await
            .unwrap();
        assert_eq!(rx.recv().await.unwrap().text, "hello");

        // Target whitespace is trimmed before hub routing.
        channel
            .send(&config(), OutboundMessage::text("  cli:1 ", "again"))
            .await
            .unwrap();
        assert_eq!(rx.recv().await.unwrap().text, "again");
    }

    #[test]
    fn descriptor_is_configless_sender_only() {
        let channel = CliChannel::new(Arc::new(SessionHub::new()));
        let descriptor = channel.descriptor();
        assert!(descriptor.configless);
        assert_eq!(descriptor.channel_type.as_str(), "cli");
        assert!(channel.sender().is_some());
        assert!(channel.receiver().is_none());
    }
}
