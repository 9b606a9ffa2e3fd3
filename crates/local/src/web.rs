use std::sync::Arc;

use async_trait::async_trait;

use {
    botgate_channels::{
        ChannelAdapter, ChannelCapabilities, ChannelConfig, Descriptor, Error, Result, Sender,
    },
    botgate_common::types::OutboundMessage,
};

use crate::hub::SessionHub;

/// Local Web channel: outbound delivery to an open browser session.
#[derive(Clone)]
pub struct WebChannel {
    hub: Arc<SessionHub>,
}

impl WebChannel {
    #[must_use]
    pub fn new(hub: Arc<SessionHub>) -> Self {
        Self { hub }
    }
}

impl ChannelAdapter for WebChannel {
    fn descriptor(&self) -> Descriptor {
        Descriptor {
            channel_type: "web".into(),
            display_name: "Web".into(),
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
impl Sender for WebChannel {
    async fn send(&self, _config: &ChannelConfig, message: OutboundMessage) -> Result<()> {
        let target = message.target.trim().to_string();
        if target.is_empty() {
            return Err(Error::invalid_input("web target is required"));
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
            channel_type: "web".into(),
            credentials: serde_json::json!({}),
            external_identity: None,
            status: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn send_round_trips_through_hub() {
        let hub = Arc::new(SessionHub::new());
        let channel = WebChannel::new(Arc::clone(&hub));
        let mut rx = hub.subscribe("web:1").await;

        channel
            .send(&config(), OutboundMessage::text("web:1", "hello"))
            .await
            .unwrap();
        assert_eq!(rx.recv().await.unwrap().text, "hello");

        let err = channel
            .send(&config(), OutboundMessage::text("", "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput { .. }));
    }

    #[test]
    fn registry_skips_web_during_reconciliation() {
        let mut registry = botgate_channels::Registry::new();
        registry.register(Arc::new(WebChannel::new(Arc::new(SessionHub::new()))));

        assert!(registry.is_configless(&"web".into()));
        assert!(registry.receiver(&"web".into()).is_none());
        assert!(registry.sender(&"web".into()).is_some());
    }
}
