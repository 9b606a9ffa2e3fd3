use std::collections::HashMap;

use {
    tokio::sync::{RwLock, mpsc},
    tracing::debug,
};

use botgate_common::types::OutboundMessage;

/// Outbound messages buffered per session before the consumer falls behind.
const SESSION_BUFFER: usize = 32;

/// In-process pub/sub for local session channels, keyed by session ID.
///
/// Each session has at most one subscriber; delivery to a session nobody is
/// listening on is silently dropped. Local sessions are ephemeral, so there
/// is no backlog or replay.
#[derive(Default)]
pub struct SessionHub {
    senders: RwLock<HashMap<String, mpsc::Sender<OutboundMessage>>>,
}

impl SessionHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber for `session_id` and return its receiving end.
    /// A previous subscriber for the same session is replaced; its receiver
    /// sees the stream end.
    pub async fn subscribe(&self, session_id: &str) -> mpsc::Receiver<OutboundMessage> {
        let (tx, rx) = mpsc::channel(SESSION_BUFFER);
        self.senders
            .write()
            .await
            .insert(session_id.to_string(), tx);
        rx
    }

    /// Remove the subscriber for `session_id`, ending its stream.
    pub async fn unsubscribe(&self, session_id: &str) {
        self.senders.write().await.remove(session_id);
    }

    /// Deliver a message to the session's subscriber, if any.
    pub async fn publish(&self, session_id: &str, message: OutboundMessage) {
        let sender = self.senders.read().await.get(session_id).cloned();
        let Some(sender) = sender else {
            debug!(session_id, "no subscriber for session, message dropped");
            return;
        };
        if sender.send(message).await.is_err() {
            // Receiver dropped without unsubscribing.
            debug!(session_id, "session receiver gone, removing subscription");
            let mut senders = self.senders.write().await;
            if senders.get(session_id).is_some_and(|s| s.is_closed()) {
                senders.remove(session_id);
            }
        }
    }
}
