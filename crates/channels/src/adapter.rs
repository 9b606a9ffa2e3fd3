//! Adapter capability contracts.
//!
//! Each channel implements [`ChannelAdapter`] and exposes whichever of the
//! optional capabilities it supports: a [`Sender`] for outbound messages
//! and/or a [`Receiver`] for live inbound connections.

use std::sync::Arc;

use async_trait::async_trait;

use botgate_common::types::OutboundMessage;

use crate::{
    error::Result,
    middleware::InboundHandler,
    types::{ChannelConfig, ChannelType},
};

/// What a channel can carry.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct ChannelCapabilities {
    pub text: bool,
    pub reply: bool,
    pub attachments: bool,
}

/// Static metadata describing one channel type.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Descriptor {
    pub channel_type: ChannelType,
    pub display_name: String,
    /// Configless channels need no persisted per-bot configuration and are
    /// never reconciled against the store; they are driven purely by local
    /// session activity.
    pub configless: bool,
    pub capabilities: ChannelCapabilities,
}

/// One channel's bundle of capabilities, resolved through the [`Registry`].
///
/// [`Registry`]: crate::registry::Registry
pub trait ChannelAdapter: Send + Sync {
    fn descriptor(&self) -> Descriptor;

    /// Validate and canonicalize a platform-specific credential payload
    /// before persistence. Default is passthrough.
    fn normalize_config(&self, raw: serde_json::Value) -> Result<serde_json::Value> {
        Ok(raw)
    }

    /// Outbound capability, if this channel can push messages.
    fn sender(&self) -> Option<Arc<dyn Sender>> {
        None
    }

    /// Inbound capability, if this channel can accept live connections.
    /// `None` means the type is outbound-only and reconciliation skips it.
    fn receiver(&self) -> Option<Arc<dyn Receiver>> {
        None
    }
}

/// Push outbound messages to a channel.
#[async_trait]
pub trait Sender: Send + Sync {
    async fn send(&self, config: &ChannelConfig, message: OutboundMessage) -> Result<()>;
}

/// Establish live inbound listeners.
#[async_trait]
pub trait Receiver: Send + Sync {
    /// Establish a live inbound listener for one configuration.
    ///
    /// Must not block the caller beyond the initial handshake; invokes
    /// `handler` asynchronously for each received event until the returned
    /// connection is stopped.
    async fn connect(
        &self,
        config: ChannelConfig,
        handler: InboundHandler,
    ) -> Result<Arc<dyn Connection>>;
}

/// A live inbound listener, exclusively owned by the [`Manager`] for its
/// lifetime; the manager is the only caller of [`Connection::stop`].
///
/// [`Manager`]: crate::manager::Manager
#[async_trait]
pub trait Connection: Send + Sync {
    /// Terminate the listener. Returns [`Error::StopNotSupported`] when the
    /// underlying mechanism cannot be cleanly torn down; callers treat that
    /// as "still conceptually live, do not retry", not as a failure.
    ///
    /// [`Error::StopNotSupported`]: crate::error::Error::StopNotSupported
    async fn stop(&self) -> Result<()>;
}
