use std::{collections::HashMap, sync::Arc};

use crate::{
    adapter::{ChannelAdapter, Receiver, Sender},
    error::{Error, Result},
    types::ChannelType,
};

/// Capability table mapping channel types to their adapters.
///
/// Built once at startup with [`Registry::register`], then shared behind an
/// `Arc` and never mutated again — there is no runtime registration.
#[derive(Default)]
pub struct Registry {
    adapters: HashMap<ChannelType, Arc<dyn ChannelAdapter>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    pub fn register(&mut self, adapter: Arc<dyn ChannelAdapter>) {
        self.adapters
            .insert(adapter.descriptor().channel_type, adapter);
    }

    /// All known channel types.
    pub fn types(&self) -> Vec<ChannelType> {
        self.adapters.keys().cloned().collect()
    }

    pub fn get(&self, channel_type: &ChannelType) -> Option<Arc<dyn ChannelAdapter>> {
        self.adapters.get(channel_type).cloned()
    }

    /// Inbound capability for the type. `None` means outbound-only or
    /// unsupported; reconciliation silently skips such configs.
    pub fn receiver(&self, channel_type: &ChannelType) -> Option<Arc<dyn Receiver>> {
        self.adapters.get(channel_type).and_then(|a| a.receiver())
    }

    pub fn sender(&self, channel_type: &ChannelType) -> Option<Arc<dyn Sender>> {
        self.adapters.get(channel_type).and_then(|a| a.sender())
    }

    pub fn is_configless(&self, channel_type: &ChannelType) -> bool {
        self.adapters
            .get(channel_type)
            .is_some_and(|a| a.descriptor().configless)
    }

    /// Validate and canonicalize a credential payload for the type.
    pub fn normalize_config(
        &self,
        channel_type: &ChannelType,
        raw: serde_json::Value,
    ) -> Result<serde_json::Value> {
        match self.adapters.get(channel_type) {
            Some(adapter) => adapter.normalize_config(raw),
            None => Err(Error::unknown_channel(channel_type)),
        }
    }
}
