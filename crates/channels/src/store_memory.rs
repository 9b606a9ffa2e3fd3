use std::collections::HashMap;

use {async_trait::async_trait, tokio::sync::RwLock};

use crate::{
    error::Result,
    store::ConfigStore,
    types::{ChannelConfig, ChannelType},
};

/// In-memory config store for tests and embedded hosts.
#[derive(Default)]
pub struct MemoryConfigStore {
    configs: RwLock<HashMap<String, ChannelConfig>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a batch of configs.
    pub async fn seed(&self, configs: impl IntoIterator<Item = ChannelConfig>) {
        let mut map = self.configs.write().await;
        for config in configs {
            map.insert(config.id.clone(), config);
        }
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn list_configs_by_type(
        &self,
        channel_type: &ChannelType,
    ) -> Result<Vec<ChannelConfig>> {
        let map = self.configs.read().await;
        Ok(map
            .values()
            .filter(|c| &c.channel_type == channel_type)
            .cloned()
            .collect())
    }

    async fn get(&self, config_id: &str) -> Result<Option<ChannelConfig>> {
        Ok(self.configs.read().await.get(config_id).cloned())
    }

    async fn upsert(&self, config: ChannelConfig) -> Result<()> {
        self.configs
            .write()
            .await
            .insert(config.id.clone(), config);
        Ok(())
    }

    async fn delete(&self, config_id: &str) -> Result<()> {
        self.configs.write().await.remove(config_id);
        Ok(())
    }
}
