use async_trait::async_trait;

use crate::{
    error::Result,
    types::{ChannelConfig, ChannelType},
};

/// Persistent storage boundary for channel configurations.
///
/// The orchestrator only reads through [`ConfigStore::list_configs_by_type`];
/// the write surface serves the config CRUD path, which normalizes
/// credentials through the registry before calling [`ConfigStore::upsert`].
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// All configurations of the given type, in no particular order.
    /// Duplicate IDs are not expected but are tolerated by callers.
    async fn list_configs_by_type(
        &self,
        channel_type: &ChannelType,
    ) -> Result<Vec<ChannelConfig>>;

    async fn get(&self, config_id: &str) -> Result<Option<ChannelConfig>>;

    async fn upsert(&self, config: ChannelConfig) -> Result<()>;

    async fn delete(&self, config_id: &str) -> Result<()>;
}
