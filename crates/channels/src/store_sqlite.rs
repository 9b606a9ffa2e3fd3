use {
    async_trait::async_trait,
    chrono::{DateTime, Utc},
    sqlx::SqlitePool,
};

use crate::{
    error::{Error, Result},
    store::ConfigStore,
    types::{ChannelConfig, ChannelType},
};

/// Internal row type for sqlx mapping.
#[derive(sqlx::FromRow)]
struct ConfigRow {
    id: String,
    bot_id: String,
    channel_type: String,
    credentials: String,
    external_identity: Option<String>,
    status: String,
    created_at: String,
    updated_at: String,
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::external("parse stored timestamp", e))
}

impl TryFrom<ConfigRow> for ChannelConfig {
    type Error = Error;

    fn try_from(r: ConfigRow) -> Result<Self> {
        Ok(Self {
            id: r.id,
            bot_id: r.bot_id,
            channel_type: ChannelType::new(r.channel_type),
            credentials: serde_json::from_str(&r.credentials)?,
            external_identity: r.external_identity,
            status: r.status,
            created_at: parse_timestamp(&r.created_at)?,
            updated_at: parse_timestamp(&r.updated_at)?,
        })
    }
}

/// SQLite-backed channel config store.
pub struct SqliteConfigStore {
    pool: SqlitePool,
}

impl SqliteConfigStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the channel config table schema.
    ///
    /// Production deployments manage the schema through migrations; this is
    /// retained for tests that use in-memory databases.
    #[doc(hidden)]
    pub async fn init(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS bot_channel_configs (
                id                TEXT PRIMARY KEY,
                bot_id            TEXT NOT NULL,
                channel_type      TEXT NOT NULL,
                credentials       TEXT NOT NULL,
                external_identity TEXT,
                status            TEXT NOT NULL DEFAULT 'pending',
                created_at        TEXT NOT NULL,
                updated_at        TEXT NOT NULL
            )"#,
        )
        .execute(pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for SqliteConfigStore {
    async fn list_configs_by_type(
        &self,
        channel_type: &ChannelType,
    ) -> Result<Vec<ChannelConfig>> {
        let rows = sqlx::query_as::<_, ConfigRow>(
            "SELECT * FROM bot_channel_configs WHERE channel_type = ? ORDER BY updated_at DESC",
        )
        .bind(channel_type.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get(&self, config_id: &str) -> Result<Option<ChannelConfig>> {
        let row = sqlx::query_as::<_, ConfigRow>("SELECT * FROM bot_channel_configs WHERE id = ?")
            .bind(config_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn upsert(&self, config: ChannelConfig) -> Result<()> {
        let credentials = serde_json::to_string(&config.credentials)?;
        sqlx::query(
            r#"INSERT INTO bot_channel_configs
                 (id, bot_id, channel_type, credentials, external_identity, status,
                  created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(id) DO UPDATE SET
                 bot_id = excluded.bot_id,
                 channel_type = excluded.channel_type,
                 credentials = excluded.credentials,
                 external_identity = excluded.external_identity,
                 status = excluded.status,
                 updated_at = excluded.updated_at"#,
        )
        .bind(&config.id)
        .bind(&config.bot_id)
        .bind(config.channel_type.as_str())
        .bind(&credentials)
        .bind(&config.external_identity)
        .bind(&config.status)
        .bind(config.created_at.to_rfc3339())
        .bind(config.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, config_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM bot_channel_configs WHERE id = ?")
            .bind(config_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        SqliteConfigStore::init(&pool).await.unwrap();
        pool
    }

    fn config(id: &str, channel_type: &str, status: &str) -> ChannelConfig {
        let now = Utc::now();
        ChannelConfig {
            id: id.into(),
            bot_id: "bot-a".into(),
            channel_type: channel_type.into(),
            credentials: serde_json::json!({"token": "abc"}),
            external_identity: None,
            status: status.into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn upsert_and_get() {
        let store = SqliteConfigStore::new(test_pool().await);
        store.upsert(config("c1", "telegram", "active")).await.unwrap();

        let got = store.get("c1").await.unwrap().unwrap();
        assert_eq!(got.bot_id, "bot-a");
        assert_eq!(got.channel_type.as_str(), "telegram");
        assert_eq!(got.credentials["token"], "abc");
        assert!(got.is_startable());
    }

    #[tokio::test]
    async fn upsert_updates_existing() {
        let store = SqliteConfigStore::new(test_pool().await);
        store.upsert(config("c1", "telegram", "pending")).await.unwrap();

        let mut updated = config("c1", "telegram", "active");
        updated.credentials = serde_json::json!({"token": "new"});
        updated.updated_at = updated.updated_at + chrono::Duration::seconds(5);
        store.upsert(updated).await.unwrap();

        let got = store.get("c1").await.unwrap().unwrap();
        assert_eq!(got.status, "active");
        assert_eq!(got.credentials["token"], "new");

        let all = store.list_configs_by_type(&"telegram".into()).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn list_filters_by_type() {
        let store = SqliteConfigStore::new(test_pool().await);
        store.upsert(config("c1", "telegram", "active")).await.unwrap();
        store.upsert(config("c2", "slack", "active")).await.unwrap();

        let telegram = store.list_configs_by_type(&"telegram".into()).await.unwrap();
        assert_eq!(telegram.len(), 1);
        assert_eq!(telegram[0].id, "c1");

        let matrix = store.list_configs_by_type(&"matrix".into()).await.unwrap();
        assert!(matrix.is_empty());
    }

    #[tokio::test]
    async fn delete_removes() {
        let store = SqliteConfigStore::new(test_pool().await);
        store.upsert(config("c1", "telegram", "active")).await.unwrap();
        store.delete("c1").await.unwrap();
        assert!(store.get("c1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_nonexistent() {
        let store = SqliteConfigStore::new(test_pool().await);
        assert!(store.get("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn timestamps_round_trip() {
        let store = SqliteConfigStore::new(test_pool().await);
        let original = config("c1", "telegram", "active");
        store.upsert(original.clone()).await.unwrap();

        let got = store.get("c1").await.unwrap().unwrap();
        assert_eq!(got.updated_at.timestamp(), original.updated_at.timestamp());
    }
}
