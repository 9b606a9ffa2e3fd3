//! Connection manager: reconciles desired channel configurations against
//! live inbound connections.
//!
//! Reconciliation is level-triggered: every cycle pulls the desired configs
//! from the store, starts whatever is missing, restarts whatever is stale,
//! and stops whatever is no longer desired. A failure for one configuration
//! never aborts processing of the others; the next cycle retries.

use std::{collections::HashMap, sync::Arc, time::Duration};

use {
    tokio::{sync::Mutex, task::JoinHandle},
    tokio_util::sync::CancellationToken,
    tracing::{error, info, warn},
};

use crate::{
    adapter::Connection,
    error::{Error, Result},
    middleware::{InboundHandler, Middleware, compose},
    registry::Registry,
    store::ConfigStore,
    types::ChannelConfig,
};

struct ConnectionEntry {
    /// Snapshot of the config version that is running; its `updated_at` is
    /// always >= the version currently connected (never mutated in place).
    config: ChannelConfig,
    connection: Arc<dyn Connection>,
}

/// Owns the live map of inbound connections, keyed by config ID.
///
/// At most one live connection exists per config ID at any time. All map
/// access goes through one async mutex held only for map reads and writes;
/// `connect`/`stop` always run outside it so a slow handshake on one channel
/// never blocks the others. Start/stop/restart of a single config ID is
/// serialized through a per-ID lock, so overlapping reconcile cycles (a
/// scheduled tick racing a manual refresh) cannot double-connect.
pub struct Manager {
    registry: Arc<Registry>,
    store: Arc<dyn ConfigStore>,
    middlewares: Vec<Middleware>,
    terminal: InboundHandler,
    connections: Mutex<HashMap<String, ConnectionEntry>>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Manager {
    pub fn new(
        registry: Arc<Registry>,
        store: Arc<dyn ConfigStore>,
        terminal: InboundHandler,
    ) -> Self {
        Self {
            registry,
            store,
            middlewares: Vec::new(),
            terminal,
            connections: Mutex::new(HashMap::new()),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Append an inbound middleware. Registration order is wrapping order:
    /// the first registered middleware is the first to see each event.
    #[must_use]
    pub fn with_middleware(mut self, middleware: Middleware) -> Self {
        self.middlewares.push(middleware);
        self
    }

    /// Config IDs with a tracked connection, for status surfaces.
    pub async fn active_ids(&self) -> Vec<String> {
        self.connections.lock().await.keys().cloned().collect()
    }

    /// Pull desired configs for every registered channel type and reconcile.
    ///
    /// A fetch failure for one type skips that type and continues with the
    /// rest; configless types are never fetched (they have no persisted
    /// configs by construction).
    pub async fn refresh(&self) {
        let mut configs = Vec::new();
        for channel_type in self.registry.types() {
            if self.registry.is_configless(&channel_type) {
                continue;
            }
            match self.store.list_configs_by_type(&channel_type).await {
                Ok(items) => configs.extend(items),
                Err(e) => {
                    warn!(channel = %channel_type, error = %e, "list channel configs failed");
                },
            }
        }
        self.reconcile(configs).await;
    }

    /// Converge live connections onto the given desired configs.
    ///
    /// Starts are attempted before stops of removed IDs, so a config that
    /// moves between channel types does not produce a visible gap.
    pub(crate) async fn reconcile(&self, configs: Vec<ChannelConfig>) {
        let mut active: HashMap<String, ChannelConfig> = HashMap::new();
        for config in configs {
            if config.id.trim().is_empty() || !config.is_startable() {
                continue;
            }
            // Duplicate IDs from the store: last one wins.
            active.insert(config.id.clone(), config);
        }

        for config in active.values() {
            if let Err(e) = self.ensure_connection(config).await {
                error!(
                    channel = %config.channel_type,
                    config_id = %config.id,
                    error = %e,
                    "channel start failed"
                );
            }
        }

        let stale: Vec<String> = {
            let connections = self.connections.lock().await;
            connections
                .keys()
                .filter(|id| !active.contains_key(*id))
                .cloned()
                .collect()
        };
        for config_id in stale {
            self.remove_and_stop(&config_id).await;
        }
    }

    /// Start (or restart) the connection for one config if needed.
    ///
    /// Holds the per-ID lock for the whole check/stop/connect sequence; the
    /// map mutex itself is only taken for individual reads and writes.
    async fn ensure_connection(&self, config: &ChannelConfig) -> Result<()> {
        // Outbound-only or unknown type: nothing to run.
        let Some(receiver) = self.registry.receiver(&config.channel_type) else {
            return Ok(());
        };

        let lock = self.id_lock(&config.id).await;
        let _guard = lock.lock().await;

        let existing = {
            let connections = self.connections.lock().await;
            connections
                .get(&config.id)
                .map(|entry| (entry.config.updated_at, Arc::clone(&entry.connection)))
        };

        if let Some((running_updated_at, connection)) = existing {
            if running_updated_at >= config.updated_at {
                // Already running the current (or a newer) version.
                return Ok(());
            }
            info!(channel = %config.channel_type, config_id = %config.id, "channel restart");
            match connection.stop().await {
                Ok(()) => {
                    self.connections.lock().await.remove(&config.id);
                },
                Err(Error::StopNotSupported) => {
                    // Cannot tear down the running connection; leave it as
                    // the sole tracked entry rather than orphaning it.
                    warn!(
                        channel = %config.channel_type,
                        config_id = %config.id,
                        "channel restart skipped: stop not supported"
                    );
                    return Ok(());
                },
                Err(e) => return Err(e),
            }
        }

        info!(channel = %config.channel_type, config_id = %config.id, "channel start");
        let handler = compose(&self.middlewares, Arc::clone(&self.terminal));
        let connection = receiver.connect(config.clone(), handler).await?;
        self.connections.lock().await.insert(
            config.id.clone(),
            ConnectionEntry {
                config: config.clone(),
                connection,
            },
        );
        Ok(())
    }

    /// Stop the connection for the given config ID.
    ///
    /// An unknown ID is a silent no-op; a stop request for something already
    /// gone is not exceptional. The entry leaves the map once stop is
    /// invoked, and [`Error::StopNotSupported`] maps to `Ok`.
    pub async fn stop(&self, config_id: &str) -> Result<()> {
        let config_id = config_id.trim();
        if config_id.is_empty() {
            return Err(Error::invalid_input("config id is required"));
        }

        let lock = self.id_lock(config_id).await;
        let guard = lock.lock().await;
        let entry = self.connections.lock().await.remove(config_id);
        let result = match entry {
            None => Ok(()),
            Some(entry) => {
                info!(channel = %entry.config.channel_type, config_id, "channel stop");
                match entry.connection.stop().await {
                    Err(e) if e.is_stop_not_supported() => Ok(()),
                    other => other,
                }
            },
        };
        drop(guard);
        drop(lock);
        self.prune_lock(config_id).await;
        result
    }

    /// Stop and remove every connection belonging to the given bot.
    ///
    /// Best-effort deletion path: individual stop failures are collected
    /// and logged, never propagated, so one misbehaving channel cannot
    /// block removing the others.
    pub async fn stop_by_bot(&self, bot_id: &str) -> Result<()> {
        let bot_id = bot_id.trim();
        if bot_id.is_empty() {
            return Err(Error::invalid_input("bot id is required"));
        }

        let ids: Vec<String> = {
            let connections = self.connections.lock().await;
            connections
                .iter()
                .filter(|(_, entry)| entry.config.bot_id == bot_id)
                .map(|(id, _)| id.clone())
                .collect()
        };

        let mut failures = Vec::new();
        for config_id in ids {
            let lock = self.id_lock(&config_id).await;
            let guard = lock.lock().await;
            let entry = {
                let mut connections = self.connections.lock().await;
                match connections.get(&config_id) {
                    // Re-check ownership under the per-ID lock; the entry
                    // may have been replaced since the snapshot.
                    Some(e) if e.config.bot_id == bot_id => connections.remove(&config_id),
                    _ => None,
                }
            };
            if let Some(entry) = entry
                && let Err(e) = entry.connection.stop().await
                && !e.is_stop_not_supported()
            {
                failures.push((config_id.clone(), e));
            }
            drop(guard);
            drop(lock);
            self.prune_lock(&config_id).await;
        }
        log_swallowed_stop_errors("stop_by_bot", &failures);
        Ok(())
    }

    /// Shutdown path: stop every tracked connection and empty the map.
    pub async fn stop_all(&self) {
        loop {
            let ids: Vec<String> = self.connections.lock().await.keys().cloned().collect();
            if ids.is_empty() {
                break;
            }
            for config_id in ids {
                self.remove_and_stop(&config_id).await;
            }
        }
    }

    /// Periodic tick driving [`Manager::refresh`] until cancelled, then
    /// stops all connections. The first tick fires immediately.
    pub fn spawn_refresh_loop(
        self: &Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("channel refresh loop stopped");
                        break;
                    }
                    _ = ticker.tick() => manager.refresh().await,
                }
            }
            manager.stop_all().await;
        })
    }

    /// Remove the tracked entry for `config_id` and stop its connection
    /// outside the map mutex. The entry leaves the map regardless of the
    /// stop outcome; when stop is unsupported the map reflects desired
    /// state, not guaranteed physical teardown.
    async fn remove_and_stop(&self, config_id: &str) {
        let lock = self.id_lock(config_id).await;
        let guard = lock.lock().await;
        let entry = self.connections.lock().await.remove(config_id);
        if let Some(entry) = entry {
            info!(channel = %entry.config.channel_type, config_id, "channel stop");
            if let Err(e) = entry.connection.stop().await
                && !e.is_stop_not_supported()
            {
                warn!(config_id, error = %e, "channel stop failed");
            }
        }
        drop(guard);
        drop(lock);
        self.prune_lock(config_id).await;
    }

    /// Per-config-ID lock serializing start/stop/restart of that ID.
    async fn id_lock(&self, config_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(config_id.to_string()).or_default())
    }

    /// Drop the per-ID lock once nothing holds it and the entry is gone.
    async fn prune_lock(&self, config_id: &str) {
        let mut locks = self.locks.lock().await;
        if let Some(lock) = locks.get(config_id)
            && Arc::strong_count(lock) == 1
        {
            locks.remove(config_id);
        }
    }
}

/// Log stop failures swallowed by a best-effort deletion path.
fn log_swallowed_stop_errors(operation: &str, failures: &[(String, Error)]) {
    for (config_id, error) in failures {
        warn!(
            operation,
            config_id = %config_id,
            error = %error,
            "channel stop failed (ignored)"
        );
    }
}
