//! Channel connection orchestration.
//!
//! Each messaging surface (Telegram-like platforms, local session channels)
//! registers a [`ChannelAdapter`] describing its capabilities. The
//! [`Manager`] reconciles channel configurations from a [`ConfigStore`]
//! against the set of live inbound connections, starting, restarting, and
//! stopping them as configs appear, change, and disappear. Inbound events
//! pass through an ordered [`middleware`] chain before reaching the
//! terminal handler.

pub mod adapter;
pub mod error;
pub mod manager;
pub mod middleware;
pub mod registry;
pub mod store;
pub mod store_memory;
pub mod store_sqlite;
pub mod types;

pub use {
    adapter::{ChannelAdapter, ChannelCapabilities, Connection, Descriptor, Receiver, Sender},
    error::{Error, Result},
    manager::Manager,
    middleware::{InboundHandler, Middleware, compose, handler_fn},
    registry::Registry,
    store::ConfigStore,
    types::{ChannelConfig, ChannelType},
};
