//! Message types shared across all botgate crates.

pub mod types;

pub use types::{ChatType, InboundMessage, OutboundMessage};
