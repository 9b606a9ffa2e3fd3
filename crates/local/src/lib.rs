//! Local session channels.
//!
//! The CLI and Web channels are configless: they carry conversations for
//! in-process sessions (an attached terminal, an open browser tab) rather
//! than per-bot platform accounts, so nothing about them is persisted and
//! the connection manager never reconciles them. Outbound delivery goes
//! through the [`SessionHub`], an in-process pub/sub keyed by session ID.

pub mod cli;
pub mod hub;
pub mod web;

pub use {cli::CliChannel, hub::SessionHub, web::WebChannel};
