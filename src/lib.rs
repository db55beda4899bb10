//! Live price-feed client for the crypto dashboard.
//!
//! Owns the reconnecting market-data socket, per-symbol significant-move
//! detection, and de-duplicated alert dispatch. UI concerns (pages, charts,
//! toast rendering) live elsewhere and attach through the notification sink.

pub mod alerts;
pub mod config;
pub mod errors;
pub mod models;
pub mod retry;
pub mod stream;
pub mod ticker;
pub mod utils;
