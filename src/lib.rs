//! Multi-timeframe EMA/RSI momentum signal engine.
//!
//! The slow timeframe sets a trend bias, the fast timeframe times the entry,
//! and a per-instrument cooldown keeps entry alerts from repeating.

pub mod common;
pub mod config;
pub mod core;
pub mod indicators;
pub mod ledger;
pub mod logging;
pub mod models;
pub mod services;
pub mod signals;
