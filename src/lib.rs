//! Football betting tips service.
//!
//! Pulls upcoming events from The Odds API, keeps one near-even-money pick per
//! event (match winner, plus an over/under 2.5 goals pick when enabled), adds
//! the league positions of both teams from API-Football and groups the picks
//! into risk buckets.
//!
//! # Pipeline
//!
//! ```text
//! odds feed ─▶ validate ─▶ dedupe ─▶ select ─▶ enrich (fixtures, standings)
//!                                                   │
//!                                                   ▼
//!                                   shuffle ─▶ fill buckets ─▶ JSON
//! ```
//!
//! A tip is only ever placed in one bucket, and a bucket never holds more tips
//! than its capacity.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`feed`]: Odds and football feed clients, plus mocks
//! - [`tips`]: Validation, selection, enrichment and bucketing
//! - [`metrics`]: Prometheus metrics
//! - [`api`]: HTTP API for tips, health and metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod feed;
pub mod metrics;
pub mod tips;
pub mod utils;

pub use config::Config;
pub use error::{Result, TipsError};
