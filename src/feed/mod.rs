//! Upstream feeds.
//!
//! This module handles:
//! - Wire types for the odds and football providers
//! - The Odds API client (events with h2h/totals prices)
//! - API-Football client (today's fixtures, league standings)
//! - Mock feeds for testing

pub mod football;
pub mod mock;
pub mod odds;
pub mod types;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::FeedError;

pub use football::ApiFootballClient;
pub use mock::{MockConfig, MockEventBuilder, MockFeeds};
pub use odds::OddsApiClient;
pub use types::{Fixture, OddsEvent};

/// Source of upcoming events with bookmaker prices.
#[async_trait]
pub trait OddsFeed: Send + Sync {
    /// Fetch every upcoming event, in provider order.
    async fn fetch_events(&self) -> Result<Vec<OddsEvent>, FeedError>;
}

/// Source of scheduled fixtures with team and league ids.
#[async_trait]
pub trait FixtureFeed: Send + Sync {
    /// Fixtures played on `date`.
    async fn fixtures_on(&self, date: NaiveDate) -> Result<Vec<Fixture>, FeedError>;
}

/// Source of league tables.
#[async_trait]
pub trait StandingsFeed: Send + Sync {
    /// Rank of `team_id` in `league_id` for `season`; `Ok(None)` when the team
    /// or the table is not listed.
    async fn team_rank(&self, league_id: u64, team_id: u64, season: i32) -> Result<Option<u32>, FeedError>;
}
