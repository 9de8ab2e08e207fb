//! Mock feeds for unit testing.
//!
//! This module provides a single mock that implements all three feed traits,
//! so tests can run the pipeline without making real network requests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rust_decimal::Decimal;

use super::types::{Bookmaker, Fixture, Market, OddsEvent, Outcome, TeamRef};
use super::{FixtureFeed, OddsFeed, StandingsFeed};
use crate::error::FeedError;

/// Configuration for mock feed behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Whether to fail odds requests.
    pub fail_odds: bool,
    /// Whether to fail fixtures requests.
    pub fail_fixtures: bool,
    /// Whether to fail standings requests.
    pub fail_standings: bool,
}

/// Mock odds, fixtures and standings feed.
#[derive(Debug, Clone, Default)]
pub struct MockFeeds {
    /// Mock configuration.
    config: MockConfig,
    /// Events returned by the odds feed.
    events: Vec<OddsEvent>,
    /// Fixtures returned for any date.
    fixtures: Vec<Fixture>,
    /// Ranks by (league, team).
    ranks: HashMap<(u64, u64), u32>,
    /// Dates the fixtures feed was asked for.
    fixture_dates: Arc<Mutex<Vec<NaiveDate>>>,
    /// Number of standings requests made.
    standings_calls: Arc<AtomicUsize>,
}

impl MockFeeds {
    /// Create empty mock feeds that never fail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create mock feeds with custom failure configuration.
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Add an odds event.
    pub fn with_event(mut self, event: OddsEvent) -> Self {
        self.events.push(event);
        self
    }

    /// Add a fixture.
    pub fn with_fixture(mut self, fixture: Fixture) -> Self {
        self.fixtures.push(fixture);
        self
    }

    /// Register a team's rank.
    pub fn with_rank(mut self, league_id: u64, team_id: u64, rank: u32) -> Self {
        self.ranks.insert((league_id, team_id), rank);
        self
    }

    /// Number of standings requests made so far.
    pub fn standings_calls(&self) -> usize {
        self.standings_calls.load(Ordering::SeqCst)
    }

    /// Dates requested from the fixtures feed so far.
    pub fn fixture_dates(&self) -> Vec<NaiveDate> {
        self.fixture_dates
            .lock()
            .map(|dates| dates.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl OddsFeed for MockFeeds {
    async fn fetch_events(&self) -> Result<Vec<OddsEvent>, FeedError> {
        if self.config.fail_odds {
            return Err(FeedError::FetchFailed {
                feed: "odds",
                reason: "Mock odds failure".to_string(),
            });
        }
        Ok(self.events.clone())
    }
}

#[async_trait]
impl FixtureFeed for MockFeeds {
    async fn fixtures_on(&self, date: NaiveDate) -> Result<Vec<Fixture>, FeedError> {
        if let Ok(mut dates) = self.fixture_dates.lock() {
            dates.push(date);
        }
        if self.config.fail_fixtures {
            return Err(FeedError::FetchFailed {
                feed: "fixtures",
                reason: "Mock fixtures failure".to_string(),
            });
        }
        Ok(self.fixtures.clone())
    }
}

#[async_trait]
impl StandingsFeed for MockFeeds {
    async fn team_rank(&self, league_id: u64, team_id: u64, _season: i32) -> Result<Option<u32>, FeedError> {
        self.standings_calls.fetch_add(1, Ordering::SeqCst);
        if self.config.fail_standings {
            return Err(FeedError::FetchFailed {
                feed: "standings",
                reason: "Mock standings failure".to_string(),
            });
        }
        Ok(self.ranks.get(&(league_id, team_id)).copied())
    }
}

/// Build a fixture from `(id, name)` pairs.
pub fn fixture(league_id: u64, home: (u64, &str), away: (u64, &str)) -> Fixture {
    Fixture {
        home: TeamRef {
            id: Some(home.0),
            name: home.1.to_string(),
        },
        away: TeamRef {
            id: Some(away.0),
            name: away.1.to_string(),
        },
        league_id: Some(league_id),
    }
}

/// Builder for odds events. Every market call adds a new bookmaker carrying
/// that single market, so feed order is call order.
pub struct MockEventBuilder {
    home: String,
    away: String,
    kickoff: Option<DateTime<Utc>>,
    bookmakers: Vec<Bookmaker>,
}

impl MockEventBuilder {
    /// Create a new builder for `home` vs `away`.
    pub fn new(home: impl Into<String>, away: impl Into<String>) -> Self {
        Self {
            home: home.into(),
            away: away.into(),
            kickoff: None,
            bookmakers: Vec::new(),
        }
    }

    /// Set the kickoff time.
    pub fn kickoff(mut self, kickoff: DateTime<Utc>) -> Self {
        self.kickoff = Some(kickoff);
        self
    }

    /// Add a market with priced outcomes.
    pub fn market(self, key: &str, outcomes: &[(&str, Decimal)]) -> Self {
        let outcomes = outcomes
            .iter()
            .map(|(name, price)| Outcome {
                name: name.to_string(),
                price: Some(*price),
                point: None,
            })
            .collect();
        self.push_market(key, outcomes)
    }

    /// Add an h2h market.
    pub fn h2h(self, outcomes: &[(&str, Decimal)]) -> Self {
        self.market("h2h", outcomes)
    }

    /// Add an h2h market with one unpriced outcome.
    pub fn h2h_without_price(self, name: &str) -> Self {
        let outcome = Outcome {
            name: name.to_string(),
            price: None,
            point: None,
        };
        self.push_market("h2h", vec![outcome])
    }

    /// Add a totals market whose outcome names carry the line ("Over 2.5").
    pub fn totals(self, outcomes: &[(&str, Decimal)]) -> Self {
        self.market("totals", outcomes)
    }

    /// Add a totals market with the line in `point`: `(name, point, price)`.
    pub fn totals_with_point(self, outcomes: &[(&str, Decimal, Decimal)]) -> Self {
        let outcomes = outcomes
            .iter()
            .map(|(name, point, price)| Outcome {
                name: name.to_string(),
                price: Some(*price),
                point: Some(*point),
            })
            .collect();
        self.push_market("totals", outcomes)
    }

    fn push_market(mut self, key: &str, outcomes: Vec<Outcome>) -> Self {
        let n = self.bookmakers.len() + 1;
        self.bookmakers.push(Bookmaker {
            key: format!("bookmaker-{}", n),
            title: format!("Bookmaker {}", n),
            markets: vec![Market {
                key: key.to_string(),
                outcomes,
            }],
        });
        self
    }

    /// Build the raw event.
    pub fn build(self) -> OddsEvent {
        OddsEvent {
            id: Some(format!("{}-{}", self.home, self.away).to_lowercase()),
            home_team: Some(self.home),
            away_team: Some(self.away),
            commence_time: self
                .kickoff
                .map(|k| k.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            bookmakers: self.bookmakers,
        }
    }
}
