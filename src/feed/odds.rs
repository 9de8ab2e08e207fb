//! The Odds API client.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::types::OddsEvent;
use super::OddsFeed;
use crate::config::Config;
use crate::error::FeedError;
use crate::metrics;

/// Markets requested when over/under tips are enabled.
pub const MARKETS_WITH_TOTALS: &str = "h2h,totals";

/// Markets requested otherwise.
pub const MARKETS_H2H: &str = "h2h";

/// The Odds API `/sports/{sport}/odds` client.
#[derive(Debug, Clone)]
pub struct OddsApiClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// API base URL (".../v4").
    base_url: String,
    /// API key.
    api_key: String,
    /// Sport key ("upcoming" for all sports).
    sport: String,
    /// Bookmaker regions.
    regions: String,
    /// Comma-separated market keys.
    markets: &'static str,
}

impl OddsApiClient {
    /// Create a client from config. Totals are only requested when
    /// `include_totals` is set.
    pub fn new(config: &Config, include_totals: bool) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.odds_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url: config.odds_api_url.trim_end_matches('/').to_string(),
            api_key: config.odds_api_key.clone(),
            sport: config.odds_sport.clone(),
            regions: config.odds_regions.clone(),
            markets: if include_totals {
                MARKETS_WITH_TOTALS
            } else {
                MARKETS_H2H
            },
        })
    }

    /// Markets this client asks for.
    pub fn markets(&self) -> &str {
        self.markets
    }

    /// Full odds endpoint URL.
    pub fn odds_url(&self) -> String {
        format!("{}/sports/{}/odds", self.base_url, self.sport)
    }
}

#[async_trait]
impl OddsFeed for OddsApiClient {
    #[instrument(skip(self), fields(sport = %self.sport, markets = %self.markets))]
    async fn fetch_events(&self) -> Result<Vec<OddsEvent>, FeedError> {
        let _timer = metrics::timer_feed_request(metrics::FEED_ODDS);

        let response = self
            .http
            .get(self.odds_url())
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("regions", self.regions.as_str()),
                ("markets", self.markets),
                ("oddsFormat", "decimal"),
            ])
            .send()
            .await
            .map_err(|e| FeedError::HttpError(e.without_url()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::FetchFailed {
                feed: metrics::FEED_ODDS,
                reason: format!("HTTP {} - {}", status, body),
            });
        }

        let events: Vec<OddsEvent> = response
            .json()
            .await
            .map_err(|e| FeedError::ParseError(format!("Failed to parse odds events: {}", e.without_url())))?;

        debug!(count = events.len(), "Fetched odds events");

        Ok(events)
    }
}
