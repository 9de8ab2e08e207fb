//! API-Football client for fixtures and standings.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::types::{ApiFootballResponse, Fixture, FixtureRecord, StandingsRecord};
use super::{FixtureFeed, StandingsFeed};
use crate::config::Config;
use crate::error::FeedError;
use crate::metrics;

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-apisports-key";

/// API-Football v3 client.
#[derive(Debug, Clone)]
pub struct ApiFootballClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// API base URL.
    base_url: String,
    /// API key.
    api_key: String,
    /// Zone the fixtures date is interpreted in.
    timezone: Tz,
}

impl ApiFootballClient {
    /// Create a client from config. `timezone` decides the fixtures date.
    pub fn new(config: &Config, timezone: Tz) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.football_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url: config.football_api_url.trim_end_matches('/').to_string(),
            api_key: config.api_football_key.clone(),
            timezone,
        })
    }

    /// Timezone sent with fixture queries.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// GET `path` with `query` and unwrap the `response` envelope.
    async fn get<T: DeserializeOwned>(
        &self,
        feed: &'static str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, FeedError> {
        let _timer = metrics::timer_feed_request(feed);

        let response = self
            .http
            .get(format!("{}/{}", self.base_url, path))
            .header(API_KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .await
            .map_err(|e| FeedError::HttpError(e.without_url()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::FetchFailed {
                feed,
                reason: format!("HTTP {} - {}", status, body),
            });
        }

        let body: ApiFootballResponse<T> = response
            .json()
            .await
            .map_err(|e| FeedError::ParseError(format!("Failed to parse {}: {}", feed, e.without_url())))?;

        Ok(body.response)
    }
}

#[async_trait]
impl FixtureFeed for ApiFootballClient {
    #[instrument(skip(self), fields(timezone = %self.timezone))]
    async fn fixtures_on(&self, date: NaiveDate) -> Result<Vec<Fixture>, FeedError> {
        let records: Vec<FixtureRecord> = self
            .get(
                metrics::FEED_FIXTURES,
                "fixtures",
                &[
                    ("date", date.format("%Y-%m-%d").to_string()),
                    ("timezone", self.timezone.name().to_string()),
                ],
            )
            .await?;

        debug!(count = records.len(), "Fetched fixtures");

        Ok(records.into_iter().map(Fixture::from).collect())
    }
}

#[async_trait]
impl StandingsFeed for ApiFootballClient {
    #[instrument(skip(self))]
    async fn team_rank(&self, league_id: u64, team_id: u64, season: i32) -> Result<Option<u32>, FeedError> {
        let records: Vec<StandingsRecord> = self
            .get(
                metrics::FEED_STANDINGS,
                "standings",
                &[
                    ("league", league_id.to_string()),
                    ("season", season.to_string()),
                ],
            )
            .await?;

        Ok(records.iter().find_map(|record| record.rank_of(team_id)))
    }
}
