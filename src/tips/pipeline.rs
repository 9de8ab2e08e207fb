//! Tip pipeline: odds feed → validation → dedup → selection → enrichment →
//! categorization.

use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument, warn};

use super::categorizer::{BucketTable, CategorizedTips, Categorizer};
use super::dedup::{dedupe, validate_events};
use super::lookup::lookup_team;
use super::model::{Standing, Tip};
use super::selector::{OutcomeSelector, SelectionWindow};
use super::standings::StandingsResolver;
use crate::error::Result;
use crate::feed::{FixtureFeed, OddsFeed, StandingsFeed};
use crate::metrics;

/// Everything the pipeline needs besides the feeds. Built once at start-up.
#[derive(Debug, Clone)]
pub struct TipSettings {
    /// Eligible price window and target.
    pub window: SelectionWindow,
    /// Bucket layout; also decides whether over/under tips are produced.
    pub buckets: BucketTable,
    /// Zone that decides which date counts as "today" for fixtures.
    pub fixtures_timezone: Tz,
    /// Zone kickoff times are rendered in.
    pub kickoff_timezone: Tz,
}

impl Default for TipSettings {
    fn default() -> Self {
        Self {
            window: SelectionWindow::default(),
            buckets: super::categorizer::BucketProfile::default().table(),
            fixtures_timezone: chrono_tz::Europe::Belgrade,
            kickoff_timezone: chrono_tz::UTC,
        }
    }
}

/// Runs the tip pipeline against a set of feeds.
pub struct TipService {
    odds: Arc<dyn OddsFeed>,
    fixtures: Arc<dyn FixtureFeed>,
    standings: Arc<dyn StandingsFeed>,
    selector: OutcomeSelector,
    categorizer: Categorizer,
    settings: TipSettings,
}

impl TipService {
    /// Wire the pipeline to its feeds.
    pub fn new(
        odds: Arc<dyn OddsFeed>,
        fixtures: Arc<dyn FixtureFeed>,
        standings: Arc<dyn StandingsFeed>,
        settings: TipSettings,
    ) -> Self {
        let over_under = settings.buckets.over_under().is_some();
        Self {
            odds,
            fixtures,
            standings,
            selector: OutcomeSelector::new(settings.window, over_under),
            categorizer: Categorizer::new(settings.buckets.clone()),
            settings,
        }
    }

    /// Settings this service was built with.
    pub fn settings(&self) -> &TipSettings {
        &self.settings
    }

    /// Produce every enriched tip for events kicking off after `now`, in feed
    /// order. Only an odds feed failure is an error.
    #[instrument(skip(self))]
    pub async fn collect(&self, now: DateTime<Utc>) -> Result<Vec<Tip>> {
        let raw = self
            .odds
            .fetch_events()
            .await
            .inspect_err(|_| metrics::inc_feed_failures(metrics::FEED_ODDS))?;
        metrics::inc_events_received(raw.len() as u64);
        let received = raw.len();

        let events = dedupe(validate_events(raw, now));
        debug!(received, kept = events.len(), "Validated odds events");

        let today = now.with_timezone(&self.settings.fixtures_timezone).date_naive();
        let fixtures = match self.fixtures.fixtures_on(today).await {
            Ok(fixtures) => fixtures,
            Err(e) => {
                warn!(date = %today, error = %e, "Fixtures unavailable, positions will be N/A");
                metrics::inc_feed_failures(metrics::FEED_FIXTURES);
                Vec::new()
            }
        };

        let season = now.year();
        let resolver = StandingsResolver::new(self.standings.as_ref());
        let mut tips = Vec::new();

        for event in events {
            let selection = self.selector.select(&event);
            if selection.is_empty() {
                continue;
            }

            let (home_position, away_position) = match lookup_team(&event.home, &fixtures) {
                Some(found) => (
                    resolver.resolve(found.league_id, found.team_id, season).await,
                    resolver.resolve(found.league_id, found.opponent_id, season).await,
                ),
                None => {
                    debug!(team = %event.home, "Team not found in today's fixtures");
                    (Standing::Unknown, Standing::Unknown)
                }
            };

            for candidate in selection.into_candidates() {
                let market = candidate.market;
                if let Some(tip) = Tip::new(
                    &event,
                    candidate,
                    home_position,
                    away_position,
                    &self.settings.kickoff_timezone,
                ) {
                    metrics::inc_tips_selected(market.metric_label());
                    tips.push(tip);
                }
            }
        }

        Ok(tips)
    }

    /// Collect tips and bucket them, shuffling with `rng`.
    pub async fn categorize_with<R: Rng + Send + ?Sized>(
        &self,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<CategorizedTips> {
        let tips = self.collect(now).await?;
        let selected = tips.len();
        let categorized = self.categorizer.categorize(tips, rng);

        info!(selected, bucketed = categorized.total(), "Tips categorized");
        Ok(categorized)
    }

    /// Collect and bucket tips with a freshly seeded RNG.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<CategorizedTips> {
        let mut rng = StdRng::from_entropy();
        self.categorize_with(now, &mut rng).await
    }
}
