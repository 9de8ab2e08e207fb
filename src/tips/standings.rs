//! League position enrichment.

use tracing::{debug, warn};

use super::model::Standing;
use crate::feed::StandingsFeed;
use crate::metrics;

/// Turns standings lookups into [`Standing`]s. Never fails: missing ids,
/// transport errors, bad statuses and unlisted teams all become
/// [`Standing::Unknown`].
#[derive(Clone, Copy)]
pub struct StandingsResolver<'a> {
    feed: &'a dyn StandingsFeed,
}

impl<'a> StandingsResolver<'a> {
    /// Wrap a standings feed.
    pub fn new(feed: &'a dyn StandingsFeed) -> Self {
        Self { feed }
    }

    /// Position of `team_id` in `league_id` for `season`.
    pub async fn resolve(&self, league_id: Option<u64>, team_id: Option<u64>, season: i32) -> Standing {
        let (Some(league_id), Some(team_id)) = (league_id, team_id) else {
            return Standing::Unknown;
        };

        match self.feed.team_rank(league_id, team_id, season).await {
            Ok(Some(rank)) => Standing::Rank(rank),
            Ok(None) => {
                debug!(league_id, team_id, season, "Team not listed in standings");
                Standing::Unknown
            }
            Err(e) => {
                warn!(league_id, team_id, season, error = %e, "Standings lookup failed");
                metrics::inc_feed_failures(metrics::FEED_STANDINGS);
                Standing::Unknown
            }
        }
    }
}
