//! Wire types for The Odds API and API-Football responses.
//!
//! Every field is optional or defaulted: a malformed record is dropped later by
//! the validation stage instead of failing the whole response.

use rust_decimal::Decimal;
use serde::Deserialize;
use strum::{Display, EnumString};

/// One upcoming fixture as returned by the odds provider.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OddsEvent {
    /// Provider event id.
    pub id: Option<String>,
    /// Home team name.
    pub home_team: Option<String>,
    /// Away team name.
    pub away_team: Option<String>,
    /// Kickoff time (RFC 3339).
    pub commence_time: Option<String>,
    /// Bookmakers pricing this event, in feed order.
    pub bookmakers: Vec<Bookmaker>,
}

/// A bookmaker's markets for one event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Bookmaker {
    /// Bookmaker key (e.g. "pinnacle").
    pub key: String,
    /// Display title.
    pub title: String,
    /// Markets in feed order.
    pub markets: Vec<Market>,
}

/// One market (h2h, totals, ...) of a bookmaker.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Market {
    /// Market key as sent by the provider.
    pub key: String,
    /// Priced outcomes in feed order.
    pub outcomes: Vec<Outcome>,
}

impl Market {
    /// Parsed market key, `None` for markets the selector does not handle.
    pub fn kind(&self) -> Option<MarketKey> {
        self.key.parse().ok()
    }
}

/// A priced outcome.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Outcome {
    /// Outcome name ("Arsenal", "Draw", "Over", "Over 2.5").
    pub name: String,
    /// Decimal odds.
    pub price: Option<Decimal>,
    /// Line for totals/spreads when sent separately from the name.
    pub point: Option<Decimal>,
}

/// Market keys the selector understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum MarketKey {
    /// Head to head (match winner).
    #[strum(serialize = "h2h")]
    H2h,
    /// Over/under total goals.
    #[strum(serialize = "totals")]
    Totals,
}

/// Envelope used by every API-Football endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiFootballResponse<T> {
    /// Payload records.
    #[serde(default = "Vec::new")]
    pub response: Vec<T>,
}

/// Fixture record from `/fixtures`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FixtureRecord {
    /// Home and away teams.
    pub teams: FixtureTeams,
    /// Competition.
    pub league: LeagueRef,
}

/// Teams of a fixture record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FixtureTeams {
    /// Home side.
    pub home: TeamRef,
    /// Away side.
    pub away: TeamRef,
}

/// Team id and name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TeamRef {
    /// Provider team id.
    pub id: Option<u64>,
    /// Team name.
    pub name: String,
}

/// League reference.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LeagueRef {
    /// Provider league id.
    pub id: Option<u64>,
}

/// Scheduled match with the identifiers needed for standings lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    /// Home side.
    pub home: TeamRef,
    /// Away side.
    pub away: TeamRef,
    /// League the match is played in.
    pub league_id: Option<u64>,
}

impl From<FixtureRecord> for Fixture {
    fn from(record: FixtureRecord) -> Self {
        Self {
            home: record.teams.home,
            away: record.teams.away,
            league_id: record.league.id,
        }
    }
}

/// Standings record from `/standings`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StandingsRecord {
    /// League with its standings groups.
    pub league: StandingsLeague,
}

/// League block of a standings record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StandingsLeague {
    /// Standings groups; regular leagues have exactly one.
    pub standings: Vec<Vec<StandingRow>>,
}

/// One table row.
#[derive(Debug, Clone, Deserialize)]
pub struct StandingRow {
    /// Table position.
    pub rank: u32,
    /// Team in this position.
    pub team: StandingTeam,
}

/// Team of a table row.
#[derive(Debug, Clone, Deserialize)]
pub struct StandingTeam {
    /// Provider team id.
    pub id: u64,
}

impl StandingsRecord {
    /// Rank of `team_id` in the first standings group, if listed.
    pub fn rank_of(&self, team_id: u64) -> Option<u32> {
        self.league
            .standings
            .first()?
            .iter()
            .find(|row| row.team.id == team_id)
            .map(|row| row.rank)
    }
}
