//! Validated events and the tips derived from them.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use strum::Display;

use crate::feed::types::Bookmaker;

/// Kickoff rendering used in tips.
pub const KICKOFF_FORMAT: &str = "%Y-%m-%d %H:%M";

/// An odds event that passed validation: both teams named, kickoff parsed and
/// still in the future.
#[derive(Debug, Clone)]
pub struct ScheduledEvent {
    /// Home team name as sent by the odds provider.
    pub home: String,
    /// Away team name as sent by the odds provider.
    pub away: String,
    /// Kickoff instant.
    pub kickoff: DateTime<Utc>,
    /// Bookmakers in feed order.
    pub bookmakers: Vec<Bookmaker>,
}

impl ScheduledEvent {
    /// Case-insensitive `home_away` key identifying the match.
    pub fn match_key(&self) -> String {
        format!("{}_{}", self.home, self.away).to_lowercase()
    }

    /// "Home vs Away".
    pub fn title(&self) -> String {
        format!("{} vs {}", self.home, self.away)
    }
}

/// Which market a tip was picked from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
pub enum MarketType {
    /// Head-to-head winner (draw excluded).
    #[serde(rename = "Match Winner")]
    #[strum(serialize = "Match Winner")]
    MatchWinner,
    /// Total goals over/under 2.5.
    #[serde(rename = "Over/Under")]
    #[strum(serialize = "Over/Under")]
    OverUnder,
}

impl MarketType {
    /// Short label for metrics.
    pub fn metric_label(&self) -> &'static str {
        match self {
            MarketType::MatchWinner => "match_winner",
            MarketType::OverUnder => "over_under",
        }
    }
}

/// League position of a team, or unknown when the lookup failed for any reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Standing {
    /// Table position.
    Rank(u32),
    /// Not resolvable.
    #[default]
    Unknown,
}

impl Serialize for Standing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Standing::Rank(rank) => serializer.serialize_u32(*rank),
            Standing::Unknown => serializer.serialize_str("N/A"),
        }
    }
}

/// Best outcome picked for one market of one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Market the outcome belongs to.
    pub market: MarketType,
    /// Outcome label as displayed ("Arsenal", "Over 2.5").
    pub label: String,
    /// Decimal price.
    pub price: Decimal,
}

/// One recommended wager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tip {
    /// "Home vs Away".
    #[serde(rename = "match")]
    pub matchup: String,
    /// Kickoff in [`KICKOFF_FORMAT`].
    pub kickoff: String,
    /// What to bet on.
    #[serde(rename = "tip")]
    pub label: String,
    /// Price rounded to two places.
    #[serde(with = "rust_decimal::serde::float")]
    pub odds: Decimal,
    /// Implied probability, e.g. "50.0%".
    pub probability: String,
    /// Market type.
    #[serde(rename = "type")]
    pub market: MarketType,
    /// Home team league position.
    pub home_position: Standing,
    /// Away team league position.
    pub away_position: Standing,
}

impl Tip {
    /// Build a tip from a selected candidate. `None` when the price rounds to zero.
    pub fn new(
        event: &ScheduledEvent,
        candidate: Candidate,
        home_position: Standing,
        away_position: Standing,
        kickoff_tz: &Tz,
    ) -> Option<Self> {
        let odds = candidate.price.round_dp(2);
        let probability = implied_probability(odds)?;
        let label = match candidate.market {
            MarketType::MatchWinner => candidate.label,
            MarketType::OverUnder => format!("{} goals", candidate.label),
        };

        Some(Self {
            matchup: event.title(),
            kickoff: event
                .kickoff
                .with_timezone(kickoff_tz)
                .format(KICKOFF_FORMAT)
                .to_string(),
            label,
            odds,
            probability: format!("{:.1}%", probability),
            market: candidate.market,
            home_position,
            away_position,
        })
    }
}

/// `round(100 / odds, 1)`; `None` for non-positive odds.
pub fn implied_probability(odds: Decimal) -> Option<Decimal> {
    if odds <= Decimal::ZERO {
        return None;
    }
    Decimal::ONE_HUNDRED
        .checked_div(odds)
        .map(|p| p.round_dp(1))
}
