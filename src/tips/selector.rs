//! Per-event outcome selection.
//!
//! For each event the selector keeps at most one match-winner outcome and at
//! most one over/under 2.5 outcome: the eligible price closest to the target
//! (2.0 by default, roughly even money). Prices outside the window are never
//! picked, so very safe favourites and long shots are ignored.

use rust_decimal::Decimal;
use tracing::trace;

use super::model::{Candidate, MarketType, ScheduledEvent};
use crate::error::ConfigError;
use crate::feed::types::{MarketKey, Outcome};

/// Goal line the over/under rule looks for.
pub const OVER_UNDER_LINE: Decimal = Decimal::from_parts(25, 0, 0, false, 1);

/// Eligible price range and the price the selector steers towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionWindow {
    min_price: Decimal,
    max_price: Decimal,
    target: Decimal,
}

impl SelectionWindow {
    /// Create a window, rejecting empty or non-positive ranges.
    pub fn new(min_price: Decimal, max_price: Decimal, target: Decimal) -> Result<Self, ConfigError> {
        if min_price <= Decimal::ZERO {
            return Err(ConfigError::Invalid(format!(
                "MIN_PRICE must be positive, got {}",
                min_price
            )));
        }
        if min_price > max_price {
            return Err(ConfigError::Invalid(format!(
                "MIN_PRICE {} is above MAX_PRICE {}",
                min_price, max_price
            )));
        }
        Ok(Self {
            min_price,
            max_price,
            target,
        })
    }

    /// Lowest eligible price.
    pub fn min(&self) -> Decimal {
        self.min_price
    }

    /// Highest eligible price.
    pub fn max(&self) -> Decimal {
        self.max_price
    }

    /// Price the selector steers towards.
    pub fn target(&self) -> Decimal {
        self.target
    }

    /// Whether `price` may be selected at all.
    pub fn contains(&self, price: Decimal) -> bool {
        price > Decimal::ZERO && self.min_price <= price && price <= self.max_price
    }

    /// Distance from the target price.
    pub fn distance(&self, price: Decimal) -> Decimal {
        (self.target - price).abs()
    }
}

impl Default for SelectionWindow {
    fn default() -> Self {
        Self {
            min_price: Decimal::new(14, 1),
            max_price: Decimal::new(40, 1),
            target: Decimal::TWO,
        }
    }
}

/// Outcome of running the selector over one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventSelection {
    /// Best match-winner outcome.
    pub match_winner: Option<Candidate>,
    /// Best over/under outcome.
    pub over_under: Option<Candidate>,
}

impl EventSelection {
    /// Whether neither market produced a candidate.
    pub fn is_empty(&self) -> bool {
        self.match_winner.is_none() && self.over_under.is_none()
    }

    /// Candidates in tip order: match winner first.
    pub fn into_candidates(self) -> impl Iterator<Item = Candidate> {
        self.match_winner.into_iter().chain(self.over_under)
    }
}

/// Picks the best outcome per market.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutcomeSelector {
    window: SelectionWindow,
    over_under: bool,
}

impl OutcomeSelector {
    /// Create a selector. Totals markets are ignored unless `over_under` is set.
    pub fn new(window: SelectionWindow, over_under: bool) -> Self {
        Self { window, over_under }
    }

    /// Scan every bookmaker/market/outcome of `event` in feed order.
    pub fn select(&self, event: &ScheduledEvent) -> EventSelection {
        let mut selection = EventSelection::default();

        for bookmaker in &event.bookmakers {
            for market in &bookmaker.markets {
                let Some(kind) = market.kind() else {
                    continue;
                };
                for outcome in &market.outcomes {
                    let Some(price) = outcome.price.filter(|p| *p > Decimal::ZERO) else {
                        continue;
                    };
                    match kind {
                        MarketKey::H2h if !outcome.name.eq_ignore_ascii_case("draw") => {
                            self.consider(
                                &mut selection.match_winner,
                                MarketType::MatchWinner,
                                &outcome.name,
                                price,
                            );
                        }
                        MarketKey::Totals if self.over_under => {
                            if on_over_under_line(outcome) {
                                self.consider(
                                    &mut selection.over_under,
                                    MarketType::OverUnder,
                                    &totals_label(outcome),
                                    price,
                                );
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        trace!(
            event = %event.title(),
            match_winner = ?selection.match_winner.as_ref().map(|c| c.price),
            over_under = ?selection.over_under.as_ref().map(|c| c.price),
            "Outcome selection"
        );

        selection
    }

    /// Replace `best` when `price` is in the window and strictly closer to the target.
    fn consider(&self, best: &mut Option<Candidate>, market: MarketType, label: &str, price: Decimal) {
        if !self.window.contains(price) {
            return;
        }
        let closer = match best {
            Some(current) => self.window.distance(price) < self.window.distance(current.price),
            None => true,
        };
        if closer {
            *best = Some(Candidate {
                market,
                label: label.to_string(),
                price,
            });
        }
    }
}

/// Whether a totals outcome is on the 2.5 goal line. A separate `point`
/// wins over the name; otherwise one word of the name must be the line.
fn on_over_under_line(outcome: &Outcome) -> bool {
    match outcome.point {
        Some(point) => point == OVER_UNDER_LINE,
        None => outcome
            .name
            .split_whitespace()
            .any(|word| word.parse::<Decimal>().ok() == Some(OVER_UNDER_LINE)),
    }
}

/// Display label of a totals outcome: the name, plus the line when the feed
/// sends it as a separate `point`.
fn totals_label(outcome: &Outcome) -> String {
    match outcome.point {
        Some(point) if !outcome.name.contains(&point.normalize().to_string()) => {
            format!("{} {}", outcome.name, point.normalize())
        }
        _ => outcome.name.clone(),
    }
}
