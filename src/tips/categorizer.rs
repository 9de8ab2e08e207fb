//! Risk buckets and tip categorization.
//!
//! Tips are shuffled, then poured into buckets in declared order. A bucket is
//! an inclusive odds range with a capacity; the first open bucket whose range
//! contains the odds takes the tip. Over/under tips have their own bucket with
//! no range. Anything that does not fit is dropped silently.

use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use strum::{Display, EnumString};
use tracing::debug;

use super::model::{MarketType, Tip};
use crate::error::ConfigError;
use crate::metrics;

/// Capacity used by the built-in profiles.
pub const DEFAULT_CAPACITY: usize = 10;

/// Name of the over/under bucket in responses.
pub const OVER_UNDER_BUCKET: &str = "overunder";

/// A named odds range with a capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    /// Name used as the response key.
    pub name: String,
    /// Lowest odds accepted (inclusive).
    pub min_odds: Decimal,
    /// Highest odds accepted (inclusive).
    pub max_odds: Decimal,
    /// Maximum number of tips.
    pub capacity: usize,
}

impl Bucket {
    /// Create a bucket.
    pub fn new(name: impl Into<String>, min_odds: Decimal, max_odds: Decimal, capacity: usize) -> Self {
        Self {
            name: name.into(),
            min_odds,
            max_odds,
            capacity,
        }
    }

    /// Whether `odds` falls in this bucket's range.
    pub fn accepts(&self, odds: Decimal) -> bool {
        self.min_odds <= odds && odds <= self.max_odds
    }
}

impl FromStr for Bucket {
    type Err = ConfigError;

    /// Parse `name:min-max:capacity`; capacity defaults to 10.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |why: &str| ConfigError::InvalidBucket(format!("{:?}: {}", s, why));

        let mut parts = s.trim().split(':');
        let name = parts.next().map(str::trim).filter(|n| !n.is_empty());
        let range = parts.next().map(str::trim);
        let capacity = parts.next().map(str::trim);
        if parts.next().is_some() {
            return Err(invalid("expected name:min-max[:capacity]"));
        }

        let name = name.ok_or_else(|| invalid("missing name"))?;
        let (min, max) = range
            .and_then(|r| r.split_once('-'))
            .ok_or_else(|| invalid("missing min-max range"))?;
        let min_odds: Decimal = min.trim().parse().map_err(|_| invalid("bad min odds"))?;
        let max_odds: Decimal = max.trim().parse().map_err(|_| invalid("bad max odds"))?;
        let capacity = match capacity {
            Some(c) => c.parse().map_err(|_| invalid("bad capacity"))?,
            None => DEFAULT_CAPACITY,
        };

        if min_odds <= Decimal::ZERO || min_odds > max_odds {
            return Err(invalid("range must be positive and min <= max"));
        }
        if name == OVER_UNDER_BUCKET {
            return Err(invalid("name is reserved for the over/under bucket"));
        }

        Ok(Self::new(name, min_odds, max_odds, capacity))
    }
}

/// Over/under bucket: no range, only a capacity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverUnderBucket {
    /// Maximum number of tips.
    pub capacity: usize,
}

/// Ordered risk buckets plus the optional over/under bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketTable {
    risk: Vec<Bucket>,
    over_under: Option<OverUnderBucket>,
}

impl BucketTable {
    /// Create a table. Bucket order is assignment priority.
    pub fn new(risk: Vec<Bucket>, over_under: Option<OverUnderBucket>) -> Self {
        Self { risk, over_under }
    }

    /// Parse a comma-separated list of `name:min-max[:capacity]` buckets.
    pub fn parse_risk_buckets(raw: &str) -> Result<Vec<Bucket>, ConfigError> {
        let buckets = raw
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Bucket::from_str)
            .collect::<Result<Vec<_>, _>>()?;

        if buckets.is_empty() {
            return Err(ConfigError::InvalidBucket("no buckets defined".to_string()));
        }
        for (i, bucket) in buckets.iter().enumerate() {
            if buckets[..i].iter().any(|b| b.name == bucket.name) {
                return Err(ConfigError::InvalidBucket(format!(
                    "duplicate bucket name {:?}",
                    bucket.name
                )));
            }
        }
        Ok(buckets)
    }

    /// Same table with an over/under bucket of `capacity`.
    pub fn with_over_under(mut self, capacity: usize) -> Self {
        self.over_under = Some(OverUnderBucket { capacity });
        self
    }

    /// Same table without the over/under bucket.
    pub fn without_over_under(mut self) -> Self {
        self.over_under = None;
        self
    }

    /// Risk buckets in priority order.
    pub fn risk(&self) -> &[Bucket] {
        &self.risk
    }

    /// Over/under bucket, if enabled.
    pub fn over_under(&self) -> Option<&OverUnderBucket> {
        self.over_under.as_ref()
    }

    /// Bucket names in response order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.risk
            .iter()
            .map(|b| b.name.as_str())
            .chain(self.over_under.as_ref().map(|_| OVER_UNDER_BUCKET))
    }
}

/// Built-in bucket layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BucketProfile {
    /// safe 1.3-1.8, risky 1.9-3.5, plus over/under.
    #[default]
    Classic,
    /// safe 1.5-1.8, risky 2.0-3.0, bomb 3.01-10.0, no over/under.
    Tiered,
}

impl BucketProfile {
    /// Whether the profile carries an over/under bucket.
    pub fn has_over_under(&self) -> bool {
        matches!(self, BucketProfile::Classic)
    }

    /// The profile's bucket table.
    pub fn table(&self) -> BucketTable {
        match self {
            BucketProfile::Classic => BucketTable::new(
                vec![
                    Bucket::new("safe", Decimal::new(13, 1), Decimal::new(18, 1), DEFAULT_CAPACITY),
                    Bucket::new("risky", Decimal::new(19, 1), Decimal::new(35, 1), DEFAULT_CAPACITY),
                ],
                Some(OverUnderBucket {
                    capacity: DEFAULT_CAPACITY,
                }),
            ),
            BucketProfile::Tiered => BucketTable::new(
                vec![
                    Bucket::new("safe", Decimal::new(15, 1), Decimal::new(18, 1), DEFAULT_CAPACITY),
                    Bucket::new("risky", Decimal::new(20, 1), Decimal::new(30, 1), DEFAULT_CAPACITY),
                    Bucket::new("bomb", Decimal::new(301, 2), Decimal::new(100, 1), DEFAULT_CAPACITY),
                ],
                None,
            ),
        }
    }
}

/// Tips grouped by bucket, in table order. Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorizedTips {
    buckets: Vec<(String, Vec<Tip>)>,
}

impl CategorizedTips {
    /// Tips of the bucket called `name`.
    pub fn get(&self, name: &str) -> Option<&[Tip]> {
        self.buckets
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, tips)| tips.as_slice())
    }

    /// Iterate `(bucket name, tips)` in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Tip])> {
        self.buckets.iter().map(|(n, t)| (n.as_str(), t.as_slice()))
    }

    /// Total number of bucketed tips.
    pub fn total(&self) -> usize {
        self.buckets.iter().map(|(_, t)| t.len()).sum()
    }
}

impl Serialize for CategorizedTips {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for (name, tips) in &self.buckets {
            map.serialize_entry(name, tips)?;
        }
        map.end()
    }
}

/// Distributes tips over a [`BucketTable`].
#[derive(Debug, Clone)]
pub struct Categorizer {
    table: BucketTable,
}

impl Categorizer {
    /// Create a categorizer for `table`.
    pub fn new(table: BucketTable) -> Self {
        Self { table }
    }

    /// The table tips are poured into.
    pub fn table(&self) -> &BucketTable {
        &self.table
    }

    /// Shuffle `tips` with `rng` and fill the buckets.
    pub fn categorize<R: Rng + ?Sized>(&self, mut tips: Vec<Tip>, rng: &mut R) -> CategorizedTips {
        tips.shuffle(rng);

        let mut risk: Vec<Vec<Tip>> = vec![Vec::new(); self.table.risk.len()];
        let mut over_under: Vec<Tip> = Vec::new();

        for tip in tips {
            let slot: Option<&mut Vec<Tip>> = match tip.market {
                MarketType::OverUnder => match &self.table.over_under {
                    Some(bucket) if over_under.len() < bucket.capacity => Some(&mut over_under),
                    _ => None,
                },
                MarketType::MatchWinner => self
                    .table
                    .risk
                    .iter()
                    .zip(risk.iter_mut())
                    .find(|(bucket, held)| bucket.accepts(tip.odds) && held.len() < bucket.capacity)
                    .map(|(_, held)| held),
            };

            match slot {
                Some(held) => {
                    metrics::inc_tips_bucketed(tip.market.metric_label());
                    held.push(tip);
                }
                None => {
                    debug!(matchup = %tip.matchup, odds = %tip.odds, market = %tip.market, "Tip fits no open bucket");
                    metrics::inc_tips_dropped(tip.market.metric_label());
                }
            }
        }

        let mut buckets: Vec<(String, Vec<Tip>)> = self
            .table
            .risk
            .iter()
            .map(|b| b.name.clone())
            .zip(risk)
            .collect();
        if self.table.over_under.is_some() {
            buckets.push((OVER_UNDER_BUCKET.to_string(), over_under));
        }

        CategorizedTips { buckets }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tips::model::Standing;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;

    fn tip(matchup: &str, odds: Decimal, market: MarketType) -> Tip {
        Tip {
            matchup: matchup.to_string(),
            kickoff: "2030-01-01 12:00".to_string(),
            label: "X".to_string(),
            odds,
            probability: String::new(),
            market,
            home_position: Standing::Unknown,
            away_position: Standing::Unknown,
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn match_winner_goes_to_first_matching_bucket() {
        let categorizer = Categorizer::new(BucketProfile::Classic.table());
        let tips = vec![
            tip("safe", dec!(1.5), MarketType::MatchWinner),
            tip("risky", dec!(2.0), MarketType::MatchWinner),
            tip("gap", dec!(1.85), MarketType::MatchWinner),
            tip("ou", dec!(1.9), MarketType::OverUnder),
        ];

        let result = categorizer.categorize(tips, &mut rng());

        assert_eq!(result.get("safe").unwrap()[0].matchup, "safe");
        assert_eq!(result.get("risky").unwrap()[0].matchup, "risky");
        assert_eq!(result.get("overunder").unwrap()[0].matchup, "ou");
        assert_eq!(result.total(), 3);
    }

    #[test]
    fn bucket_bounds_are_inclusive() {
        let bucket = Bucket::new("safe", dec!(1.3), dec!(1.8), 10);
        assert!(bucket.accepts(dec!(1.3)));
        assert!(bucket.accepts(dec!(1.8)));
        assert!(!bucket.accepts(dec!(1.81)));
    }

    #[test]
    fn capacity_is_never_exceeded() {
        let categorizer = Categorizer::new(BucketProfile::Classic.table());
        let mut tips = Vec::new();
        for i in 0..25 {
            tips.push(tip(&format!("s{}", i), dec!(1.6), MarketType::MatchWinner));
            tips.push(tip(&format!("o{}", i), dec!(2.0), MarketType::OverUnder));
        }

        let result = categorizer.categorize(tips, &mut rng());

        assert_eq!(result.get("safe").unwrap().len(), 10);
        assert_eq!(result.get("risky").unwrap().len(), 0);
        assert_eq!(result.get("overunder").unwrap().len(), 10);
    }

    #[test]
    fn full_bucket_falls_through_to_next_matching_bucket() {
        let table = BucketTable::new(
            vec![
                Bucket::new("first", dec!(1.5), dec!(2.5), 1),
                Bucket::new("second", dec!(1.5), dec!(2.5), 1),
            ],
            None,
        );
        let tips = vec![
            tip("a", dec!(2.0), MarketType::MatchWinner),
            tip("b", dec!(2.0), MarketType::MatchWinner),
            tip("c", dec!(2.0), MarketType::MatchWinner),
        ];

        let result = Categorizer::new(table).categorize(tips, &mut rng());

        assert_eq!(result.get("first").unwrap().len(), 1);
        assert_eq!(result.get("second").unwrap().len(), 1);
        assert_eq!(result.total(), 2);
    }

    #[test]
    fn over_under_dropped_without_bucket() {
        let categorizer = Categorizer::new(BucketProfile::Tiered.table());
        let tips = vec![
            tip("ou", dec!(2.0), MarketType::OverUnder),
            tip("bomb", dec!(3.5), MarketType::MatchWinner),
        ];

        let result = categorizer.categorize(tips, &mut rng());

        assert!(result.get("overunder").is_none());
        assert_eq!(result.get("bomb").unwrap()[0].matchup, "bomb");
        assert_eq!(result.total(), 1);
    }

    #[test]
    fn membership_is_independent_of_shuffle_seed() {
        let categorizer = Categorizer::new(BucketProfile::Tiered.table());
        let tips: Vec<_> = (0..6)
            .map(|i| tip(&format!("t{}", i), dec!(1.5) + Decimal::new(i, 0) / dec!(2), MarketType::MatchWinner))
            .collect();

        let names = |seed: u64| -> Vec<HashSet<String>> {
            let result = categorizer.categorize(tips.clone(), &mut StdRng::seed_from_u64(seed));
            result
                .iter()
                .map(|(_, tips)| tips.iter().map(|t| t.matchup.clone()).collect())
                .collect()
        };

        assert_eq!(names(1), names(99));
    }

    #[test]
    fn every_match_winner_respects_its_bucket_range() {
        let table = BucketProfile::Tiered.table();
        let categorizer = Categorizer::new(table.clone());
        let tips: Vec<_> = [dec!(1.45), dec!(1.6), dec!(1.9), dec!(2.5), dec!(3.0), dec!(3.005), dec!(3.9)]
            .into_iter()
            .map(|odds| tip("m", odds, MarketType::MatchWinner))
            .collect();

        let result = categorizer.categorize(tips, &mut rng());

        for (name, held) in result.iter() {
            let bucket = table.risk().iter().find(|b| b.name == name).unwrap();
            assert!(held.len() <= bucket.capacity);
            for tip in held {
                assert!(bucket.accepts(tip.odds), "{} outside {}", tip.odds, name);
            }
        }
        assert_eq!(result.total(), 4);
    }

    #[test]
    fn serializes_buckets_in_table_order() {
        let categorizer = Categorizer::new(BucketProfile::Classic.table());
        let result = categorizer.categorize(Vec::new(), &mut rng());

        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"safe":[],"risky":[],"overunder":[]}"#);
    }

    #[test]
    fn parses_bucket_definitions() {
        let bucket: Bucket = "safe:1.3-1.8:5".parse().unwrap();
        assert_eq!(bucket, Bucket::new("safe", dec!(1.3), dec!(1.8), 5));

        let bucket: Bucket = " bomb : 3.01 - 10 ".parse().unwrap();
        assert_eq!(bucket.capacity, DEFAULT_CAPACITY);
        assert_eq!(bucket.max_odds, dec!(10));
    }

    #[test]
    fn rejects_bad_bucket_definitions() {
        assert!("safe".parse::<Bucket>().is_err());
        assert!("safe:1.8-1.3".parse::<Bucket>().is_err());
        assert!("safe:a-b".parse::<Bucket>().is_err());
        assert!("safe:1.3-1.8:many".parse::<Bucket>().is_err());
        assert!("overunder:1.3-1.8".parse::<Bucket>().is_err());
        assert!(BucketTable::parse_risk_buckets("a:1-2,a:2-3").is_err());
        assert!(BucketTable::parse_risk_buckets(" , ").is_err());
    }

    #[test]
    fn profile_parses_from_name() {
        assert_eq!("tiered".parse::<BucketProfile>().unwrap(), BucketProfile::Tiered);
        assert_eq!(BucketProfile::Classic.to_string(), "classic");
    }
}
