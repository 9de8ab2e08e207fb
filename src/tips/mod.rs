//! Tip selection and categorization.
//!
//! This module handles:
//! - Validating and deduplicating odds events
//! - Picking the best outcome per market
//! - Team lookup and standings enrichment
//! - Bucketing tips by risk tier

pub mod categorizer;
pub mod dedup;
pub mod lookup;
pub mod model;
pub mod pipeline;
pub mod selector;
pub mod standings;

pub use categorizer::{Bucket, BucketProfile, BucketTable, CategorizedTips, Categorizer};
pub use dedup::{dedupe, validate_events};
pub use lookup::{lookup_team, TeamMatch};
pub use model::{MarketType, ScheduledEvent, Standing, Tip};
pub use pipeline::{TipService, TipSettings};
pub use selector::{OutcomeSelector, SelectionWindow};
pub use standings::StandingsResolver;
