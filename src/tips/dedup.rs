//! Event validation and match deduplication.
//!
//! Raw odds events are first narrowed to [`ScheduledEvent`]s (both teams named,
//! kickoff parsed and in the future), then deduplicated by match key. Nothing
//! in here fails: bad input is dropped and counted.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::model::ScheduledEvent;
use crate::feed::types::OddsEvent;
use crate::metrics;

/// Why an event was dropped before selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Missing/empty team name or kickoff, or unparsable kickoff.
    Malformed,
    /// Kickoff at or before the processing instant.
    Started,
    /// Match key already seen in this run.
    Duplicate,
}

impl SkipReason {
    /// Metric label.
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Malformed => "malformed",
            SkipReason::Started => "started",
            SkipReason::Duplicate => "duplicate",
        }
    }
}

/// Validate one raw event against `now`.
pub fn validate_event(event: OddsEvent, now: DateTime<Utc>) -> Result<ScheduledEvent, SkipReason> {
    let non_empty = |s: Option<String>| s.filter(|s| !s.trim().is_empty());

    let (Some(home), Some(away), Some(commence)) = (
        non_empty(event.home_team),
        non_empty(event.away_team),
        non_empty(event.commence_time),
    ) else {
        return Err(SkipReason::Malformed);
    };

    let kickoff = DateTime::parse_from_rfc3339(commence.trim())
        .map_err(|_| SkipReason::Malformed)?
        .with_timezone(&Utc);

    if kickoff <= now {
        return Err(SkipReason::Started);
    }

    Ok(ScheduledEvent {
        home,
        away,
        kickoff,
        bookmakers: event.bookmakers,
    })
}

/// Keep the well-formed, not-yet-started events, in feed order.
pub fn validate_events(events: Vec<OddsEvent>, now: DateTime<Utc>) -> Vec<ScheduledEvent> {
    events
        .into_iter()
        .filter_map(|event| match validate_event(event, now) {
            Ok(scheduled) => Some(scheduled),
            Err(reason) => {
                metrics::inc_events_skipped(reason.as_str());
                None
            }
        })
        .collect()
}

/// Keep the first event of every match key, in feed order.
pub fn dedupe(events: Vec<ScheduledEvent>) -> Vec<ScheduledEvent> {
    let mut seen = HashSet::with_capacity(events.len());

    events
        .into_iter()
        .filter(|event| {
            let fresh = seen.insert(event.match_key());
            if !fresh {
                debug!(event = %event.title(), "Skipping duplicate match");
                metrics::inc_events_skipped(SkipReason::Duplicate.as_str());
            }
            fresh
        })
        .collect()
}
