//! Integration tests for the tip pipeline.
//!
//! These run the whole pipeline (validation, selection, enrichment and
//! bucketing) against the mock feeds, so no network access is needed.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio_test::assert_ok;

use matchday_tips::feed::mock::{fixture, MockConfig, MockEventBuilder, MockFeeds};
use matchday_tips::tips::{
    BucketProfile, CategorizedTips, MarketType, Standing, TipService, TipSettings,
};

fn service(feeds: MockFeeds, settings: TipSettings) -> TipService {
    let feeds = Arc::new(feeds);
    TipService::new(feeds.clone(), feeds.clone(), feeds, settings)
}

async fn bucket(service: &TipService, now: DateTime<Utc>, seed: u64) -> CategorizedTips {
    let mut rng = StdRng::seed_from_u64(seed);
    assert_ok!(service.categorize_with(now, &mut rng).await)
}

/// One single-outcome event per price, all kicking off tomorrow.
fn ladder(now: DateTime<Utc>, prices: &[Decimal]) -> MockFeeds {
    prices.iter().enumerate().fold(MockFeeds::new(), |feeds, (i, price)| {
        let home = format!("Home {}", i);
        feeds.with_event(
            MockEventBuilder::new(home.clone(), format!("Away {}", i))
                .kickoff(now + Duration::days(1))
                .h2h(&[(home.as_str(), *price)])
                .build(),
        )
    })
}

#[tokio::test]
async fn even_money_pick_lands_in_risky() {
    let now = Utc::now();
    let feeds = MockFeeds::new().with_event(
        MockEventBuilder::new("A", "B")
            .kickoff(now + Duration::days(1))
            .h2h(&[("A", dec!(2.0)), ("B", dec!(3.2)), ("Draw", dec!(3.5))])
            .build(),
    );
    let service = service(feeds, TipSettings::default());

    let categorized = bucket(&service, now, 7).await;

    assert!(categorized.get("safe").unwrap().is_empty());
    let risky = categorized.get("risky").unwrap();
    assert_eq!(risky.len(), 1);
    assert_eq!(risky[0].matchup, "A vs B");
    assert_eq!(risky[0].label, "A");
    assert_eq!(risky[0].odds, dec!(2.0));
    assert_eq!(risky[0].probability, "50.0%");
    assert_eq!(risky[0].market, MarketType::MatchWinner);
}

#[tokio::test]
async fn buckets_respect_ranges_and_capacity() {
    let now = Utc::now();
    // 1.45 ..= 2.90 in steps of 0.05
    let prices: Vec<Decimal> = (0..30).map(|i| dec!(1.45) + Decimal::new(5 * i, 2)).collect();
    let service = service(ladder(now, &prices), TipSettings::default());
    let table = service.settings().buckets.clone();

    for seed in 0..5 {
        let categorized = bucket(&service, now, seed).await;

        for b in table.risk() {
            let tips = categorized.get(&b.name).unwrap();
            assert!(tips.len() <= b.capacity);
            assert!(tips.iter().all(|t| b.accepts(t.odds)), "{} holds out-of-range odds", b.name);
        }
        // 1.45..=1.80 all fit; 1.85 falls in the gap; 1.90..=2.90 overflows risky
        assert_eq!(categorized.get("safe").unwrap().len(), 8);
        assert_eq!(categorized.get("risky").unwrap().len(), 10);
        assert_eq!(categorized.total(), 18);
    }
}

#[tokio::test]
async fn same_seed_same_buckets() {
    let now = Utc::now();
    let prices: Vec<Decimal> = (0..25).map(|i| dec!(1.9) + Decimal::new(5 * i, 2)).collect();
    let service = service(ladder(now, &prices), TipSettings::default());

    let first = bucket(&service, now, 42).await;
    let second = bucket(&service, now, 42).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn tiered_profile_has_bomb_and_no_over_under() {
    let now = Utc::now();
    let feeds = ladder(now, &[dec!(1.6), dec!(2.5), dec!(3.8)]).with_event(
        MockEventBuilder::new("C", "D")
            .kickoff(now + Duration::days(1))
            .totals(&[("Over 2.5", dec!(2.0))])
            .build(),
    );
    let settings = TipSettings {
        buckets: BucketProfile::Tiered.table(),
        ..TipSettings::default()
    };
    let service = service(feeds, settings);

    let categorized = bucket(&service, now, 1).await;
    let names: Vec<&str> = categorized.iter().map(|(name, _)| name).collect();

    assert_eq!(names, vec!["safe", "risky", "bomb"]);
    assert_eq!(categorized.get("bomb").unwrap()[0].odds, dec!(3.8));
    assert!(categorized.get("overunder").is_none());
    assert_eq!(categorized.total(), 3);

    let json = serde_json::to_value(&categorized).unwrap();
    assert!(json.get("overunder").is_none());
}

#[tokio::test]
async fn over_under_tips_fill_their_own_bucket() {
    let now = Utc::now();
    let feeds = MockFeeds::new().with_event(
        MockEventBuilder::new("A", "B")
            .kickoff(now + Duration::days(1))
            .totals_with_point(&[("Over", dec!(2.5), dec!(1.95)), ("Under", dec!(2.5), dec!(1.85))])
            .build(),
    );
    let service = service(feeds, TipSettings::default());

    let categorized = bucket(&service, now, 3).await;
    let over_under = categorized.get("overunder").unwrap();

    assert_eq!(over_under.len(), 1);
    assert_eq!(over_under[0].label, "Over 2.5 goals");
    assert_eq!(over_under[0].market, MarketType::OverUnder);
    assert_eq!(over_under[0].probability, "51.3%");
}

#[tokio::test]
async fn started_events_contribute_nothing() {
    let now = Utc::now();
    let feeds = MockFeeds::new().with_event(
        MockEventBuilder::new("A", "B")
            .kickoff(now - Duration::minutes(5))
            .h2h(&[("A", dec!(2.0))])
            .build(),
    );
    let service = service(feeds, TipSettings::default());

    let tips = assert_ok!(service.collect(now).await);

    assert!(tips.is_empty());
}

#[tokio::test]
async fn duplicate_matchups_never_yield_two_tips() {
    let now = Utc::now();
    let kickoff = now + Duration::hours(6);
    let feeds = ["Red Star", "RED STAR", "red star"]
        .iter()
        .fold(MockFeeds::new(), |feeds, home| {
            feeds.with_event(
                MockEventBuilder::new(*home, "Partizan")
                    .kickoff(kickoff)
                    .h2h(&[("Partizan", dec!(2.1))])
                    .build(),
            )
        });
    let service = service(feeds, TipSettings::default());

    let tips = assert_ok!(service.collect(now).await);
    let keys: HashSet<String> = tips.iter().map(|t| t.matchup.to_lowercase()).collect();

    assert_eq!(tips.len(), 1);
    assert_eq!(keys.len(), tips.len());
    assert_eq!(tips[0].matchup, "Red Star vs Partizan");
}

#[tokio::test]
async fn probability_is_rounded_implied_probability() {
    let now = Utc::now();
    let prices = [dec!(1.45), dec!(1.6), dec!(3.0), dec!(2.333)];
    let service = service(ladder(now, &prices), TipSettings::default());

    let tips = assert_ok!(service.collect(now).await);
    let got: Vec<(Decimal, &str)> = tips.iter().map(|t| (t.odds, t.probability.as_str())).collect();

    assert_eq!(
        got,
        vec![
            (dec!(1.45), "69.0%"),
            (dec!(1.6), "62.5%"),
            (dec!(3.0), "33.3%"),
            (dec!(2.33), "42.9%"),
        ]
    );
}

#[tokio::test]
async fn failing_standings_leave_positions_unknown() {
    let now = Utc::now();
    let feeds = MockFeeds::with_config(MockConfig {
        fail_standings: true,
        ..Default::default()
    })
    .with_event(
        MockEventBuilder::new("A", "B")
            .kickoff(now + Duration::days(1))
            .h2h(&[("A", dec!(2.0))])
            .totals(&[("Under 2.5", dec!(1.9))])
            .build(),
    )
    .with_fixture(fixture(39, (1, "A"), (2, "B")));
    let service = service(feeds, TipSettings::default());

    let tips = assert_ok!(service.collect(now).await);

    assert_eq!(tips.len(), 2);
    for tip in &tips {
        assert_eq!(tip.home_position, Standing::Unknown);
        assert_eq!(tip.away_position, Standing::Unknown);
    }
}

#[tokio::test]
async fn standings_fill_positions() {
    let now = Utc::now();
    let feeds = ladder(now, &[dec!(2.0)])
        .with_fixture(fixture(140, (10, "Home 0"), (20, "Away 0")))
        .with_rank(140, 10, 4)
        .with_rank(140, 20, 15);
    let service = service(feeds, TipSettings::default());

    let tips = assert_ok!(service.collect(now).await);
    let json = serde_json::to_value(&tips[0]).unwrap();

    assert_eq!(json["home_position"], 4);
    assert_eq!(json["away_position"], 15);
}

#[tokio::test]
async fn odds_failure_is_an_error() {
    let feeds = MockFeeds::with_config(MockConfig {
        fail_odds: true,
        ..Default::default()
    });
    let service = service(feeds, TipSettings::default());

    assert!(service.run(Utc::now()).await.is_err());
}
