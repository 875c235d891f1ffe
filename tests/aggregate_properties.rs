// tests/aggregate_properties.rs
use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use std::sync::Arc;

use mindshare_tracker::aggregate::{MentionAggregator, TickerMentions};
use mindshare_tracker::config::{TierTable, ValidatorConfig};
use mindshare_tracker::error::{MergeError, ScoreError};
use mindshare_tracker::ingest::IngestSession;
use mindshare_tracker::scoring::MindshareScorer;
use mindshare_tracker::store::{InMemoryTickerStore, TickerStore};
use mindshare_tracker::ticker::{MentionMap, MentionRecord, Message, Ticker};

fn base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 4, 0, 0, 0).unwrap()
}

fn aggregator() -> MentionAggregator<InMemoryTickerStore> {
    let tiers = TierTable::from_entries([("t1", 1, None), ("t2", 2, None), ("t3", 3, None)]);
    MentionAggregator::new(
        Arc::new(InMemoryTickerStore::new()),
        Arc::new(tiers),
        Arc::new(MindshareScorer::default()),
    )
}

fn single(contributor: &str, tier: u8, content: &str) -> MentionMap {
    let mut m = MentionMap::new();
    m.insert(
        contributor.to_string(),
        MentionRecord {
            tier,
            source_link: None,
            content: content.to_string(),
        },
    );
    m
}

#[test]
fn remerging_same_mention_is_idempotent() {
    let once = aggregator();
    once.merge_one("$IDEM", &single("t2", 2, "x"), base()).unwrap();

    let twice = aggregator();
    twice.merge_one("$IDEM", &single("t2", 2, "x"), base()).unwrap();
    twice.merge_one("$IDEM", &single("t2", 2, "x"), base()).unwrap();

    assert_eq!(
        once.store().get("$IDEM").unwrap(),
        twice.store().get("$IDEM").unwrap()
    );
}

#[test]
fn timestamps_monotonic_under_any_order() {
    let mut offsets: Vec<i64> = (0..40).map(|i| (i * 37) % 101).collect();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _round in 0..10 {
        offsets.shuffle(&mut rng);
        let agg = aggregator();
        let mut prev: Option<(DateTime<Utc>, DateTime<Utc>)> = None;

        for (i, off) in offsets.iter().enumerate() {
            let ts = base() + Duration::minutes(*off);
            let who = format!("user{}", i % 7);
            let rec = agg.merge_one("$MONO", &single(&who, 3, "m"), ts).unwrap();

            if let Some((first, last)) = prev {
                assert!(rec.first_mentioned_at <= first);
                assert!(rec.last_mentioned_at >= last);
            }
            prev = Some((rec.first_mentioned_at, rec.last_mentioned_at));
        }

        let (first, last) = prev.unwrap();
        let min = *offsets.iter().min().unwrap();
        let max = *offsets.iter().max().unwrap();
        assert_eq!(first, base() + Duration::minutes(min));
        assert_eq!(last, base() + Duration::minutes(max));
    }
}

#[test]
fn contributor_set_only_grows_with_new_people() {
    let agg = aggregator();
    for i in 0..5 {
        agg.merge_one("$SET", &single("t1", 1, &format!("msg {i}")), base())
            .unwrap();
    }
    agg.merge_one("$SET", &single("t2", 2, "other"), base()).unwrap();

    let t = Ticker::from_record(&agg.store().get("$SET").unwrap().unwrap()).unwrap();
    assert_eq!(t.contributor_count(), 2);
    assert_eq!(t.mentions["t1"].content, "msg 4");
}

#[test]
fn invalid_tier_fails_alone_in_batch() {
    let agg = aggregator();
    let mut batch = TickerMentions::new();
    batch.insert("$VALID".into(), single("t1", 1, "ok"));
    batch.insert("$BROKEN".into(), single("ghost", 42, "??"));

    let report = agg.merge_batch(&batch, base());

    assert_eq!(report.updated_symbols(), vec!["$VALID"]);
    assert_eq!(report.failed.len(), 1);
    let (sym, err) = &report.failed[0];
    assert_eq!(sym, "$BROKEN");
    assert!(matches!(
        err,
        MergeError::Score {
            source: ScoreError::InvalidTier { tier: 42, .. },
            ..
        }
    ));
    assert!(agg.store().get("$VALID").unwrap().is_some());
    assert!(agg.store().get("$BROKEN").unwrap().is_none());
}

#[test]
fn score_and_category_stay_in_sync_after_each_merge() {
    let agg = aggregator();
    let bands = mindshare_tracker::scoring::CategoryBands::mindshare();
    for (who, tier) in [("t3", 3u8), ("t2", 2), ("x2", 2), ("t1", 1)] {
        let rec = agg.merge_one("$SYNC", &single(who, tier, "s"), base()).unwrap();
        assert_eq!(rec.category, bands.categorize(rec.mindshare_score).unwrap());
    }
}

#[test]
fn concurrent_producers_on_shared_store() {
    let agg = aggregator();
    let cfg = ValidatorConfig::default();

    std::thread::scope(|scope| {
        for producer in 0..8 {
            let mut session = IngestSession::new(&cfg, agg.clone());
            scope.spawn(move || {
                for n in 0..25 {
                    let msg = Message {
                        author: format!("p{producer}-u{n}"),
                        text: format!("aping into $HOT and $SIDE{producer} now"),
                        timestamp: base() + Duration::seconds((producer * 100 + n) as i64),
                        link: None,
                    };
                    session.ingest(&msg);
                }
                assert_eq!(session.summary().validation.valid, 25);
            });
        }
    });

    let hot = Ticker::from_record(&agg.store().get("$HOT").unwrap().unwrap()).unwrap();
    assert_eq!(hot.contributor_count(), 200);
    assert_eq!(hot.first_mentioned_at, base());
    assert_eq!(hot.last_mentioned_at, base() + Duration::seconds(724));
    // Unknown authors are recorded but weightless.
    assert_eq!(hot.score, 0.0);
    assert_eq!(agg.store().len(), 9);
}
