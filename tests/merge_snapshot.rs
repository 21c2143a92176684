// tests/merge_snapshot.rs
//
// Merge laws: identity on empty input, trailing-date exclusion,
// supersede-on-collision, and the uniqueness invariant under arbitrary
// overlapping windows.
//
use chrono::{Days, NaiveDate};
use proptest::prelude::*;

use vax_scrape::model::{MetricRecord, Snapshot};
use vax_scrape::pipeline::merge::{filter_last_days, merge_feeds, merge_snapshot};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn rec(date: NaiveDate, total: u64) -> MetricRecord {
    MetricRecord {
        jurisdiction: "Testland".into(),
        date,
        vaccine: "A".into(),
        source_url: "https://example.org/vax".into(),
        total_vaccinations: total,
        people_vaccinated: None,
        people_fully_vaccinated: None,
        total_boosters: None,
    }
}

fn series(start: &str, totals: &[u64]) -> Vec<MetricRecord> {
    let start = d(start);
    totals
        .iter()
        .enumerate()
        .map(|(i, t)| rec(start + Days::new(i as u64), *t))
        .collect()
}

#[test]
fn empty_fresh_batch_is_a_noop() {
    let prior = Snapshot::new(series("2021-01-01", &[10, 20, 30]));
    let next = merge_snapshot(Some(&prior), Vec::new(), 1).unwrap();
    assert_eq!(next, prior);
}

#[test]
fn batch_swallowed_by_margin_is_a_noop_too() {
    let prior = Snapshot::new(series("2021-01-01", &[10, 20, 30]));
    // Two records, both within the default margin of the batch max.
    let fresh = series("2021-02-01", &[40, 50]);
    let next = merge_snapshot(Some(&prior), fresh, 1).unwrap();
    assert_eq!(next, prior);
}

#[test]
fn first_run_has_no_prior() {
    let fresh = series("2021-01-01", &[10, 20, 30, 40]);
    let next = merge_snapshot(None, fresh, 1).unwrap();
    // Margin drops the two most recent dates.
    assert_eq!(next.len(), 2);
    assert_eq!(next.records[0].date, d("2021-01-01"));
    assert_eq!(next.records[1].date, d("2021-01-02"));
}

#[test]
fn margin_days_never_appear_in_output() {
    let fresh = series("2021-03-01", &[10, 20, 30, 40, 50]); // max = 03-05
    let trimmed = filter_last_days(fresh, 1);
    let dates: Vec<NaiveDate> = trimmed.iter().map(|r| r.date).collect();
    assert!(!dates.contains(&d("2021-03-05")));
    assert!(!dates.contains(&d("2021-03-04")));
    assert_eq!(dates.last(), Some(&d("2021-03-03")));
}

#[test]
fn fresh_record_supersedes_stored_date() {
    let prior = Snapshot::new(series("2021-01-01", &[10, 20, 30]));
    // Re-read corrects 01-02 upward; the two trailing dates are padding
    // that the margin strips.
    let fresh = series("2021-01-02", &[25, 31, 32]);
    let next = merge_snapshot(Some(&prior), fresh, 1).unwrap();

    assert_eq!(next.len(), 3);
    assert_eq!(next.records[1].date, d("2021-01-02"));
    assert_eq!(next.records[1].total_vaccinations, 25);
    // 01-03 was not re-read past the margin, stored value stays.
    assert_eq!(next.records[2].total_vaccinations, 30);
}

#[test]
fn re_reading_an_unchanged_tail_changes_nothing() {
    let prior = Snapshot::new(series("2021-01-01", &[10, 20, 30, 40, 50]));
    // Fresh batch duplicates the stored tail at identical values.
    let fresh = series("2021-01-03", &[30, 40, 50]);
    let next = merge_snapshot(Some(&prior), fresh, 1).unwrap();
    assert_eq!(next, prior);
}

#[test]
fn merge_regression_at_join_is_clamped() {
    let prior = Snapshot::new(series("2021-01-01", &[10, 20, 30]));
    // Fresh 01-03 revises the stored 30 down to 25. That still clears
    // the 01-02 running max of 20, so no clamp.
    let fresh = series("2021-01-03", &[25, 35, 40]);
    let next = merge_snapshot(Some(&prior), fresh, 1).unwrap();
    assert_eq!(next.records[2].total_vaccinations, 25);

    // Now regress below the kept history and watch the clamp fire.
    let fresh = series("2021-01-03", &[15, 35, 40]);
    let next = merge_snapshot(Some(&prior), fresh, 1).unwrap();
    assert_eq!(next.records[2].total_vaccinations, 20);
}

#[test]
fn complete_feed_wins_date_collisions() {
    let recent = series("2021-01-01", &[10, 22, 33]);
    let mut complete = series("2021-01-02", &[20, 30]);
    complete[0].source_url = "https://example.org/archive/2".into();
    complete[1].source_url = "https://example.org/archive/3".into();

    let merged = merge_feeds(recent, complete);
    assert_eq!(merged.len(), 3);
    assert_eq!(merged[0].total_vaccinations, 10); // only in recent
    assert_eq!(merged[1].total_vaccinations, 20); // complete wins
    assert_eq!(merged[2].total_vaccinations, 30);
    assert!(merged[1].source_url.contains("archive"));
}

#[test]
fn empty_complete_feed_falls_back_to_recent() {
    let recent = series("2021-01-01", &[10, 20]);
    let merged = merge_feeds(recent.clone(), Vec::new());
    assert_eq!(merged, recent);
}

proptest! {
    // Arbitrary overlapping windows; whatever the overlap, the output
    // must be date-unique, sorted, and monotonic in totals.
    #[test]
    fn output_dates_are_unique_and_sorted(
        prior_offset in 0u64..20,
        prior_len in 1usize..25,
        fresh_offset in 0u64..40,
        fresh_len in 1usize..25,
        margin in 0i64..3,
    ) {
        let base = d("2021-01-01");
        let prior: Vec<MetricRecord> = (0..prior_len)
            .map(|i| rec(base + Days::new(prior_offset + i as u64), (i as u64 + 1) * 10))
            .collect();
        let fresh: Vec<MetricRecord> = (0..fresh_len)
            .map(|i| rec(base + Days::new(fresh_offset + i as u64), (i as u64 + 1) * 7))
            .collect();

        let next = merge_snapshot(Some(&Snapshot::new(prior)), fresh, margin).unwrap();

        for w in next.records.windows(2) {
            prop_assert!(w[0].date < w[1].date);
            prop_assert!(w[0].total_vaccinations <= w[1].total_vaccinations);
        }
    }
}
