// tests/make_monotonic.rs
//
// The running-max clamp over cumulative series.
//
use chrono::NaiveDate;
use vax_scrape::model::MetricRecord;
use vax_scrape::pipeline::monotonic::make_monotonic;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn rec(date: &str, total: u64) -> MetricRecord {
    MetricRecord {
        jurisdiction: "Testland".into(),
        date: d(date),
        vaccine: "A".into(),
        source_url: "https://example.org/vax".into(),
        total_vaccinations: total,
        people_vaccinated: None,
        people_fully_vaccinated: None,
        total_boosters: None,
    }
}

#[test]
fn regressed_total_is_clamped_up_not_dropped() {
    let series = vec![rec("2021-01-01", 100), rec("2021-01-02", 90), rec("2021-01-03", 120)];
    let fixed = make_monotonic(&series);

    assert_eq!(fixed.len(), 3, "row cadence must be preserved");
    let totals: Vec<u64> = fixed.iter().map(|r| r.total_vaccinations).collect();
    assert_eq!(totals, vec![100, 100, 120]);
}

#[test]
fn metrics_are_clamped_independently() {
    // The fully-vaccinated count regresses on day two; the total is fine
    // and must not be disturbed.
    let mut a = rec("2021-01-01", 100);
    a.people_fully_vaccinated = Some(50);
    let mut b = rec("2021-01-02", 150);
    b.people_fully_vaccinated = Some(40);

    let fixed = make_monotonic(&[a, b]);
    assert_eq!(fixed[1].total_vaccinations, 150);
    assert_eq!(fixed[1].people_fully_vaccinated, Some(50));
}

#[test]
fn absent_values_stay_absent() {
    let mut a = rec("2021-01-01", 100);
    a.total_boosters = Some(50);
    let b = rec("2021-01-02", 110); // no booster figure reported
    let mut c = rec("2021-01-03", 120);
    c.total_boosters = Some(40); // regressed vs day one

    let fixed = make_monotonic(&[a, b, c]);
    assert_eq!(fixed[1].total_boosters, None, "absent is not zero");
    assert_eq!(fixed[2].total_boosters, Some(50), "clamp skips the gap");
}

#[test]
fn is_idempotent() {
    let series = vec![
        rec("2021-01-01", 100),
        rec("2021-01-02", 90),
        rec("2021-01-03", 95),
        rec("2021-01-04", 200),
    ];
    let once = make_monotonic(&series);
    let twice = make_monotonic(&once);
    assert_eq!(once, twice);
}

#[test]
fn output_is_non_decreasing_per_metric() {
    let mut series = Vec::new();
    for (i, total) in [10u64, 8, 12, 11, 30, 4].iter().enumerate() {
        let mut r = rec(&format!("2021-02-{:02}", i + 1), *total);
        r.people_vaccinated = Some(total / 2);
        series.push(r);
    }
    let fixed = make_monotonic(&series);
    for w in fixed.windows(2) {
        assert!(w[0].total_vaccinations <= w[1].total_vaccinations);
        if let (Some(a), Some(b)) = (w[0].people_vaccinated, w[1].people_vaccinated) {
            assert!(a <= b);
        }
    }
}

#[test]
fn does_not_mutate_its_input() {
    let series = vec![rec("2021-01-01", 100), rec("2021-01-02", 90)];
    let _ = make_monotonic(&series);
    assert_eq!(series[1].total_vaccinations, 90);
}
