// src/pipeline/monotonic.rs

use tracing::debug;

use crate::model::MetricRecord;

/// Repair non-monotonic cumulative series caused by source corrections.
///
/// Input must be sorted by date. Each metric is clamped independently: a
/// value below the running maximum is raised to that maximum instead of
/// the row being dropped, so a row whose *other* metrics are fine keeps
/// its place in the cadence. Absent values stay absent and do not advance
/// the running maximum.
///
/// Returns a new sequence; idempotent.
pub fn make_monotonic(records: &[MetricRecord]) -> Vec<MetricRecord> {
    let mut out = Vec::with_capacity(records.len());

    let mut max_total: u64 = 0;
    let mut max_people: Option<u64> = None;
    let mut max_fully: Option<u64> = None;
    let mut max_boosters: Option<u64> = None;

    for record in records {
        let mut r = record.clone();

        if r.total_vaccinations < max_total {
            debug!(
                jurisdiction = %r.jurisdiction,
                date = %r.date,
                "clamping regressed total_vaccinations {} -> {}",
                r.total_vaccinations,
                max_total
            );
            r.total_vaccinations = max_total;
        } else {
            max_total = r.total_vaccinations;
        }

        clamp_up(&mut r.people_vaccinated, &mut max_people);
        clamp_up(&mut r.people_fully_vaccinated, &mut max_fully);
        clamp_up(&mut r.total_boosters, &mut max_boosters);

        out.push(r);
    }

    out
}

fn clamp_up(value: &mut Option<u64>, running: &mut Option<u64>) {
    let Some(v) = *value else { return };
    let m = running.unwrap_or(0);
    if v < m {
        *value = Some(m);
    } else {
        *running = Some(v);
    }
}
