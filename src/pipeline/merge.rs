// src/pipeline/merge.rs
//
// Reconciling a fresh read with the persisted history. Sources are
// re-scraped on every run but only a recent window is re-read, so the
// fresh batch has to be folded into the durable series without losing
// older dates or duplicating re-read ones.

use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{MetricRecord, Snapshot};
use crate::pipeline::monotonic::make_monotonic;

/// Drop records dated within `margin_days` of the batch maximum.
///
/// The source's most recent day(s) are routinely revised after first
/// publication; they are deferred to a later run rather than ingested in
/// a half-finished state. With the default margin of 1, the max date and
/// the day before it are both dropped.
pub fn filter_last_days(mut records: Vec<MetricRecord>, margin_days: i64) -> Vec<MetricRecord> {
    let Some(max) = records.iter().map(|r| r.date).max() else {
        return records;
    };
    let cutoff = max - Days::new(margin_days.max(0) as u64);
    records.retain(|r| r.date < cutoff);
    records
}

/// Fold a fresh, normalized batch into the prior snapshot.
///
/// Fresh records win on date collisions (a re-read is a correction, never
/// silently ignored). An empty batch after the trailing-date trim is a
/// no-op, not an error: the prior snapshot comes back unchanged. On the
/// first run for a jurisdiction there is no prior and the batch stands
/// alone. The monotonic clamp runs last because stitching two
/// independently-corrected sub-series can regress at the join.
pub fn merge_snapshot(
    prior: Option<&Snapshot>,
    fresh: Vec<MetricRecord>,
    margin_days: i64,
) -> Result<Snapshot> {
    let fresh = filter_last_days(fresh, margin_days);

    if fresh.is_empty() {
        return Ok(prior.cloned().unwrap_or_default());
    }

    let mut next: Vec<MetricRecord> = match prior {
        None => fresh,
        Some(prior) => {
            let fresh_dates: HashSet<NaiveDate> = fresh.iter().map(|r| r.date).collect();
            let superseded = prior.records.iter().filter(|r| fresh_dates.contains(&r.date)).count();
            if superseded > 0 {
                debug!("{superseded} stored date(s) superseded by the fresh batch");
            }
            let mut kept: Vec<MetricRecord> = prior
                .records
                .iter()
                .filter(|r| !fresh_dates.contains(&r.date))
                .cloned()
                .collect();
            kept.extend(fresh);
            kept
        }
    };

    next.sort_by_key(|r| r.date);
    let next = make_monotonic(&next);

    // A surviving duplicate means the partitioning above is broken, not
    // the data. Halt rather than pick one.
    if let Some(d) = first_duplicate_date(&next) {
        return Err(Error::Consistency(format!("duplicate date {d} after merge")));
    }

    Ok(Snapshot::new(next))
}

/// Two-feed variant: a historical re-derivation outranks the regular feed
/// wherever dates collide; the regular feed fills the remaining dates.
pub fn merge_feeds(recent: Vec<MetricRecord>, complete: Vec<MetricRecord>) -> Vec<MetricRecord> {
    if complete.is_empty() {
        let mut out = recent;
        out.sort_by_key(|r| r.date);
        return out;
    }
    let have: HashSet<NaiveDate> = complete.iter().map(|r| r.date).collect();
    let mut out = complete;
    out.extend(recent.into_iter().filter(|r| !have.contains(&r.date)));
    out.sort_by_key(|r| r.date);
    out
}

fn first_duplicate_date(records: &[MetricRecord]) -> Option<NaiveDate> {
    records
        .windows(2)
        .find(|w| w[0].date == w[1].date)
        .map(|w| w[0].date)
}
