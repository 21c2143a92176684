// src/model.rs
//
// Canonical and raw record shapes.
//
// - RawRecord/RawBatch: what an adapter's read() produces. Partially
//   populated; column aliasing already happened in the adapter's parser.
// - MetricRecord: one canonical jurisdiction-day observation.
// - Snapshot: the full canonical series for one jurisdiction. Owned by the
//   store; the merger receives it read-only and produces a new one.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One observation for one jurisdiction on one calendar date.
///
/// Cumulative counts only. `None` means "not reported", which is distinct
/// from zero: the China recent feed, for instance, carries nothing but
/// `total_vaccinations`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub jurisdiction: String,
    pub date: NaiveDate,
    /// Comma-joined vaccine names, ordered by authorization date then name.
    pub vaccine: String,
    pub source_url: String,
    pub total_vaccinations: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub people_vaccinated: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub people_fully_vaccinated: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_boosters: Option<u64>,
}

/// Raw adapter output for one date. Everything but the date is optional;
/// the normalizer decides what survives.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub date: Option<NaiveDate>,
    pub total_vaccinations: Option<u64>,
    pub people_vaccinated: Option<u64>,
    pub people_fully_vaccinated: Option<u64>,
    pub total_boosters: Option<u64>,
    /// Per-record fetch URL, when the source has one per observation.
    pub source_url: Option<String>,
}

/// One adapter read.
///
/// `rows` is the regular (recent) feed. `complete` is a historical
/// re-derivation feed for sources that have one; it stays empty for
/// single-feed sources and wins on date collisions when present.
#[derive(Clone, Debug, Default)]
pub struct RawBatch {
    pub rows: Vec<RawRecord>,
    pub complete: Vec<RawRecord>,
}

impl RawBatch {
    pub fn single(rows: Vec<RawRecord>) -> Self {
        Self { rows, complete: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.complete.is_empty()
    }
}

/// The canonical, deduplicated, date-ascending series for one jurisdiction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub records: Vec<MetricRecord>,
}

impl Snapshot {
    pub fn new(records: Vec<MetricRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Latest date present, if any. Snapshots are stored ascending but we
    /// do not rely on that here.
    pub fn max_date(&self) -> Option<NaiveDate> {
        self.records.iter().map(|r| r.date).max()
    }
}
