// src/adapters/mod.rs
//! Per-jurisdiction source adapters.
//!
//! Each adapter knows one thing: where its jurisdiction's numbers live
//! and how to pull them into `RawRecord`s. Everything downstream (the
//! stage pipeline, the merge, the store) is shared and lives elsewhere.
//!
//! To add a jurisdiction, implement `SourceAdapter` and register it in
//! `registry()`. Adapters hold their URLs, regexes, allow-lists and
//! vaccine rosters as injected configuration; nothing scrape-specific is
//! global.

pub mod canada;
pub mod china;

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde_json::Value;

use crate::core::net::Fetch;
use crate::error::{Error, Result};
use crate::model::{MetricRecord, RawBatch};

pub trait SourceAdapter: Send + Sync {
    /// Canonical jurisdiction name, also the registry key.
    fn jurisdiction(&self) -> &'static str;

    /// Fetch the raw observations. `last_update` is the latest stored
    /// date; incremental sources use it to stop walking their archive.
    fn read(&self, fetch: &dyn Fetch, last_update: Option<NaiveDate>) -> Result<RawBatch>;

    /// Shape a raw read into canonical records (unmerged, date-sorted).
    fn normalize(&self, raw: RawBatch) -> Result<Vec<MetricRecord>>;
}

/// Every registered source, ready to run. Construction only fails on a
/// configuration defect (bad date, bad regex), never on network state.
pub fn registry() -> Result<Vec<Box<dyn SourceAdapter>>> {
    Ok(vec![
        Box::new(canada::Canada::new()?),
        Box::new(china::China::new()?),
    ])
}

pub fn adapter_for(name: &str) -> Result<Option<Box<dyn SourceAdapter>>> {
    Ok(registry()?
        .into_iter()
        .find(|a| a.jurisdiction().eq_ignore_ascii_case(name)))
}

pub fn jurisdiction_names() -> Result<Vec<&'static str>> {
    Ok(registry()?.iter().map(|a| a.jurisdiction()).collect())
}

/// Halt when the raw payload carries columns we have never seen.
///
/// Unknown columns mean the source schema drifted; propagating them
/// silently is how bad data sneaks into a canonical series, so this is
/// checked before any shaping happens.
pub fn check_known_columns(rows: &[Value], known: &[&str]) -> Result<()> {
    let mut unknown = BTreeSet::new();
    for row in rows {
        if let Some(obj) = row.as_object() {
            for key in obj.keys() {
                if !known.contains(&key.as_str()) {
                    unknown.insert(key.clone());
                }
            }
        }
    }
    if !unknown.is_empty() {
        let list = unknown.into_iter().collect::<Vec<_>>().join(", ");
        return Err(Error::Schema(format!("unknown columns: {list}")));
    }
    Ok(())
}
