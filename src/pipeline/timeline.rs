// src/pipeline/timeline.rs

use chrono::NaiveDate;

use crate::error::{Error, Result};

/// Authorization-date table for one jurisdiction.
///
/// Answers "which vaccines were in use as of date d". The resulting list
/// only ever grows as d advances, which is exactly the invariant the
/// canonical series needs.
#[derive(Clone, Debug)]
pub struct VaccineTimeline {
    /// (authorization date, name), sorted by date then name.
    entries: Vec<(NaiveDate, String)>,
}

impl VaccineTimeline {
    /// Build from `(name, ISO date)` pairs. An unparsable date is a
    /// configuration defect and fails construction, not the run.
    pub fn new(table: &[(&str, &str)]) -> Result<Self> {
        let mut entries = Vec::with_capacity(table.len());
        for (name, date) in table {
            let d = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
                Error::Config(format!("bad authorization date for {name}: {date:?}"))
            })?;
            entries.push((d, s!(*name)));
        }
        entries.sort();
        Ok(Self { entries })
    }

    /// Comma-joined names of every vaccine authorized on or before `date`.
    pub fn vaccines_on(&self, date: NaiveDate) -> String {
        let names: Vec<&str> = self
            .entries
            .iter()
            .filter(|(d, _)| *d <= date)
            .map(|(_, name)| name.as_str())
            .collect();
        names.join(", ")
    }
}
