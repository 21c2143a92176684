// src/pipeline/normalize.rs

use crate::config::jurisdiction::{JurisdictionConfig, VaccineSource};
use crate::error::{Error, Result};
use crate::model::{MetricRecord, RawRecord};
use crate::pipeline::timeline::VaccineTimeline;
use crate::pipeline::{run_stages, Stage};

/// Resolved vaccine source. The timeline variant has its dates parsed
/// and sorted; the fixed variant is stamped verbatim on every record.
#[derive(Clone, Debug)]
enum Vaccines {
    Fixed(String),
    Timeline(VaccineTimeline),
}

/// Turns raw adapter rows into canonical records for one jurisdiction.
///
/// Construction resolves the injected configuration; a bad authorization
/// date fails here, before anything is fetched.
#[derive(Debug)]
pub struct Normalizer {
    jurisdiction: String,
    source_url_ref: Option<String>,
    vaccines: Vaccines,
}

impl Normalizer {
    pub fn new(cfg: &JurisdictionConfig) -> Result<Self> {
        let vaccines = match cfg.vaccines {
            VaccineSource::Fixed(list) => Vaccines::Fixed(s!(list)),
            VaccineSource::Timeline(table) => Vaccines::Timeline(VaccineTimeline::new(table)?),
        };
        Ok(Self {
            jurisdiction: s!(cfg.name),
            source_url_ref: cfg.source_url_ref.map(String::from),
            vaccines,
        })
    }

    /// Raw rows in, canonical records out, sorted by date.
    pub fn normalize(&self, raw: Vec<RawRecord>) -> Result<Vec<MetricRecord>> {
        let seeded = seed_records(raw)?;
        let stages: [Stage<'_>; 4] = [
            Box::new(derive_people_vaccinated),
            Box::new(|rs| Ok(self.stamp_metadata(rs))),
            Box::new(|rs| Ok(self.tag_vaccines(rs))),
            Box::new(|rs| Ok(sort_by_date(rs))),
        ];
        run_stages(seeded, &stages)
    }

    fn stamp_metadata(&self, mut records: Vec<MetricRecord>) -> Vec<MetricRecord> {
        for r in &mut records {
            r.jurisdiction = self.jurisdiction.clone();
            if let Some(url) = &self.source_url_ref {
                r.source_url = url.clone();
            }
        }
        records
    }

    fn tag_vaccines(&self, mut records: Vec<MetricRecord>) -> Vec<MetricRecord> {
        for r in &mut records {
            r.vaccine = match &self.vaccines {
                Vaccines::Fixed(list) => list.clone(),
                Vaccines::Timeline(timeline) => timeline.vaccines_on(r.date),
            };
        }
        records
    }
}

/// Build record skeletons, discarding rows from before the campaign
/// start (`total_vaccinations > 0`). Those rows mean "no campaign yet",
/// not "zero doses"; zero-filling them would be wrong.
fn seed_records(raw: Vec<RawRecord>) -> Result<Vec<MetricRecord>> {
    let mut out = Vec::with_capacity(raw.len());
    for rr in raw {
        let Some(total) = rr.total_vaccinations.filter(|t| *t > 0) else {
            continue;
        };
        let date = rr
            .date
            .ok_or_else(|| Error::Parse(s!("raw record without a date")))?;
        out.push(MetricRecord {
            jurisdiction: s!(),
            date,
            vaccine: s!(),
            source_url: rr.source_url.unwrap_or_default(),
            total_vaccinations: total,
            people_vaccinated: rr.people_vaccinated,
            people_fully_vaccinated: rr.people_fully_vaccinated,
            total_boosters: rr.total_boosters,
        });
    }
    Ok(out)
}

/// Fill in `people_vaccinated` where the source only reports totals:
/// doses minus full courses minus boosters (absent boosters count as
/// zero for the subtraction only; the stored field stays absent).
///
/// Source revision lag can make the subtraction go negative. That is
/// surfaced as a consistency failure instead of being stored or clamped;
/// a fabricated zero would look like real data downstream.
pub fn derive_people_vaccinated(mut records: Vec<MetricRecord>) -> Result<Vec<MetricRecord>> {
    for r in &mut records {
        if r.people_vaccinated.is_some() {
            continue;
        }
        let Some(fully) = r.people_fully_vaccinated else {
            continue;
        };
        let used = fully + r.total_boosters.unwrap_or(0);
        let derived = r.total_vaccinations.checked_sub(used).ok_or_else(|| {
            Error::Consistency(format!(
                "{}: derived people_vaccinated is negative ({} doses, {} accounted for)",
                r.date, r.total_vaccinations, used
            ))
        })?;
        r.people_vaccinated = Some(derived);
    }
    Ok(records)
}

pub fn sort_by_date(mut records: Vec<MetricRecord>) -> Vec<MetricRecord> {
    records.sort_by_key(|r| r.date);
    records
}
